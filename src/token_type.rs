use std::collections::HashMap;

#[derive(Debug, PartialEq, Clone)]
pub enum TokenType {
    SingleChar(SingleCharTokenType),
    CloseDelimiter(Delimiter),
    OpenDelimiter(Delimiter),
    Literal(LiteralTokenType),
    Keyword(KeywordTokenType),
    Eof,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Delimiter {
    Paren,
    Bracket,
    Brace,
}

#[derive(Debug, PartialEq, Clone)]
pub enum SingleCharTokenType {
    Comma,
    Dot,
    Equal,
    Less,
    Greater,
    Arrow,
}

#[derive(Debug, PartialEq, Clone)]
pub enum LiteralTokenType {
    Identifier(String),
    Integer(i64),
    /// Digits that do not fit in an `i64`.
    OversizedInteger,
}

#[derive(Debug, Clone, PartialEq)]
pub enum KeywordTokenType {
    Class,
    Let,
    New,
    Clone,
    Cast,
    Call,
    Is,
}

impl KeywordTokenType {
    pub fn make_keywords() -> HashMap<String, KeywordTokenType> {
        let mut keywords = HashMap::new();
        keywords.insert(String::from("CLASS"), KeywordTokenType::Class);
        keywords.insert(String::from("let"), KeywordTokenType::Let);
        keywords.insert(String::from("new"), KeywordTokenType::New);
        keywords.insert(String::from("clone"), KeywordTokenType::Clone);
        keywords.insert(String::from("cast"), KeywordTokenType::Cast);
        keywords.insert(String::from("call"), KeywordTokenType::Call);
        keywords.insert(String::from("is"), KeywordTokenType::Is);
        keywords
    }
}

impl TokenType {
    pub fn integer(&self) -> Option<i64> {
        match self {
            TokenType::Literal(LiteralTokenType::Integer(value)) => Some(*value),
            _ => None,
        }
    }
}
