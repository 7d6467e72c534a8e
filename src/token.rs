use crate::token_type::{LiteralTokenType, TokenType};

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    pub lexeme: Vec<char>,
    pub line: usize,
}

impl Token {
    pub fn new_single_char(token_type: TokenType, lexeme: char, line: usize) -> Token {
        Token {
            token_type,
            lexeme: vec![lexeme],
            line,
        }
    }

    pub fn new(token_type: TokenType, lexeme: String, line: usize) -> Token {
        Token {
            token_type,
            lexeme: lexeme.chars().collect(),
            line,
        }
    }

    pub fn lexeme(&self) -> String {
        self.lexeme.iter().collect()
    }

    /// Keywords only classify a line, so wherever a name is expected they are
    /// plain names.
    pub fn name(&self) -> Option<String> {
        match &self.token_type {
            TokenType::Literal(LiteralTokenType::Identifier(name)) => Some(name.clone()),
            TokenType::Keyword(_) => Some(self.lexeme()),
            _ => None,
        }
    }
}
