use crate::error::RuntimeErrorKind;
use crate::expression::Expression;
use crate::statement::Statement;
use crate::token::Token;
use crate::token_type::{Delimiter, KeywordTokenType, SingleCharTokenType, TokenType};
use peekmore::{PeekMore, PeekMoreIterator};
use std::slice::Iter;

/// Turns the tokens of one statement line into a `Statement`.
///
/// Keywords are matched only where they decide the statement form: first on
/// the line, right after `let NAME =`, and after the variable of a type test.
/// Everywhere else they read as names, so `call clone.is` is a valid call.
pub struct Parser<'a> {
    tokens_iter: PeekMoreIterator<Iter<'a, Token>>,
    source: &'a str,
}

type ParseStmtResult = Result<Statement, RuntimeErrorKind>;
type ParseExprResult = Result<Expression, RuntimeErrorKind>;

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token], source: &'a str) -> Self {
        Self {
            tokens_iter: tokens.iter().peekmore(),
            source,
        }
    }

    pub fn parse(&mut self) -> ParseStmtResult {
        let token_type = self.peek_type().cloned();
        match token_type {
            Some(TokenType::Keyword(KeywordTokenType::Let)) if !self.keyword_is_variable() => {
                self.advance();
                self.let_statement()
            }
            Some(TokenType::Keyword(KeywordTokenType::Call)) if !self.keyword_is_variable() => {
                self.advance();
                self.call_statement()
            }
            Some(TokenType::Literal(_)) | Some(TokenType::Keyword(_)) => self.variable_statement(),
            _ => Err(self.unknown_statement()),
        }
    }

    /// Whether the line has the shape of some statement, without checking
    /// the rest of it.
    pub fn starts_statement(&mut self) -> bool {
        let token_type = self.peek_type().cloned();
        match token_type {
            Some(TokenType::Keyword(KeywordTokenType::Let))
            | Some(TokenType::Keyword(KeywordTokenType::Call)) => true,
            Some(TokenType::Literal(_)) | Some(TokenType::Keyword(_)) => matches!(
                self.peek_type_nth(1),
                Some(TokenType::SingleChar(SingleCharTokenType::Dot))
                    | Some(TokenType::Keyword(KeywordTokenType::Is))
            ),
            _ => false,
        }
    }

    /// `let.a = 1` and `call is A` use `let` and `call` as variable names.
    fn keyword_is_variable(&mut self) -> bool {
        let second = self.peek_type_nth(1).cloned();
        match second {
            Some(TokenType::SingleChar(SingleCharTokenType::Dot)) => true,
            Some(TokenType::Keyword(KeywordTokenType::Is)) => {
                self.peek_type_nth(3) == Some(&TokenType::Eof)
            }
            _ => false,
        }
    }

    fn let_statement(&mut self) -> ParseStmtResult {
        let name = self.consume_identifier()?;
        self.consume(TokenType::SingleChar(SingleCharTokenType::Equal))?;
        let value = self.expression()?;
        Ok(Statement::Let { name, value })
    }

    fn expression(&mut self) -> ParseExprResult {
        let token_type = self.peek_type().cloned();
        match token_type {
            // `let y = new` aliases a variable called `new`.
            Some(_) if self.peek_type_nth(1) == Some(&TokenType::Eof) => {
                let name = self.consume_identifier()?;
                self.consume_end()?;
                Ok(Expression::Variable(name))
            }
            Some(TokenType::Keyword(KeywordTokenType::New)) => {
                self.advance();
                self.new_expression()
            }
            Some(TokenType::Keyword(KeywordTokenType::Clone)) => {
                self.advance();
                let source = self.consume_identifier()?;
                self.consume_end()?;
                Ok(Expression::Clone(source))
            }
            Some(TokenType::Keyword(KeywordTokenType::Cast)) => {
                self.advance();
                self.consume(TokenType::SingleChar(SingleCharTokenType::Less))?;
                let target = self.consume_identifier()?;
                self.consume(TokenType::SingleChar(SingleCharTokenType::Greater))?;
                let source = self.consume_identifier()?;
                self.consume_end()?;
                Ok(Expression::Cast { target, source })
            }
            _ => {
                let name = self.consume_identifier()?;
                self.consume_end()?;
                Ok(Expression::Variable(name))
            }
        }
    }

    fn new_expression(&mut self) -> ParseExprResult {
        let class = self.consume_identifier()?;
        self.consume(TokenType::OpenDelimiter(Delimiter::Paren))?;
        let arguments = self.constructor_arguments()?;
        self.consume_end()?;
        Ok(Expression::New { class, arguments })
    }

    fn constructor_arguments(&mut self) -> Result<Vec<i64>, RuntimeErrorKind> {
        let mut arguments = Vec::new();
        if self.next_matches_one(TokenType::CloseDelimiter(Delimiter::Paren)) {
            self.advance();
            return Ok(arguments);
        }
        loop {
            let token = self.advance().ok_or_else(|| self.unknown_statement())?;
            match &token.token_type {
                TokenType::Eof => return Err(self.unknown_statement()),
                token_type => match token_type.integer() {
                    Some(value) => arguments.push(value),
                    None => return Err(RuntimeErrorKind::InvalidConstructorArg(token.lexeme())),
                },
            }
            let token = self.advance().ok_or_else(|| self.unknown_statement())?;
            match &token.token_type {
                TokenType::SingleChar(SingleCharTokenType::Comma) => {}
                TokenType::CloseDelimiter(Delimiter::Paren) => return Ok(arguments),
                TokenType::Eof => return Err(self.unknown_statement()),
                _ => return Err(RuntimeErrorKind::InvalidConstructorArg(token.lexeme())),
            }
        }
    }

    fn call_statement(&mut self) -> ParseStmtResult {
        let variable = self.consume_identifier()?;
        self.consume(TokenType::SingleChar(SingleCharTokenType::Dot))?;
        let method = self.consume_identifier()?;
        self.consume_end()?;
        Ok(Statement::Call { variable, method })
    }

    /// `name.field = value` or `name is Class`.
    fn variable_statement(&mut self) -> ParseStmtResult {
        let variable = self.consume_identifier()?;
        match self.advance().map(|token| &token.token_type) {
            Some(TokenType::SingleChar(SingleCharTokenType::Dot)) => {
                let field = self.consume_identifier()?;
                self.consume(TokenType::SingleChar(SingleCharTokenType::Equal))?;
                let value = self.assigned_value()?;
                Ok(Statement::FieldAssignment {
                    variable,
                    field,
                    value,
                })
            }
            Some(TokenType::Keyword(KeywordTokenType::Is)) => {
                // Any single word names a class, found or not.
                let class = match self.advance() {
                    Some(token) if token.token_type != TokenType::Eof => token.lexeme(),
                    _ => return Err(self.unknown_statement()),
                };
                self.consume_end()?;
                Ok(Statement::TypeTest { variable, class })
            }
            _ => Err(self.unknown_statement()),
        }
    }

    fn assigned_value(&mut self) -> Result<i64, RuntimeErrorKind> {
        let rest: Vec<&Token> = self
            .tokens_iter
            .by_ref()
            .take_while(|token| token.token_type != TokenType::Eof)
            .collect();
        if let [token] = rest.as_slice() {
            if let Some(value) = token.token_type.integer() {
                return Ok(value);
            }
        }
        let found: String = rest.iter().map(|token| token.lexeme()).collect();
        Err(RuntimeErrorKind::InvalidAssignedValue(found))
    }

    fn peek_type(&mut self) -> Option<&TokenType> {
        self.tokens_iter.peek().map(|token| &token.token_type)
    }

    fn peek_type_nth(&mut self, n: usize) -> Option<&TokenType> {
        self.tokens_iter.peek_nth(n).map(|token| &token.token_type)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        self.tokens_iter.next()
    }

    fn next_matches_one(&mut self, token_type: TokenType) -> bool {
        self.peek_type() == Some(&token_type)
    }

    fn consume(&mut self, token_type: TokenType) -> Result<(), RuntimeErrorKind> {
        if self.next_matches_one(token_type) {
            self.advance();
            Ok(())
        } else {
            Err(self.unknown_statement())
        }
    }

    fn consume_identifier(&mut self) -> Result<String, RuntimeErrorKind> {
        match self.advance().and_then(Token::name) {
            Some(name) => Ok(name),
            None => Err(self.unknown_statement()),
        }
    }

    fn consume_end(&mut self) -> Result<(), RuntimeErrorKind> {
        self.consume(TokenType::Eof)
    }

    fn unknown_statement(&self) -> RuntimeErrorKind {
        RuntimeErrorKind::UnknownStatement(self.source.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::Scanner;

    fn parse(source: &str) -> ParseStmtResult {
        let tokens = Scanner::new(source, 1).scan_tokens().unwrap();
        Parser::new(&tokens, source).parse()
    }

    #[test]
    fn test_that_new_expression_is_parsed() {
        assert_eq!(
            parse("let x = new B(1, -2)"),
            Ok(Statement::Let {
                name: String::from("x"),
                value: Expression::New {
                    class: String::from("B"),
                    arguments: vec![1, -2],
                },
            })
        );
        assert_eq!(
            parse("let e = new Empty()"),
            Ok(Statement::Let {
                name: String::from("e"),
                value: Expression::New {
                    class: String::from("Empty"),
                    arguments: vec![],
                },
            })
        );
    }

    #[test]
    fn test_that_clone_cast_and_alias_are_parsed() {
        assert_eq!(
            parse("let c = clone x"),
            Ok(Statement::Let {
                name: String::from("c"),
                value: Expression::Clone(String::from("x")),
            })
        );
        assert_eq!(
            parse("let y = cast<A> x ; upcast"),
            Ok(Statement::Let {
                name: String::from("y"),
                value: Expression::Cast {
                    target: String::from("A"),
                    source: String::from("x"),
                },
            })
        );
        assert_eq!(
            parse("let z = y"),
            Ok(Statement::Let {
                name: String::from("z"),
                value: Expression::Variable(String::from("y")),
            })
        );
    }

    #[test]
    fn test_that_field_assignment_call_and_type_test_are_parsed() {
        assert_eq!(
            parse("x.a = 42"),
            Ok(Statement::FieldAssignment {
                variable: String::from("x"),
                field: String::from("a"),
                value: 42,
            })
        );
        assert_eq!(
            parse("call x.show"),
            Ok(Statement::Call {
                variable: String::from("x"),
                method: String::from("show"),
            })
        );
        assert_eq!(
            parse("y is B"),
            Ok(Statement::TypeTest {
                variable: String::from("y"),
                class: String::from("B"),
            })
        );
    }

    #[test]
    fn test_that_non_literal_constructor_argument_is_rejected() {
        assert_eq!(
            parse("let x = new A(1, a)"),
            Err(RuntimeErrorKind::InvalidConstructorArg(String::from("a")))
        );
        assert_eq!(
            parse("let x = new A(1 2)"),
            Err(RuntimeErrorKind::InvalidConstructorArg(String::from("2")))
        );
    }

    #[test]
    fn test_that_non_literal_assigned_value_is_rejected() {
        assert_eq!(
            parse("x.a = y.b"),
            Err(RuntimeErrorKind::InvalidAssignedValue(String::from("y.b")))
        );
    }

    #[test]
    fn test_that_keyword_words_parse_as_names() {
        assert_eq!(
            parse("let cast = new new(1)"),
            Ok(Statement::Let {
                name: String::from("cast"),
                value: Expression::New {
                    class: String::from("new"),
                    arguments: vec![1],
                },
            })
        );
        assert_eq!(
            parse("let is = clone cast"),
            Ok(Statement::Let {
                name: String::from("is"),
                value: Expression::Clone(String::from("cast")),
            })
        );
        assert_eq!(
            parse("let y = new"),
            Ok(Statement::Let {
                name: String::from("y"),
                value: Expression::Variable(String::from("new")),
            })
        );
        assert_eq!(
            parse("call cast.clone"),
            Ok(Statement::Call {
                variable: String::from("cast"),
                method: String::from("clone"),
            })
        );
        assert_eq!(
            parse("let.is = 3"),
            Ok(Statement::FieldAssignment {
                variable: String::from("let"),
                field: String::from("is"),
                value: 3,
            })
        );
        assert_eq!(
            parse("call is let"),
            Ok(Statement::TypeTest {
                variable: String::from("call"),
                class: String::from("let"),
            })
        );
    }

    #[test]
    fn test_that_any_single_word_after_is_names_a_class() {
        assert_eq!(
            parse("x is 5"),
            Ok(Statement::TypeTest {
                variable: String::from("x"),
                class: String::from("5"),
            })
        );
        assert_eq!(
            parse("x is"),
            Err(RuntimeErrorKind::UnknownStatement(String::from("x is")))
        );
    }

    #[test]
    fn test_that_oversized_literals_are_reported_where_they_appear() {
        assert_eq!(
            parse("let x = new A(99999999999999999999)"),
            Err(RuntimeErrorKind::InvalidConstructorArg(String::from(
                "99999999999999999999"
            )))
        );
        assert_eq!(
            parse("x.a = -99999999999999999999"),
            Err(RuntimeErrorKind::InvalidAssignedValue(String::from(
                "-99999999999999999999"
            )))
        );
    }

    #[test]
    fn test_that_statement_shapes_are_recognised() {
        for (source, expected) in [
            ("let x = new A(a)", true),
            ("call x", true),
            ("x.a = y", true),
            ("new is A", true),
            ("metods = {", false),
            ("show -> [a]", false),
            ("x y", false),
        ] {
            let tokens = Scanner::new(source, 1).scan_tokens().unwrap();
            assert_eq!(Parser::new(&tokens, source).starts_statement(), expected, "{}", source);
        }
    }

    #[test]
    fn test_that_unrecognised_shapes_are_unknown_statements() {
        for source in ["print x", "let = 3", "call x", "x y", "let x = new A(1"] {
            assert_eq!(
                parse(source),
                Err(RuntimeErrorKind::UnknownStatement(source.to_string())),
                "{}",
                source
            );
        }
    }
}
