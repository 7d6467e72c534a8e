use crate::error::ScanError;
use crate::token::Token;
use crate::token_type::{
    Delimiter, KeywordTokenType, LiteralTokenType, SingleCharTokenType, TokenType,
};
use peekmore::{PeekMore, PeekMoreIterator};
use std::collections::HashMap;
use std::str::Chars;

/// Splits a single source line into tokens. Everything after `;` or `//` is a
/// comment, so a line holding only a comment scans to a lone `Eof`.
pub struct Scanner<'a> {
    source_iter: PeekMoreIterator<Chars<'a>>,
    line: usize,
}

enum CharacterScanResult {
    Token(Token),
    Comment,
    Skipped,
    Err(ScanError),
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str, line: usize) -> Scanner<'a> {
        Scanner {
            source_iter: source.chars().peekmore(),
            line,
        }
    }

    pub fn scan_tokens(&mut self) -> Result<Vec<Token>, ScanError> {
        let mut tokens = vec![];
        let keywords = KeywordTokenType::make_keywords();

        while let Some(character) = self.source_iter.next() {
            match self.scan_token(character, &keywords) {
                CharacterScanResult::Token(token) => tokens.push(token),
                CharacterScanResult::Comment => break,
                CharacterScanResult::Skipped => {}
                CharacterScanResult::Err(error) => return Err(error),
            }
        }
        tokens.push(Token {
            token_type: TokenType::Eof,
            lexeme: Vec::new(),
            line: self.line,
        });
        Ok(tokens)
    }

    fn scan_token(
        &mut self,
        character: char,
        keywords: &HashMap<String, KeywordTokenType>,
    ) -> CharacterScanResult {
        let line = self.line;
        let make_token = |token_type| {
            CharacterScanResult::Token(Token::new_single_char(token_type, character, line))
        };

        match character {
            '(' => make_token(TokenType::OpenDelimiter(Delimiter::Paren)),
            ')' => make_token(TokenType::CloseDelimiter(Delimiter::Paren)),
            '{' => make_token(TokenType::OpenDelimiter(Delimiter::Brace)),
            '}' => make_token(TokenType::CloseDelimiter(Delimiter::Brace)),
            '[' => make_token(TokenType::OpenDelimiter(Delimiter::Bracket)),
            ']' => make_token(TokenType::CloseDelimiter(Delimiter::Bracket)),
            ',' => make_token(TokenType::SingleChar(SingleCharTokenType::Comma)),
            '.' => make_token(TokenType::SingleChar(SingleCharTokenType::Dot)),
            '=' => make_token(TokenType::SingleChar(SingleCharTokenType::Equal)),
            '<' => make_token(TokenType::SingleChar(SingleCharTokenType::Less)),
            '>' => make_token(TokenType::SingleChar(SingleCharTokenType::Greater)),
            ';' => CharacterScanResult::Comment,
            '/' => match self.source_iter.peek().copied() {
                Some('/') => CharacterScanResult::Comment,
                _ => CharacterScanResult::Err(ScanError::UnknownSymbol('/')),
            },
            '-' => self.scan_minus(),
            ' ' | '\r' | '\t' | '\n' => CharacterScanResult::Skipped,
            character if character.is_ascii_digit() => self.scan_integer(String::new(), character),
            character if character.is_alphabetic() || character == '_' => {
                let (token_type, lexeme) = self.scan_identifier(character, keywords);
                CharacterScanResult::Token(Token::new(token_type, lexeme, line))
            }
            _ => CharacterScanResult::Err(ScanError::UnknownSymbol(character)),
        }
    }

    fn scan_minus(&mut self) -> CharacterScanResult {
        match self.source_iter.peek().copied() {
            Some('>') => {
                self.source_iter.next();
                let token_type = TokenType::SingleChar(SingleCharTokenType::Arrow);
                CharacterScanResult::Token(Token::new(token_type, String::from("->"), self.line))
            }
            Some(digit) if digit.is_ascii_digit() => {
                self.source_iter.next();
                self.scan_integer(String::from("-"), digit)
            }
            _ => CharacterScanResult::Err(ScanError::UnknownSymbol('-')),
        }
    }

    fn scan_integer(&mut self, mut lexeme: String, first_digit: char) -> CharacterScanResult {
        lexeme.push(first_digit);
        while let Some(next) = self.source_iter.peek() {
            if next.is_ascii_digit() {
                lexeme.push(*next);
                self.source_iter.next();
            } else {
                break;
            }
        }
        // `12abc` is one malformed word, not an integer followed by a name.
        if let Some(next) = self.source_iter.peek() {
            if next.is_alphabetic() || *next == '_' {
                return CharacterScanResult::Err(ScanError::UnknownSymbol(*next));
            }
        }
        let token_type = match lexeme.parse::<i64>() {
            Ok(value) => TokenType::Literal(LiteralTokenType::Integer(value)),
            Err(_) => TokenType::Literal(LiteralTokenType::OversizedInteger),
        };
        CharacterScanResult::Token(Token::new(token_type, lexeme, self.line))
    }

    fn scan_identifier(
        &mut self,
        first_char: char,
        keywords: &HashMap<String, KeywordTokenType>,
    ) -> (TokenType, String) {
        let mut identifier: Vec<char> = vec![first_char];

        while let Some(next) = self.source_iter.peek() {
            if next.is_alphanumeric() || *next == '_' {
                identifier.push(*next);
                self.source_iter.next();
            } else {
                break;
            }
        }
        let string: String = identifier.iter().collect();
        if let Some(keyword) = keywords.get(&string) {
            (TokenType::Keyword(keyword.clone()), string)
        } else {
            let lexeme = string.clone();
            (
                TokenType::Literal(LiteralTokenType::Identifier(string)),
                lexeme,
            )
        }
    }
}
