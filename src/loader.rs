use crate::class::{ClassDeclaration, ClassTable, MethodToken};
use crate::error::LoadError;
use crate::parser::Parser;
use crate::scanner::Scanner;
use crate::token::Token;
use crate::token_type::{Delimiter, LiteralTokenType, SingleCharTokenType, TokenType};
use std::iter::{Enumerate, Peekable};
use std::str::Lines;
use tracing::debug;

/// Resolved classes plus the statements that follow them, still as text.
pub struct Program {
    pub classes: ClassTable,
    pub statements: Vec<SourceStatement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceStatement {
    pub line: usize,
    pub text: String,
}

pub fn load(source: &str) -> Result<Program, LoadError> {
    Loader::new(source).load()
}

struct Loader<'a> {
    lines: Peekable<Enumerate<Lines<'a>>>,
}

impl<'a> Loader<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            lines: source.lines().enumerate().peekable(),
        }
    }

    fn load(mut self) -> Result<Program, LoadError> {
        let mut declarations = Vec::new();
        while let Some(&(index, text)) = self.lines.peek() {
            let trimmed = text.trim();
            if trimmed.is_empty() || is_comment(trimmed) {
                self.lines.next();
                continue;
            }
            if first_word(trimmed) != "CLASS" {
                break;
            }
            self.lines.next();
            let declaration = self.class_block(index + 1, text)?;
            debug!(class = %declaration.name, line = declaration.line, "class declaration read");
            declarations.push(declaration);
        }

        let mut statements = Vec::new();
        for (index, text) in self.lines {
            let trimmed = text.trim();
            if trimmed.is_empty() || is_comment(trimmed) {
                continue;
            }
            if first_word(trimmed) == "CLASS" {
                return Err(LoadError::malformed(
                    index + 1,
                    "CLASS declaration after the first statement",
                ));
            }
            statements.push(SourceStatement {
                line: index + 1,
                text: trimmed.to_string(),
            });
        }

        let classes = ClassTable::resolve(declarations)?;
        debug!(statements = statements.len(), "program loaded");
        Ok(Program {
            classes,
            statements,
        })
    }

    /// Reads body lines until a blank line or a line that is not part of a
    /// class body. The terminating non-blank line is left for the caller.
    fn class_block(&mut self, line: usize, header: &str) -> Result<ClassDeclaration, LoadError> {
        let tokens = scan_line(header, line)?;
        let name = match tokens.as_slice() {
            [_, name, eof] if eof.token_type == TokenType::Eof => name
                .name()
                .ok_or_else(|| LoadError::malformed(line, "Expect class name."))?,
            _ => return Err(LoadError::malformed(line, "Expect class name.")),
        };
        let mut declaration = ClassDeclaration::new(name, line);

        while let Some(&(index, text)) = self.lines.peek() {
            let line = index + 1;
            let trimmed = text.trim();
            if trimmed.is_empty() {
                self.lines.next();
                break;
            }
            if is_comment(trimmed) {
                self.lines.next();
                continue;
            }
            match first_word(trimmed) {
                "base" => {
                    self.lines.next();
                    let tokens = scan_line(text, line)?;
                    declaration.base = base_name(&tokens, line)?;
                }
                "fields" => {
                    self.lines.next();
                    let tokens = scan_line(text, line)?;
                    let items = list_items(assigned(&tokens, line, "fields")?, line)?;
                    declaration.fields = items
                        .into_iter()
                        .map(|token| match token.name() {
                            Some(field) => Ok(field),
                            None => Err(LoadError::malformed(
                                line,
                                format!("Expect field name, found {}", token.lexeme()),
                            )),
                        })
                        .collect::<Result<Vec<String>, LoadError>>()?;
                }
                "methods" => {
                    self.lines.next();
                    let tokens = scan_line(text, line)?;
                    self.methods_block(&tokens, line, &mut declaration)?;
                }
                _ if starts_statement(text, line) => break,
                _ => {
                    return Err(LoadError::malformed(
                        line,
                        format!("Unexpected line in class {}: {}", declaration.name, trimmed),
                    ))
                }
            }
        }
        Ok(declaration)
    }

    fn methods_block(
        &mut self,
        tokens: &[Token],
        line: usize,
        declaration: &mut ClassDeclaration,
    ) -> Result<(), LoadError> {
        match assigned(tokens, line, "methods")? {
            [open, close, eof]
                if open.token_type == TokenType::OpenDelimiter(Delimiter::Brace)
                    && close.token_type == TokenType::CloseDelimiter(Delimiter::Brace)
                    && eof.token_type == TokenType::Eof =>
            {
                return Ok(());
            }
            [open, eof]
                if open.token_type == TokenType::OpenDelimiter(Delimiter::Brace)
                    && eof.token_type == TokenType::Eof => {}
            _ => return Err(LoadError::malformed(line, "Expect '{' after methods =")),
        }

        for (index, text) in self.lines.by_ref() {
            let line = index + 1;
            let trimmed = text.trim();
            if trimmed.is_empty() || is_comment(trimmed) {
                continue;
            }
            let tokens = scan_line(text, line)?;
            if let [close, ..] = tokens.as_slice() {
                if close.token_type == TokenType::CloseDelimiter(Delimiter::Brace) {
                    return Ok(());
                }
            }
            let (name, body) = method_line(&tokens, line)?;
            declaration.define_method(name, body);
        }
        Err(LoadError::malformed(
            declaration.line,
            format!("Unterminated methods block in class {}", declaration.name),
        ))
    }
}

fn is_comment(trimmed: &str) -> bool {
    trimmed.starts_with("//") || trimmed.starts_with(';')
}

fn first_word(trimmed: &str) -> &str {
    trimmed
        .split(|character: char| !(character.is_alphanumeric() || character == '_'))
        .next()
        .unwrap_or_default()
}

/// A line ending a class block without a blank line must open the next class
/// or look like a statement.
fn starts_statement(text: &str, line: usize) -> bool {
    if first_word(text.trim()) == "CLASS" {
        return true;
    }
    match Scanner::new(text, line).scan_tokens() {
        Ok(tokens) => Parser::new(&tokens, text).starts_statement(),
        Err(_) => false,
    }
}

fn scan_line(text: &str, line: usize) -> Result<Vec<Token>, LoadError> {
    Scanner::new(text, line)
        .scan_tokens()
        .map_err(|error| LoadError::malformed(line, error.to_string()))
}

/// Everything after `keyword =`.
fn assigned<'t>(tokens: &'t [Token], line: usize, keyword: &str) -> Result<&'t [Token], LoadError> {
    match tokens {
        [_, equal, rest @ ..]
            if equal.token_type == TokenType::SingleChar(SingleCharTokenType::Equal) =>
        {
            Ok(rest)
        }
        _ => Err(LoadError::malformed(
            line,
            format!("Expect '=' after {}", keyword),
        )),
    }
}

fn base_name(tokens: &[Token], line: usize) -> Result<Option<String>, LoadError> {
    match assigned(tokens, line, "base")? {
        [name, eof] if eof.token_type == TokenType::Eof => match name.name() {
            Some(name) if name == "None" => Ok(None),
            Some(name) => Ok(Some(name)),
            None => Err(LoadError::malformed(line, "Expect base class name.")),
        },
        _ => Err(LoadError::malformed(line, "Expect base class name.")),
    }
}

/// Contents of `[a, b c]`; commas are optional separators.
fn list_items(tokens: &[Token], line: usize) -> Result<Vec<&Token>, LoadError> {
    match tokens {
        [open, items @ .., close, eof]
            if open.token_type == TokenType::OpenDelimiter(Delimiter::Bracket)
                && close.token_type == TokenType::CloseDelimiter(Delimiter::Bracket)
                && eof.token_type == TokenType::Eof =>
        {
            Ok(items
                .iter()
                .filter(|token| {
                    token.token_type != TokenType::SingleChar(SingleCharTokenType::Comma)
                })
                .collect())
        }
        _ => Err(LoadError::malformed(line, "Expect a list in square brackets.")),
    }
}

fn method_line(tokens: &[Token], line: usize) -> Result<(String, Vec<MethodToken>), LoadError> {
    let (name, rest) = match tokens {
        [name, arrow, rest @ ..]
            if arrow.token_type == TokenType::SingleChar(SingleCharTokenType::Arrow) =>
        {
            match name.name() {
                Some(name) => (name, rest),
                None => return Err(LoadError::malformed(line, "Expect method name.")),
            }
        }
        _ => return Err(LoadError::malformed(line, "Expect 'name -> [...]' method line.")),
    };
    let body = list_items(rest, line)?
        .into_iter()
        .map(|token| match (&token.token_type, token.name()) {
            (TokenType::Literal(LiteralTokenType::Integer(value)), _) => {
                Ok(MethodToken::Literal(*value))
            }
            (_, Some(field)) => Ok(MethodToken::Field(field)),
            _ => Err(LoadError::malformed(
                line,
                format!("Unexpected {} in method {}", token.lexeme(), name),
            )),
        })
        .collect::<Result<Vec<MethodToken>, LoadError>>()?;
    Ok((name, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadErrorKind;

    const SOURCE: &str = "\
// shapes
CLASS A
base = None
fields = [a]
methods = {
    show -> [a]
    pair -> [a, 7 -1]
}

CLASS B
base   = A
fields = [b, c]
methods = {}
CLASS Empty

let x = new B(1, 2, 3) ; inline comment
; whole-line comment

call x.show
";

    #[test]
    fn test_that_classes_and_statements_are_loaded() {
        let program = load(SOURCE).unwrap();
        let classes = &program.classes;
        assert_eq!(classes.len(), 3);

        let a = classes.get("A").unwrap();
        let b = classes.get("B").unwrap();
        assert_eq!(classes.base_name(b), Some("A"));
        assert_eq!(classes.all_fields(b), vec!["a", "b", "c"]);
        assert!(classes.class(b).methods.is_empty());
        assert_eq!(
            classes.lookup_method(a, "pair").unwrap().body,
            vec![
                MethodToken::Field(String::from("a")),
                MethodToken::Literal(7),
                MethodToken::Literal(-1),
            ]
        );
        assert!(classes.class(classes.get("Empty").unwrap()).fields.is_empty());

        assert_eq!(
            program.statements,
            vec![
                SourceStatement {
                    line: 16,
                    text: String::from("let x = new B(1, 2, 3) ; inline comment"),
                },
                SourceStatement {
                    line: 19,
                    text: String::from("call x.show"),
                },
            ]
        );
    }

    #[test]
    fn test_that_unknown_base_fails_loading() {
        let result = load("CLASS B\nbase = Missing\n\nlet b = new B()\n");
        let error = result.err().unwrap();
        assert_eq!(error.line, 1);
        assert_eq!(
            error.kind,
            LoadErrorKind::UnknownBaseClass {
                class: String::from("B"),
                base: String::from("Missing"),
            }
        );
    }

    #[test]
    fn test_that_duplicate_class_fails_loading() {
        let result = load("CLASS A\nfields = [a]\n\nCLASS A\nfields = [b]\n");
        let error = result.err().unwrap();
        assert_eq!(error.line, 4);
        assert_eq!(error.kind, LoadErrorKind::DuplicateClass(String::from("A")));
    }

    #[test]
    fn test_that_redeclared_inherited_field_fails_loading() {
        let result = load("CLASS A\nfields = [a]\n\nCLASS B\nbase = A\nfields = [a]\n");
        assert_eq!(
            result.err().map(|error| error.kind),
            Some(LoadErrorKind::DuplicateField {
                class: String::from("B"),
                field: String::from("a"),
            })
        );
    }

    #[test]
    fn test_that_unterminated_methods_block_is_malformed() {
        let result = load("CLASS A\nmethods = {\n  show -> [a]\n");
        assert!(matches!(
            result.err().map(|error| error.kind),
            Some(LoadErrorKind::Malformed(_))
        ));
    }

    #[test]
    fn test_that_malformed_lines_are_reported_with_their_line() {
        for (source, line) in [
            ("CLASS\n", 1),
            ("CLASS A\nfields = a, b\n", 2),
            ("CLASS A\nbase A\n", 2),
            ("CLASS A\nmethods = {\n  show [a]\n}\n", 3),
            ("CLASS A\nmethods = {\n  show -> [a, <]\n}\n", 3),
            ("let x = new A()\nCLASS A\n", 2),
        ] {
            let error = load(source).err().unwrap();
            assert!(matches!(error.kind, LoadErrorKind::Malformed(_)), "{}", source);
            assert_eq!(error.line, line, "{}", source);
        }
    }

    #[test]
    fn test_that_misspelt_class_body_line_is_malformed() {
        let error = load("CLASS A\nfields = [a]\nmetods = {\n  show -> [a]\n}\n")
            .err()
            .unwrap();
        assert_eq!(error.line, 3);
        assert_eq!(
            error.kind,
            LoadErrorKind::Malformed(String::from("Unexpected line in class A: metods = {"))
        );
    }

    #[test]
    fn test_that_statement_may_follow_class_block_directly() {
        let program = load("CLASS A\nfields = [a]\nlet x = new A(b)\nx is A\n").unwrap();
        assert_eq!(program.classes.len(), 1);
        assert_eq!(program.statements.len(), 2);
        assert_eq!(program.statements[0].line, 3);
    }

    #[test]
    fn test_that_keyword_words_name_classes_fields_and_methods() {
        let program = load("CLASS new\nfields = [is, let]\nmethods = {\n  clone -> [is, cast]\n}\n\nCLASS call\nbase = new\n").unwrap();
        let classes = &program.classes;
        let new = classes.get("new").unwrap();
        let call = classes.get("call").unwrap();
        assert_eq!(classes.base_name(call), Some("new"));
        assert_eq!(classes.all_fields(call), vec!["is", "let"]);
        assert_eq!(
            classes.lookup_method(new, "clone").unwrap().body,
            vec![
                MethodToken::Field(String::from("is")),
                MethodToken::Field(String::from("cast")),
            ]
        );
    }

    #[test]
    fn test_that_program_without_classes_keeps_statements() {
        let program = load("\n\nx is A\n").unwrap();
        assert!(program.classes.is_empty());
        assert_eq!(program.statements.len(), 1);
        assert_eq!(program.statements[0].line, 3);
    }
}
