use crate::class::{ClassTable, MethodToken};
use crate::environment::Environment;
use crate::error::{RuntimeError, RuntimeErrorKind};
use crate::expression::{self, Expression};
use crate::loader::SourceStatement;
use crate::object::{Binding, Instance};
use crate::parser::Parser;
use crate::scanner::Scanner;
use crate::statement;
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use tracing::{debug, trace};

pub struct Interpreter {
    classes: ClassTable,
    environment: Environment,
}

/// What a statement prints: the values of a `call`, or the verdict of `is`.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Call(Vec<i64>),
    TypeTest(bool),
}

type ExecResult = Result<Option<Output>, RuntimeErrorKind>;
type EvalResult = Result<Binding, RuntimeErrorKind>;

impl Interpreter {
    pub fn new(classes: ClassTable) -> Self {
        Self {
            classes,
            environment: Environment::new(),
        }
    }

    pub fn classes(&self) -> &ClassTable {
        &self.classes
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Runs statements in order and stops at the first failure. Effects of
    /// the statements before it are kept.
    pub fn interpret<F>(&mut self, statements: &[SourceStatement], mut emit: F) -> Result<(), RuntimeError>
    where
        F: FnMut(&Output),
    {
        for statement in statements {
            if let Some(output) = self.execute(statement)? {
                emit(&output);
            }
        }
        Ok(())
    }

    pub fn execute(&mut self, statement: &SourceStatement) -> Result<Option<Output>, RuntimeError> {
        let line = statement.line;
        let tokens = Scanner::new(&statement.text, line)
            .scan_tokens()
            .map_err(|error| {
                debug!(line, %error, "statement failed to scan");
                RuntimeError::new(
                    line,
                    RuntimeErrorKind::UnknownStatement(statement.text.trim().to_string()),
                )
            })?;
        // Nothing left once the comment is stripped.
        if tokens.len() == 1 {
            return Ok(None);
        }
        let parsed = Parser::new(&tokens, &statement.text)
            .parse()
            .map_err(|kind| RuntimeError::new(line, kind))?;
        trace!(line, statement = ?parsed, "executing statement");
        parsed
            .accept(self)
            .map_err(|kind| RuntimeError::new(line, kind))
    }
}

impl statement::Visitor<ExecResult> for Interpreter {
    fn visit_let(&mut self, name: &str, value: &Expression) -> ExecResult {
        let binding = value.accept(self)?;
        debug!(
            variable = name,
            view = self.classes.name(binding.view()),
            runtime = self.classes.name(binding.runtime_class()),
            "binding defined"
        );
        self.environment.define(name.to_string(), binding);
        Ok(None)
    }

    fn visit_field_assignment(&mut self, variable: &str, field: &str, value: i64) -> ExecResult {
        let binding = self.environment.get(variable)?;
        let mut instance = binding.instance_mut();
        if !instance.set(field, value) {
            return Err(RuntimeErrorKind::UnknownField {
                class: self.classes.name(instance.class()).to_string(),
                field: field.to_string(),
            });
        }
        Ok(None)
    }

    /// Methods resolve from the binding's view class, never its runtime
    /// class. Field tokens read the shared instance.
    fn visit_call(&mut self, variable: &str, method_name: &str) -> ExecResult {
        let binding = self.environment.get(variable)?;
        let view = binding.view();
        let method = self
            .classes
            .lookup_method(view, method_name)
            .ok_or_else(|| RuntimeErrorKind::MethodNotFound {
                method: method_name.to_string(),
                view: self.classes.name(view).to_string(),
            })?;
        trace!(variable, method = method_name, view = self.classes.name(view), "method resolved");

        let instance = binding.instance();
        let values = method
            .body
            .iter()
            .map(|token| match token {
                MethodToken::Literal(value) => Ok(*value),
                MethodToken::Field(field) => {
                    instance
                        .get(field)
                        .ok_or_else(|| RuntimeErrorKind::UnknownFieldInMethod {
                            method: method_name.to_string(),
                            field: field.clone(),
                        })
                }
            })
            .collect::<Result<Vec<i64>, RuntimeErrorKind>>()?;
        Ok(Some(Output::Call(values)))
    }

    /// Unknown variables or classes give a negative verdict instead of an error.
    fn visit_type_test(&mut self, variable: &str, class: &str) -> ExecResult {
        let verdict = match (self.environment.lookup(variable), self.classes.get(class)) {
            (Some(binding), Some(class)) => {
                self.classes.is_subclass_of(binding.runtime_class(), class)
            }
            _ => false,
        };
        Ok(Some(Output::TypeTest(verdict)))
    }
}

impl expression::Visitor<EvalResult> for Interpreter {
    fn visit_new(&mut self, class_name: &str, arguments: &[i64]) -> EvalResult {
        let class = self
            .classes
            .get(class_name)
            .ok_or_else(|| RuntimeErrorKind::UnknownClass(class_name.to_string()))?;
        let fields = self.classes.all_fields(class);
        if fields.len() != arguments.len() {
            return Err(RuntimeErrorKind::ArityMismatch {
                class: class_name.to_string(),
                expected: fields.len(),
                found: arguments.len(),
            });
        }
        let values: HashMap<String, i64> = fields
            .into_iter()
            .map(String::from)
            .zip(arguments.iter().copied())
            .collect();
        Ok(Binding::new(Instance::new(class, values)))
    }

    fn visit_clone(&mut self, source: &str) -> EvalResult {
        Ok(self.environment.get(source)?.clone_instance())
    }

    fn visit_cast(&mut self, target: &str, source: &str) -> EvalResult {
        let binding = self.environment.get(source)?;
        let target_class = self
            .classes
            .get(target)
            .ok_or_else(|| RuntimeErrorKind::UnknownClass(target.to_string()))?;
        binding
            .upcast(target_class, &self.classes)
            .ok_or_else(|| RuntimeErrorKind::InvalidCast {
                from: self.classes.name(binding.runtime_class()).to_string(),
                to: target.to_string(),
            })
    }

    fn visit_variable(&mut self, name: &str) -> EvalResult {
        Ok(self.environment.get(name)?.alias())
    }
}

impl Display for Output {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Output::Call(values) => {
                let values: Vec<String> = values.iter().map(i64::to_string).collect();
                write!(f, "{}", values.join(" "))
            }
            Output::TypeTest(true) => write!(f, "IS"),
            Output::TypeTest(false) => write!(f, "ISN'T"),
        }
    }
}
