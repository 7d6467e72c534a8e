pub trait Error {
    fn message(&self) -> String;
    fn line(&self) -> usize;

    fn description(&self) -> String {
        format!("[line: {}] Error: {}", self.line(), self.message())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScanError {
    #[error("Unknown symbol {0}")]
    UnknownSymbol(char),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoadErrorKind {
    #[error("Unknown base class {base} for {class}")]
    UnknownBaseClass { class: String, base: String },
    #[error("Field {field} in class {class} already defined in base class or class itself")]
    DuplicateField { class: String, field: String },
    #[error("Class {0} defined multiple times")]
    DuplicateClass(String),
    #[error("Class {0} is part of an inheritance cycle")]
    InheritanceCycle(String),
    #[error("{0}")]
    Malformed(String),
}

/// Failure to turn source text into a resolved class table and statement list.
/// Nothing has been executed when one of these is reported.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind}")]
pub struct LoadError {
    pub line: usize,
    pub kind: LoadErrorKind,
}

impl LoadError {
    pub fn new(line: usize, kind: LoadErrorKind) -> Self {
        Self { line, kind }
    }

    pub fn malformed(line: usize, message: impl Into<String>) -> Self {
        Self::new(line, LoadErrorKind::Malformed(message.into()))
    }
}

impl Error for LoadError {
    fn message(&self) -> String {
        self.kind.to_string()
    }

    fn line(&self) -> usize {
        self.line
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuntimeErrorKind {
    #[error("Unknown variable {0}")]
    UnknownVariable(String),
    #[error("Unknown class {0}")]
    UnknownClass(String),
    #[error("Unknown field {field} for instance of {class}")]
    UnknownField { class: String, field: String },
    #[error("Unknown field {field} in method {method}")]
    UnknownFieldInMethod { method: String, field: String },
    #[error("Class {class} expects {expected} args, got {found}")]
    ArityMismatch {
        class: String,
        expected: usize,
        found: usize,
    },
    #[error("Only int literals allowed as constructor args, found {0}")]
    InvalidConstructorArg(String),
    #[error("Only int literals allowed in field assignment, found {0}")]
    InvalidAssignedValue(String),
    #[error("Cannot cast {from} to {to}")]
    InvalidCast { from: String, to: String },
    #[error("Method {method} not found in view type {view} or its bases")]
    MethodNotFound { method: String, view: String },
    #[error("Unknown statement: {0}")]
    UnknownStatement(String),
}

/// Failure while executing one statement. Statements before it keep their effects.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind}")]
pub struct RuntimeError {
    pub line: usize,
    pub kind: RuntimeErrorKind,
}

impl RuntimeError {
    pub fn new(line: usize, kind: RuntimeErrorKind) -> Self {
        Self { line, kind }
    }
}

impl Error for RuntimeError {
    fn message(&self) -> String {
        self.kind.to_string()
    }

    fn line(&self) -> usize {
        self.line
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProgramError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl Error for ProgramError {
    fn message(&self) -> String {
        match self {
            ProgramError::Load(error) => error.message(),
            ProgramError::Runtime(error) => error.message(),
        }
    }

    fn line(&self) -> usize {
        match self {
            ProgramError::Load(error) => error.line,
            ProgramError::Runtime(error) => error.line,
        }
    }
}
