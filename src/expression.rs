pub trait Visitor<Result> {
    fn visit_new(&mut self, class: &str, arguments: &[i64]) -> Result;
    fn visit_clone(&mut self, source: &str) -> Result;
    fn visit_cast(&mut self, target: &str, source: &str) -> Result;
    fn visit_variable(&mut self, name: &str) -> Result;
}

/// Right-hand side of a `let` statement.
#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    New { class: String, arguments: Vec<i64> },
    Clone(String),
    Cast { target: String, source: String },
    Variable(String),
}

impl Expression {
    pub fn accept<T, V: Visitor<T>>(&self, visitor: &mut V) -> T {
        match self {
            Expression::New { class, arguments } => visitor.visit_new(class, arguments),
            Expression::Clone(source) => visitor.visit_clone(source),
            Expression::Cast { target, source } => visitor.visit_cast(target, source),
            Expression::Variable(name) => visitor.visit_variable(name),
        }
    }
}
