use crate::expression::Expression;

#[derive(Debug, PartialEq, Clone)]
pub enum Statement {
    Let {
        name: String,
        value: Expression,
    },
    FieldAssignment {
        variable: String,
        field: String,
        value: i64,
    },
    Call {
        variable: String,
        method: String,
    },
    TypeTest {
        variable: String,
        class: String,
    },
}

pub trait Visitor<T> {
    fn visit_let(&mut self, name: &str, value: &Expression) -> T;
    fn visit_field_assignment(&mut self, variable: &str, field: &str, value: i64) -> T;
    fn visit_call(&mut self, variable: &str, method: &str) -> T;
    fn visit_type_test(&mut self, variable: &str, class: &str) -> T;
}

impl Statement {
    pub fn accept<T, V: Visitor<T>>(&self, visitor: &mut V) -> T {
        match self {
            Statement::Let { name, value } => visitor.visit_let(name, value),
            Statement::FieldAssignment {
                variable,
                field,
                value,
            } => visitor.visit_field_assignment(variable, field, *value),
            Statement::Call { variable, method } => visitor.visit_call(variable, method),
            Statement::TypeTest { variable, class } => visitor.visit_type_test(variable, class),
        }
    }
}
