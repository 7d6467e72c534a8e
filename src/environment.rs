use crate::error::RuntimeErrorKind;
use crate::object::Binding;
use std::collections::BTreeMap;

/// Program-wide variables. There is a single scope: the latest `let` wins.
pub struct Environment {
    values: BTreeMap<String, Binding>,
}

impl Environment {
    pub fn new() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    pub fn define(&mut self, name: String, value: Binding) {
        self.values.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Result<&Binding, RuntimeErrorKind> {
        self.values
            .get(name)
            .ok_or_else(|| RuntimeErrorKind::UnknownVariable(name.to_string()))
    }

    pub fn lookup(&self, name: &str) -> Option<&Binding> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Bindings in lexicographic order of their variable names.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Binding)> {
        self.values.iter().map(|(name, binding)| (name.as_str(), binding))
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
