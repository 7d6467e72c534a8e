use crate::error::{LoadError, LoadErrorKind};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt::{self, Display, Formatter};
use tracing::debug;

/// Index of a resolved class inside its `ClassTable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodToken {
    Literal(i64),
    Field(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub name: String,
    pub body: Vec<MethodToken>,
}

/// A class exactly as the loader read it: the base is still a name.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDeclaration {
    pub name: String,
    pub base: Option<String>,
    pub fields: Vec<String>,
    pub methods: Vec<Method>,
    pub line: usize,
}

#[derive(Debug)]
pub struct Class {
    pub name: String,
    pub base: Option<ClassId>,
    pub fields: Vec<String>,
    pub methods: Vec<Method>,
    pub line: usize,
}

pub struct ClassTable {
    classes: Vec<Class>,
    names: BTreeMap<String, ClassId>,
}

pub struct Ancestors<'a> {
    table: &'a ClassTable,
    next: Option<ClassId>,
}

impl Display for MethodToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            MethodToken::Literal(value) => write!(f, "{}", value),
            MethodToken::Field(name) => write!(f, "{}", name),
        }
    }
}

impl ClassDeclaration {
    pub fn new(name: String, line: usize) -> Self {
        Self {
            name,
            base: None,
            fields: Vec::new(),
            methods: Vec::new(),
            line,
        }
    }

    /// A repeated method name replaces the earlier body in place.
    pub fn define_method(&mut self, name: String, body: Vec<MethodToken>) {
        match self.methods.iter_mut().find(|method| method.name == name) {
            Some(method) => method.body = body,
            None => self.methods.push(Method { name, body }),
        }
    }
}

impl Class {
    pub fn find_own_method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|method| method.name == name)
    }
}

impl ClassTable {
    pub fn resolve(declarations: Vec<ClassDeclaration>) -> Result<Self, LoadError> {
        let mut names = BTreeMap::new();
        for (index, declaration) in declarations.iter().enumerate() {
            if names
                .insert(declaration.name.clone(), ClassId(index))
                .is_some()
            {
                return Err(LoadError::new(
                    declaration.line,
                    LoadErrorKind::DuplicateClass(declaration.name.clone()),
                ));
            }
        }

        let classes = declarations
            .into_iter()
            .map(|declaration| {
                let base = match declaration.base {
                    Some(base_name) => match names.get(&base_name) {
                        Some(id) => Some(*id),
                        None => {
                            return Err(LoadError::new(
                                declaration.line,
                                LoadErrorKind::UnknownBaseClass {
                                    class: declaration.name,
                                    base: base_name,
                                },
                            ))
                        }
                    },
                    None => None,
                };
                Ok(Class {
                    name: declaration.name,
                    base,
                    fields: declaration.fields,
                    methods: declaration.methods,
                    line: declaration.line,
                })
            })
            .collect::<Result<Vec<Class>, LoadError>>()?;

        let table = Self { classes, names };
        table.check_cycles()?;
        table.check_fields()?;
        debug!(classes = table.classes.len(), "class table resolved");
        Ok(table)
    }

    fn check_cycles(&self) -> Result<(), LoadError> {
        for start in 0..self.classes.len() {
            let mut visited = HashSet::new();
            let mut current = Some(ClassId(start));
            while let Some(id) = current {
                if !visited.insert(id) {
                    let class = self.class(id);
                    return Err(LoadError::new(
                        class.line,
                        LoadErrorKind::InheritanceCycle(class.name.clone()),
                    ));
                }
                current = self.class(id).base;
            }
        }
        Ok(())
    }

    fn check_fields(&self) -> Result<(), LoadError> {
        for class in &self.classes {
            let mut seen: HashSet<&str> = match class.base {
                Some(base) => self.all_fields(base).into_iter().collect(),
                None => HashSet::new(),
            };
            for field in &class.fields {
                if !seen.insert(field.as_str()) {
                    return Err(LoadError::new(
                        class.line,
                        LoadErrorKind::DuplicateField {
                            class: class.name.clone(),
                            field: field.clone(),
                        },
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<ClassId> {
        self.names.get(name).copied()
    }

    pub fn class(&self, id: ClassId) -> &Class {
        &self.classes[id.0]
    }

    pub fn name(&self, id: ClassId) -> &str {
        &self.class(id).name
    }

    pub fn base_name(&self, id: ClassId) -> Option<&str> {
        self.class(id).base.map(|base| self.name(base))
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Classes in lexicographic order of their names.
    pub fn iter(&self) -> impl Iterator<Item = (ClassId, &Class)> + '_ {
        self.names.values().map(move |id| (*id, self.class(*id)))
    }

    /// Walks from `id` itself up to the root of its hierarchy.
    pub fn ancestors(&self, id: ClassId) -> Ancestors<'_> {
        Ancestors {
            table: self,
            next: Some(id),
        }
    }

    /// Inherited fields root first, then the class's own fields. This is also
    /// the constructor argument order.
    pub fn all_fields(&self, id: ClassId) -> Vec<&str> {
        let mut chain: Vec<&Class> = self.ancestors(id).map(|(_, class)| class).collect();
        chain.reverse();
        chain
            .into_iter()
            .flat_map(|class| class.fields.iter().map(String::as_str))
            .collect()
    }

    pub fn is_subclass_of(&self, class: ClassId, other: ClassId) -> bool {
        self.ancestors(class).any(|(id, _)| id == other)
    }

    pub fn lookup_method(&self, class: ClassId, name: &str) -> Option<&Method> {
        self.ancestors(class)
            .find_map(|(_, class)| class.find_own_method(name))
    }

    /// Every method name callable through a binding viewed as `class`.
    pub fn reachable_methods(&self, class: ClassId) -> BTreeSet<&str> {
        self.ancestors(class)
            .flat_map(|(_, class)| class.methods.iter().map(|method| method.name.as_str()))
            .collect()
    }
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = (ClassId, &'a Class);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let class = self.table.class(id);
        self.next = class.base;
        Some((id, class))
    }
}
