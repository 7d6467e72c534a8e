use crate::class::{ClassId, ClassTable};
use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

#[derive(Clone)]
pub struct Instance {
    class: ClassId,
    fields: HashMap<String, i64>,
}

/// A variable's view of an instance. The instance is shared with every alias
/// and cast of the same variable; `view` only decides which methods resolve.
#[derive(Clone)]
pub struct Binding {
    instance: Rc<RefCell<Instance>>,
    view: ClassId,
}

impl Instance {
    pub fn new(class: ClassId, fields: HashMap<String, i64>) -> Self {
        Self { class, fields }
    }

    pub fn class(&self) -> ClassId {
        self.class
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        self.fields.get(name).copied()
    }

    /// Overwrites an existing field. Returns `false` when the instance has no
    /// such field, leaving it untouched.
    pub fn set(&mut self, name: &str, value: i64) -> bool {
        match self.fields.get_mut(name) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }
}

impl Binding {
    /// A fresh instance is always viewed as its own class.
    pub fn new(instance: Instance) -> Self {
        let view = instance.class;
        Self {
            instance: Rc::new(RefCell::new(instance)),
            view,
        }
    }

    /// Same instance, same view.
    pub fn alias(&self) -> Self {
        self.clone()
    }

    /// Independent copy of the instance that keeps this binding's view.
    pub fn clone_instance(&self) -> Self {
        let copy = self.instance.as_ref().borrow().clone();
        Self {
            instance: Rc::new(RefCell::new(copy)),
            view: self.view,
        }
    }

    /// Same instance seen through `target`, allowed only when the runtime
    /// class is `target` or derives from it.
    pub fn upcast(&self, target: ClassId, classes: &ClassTable) -> Option<Self> {
        if !classes.is_subclass_of(self.runtime_class(), target) {
            return None;
        }
        Some(Self {
            instance: self.instance.clone(),
            view: target,
        })
    }

    pub fn view(&self) -> ClassId {
        self.view
    }

    pub fn runtime_class(&self) -> ClassId {
        self.instance.as_ref().borrow().class
    }

    pub fn instance(&self) -> Ref<'_, Instance> {
        self.instance.as_ref().borrow()
    }

    pub fn instance_mut(&self) -> RefMut<'_, Instance> {
        self.instance.as_ref().borrow_mut()
    }

    pub fn shares_instance_with(&self, other: &Binding) -> bool {
        Rc::ptr_eq(&self.instance, &other.instance)
    }
}

impl Debug for Instance {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "instance of {:?}", self.class)
    }
}

impl Debug for Binding {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} viewed as {:?}", self.instance.as_ref().borrow(), self.view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::ClassDeclaration;

    fn table() -> ClassTable {
        let mut a = ClassDeclaration::new(String::from("A"), 1);
        a.fields = vec![String::from("a")];
        let mut b = ClassDeclaration::new(String::from("B"), 2);
        b.base = Some(String::from("A"));
        ClassTable::resolve(vec![a, b]).unwrap()
    }

    fn instance_of(class: ClassId, a: i64) -> Instance {
        let mut fields = HashMap::new();
        fields.insert(String::from("a"), a);
        Instance::new(class, fields)
    }

    #[test]
    fn test_that_alias_shares_mutations() {
        let classes = table();
        let original = Binding::new(instance_of(classes.get("A").unwrap(), 1));
        let alias = original.alias();
        assert!(alias.instance_mut().set("a", 9));
        assert_eq!(original.instance().get("a"), Some(9));
        assert!(alias.shares_instance_with(&original));
    }

    #[test]
    fn test_that_cloned_instance_is_independent() {
        let classes = table();
        let original = Binding::new(instance_of(classes.get("B").unwrap(), 1));
        let copy = original.clone_instance();
        copy.instance_mut().set("a", 5);
        original.instance_mut().set("a", 7);
        assert_eq!(copy.instance().get("a"), Some(5));
        assert_eq!(original.instance().get("a"), Some(7));
        assert!(!copy.shares_instance_with(&original));
    }

    #[test]
    fn test_that_upcast_keeps_instance_and_changes_view() {
        let classes = table();
        let a = classes.get("A").unwrap();
        let b = classes.get("B").unwrap();
        let derived = Binding::new(instance_of(b, 1));
        let viewed = derived.upcast(a, &classes).unwrap();
        assert_eq!(viewed.view(), a);
        assert_eq!(viewed.runtime_class(), b);
        assert!(viewed.shares_instance_with(&derived));

        let base = Binding::new(instance_of(a, 1));
        assert!(base.upcast(b, &classes).is_none());
    }

    #[test]
    fn test_that_setting_missing_field_is_refused() {
        let classes = table();
        let binding = Binding::new(instance_of(classes.get("A").unwrap(), 1));
        assert!(!binding.instance_mut().set("b", 3));
        assert_eq!(binding.instance().get("b"), None);
    }
}
