use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use dws_ir::Name;

use crate::types::{ClassInfo, InterfaceInfo};

use super::Value;

/// A class instance. Fields are laid out in `ClassInfo` order, inherited
/// fields first.
pub struct ObjectInstance {
    pub class: Rc<ClassInfo>,
    pub fields: Vec<Value>,
}

/// Shared handle to an object.
#[derive(Clone)]
pub struct ObjectRef(Rc<RefCell<ObjectInstance>>);

impl ObjectRef {
    pub fn new(class: Rc<ClassInfo>, fields: Vec<Value>) -> Self {
        ObjectRef(Rc::new(RefCell::new(ObjectInstance { class, fields })))
    }

    pub fn class(&self) -> Rc<ClassInfo> {
        Rc::clone(&self.0.borrow().class)
    }

    pub fn class_name(&self) -> Name {
        self.0.borrow().class.name.clone()
    }

    pub fn get_field(&self, name: &Name) -> Option<Value> {
        let obj = self.0.borrow();
        let index = obj.class.field_index(name)?;
        obj.fields.get(index).cloned()
    }

    /// Returns `false` if the class declares no such field.
    pub fn set_field(&self, name: &Name, value: Value) -> bool {
        let mut obj = self.0.borrow_mut();
        let Some(index) = obj.class.field_index(name) else {
            return false;
        };
        match obj.fields.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectRef({})", self.class_name())
    }
}

/// An object viewed through one of its interfaces.
#[derive(Clone)]
pub struct InterfaceValue {
    pub info: Rc<InterfaceInfo>,
    pub object: ObjectRef,
}
