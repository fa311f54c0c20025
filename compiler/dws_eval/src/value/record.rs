use std::cell::RefCell;
use std::rc::Rc;

use dws_ir::Name;

use crate::types::RecordType;

use super::Value;

struct RecordData {
    ty: Rc<RecordType>,
    fields: Vec<Value>,
}

/// Record storage. Field values are laid out in the type's field order.
#[derive(Clone)]
pub struct RecordValue(Rc<RefCell<RecordData>>);

impl RecordValue {
    pub fn new(ty: Rc<RecordType>, fields: Vec<Value>) -> Self {
        RecordValue(Rc::new(RefCell::new(RecordData { ty, fields })))
    }

    pub fn ty(&self) -> Rc<RecordType> {
        Rc::clone(&self.0.borrow().ty)
    }

    pub fn type_name(&self) -> Name {
        self.0.borrow().ty.name.clone()
    }

    pub fn get_field(&self, name: &Name) -> Option<Value> {
        let data = self.0.borrow();
        let index = data.ty.field_index(name)?;
        data.fields.get(index).cloned()
    }

    /// Returns `false` if the record type has no such field.
    pub fn set_field(&self, name: &Name, value: Value) -> bool {
        let mut data = self.0.borrow_mut();
        let Some(index) = data.ty.field_index(name) else {
            return false;
        };
        match data.fields.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// `(name, value)` pairs in declaration order.
    pub fn fields(&self) -> Vec<(Name, Value)> {
        let data = self.0.borrow();
        data.ty
            .fields()
            .iter()
            .zip(&data.fields)
            .map(|(f, v)| (f.name.clone(), v.clone()))
            .collect()
    }

    pub fn ptr_eq(&self, other: &RecordValue) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn deep_copy(&self) -> RecordValue {
        let data = self.0.borrow();
        let fields = data.fields.iter().map(Value::copy_for_assignment).collect();
        RecordValue::new(Rc::clone(&data.ty), fields)
    }
}
