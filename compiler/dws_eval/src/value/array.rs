use std::cell::RefCell;
use std::rc::Rc;

use crate::types::ArrayType;

use super::Value;

struct ArrayData {
    ty: Rc<ArrayType>,
    elements: Vec<Value>,
}

/// Array storage shared by every alias of the same array.
///
/// A static array's element count always equals its declared bounds'
/// length; dynamic arrays are zero-based and growable.
#[derive(Clone)]
pub struct ArrayValue(Rc<RefCell<ArrayData>>);

impl ArrayValue {
    pub fn new(ty: Rc<ArrayType>, elements: Vec<Value>) -> Self {
        ArrayValue(Rc::new(RefCell::new(ArrayData { ty, elements })))
    }

    pub fn ty(&self) -> Rc<ArrayType> {
        Rc::clone(&self.0.borrow().ty)
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.0.borrow().ty.bounds.is_some()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the elements.
    pub fn elements(&self) -> Vec<Value> {
        self.0.borrow().elements.clone()
    }

    /// Element at a physical offset.
    pub fn get(&self, offset: usize) -> Option<Value> {
        self.0.borrow().elements.get(offset).cloned()
    }

    /// Replace the element at a physical offset. Returns `false` when out of range.
    pub fn set(&self, offset: usize, value: Value) -> bool {
        match self.0.borrow_mut().elements.get_mut(offset) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn push(&self, value: Value) {
        self.0.borrow_mut().elements.push(value);
    }

    /// Remove the element at a physical offset.
    pub fn remove(&self, offset: usize) -> Option<Value> {
        let mut data = self.0.borrow_mut();
        if offset < data.elements.len() {
            Some(data.elements.remove(offset))
        } else {
            None
        }
    }

    /// Grow or shrink in place, filling new slots from `fill`.
    pub fn resize_with(&self, len: usize, fill: impl FnMut() -> Value) {
        self.0.borrow_mut().elements.resize_with(len, fill);
    }

    /// Inclusive script-level bounds: the declared bounds for static
    /// arrays, `0..len-1` for dynamic ones.
    pub fn bounds(&self) -> (i64, i64) {
        let data = self.0.borrow();
        match data.ty.bounds {
            Some(b) => (b.low, b.high),
            None => {
                let len = i64::try_from(data.elements.len()).unwrap_or(i64::MAX);
                (0, len.saturating_sub(1))
            }
        }
    }

    /// Translate a script index into a physical offset.
    ///
    /// Returns the inclusive bounds on failure so the caller can report them.
    pub fn offset_of(&self, index: i64) -> Result<usize, (i64, i64)> {
        let (low, high) = self.bounds();
        if index < low || index > high {
            return Err((low, high));
        }
        usize::try_from(index.saturating_sub(low)).map_err(|_| (low, high))
    }

    pub fn ptr_eq(&self, other: &ArrayValue) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Independent copy; nested static arrays and records are copied too.
    pub fn deep_copy(&self) -> ArrayValue {
        let data = self.0.borrow();
        let elements = data
            .elements
            .iter()
            .map(Value::copy_for_assignment)
            .collect();
        ArrayValue::new(Rc::clone(&data.ty), elements)
    }
}
