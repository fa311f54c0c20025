use std::fmt;
use std::rc::Rc;

use dws_ir::{Name, Position};

use crate::errors::EvalBacktrace;
use crate::types::ClassInfo;

use super::ObjectRef;

/// A raised script exception.
///
/// The object instance is shared with any handler variable bound to it;
/// `message` is the instance's `Message` field at raise time.
#[derive(Clone)]
pub struct ExceptionValue {
    pub class: Rc<ClassInfo>,
    pub instance: ObjectRef,
    pub message: String,
    /// Where the `raise` happened.
    pub position: Position,
    /// Call stack at raise time, most recent call first.
    pub call_stack: EvalBacktrace,
}

impl ExceptionValue {
    pub fn class_name(&self) -> &Name {
        &self.class.name
    }

    /// Whether the exception's class is `class_name` or derives from it.
    pub fn is_instance_of(&self, class_name: &Name) -> bool {
        self.class.inherits_from(class_name)
    }
}

impl fmt::Debug for ExceptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExceptionValue")
            .field("class", &self.class.name)
            .field("message", &self.message)
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}
