//! Names interned once at `Interpreter` construction.
//!
//! Creating a `Name` allocates; these are looked up on every identifier
//! resolution, member access and routine call.

use dws_ir::Name;

/// Identifiers the evaluator looks up on hot paths, built once.
pub(crate) struct KnownNames {
    pub(crate) self_: Name,
    pub(crate) result: Name,
    pub(crate) message: Name,
    pub(crate) exception_class: Name,
    pub(crate) except_object: Name,
    pub(crate) free: Name,
    pub(crate) class_name: Name,
    pub(crate) length: Name,
    pub(crate) count: Name,
    pub(crate) low: Name,
    pub(crate) high: Name,
}

impl KnownNames {
    pub(crate) fn new() -> Self {
        KnownNames {
            self_: Name::new("Self"),
            result: Name::new("Result"),
            message: Name::new("Message"),
            exception_class: Name::new("ExceptionClass"),
            except_object: Name::new("ExceptObject"),
            free: Name::new("Free"),
            class_name: Name::new("ClassName"),
            length: Name::new("Length"),
            count: Name::new("Count"),
            low: Name::new("Low"),
            high: Name::new("High"),
        }
    }
}
