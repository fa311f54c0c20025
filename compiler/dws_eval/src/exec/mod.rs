//! Statement execution support: control-flow signals and the script
//! exception state.
//!
//! - `ControlAction` is what a statement hands back to its enclosing loop or
//!   routine (`break`, `continue`, `exit`).
//! - `exceptions` holds the pending script exception and the stack of active
//!   handler and finally frames.
//!
//! Script exceptions are deliberately not part of `ControlAction`: they are
//! state, checked by every statement list, loop and compound expression
//! after each sub-evaluation.

mod exceptions;

pub use exceptions::{ExceptionState, FrameKind, HandlerFrame};

use crate::errors::EvalError;

/// Non-exceptional control transfer out of a statement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlAction {
    /// Fall through to the next statement.
    Normal,
    Break,
    Continue,
    /// Leave the current routine; `Result` already holds the return value.
    Exit,
}

impl ControlAction {
    #[inline]
    pub fn is_normal(self) -> bool {
        matches!(self, ControlAction::Normal)
    }
}

/// Result of executing a statement.
pub type ExecResult = Result<ControlAction, EvalError>;
