//! Script exception state.
//!
//! The interpreter is in exactly one of these states:
//!
//! | State                 | `active` | frames                         |
//! |-----------------------|----------|--------------------------------|
//! | running               | `None`   | no `Handler` frame             |
//! | exception active      | `Some`   | any                            |
//! | handling an exception | `None`   | innermost `Handler` frame set  |
//!
//! A `try` statement moves between them: a matching handler takes the
//! active exception into a `Handler` frame, and a `finally` block parks it
//! in a `Finally` frame while its own statements run.

use crate::value::ExceptionValue;

/// What kind of block pushed a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameKind {
    /// An `on E do` handler or the catch-all part of `except`.
    Handler,
    Finally,
}

/// An executing handler or finally block and the exception it is about.
#[derive(Clone, Debug)]
pub struct HandlerFrame {
    pub kind: FrameKind,
    /// `None` for a finally block entered without a pending exception.
    pub exception: Option<ExceptionValue>,
}

#[derive(Debug, Default)]
pub struct ExceptionState {
    active: Option<ExceptionValue>,
    frames: Vec<HandlerFrame>,
}

impl ExceptionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an exception is propagating.
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<&ExceptionValue> {
        self.active.as_ref()
    }

    /// Make `exception` the propagating exception, replacing any other.
    pub fn raise(&mut self, exception: ExceptionValue) {
        tracing::debug!(
            class = %exception.class_name(),
            message = %exception.message,
            "exception raised"
        );
        self.active = Some(exception);
    }

    /// Stop propagation, returning the exception that was propagating.
    pub fn take(&mut self) -> Option<ExceptionValue> {
        self.active.take()
    }

    /// Reinstate a saved exception. Used after a finally block that
    /// completed without raising.
    pub fn restore(&mut self, saved: Option<ExceptionValue>) {
        if saved.is_some() {
            self.active = saved;
        }
    }

    pub fn push_frame(&mut self, kind: FrameKind, exception: Option<ExceptionValue>) {
        self.frames.push(HandlerFrame { kind, exception });
    }

    pub fn pop_frame(&mut self) {
        debug_assert!(!self.frames.is_empty(), "pop_frame on empty frame stack");
        self.frames.pop();
    }

    /// The exception a bare `raise` re-raises: the one held by the innermost
    /// executing handler.
    pub fn reraise_target(&self) -> Option<&ExceptionValue> {
        self.frames
            .iter()
            .rev()
            .find(|f| f.kind == FrameKind::Handler)
            .and_then(|f| f.exception.as_ref())
    }

    /// The exception `ExceptObject` refers to: the innermost handler's or
    /// finally block's. A finally block entered without an exception keeps
    /// the enclosing one.
    pub fn current_object(&self) -> Option<&ExceptionValue> {
        self.frames.iter().rev().find_map(|f| f.exception.as_ref())
    }

    pub fn frame_depth(&self) -> usize {
        self.frames.len()
    }

    /// Drop frames above `depth`.
    pub fn truncate_frames(&mut self, depth: usize) {
        self.frames.truncate(depth);
    }
}
