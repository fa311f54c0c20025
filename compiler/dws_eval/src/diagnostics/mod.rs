//! Call-stack tracking for diagnostics and recursion limiting.
//!
//! Every script-level call (routine, method, lambda, host callback) pushes a
//! `CallFrame`; the frame is popped by the call guard on every exit path.
//! Raised exceptions and internal errors snapshot the stack as an
//! `EvalBacktrace`.

use dws_ir::{Name, Position};

use crate::errors::{recursion_limit_exceeded, BacktraceFrame, EvalBacktrace, EvalError};

/// A single frame in the live call stack.
#[derive(Clone, Debug)]
pub struct CallFrame {
    /// Routine name, `Class.Method` for methods, `<lambda>` for lambdas.
    pub name: Name,
    /// Where the call was made.
    pub call_position: Position,
}

impl CallFrame {
    pub fn new(name: Name, call_position: Position) -> Self {
        CallFrame {
            name,
            call_position,
        }
    }
}

/// Live call stack for the interpreter.
///
/// The depth check is part of `push`, so a call that would exceed the limit
/// never starts.
///
/// ```ignore
/// let mut stack = CallStack::new(1024);
/// stack.push(CallFrame::new(name, pos))?;
/// // ... evaluate the body ...
/// stack.pop();
/// ```
#[derive(Clone, Debug)]
pub struct CallStack {
    frames: Vec<CallFrame>,
    max_depth: usize,
}

impl CallStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            frames: Vec::new(),
            max_depth,
        }
    }

    /// Push a call frame, checking the depth limit.
    ///
    /// The frame is NOT pushed on overflow.
    pub fn push(&mut self, frame: CallFrame) -> Result<(), EvalError> {
        if self.frames.len() >= self.max_depth {
            return Err(recursion_limit_exceeded(self.max_depth));
        }
        self.frames.push(frame);
        Ok(())
    }

    pub fn pop(&mut self) {
        debug_assert!(
            !self.frames.is_empty(),
            "CallStack::pop() called on empty stack"
        );
        self.frames.pop();
    }

    /// Drop frames above `depth`. Used to recover after a host panic
    /// unwound through interpreter calls.
    pub fn truncate(&mut self, depth: usize) {
        self.frames.truncate(depth);
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    #[inline]
    pub fn current_frame(&self) -> Option<&CallFrame> {
        self.frames.last()
    }

    /// Snapshot of the stack, most recent call first.
    pub fn capture(&self) -> EvalBacktrace {
        let frames = self
            .frames
            .iter()
            .rev()
            .map(|f| BacktraceFrame {
                name: f.name.to_string(),
                position: (!f.call_position.is_dummy()).then_some(f.call_position),
            })
            .collect();
        EvalBacktrace::new(frames)
    }

    /// Attach a snapshot of this stack to an error that has none yet.
    pub fn attach_backtrace(&self, err: EvalError) -> EvalError {
        if self.frames.is_empty() {
            return err;
        }
        err.with_backtrace(self.capture())
    }
}
