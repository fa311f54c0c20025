//! Evaluation modes for the DWScript interpreter.
//!
//! Parameterizes the evaluator via an `EvalMode` enum so script runs and
//! test runs use distinct policies. Enum dispatch, queried through policy
//! methods.

/// Evaluation mode - determines interpreter behavior via match dispatch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EvalMode {
    /// Running a script: output goes to stdout.
    #[default]
    Interpret,
    /// Running under a test harness: output is captured, recursion is
    /// bounded tighter.
    TestRun,
}

impl EvalMode {
    /// Whether `Print`/`PrintLn` write to the process's stdout by default.
    #[inline]
    pub fn allows_io(self) -> bool {
        matches!(self, Self::Interpret)
    }

    /// Default maximum call depth before `EScriptStackOverflow` is raised.
    #[inline]
    pub fn max_recursion_depth(self) -> usize {
        match self {
            Self::Interpret => 1024,
            Self::TestRun => 256,
        }
    }
}
