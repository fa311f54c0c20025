//! Read-only view of the semantic analyzer's results.
//!
//! The analyzer runs before evaluation and may annotate expressions with
//! their resolved types. The evaluator consults these annotations when
//! present and falls back to runtime inference when they are missing, so
//! every method here is optional by construction.

use rustc_hash::FxHashMap;

use crate::{ExprId, TypeExpr};

/// Node-to-type lookup provided by the semantic pass.
pub trait SemanticInfo {
    /// The resolved type of an expression, if the analyzer recorded one.
    fn type_of(&self, id: ExprId) -> Option<&TypeExpr>;
}

/// A plain map-backed side table.
#[derive(Clone, Debug, Default)]
pub struct SemanticTable {
    types: FxHashMap<ExprId, TypeExpr>,
}

impl SemanticTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, id: ExprId, ty: TypeExpr) {
        self.types.insert(id, ty);
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl SemanticInfo for SemanticTable {
    fn type_of(&self, id: ExprId) -> Option<&TypeExpr> {
        self.types.get(&id)
    }
}
