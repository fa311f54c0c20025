//! Stack growth for the DWScript tree walker.
//!
//! Evaluating a script recurses once per nested expression, statement and
//! script-level call. Script recursion is bounded by the interpreter's call
//! stack limit, but a single deeply nested expression (long `a + b + c ...`
//! chains produced by generated code) can still exhaust the native stack
//! before that limit is ever consulted.
//!
//! [`ensure_sufficient_stack`] wraps every recursive evaluation entry point.
//! On native targets it grows the stack with `stacker` when fewer than
//! [`RED_ZONE`] bytes remain; on `wasm32` it is a plain call.

/// Remaining stack below which a new segment is allocated (128 KiB).
///
/// A single evaluator frame for a call expression (argument vectors, scope
/// guard, call-stack bookkeeping) stays well under this.
pub const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment (2 MiB).
pub const STACK_SEGMENT: usize = 2 * 1024 * 1024;

/// Run `f`, growing the native stack first if it is close to exhaustion.
///
/// ```text
/// fn eval_expr(&mut self, expr: &Expr) -> EvalResult {
///     ensure_sufficient_stack(|| self.eval_expr_inner(expr))
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_SEGMENT, f)
}

/// `wasm32` has no `stacker` support; the engine manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::ensure_sufficient_stack;

    /// Mimics a left-leaning binary expression tree of the given depth.
    enum Node {
        Leaf(i64),
        Add(Box<Node>, i64),
    }

    fn build(depth: i64) -> Node {
        let mut node = Node::Leaf(0);
        for i in 1..=depth {
            node = Node::Add(Box::new(node), i);
        }
        node
    }

    fn eval(node: &Node) -> i64 {
        ensure_sufficient_stack(|| match node {
            Node::Leaf(v) => *v,
            Node::Add(lhs, rhs) => eval(lhs) + rhs,
        })
    }

    fn drop_iteratively(mut node: Node) {
        while let Node::Add(inner, _) = node {
            node = *inner;
        }
    }

    #[test]
    fn shallow_tree_evaluates() {
        let tree = build(10);
        assert_eq!(eval(&tree), 55);
        drop_iteratively(tree);
    }

    #[test]
    fn deep_tree_does_not_overflow() {
        let tree = build(200_000);
        assert_eq!(eval(&tree), 200_000 * 200_001 / 2);
        drop_iteratively(tree);
    }

    #[test]
    fn passes_results_through() {
        let outcome: Result<i64, String> = ensure_sufficient_stack(|| Err("boom".to_string()));
        assert_eq!(outcome, Err("boom".to_string()));
    }
}
