//! Implicit conversion registry and chain search.
//!
//! `operator implicit (A): B uses F;` registers a single-step conversion.
//! When a value of type A meets a slot of type C and no direct rule
//! applies, [`ConversionRegistry::find_path`] searches breadth-first for
//! the shortest chain A → … → C of at most `max_depth` steps.

use std::collections::VecDeque;

use rustc_hash::{FxHashMap, FxHashSet};

use dws_ir::Name;

use crate::errors::{duplicate_declaration, EvalError};

/// Longest chain of implicit conversions applied to a single value.
///
/// A three-step chain succeeds; four steps are rejected.
pub const MAX_CONVERSION_CHAIN_DEPTH: usize = 3;

/// One registered implicit conversion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Conversion {
    pub from: Name,
    pub to: Name,
    /// Routine implementing the conversion.
    pub binding: Name,
    /// Declaring class for `class operator implicit`; `None` for global ones.
    pub owner: Option<Name>,
}

#[derive(Debug, Default)]
pub struct ConversionRegistry {
    conversions: Vec<Conversion>,
    by_pair: FxHashMap<(Name, Name), usize>,
}

impl ConversionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, conversion: Conversion) -> Result<(), EvalError> {
        let key = (conversion.from.clone(), conversion.to.clone());
        if self.by_pair.contains_key(&key) {
            return Err(duplicate_declaration(format!(
                "implicit conversion from {} to {}",
                conversion.from, conversion.to
            )));
        }
        self.by_pair.insert(key, self.conversions.len());
        self.conversions.push(conversion);
        Ok(())
    }

    /// Direct single-step conversion.
    pub fn find_implicit(&self, from: &Name, to: &Name) -> Option<&Conversion> {
        self.by_pair
            .get(&(from.clone(), to.clone()))
            .and_then(|&i| self.conversions.get(i))
    }

    /// Shortest chain of at most `max_depth` conversions from `from` to `to`.
    ///
    /// Returns `None` when `from == to` or no chain within the bound exists.
    /// Among equally short chains, the one using earlier registrations wins.
    pub fn find_path(&self, from: &Name, to: &Name, max_depth: usize) -> Option<Vec<Conversion>> {
        if from == to || max_depth == 0 {
            return None;
        }

        let mut visited = FxHashSet::default();
        visited.insert(from.clone());
        let mut queue: VecDeque<(Name, Vec<usize>)> = VecDeque::new();
        queue.push_back((from.clone(), Vec::new()));

        while let Some((current, path)) = queue.pop_front() {
            if path.len() >= max_depth {
                continue;
            }
            for (index, conversion) in self.conversions.iter().enumerate() {
                if conversion.from != current || visited.contains(&conversion.to) {
                    continue;
                }
                let mut next = path.clone();
                next.push(index);
                if &conversion.to == to {
                    tracing::trace!(from = %from, to = %to, steps = next.len(), "conversion chain found");
                    return Some(
                        next.iter()
                            .filter_map(|&i| self.conversions.get(i).cloned())
                            .collect(),
                    );
                }
                visited.insert(conversion.to.clone());
                queue.push_back((conversion.to.clone(), next));
            }
        }
        tracing::trace!(from = %from, to = %to, max_depth, "no conversion chain");
        None
    }

    pub fn len(&self) -> usize {
        self.conversions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversions.is_empty()
    }
}
