//! Operator overload tables.
//!
//! A table maps an operator symbol to the overloads registered for it, each
//! keyed by its ordered operand-type tuple. Classes, records and the global
//! scope each own one table.

use rustc_hash::FxHashMap;

use dws_ir::{Name, OperatorSymbol};

use crate::errors::{duplicate_operator, EvalError};

/// One registered overload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperatorEntry {
    pub operand_types: Vec<Name>,
    /// Routine or method implementing the operator.
    pub binding: Name,
    /// Which operand is `Self` when the binding is an instance method.
    /// `None` for global routines and class (static) methods, which receive
    /// every operand as an argument.
    pub self_index: Option<usize>,
}

#[derive(Clone, Debug, Default)]
pub struct OperatorTable {
    entries: FxHashMap<OperatorSymbol, Vec<OperatorEntry>>,
}

impl OperatorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an overload; an identical operand-type tuple is rejected.
    ///
    /// `scope` names the table in the error message (`"class operator"`,
    /// `"operator"`).
    pub fn register(
        &mut self,
        symbol: OperatorSymbol,
        entry: OperatorEntry,
        scope: &'static str,
    ) -> Result<(), EvalError> {
        let overloads = self.entries.entry(symbol).or_default();
        if overloads
            .iter()
            .any(|e| e.operand_types == entry.operand_types)
        {
            let operands = entry
                .operand_types
                .iter()
                .map(Name::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            return Err(duplicate_operator(scope, symbol.as_symbol(), &operands));
        }
        overloads.push(entry);
        Ok(())
    }

    /// Find an overload for the operands.
    ///
    /// Each operand is given as its type chain (own type first, then
    /// ancestors). Among the overloads whose declared types all occur in the
    /// chains, the one closest to the operands' own types wins; an exact
    /// match scores zero.
    pub fn lookup(&self, symbol: OperatorSymbol, operands: &[Vec<Name>]) -> Option<&OperatorEntry> {
        self.entries
            .get(&symbol)?
            .iter()
            .filter(|e| e.operand_types.len() == operands.len())
            .filter_map(|e| {
                let distance = e
                    .operand_types
                    .iter()
                    .zip(operands)
                    .map(|(declared, chain)| chain.iter().position(|t| t == declared))
                    .sum::<Option<usize>>()?;
                Some((distance, e))
            })
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, e)| e)
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
