//! Case-insensitive identifiers.
//!
//! DWScript identifiers compare without regard to ASCII case (`Result`,
//! `result` and `RESULT` are the same binding). `Name` keeps the spelling
//! it was created with for display, while `Eq`, `Ord` and `Hash` operate on
//! the ASCII-lowercased form, so a `Name` can key any `FxHashMap` directly.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// A case-insensitive identifier.
///
/// Cloning is a reference-count bump.
#[derive(Clone)]
pub struct Name(Rc<str>);

impl Name {
    /// Create a name from its source spelling.
    pub fn new(text: &str) -> Self {
        Name(Rc::from(text))
    }

    /// The spelling this name was created with.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// ASCII-lowercased key, used where a plain `String` key is required.
    pub fn key(&self) -> String {
        self.0.to_ascii_lowercase()
    }

    /// Case-insensitive comparison against a plain string.
    #[inline]
    pub fn is(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for Name {}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for byte in self.0.bytes() {
            state.write_u8(byte.to_ascii_lowercase());
        }
        state.write_u8(0xff);
    }
}

impl PartialOrd for Name {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Name {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = self.0.bytes().map(|b| b.to_ascii_lowercase());
        let rhs = other.0.bytes().map(|b| b.to_ascii_lowercase());
        lhs.cmp(rhs)
    }
}

impl From<&str> for Name {
    fn from(text: &str) -> Self {
        Name::new(text)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({:?})", &*self.0)
    }
}

#[cfg(test)]
mod tests;
