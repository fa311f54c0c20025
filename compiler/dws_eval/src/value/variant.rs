use super::Value;

/// Contents of a Variant slot.
#[derive(Clone, Debug, PartialEq)]
pub enum VariantValue {
    /// Never written.
    Unassigned,
    Null,
    Assigned(Value),
}

impl VariantValue {
    pub fn is_unassigned(&self) -> bool {
        matches!(self, VariantValue::Unassigned)
    }
}
