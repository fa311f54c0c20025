use std::rc::Rc;

use dws_ir::Name;

/// Interface metadata. Method signatures are reduced to names.
#[derive(Debug)]
pub struct InterfaceInfo {
    pub name: Name,
    pub parent: Option<Rc<InterfaceInfo>>,
    methods: Vec<Name>,
    properties: Vec<Name>,
}

impl InterfaceInfo {
    pub fn new(name: Name, parent: Option<Rc<InterfaceInfo>>, methods: Vec<Name>) -> Self {
        InterfaceInfo {
            name,
            parent,
            methods,
            properties: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_properties(mut self, properties: Vec<Name>) -> Self {
        self.properties = properties;
        self
    }

    /// Own methods followed by inherited ones.
    pub fn all_methods(&self) -> Vec<Name> {
        let mut all = self.methods.clone();
        if let Some(parent) = &self.parent {
            for m in parent.all_methods() {
                if !all.contains(&m) {
                    all.push(m);
                }
            }
        }
        all
    }

    pub fn properties(&self) -> &[Name] {
        &self.properties
    }

    pub fn has_method(&self, name: &Name) -> bool {
        self.all_methods().contains(name)
    }

    /// Whether this interface is `name` or inherits from it.
    pub fn inherits_from(&self, name: &Name) -> bool {
        std::iter::successors(Some(self), |i| i.parent.as_deref()).any(|i| &i.name == name)
    }

    /// A value of this interface can be used as `other` when its method set
    /// is a superset of `other`'s.
    pub fn is_compatible_with(&self, other: &InterfaceInfo) -> bool {
        let mine = self.all_methods();
        other.all_methods().iter().all(|m| mine.contains(m))
    }
}

#[cfg(test)]
mod tests;
