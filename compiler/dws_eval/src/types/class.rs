//! Class metadata.
//!
//! A `ClassInfo` is assembled while its declaration is processed (fields,
//! methods, properties, operators) and frozen into an `Rc` once its virtual
//! method table is built. The parent is frozen first, so the child starts
//! from copies of the parent's field layout and VMT.

use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use dws_ir::ast::{FunctionDecl, MethodBinding, Param, RoutineKind};
use dws_ir::{Name, OperatorSymbol};

use super::{InterfaceInfo, OperatorEntry, OperatorTable, RuntimeType};
use crate::errors::{duplicate_declaration, EvalError};
use crate::value::Value;

/// A declared field.
#[derive(Clone, Debug)]
pub struct FieldInfo {
    pub name: Name,
    pub ty: RuntimeType,
    /// Initializer value, evaluated when the type was declared.
    pub default: Option<Value>,
}

/// A method together with the class or record that declares it.
#[derive(Debug)]
pub struct MethodInfo {
    pub decl: Rc<FunctionDecl>,
    pub owner: Name,
}

impl MethodInfo {
    pub fn new(decl: Rc<FunctionDecl>, owner: Name) -> Self {
        MethodInfo { decl, owner }
    }

    #[inline]
    pub fn name(&self) -> &Name {
        &self.decl.name
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.decl.params.len()
    }

    /// Dispatched through the VMT.
    pub fn is_virtual(&self) -> bool {
        self.decl.binding != MethodBinding::Static
    }

    pub fn is_abstract(&self) -> bool {
        self.decl.binding == MethodBinding::Abstract || self.decl.body.is_none()
    }
}

/// A declared property.
#[derive(Clone, Debug)]
pub struct PropertyInfo {
    pub name: Name,
    pub ty: RuntimeType,
    pub index_params: Vec<Param>,
    /// Field or getter method.
    pub read: Option<Name>,
    /// Field or setter method.
    pub write: Option<Name>,
    pub is_default: bool,
}

impl PropertyInfo {
    #[inline]
    pub fn is_indexed(&self) -> bool {
        !self.index_params.is_empty()
    }
}

/// Pick the overload whose parameter count matches, else the only candidate.
pub fn select_overload(candidates: &[Rc<MethodInfo>], arity: usize) -> Option<Rc<MethodInfo>> {
    candidates
        .iter()
        .find(|m| m.arity() == arity)
        .or_else(|| match candidates {
            [only] => Some(only),
            _ => None,
        })
        .cloned()
}

/// VMT slot key: method name and parameter count.
pub type VmtKey = (Name, usize);

/// A VMT slot.
///
/// `slot_owner` is the class that introduced the slot (`virtual` or
/// `reintroduce`); overrides keep it and replace `method`.
#[derive(Clone, Debug)]
pub struct VmtEntry {
    pub slot_owner: Name,
    pub method: Rc<MethodInfo>,
}

pub struct ClassInfo {
    pub name: Name,
    pub parent: Option<Rc<ClassInfo>>,
    pub is_abstract: bool,
    fields: Vec<FieldInfo>,
    field_index: FxHashMap<Name, usize>,
    declared: Vec<Rc<MethodInfo>>,
    methods: FxHashMap<Name, Vec<Rc<MethodInfo>>>,
    class_methods: FxHashMap<Name, Vec<Rc<MethodInfo>>>,
    constructors: FxHashMap<Name, Vec<Rc<MethodInfo>>>,
    destructor: Option<Rc<MethodInfo>>,
    properties: FxHashMap<Name, Rc<PropertyInfo>>,
    default_property: Option<Rc<PropertyInfo>>,
    operators: OperatorTable,
    interfaces: Vec<Name>,
    vmt: FxHashMap<VmtKey, VmtEntry>,
}

impl ClassInfo {
    /// Start a class, copying down the parent's field layout and VMT.
    pub fn new(name: Name, parent: Option<Rc<ClassInfo>>) -> Self {
        let (fields, field_index, vmt) = match &parent {
            Some(p) => (p.fields.clone(), p.field_index.clone(), p.vmt.clone()),
            None => (Vec::new(), FxHashMap::default(), FxHashMap::default()),
        };
        ClassInfo {
            name,
            parent,
            is_abstract: false,
            fields,
            field_index,
            declared: Vec::new(),
            methods: FxHashMap::default(),
            class_methods: FxHashMap::default(),
            constructors: FxHashMap::default(),
            destructor: None,
            properties: FxHashMap::default(),
            default_property: None,
            operators: OperatorTable::new(),
            interfaces: Vec::new(),
            vmt,
        }
    }

    // Registration

    pub fn add_field(&mut self, field: FieldInfo) -> Result<(), EvalError> {
        if self.field_index.contains_key(&field.name) {
            return Err(duplicate_declaration(format!(
                "field '{}' in class {}",
                field.name, self.name
            )));
        }
        self.field_index.insert(field.name.clone(), self.fields.len());
        self.fields.push(field);
        Ok(())
    }

    pub fn add_method(&mut self, decl: Rc<FunctionDecl>) {
        let method = Rc::new(MethodInfo::new(decl, self.name.clone()));
        let name = method.name().clone();
        match method.decl.kind {
            RoutineKind::Constructor => self.constructors.entry(name).or_default().push(method),
            RoutineKind::Destructor => self.destructor = Some(method),
            RoutineKind::Function | RoutineKind::Procedure if method.decl.is_class_method => {
                self.class_methods.entry(name).or_default().push(method);
            }
            RoutineKind::Function | RoutineKind::Procedure => {
                self.declared.push(Rc::clone(&method));
                self.methods.entry(name).or_default().push(method);
            }
        }
    }

    pub fn add_property(&mut self, property: PropertyInfo) {
        let property = Rc::new(property);
        if property.is_default {
            self.default_property = Some(Rc::clone(&property));
        }
        self.properties.insert(property.name.clone(), property);
    }

    pub fn add_interface(&mut self, name: Name) {
        self.interfaces.push(name);
    }

    pub fn register_operator(
        &mut self,
        symbol: OperatorSymbol,
        entry: OperatorEntry,
    ) -> Result<(), EvalError> {
        self.operators.register(symbol, entry, "class operator")
    }

    /// Fill the VMT from this class's own instance methods.
    ///
    /// `virtual`/`abstract` open a slot owned by this class, `override`
    /// replaces the implementation of an inherited slot, `reintroduce`
    /// opens a fresh slot that hides the inherited one.
    pub fn build_vmt(&mut self) -> Result<(), EvalError> {
        for method in &self.declared {
            let key = (method.name().clone(), method.arity());
            match method.decl.binding {
                MethodBinding::Static => {}
                MethodBinding::Virtual | MethodBinding::Abstract | MethodBinding::Reintroduce => {
                    self.vmt.insert(
                        key,
                        VmtEntry {
                            slot_owner: self.name.clone(),
                            method: Rc::clone(method),
                        },
                    );
                }
                MethodBinding::Override => match self.vmt.get_mut(&key) {
                    Some(entry) => entry.method = Rc::clone(method),
                    None => {
                        return Err(EvalError::new(format!(
                            "method '{}.{}' marked override but no inherited virtual method found",
                            self.name,
                            method.name()
                        )))
                    }
                },
            }
        }
        Ok(())
    }

    // Lookup

    /// This class followed by its ancestors.
    pub fn ancestry(&self) -> impl Iterator<Item = &ClassInfo> {
        std::iter::successors(Some(self), |c| c.parent.as_deref())
    }

    /// Whether this class is `name` or derives from it.
    pub fn inherits_from(&self, name: &Name) -> bool {
        self.ancestry().any(|c| &c.name == name)
    }

    pub fn fields(&self) -> &[FieldInfo] {
        &self.fields
    }

    pub fn field_index(&self, name: &Name) -> Option<usize> {
        self.field_index.get(name).copied()
    }

    pub fn field(&self, name: &Name) -> Option<&FieldInfo> {
        self.field_index(name).and_then(|i| self.fields.get(i))
    }

    /// Statically resolve an instance method, nearest declaration first.
    pub fn find_method(&self, name: &Name, arity: usize) -> Option<Rc<MethodInfo>> {
        find_in_ancestry(self, name, arity, |c| &c.methods)
    }

    pub fn find_class_method(&self, name: &Name, arity: usize) -> Option<Rc<MethodInfo>> {
        find_in_ancestry(self, name, arity, |c| &c.class_methods)
    }

    pub fn find_constructor(&self, name: &Name, arity: usize) -> Option<Rc<MethodInfo>> {
        find_in_ancestry(self, name, arity, |c| &c.constructors)
    }

    pub fn has_constructor(&self, name: &Name) -> bool {
        self.ancestry().any(|c| c.constructors.contains_key(name))
    }

    /// Any instance or class method of that name, inherited ones included.
    pub fn has_method_named(&self, name: &Name) -> bool {
        self.ancestry()
            .any(|c| c.methods.contains_key(name) || c.class_methods.contains_key(name))
    }

    pub fn destructor(&self) -> Option<Rc<MethodInfo>> {
        self.ancestry().find_map(|c| c.destructor.clone())
    }

    pub fn find_property(&self, name: &Name) -> Option<Rc<PropertyInfo>> {
        self.ancestry().find_map(|c| c.properties.get(name).cloned())
    }

    pub fn default_property(&self) -> Option<Rc<PropertyInfo>> {
        self.ancestry().find_map(|c| c.default_property.clone())
    }

    /// Operator overload declared by this class or an ancestor.
    pub fn lookup_operator(
        &self,
        symbol: OperatorSymbol,
        operands: &[Vec<Name>],
    ) -> Option<OperatorEntry> {
        self.ancestry()
            .find_map(|c| c.operators.lookup(symbol, operands).cloned())
    }

    /// Interfaces named in this class's declaration or an ancestor's.
    pub fn declared_interfaces(&self) -> Vec<Name> {
        self.ancestry()
            .flat_map(|c| c.interfaces.iter().cloned())
            .collect()
    }

    /// Structural check: every method of the interface, inherited ones
    /// included, has a same-named method in this class hierarchy.
    pub fn implements(&self, interface: &InterfaceInfo) -> bool {
        interface
            .all_methods()
            .iter()
            .all(|m| self.has_method_named(m))
    }

    pub fn vmt_entry(&self, key: &VmtKey) -> Option<&VmtEntry> {
        self.vmt.get(key)
    }

    /// Late-bound target of a virtual call.
    ///
    /// `static_class` is the class the call site was typed against; the
    /// result is the runtime class's implementation of the same slot, so a
    /// `reintroduce` below the static class does not capture the call.
    pub fn resolve_virtual(&self, static_class: &ClassInfo, key: &VmtKey) -> Option<Rc<MethodInfo>> {
        let slot_owner = &static_class.vmt_entry(key)?.slot_owner;
        self.ancestry()
            .filter_map(|c| c.vmt_entry(key))
            .find(|e| &e.slot_owner == slot_owner)
            .map(|e| Rc::clone(&e.method))
    }
}

fn find_in_ancestry(
    class: &ClassInfo,
    name: &Name,
    arity: usize,
    table: impl Fn(&ClassInfo) -> &FxHashMap<Name, Vec<Rc<MethodInfo>>>,
) -> Option<Rc<MethodInfo>> {
    let mut fallback = None;
    for c in class.ancestry() {
        if let Some(set) = table(c).get(name) {
            if let Some(m) = set.iter().find(|m| m.arity() == arity) {
                return Some(Rc::clone(m));
            }
            if fallback.is_none() {
                fallback = select_overload(set, arity);
            }
        }
    }
    fallback
}

impl fmt::Debug for ClassInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassInfo")
            .field("name", &self.name)
            .field("parent", &self.parent.as_ref().map(|p| &p.name))
            .field("fields", &self.fields.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
