use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use dws_ir::ast::FunctionDecl;
use dws_ir::{Name, OperatorSymbol};

use super::class::{select_overload, FieldInfo, MethodInfo, PropertyInfo};
use super::{OperatorEntry, OperatorTable};
use crate::errors::{duplicate_declaration, EvalError};

/// Record metadata: a value type with fields, methods, properties and
/// operators, but no inheritance.
pub struct RecordType {
    pub name: Name,
    fields: Vec<FieldInfo>,
    field_index: FxHashMap<Name, usize>,
    methods: FxHashMap<Name, Vec<Rc<MethodInfo>>>,
    properties: FxHashMap<Name, Rc<PropertyInfo>>,
    default_property: Option<Rc<PropertyInfo>>,
    operators: OperatorTable,
}

impl RecordType {
    pub fn new(name: Name) -> Self {
        RecordType {
            name,
            fields: Vec::new(),
            field_index: FxHashMap::default(),
            methods: FxHashMap::default(),
            properties: FxHashMap::default(),
            default_property: None,
            operators: OperatorTable::new(),
        }
    }

    pub fn add_field(&mut self, field: FieldInfo) -> Result<(), EvalError> {
        if self.field_index.contains_key(&field.name) {
            return Err(duplicate_declaration(format!(
                "field '{}' in record {}",
                field.name, self.name
            )));
        }
        self.field_index.insert(field.name.clone(), self.fields.len());
        self.fields.push(field);
        Ok(())
    }

    /// Instance and class methods share one table; `decl.is_class_method`
    /// tells them apart at call time.
    pub fn add_method(&mut self, decl: Rc<FunctionDecl>) {
        let method = Rc::new(MethodInfo::new(decl, self.name.clone()));
        self.methods
            .entry(method.name().clone())
            .or_default()
            .push(method);
    }

    pub fn add_property(&mut self, property: PropertyInfo) {
        let property = Rc::new(property);
        if property.is_default {
            self.default_property = Some(Rc::clone(&property));
        }
        self.properties.insert(property.name.clone(), property);
    }

    pub fn register_operator(
        &mut self,
        symbol: OperatorSymbol,
        entry: OperatorEntry,
    ) -> Result<(), EvalError> {
        self.operators.register(symbol, entry, "record operator")
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

    pub fn find_method(&self, name: &Name, arity: usize) -> Option<Rc<MethodInfo>> {
        select_overload(self.methods.get(name)?, arity)
    }

    pub fn find_property(&self, name: &Name) -> Option<Rc<PropertyInfo>> {
        self.properties.get(name).cloned()
    }

    pub fn default_property(&self) -> Option<Rc<PropertyInfo>> {
        self.default_property.clone()
    }

    pub fn lookup_operator(
        &self,
        symbol: OperatorSymbol,
        operands: &[Vec<Name>],
    ) -> Option<OperatorEntry> {
        self.operators.lookup(symbol, operands).cloned()
    }
}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordType")
            .field("name", &self.name)
            .field("fields", &self.fields.len())
            .finish_non_exhaustive()
    }
}
