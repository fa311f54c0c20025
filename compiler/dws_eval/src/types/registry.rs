//! The type registry: every user-declared type plus the global operator
//! and conversion tables.
//!
//! The registry owns all type descriptors for the interpreter's lifetime;
//! values hold `Rc` handles into it.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use dws_ir::{Name, TypeExpr};

use super::{
    ArrayType, ClassInfo, ConversionRegistry, EnumType, InterfaceInfo, OperatorTable,
    RecordType, RuntimeType,
};
use crate::errors::{duplicate_declaration, undefined_type, EvalError};
use crate::value::{ArrayValue, EnumValue, RecordValue, Value};

#[derive(Debug, Default)]
pub struct TypeRegistry {
    classes: FxHashMap<Name, Rc<ClassInfo>>,
    records: FxHashMap<Name, Rc<RecordType>>,
    interfaces: FxHashMap<Name, Rc<InterfaceInfo>>,
    enums: FxHashMap<Name, Rc<EnumType>>,
    aliases: FxHashMap<Name, TypeExpr>,
    operators: OperatorTable,
    conversions: ConversionRegistry,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // Registration

    fn check_free(&self, name: &Name) -> Result<(), EvalError> {
        if self.is_type_name(name) {
            return Err(duplicate_declaration(format!("type '{name}'")));
        }
        Ok(())
    }

    pub fn register_class(&mut self, class: Rc<ClassInfo>) -> Result<(), EvalError> {
        self.check_free(&class.name)?;
        tracing::debug!(class = %class.name, parent = ?class.parent.as_ref().map(|p| p.name.to_string()), "class registered");
        self.classes.insert(class.name.clone(), class);
        Ok(())
    }

    pub fn register_record(&mut self, record: Rc<RecordType>) -> Result<(), EvalError> {
        self.check_free(&record.name)?;
        self.records.insert(record.name.clone(), record);
        Ok(())
    }

    pub fn register_interface(&mut self, interface: Rc<InterfaceInfo>) -> Result<(), EvalError> {
        self.check_free(&interface.name)?;
        self.interfaces.insert(interface.name.clone(), interface);
        Ok(())
    }

    pub fn register_enum(&mut self, enum_type: Rc<EnumType>) -> Result<(), EvalError> {
        self.check_free(&enum_type.name)?;
        self.enums.insert(enum_type.name.clone(), enum_type);
        Ok(())
    }

    pub fn register_alias(&mut self, name: Name, ty: TypeExpr) -> Result<(), EvalError> {
        self.check_free(&name)?;
        self.aliases.insert(name, ty);
        Ok(())
    }

    // Lookup

    pub fn class(&self, name: &Name) -> Option<Rc<ClassInfo>> {
        self.classes.get(name).cloned()
    }

    pub fn record(&self, name: &Name) -> Option<Rc<RecordType>> {
        self.records.get(name).cloned()
    }

    pub fn interface(&self, name: &Name) -> Option<Rc<InterfaceInfo>> {
        self.interfaces.get(name).cloned()
    }

    pub fn enum_type(&self, name: &Name) -> Option<Rc<EnumType>> {
        self.enums.get(name).cloned()
    }

    /// Resolve a bare enum element name (`Red`) across all enumerations.
    pub fn enum_element(&self, element: &Name) -> Option<EnumValue> {
        self.enums.values().find_map(|e| {
            e.element(element).map(|ordinal| EnumValue {
                type_name: e.name.clone(),
                element: element.clone(),
                ordinal,
            })
        })
    }

    pub fn is_type_name(&self, name: &Name) -> bool {
        self.classes.contains_key(name)
            || self.records.contains_key(name)
            || self.interfaces.contains_key(name)
            || self.enums.contains_key(name)
            || self.aliases.contains_key(name)
    }

    pub fn operators(&self) -> &OperatorTable {
        &self.operators
    }

    pub fn operators_mut(&mut self) -> &mut OperatorTable {
        &mut self.operators
    }

    pub fn conversions(&self) -> &ConversionRegistry {
        &self.conversions
    }

    pub fn conversions_mut(&mut self) -> &mut ConversionRegistry {
        &mut self.conversions
    }

    /// Resolve a written type to its runtime descriptor.
    pub fn resolve(&self, ty: &TypeExpr) -> Result<RuntimeType, EvalError> {
        match ty {
            TypeExpr::Named(name) => self.resolve_named(name),
            TypeExpr::Array { bounds, element } => Ok(RuntimeType::Array(Rc::new(
                ArrayType::new(self.resolve(element)?, *bounds),
            ))),
            TypeExpr::Function { .. } => Ok(RuntimeType::Function),
        }
    }

    fn resolve_named(&self, name: &Name) -> Result<RuntimeType, EvalError> {
        let builtin = match name.key().as_str() {
            "integer" | "int64" | "cardinal" | "byte" | "word" | "smallint" => {
                Some(RuntimeType::Integer)
            }
            "float" | "double" | "real" | "extended" | "single" | "currency" => {
                Some(RuntimeType::Float)
            }
            "string" | "char" | "unicodestring" => Some(RuntimeType::String),
            "boolean" => Some(RuntimeType::Boolean),
            "variant" => Some(RuntimeType::Variant),
            "json" | "jsonvariant" => Some(RuntimeType::Json),
            _ => None,
        };
        if let Some(ty) = builtin {
            return Ok(ty);
        }
        if self.classes.contains_key(name) {
            return Ok(RuntimeType::Class(name.clone()));
        }
        if self.records.contains_key(name) {
            return Ok(RuntimeType::Record(name.clone()));
        }
        if self.interfaces.contains_key(name) {
            return Ok(RuntimeType::Interface(name.clone()));
        }
        if let Some(e) = self.enums.get(name) {
            return Ok(RuntimeType::Enum(Rc::clone(e)));
        }
        if let Some(aliased) = self.aliases.get(name) {
            return self.resolve(aliased);
        }
        Err(undefined_type(name.as_str()))
    }

    /// Default value of a freshly declared slot.
    ///
    /// Records are constructed anew on every call, never shared.
    pub fn zero_value(&self, ty: &RuntimeType) -> Value {
        match ty {
            RuntimeType::Integer => Value::Integer(0),
            RuntimeType::Float => Value::Float(0.0),
            RuntimeType::String => Value::string(""),
            RuntimeType::Boolean => Value::Boolean(false),
            RuntimeType::Variant => Value::unassigned(),
            RuntimeType::Enum(e) => match e.elements.first() {
                Some((element, ordinal)) => Value::Enum(EnumValue {
                    type_name: e.name.clone(),
                    element: element.clone(),
                    ordinal: *ordinal,
                }),
                None => Value::Nil,
            },
            RuntimeType::Array(array_type) => {
                let elements = match array_type.bounds {
                    Some(bounds) => (0..bounds.len())
                        .map(|_| self.zero_value(&array_type.element))
                        .collect(),
                    None => Vec::new(),
                };
                Value::Array(ArrayValue::new(Rc::clone(array_type), elements))
            }
            RuntimeType::Record(name) => match self.records.get(name) {
                Some(record) => Value::Record(self.instantiate_record(record)),
                None => Value::Nil,
            },
            RuntimeType::Json
            | RuntimeType::Class(_)
            | RuntimeType::Interface(_)
            | RuntimeType::Function
            | RuntimeType::Unknown => Value::Nil,
        }
    }

    /// A record with every field at its declared default.
    pub fn instantiate_record(&self, record: &Rc<RecordType>) -> RecordValue {
        let fields = record
            .fields()
            .iter()
            .map(|f| match &f.default {
                Some(v) => v.copy_for_assignment(),
                None => self.zero_value(&f.ty),
            })
            .collect();
        RecordValue::new(Rc::clone(record), fields)
    }

    /// Field values for a new instance of `class`.
    pub fn instance_fields(&self, class: &ClassInfo) -> Vec<Value> {
        class
            .fields()
            .iter()
            .map(|f| match &f.default {
                Some(v) => v.copy_for_assignment(),
                None => self.zero_value(&f.ty),
            })
            .collect()
    }

    /// Whether `value` can be stored in a slot of type `ty` without conversion.
    pub fn is_assignable(&self, value: &Value, ty: &RuntimeType) -> bool {
        match (ty, value) {
            (RuntimeType::Unknown | RuntimeType::Variant, _)
            | (RuntimeType::Integer, Value::Integer(_))
            | (RuntimeType::Float, Value::Float(_))
            | (RuntimeType::String, Value::String(_))
            | (RuntimeType::Boolean, Value::Boolean(_))
            | (RuntimeType::Json, Value::Json(_) | Value::Nil)
            | (RuntimeType::Function, Value::Function(_) | Value::Nil)
            | (RuntimeType::Class(_) | RuntimeType::Interface(_), Value::Nil) => true,
            (RuntimeType::Enum(e), Value::Enum(v)) => e.name == v.type_name,
            (RuntimeType::Record(name), Value::Record(r)) => &r.type_name() == name,
            (RuntimeType::Class(name), Value::Object(o)) => o.class().inherits_from(name),
            (RuntimeType::Class(name), Value::Class(c)) => c.inherits_from(name),
            (RuntimeType::Interface(name), Value::Interface(i)) => {
                &i.info.name == name
                    || i.info.inherits_from(name)
                    || self
                        .interfaces
                        .get(name)
                        .is_some_and(|target| i.info.is_compatible_with(target))
            }
            (RuntimeType::Array(target), Value::Array(a)) => {
                let source = a.ty();
                self.array_compatible(&source, target)
            }
            _ => false,
        }
    }

    /// Structural array compatibility: element types must agree; a static
    /// target additionally needs matching length.
    pub fn array_compatible(&self, source: &ArrayType, target: &ArrayType) -> bool {
        let elements_agree = source.element == target.element
            || matches!(target.element, RuntimeType::Unknown | RuntimeType::Variant)
            || matches!(source.element, RuntimeType::Unknown);
        let shape_agrees = match (source.bounds, target.bounds) {
            (Some(s), Some(t)) => s.len() == t.len(),
            (None, Some(_)) => false,
            (_, None) => true,
        };
        elements_agree && shape_agrees
    }
}
