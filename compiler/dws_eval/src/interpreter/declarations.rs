//! Processing of top-level declarations.
//!
//! Types are registered in declaration order, so a type may only refer to
//! types declared before it, and to itself.

use std::rc::Rc;

use dws_ir::ast::{
    ClassDecl, Decl, EnumDecl, Expr, FieldDecl, FunctionDecl, InterfaceDecl, OperatorDecl,
    PropertyDecl, RecordDecl,
};
use dws_ir::{Name, OperatorSymbol, TypeExpr};

use super::standard_classes::{standard_declarations, TOBJECT};
use super::Interpreter;
use crate::errors::{undefined_type, EvalError};
use crate::types::{
    ArrayType, ClassInfo, Conversion, EnumType, FieldInfo, InterfaceInfo, OperatorEntry,
    PropertyInfo, RecordType, RuntimeType,
};

impl Interpreter {
    pub(crate) fn declare_standard_classes(&mut self) -> Result<(), EvalError> {
        for decl in standard_declarations() {
            self.declare(&decl)?;
        }
        Ok(())
    }

    pub(crate) fn declare(&mut self, decl: &Decl) -> Result<(), EvalError> {
        match decl {
            Decl::Function(routine) => {
                self.declare_function(routine);
                Ok(())
            }
            Decl::Class(class) => self.declare_class(class),
            Decl::Record(record) => self.declare_record(record),
            Decl::Interface(interface) => self.declare_interface(interface),
            Decl::Enum(enumeration) => self.declare_enum(enumeration),
            Decl::TypeAlias { name, ty } => self.types.register_alias(name.clone(), ty.clone()),
            Decl::Operator(operator) => self.declare_global_operator(operator),
            Decl::Const { name, ty, value } => self.declare_const(name, ty.as_ref(), value),
        }
    }

    fn declare_function(&mut self, routine: &Rc<FunctionDecl>) {
        let overloads = self.functions.entry(routine.name.clone()).or_default();
        // An implementation replaces its forward declaration.
        overloads.retain(|d| d.body.is_some() || d.params.len() != routine.params.len());
        overloads.push(Rc::clone(routine));
    }

    #[tracing::instrument(level = "debug", skip_all, fields(class = %decl.name))]
    fn declare_class(&mut self, decl: &ClassDecl) -> Result<(), EvalError> {
        let parent = match &decl.parent {
            Some(name) => Some(
                self.types
                    .class(name)
                    .ok_or_else(|| undefined_type(name.as_str()))?,
            ),
            None if decl.name.is(TOBJECT) => None,
            None => self.types.class(&Name::new(TOBJECT)),
        };

        let mut class = ClassInfo::new(decl.name.clone(), parent);
        class.is_abstract = decl.is_abstract;
        for field in &decl.fields {
            let info = self.field_info(field, &decl.name, RuntimeType::Class)?;
            class.add_field(info)?;
        }
        for method in &decl.methods {
            class.add_method(Rc::clone(method));
        }
        for property in &decl.properties {
            class.add_property(self.property_info(property, &decl.name, RuntimeType::Class)?);
        }
        for interface in &decl.interfaces {
            if self.types.interface(interface).is_none() {
                return Err(undefined_type(interface.as_str()));
            }
            class.add_interface(interface.clone());
        }
        class.build_vmt()?;

        let mut conversions = Vec::new();
        for operator in &decl.operators {
            match operator.symbol {
                OperatorSymbol::Implicit => {
                    conversions.push(self.conversion_for(operator, Some(&decl.name))?);
                }
                symbol => {
                    let operand_types = self.operand_type_names(operator, Some(&decl.name))?;
                    let arity = operand_types.len();
                    let instance_method = class
                        .find_method(&operator.binding, arity.saturating_sub(1))
                        .is_some_and(|m| m.arity() + 1 == arity)
                        && class.find_class_method(&operator.binding, arity).is_none();
                    let entry = OperatorEntry {
                        self_index: self_index(&operand_types, &decl.name, instance_method),
                        operand_types,
                        binding: operator.binding.clone(),
                    };
                    class.register_operator(symbol, entry)?;
                }
            }
        }

        self.types.register_class(Rc::new(class))?;
        for conversion in conversions {
            self.types.conversions_mut().register(conversion)?;
        }
        tracing::debug!("class declared");
        Ok(())
    }

    fn declare_record(&mut self, decl: &RecordDecl) -> Result<(), EvalError> {
        let mut record = RecordType::new(decl.name.clone());
        for field in &decl.fields {
            let info = self.field_info(field, &decl.name, RuntimeType::Record)?;
            record.add_field(info)?;
        }
        for method in &decl.methods {
            record.add_method(Rc::clone(method));
        }
        for property in &decl.properties {
            record.add_property(self.property_info(property, &decl.name, RuntimeType::Record)?);
        }

        let mut conversions = Vec::new();
        for operator in &decl.operators {
            match operator.symbol {
                OperatorSymbol::Implicit => {
                    conversions.push(self.conversion_for(operator, Some(&decl.name))?);
                }
                symbol => {
                    let operand_types = self.operand_type_names(operator, Some(&decl.name))?;
                    let arity = operand_types.len();
                    let instance_method = record
                        .find_method(&operator.binding, arity.saturating_sub(1))
                        .is_some_and(|m| !m.decl.is_class_method && m.arity() + 1 == arity);
                    let entry = OperatorEntry {
                        self_index: self_index(&operand_types, &decl.name, instance_method),
                        operand_types,
                        binding: operator.binding.clone(),
                    };
                    record.register_operator(symbol, entry)?;
                }
            }
        }

        self.types.register_record(Rc::new(record))?;
        for conversion in conversions {
            self.types.conversions_mut().register(conversion)?;
        }
        Ok(())
    }

    fn declare_interface(&mut self, decl: &InterfaceDecl) -> Result<(), EvalError> {
        let parent = match &decl.parent {
            Some(name) => Some(
                self.types
                    .interface(name)
                    .ok_or_else(|| undefined_type(name.as_str()))?,
            ),
            None => None,
        };
        let info = InterfaceInfo::new(decl.name.clone(), parent, decl.methods.clone())
            .with_properties(decl.properties.clone());
        self.types.register_interface(Rc::new(info))
    }

    /// Ordinals are explicit or one past the previous element, from 0.
    fn declare_enum(&mut self, decl: &EnumDecl) -> Result<(), EvalError> {
        let mut next = 0_i64;
        let elements = decl
            .elements
            .iter()
            .map(|(name, explicit)| {
                let ordinal = explicit.unwrap_or(next);
                next = ordinal.saturating_add(1);
                (name.clone(), ordinal)
            })
            .collect();
        self.types.register_enum(Rc::new(EnumType {
            name: decl.name.clone(),
            elements,
        }))
    }

    fn declare_global_operator(&mut self, decl: &OperatorDecl) -> Result<(), EvalError> {
        match decl.symbol {
            OperatorSymbol::Implicit => {
                let conversion = self.conversion_for(decl, None)?;
                self.types.conversions_mut().register(conversion)
            }
            symbol => {
                let entry = OperatorEntry {
                    operand_types: self.operand_type_names(decl, None)?,
                    binding: decl.binding.clone(),
                    self_index: None,
                };
                self.types.operators_mut().register(symbol, entry, "operator")
            }
        }
    }

    fn declare_const(&mut self, name: &Name, ty: Option<&TypeExpr>, value: &Expr) -> Result<(), EvalError> {
        let ty = ty.map(|t| self.types.resolve(t)).transpose()?;
        let value = self.eval_expected(value, ty.as_ref())?;
        let value = match &ty {
            Some(t) => self.coerce(value, t)?,
            None => value,
        };
        self.env.define_global(name.clone(), value);
        Ok(())
    }

    fn field_info(
        &mut self,
        field: &FieldDecl,
        owner: &Name,
        owner_type: fn(Name) -> RuntimeType,
    ) -> Result<FieldInfo, EvalError> {
        let ty = self.resolve_member_type(&field.ty, owner, owner_type)?;
        let default = match &field.init {
            Some(init) => {
                let value = self.eval_expected(init, Some(&ty))?;
                Some(self.coerce(value, &ty)?)
            }
            None => None,
        };
        Ok(FieldInfo {
            name: field.name.clone(),
            ty,
            default,
        })
    }

    fn property_info(
        &self,
        property: &PropertyDecl,
        owner: &Name,
        owner_type: fn(Name) -> RuntimeType,
    ) -> Result<PropertyInfo, EvalError> {
        Ok(PropertyInfo {
            name: property.name.clone(),
            ty: self.resolve_member_type(&property.ty, owner, owner_type)?,
            index_params: property.index_params.clone(),
            read: property.read.clone(),
            write: property.write.clone(),
            is_default: property.is_default,
        })
    }

    /// Resolve a member's type, letting it name the type being declared.
    fn resolve_member_type(
        &self,
        ty: &TypeExpr,
        owner: &Name,
        owner_type: fn(Name) -> RuntimeType,
    ) -> Result<RuntimeType, EvalError> {
        match ty {
            TypeExpr::Named(name) if name == owner => Ok(owner_type(owner.clone())),
            TypeExpr::Array { bounds, element } => Ok(RuntimeType::Array(Rc::new(ArrayType::new(
                self.resolve_member_type(element, owner, owner_type)?,
                *bounds,
            )))),
            other => self.types.resolve(other),
        }
    }

    fn operand_type_name(&self, ty: &TypeExpr, owner: Option<&Name>) -> Result<Name, EvalError> {
        match (ty, owner) {
            (TypeExpr::Named(name), Some(owner)) if name == owner => Ok(owner.clone()),
            _ => Ok(self.types.resolve(ty)?.name()),
        }
    }

    fn operand_type_names(&self, decl: &OperatorDecl, owner: Option<&Name>) -> Result<Vec<Name>, EvalError> {
        decl.operand_types
            .iter()
            .map(|t| self.operand_type_name(t, owner))
            .collect()
    }

    fn conversion_for(&self, decl: &OperatorDecl, owner: Option<&Name>) -> Result<Conversion, EvalError> {
        let (Some(from), Some(to), 1) = (
            decl.operand_types.first(),
            decl.result_type.as_ref(),
            decl.operand_types.len(),
        ) else {
            return Err(EvalError::new(format!(
                "implicit operator '{}' needs one operand and a result type",
                decl.binding
            ))
            .at(decl.pos));
        };
        Ok(Conversion {
            from: self.operand_type_name(from, owner)?,
            to: self.operand_type_name(to, owner)?,
            binding: decl.binding.clone(),
            owner: owner.cloned(),
        })
    }
}

/// Operand position bound to `Self` when the operator is implemented by an
/// instance method: the first operand of the owner's type.
fn self_index(operand_types: &[Name], owner: &Name, instance_method: bool) -> Option<usize> {
    instance_method.then(|| {
        operand_types
            .iter()
            .position(|t| t == owner)
            .unwrap_or(0)
    })
}
