//! Type metadata consumed by the evaluator: classes, records, interfaces,
//! enumerations, array types, operator tables and implicit conversions.

mod class;
mod conversions;
mod interface;
mod operators;
mod record;
mod registry;
mod runtime_type;

pub use class::{
    select_overload, ClassInfo, FieldInfo, MethodInfo, PropertyInfo, VmtEntry, VmtKey,
};
pub use conversions::{Conversion, ConversionRegistry, MAX_CONVERSION_CHAIN_DEPTH};
pub use interface::InterfaceInfo;
pub use operators::{OperatorEntry, OperatorTable};
pub use record::RecordType;
pub use registry::TypeRegistry;
pub use runtime_type::{ArrayType, EnumType, RuntimeType};
