//! Classes every program starts with: `TObject` and the exception
//! hierarchy the runtime raises itself.

use dws_ir::ast::{Decl, Param};
use dws_ir::build::{class, constructor, destructor, ident, set, ty};

pub const TOBJECT: &str = "TObject";
pub const EXCEPTION: &str = "Exception";
pub const ECONVERT_ERROR: &str = "EConvertError";
pub const ERANGE_ERROR: &str = "ERangeError";
pub const EDIV_BY_ZERO: &str = "EDivByZero";
pub const EASSERTION_FAILED: &str = "EAssertionFailed";
pub const EINVALID_OP: &str = "EInvalidOp";
/// Raised when a call would exceed the recursion limit.
pub const ESTACK_OVERFLOW: &str = "EScriptStackOverflow";
/// Wraps errors and panics coming out of host functions.
pub const EHOST: &str = "EHost";

/// Declarations for the standard classes, parents first.
pub(crate) fn standard_declarations() -> Vec<Decl> {
    let tobject = class(TOBJECT)
        .method(constructor("Create", Vec::new()).body(Vec::new()))
        .method(destructor("Destroy").virtual_().body(Vec::new()))
        .build();

    let exception = class(EXCEPTION)
        .field("Message", ty("String"))
        .method(
            constructor("Create", vec![Param::new("Msg", ty("String"))])
                .body(vec![set("Message", ident("Msg"))]),
        )
        .build();

    let mut decls = vec![tobject, exception];
    decls.extend(
        [
            ECONVERT_ERROR,
            ERANGE_ERROR,
            EDIV_BY_ZERO,
            EASSERTION_FAILED,
            EINVALID_OP,
            ESTACK_OVERFLOW,
        ]
        .into_iter()
        .map(|name| class(name).parent(EXCEPTION).build()),
    );
    decls.push(
        class(EHOST)
            .parent(EXCEPTION)
            .field("ExceptionClass", ty("String"))
            .build(),
    );
    decls
}
