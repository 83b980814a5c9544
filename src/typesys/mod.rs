//! Type system — pure, stateless rules over the dialect's numeric types.
//!
//! Three rule families, all free functions over [`TypeInfo`] shapes:
//! conversion legality ([`check_conversion`]), swizzle typing
//! ([`swizzle_type`]), and binary operator result types
//! ([`binary_result_type`]). Nothing here touches the workspace index;
//! the validator and completion engine feed shapes in and get shapes out.

mod binary;
mod builtins;
mod conversion;
mod swizzle;
mod types;

pub use binary::binary_result_type;
pub use builtins::{
    BUILTIN_SEMANTICS, BUILTIN_TYPE_NAMES, Intrinsic, KEYWORDS, ReturnRule, intrinsic,
    intrinsics,
};
pub use conversion::{Conversion, ConversionWarning, check_conversion};
pub use swizzle::swizzle_type;
pub use types::{ObjectClass, ScalarKind, TypeInfo, parse_type};
