//! Syntax helpers shared by the binder, the type oracle and the rewriter.

pub mod transform_utils;
pub use transform_utils::{
    contains_this_reference, is_side_effect_free, skip_outer_expressions, skip_parentheses,
    visit_function_scope,
};
