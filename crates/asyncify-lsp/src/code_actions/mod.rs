//! Code actions: the convert-to-async quick fix in tsserver's shape.

pub mod code_action_fixes;
pub mod convert_to_async_fix;

pub use code_action_fixes::{
    CodeFixFileChange, CodeFixInfo, CodeFixPosition, CodeFixRegistry, CodeFixTextChange,
    apply_text_changes,
};
pub use convert_to_async_fix::ConvertToAsyncCodeFix;
