//! Text-level stages applied to a script before it reaches the sandbox.

mod format;
mod placeholder;
mod sanitize;
mod structure;

pub use format::format_script;
pub use placeholder::{field_value_text, replace_placeholders, CURRENT_ITEM_TOKEN};
pub use sanitize::{assert_safe, find_denied_pattern, is_safe, DENIED_PATTERNS};
pub use structure::{bracket_counts, check_structure, has_function_shape};
