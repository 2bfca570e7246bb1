pub mod error;
pub mod value;
pub mod value_path;

pub use error::{ErrorKind, ScriptError, RUNTIME_PREFIX, STAGE_PREFIX};
pub use value::*;
pub use value_path::find_value_by_path;
