pub mod defaults;
pub mod loader;
pub mod validator;

pub use loader::{load_all_materials, load_materials_from_str, load_streaming_config, LoadError};
pub use validator::{validate_config, validate_materials, ValidationError};
