#![forbid(unsafe_code)]

//! Named validations: composable aliases for validation specifications
//!
//! A [`ValidationMapping`] is a keyed container of validation name to
//! parameters. Aliases defined on a [`Variant`] compose new pairs into a
//! mapping and always return a new mapping, so chains can be shared and split.
//!
//! ```
//! use named_validations::{Variant, Value};
//!
//! let users = Variant::root().derive_named("UserValidations");
//! users.define_value("required", "presence", true).unwrap();
//!
//! let spec = users.new_mapping().invoke("required", &[]).unwrap();
//! assert_eq!(spec["presence"], Value::Bool(true));
//! ```

mod builtin;
pub mod config;
pub mod error;
pub mod mapping;
pub mod types;
pub mod variant;

// Re-export error types for convenient access
pub use error::{ConfigError, DefineError, Error, InvokeError};

// Re-export core domain types for convenient access
pub use builtin::{BUILTIN_VALIDATIONS, DEFAULTS_ALIAS};
pub use config::AliasConfig;
pub use mapping::{ExtractableOptions, ValidationMapping};
pub use types::{Params, ValidationName, Value};
pub use variant::{AliasDefinition, AliasFn, RESERVED_NAMES, ROOT_VARIANT_NAME, Variant};
