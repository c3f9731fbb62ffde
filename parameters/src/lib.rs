//! # Parameters
//!
//! Hierarchical, typed, validated parameter resolution.
//!
//! This crate provides:
//! - An immutable, namespaced parameter store ([`Parameters`])
//! - Typed accessors built on a converter/validator pipeline
//! - File and directory accessors with existence checks
//! - Configured instances: objects whose type is chosen by a parameter value
//! - Loaders for line-oriented, TOML and YAML parameter files
//!
//! # Best Practices
//!
//! - Stores are never mutated; scoping returns a new store
//! - Every failure names the fully-qualified parameter key
//! - Absence is only tolerated through the `get_optional_*` accessors
//!
//! ```rust
//! use parameters::{ParameterError, Parameters};
//!
//! let params: Parameters = "threshold: 0.75\nlowercase: yes\n".parse().unwrap();
//!
//! assert_eq!(params.get_probability("threshold").unwrap(), 0.75);
//! assert!(matches!(
//!     params.get_boolean("lowercase"),
//!     Err(ParameterError::Conversion { .. })
//! ));
//! assert_eq!(params.get_optional_integer("iterations").unwrap(), None);
//! ```

pub mod accessors;
pub mod factory;
pub mod files;
pub mod loader;
pub mod parameters;

pub use convert::{StringConverter, Symbol, Validator, ValidatorExt};
pub use errors::{ConversionError, LoadError, ParameterError, ValidationError};
pub use factory::{FromParameters, RegistryError, TypeRegistration, TypeRegistry};
pub use loader::{
    RawParameters, load_from_file, load_params, load_toml, load_yaml, parse_params_str,
};
pub use parameters::{OS_FILEPATH_CONVERSION_PARAM, Parameters};
