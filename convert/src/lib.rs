//! # Converters and Validators
//!
//! The two capabilities every typed parameter accessor is assembled from:
//!
//! - [`StringConverter`]: decodes a raw parameter string into a `T`, or fails
//!   with a [`ConversionError`]
//! - [`Validator`]: accepts or rejects an already-decoded `T`, with a
//!   human-readable reason on rejection
//!
//! Both traits are implemented for plain closures, so a new accessor is just a
//! new (converter, validator) pair.
//!
//! ## Usage
//! ```rust
//! use convert::{IsInRange, StringConverter, StringToDouble, Validator};
//!
//! let value = StringToDouble.decode("0.25").unwrap();
//! assert!(IsInRange::closed(0.0, 1.0).validate(&value).is_ok());
//! ```

pub mod converter;
pub mod symbol;
pub mod validator;

pub use converter::{
    StrictStringToBoolean, StringConverter, StringToDouble, StringToEnum, StringToFile,
    StringToInteger, StringToOsFile, StringToStringList, StringToStringSet, StringToSymbolList,
    StringToSymbolSet, split_list,
};
pub use errors::{ConversionError, ValidationError};
pub use symbol::Symbol;
pub use validator::{
    AlwaysValid, And, FileExists, IsDirectory, IsFile, IsInRange, IsNonNegative, IsPositive,
    Validator, ValidatorExt,
};
