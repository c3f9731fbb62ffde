//! # String Converters
//!
//! Decoders from a raw parameter string to a typed value. A converter never
//! produces "no value" for a decodable input: the return type is a plain `T`.

use errors::ConversionError;
use std::collections::BTreeSet;
use std::fmt::Display;
use std::marker::PhantomData;
use std::path::{MAIN_SEPARATOR, PathBuf};
use strum::IntoEnumIterator;

use crate::symbol::Symbol;

/// Decodes a raw parameter string into a `T`.
pub trait StringConverter<T> {
    fn decode(&self, value: &str) -> Result<T, ConversionError>;
}

impl<T, F> StringConverter<T> for F
where
    F: Fn(&str) -> Result<T, ConversionError>,
{
    fn decode(&self, value: &str) -> Result<T, ConversionError> {
        self(value)
    }
}

/// Splits `value` on `separator`, trimming every element and dropping empty
/// ones. No escaping is supported, so elements cannot contain the separator.
pub fn split_list(value: &str, separator: &str) -> Vec<String> {
    value
        .split(separator)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Base-10 signed integer.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringToInteger;

impl StringConverter<i64> for StringToInteger {
    fn decode(&self, value: &str) -> Result<i64, ConversionError> {
        Ok(value.parse::<i64>()?)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StringToDouble;

impl StringConverter<f64> for StringToDouble {
    fn decode(&self, value: &str) -> Result<f64, ConversionError> {
        Ok(value.parse::<f64>()?)
    }
}

/// Accepts exactly `true` or `false` (case-sensitive). `yes`, `1`, `True`
/// and friends are conversion failures.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictStringToBoolean;

impl StringConverter<bool> for StrictStringToBoolean {
    fn decode(&self, value: &str) -> Result<bool, ConversionError> {
        match value {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(ConversionError::InvalidBoolean {
                value: other.to_string()
            })
        }
    }
}

/// Path taken verbatim from the parameter value.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringToFile;

impl StringConverter<PathBuf> for StringToFile {
    fn decode(&self, value: &str) -> Result<PathBuf, ConversionError> {
        Ok(PathBuf::from(value))
    }
}

/// Path with both `/` and `\` rewritten to the platform separator, so
/// parameter files written on one OS resolve on another.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringToOsFile;

impl StringConverter<PathBuf> for StringToOsFile {
    fn decode(&self, value: &str) -> Result<PathBuf, ConversionError> {
        let translated: String = value
            .chars()
            .map(|c| if c == '/' || c == '\\' { MAIN_SEPARATOR } else { c })
            .collect();
        Ok(PathBuf::from(translated))
    }
}

#[derive(Debug, Clone)]
pub struct StringToStringList {
    separator: String
}

impl StringToStringList {
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into()
        }
    }
}

impl Default for StringToStringList {
    fn default() -> Self {
        Self::new(",")
    }
}

impl StringConverter<Vec<String>> for StringToStringList {
    fn decode(&self, value: &str) -> Result<Vec<String>, ConversionError> {
        Ok(split_list(value, &self.separator))
    }
}

#[derive(Debug, Clone, Default)]
pub struct StringToStringSet {
    list: StringToStringList
}

impl StringToStringSet {
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            list: StringToStringList::new(separator)
        }
    }
}

impl StringConverter<BTreeSet<String>> for StringToStringSet {
    fn decode(&self, value: &str) -> Result<BTreeSet<String>, ConversionError> {
        Ok(self.list.decode(value)?.into_iter().collect())
    }
}

#[derive(Debug, Clone, Default)]
pub struct StringToSymbolList {
    list: StringToStringList
}

impl StringToSymbolList {
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            list: StringToStringList::new(separator)
        }
    }
}

impl StringConverter<Vec<Symbol>> for StringToSymbolList {
    fn decode(&self, value: &str) -> Result<Vec<Symbol>, ConversionError> {
        Ok(self.list.decode(value)?.into_iter().map(Symbol::from).collect())
    }
}

#[derive(Debug, Clone, Default)]
pub struct StringToSymbolSet {
    list: StringToStringList
}

impl StringToSymbolSet {
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            list: StringToStringList::new(separator)
        }
    }
}

impl StringConverter<BTreeSet<Symbol>> for StringToSymbolSet {
    fn decode(&self, value: &str) -> Result<BTreeSet<Symbol>, ConversionError> {
        Ok(self.list.decode(value)?.into_iter().map(Symbol::from).collect())
    }
}

/// Matches the raw value against the `Display` form of every variant of `T`.
pub struct StringToEnum<T> {
    _marker: PhantomData<fn() -> T>
}

impl<T> StringToEnum<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData
        }
    }
}

impl<T> Default for StringToEnum<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> StringToEnum<T>
where
    T: IntoEnumIterator + Display,
{
    /// Names of every variant, in declaration order.
    pub fn allowed_values() -> Vec<String> {
        T::iter().map(|variant| variant.to_string()).collect()
    }
}

impl<T> StringConverter<T> for StringToEnum<T>
where
    T: IntoEnumIterator + Display,
{
    fn decode(&self, value: &str) -> Result<T, ConversionError> {
        T::iter()
            .find(|variant| variant.to_string() == value)
            .ok_or_else(|| ConversionError::UnknownSymbol {
                value: value.to_string(),
                allowed: Self::allowed_values()
            })
    }
}
