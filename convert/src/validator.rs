//! # Value Validators
//!
//! Checks applied to a value after it has been decoded. Validators compose
//! with [`ValidatorExt::and`]: every member must accept.
//!
//! Numeric bounds are checked through `validator::ValidateRange`, the same
//! range primitive used by `#[validate(range(...))]` derives.

use errors::ValidationError;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use validator::ValidateRange;

/// Accepts or rejects an already-decoded value.
pub trait Validator<T: ?Sized> {
    fn validate(&self, value: &T) -> Result<(), ValidationError>;
}

impl<T, F> Validator<T> for F
where
    T: ?Sized,
    F: Fn(&T) -> Result<(), ValidationError>,
{
    fn validate(&self, value: &T) -> Result<(), ValidationError> {
        self(value)
    }
}

/// Combinators available on every validator.
pub trait ValidatorExt<T: ?Sized>: Validator<T> + Sized {
    fn and<V: Validator<T>>(self, other: V) -> And<Self, V> {
        And::new(self, other)
    }
}

impl<T: ?Sized, V: Validator<T>> ValidatorExt<T> for V {}

/// Logical AND of two validators; the first rejection wins.
#[derive(Debug, Clone, Copy)]
pub struct And<A, B> {
    first: A,
    second: B
}

impl<A, B> And<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<T: ?Sized, A: Validator<T>, B: Validator<T>> Validator<T> for And<A, B> {
    fn validate(&self, value: &T) -> Result<(), ValidationError> {
        self.first.validate(value)?;
        self.second.validate(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysValid;

impl<T: ?Sized> Validator<T> for AlwaysValid {
    fn validate(&self, _value: &T) -> Result<(), ValidationError> {
        Ok(())
    }
}

// NaN and other values that are not comparable with themselves slip through
// every range check, so they are rejected up front.
fn ensure_comparable<T: PartialOrd + Display>(value: &T) -> Result<(), ValidationError> {
    if value.partial_cmp(value).is_none() {
        return Err(ValidationError::new(format!("{value} is not a comparable number")));
    }
    Ok(())
}

/// Strictly greater than zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsPositive;

impl<T> Validator<T> for IsPositive
where
    T: ValidateRange<T> + PartialOrd + Default + Display,
{
    fn validate(&self, value: &T) -> Result<(), ValidationError> {
        ensure_comparable(value)?;
        if value.validate_range(None, None, Some(T::default()), None) {
            Ok(())
        } else {
            Err(ValidationError::new(format!("{value} is not positive")))
        }
    }
}

/// Greater than or equal to zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsNonNegative;

impl<T> Validator<T> for IsNonNegative
where
    T: ValidateRange<T> + PartialOrd + Default + Display,
{
    fn validate(&self, value: &T) -> Result<(), ValidationError> {
        ensure_comparable(value)?;
        if value.validate_range(Some(T::default()), None, None, None) {
            Ok(())
        } else {
            Err(ValidationError::new(format!("{value} is negative")))
        }
    }
}

/// Inside the closed interval `[min, max]`.
#[derive(Debug, Clone, Copy)]
pub struct IsInRange<T> {
    min: T,
    max: T
}

impl<T> IsInRange<T> {
    pub fn closed(min: T, max: T) -> Self {
        Self { min, max }
    }
}

impl<T> Validator<T> for IsInRange<T>
where
    T: ValidateRange<T> + PartialOrd + Copy + Display,
{
    fn validate(&self, value: &T) -> Result<(), ValidationError> {
        ensure_comparable(value)?;
        if value.validate_range(Some(self.min), Some(self.max), None, None) {
            Ok(())
        } else {
            Err(ValidationError::new(format!(
                "{value} is not in the range [{}, {}]",
                self.min, self.max
            )))
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FileExists;

impl Validator<Path> for FileExists {
    fn validate(&self, value: &Path) -> Result<(), ValidationError> {
        if value.exists() {
            Ok(())
        } else {
            Err(ValidationError::new(format!("{} does not exist", value.display())))
        }
    }
}

impl Validator<PathBuf> for FileExists {
    fn validate(&self, value: &PathBuf) -> Result<(), ValidationError> {
        Validator::<Path>::validate(self, value.as_path())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IsFile;

impl Validator<Path> for IsFile {
    fn validate(&self, value: &Path) -> Result<(), ValidationError> {
        if value.is_file() {
            Ok(())
        } else {
            Err(ValidationError::new(format!("{} is not a file", value.display())))
        }
    }
}

impl Validator<PathBuf> for IsFile {
    fn validate(&self, value: &PathBuf) -> Result<(), ValidationError> {
        Validator::<Path>::validate(self, value.as_path())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IsDirectory;

impl Validator<Path> for IsDirectory {
    fn validate(&self, value: &Path) -> Result<(), ValidationError> {
        if value.is_dir() {
            Ok(())
        } else {
            Err(ValidationError::new(format!("{} is not a directory", value.display())))
        }
    }
}

impl Validator<PathBuf> for IsDirectory {
    fn validate(&self, value: &PathBuf) -> Result<(), ValidationError> {
        Validator::<Path>::validate(self, value.as_path())
    }
}
