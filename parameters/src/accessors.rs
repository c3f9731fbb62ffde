//! # Typed Accessors
//!
//! Scalar, list and enumerated accessors. Each one is [`Parameters::get`] or
//! [`Parameters::get_list`] with a fixed converter, validator and
//! expectation label.

use crate::parameters::Parameters;
use convert::{
    AlwaysValid, IsInRange, IsNonNegative, IsPositive, StrictStringToBoolean, StringToDouble,
    StringToEnum, StringToInteger, StringToStringList, StringToStringSet, StringToSymbolList,
    StringToSymbolSet, Symbol,
};
use errors::{ConversionError, ParameterError};
use std::collections::{BTreeSet, HashMap};
use std::fmt::Display;
use strum::IntoEnumIterator;

const STRING_LIST: &str = "comma-separated list of strings";

impl Parameters {
    /// Runs `accessor` only when `key` is present.
    ///
    /// Absence is `Ok(None)`; a present but invalid value is still an error.
    pub fn optional<T, F>(&self, key: &str, accessor: F) -> Result<Option<T>, ParameterError>
    where
        F: FnOnce(&Self, &str) -> Result<T, ParameterError>,
    {
        if self.is_present(key) {
            accessor(self, key).map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn get_optional_string(&self, key: &str) -> Result<Option<String>, ParameterError> {
        self.optional(key, Self::get_string)
    }

    pub fn get_boolean(&self, key: &str) -> Result<bool, ParameterError> {
        self.get(key, StrictStringToBoolean, AlwaysValid, "boolean")
    }

    pub fn get_optional_boolean(&self, key: &str) -> Result<Option<bool>, ParameterError> {
        self.optional(key, Self::get_boolean)
    }

    pub fn get_integer(&self, key: &str) -> Result<i64, ParameterError> {
        self.get(key, StringToInteger, AlwaysValid, "integer")
    }

    pub fn get_optional_integer(&self, key: &str) -> Result<Option<i64>, ParameterError> {
        self.optional(key, Self::get_integer)
    }

    pub fn get_positive_integer(&self, key: &str) -> Result<i64, ParameterError> {
        self.get(key, StringToInteger, IsPositive, "positive integer")
    }

    pub fn get_non_negative_integer(&self, key: &str) -> Result<i64, ParameterError> {
        self.get(key, StringToInteger, IsNonNegative, "non-negative integer")
    }

    pub fn get_integer_list(&self, key: &str) -> Result<Vec<i64>, ParameterError> {
        self.get_list(key, StringToInteger, AlwaysValid, "integer")
    }

    pub fn get_positive_integer_list(&self, key: &str) -> Result<Vec<i64>, ParameterError> {
        self.get_list(key, StringToInteger, IsPositive, "positive integer")
    }

    pub fn get_double(&self, key: &str) -> Result<f64, ParameterError> {
        self.get(key, StringToDouble, AlwaysValid, "double")
    }

    pub fn get_positive_double(&self, key: &str) -> Result<f64, ParameterError> {
        self.get(key, StringToDouble, IsPositive, "positive double")
    }

    pub fn get_optional_positive_double(&self, key: &str) -> Result<Option<f64>, ParameterError> {
        self.optional(key, Self::get_positive_double)
    }

    pub fn get_positive_double_list(&self, key: &str) -> Result<Vec<f64>, ParameterError> {
        self.get_list(key, StringToDouble, IsPositive, "positive double")
    }

    pub fn get_non_negative_double(&self, key: &str) -> Result<f64, ParameterError> {
        self.get(key, StringToDouble, IsNonNegative, "non-negative double")
    }

    pub fn get_non_negative_double_list(&self, key: &str) -> Result<Vec<f64>, ParameterError> {
        self.get_list(key, StringToDouble, IsNonNegative, "non-negative double")
    }

    /// A double in the closed interval `[0.0, 1.0]`.
    pub fn get_probability(&self, key: &str) -> Result<f64, ParameterError> {
        self.get(
            key,
            StringToDouble,
            IsInRange::closed(0.0, 1.0),
            "probability"
        )
    }

    /// Comma-separated strings, trimmed, in order. An empty value is an empty
    /// list.
    pub fn get_string_list(&self, key: &str) -> Result<Vec<String>, ParameterError> {
        self.get(key, StringToStringList::default(), AlwaysValid, STRING_LIST)
    }

    pub fn get_optional_string_list(
        &self,
        key: &str,
    ) -> Result<Option<Vec<String>>, ParameterError> {
        self.optional(key, Self::get_string_list)
    }

    pub fn get_string_set(&self, key: &str) -> Result<BTreeSet<String>, ParameterError> {
        self.get(key, StringToStringSet::default(), AlwaysValid, STRING_LIST)
    }

    pub fn get_symbol_list(&self, key: &str) -> Result<Vec<Symbol>, ParameterError> {
        self.get(key, StringToSymbolList::default(), AlwaysValid, STRING_LIST)
    }

    pub fn get_symbol_set(&self, key: &str) -> Result<BTreeSet<Symbol>, ParameterError> {
        self.get(key, StringToSymbolSet::default(), AlwaysValid, STRING_LIST)
    }

    /// The raw value, which must be one of `allowed`.
    pub fn get_string_of(&self, key: &str, allowed: &[&str]) -> Result<String, ParameterError> {
        if allowed.is_empty() {
            return Err(ParameterError::InvalidConfiguration {
                message: format!("no allowed values supplied for {}", self.full_name(key))
            });
        }
        let value = self.raw(key)?;
        if allowed.iter().any(|candidate| *candidate == value) {
            Ok(value.to_string())
        } else {
            Err(ParameterError::invalid_enumerated(
                self.full_name(key),
                value,
                allowed.iter().copied()
            ))
        }
    }

    /// Uses the raw value as a key into `possible_values`.
    pub fn get_mapped<'a, T>(
        &self,
        key: &str,
        possible_values: &'a HashMap<String, T>,
    ) -> Result<&'a T, ParameterError> {
        if possible_values.is_empty() {
            return Err(ParameterError::InvalidConfiguration {
                message: format!("no mapped values supplied for {}", self.full_name(key))
            });
        }
        let value = self.raw(key)?;
        possible_values.get(value).ok_or_else(|| {
            let mut allowed: Vec<&String> = possible_values.keys().collect();
            allowed.sort();
            ParameterError::invalid_enumerated(self.full_name(key), value, allowed.into_iter().cloned())
        })
    }

    /// A variant of `T`, matched against each variant's `Display` form.
    pub fn get_enum<T>(&self, key: &str) -> Result<T, ParameterError>
    where
        T: IntoEnumIterator + Display,
    {
        let value = self.raw(key)?;
        self.decode_enum(key, value)
    }

    pub fn get_optional_enum<T>(&self, key: &str) -> Result<Option<T>, ParameterError>
    where
        T: IntoEnumIterator + Display,
    {
        self.optional(key, Self::get_enum::<T>)
    }

    pub fn get_enum_list<T>(&self, key: &str) -> Result<Vec<T>, ParameterError>
    where
        T: IntoEnumIterator + Display,
    {
        self.get_string_list(key)?
            .iter()
            .map(|element| self.decode_enum(key, element))
            .collect()
    }

    fn decode_enum<T>(&self, key: &str, value: &str) -> Result<T, ParameterError>
    where
        T: IntoEnumIterator + Display,
    {
        use convert::StringConverter;

        StringToEnum::<T>::new()
            .decode(value)
            .map_err(|err| match err {
                ConversionError::UnknownSymbol { value, allowed } => {
                    ParameterError::invalid_enumerated(self.full_name(key), value, allowed)
                }
                other => ParameterError::conversion(self.full_name(key), value, "enumeration", other)
            })
    }

    /// Fails with [`ParameterError::Constraint`] when neither key is present.
    pub fn assert_at_least_one_defined(&self, first: &str, second: &str) -> Result<(), ParameterError> {
        if self.is_present(first) || self.is_present(second) {
            Ok(())
        } else {
            Err(ParameterError::constraint(format!(
                "At least one of {} and {} must be defined.",
                self.full_name(first),
                self.full_name(second)
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::{Display, EnumIter};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
    #[strum(serialize_all = "snake_case")]
    enum Decoder {
        Greedy,
        Beam,
        Viterbi
    }

    fn params(pairs: &[(&str, &str)]) -> Parameters {
        Parameters::from_pairs(pairs.iter().copied()).unwrap()
    }

    #[test]
    fn test_integer_accessors() {
        let p = params(&[("zero", "0"), ("neg", "-4"), ("pos", "12"), ("junk", "1.5")]);

        assert_eq!(p.get_integer("neg").unwrap(), -4);
        assert_eq!(p.get_positive_integer("pos").unwrap(), 12);
        assert_eq!(p.get_non_negative_integer("zero").unwrap(), 0);

        assert!(matches!(
            p.get_positive_integer("zero"),
            Err(ParameterError::Validation { .. })
        ));
        assert!(matches!(
            p.get_non_negative_integer("neg"),
            Err(ParameterError::Validation { .. })
        ));
        assert!(matches!(
            p.get_integer("junk"),
            Err(ParameterError::Conversion { .. })
        ));
    }

    #[test]
    fn test_probability_bounds_are_inclusive() {
        let p = params(&[
            ("low", "0.0"),
            ("high", "1.0"),
            ("below", "-0.0001"),
            ("above", "1.0001")
        ]);
        assert_eq!(p.get_probability("low").unwrap(), 0.0);
        assert_eq!(p.get_probability("high").unwrap(), 1.0);
        assert!(matches!(
            p.get_probability("below"),
            Err(ParameterError::Validation { .. })
        ));
        assert!(matches!(
            p.get_probability("above"),
            Err(ParameterError::Validation { .. })
        ));
    }

    #[test]
    fn test_double_sign_accessors() {
        let p = params(&[("pos", "2.5"), ("zero", "0"), ("neg", "-1e-3")]);
        assert_eq!(p.get_double("neg").unwrap(), -0.001);
        assert_eq!(p.get_positive_double("pos").unwrap(), 2.5);
        assert!(p.get_positive_double("zero").is_err());
        assert_eq!(p.get_non_negative_double("zero").unwrap(), 0.0);
        assert!(p.get_non_negative_double("neg").is_err());
    }

    #[test]
    fn test_boolean_accepts_only_literals() {
        let p = params(&[("t", "true"), ("f", "false"), ("yes", "yes"), ("one", "1")]);
        assert!(p.get_boolean("t").unwrap());
        assert!(!p.get_boolean("f").unwrap());
        for key in ["yes", "one"] {
            assert!(matches!(
                p.get_boolean(key),
                Err(ParameterError::Conversion { .. })
            ));
        }
    }

    #[test]
    fn test_string_list_splitting() {
        let p = params(&[("abc", "a,b,c"), ("spaced", " a , b"), ("empty", "")]);
        assert_eq!(p.get_string_list("abc").unwrap(), vec!["a", "b", "c"]);
        assert_eq!(p.get_string_list("spaced").unwrap(), vec!["a", "b"]);
        assert!(p.get_string_list("empty").unwrap().is_empty());
        assert_eq!(p.get_symbol_list("abc").unwrap()[2].as_str(), "c");
        assert_eq!(p.get_string_set("abc").unwrap().len(), 3);
        assert!(p.get_symbol_set("abc").unwrap().contains(&Symbol::from("b")));
    }

    #[test]
    fn test_numeric_lists() {
        let p = params(&[("ints", "3, 1,2"), ("bad", "1,0"), ("doubles", "0.5,2")]);
        assert_eq!(p.get_integer_list("ints").unwrap(), vec![3, 1, 2]);
        assert_eq!(p.get_positive_integer_list("ints").unwrap(), vec![3, 1, 2]);
        assert!(matches!(
            p.get_positive_integer_list("bad"),
            Err(ParameterError::Validation { value, .. }) if value == "0"
        ));
        assert_eq!(p.get_positive_double_list("doubles").unwrap(), vec![0.5, 2.0]);
        assert_eq!(
            p.get_non_negative_double_list("bad").unwrap(),
            vec![1.0, 0.0]
        );
    }

    #[test]
    fn test_missing_key_fails_and_optional_is_none() {
        let p = params(&[]);
        assert!(matches!(
            p.get_integer("depth"),
            Err(ParameterError::MissingRequiredParameter { .. })
        ));
        assert!(matches!(
            p.get_string_list("depth"),
            Err(ParameterError::MissingRequiredParameter { .. })
        ));
        assert_eq!(p.get_optional_integer("depth").unwrap(), None);
        assert_eq!(p.get_optional_boolean("depth").unwrap(), None);
        assert_eq!(p.get_optional_string("depth").unwrap(), None);
        assert_eq!(p.get_optional_positive_double("depth").unwrap(), None);
        assert_eq!(p.get_optional_string_list("depth").unwrap(), None);
        assert_eq!(p.get_optional_enum::<Decoder>("depth").unwrap(), None);
    }

    #[test]
    fn test_optional_still_validates_present_values() {
        let p = params(&[("depth", "-1"), ("width", "3")]);
        assert_eq!(p.optional("width", Parameters::get_positive_integer).unwrap(), Some(3));
        assert!(p.optional("depth", Parameters::get_positive_integer).is_err());
    }

    #[test]
    fn test_enum_accessors() {
        let p = params(&[("decoder", "beam"), ("chain", "greedy, viterbi"), ("bad", "sampled")]);
        assert_eq!(p.get_enum::<Decoder>("decoder").unwrap(), Decoder::Beam);
        assert_eq!(
            p.get_enum_list::<Decoder>("chain").unwrap(),
            vec![Decoder::Greedy, Decoder::Viterbi]
        );

        match p.get_enum::<Decoder>("bad") {
            Err(ParameterError::InvalidEnumeratedProperty { key, value, allowed }) => {
                assert_eq!(key, "bad");
                assert_eq!(value, "sampled");
                assert_eq!(allowed, vec!["greedy", "beam", "viterbi"]);
            }
            other => panic!("unexpected result: {other:?}")
        }
    }

    #[test]
    fn test_string_of_reports_exact_allowed_set() {
        let p = params(&[("mode", "fast")]);
        let allowed = ["slow", "medium"];
        match p.get_string_of("mode", &allowed) {
            Err(ParameterError::InvalidEnumeratedProperty { allowed: reported, .. }) => {
                assert_eq!(reported, vec!["slow", "medium"]);
            }
            other => panic!("unexpected result: {other:?}")
        }
        assert_eq!(p.get_string_of("mode", &["fast", "slow"]).unwrap(), "fast");
    }

    #[test]
    fn test_mapped_lookup() {
        let p = params(&[("lang", "en"), ("other", "xx")]);
        let mut languages = HashMap::new();
        languages.insert("en".to_string(), 1_u8);
        languages.insert("de".to_string(), 2_u8);

        assert_eq!(*p.get_mapped("lang", &languages).unwrap(), 1);
        match p.get_mapped("other", &languages) {
            Err(ParameterError::InvalidEnumeratedProperty { allowed, .. }) => {
                assert_eq!(allowed, vec!["de", "en"]);
            }
            other => panic!("unexpected result: {other:?}")
        }
    }

    #[test]
    fn test_at_least_one_defined() {
        let p = params(&[("a", "1")]);
        assert!(p.assert_at_least_one_defined("a", "b").is_ok());
        assert!(p.assert_at_least_one_defined("b", "a").is_ok());
        assert!(matches!(
            p.assert_at_least_one_defined("b", "c"),
            Err(ParameterError::Constraint { .. })
        ));
    }
}
