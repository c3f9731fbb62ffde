//! # Parameter Store
//!
//! Immutable mapping from parameter key to raw string value, plus the
//! namespace path the store was scoped through.
//!
//! The namespace path is only used to rebuild fully-qualified names for error
//! messages and dumps; it never takes part in lookup.

use crate::factory::TypeRegistry;
use convert::{StringConverter, Validator, split_list};
use errors::ParameterError;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// Parameter controlling OS-specific path separator translation in the
/// existing-path accessors.
pub const OS_FILEPATH_CONVERSION_PARAM: &str = "os_filepath_conversion";

pub(crate) const LIST_SEPARATOR: &str = ",";

/// Immutable, namespaced set of parameters.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Holds the flat key-value mapping handed over by a loader and exposes
/// typed, validated accessors over it. Keys are never empty. Every operation
/// that "changes" the store (scoping, attaching a registry) returns a new
/// store; nothing is mutated in place, so a store can be shared freely
/// between threads.
///
/// ## Usage
/// ```rust
/// use parameters::Parameters;
///
/// let params = Parameters::from_pairs([
///     ("tagger.beam_width", "8"),
///     ("tagger.model", "models/tagger.bin"),
/// ])
/// .unwrap();
///
/// let tagger = params.copy_namespace("tagger").unwrap();
/// assert_eq!(tagger.get_positive_integer("beam_width").unwrap(), 8);
/// assert_eq!(tagger.full_name("model"), "tagger.model");
/// ```
///
/// ## Errors
/// Every accessor fails fast with a [`ParameterError`] naming the
/// fully-qualified key. Absence is only tolerated by the `get_optional_*`
/// accessors, which return `Ok(None)`.
#[derive(Clone)]
pub struct Parameters {
    params: BTreeMap<String, String>,
    namespace: Vec<String>,
    registry: Option<Arc<TypeRegistry>>
}

impl Parameters {
    fn with_namespace(
        params: BTreeMap<String, String>,
        namespace: Vec<String>,
        registry: Option<Arc<TypeRegistry>>,
    ) -> Self {
        Self {
            params,
            namespace,
            registry
        }
    }

    /// Builds a store from a flat mapping.
    ///
    /// Only entries that survive a [`Parameters::dump`] and re-parse are
    /// accepted. Keys must be non-empty, free of surrounding whitespace and
    /// line breaks, must not contain `:` or `=`, and must not start with `#`.
    /// Values must be free of surrounding whitespace and line breaks.
    pub fn from_map(map: BTreeMap<String, String>) -> Result<Self, ParameterError> {
        for (key, value) in &map {
            if let Some(problem) = key_problem(key).or_else(|| value_problem(value)) {
                return Err(ParameterError::InvalidConfiguration {
                    message: format!("rejected parameter '{}': {problem}", key.escape_debug())
                });
            }
        }
        Ok(Self::with_namespace(map, Vec::new(), None))
    }

    /// Builds a store from key-value pairs. Later duplicates override earlier
    /// ones.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, ParameterError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::from_map(
            pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect()
        )
    }

    /// Loads a parameter file (format detected from the extension) and wraps
    /// it in a root store.
    pub fn load(path: &Path) -> Result<Self, ParameterError> {
        Self::from_map(crate::loader::load_from_file(path)?)
    }

    /// Returns a copy of this store that resolves configured instances
    /// through `registry`. Stores derived from the copy keep the registry.
    pub fn with_registry(&self, registry: Arc<TypeRegistry>) -> Self {
        Self::with_namespace(self.params.clone(), self.namespace.clone(), Some(registry))
    }

    pub fn registry(&self) -> Option<&Arc<TypeRegistry>> {
        self.registry.as_ref()
    }

    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Namespace segments this store was scoped through, outermost first.
    pub fn namespace(&self) -> &[String] {
        &self.namespace
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Namespace-relative keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }

    pub fn is_present(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// Whether any key starts with `namespace` followed by a dot.
    pub fn is_namespace_present(&self, namespace: &str) -> bool {
        if namespace.is_empty() {
            return false;
        }
        let probe = format!("{namespace}.");
        self.params.keys().any(|key| key.starts_with(&probe))
    }

    /// Store containing only the keys under `namespace`, with the
    /// `namespace.` prefix stripped.
    ///
    /// # M-CANONICAL-DOCS
    ///
    /// ## Purpose
    /// Hands a component the slice of configuration it owns. The namespace
    /// segment is appended to the namespace path of the result so error
    /// messages still show `namespace.key`.
    ///
    /// ## Behavior
    /// A namespace with no matching keys yields an empty store rather than
    /// an error; call [`Parameters::is_namespace_present`] first to tell
    /// "not configured" apart from "configured but empty".
    ///
    /// ## Errors
    /// `InvalidConfiguration` for an empty namespace, or when a key is exactly
    /// `namespace.` and would scope to an empty key.
    pub fn copy_namespace(&self, namespace: &str) -> Result<Self, ParameterError> {
        if namespace.is_empty() {
            return Err(ParameterError::InvalidConfiguration {
                message: "namespace may not be empty".to_string()
            });
        }
        let prefix = format!("{namespace}.");
        let mut scoped = BTreeMap::new();
        for (key, value) in &self.params {
            let Some(rest) = key.strip_prefix(&prefix) else {
                continue;
            };
            if rest.is_empty() {
                return Err(ParameterError::InvalidConfiguration {
                    message: format!(
                        "parameter {} names namespace {namespace} but no key inside it",
                        self.full_name(key)
                    )
                });
            }
            scoped.insert(rest.to_string(), value.clone());
        }

        let mut path = self.namespace.clone();
        path.push(namespace.to_string());

        debug!(
            namespace = %path.join("."),
            keys = scoped.len(),
            "Scoped parameters to namespace"
        );
        Ok(Self::with_namespace(scoped, path, self.registry.clone()))
    }

    /// [`Parameters::copy_namespace`] when the namespace has keys, otherwise a
    /// copy of this store.
    pub fn copy_namespace_if_present(&self, namespace: &str) -> Result<Self, ParameterError> {
        if self.is_namespace_present(namespace) {
            self.copy_namespace(namespace)
        } else {
            Ok(self.copy())
        }
    }

    /// `key` prefixed with the accumulated namespace path, for diagnostics.
    pub fn full_name(&self, key: &str) -> String {
        if self.namespace.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.namespace.join("."), key)
        }
    }

    pub(crate) fn raw(&self, key: &str) -> Result<&str, ParameterError> {
        self.params
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| ParameterError::missing(self.full_name(key)))
    }

    /// Raw string value of `key`.
    pub fn get_string(&self, key: &str) -> Result<String, ParameterError> {
        self.raw(key).map(ToString::to_string)
    }

    /// Fetches `key`, decodes it with `converter` and checks it with
    /// `validator`.
    ///
    /// # M-CANONICAL-DOCS
    ///
    /// ## Purpose
    /// The single pipeline every typed accessor is built from.
    ///
    /// ## Errors
    /// - `MissingRequiredParameter` when `key` is absent
    /// - `Conversion` (carrying `expectation` and the decode cause) when the
    ///   converter fails
    /// - `Validation` (carrying the rejection reason) when the validator
    ///   rejects the decoded value
    pub fn get<T, C, V>(
        &self,
        key: &str,
        converter: C,
        validator: V,
        expectation: &str,
    ) -> Result<T, ParameterError>
    where
        C: StringConverter<T>,
        V: Validator<T>,
    {
        let value = self.raw(key)?;
        self.decode_value(key, value, &converter, &validator, expectation)
    }

    /// Like [`Parameters::get`], but the value is first split on commas and
    /// every trimmed element goes through the converter and validator. The
    /// first failing element aborts the whole list.
    pub fn get_list<T, C, V>(
        &self,
        key: &str,
        converter: C,
        validator: V,
        expectation: &str,
    ) -> Result<Vec<T>, ParameterError>
    where
        C: StringConverter<T>,
        V: Validator<T>,
    {
        let value = self.raw(key)?;
        split_list(value, LIST_SEPARATOR)
            .iter()
            .map(|element| self.decode_value(key, element, &converter, &validator, expectation))
            .collect()
    }

    fn decode_value<T, C, V>(
        &self,
        key: &str,
        value: &str,
        converter: &C,
        validator: &V,
        expectation: &str,
    ) -> Result<T, ParameterError>
    where
        C: StringConverter<T>,
        V: Validator<T>,
    {
        let decoded = converter.decode(value).map_err(|source| {
            ParameterError::conversion(self.full_name(key), value, expectation, source)
        })?;
        validator
            .validate(&decoded)
            .map_err(|err| ParameterError::validation(self.full_name(key), value, err.reason))?;
        Ok(decoded)
    }

    /// Timestamped dump with fully-qualified keys.
    pub fn dump(&self) -> String {
        self.dump_with(true, true)
    }

    /// Timestamped dump with namespace-relative keys.
    pub fn dump_without_namespace_prefix(&self) -> String {
        self.dump_with(true, false)
    }

    /// Serializes the store as sorted `key: value` lines.
    ///
    /// With `print_date_time` a `#yyyy-MM-dd HH:mm:ss` comment line comes
    /// first. With `include_namespace_prefix` keys are written
    /// fully-qualified instead of relative to this store's namespace.
    pub fn dump_with(&self, print_date_time: bool, include_namespace_prefix: bool) -> String {
        let mut out = String::new();
        if print_date_time {
            out.push_str(&format!("#{}\n", chrono::Local::now().format("%Y-%m-%d %H:%M:%S")));
        }
        // BTreeMap iteration is already sorted, and a shared prefix keeps
        // fully-qualified keys in the same order.
        for (key, value) in &self.params {
            let key = if include_namespace_prefix {
                self.full_name(key)
            } else {
                key.clone()
            };
            out.push_str(&format!("{key}: {value}\n"));
        }
        out
    }
}

fn has_line_break(text: &str) -> bool {
    text.contains(['\n', '\r'])
}

fn key_problem(key: &str) -> Option<&'static str> {
    if key.is_empty() {
        Some("keys may not be empty")
    } else if key.trim() != key {
        Some("keys may not start or end with whitespace")
    } else if has_line_break(key) {
        Some("keys may not contain line breaks")
    } else if key.contains([':', '=']) {
        Some("keys may not contain ':' or '='")
    } else if key.starts_with('#') {
        Some("keys may not start with '#'")
    } else {
        None
    }
}

fn value_problem(value: &str) -> Option<&'static str> {
    if value.trim() != value {
        Some("values may not start or end with whitespace")
    } else if has_line_break(value) {
        Some("values may not contain line breaks")
    } else {
        None
    }
}

impl PartialEq for Parameters {
    fn eq(&self, other: &Self) -> bool {
        self.params == other.params && self.namespace == other.namespace
    }
}

impl fmt::Debug for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameters")
            .field("namespace", &self.namespace)
            .field("params", &self.params)
            .field("registry", &self.registry.is_some())
            .finish()
    }
}

impl FromStr for Parameters {
    type Err = ParameterError;

    /// Parses `key: value` / `key=value` lines into a root store.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::from_map(crate::loader::parse_params_str(text, "<string>")?)
    }
}
