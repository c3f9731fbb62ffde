//! # Parameter File Loading
//!
//! Produces the flat key-value mapping a [`Parameters`](crate::Parameters)
//! store is built from.
//!
//! Three formats are understood, detected from the file extension:
//! - `.toml`: tables flatten to dotted keys
//! - `.yaml` / `.yml`: mappings flatten to dotted keys
//! - anything else: `key: value` / `key=value` lines

use errors::LoadError;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Flat mapping from dotted key to raw value.
pub type RawParameters = BTreeMap<String, String>;

fn read(path: &Path) -> Result<String, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf()
        });
    }
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source
    })
}

/// Parses line-oriented parameter text.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Reads the plain parameter format: one `key: value` or `key=value` pair per
/// line. Whichever separator comes first splits the line, so values may
/// contain either character.
///
/// ## Behavior
/// - Blank lines and lines starting with `#` are skipped
/// - Keys and values are trimmed
/// - A later line for the same key overrides an earlier one
///
/// ## Usage
/// ```rust
/// use parameters::parse_params_str;
///
/// let raw = parse_params_str("# comment\nbeam: 8\nmodel = a=b.bin\n", "inline").unwrap();
/// assert_eq!(raw["beam"], "8");
/// assert_eq!(raw["model"], "a=b.bin");
/// ```
///
/// ## Error Handling
/// Returns `LoadError::MalformedLine` with the 1-based line number for a line
/// with no separator or an empty key.
pub fn parse_params_str(text: &str, origin: &str) -> Result<RawParameters, LoadError> {
    let mut params = RawParameters::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let malformed = |reason: &str| LoadError::MalformedLine {
            origin: origin.to_string(),
            line: index + 1,
            reason: reason.to_string()
        };
        let split_at = line
            .find([':', '='])
            .ok_or_else(|| malformed("expected 'key: value' or 'key=value'"))?;
        let key = line[..split_at].trim();
        let value = line[split_at + 1..].trim();
        if key.is_empty() {
            return Err(malformed("empty key"));
        }
        params.insert(key.to_string(), value.to_string());
    }
    Ok(params)
}

pub fn load_params(path: &Path) -> Result<RawParameters, LoadError> {
    let contents = read(path)?;
    parse_params_str(&contents, &path.display().to_string())
}

/// Loads a TOML document, flattening nested tables into dotted keys.
///
/// Arrays become comma-separated values; arrays of tables are rejected.
pub fn load_toml(path: &Path) -> Result<RawParameters, LoadError> {
    let contents = read(path)?;
    let table: toml::Table = toml::from_str(&contents).map_err(|e| LoadError::TomlParse {
        reason: e.to_string()
    })?;

    let mut params = RawParameters::new();
    flatten_toml_table("", &table, &mut params)?;
    Ok(params)
}

fn join_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn flatten_toml_table(
    prefix: &str,
    table: &toml::Table,
    out: &mut RawParameters,
) -> Result<(), LoadError> {
    for (key, value) in table {
        let key = join_key(prefix, key);
        match value {
            toml::Value::Table(nested) => flatten_toml_table(&key, nested, out)?,
            toml::Value::Array(items) => {
                let rendered = items
                    .iter()
                    .map(|item| toml_scalar(&key, item))
                    .collect::<Result<Vec<_>, _>>()?;
                out.insert(key, rendered.join(","));
            }
            scalar => {
                let rendered = toml_scalar(&key, scalar)?;
                out.insert(key, rendered);
            }
        }
    }
    Ok(())
}

fn toml_scalar(key: &str, value: &toml::Value) -> Result<String, LoadError> {
    match value {
        toml::Value::String(s) => Ok(s.clone()),
        toml::Value::Integer(i) => Ok(i.to_string()),
        toml::Value::Float(f) => Ok(f.to_string()),
        toml::Value::Boolean(b) => Ok(b.to_string()),
        toml::Value::Datetime(dt) => Ok(dt.to_string()),
        toml::Value::Array(_) | toml::Value::Table(_) => Err(LoadError::InvalidDocument {
            reason: format!("'{key}' nests a table or array inside an array")
        })
    }
}

/// Loads a YAML document, flattening nested mappings into dotted keys.
///
/// Sequences become comma-separated values and `null` becomes an empty
/// value. The root must be a mapping with string keys.
pub fn load_yaml(path: &Path) -> Result<RawParameters, LoadError> {
    let contents = read(path)?;
    let document: serde_yaml::Value =
        serde_yaml::from_str(&contents).map_err(|e| LoadError::YamlParse {
            reason: e.to_string()
        })?;

    let serde_yaml::Value::Mapping(root) = document else {
        return Err(LoadError::InvalidDocument {
            reason: "the document root is not a mapping".to_string()
        });
    };
    let mut params = RawParameters::new();
    flatten_yaml_mapping("", &root, &mut params)?;
    Ok(params)
}

fn flatten_yaml_mapping(
    prefix: &str,
    mapping: &serde_yaml::Mapping,
    out: &mut RawParameters,
) -> Result<(), LoadError> {
    for (key, value) in mapping {
        let key = match key {
            serde_yaml::Value::String(s) => join_key(prefix, s),
            serde_yaml::Value::Number(n) => join_key(prefix, &n.to_string()),
            serde_yaml::Value::Bool(b) => join_key(prefix, &b.to_string()),
            _ => {
                return Err(LoadError::InvalidDocument {
                    reason: format!("non-scalar key under '{prefix}'")
                });
            }
        };
        match value {
            serde_yaml::Value::Mapping(nested) => flatten_yaml_mapping(&key, nested, out)?,
            serde_yaml::Value::Sequence(items) => {
                let rendered = items
                    .iter()
                    .map(|item| yaml_scalar(&key, item))
                    .collect::<Result<Vec<_>, _>>()?;
                out.insert(key, rendered.join(","));
            }
            scalar => {
                let rendered = yaml_scalar(&key, scalar)?;
                out.insert(key, rendered);
            }
        }
    }
    Ok(())
}

fn yaml_scalar(key: &str, value: &serde_yaml::Value) -> Result<String, LoadError> {
    match value {
        serde_yaml::Value::Null => Ok(String::new()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::String(s) => Ok(s.clone()),
        serde_yaml::Value::Tagged(tagged) => yaml_scalar(key, &tagged.value),
        serde_yaml::Value::Sequence(_) | serde_yaml::Value::Mapping(_) => {
            Err(LoadError::InvalidDocument {
                reason: format!("'{key}' nests a mapping or sequence inside a sequence")
            })
        }
    }
}

/// Loads a parameter file, picking the format from its extension.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Single entry point used by [`Parameters::load`](crate::Parameters::load).
///
/// ## Supported Formats
/// - `.toml`: TOML format
/// - `.yaml` / `.yml`: YAML format
/// - any other extension: line-oriented parameter text
///
/// ## Error Handling
/// Returns `LoadError` for:
/// - File not found
/// - A path without an extension
/// - Parse errors for the detected format
pub fn load_from_file(path: &Path) -> Result<RawParameters, LoadError> {
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| LoadError::NoExtension {
            path: path.to_path_buf()
        })?;

    let params = match extension.to_lowercase().as_str() {
        "toml" => load_toml(path)?,
        "yaml" | "yml" => load_yaml(path)?,
        _ => load_params(path)?
    };
    debug!(path = %path.display(), keys = params.len(), "Loaded parameter file");
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_params_str_separators_and_comments() {
        let text = "\
# generated
corpus: ace2005

tagger.beam_width=8
  tagger.model :  models/tagger.bin
url: http://example.org/a=b
";
        let params = parse_params_str(text, "test").unwrap();
        assert_eq!(params.len(), 4);
        assert_eq!(params["corpus"], "ace2005");
        assert_eq!(params["tagger.beam_width"], "8");
        assert_eq!(params["tagger.model"], "models/tagger.bin");
        assert_eq!(params["url"], "http://example.org/a=b");
    }

    #[test]
    fn test_parse_params_str_later_line_overrides() {
        let params = parse_params_str("a: 1\na: 2\n", "test").unwrap();
        assert_eq!(params["a"], "2");
    }

    #[test]
    fn test_parse_params_str_allows_empty_value() {
        let params = parse_params_str("list:\n", "test").unwrap();
        assert_eq!(params["list"], "");
    }

    #[test]
    fn test_parse_params_str_reports_line_number() {
        match parse_params_str("a: 1\n\njust words\n", "inline") {
            Err(LoadError::MalformedLine { origin, line, .. }) => {
                assert_eq!(origin, "inline");
                assert_eq!(line, 3);
            }
            other => panic!("unexpected result: {other:?}")
        }
        assert!(matches!(
            parse_params_str(" = value", "inline"),
            Err(LoadError::MalformedLine { line: 1, .. })
        ));
    }

    #[test]
    fn test_load_from_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.toml");
        fs::write(
            &path,
            r#"
corpus = "ace2005"
threads = 4

[tagger]
beam_width = 8
probability = 0.25
labels = ["PER", "ORG", "LOC"]

[tagger.features]
lowercase = true
"#
        )
        .unwrap();

        let params = load_from_file(&path).unwrap();
        assert_eq!(params["corpus"], "ace2005");
        assert_eq!(params["threads"], "4");
        assert_eq!(params["tagger.beam_width"], "8");
        assert_eq!(params["tagger.probability"], "0.25");
        assert_eq!(params["tagger.labels"], "PER,ORG,LOC");
        assert_eq!(params["tagger.features.lowercase"], "true");
    }

    #[test]
    fn test_load_from_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.yml");
        fs::write(
            &path,
            "corpus: ace2005\ntagger:\n  beam_width: 8\n  labels:\n    - PER\n    - ORG\n  note: ~\n"
        )
        .unwrap();

        let params = load_from_file(&path).unwrap();
        assert_eq!(params["corpus"], "ace2005");
        assert_eq!(params["tagger.beam_width"], "8");
        assert_eq!(params["tagger.labels"], "PER,ORG");
        assert_eq!(params["tagger.note"], "");
    }

    #[test]
    fn test_yaml_root_must_be_mapping() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("list.yaml");
        fs::write(&path, "- a\n- b\n").unwrap();
        assert!(matches!(
            load_yaml(&path),
            Err(LoadError::InvalidDocument { .. })
        ));
    }

    #[test]
    fn test_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "this is not = = toml").unwrap();
        assert!(matches!(load_toml(&path), Err(LoadError::TomlParse { .. })));
    }

    #[test]
    fn test_other_extensions_use_params_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.params");
        fs::write(&path, "a: 1\n").unwrap();
        assert_eq!(load_from_file(&path).unwrap()["a"], "1");
    }

    #[test]
    fn test_missing_file_and_extension() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            load_from_file(&dir.path().join("absent.params")),
            Err(LoadError::FileNotFound { .. })
        ));
        assert!(matches!(
            load_from_file(&dir.path().join("noext")),
            Err(LoadError::NoExtension { .. })
        ));
    }
}
