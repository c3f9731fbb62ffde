use std::fmt;
use std::sync::Arc;

/// Cheaply clonable immutable string used for identifiers read from
/// parameter lists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(Arc<str>);

impl Symbol {
    pub fn new(value: &str) -> Self {
        Self(Arc::from(value))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Symbol {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbols_compare_by_content() {
        let a = Symbol::from("entity");
        let b = Symbol::from(String::from("entity"));
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "entity");
        assert_eq!(a.to_string(), "entity");
    }
}
