use parameters::{
    ConversionError, FromParameters, ParameterError, Parameters, TypeRegistration, TypeRegistry,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

trait Tokenizer {
    fn tokenize(&self, text: &str) -> Vec<String>;
}

trait Normalizer {
    fn normalize(&self, token: &str) -> String;
}

struct WhitespaceTokenizer {
    lowercase: bool
}

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.split_whitespace()
            .map(|token| {
                if self.lowercase {
                    token.to_lowercase()
                } else {
                    token.to_string()
                }
            })
            .collect()
    }
}

impl FromParameters for WhitespaceTokenizer {
    fn from_parameters(params: &Parameters) -> Result<Self, ParameterError> {
        let scoped = params.copy_namespace("whitespace")?;
        Ok(Self {
            lowercase: scoped.get_optional_boolean("lowercase")?.unwrap_or(false)
        })
    }
}

struct FixedWidthTokenizer {
    width: usize
}

impl Tokenizer for FixedWidthTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.chars()
            .collect::<Vec<_>>()
            .chunks(self.width)
            .map(|chunk| chunk.iter().collect())
            .collect()
    }
}

struct Stemmer;

impl Normalizer for Stemmer {
    fn normalize(&self, token: &str) -> String {
        token.trim_end_matches('s').to_string()
    }
}

/// Builds its tokenizer from its own namespace.
struct Pipeline {
    tokenizer: Box<dyn Tokenizer>,
    normalizers: Vec<Box<dyn Normalizer>>
}

impl FromParameters for Pipeline {
    fn from_parameters(params: &Parameters) -> Result<Self, ParameterError> {
        let scoped = params.copy_namespace("pipeline")?;
        Ok(Self {
            tokenizer: scoped.get_configured_instance::<dyn Tokenizer>("tokenizer")?,
            normalizers: scoped
                .get_optional_configured_instance::<dyn Normalizer>("normalizer")?
                .into_iter()
                .collect()
        })
    }
}

impl Pipeline {
    fn run(&self, text: &str) -> Vec<String> {
        self.tokenizer
            .tokenize(text)
            .iter()
            .map(|token| {
                self.normalizers
                    .iter()
                    .fold(token.clone(), |acc, normalizer| normalizer.normalize(&acc))
            })
            .collect()
    }
}

static FIXED_WIDTH_BUILDS: AtomicUsize = AtomicUsize::new(0);

fn registry() -> Arc<TypeRegistry> {
    let mut registry = TypeRegistry::new();
    registry
        .register(
            TypeRegistration::<WhitespaceTokenizer>::new("tokenizers.Whitespace")
                .with_constructor()
                .implements::<dyn Tokenizer>(|tokenizer| Box::new(tokenizer))
        )
        .unwrap();
    registry
        .register(
            TypeRegistration::<FixedWidthTokenizer>::new("tokenizers.FixedWidth")
                .with_factory("from_width", |params| {
                    FIXED_WIDTH_BUILDS.fetch_add(1, Ordering::SeqCst);
                    let width = params.get_positive_integer("fixed_width.width")?;
                    Ok(FixedWidthTokenizer {
                        width: width as usize
                    })
                })
                .implements::<dyn Tokenizer>(|tokenizer| Box::new(tokenizer))
        )
        .unwrap();
    registry
        .register(
            TypeRegistration::<Stemmer>::new("normalizers.Stemmer")
                .with_factory("create", |_| Ok(Stemmer))
                .implements::<dyn Normalizer>(|stemmer| Box::new(stemmer))
        )
        .unwrap();
    registry
        .register(
            TypeRegistration::<Pipeline>::new("Pipeline")
                .with_constructor()
        )
        .unwrap();
    Arc::new(registry)
}

fn params(text: &str) -> Parameters {
    text.parse::<Parameters>().unwrap().with_registry(registry())
}

#[test]
fn test_configuration_selects_implementation() {
    let p = params("tokenizer: tokenizers.Whitespace\nwhitespace.lowercase: true\n");
    let tokenizer = p.get_configured_instance::<dyn Tokenizer>("tokenizer").unwrap();
    assert_eq!(tokenizer.tokenize("The Cat"), vec!["the", "cat"]);

    let p = params("tokenizer: tokenizers.FixedWidth\nfixed_width.width: 2\n");
    let tokenizer = p.get_configured_instance::<dyn Tokenizer>("tokenizer").unwrap();
    assert_eq!(tokenizer.tokenize("abcde"), vec!["ab", "cd", "e"]);
}

#[test]
fn test_nested_construction_uses_scoped_parameters() {
    let p = params(
        "\
pipeline.tokenizer: tokenizers.Whitespace
pipeline.normalizer: normalizers.Stemmer
pipeline.whitespace.lowercase: true
root: Pipeline
"
    );
    let pipeline = p.get_configured_instance::<Pipeline>("root").unwrap();
    assert_eq!(pipeline.run("Dogs bark"), vec!["dog", "bark"]);
}

#[test]
fn test_nested_failure_keeps_deepest_diagnostic() {
    let p = params(
        "\
pipeline.tokenizer: tokenizers.Whitespace
pipeline.whitespace.lowercase: maybe
root: Pipeline
"
    );
    match p.get_configured_instance::<Pipeline>("root") {
        Err(ParameterError::Conversion { key, value, .. }) => {
            assert_eq!(key, "pipeline.whitespace.lowercase");
            assert_eq!(value, "maybe");
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("construction should fail")
    }

    let p = params("pipeline.tokenizer: tokenizers.Unknown\nroot: Pipeline\n");
    match p.get_configured_instance::<Pipeline>("root") {
        Err(ParameterError::Conversion { key, source, .. }) => {
            assert_eq!(key, "pipeline.tokenizer");
            assert!(matches!(source, ConversionError::UnknownType { .. }));
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("construction should fail")
    }
}

#[test]
fn test_capability_mismatch() {
    let p = params("normalizer: normalizers.Stemmer\n");
    match p.get_configured_instance::<dyn Tokenizer>("normalizer") {
        Err(ParameterError::Validation { key, reason, .. }) => {
            assert_eq!(key, "normalizer");
            assert!(reason.contains("cannot cast"));
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("construction should fail")
    }
}

#[test]
fn test_instance_list_aborts_on_first_failure() {
    let p = params(
        "tokenizers: tokenizers.Whitespace, tokenizers.FixedWidth\nfixed_width.width: 0\n"
    );
    assert!(matches!(
        p.get_configured_instances::<dyn Tokenizer>("tokenizers"),
        Err(ParameterError::Validation { .. })
    ));

    let p = params(
        "tokenizers: tokenizers.FixedWidth,tokenizers.Whitespace\nfixed_width.width: 3\n"
    );
    let tokenizers = p
        .get_configured_instances::<dyn Tokenizer>("tokenizers")
        .unwrap();
    assert_eq!(tokenizers.len(), 2);
    assert_eq!(tokenizers[0].tokenize("abcd"), vec!["abc", "d"]);
    assert_eq!(tokenizers[1].tokenize("ab cd"), vec!["ab", "cd"]);
}

#[test]
fn test_every_call_builds_a_new_instance() {
    let p = params("tokenizer: tokenizers.FixedWidth\nfixed_width.width: 4\n");
    let before = FIXED_WIDTH_BUILDS.load(Ordering::SeqCst);
    let _first = p.get_configured_instance::<dyn Tokenizer>("tokenizer").unwrap();
    let _second = p.get_configured_instance::<dyn Tokenizer>("tokenizer").unwrap();
    assert!(FIXED_WIDTH_BUILDS.load(Ordering::SeqCst) >= before + 2);
}

#[test]
fn test_registry_survives_scoping() {
    let p = params("outer.tokenizer: tokenizers.Whitespace\n");
    let scoped = p.copy_namespace("outer").unwrap();
    assert!(scoped.registry().is_some());
    assert!(
        scoped
            .get_configured_instance::<dyn Tokenizer>("tokenizer")
            .is_ok()
    );
}
