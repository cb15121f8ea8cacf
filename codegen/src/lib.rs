use std::str::FromStr;

use proc_macro2::TokenStream;
use regex::Regex;
use tracing::debug;
use wsdlstub_wsdl::{self as wsdl, Definitions, Diagnostic};

mod linker;
mod preprocessor;
mod resolver;

pub mod emitter;
pub mod error;
pub mod rust;
pub mod spyne;
pub mod types;

pub use emitter::{Backend, Sections};
pub use error::Error;
pub use resolver::{resolve, Resolution};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Target {
    #[default]
    Spyne,
    Rust,
}

impl Target {
    pub fn backend(&self) -> &'static dyn Backend {
        match self {
            Self::Spyne => &spyne::Spyne,
            Self::Rust => &rust::Rust,
        }
    }
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "spyne" | "python" => Ok(Self::Spyne),
            "rust" => Ok(Self::Rust),
            other => Err(format!("unknown target '{}', expected 'spyne' or 'rust'", other)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Options {
    pub target: Target,
    pub sections: Sections,
    pub filter: Option<Regex>,
    /// Replaces the document's `targetNamespace` in the output.
    pub namespace: Option<String>,
}

#[derive(Debug)]
pub struct Output {
    pub code: String,
    pub diagnostics: Vec<Diagnostic>,
    /// Models omitted because of missing or cyclic dependencies.
    pub dropped: Vec<String>,
}

pub fn from_url<S: AsRef<str>>(url: S, options: &Options) -> Result<Output, Error> {
    let definitions = wsdl::parse(url)?;
    from_definitions(&definitions, options)
}

pub fn from_xml(xml: &str, options: &Options) -> Result<Output, Error> {
    let definitions = wsdl::parse_str(xml)?;
    from_definitions(&definitions, options)
}

pub fn from_definitions(definitions: &Definitions, options: &Options) -> Result<Output, Error> {
    let backend = options.target.backend();

    let mut definition = preprocessor::preprocess(
        definitions,
        backend.reserved_words(),
        backend.reserved_type_names(),
    )?;
    if let Some(namespace) = &options.namespace {
        definition.namespace = namespace.clone();
    }

    let selection = emitter::select(&definition, options.sections, options.filter.as_ref());
    debug!(
        "emitting {} models and {} operations",
        selection.models.len(),
        selection.operations.len()
    );

    let code = backend.render(&definition, &selection)?;

    Ok(Output {
        code,
        diagnostics: definition.diagnostics,
        dropped: definition.dropped,
    })
}

/// Unformatted Rust items for the whole document, for macro expansion.
pub fn tokens_from_url<S: AsRef<str>>(url: S) -> Result<TokenStream, Error> {
    let definitions = wsdl::parse(url)?;
    let definition =
        preprocessor::preprocess(&definitions, rust::RUST_KEYWORDS, rust::RUST_TYPE_NAMES)?;
    let selection = emitter::select(&definition, Sections::all(), None);
    Ok(rust::Rust.tokens(&definition, &selection))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_from_str() {
        assert_eq!("spyne".parse::<Target>(), Ok(Target::Spyne));
        assert_eq!("Rust".parse::<Target>(), Ok(Target::Rust));
        assert!("java".parse::<Target>().is_err());
        assert_eq!(Target::default(), Target::Spyne);
    }

    #[test]
    fn test_namespace_override() {
        let xml = r#"<definitions xmlns="http://schemas.xmlsoap.org/wsdl/" targetNamespace="urn:a"/>"#;
        let options = Options {
            namespace: Some("urn:b".to_owned()),
            ..Options::default()
        };

        let output = from_xml(xml, &options).expect("Failed to generate");
        assert!(output.code.contains("NAMESPACE = \"urn:b\"\n"));
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn test_malformed_input_is_fatal() {
        let error = from_xml("<definitions", &Options::default()).expect_err("should fail");
        assert!(matches!(error, Error::Wsdl(_)));
    }
}
