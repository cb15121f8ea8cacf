//! Backend-independent selection of what gets emitted.

use regex::Regex;
use wsdlstub_wsdl::types::TypeModel;

use super::{
    error::Error,
    types::{Definition, LinkedOperation},
};

/// Which output blocks to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sections {
    pub models: bool,
    pub operations: bool,
}

impl Sections {
    pub fn all() -> Self {
        Self {
            models: true,
            operations: true,
        }
    }

    pub fn models_only() -> Self {
        Self {
            models: true,
            operations: false,
        }
    }

    pub fn operations_only() -> Self {
        Self {
            models: false,
            operations: true,
        }
    }
}

impl Default for Sections {
    fn default() -> Self {
        Self::all()
    }
}

/// Models and operations left after sections and filter are applied. Models
/// keep their dependency order.
#[derive(Debug)]
pub struct Selection<'a> {
    pub models: Vec<&'a TypeModel>,
    pub operations: Vec<&'a LinkedOperation>,
}

pub fn select<'a>(
    definition: &'a Definition,
    sections: Sections,
    filter: Option<&Regex>,
) -> Selection<'a> {
    let matches = |name: &str| filter.map_or(true, |filter| filter.is_match(name));

    let models = if sections.models {
        definition.models().filter(|model| matches(&model.name)).collect()
    } else {
        Vec::new()
    };

    let operations = if sections.operations {
        definition
            .operations
            .iter()
            .filter(|operation| matches(&operation.name))
            .collect()
    } else {
        Vec::new()
    };

    Selection { models, operations }
}

/// One output language.
pub trait Backend {
    /// Identifiers that cannot be used as field or parameter names.
    fn reserved_words(&self) -> &'static [&'static str];

    /// Names the generated code relies on, which models must not shadow.
    fn reserved_type_names(&self) -> &'static [&'static str];

    fn render(&self, definition: &Definition, selection: &Selection<'_>) -> Result<String, Error>;
}
