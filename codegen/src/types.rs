use std::collections::HashMap;

use wsdlstub_wsdl::{types::{Element, TypeModel}, Diagnostic, SchemaIndex};

/// Everything a backend needs for one document.
#[derive(Debug)]
pub struct Definition {
    pub namespace: String,
    /// Service block name, taken from the first port type.
    pub service: String,
    pub index: SchemaIndex,
    /// Identifiers of the models whose name cannot be used as is.
    pub type_names: HashMap<String, String>,
    /// Model names, dependencies first.
    pub order: Vec<String>,
    /// Models left out of `order` because a dependency is missing or cyclic.
    pub dropped: Vec<String>,
    pub operations: Vec<LinkedOperation>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Definition {
    /// Models in emission order.
    pub fn models(&self) -> impl Iterator<Item = &TypeModel> {
        self.order.iter().filter_map(|name| self.index.get(name))
    }

    /// Identifier of the model `name` in generated code.
    pub fn type_ident<'a>(&'a self, name: &'a str) -> &'a str {
        self.type_names.get(name).map_or(name, String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedOperation {
    pub name: String,
    pub documentation: Option<String>,
    pub binding: Binding,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    Linked {
        request: String,
        response: String,
        parameters: Vec<Parameter>,
    },
    /// Rendered as an inert stub naming `type_name`.
    Missing { type_name: String },
}

/// One callable parameter, taken from an element of the request model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub ident: String,
    pub wire_name: String,
    pub element: Element,
}

impl Parameter {
    pub fn is_aliased(&self) -> bool {
        self.ident != self.wire_name
    }
}
