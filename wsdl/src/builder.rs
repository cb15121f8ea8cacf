//! Type model builder.
//!
//! Walks one `complexType` subtree and turns it into a [`TypeModel`],
//! building the models it references on the way. All state for a run lives
//! in a [`BuildContext`]; nothing is shared between runs.

use std::collections::HashSet;

use tracing::{debug, warn};
use unicode_ident::{is_xid_continue, is_xid_start};

use crate::{
    definitions::Definitions,
    diagnostic::Diagnostic,
    error::Error,
    index::SchemaIndex,
    types::{Attribute, Element, Group, SchemaNode, TypeModel},
    xml::{Node, XSD_NS},
};

/// Identifier to use in generated code in place of `name`, if `name` itself
/// cannot be used: reserved words get a trailing underscore, other invalid
/// identifiers have the offending characters replaced.
///
/// Validity follows the Unicode XID rules shared by Rust and Python, so XML
/// names such as `CO₂` are rewritten too.
pub fn identifier_alias(name: &str, reserved: &[&str]) -> Option<String> {
    if reserved.iter().any(|word| *word == name) {
        return Some(format!("{}_", name));
    }

    let starts_identifier = |c: char| is_xid_start(c) || c == '_';

    let valid = name.chars().next().map_or(false, starts_identifier)
        && name.chars().all(is_xid_continue);

    if valid {
        return None;
    }

    let mut alias: String = name
        .chars()
        .map(|c| if is_xid_continue(c) { c } else { '_' })
        .collect();

    if !alias.starts_with(starts_identifier) {
        alias.insert(0, '_');
    }

    Some(alias)
}

/// Aliases for a list of names that share one scope, such as the fields of a
/// record. Works like [`identifier_alias`], but every alias (and every
/// repeated name) gets further underscores until it clashes with no other
/// identifier in the list.
pub fn unique_aliases(names: &[&str], reserved: &[&str]) -> Vec<Option<String>> {
    let mut taken = HashSet::new();
    let mut aliases = Vec::with_capacity(names.len());

    for name in names {
        let alias = match identifier_alias(name, reserved) {
            None if taken.insert((*name).to_owned()) => None,
            None => Some((*name).to_owned()),
            alias => alias,
        };
        aliases.push(alias);
    }

    for alias in aliases.iter_mut().flatten() {
        while taken.contains(alias.as_str()) || reserved.contains(&alias.as_str()) {
            alias.push('_');
        }
        taken.insert(alias.clone());
    }

    aliases
}

pub struct BuildContext<'d> {
    definitions: &'d Definitions,
    reserved: &'d [&'d str],
    index: SchemaIndex,
    in_progress: HashSet<String>,
    diagnostics: Vec<Diagnostic>,
}

impl<'d> BuildContext<'d> {
    /// `reserved` is the target language's reserved word list; colliding
    /// names are aliased while building.
    pub fn new(definitions: &'d Definitions, reserved: &'d [&'d str]) -> Self {
        Self {
            definitions,
            reserved,
            index: SchemaIndex::new(),
            in_progress: HashSet::new(),
            diagnostics: definitions.diagnostics().to_vec(),
        }
    }

    pub fn definitions(&self) -> &'d Definitions {
        self.definitions
    }

    pub fn index(&self) -> &SchemaIndex {
        &self.index
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        warn!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    /// Returns the model for the complexType `name`, building it (and
    /// everything it references) on first use. `None` if the document has no
    /// such complexType.
    pub fn build(&mut self, name: &str) -> Result<Option<&TypeModel>, Error> {
        if !self.ensure(name)? {
            return Ok(None);
        }

        Ok(self.index.get(name))
    }

    /// Makes sure `name` is indexed or being built. False if there is no
    /// complexType to build it from.
    pub(crate) fn ensure(&mut self, name: &str) -> Result<bool, Error> {
        // A name under construction is reachable again only through a cycle;
        // the resolver reports it.
        if self.index.contains(name) || self.in_progress.contains(name) {
            return Ok(true);
        }

        let definitions = self.definitions;
        let Some(node) = definitions.complex_type(name) else {
            return Ok(false);
        };

        self.build_model(name, node)?;
        Ok(true)
    }

    fn build_model(&mut self, name: &str, node: Node<'d>) -> Result<(), Error> {
        debug!("building type model {}", name);

        self.in_progress.insert(name.to_owned());
        let mut model = TypeModel::new(name);
        let result = self.visit(&mut model, node);
        self.in_progress.remove(name);
        result?;

        let names: Vec<&str> = model.nodes.iter().map(SchemaNode::name).collect();
        let aliases = unique_aliases(&names, self.reserved);
        for (node, alias) in model.nodes.iter_mut().zip(aliases) {
            node.set_alias(alias);
        }

        debug!(
            "registered {} ({} nodes, {} dependencies)",
            name,
            model.nodes.len(),
            model.dependencies.len()
        );
        self.index.register(model);
        Ok(())
    }

    fn visit(&mut self, model: &mut TypeModel, node: Node<'d>) -> Result<(), Error> {
        if node.namespace() == Some(XSD_NS) {
            match node.local_name() {
                "element" => {
                    let element = Element::from_node(self, model, node)?;
                    model.nodes.push(SchemaNode::Element(element));
                }

                // Structure only. `choice` is flattened like a sequence.
                "sequence" | "choice" | "complexType" => (),

                "group" => {
                    let group = Group::from_node(self, model, node)?;
                    model.nodes.push(SchemaNode::Group(group));
                }

                "attribute" => {
                    let attribute = Attribute::from_node(node)?;
                    model.nodes.push(SchemaNode::Attribute(attribute));
                }

                tag => self.report(Diagnostic::UnrecognizedConstruct {
                    owner: model.name.clone(),
                    tag: tag.to_owned(),
                }),
            }
        } else {
            self.report(Diagnostic::UnrecognizedConstruct {
                owner: model.name.clone(),
                tag: node.qualified_name().to_owned(),
            });
        }

        for child in node.children() {
            self.visit(model, child)?;
        }

        Ok(())
    }

    /// Consumes the context, handing over the populated index and every
    /// diagnostic reported during the run.
    pub fn finish(self) -> (SchemaIndex, Vec<Diagnostic>) {
        (self.index, self.diagnostics)
    }
}
