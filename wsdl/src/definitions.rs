//! Top-level lookups over a WSDL document: port type operations, messages
//! and the named definitions of the embedded schemas.

use indexmap::IndexMap;
use tracing::warn;

use crate::{
    diagnostic::Diagnostic,
    error::Error,
    xml::{Document, Node, NodeId, QualifiedName, WSDL_NS, XSD_NS},
};

const DEFAULT_SERVICE_NAME: &str = "Service";

/// `portType/operation`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationDecl {
    pub name: String,
    pub documentation: Option<String>,
    /// Local name of the `input` message, if declared.
    pub input: Option<String>,
    /// Local name of the `output` message, if declared.
    pub output: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

/// What an operation's request or response element points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageType {
    /// Name of a schema-local complexType (which may or may not exist).
    Complex(String),
    /// Nothing usable: the element is absent, or its type is not a
    /// schema-local reference. Carries the name to report.
    Missing(String),
}

#[derive(Debug)]
pub struct Definitions {
    document: Document,
    target_namespace: Option<String>,
    service_name: String,
    operations: Vec<OperationDecl>,
    elements: IndexMap<String, NodeId>,
    complex_types: IndexMap<String, NodeId>,
    groups: IndexMap<String, NodeId>,
    messages: IndexMap<String, NodeId>,
    diagnostics: Vec<Diagnostic>,
}

fn insert_definition(
    map: &mut IndexMap<String, NodeId>,
    diagnostics: &mut Vec<Diagnostic>,
    kind: &'static str,
    node: Node<'_>,
) -> Result<(), Error> {
    let name = node.required_attribute("name")?;

    if map.contains_key(name) {
        let diagnostic = Diagnostic::DuplicateDefinition {
            kind,
            name: name.to_owned(),
        };
        warn!("{}", diagnostic);
        diagnostics.push(diagnostic);
    } else {
        map.insert(name.to_owned(), node.id());
    }

    Ok(())
}

impl OperationDecl {
    fn from_node(node: Node<'_>) -> Result<Self, Error> {
        let mut operation = Self {
            name: node.required_attribute("name")?.to_owned(),
            documentation: None,
            input: None,
            output: None,
        };

        for child in node.children().filter(|child| child.namespace() == Some(WSDL_NS)) {
            match child.local_name() {
                "documentation" => {
                    let text = child.text().trim();
                    if !text.is_empty() {
                        operation.documentation = Some(text.to_owned());
                    }
                }

                "input" | "output" => {
                    let message = match child.attribute("message") {
                        Some(message) => Some(child.resolve_qname(message)?.local_name.to_owned()),
                        None => None,
                    };

                    if child.local_name() == "input" {
                        operation.input = message;
                    } else {
                        operation.output = message;
                    }
                }

                _ => (),
            }
        }

        Ok(operation)
    }

    pub fn message(&self, direction: Direction) -> Option<&str> {
        match direction {
            Direction::Input => self.input.as_deref(),
            Direction::Output => self.output.as_deref(),
        }
    }

    /// Conventional top-level element name: `<Op>` or `<Op>Response`.
    pub fn element_name(&self, direction: Direction) -> String {
        match direction {
            Direction::Input => self.name.clone(),
            Direction::Output => format!("{}Response", self.name),
        }
    }
}

impl Definitions {
    pub fn from_document(document: Document) -> Result<Self, Error> {
        let mut definitions = Self {
            target_namespace: None,
            service_name: DEFAULT_SERVICE_NAME.to_owned(),
            operations: Vec::new(),
            elements: IndexMap::new(),
            complex_types: IndexMap::new(),
            groups: IndexMap::new(),
            messages: IndexMap::new(),
            diagnostics: Vec::new(),
            document,
        };

        definitions.index()?;
        Ok(definitions)
    }

    fn index(&mut self) -> Result<(), Error> {
        let root = self.document.root();

        if !root.is(WSDL_NS, "definitions") {
            return Err(Error::structure(format!(
                "expected a WSDL 'definitions' root element, found '{}'",
                root.qualified_name()
            )));
        }

        self.target_namespace = root.attribute("targetNamespace").map(ToOwned::to_owned);

        let mut port_type_seen = false;

        for child in root.children() {
            if child.is(WSDL_NS, "portType") {
                if !port_type_seen {
                    self.service_name = child.required_attribute("name")?.to_owned();
                    port_type_seen = true;
                }

                for operation in child.children().filter(|n| n.is(WSDL_NS, "operation")) {
                    self.operations.push(OperationDecl::from_node(operation)?);
                }
            } else if child.is(WSDL_NS, "message") {
                insert_definition(&mut self.messages, &mut self.diagnostics, "message", child)?;
            } else if child.is(WSDL_NS, "types") {
                for schema in child.children().filter(|n| n.is(XSD_NS, "schema")) {
                    for definition in schema.children().filter(|n| n.namespace() == Some(XSD_NS)) {
                        let (map, kind) = match definition.local_name() {
                            "element" => (&mut self.elements, "element"),
                            "complexType" => (&mut self.complex_types, "complexType"),
                            "group" => (&mut self.groups, "group"),
                            _ => continue,
                        };

                        insert_definition(map, &mut self.diagnostics, kind, definition)?;
                    }
                }
            }
        }

        Ok(())
    }

    pub fn target_namespace(&self) -> Option<&str> {
        self.target_namespace.as_deref()
    }

    /// Name of the first `portType`.
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn operations(&self) -> &[OperationDecl] {
        &self.operations
    }

    /// Non-fatal problems found while indexing.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn element(&self, name: &str) -> Option<Node<'_>> {
        self.elements.get(name).map(|&id| self.document.node(id))
    }

    pub fn complex_type(&self, name: &str) -> Option<Node<'_>> {
        self.complex_types.get(name).map(|&id| self.document.node(id))
    }

    pub fn group(&self, name: &str) -> Option<Node<'_>> {
        self.groups.get(name).map(|&id| self.document.node(id))
    }

    pub fn message(&self, name: &str) -> Option<Node<'_>> {
        self.messages.get(name).map(|&id| self.document.node(id))
    }

    /// `targetNamespace` of the schema enclosing `node`, falling back to the
    /// document's.
    pub fn schema_namespace<'a>(&'a self, node: Node<'a>) -> Option<&'a str> {
        node.ancestors()
            .find(|ancestor| ancestor.is(XSD_NS, "schema"))
            .and_then(|schema| schema.attribute("targetNamespace"))
            .or_else(|| self.target_namespace())
    }

    /// True if `name`, read from an attribute of `node`, refers to a
    /// definition of the schema that contains `node`.
    pub fn is_schema_local(&self, node: Node<'_>, name: &QualifiedName<'_>) -> bool {
        name.namespace.is_some() && name.namespace == self.schema_namespace(node)
    }

    /// First `part/@element` of a message, looked up among the top-level
    /// schema elements.
    fn message_element(&self, message: &str) -> Result<Option<Node<'_>>, Error> {
        let Some(message) = self.message(message) else {
            return Ok(None);
        };

        for part in message.children().filter(|n| n.is(WSDL_NS, "part")) {
            if let Some(element) = part.attribute("element") {
                let element = part.resolve_qname(element)?;
                return Ok(self.element(element.local_name));
            }
        }

        Ok(None)
    }

    /// Resolves the complexType name behind an operation's request or
    /// response. The `<Op>` / `<Op>Response` element convention is tried
    /// first, then the operation's declared message.
    pub fn message_type(
        &self,
        operation: &OperationDecl,
        direction: Direction,
    ) -> Result<MessageType, Error> {
        let convention = operation.element_name(direction);

        let element = match self.element(&convention) {
            Some(element) => Some(element),
            None => match operation.message(direction) {
                Some(message) => self.message_element(message)?,
                None => None,
            },
        };

        let Some(element) = element else {
            return Ok(MessageType::Missing(convention));
        };

        let type_ref = element.required_attribute("type")?;
        let name = element.resolve_qname(type_ref)?;

        if self.is_schema_local(element, &name) {
            Ok(MessageType::Complex(name.local_name.to_owned()))
        } else {
            Ok(MessageType::Missing(type_ref.to_owned()))
        }
    }
}
