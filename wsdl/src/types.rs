//! Language-agnostic model of the schema types reachable from a WSDL's
//! operations.

use indexmap::IndexSet;

/// One occurrence bound as written in `minOccurs` / `maxOccurs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occurs {
    Count(u64),
    Unbounded,
}

impl Occurs {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "unbounded" => Some(Self::Unbounded),
            other => other.parse().ok().map(Self::Count),
        }
    }
}

/// Occurrence bounds of an element. `None` means the attribute was absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Occurrence {
    pub min: Option<Occurs>,
    pub max: Option<Occurs>,
}

impl Occurrence {
    /// Any `maxOccurs`, or a `minOccurs` above one, makes the field a
    /// collection.
    pub fn is_repeated(&self) -> bool {
        self.max.is_some()
            || match self.min {
                Some(Occurs::Count(count)) => count > 1,
                Some(Occurs::Unbounded) => true,
                None => false,
            }
    }

    /// A single value that may be left out.
    pub fn is_optional(&self) -> bool {
        !self.is_repeated() && self.min == Some(Occurs::Count(0))
    }
}

/// XML-Schema built-in types with a direct mapping in the generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    String,
    Boolean,
    Int,
    Integer,
    Long,
    Float,
    Double,
    DateTime,
}

impl PrimitiveType {
    pub fn from_xsd_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "boolean" => Some(Self::Boolean),
            "int" => Some(Self::Int),
            "integer" => Some(Self::Integer),
            "long" => Some(Self::Long),
            "float" => Some(Self::Float),
            "double" => Some(Self::Double),
            "dateTime" => Some(Self::DateTime),
            _ => None,
        }
    }

    pub fn xsd_name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Int => "int",
            Self::Integer => "integer",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::DateTime => "dateTime",
        }
    }
}

/// What an element's `type` attribute turned out to point at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementType {
    Primitive(PrimitiveType),
    /// Another type model, by name.
    Complex(String),
    /// Schema-local reference with no matching `complexType`.
    Unresolved(String),
    /// Built-in or foreign type with no mapping.
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Wire name.
    pub name: String,
    /// Identifier used in generated code when `name` cannot be used as is.
    pub alias: Option<String>,
    /// The `type` attribute as written.
    pub type_ref: String,
    pub ty: ElementType,
    pub occurs: Occurrence,
}

impl Element {
    pub fn ident(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// False for elements that are dropped from records and parameter lists.
    pub fn is_resolved(&self) -> bool {
        matches!(self.ty, ElementType::Primitive(_) | ElementType::Complex(_))
    }
}

/// Reference to a schema `group`, collapsed into one string field whose
/// value must be one of the group's member element names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub name: String,
    pub alias: Option<String>,
    /// `None` when the referenced group does not exist.
    pub members: Option<Vec<String>>,
}

impl Group {
    pub fn ident(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// `(A|B|C)`
    pub fn pattern(&self) -> Option<String> {
        self.members
            .as_ref()
            .map(|members| format!("({})", members.join("|")))
    }
}

/// Attribute with a fixed literal value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub alias: Option<String>,
    pub fixed: String,
}

impl Attribute {
    pub fn ident(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaNode {
    Element(Element),
    Group(Group),
    Attribute(Attribute),
}

impl SchemaNode {
    /// Wire name.
    pub fn name(&self) -> &str {
        match self {
            Self::Element(element) => &element.name,
            Self::Group(group) => &group.name,
            Self::Attribute(attribute) => &attribute.name,
        }
    }

    pub fn alias(&self) -> Option<&str> {
        match self {
            Self::Element(element) => element.alias.as_deref(),
            Self::Group(group) => group.alias.as_deref(),
            Self::Attribute(attribute) => attribute.alias.as_deref(),
        }
    }

    pub fn ident(&self) -> &str {
        self.alias().unwrap_or_else(|| self.name())
    }

    pub fn is_aliased(&self) -> bool {
        self.alias().is_some()
    }

    pub fn set_alias(&mut self, alias: Option<String>) {
        match self {
            Self::Element(element) => element.alias = alias,
            Self::Group(group) => group.alias = alias,
            Self::Attribute(attribute) => attribute.alias = alias,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }
}

/// One `complexType`, ready for emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeModel {
    pub name: String,
    /// Document order.
    pub nodes: Vec<SchemaNode>,
    /// Names of the models this one refers to.
    pub dependencies: IndexSet<String>,
    /// Referenced names that could not be found in the document.
    pub unresolved: IndexSet<String>,
}

impl TypeModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            dependencies: IndexSet::new(),
            unresolved: IndexSet::new(),
        }
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.nodes.iter().filter_map(SchemaNode::as_element)
    }

    pub fn aliased_nodes(&self) -> impl Iterator<Item = &SchemaNode> {
        self.nodes.iter().filter(|node| node.is_aliased())
    }
}
