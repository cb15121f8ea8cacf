//! Navigable XML tree.
//!
//! `quick-xml` is a pull parser; the schema compiler wants to walk up and
//! down the document freely, so the event stream is collected once into an
//! arena of element nodes.

use quick_xml::{
    events::{BytesStart, Event},
    Reader,
};

use crate::error::Error;

pub const WSDL_NS: &str = "http://schemas.xmlsoap.org/wsdl/";
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema";
const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug)]
struct NodeData {
    qualified_name: String,
    local_name: String,
    namespace: Option<String>,
    attributes: Vec<(String, String)>,
    declarations: Vec<(Option<String>, String)>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    text: String,
}

/// A fully parsed document. The first node is always the root element.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<NodeData>,
}

/// Borrowed handle to one element of a [`Document`].
#[derive(Debug, Clone, Copy)]
pub struct Node<'a> {
    document: &'a Document,
    id: NodeId,
}

/// A `prefix:local` attribute value resolved against the namespaces in scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualifiedName<'a> {
    pub namespace: Option<&'a str>,
    pub local_name: &'a str,
}

fn split_prefixed_name(prefixed_name: &str) -> (Option<&str>, &str) {
    match prefixed_name.split_once(':') {
        Some((prefix, local_name)) => (Some(prefix), local_name),
        None => (None, prefixed_name),
    }
}

impl Document {
    pub fn parse(xml: &str) -> Result<Self, Error> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut document = Self { nodes: Vec::new() };
        let mut stack: Vec<NodeId> = Vec::new();

        loop {
            match reader.read_event()? {
                Event::Start(start) => {
                    let id = document.push(&start, stack.last().copied())?;
                    stack.push(id);
                }

                Event::Empty(start) => {
                    document.push(&start, stack.last().copied())?;
                }

                Event::End(..) => {
                    stack.pop();
                }

                Event::Text(text) => {
                    if let Some(id) = stack.last() {
                        let text = text.unescape()?;
                        document.nodes[id.0].text.push_str(&text);
                    }
                }

                Event::Eof => break,

                _ => (),
            }
        }

        if !stack.is_empty() {
            return Err(Error::structure("unexpected end of document"));
        }

        if document.nodes.is_empty() {
            return Err(Error::structure("document has no root element"));
        }

        Ok(document)
    }

    pub fn root(&self) -> Node<'_> {
        self.node(NodeId(0))
    }

    pub fn node(&self, id: NodeId) -> Node<'_> {
        Node { document: self, id }
    }

    fn push(&mut self, start: &BytesStart<'_>, parent: Option<NodeId>) -> Result<NodeId, Error> {
        if parent.is_none() && !self.nodes.is_empty() {
            return Err(Error::structure("more than one root element"));
        }

        let qualified_name = std::str::from_utf8(start.name().as_ref())?.to_owned();
        let (prefix, local_name) = split_prefixed_name(&qualified_name);
        let prefix = prefix.map(ToOwned::to_owned);
        let local_name = local_name.to_owned();

        let mut attributes = Vec::new();
        let mut declarations = Vec::new();

        for attribute in start.attributes() {
            let attribute = attribute?;
            let key = std::str::from_utf8(attribute.key.as_ref())?;
            let value = attribute.unescape_value()?.into_owned();

            if key == "xmlns" {
                declarations.push((None, value));
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                declarations.push((Some(prefix.to_owned()), value));
            } else {
                attributes.push((key.to_owned(), value));
            }
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            qualified_name,
            local_name,
            namespace: None,
            attributes,
            declarations,
            parent,
            children: Vec::new(),
            text: String::new(),
        });

        // Declarations on the element itself are in scope for its own name.
        let namespace = self
            .node(id)
            .lookup_namespace(prefix.as_deref())
            .map(ToOwned::to_owned);

        if namespace.is_none() {
            if let Some(prefix) = prefix {
                return Err(Error::UnboundPrefix {
                    value: self.nodes[id.0].qualified_name.clone(),
                    prefix,
                });
            }
        }

        self.nodes[id.0].namespace = namespace;

        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }

        Ok(id)
    }
}

impl<'a> Node<'a> {
    fn data(&self) -> &'a NodeData {
        &self.document.nodes[self.id.0]
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The tag as written, prefix included.
    pub fn qualified_name(&self) -> &'a str {
        &self.data().qualified_name
    }

    pub fn local_name(&self) -> &'a str {
        &self.data().local_name
    }

    pub fn namespace(&self) -> Option<&'a str> {
        self.data().namespace.as_deref()
    }

    /// True if the element has the given namespace and local name.
    pub fn is(&self, namespace: &str, local_name: &str) -> bool {
        self.namespace() == Some(namespace) && self.local_name() == local_name
    }

    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.data()
            .attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn required_attribute(&self, name: &str) -> Result<&'a str, Error> {
        self.attribute(name)
            .ok_or_else(|| Error::missing_attr(self.qualified_name(), name))
    }

    pub fn text(&self) -> &'a str {
        &self.data().text
    }

    pub fn parent(&self) -> Option<Node<'a>> {
        self.data().parent.map(|id| self.document.node(id))
    }

    pub fn children(&self) -> impl Iterator<Item = Node<'a>> + 'a {
        let document = self.document;
        self.data()
            .children
            .iter()
            .map(move |&id| document.node(id))
    }

    /// All descendants in document order, excluding `self`.
    pub fn descendants(&self) -> impl Iterator<Item = Node<'a>> + 'a {
        let mut stack: Vec<Node<'a>> = self.children().collect();
        stack.reverse();

        std::iter::from_fn(move || {
            let node = stack.pop()?;
            let mark = stack.len();
            stack.extend(node.children());
            stack[mark..].reverse();
            Some(node)
        })
    }

    /// `self` followed by its parent, grandparent and so on up to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = Node<'a>> + 'a {
        std::iter::successors(Some(*self), Node::parent)
    }

    /// Namespace URI bound to `prefix` (or the default namespace for `None`)
    /// at this element.
    pub fn lookup_namespace(&self, prefix: Option<&str>) -> Option<&'a str> {
        if prefix == Some("xml") {
            return Some(XML_NS);
        }

        self.ancestors().find_map(|node| {
            node.data()
                .declarations
                .iter()
                .find(|(declared, _)| declared.as_deref() == prefix)
                .map(|(_, namespace)| namespace.as_str())
        })
    }

    /// Resolves a QName-valued attribute such as `type="tns:Foo"`.
    pub fn resolve_qname(&self, value: &'a str) -> Result<QualifiedName<'a>, Error> {
        let (prefix, local_name) = split_prefixed_name(value);
        let namespace = self.lookup_namespace(prefix);

        match (prefix, namespace) {
            (Some(prefix), None) => Err(Error::UnboundPrefix {
                prefix: prefix.to_owned(),
                value: value.to_owned(),
            }),
            _ => Ok(QualifiedName {
                namespace,
                local_name,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<root xmlns="urn:default" xmlns:a="urn:a">
    <a:first name="one">
        <a:inner type="a:Thing"/>
        <second xmlns:b="urn:b" type="b:Other">some &amp; text</second>
    </a:first>
    <third/>
</root>"#;

    #[test]
    fn test_parse_tree_shape() {
        let document = Document::parse(XML).expect("Failed to parse");
        let root = document.root();

        assert_eq!(root.local_name(), "root");
        assert_eq!(root.namespace(), Some("urn:default"));

        let children: Vec<_> = root.children().map(|n| n.local_name()).collect();
        assert_eq!(children, vec!["first", "third"]);

        let descendants: Vec<_> = root.descendants().map(|n| n.local_name()).collect();
        assert_eq!(descendants, vec!["first", "inner", "second", "third"]);
    }

    #[test]
    fn test_namespaces_and_attributes() {
        let document = Document::parse(XML).expect("Failed to parse");
        let first = document.root().children().next().expect("first child");

        assert!(first.is("urn:a", "first"));
        assert_eq!(first.qualified_name(), "a:first");
        assert_eq!(first.attribute("name"), Some("one"));
        assert_eq!(first.attribute("missing"), None);

        let second = first.children().nth(1).expect("second");
        assert_eq!(second.namespace(), Some("urn:default"));
        assert_eq!(second.text(), "some & text");
        assert_eq!(second.parent().map(|n| n.local_name()), Some("first"));
    }

    #[test]
    fn test_resolve_qname() {
        let document = Document::parse(XML).expect("Failed to parse");
        let first = document.root().children().next().expect("first child");
        let second = first.children().nth(1).expect("second");

        let name = second
            .resolve_qname(second.attribute("type").expect("type"))
            .expect("resolve");
        assert_eq!(name.namespace, Some("urn:b"));
        assert_eq!(name.local_name, "Other");

        let name = second.resolve_qname("Plain").expect("resolve");
        assert_eq!(name.namespace, Some("urn:default"));

        let err = first.resolve_qname("b:Other").unwrap_err();
        assert!(matches!(err, Error::UnboundPrefix { .. }));
    }

    #[test]
    fn test_required_attribute_missing() {
        let document = Document::parse(XML).expect("Failed to parse");
        let err = document.root().required_attribute("name").unwrap_err();
        assert!(matches!(err, Error::MissingAttribute { .. }));
        assert!(err.to_string().contains("'name'"));
    }

    #[test]
    fn test_malformed_documents() {
        assert!(Document::parse("<a><b></a>").is_err());
        assert!(Document::parse("").is_err());
        assert!(Document::parse("<a>").is_err());
        assert!(matches!(
            Document::parse("<x:a/>"),
            Err(Error::UnboundPrefix { .. })
        ));
    }
}
