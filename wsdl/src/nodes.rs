//! Construction of the individual schema nodes of a type model.

use crate::{
    builder::BuildContext,
    diagnostic::Diagnostic,
    error::Error,
    types::{Attribute, Element, ElementType, Group, Occurrence, Occurs, PrimitiveType, TypeModel},
    xml::{Node, XSD_NS},
};

fn occurs_bound(node: Node<'_>, attribute: &str) -> Result<Option<Occurs>, Error> {
    node.attribute(attribute)
        .map(|value| {
            Occurs::parse(value)
                .ok_or_else(|| Error::invalid_attr(node.qualified_name(), attribute, value))
        })
        .transpose()
}

impl Occurrence {
    pub(crate) fn from_node(node: Node<'_>) -> Result<Self, Error> {
        Ok(Self {
            min: occurs_bound(node, "minOccurs")?,
            max: occurs_bound(node, "maxOccurs")?,
        })
    }
}

impl Element {
    /// Schema-local types are built (or found) through `context` and recorded
    /// as dependencies of `owner`. A local type that does not exist is recorded
    /// as unresolved instead, so `owner` itself is never dropped for it.
    pub(crate) fn from_node<'d>(
        context: &mut BuildContext<'d>,
        owner: &mut TypeModel,
        node: Node<'d>,
    ) -> Result<Self, Error> {
        let name = node.required_attribute("name")?;
        let type_ref = node.required_attribute("type")?;
        let occurs = Occurrence::from_node(node)?;
        let reference = node.resolve_qname(type_ref)?;

        let ty = if context.definitions().is_schema_local(node, &reference) {
            let target = reference.local_name;

            if context.ensure(target)? {
                owner.dependencies.insert(target.to_owned());
                ElementType::Complex(target.to_owned())
            } else {
                owner.unresolved.insert(target.to_owned());
                context.report(Diagnostic::UnresolvedReference {
                    owner: owner.name.clone(),
                    name: target.to_owned(),
                });
                ElementType::Unresolved(target.to_owned())
            }
        } else {
            let primitive = match reference.namespace {
                Some(XSD_NS) => PrimitiveType::from_xsd_name(reference.local_name),
                _ => None,
            };

            match primitive {
                Some(primitive) => ElementType::Primitive(primitive),
                None => {
                    context.report(Diagnostic::UnknownPrimitiveType {
                        owner: owner.name.clone(),
                        field: name.to_owned(),
                        type_name: type_ref.to_owned(),
                    });
                    ElementType::Unknown(type_ref.to_owned())
                }
            }
        };

        Ok(Self {
            name: name.to_owned(),
            alias: None,
            type_ref: type_ref.to_owned(),
            ty,
            occurs,
        })
    }
}

impl Group {
    pub(crate) fn from_node<'d>(
        context: &mut BuildContext<'d>,
        owner: &mut TypeModel,
        node: Node<'d>,
    ) -> Result<Self, Error> {
        let reference = node.required_attribute("ref")?;
        let name = node.resolve_qname(reference)?.local_name;

        let members = match context.definitions().group(name) {
            Some(group) => Some(
                group
                    .descendants()
                    .filter(|n| n.is(XSD_NS, "element"))
                    .filter_map(|n| n.attribute("name"))
                    .map(ToOwned::to_owned)
                    .collect(),
            ),
            None => {
                owner.unresolved.insert(name.to_owned());
                context.report(Diagnostic::UnresolvedReference {
                    owner: owner.name.clone(),
                    name: name.to_owned(),
                });
                None
            }
        };

        Ok(Self {
            name: name.to_owned(),
            alias: None,
            members,
        })
    }
}

impl Attribute {
    pub(crate) fn from_node(node: Node<'_>) -> Result<Self, Error> {
        let name = node.required_attribute("name")?;

        Ok(Self {
            name: name.to_owned(),
            alias: None,
            fixed: node.required_attribute("fixed")?.to_owned(),
        })
    }
}
