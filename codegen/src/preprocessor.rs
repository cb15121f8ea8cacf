use tracing::debug;
use wsdlstub_wsdl::{
    builder::unique_aliases, BuildContext, Definitions, Diagnostic, Direction, Error,
    MessageType, OperationDecl,
};

use super::{linker, resolver, types};

fn build_message(
    context: &mut BuildContext<'_>,
    operation: &OperationDecl,
    direction: Direction,
) -> Result<MessageType, Error> {
    let message = context.definitions().message_type(operation, direction)?;

    let missing = match message {
        MessageType::Complex(name) => {
            if context.build(&name)?.is_some() {
                return Ok(MessageType::Complex(name));
            }
            name
        }
        MessageType::Missing(name) => name,
    };

    context.report(Diagnostic::UnresolvedReference {
        owner: operation.name.clone(),
        name: missing.clone(),
    });
    Ok(MessageType::Missing(missing))
}

/// Builds the models reachable from every operation, orders them and links
/// the operations. `reserved` is the target backend's reserved word list;
/// model and service names also avoid `reserved_types`.
pub fn preprocess(
    definitions: &Definitions,
    reserved: &[&str],
    reserved_types: &[&str],
) -> Result<types::Definition, Error> {
    let mut context = BuildContext::new(definitions, reserved);
    let mut messages = Vec::new();

    for operation in definitions.operations() {
        debug!("building messages of {}", operation.name);

        let request = build_message(&mut context, operation, Direction::Input)?;
        let response = build_message(&mut context, operation, Direction::Output)?;
        messages.push((operation, request, response));
    }

    let (index, mut diagnostics) = context.finish();
    let resolution = resolver::resolve(&index);

    let operations = messages
        .iter()
        .map(|(operation, request, response)| {
            linker::link(operation, request, response, &index, &resolution, &mut diagnostics)
        })
        .collect();

    // Models and the service block share one scope in the output.
    let type_reserved: Vec<&str> = reserved.iter().chain(reserved_types).copied().collect();
    let service = definitions.service_name();
    let mut names: Vec<&str> = index.names().collect();
    names.push(service);

    let mut aliases = unique_aliases(&names, &type_reserved);
    let service = aliases.pop().flatten().unwrap_or_else(|| service.to_owned());
    let type_names = names
        .iter()
        .zip(aliases)
        .filter_map(|(name, alias)| Some(((*name).to_owned(), alias?)))
        .collect();

    Ok(types::Definition {
        namespace: definitions.target_namespace().unwrap_or_default().to_owned(),
        service,
        index,
        type_names,
        order: resolution.order,
        dropped: resolution.dropped,
        operations,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Binding;

    const WSDL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<definitions xmlns="http://schemas.xmlsoap.org/wsdl/"
             xmlns:xs="http://www.w3.org/2001/XMLSchema"
             xmlns:tns="urn:shop"
             targetNamespace="urn:shop">
    <types>
        <xs:schema targetNamespace="urn:shop">
            <xs:element name="Buy" type="tns:BuyRequest"/>
            <xs:element name="BuyResponse" type="tns:BuyResponse"/>
            <xs:element name="Loop" type="tns:LoopRequest"/>
            <xs:element name="LoopResponse" type="tns:BuyResponse"/>
            <xs:element name="Ghost" type="tns:GhostRequest"/>
            <xs:element name="GhostResponse" type="tns:BuyResponse"/>

            <xs:group name="Mode">
                <xs:sequence>
                    <xs:element name="Fast" type="xs:string"/>
                    <xs:element name="Slow" type="xs:string"/>
                </xs:sequence>
            </xs:group>
            <xs:complexType name="BuyRequest">
                <xs:sequence>
                    <xs:element name="item" type="tns:Item"/>
                    <xs:element name="from" type="xs:string"/>
                    <xs:element name="price" type="xs:decimal"/>
                    <xs:group ref="tns:Mode"/>
                </xs:sequence>
                <xs:attribute name="version" fixed="2"/>
            </xs:complexType>
            <xs:complexType name="Item">
                <xs:sequence>
                    <xs:element name="sku" type="xs:string"/>
                </xs:sequence>
            </xs:complexType>
            <xs:complexType name="BuyResponse"/>
            <xs:complexType name="LoopRequest">
                <xs:sequence>
                    <xs:element name="again" type="tns:LoopRequest" minOccurs="0"/>
                </xs:sequence>
            </xs:complexType>
        </xs:schema>
    </types>
    <portType name="ShopPort">
        <operation name="Buy">
            <documentation>Buys an item.</documentation>
        </operation>
        <operation name="Loop"/>
        <operation name="Ghost"/>
    </portType>
</definitions>"#;

    fn preprocessed() -> types::Definition {
        let definitions = wsdlstub_wsdl::parse_str(WSDL).expect("Failed to parse");
        preprocess(&definitions, &["from"], &[]).expect("Failed to preprocess")
    }

    #[test]
    fn test_models_ordered_and_dropped() {
        let definition = preprocessed();

        assert_eq!(definition.namespace, "urn:shop");
        assert_eq!(definition.service, "ShopPort");
        assert_eq!(definition.order.len(), 3);
        assert!(definition.order.contains(&"BuyResponse".to_owned()));

        let position = |name: &str| {
            definition
                .order
                .iter()
                .position(|n| n == name)
                .expect("placed")
        };
        assert!(position("Item") < position("BuyRequest"));
        assert_eq!(definition.dropped, vec!["LoopRequest"]);
        assert_eq!(
            definition.models().map(|m| m.name.as_str()).collect::<Vec<_>>(),
            definition.order
        );
    }

    #[test]
    fn test_linked_operation_parameters() {
        let definition = preprocessed();
        let buy = &definition.operations[0];

        assert_eq!(buy.documentation.as_deref(), Some("Buys an item."));

        let Binding::Linked {
            request,
            response,
            parameters,
        } = &buy.binding
        else {
            panic!("Buy should link");
        };

        assert_eq!(request, "BuyRequest");
        assert_eq!(response, "BuyResponse");

        // Groups, attributes and unmapped primitives are not parameters.
        let idents: Vec<_> = parameters.iter().map(|p| p.ident.as_str()).collect();
        assert_eq!(idents, vec!["item", "from_"]);
        assert!(!parameters[0].is_aliased());
        assert!(parameters[1].is_aliased());
        assert_eq!(parameters[1].wire_name, "from");
    }

    #[test]
    fn test_missing_and_dropped_types_become_stubs() {
        let definition = preprocessed();

        assert_eq!(
            definition.operations[1].binding,
            Binding::Missing {
                type_name: "LoopRequest".to_owned()
            }
        );
        assert_eq!(
            definition.operations[2].binding,
            Binding::Missing {
                type_name: "GhostRequest".to_owned()
            }
        );

        let unresolved: Vec<_> = definition
            .diagnostics
            .iter()
            .filter_map(|d| match d {
                Diagnostic::UnresolvedReference { owner, name } => {
                    Some((owner.as_str(), name.as_str()))
                }
                _ => None,
            })
            .collect();
        assert_eq!(unresolved, vec![("Ghost", "GhostRequest"), ("Loop", "LoopRequest")]);
    }

    #[test]
    fn test_type_names_avoid_reserved_names() {
        let definitions = wsdlstub_wsdl::parse_str(WSDL).expect("Failed to parse");
        let definition =
            preprocess(&definitions, &[], &["Item", "ShopPort"]).expect("Failed to preprocess");

        assert_eq!(definition.type_ident("Item"), "Item_");
        assert_eq!(definition.type_ident("BuyRequest"), "BuyRequest");
        assert_eq!(definition.service, "ShopPort_");
        assert_eq!(definition.type_names.len(), 1);
    }
}
