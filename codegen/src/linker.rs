use tracing::warn;
use wsdlstub_wsdl::{Diagnostic, MessageType, OperationDecl, SchemaIndex};

use super::{
    resolver::Resolution,
    types::{Binding, LinkedOperation, Parameter},
};

/// Binds one operation to its request and response models. A type that was
/// never built, or that the resolver dropped, turns the operation into an
/// inert stub.
pub fn link(
    operation: &OperationDecl,
    request: &MessageType,
    response: &MessageType,
    index: &SchemaIndex,
    resolution: &Resolution,
    diagnostics: &mut Vec<Diagnostic>,
) -> LinkedOperation {
    let usable = |message: &MessageType| -> Result<String, String> {
        match message {
            MessageType::Complex(name) if !resolution.dropped.contains(name) => Ok(name.clone()),
            MessageType::Complex(name) | MessageType::Missing(name) => Err(name.clone()),
        }
    };

    let binding = match (usable(request), usable(response)) {
        (Ok(request), Ok(response)) => {
            let parameters = index
                .get(&request)
                .into_iter()
                .flat_map(|model| model.elements())
                .filter(|element| element.is_resolved())
                .map(|element| Parameter {
                    ident: element.ident().to_owned(),
                    wire_name: element.name.clone(),
                    element: element.clone(),
                })
                .collect();

            Binding::Linked {
                request,
                response,
                parameters,
            }
        }

        (Err(type_name), _) | (_, Err(type_name)) => {
            // Types missing from the document were already reported while
            // building; only report the ones dropped by the resolver here.
            if resolution.dropped.contains(&type_name) {
                let diagnostic = Diagnostic::UnresolvedReference {
                    owner: operation.name.clone(),
                    name: type_name.clone(),
                };
                warn!("{}", diagnostic);
                diagnostics.push(diagnostic);
            }

            Binding::Missing { type_name }
        }
    };

    LinkedOperation {
        name: operation.name.clone(),
        documentation: operation.documentation.clone(),
        binding,
    }
}
