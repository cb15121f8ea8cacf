//! Rust output: plain data structs and a service skeleton.

use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};
use wsdlstub_wsdl::{
    builder::identifier_alias,
    types::{Element, ElementType, PrimitiveType, SchemaNode, TypeModel},
};

use super::{
    emitter::{Backend, Selection},
    error::Error,
    types::{Binding, Definition, LinkedOperation},
};

/// Strict and reserved keywords of the 2021 edition.
pub const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum", "extern",
    "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub",
    "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true", "type",
    "unsafe", "use", "where", "while", "abstract", "become", "box", "do", "final", "macro",
    "override", "priv", "try", "typeof", "unsized", "virtual", "yield", "_",
];

/// Prelude and primitive names used by the generated items.
pub const RUST_TYPE_NAMES: &[&str] = &[
    "String", "Vec", "Option", "Some", "None", "Default", "Clone", "Debug", "PartialEq", "bool",
    "i32", "i64", "f32", "f64", "str", "chrono",
];

pub trait Codegen {
    fn codegen(&self, definition: &Definition) -> TokenStream;
}

fn ident(name: &str) -> Ident {
    match identifier_alias(name, RUST_KEYWORDS) {
        Some(alias) => format_ident!("{}", alias),
        None => format_ident!("{}", name),
    }
}

fn type_ident(definition: &Definition, name: &str) -> Ident {
    format_ident!("{}", definition.type_ident(name))
}

fn primitive_type(primitive: PrimitiveType) -> TokenStream {
    match primitive {
        PrimitiveType::String => quote!(String),
        PrimitiveType::Boolean => quote!(bool),
        PrimitiveType::Int => quote!(i32),
        PrimitiveType::Integer | PrimitiveType::Long => quote!(i64),
        PrimitiveType::Float => quote!(f32),
        PrimitiveType::Double => quote!(f64),
        PrimitiveType::DateTime => quote!(chrono::DateTime<chrono::Utc>),
    }
}

fn element_type(definition: &Definition, element: &Element) -> Option<TokenStream> {
    let inner = match &element.ty {
        ElementType::Primitive(primitive) => primitive_type(*primitive),
        ElementType::Complex(name) => {
            let name = type_ident(definition, name);
            quote!(#name)
        }
        ElementType::Unresolved(_) | ElementType::Unknown(_) => return None,
    };

    Some(if element.occurs.is_repeated() {
        quote!(Vec<#inner>)
    } else if element.occurs.is_optional() {
        quote!(Option<#inner>)
    } else {
        inner
    })
}

/// Field name and type of every node that becomes a struct field.
fn fields(definition: &Definition, model: &TypeModel) -> Vec<(Ident, TokenStream)> {
    model
        .nodes
        .iter()
        .filter_map(|node| {
            let ty = match node {
                SchemaNode::Element(element) => element_type(definition, element)?,
                SchemaNode::Group(group) => {
                    group.members.as_ref()?;
                    quote!(String)
                }
                SchemaNode::Attribute(_) => quote!(String),
            };

            Some((format_ident!("{}", node.ident()), ty))
        })
        .collect()
}

impl Codegen for TypeModel {
    fn codegen(&self, definition: &Definition) -> TokenStream {
        let name = type_ident(definition, &self.name);
        let (field_names, field_types): (Vec<_>, Vec<_>) =
            fields(definition, self).into_iter().unzip();

        let mut docs = Vec::new();
        for element in self.elements() {
            if let ElementType::Unresolved(type_name) = &element.ty {
                docs.push(format!(" Unresolved: `{}` (`{}`)", element.name, type_name));
            }
        }
        for node in &self.nodes {
            if let SchemaNode::Group(group) = node {
                if group.members.is_none() {
                    docs.push(format!(" Unresolved group: `{}`", group.name));
                }
            }
        }

        let wire_names = self
            .aliased_nodes()
            .map(|node| {
                let (alias, wire) = (node.ident(), node.name());
                quote!((#alias, #wire))
            })
            .collect::<Vec<_>>();

        let patterns = self
            .nodes
            .iter()
            .filter_map(|node| {
                let pattern = match node {
                    SchemaNode::Group(group) => group.pattern()?,
                    SchemaNode::Attribute(attribute) => attribute.fixed.clone(),
                    SchemaNode::Element(_) => return None,
                };
                let field = node.ident();
                Some(quote!((#field, #pattern)))
            })
            .collect::<Vec<_>>();

        let mut constants = Vec::new();
        if name != self.name {
            let wire = &self.name;
            constants.push(quote! {
                /// Schema type name.
                pub const TYPE_NAME: &'static str = #wire;
            });
        }
        if !wire_names.is_empty() {
            constants.push(quote! {
                /// Field name to wire name.
                pub const WIRE_NAMES: &'static [(&'static str, &'static str)] = &[#(#wire_names),*];
            });
        }
        if !patterns.is_empty() {
            constants.push(quote! {
                /// Allowed values of the group and attribute fields.
                pub const PATTERNS: &'static [(&'static str, &'static str)] = &[#(#patterns),*];
            });
        }

        let post_hoc = if constants.is_empty() {
            quote!()
        } else {
            quote! {
                impl #name {
                    #(#constants)*
                }
            }
        };

        quote! {
            #(#[doc = #docs])*
            #[derive(Debug, Clone, Default, PartialEq)]
            #[allow(non_snake_case)]
            pub struct #name {
                #(pub #field_names: #field_types,)*
            }

            #post_hoc
        }
    }
}

impl Codegen for LinkedOperation {
    fn codegen(&self, definition: &Definition) -> TokenStream {
        let name = ident(&self.name);
        let docs = self
            .documentation
            .iter()
            .flat_map(|documentation| documentation.lines())
            .map(|line| format!(" {}", line.trim()))
            .collect::<Vec<_>>();

        let (request, response, parameters) = match &self.binding {
            Binding::Linked {
                request,
                response,
                parameters,
            } => (request, response, parameters),

            Binding::Missing { type_name } => {
                let message = format!(
                    "{} NOT IMPLEMENTED (because can't find {})",
                    self.name, type_name
                );
                return quote! {
                    #(#[doc = #docs])*
                    pub const #name: &'static str = #message;
                };
            }
        };

        let request_ty = type_ident(definition, request);
        let response_ty = type_ident(definition, response);

        let mut arguments = Vec::new();
        let mut argument_names = Vec::new();
        let mut alias_docs = Vec::new();
        for parameter in parameters {
            if let Some(ty) = element_type(definition, &parameter.element) {
                let argument = format_ident!("{}", parameter.ident);
                arguments.push(quote!(#argument: #ty));
                argument_names.push(argument);
            }

            if parameter.is_aliased() {
                alias_docs.push(format!(" `{}` is sent as `{}`", parameter.ident, parameter.wire_name));
            }
        }

        if !alias_docs.is_empty() {
            alias_docs.insert(0, String::new());
            alias_docs.insert(1, " Wire names:".to_owned());
        }

        let field_count = definition
            .index
            .get(request)
            .map_or(0, |model| fields(definition, model).len());
        let rest = if field_count > argument_names.len() {
            quote!(..Default::default())
        } else {
            quote!()
        };

        quote! {
            #(#[doc = #docs])*
            #(#[doc = #alias_docs])*
            pub fn #name(#(#arguments),*) -> #response_ty {
                let _request = #request_ty {
                    #(#argument_names,)*
                    #rest
                };

                #response_ty::default()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Rust;

impl Rust {
    pub fn tokens(&self, definition: &Definition, selection: &Selection<'_>) -> TokenStream {
        let namespace = &definition.namespace;

        let omitted = if definition.dropped.is_empty() {
            quote!()
        } else {
            let dropped = &definition.dropped;
            quote! {
                /// Models left out because of missing or cyclic dependencies.
                pub const OMITTED_MODELS: &[&str] = &[#(#dropped),*];
            }
        };

        let models = selection
            .models
            .iter()
            .map(|model| model.codegen(definition));

        let service = if selection.operations.is_empty() {
            quote!()
        } else {
            let service = format_ident!("{}", definition.service);
            let operations = selection
                .operations
                .iter()
                .map(|operation| operation.codegen(definition));

            quote! {
                pub struct #service;

                #[allow(non_snake_case, non_upper_case_globals)]
                impl #service {
                    #(#operations)*
                }
            }
        };

        quote! {
            pub const NAMESPACE: &str = #namespace;

            #omitted

            #(#models)*

            #service
        }
    }
}

impl Backend for Rust {
    fn reserved_words(&self) -> &'static [&'static str] {
        RUST_KEYWORDS
    }

    fn reserved_type_names(&self) -> &'static [&'static str] {
        RUST_TYPE_NAMES
    }

    fn render(&self, definition: &Definition, selection: &Selection<'_>) -> Result<String, Error> {
        let file: syn::File = syn::parse2(self.tokens(definition, selection))?;
        Ok(prettyplease::unparse(&file))
    }
}
