extern crate proc_macro;

use std::path::Path;

use proc_macro::TokenStream;
use syn::{parse_macro_input, LitStr};
use wsdlstub_codegen as codegen;

/// Expands to the Rust structs and service skeleton for a WSDL document.
/// Relative paths are taken from the including crate's manifest directory.
///
/// ```ignore
/// wsdlstub_macro::include_wsdl!("service.wsdl");
/// ```
#[proc_macro]
pub fn include_wsdl(input: TokenStream) -> TokenStream {
    let location = parse_macro_input!(input as LitStr);
    let value = location.value();

    let resolved = match std::env::var("CARGO_MANIFEST_DIR") {
        Ok(root) if Path::new(&value).is_relative() && !value.contains("://") => {
            Path::new(&root).join(&value).to_string_lossy().into_owned()
        }
        _ => value,
    };

    match codegen::tokens_from_url(&resolved) {
        Ok(tokens) => tokens.into(),
        Err(err) => syn::Error::new(location.span(), format!("{}: {}", resolved, err))
            .to_compile_error()
            .into(),
    }
}
