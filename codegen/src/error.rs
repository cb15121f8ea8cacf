use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Wsdl(#[from] wsdlstub_wsdl::Error),

    /// Generated Rust did not parse back as a file. A bug in the Rust backend.
    #[error("Unable to format generated code: {0}")]
    Format(#[from] syn::Error),
}
