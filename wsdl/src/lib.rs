use std::{fs, path::Path};

use tracing::debug;
use url::Url;

mod nodes;

pub mod builder;
pub mod definitions;
pub mod diagnostic;
pub mod error;
pub mod index;
pub mod types;
pub mod xml;

pub use builder::BuildContext;
pub use definitions::{Definitions, Direction, MessageType, OperationDecl};
pub use diagnostic::Diagnostic;
pub use error::Error;
pub use index::SchemaIndex;

/// Turns a command line location into a URL. Anything that is not already an
/// absolute URL is taken as a filesystem path.
pub fn location_url<S: AsRef<str>>(location: S) -> Result<Url, Error> {
    match Url::parse(location.as_ref()) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::from_file_path(
            Path::new(location.as_ref())
                .canonicalize()
                .map_err(|err| Error::PathConversion(Some(err)))?,
        )
        .map_err(|()| Error::PathConversion(None)),
        Err(err) => Err(err.into()),
    }
}

fn fetch(url: &Url) -> Result<String, Error> {
    debug!("loading {}", url);

    match url.scheme() {
        "file" => {
            let path = url
                .to_file_path()
                .map_err(|()| Error::PathConversion(None))?;
            Ok(fs::read_to_string(path)?)
        }

        "http" | "https" => Ok(reqwest::blocking::get(url.clone())?
            .error_for_status()?
            .text()?),

        other => Err(Error::UnsupportedScheme(other.into())),
    }
}

/// Loads and indexes the WSDL at `location`: a filesystem path, or a `file`,
/// `http` or `https` URL.
pub fn parse<S: AsRef<str>>(location: S) -> Result<Definitions, Error> {
    let url = location_url(location)?;
    let xml = fetch(&url)?;
    parse_str(&xml)
}

pub fn parse_str(xml: &str) -> Result<Definitions, Error> {
    Definitions::from_document(xml::Document::parse(xml)?)
}
