use quick_xml::events::attributes::AttrError;
use thiserror::Error;

/// Fatal errors. Everything here aborts the run: either the document could
/// not be obtained, or it is not the WSDL it claims to be.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Unable to parse provided URL")]
    UrlParse(#[from] url::ParseError),

    #[error("Unable to convert provided path")]
    PathConversion(Option<std::io::Error>),

    #[error("Unable to read file")]
    Io(#[from] std::io::Error),

    #[error("Unable to get file from server")]
    Request(#[from] reqwest::Error),

    #[error("Unsupported URL scheme {0}")]
    UnsupportedScheme(String),

    #[error("Error parsing XML input: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Error parsing XML attribute: {0}")]
    Attr(#[from] AttrError),

    #[error("Invalid UTF-8 in XML name: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Missing required attribute.
    #[error("missing required attribute '{attribute}' on element '{element}'")]
    MissingAttribute {
        /// Element name.
        element: String,
        /// Attribute name.
        attribute: String,
    },

    /// Attribute present but its value is not usable.
    #[error("invalid value '{value}' for attribute '{attribute}' on element '{element}'")]
    InvalidAttribute {
        /// Element name.
        element: String,
        /// Attribute name.
        attribute: String,
        /// Offending value.
        value: String,
    },

    /// A qualified name uses a prefix with no namespace declaration in scope.
    #[error("unbound namespace prefix '{prefix}' in '{value}'")]
    UnboundPrefix {
        /// The prefix.
        prefix: String,
        /// The full attribute value.
        value: String,
    },

    #[error("invalid document structure: {message}")]
    InvalidStructure { message: String },
}

impl Error {
    /// Creates a missing attribute error.
    pub fn missing_attr(element: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::MissingAttribute {
            element: element.into(),
            attribute: attribute.into(),
        }
    }

    /// Creates an invalid attribute error.
    pub fn invalid_attr(
        element: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::InvalidAttribute {
            element: element.into(),
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    pub fn structure(message: impl Into<String>) -> Self {
        Self::InvalidStructure {
            message: message.into(),
        }
    }
}
