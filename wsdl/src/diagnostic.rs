use std::fmt;

/// Something the generator worked around instead of failing on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A referenced complexType, group or message type cannot be located.
    UnresolvedReference { owner: String, name: String },

    /// An XSD primitive with no mapping; the field is left out.
    UnknownPrimitiveType {
        owner: String,
        field: String,
        type_name: String,
    },

    /// A schema tag the builder does not handle; its children are still
    /// visited.
    UnrecognizedConstruct { owner: String, tag: String },

    /// Second top-level definition with an already used name. The first one
    /// wins.
    DuplicateDefinition { kind: &'static str, name: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnresolvedReference { owner, name } => {
                write!(f, "{}: unresolved reference to '{}'", owner, name)
            }
            Self::UnknownPrimitiveType {
                owner,
                field,
                type_name,
            } => write!(
                f,
                "{}: unknown primitive type '{}' for field '{}', field omitted",
                owner, type_name, field
            ),
            Self::UnrecognizedConstruct { owner, tag } => {
                write!(f, "{}: unrecognized schema construct '{}' skipped", owner, tag)
            }
            Self::DuplicateDefinition { kind, name } => {
                write!(f, "duplicate {} definition '{}' ignored", kind, name)
            }
        }
    }
}
