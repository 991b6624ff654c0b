use std::fmt;

/// Failure to map a raw UCD name onto a declared alias group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasError {
    /// No property alias group declares this spelling.
    UnknownProperty(String),
    /// The property has no value alias-set containing this spelling.
    UnknownValue { property: String, value: String },
    /// A boolean property matched zero or several value alias keys.
    AmbiguousValueKey {
        property: String,
        candidates: Vec<String>,
    },
}

impl fmt::Display for AliasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownProperty(name) => write!(f, "unknown property {name:?}"),
            Self::UnknownValue { property, value } => {
                write!(f, "unknown value {value:?} for property {property:?}")
            }
            Self::AmbiguousValueKey {
                property,
                candidates,
            } => write!(
                f,
                "property {property:?} must match exactly one value alias key, found [{}]",
                candidates.join(", ")
            ),
        }
    }
}

impl std::error::Error for AliasError {}

/// Every fatal condition of a generation or validation run.
#[derive(Debug)]
pub enum Error {
    /// A source line did not have the expected shape.
    SourceFormat {
        file: String,
        line: usize,
        text: String,
        reason: String,
    },
    /// A UCD file is absent from the directory or archive.
    MissingSource { file: String },
    Io {
        file: String,
        source: std::io::Error,
    },
    Alias(AliasError),
    /// A general category subset chain refers back to itself.
    Cycle { chain: Vec<String> },
    /// A codepoint claimed by the artifact does not satisfy its property.
    ValidationMismatch { query: String, codepoint: u32 },
    Configuration(String),
}

impl Error {
    pub(crate) fn source_format(
        file: &str,
        line: usize,
        text: &str,
        reason: impl Into<String>,
    ) -> Self {
        Self::SourceFormat {
            file: file.to_owned(),
            line,
            text: text.to_owned(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(file: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            file: file.into(),
            source,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceFormat {
                file,
                line,
                text,
                reason,
            } => write!(f, "{file}:{line}: {reason}: {text:?}"),
            Self::MissingSource { file } => write!(f, "missing UCD source {file}"),
            Self::Io { file, source } => write!(f, "failed to read {file}: {source}"),
            Self::Alias(err) => write!(f, "alias resolution failed: {err}"),
            Self::Cycle { chain } => {
                write!(f, "general category subsets form a cycle: {}", chain.join(" -> "))
            }
            Self::ValidationMismatch { query, codepoint } => {
                write!(f, "U+{codepoint:04X} does not match {query}")
            }
            Self::Configuration(msg) => write!(f, "configuration error: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Alias(err) => Some(err),
            _ => None,
        }
    }
}

impl From<AliasError> for Error {
    fn from(err: AliasError) -> Self {
        Self::Alias(err)
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
