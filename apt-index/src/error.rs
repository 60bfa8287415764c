//! Error type for semantic extraction of APT index records.
//!
//! Extraction errors are terminal: a `Release` or `Packages` document with a
//! malformed mandatory field cannot be trusted, so callers surface the error
//! instead of attempting partial recovery.

/// Errors raised while turning a generic record into a typed index object.
#[derive(Debug)]
pub enum ExtractError {
    /// A field the format requires is absent or empty.
    MissingMandatoryField(&'static str),

    /// A numeric field failed to parse.
    InvalidNumericField {
        /// The field name.
        field: &'static str,
        /// The raw value as it appeared in the record.
        value: String,
    },

    /// A numeric field parsed but fell outside its permitted range.
    OutOfRangeField {
        /// The field name.
        field: &'static str,
        /// The offending value.
        value: i64,
    },

    /// A date field matched none of the supported formats.
    UnparsableDate(String),

    /// A hash-table row did not hold exactly `hash size path`.
    InvalidHashEntry(String),

    /// The underlying deb822 grammar rejected the input.
    Parse(deb822_stream::Error),
}

impl From<deb822_stream::Error> for ExtractError {
    fn from(e: deb822_stream::Error) -> Self {
        Self::Parse(e)
    }
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            Self::MissingMandatoryField(field) => {
                write!(f, "Missing mandatory field: {}", field)
            }
            Self::InvalidNumericField { field, value } => {
                write!(f, "Field {} is not a valid number: {}", field, value)
            }
            Self::OutOfRangeField { field, value } => {
                write!(f, "Field {} is out of range: {}", field, value)
            }
            Self::UnparsableDate(value) => write!(f, "Unparsable date: {}", value),
            Self::InvalidHashEntry(line) => write!(f, "Invalid hash entry: {}", line),
            Self::Parse(e) => write!(f, "Parse error: {}", e),
        }
    }
}

impl std::error::Error for ExtractError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            _ => None,
        }
    }
}
