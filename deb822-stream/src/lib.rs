#![deny(missing_docs)]
//! Streaming parser for the deb822 format.
//!
//! deb822 is the RFC822-derived text format used throughout the APT world:
//! `Release` files carry a single header stanza, while `Packages` files and
//! deb822-style sources lists chain many stanzas separated by blank lines.
//!
//! The parser is line-oriented and single-pass. Field values are stored as
//! their original physical lines; folding them into one logical line is a
//! derived view ([`Field::unfold`]), never the primary storage, so that
//! line-structured fields such as hash tables survive intact and records can
//! be serialized back byte-identically.
//!
//! ```rust
//! use deb822_stream::Record;
//!
//! let record: Record = "Package: hello\nDescription: greets\n the user\n"
//!     .parse()
//!     .unwrap();
//! assert_eq!(record.get("Description").as_deref(), Some("greets the user"));
//! ```

mod parser;

pub use parser::RecordReader;

/// Error type for the parser.
#[derive(Debug)]
pub enum Error {
    /// A line that is neither blank, comment, continuation nor `Name: value`.
    InvalidFieldLine(String),

    /// A continuation line appeared before any field was opened.
    ContinuationWithoutField(String),

    /// A field name violating the deb822 name grammar.
    InvalidFieldName(String),

    /// A field name repeated (case-insensitively) within one record.
    DuplicateField(String),

    /// Unexpected end-of-file.
    UnexpectedEof,

    /// Expected end-of-file.
    ExpectedEof,

    /// IO error.
    Io(std::io::Error),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            Self::InvalidFieldLine(line) => write!(f, "Not a valid field line: {}", line),
            Self::ContinuationWithoutField(line) => {
                write!(f, "Continuation line without a field: {}", line)
            }
            Self::InvalidFieldName(name) => write!(f, "Invalid field name: {}", name),
            Self::DuplicateField(name) => write!(f, "Duplicate field: {}", name),
            Self::UnexpectedEof => f.write_str("Unexpected end-of-file"),
            Self::ExpectedEof => f.write_str("Expected end-of-file"),
            Self::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

/// A field in a deb822 record.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Field {
    /// The name of the field.
    pub name: String,

    /// The physical value lines, one entry per source line, in order.
    pub lines: Vec<String>,
}

impl Field {
    /// Create a field from a name and its physical value lines.
    pub fn new(name: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            name: name.into(),
            lines,
        }
    }

    /// The RFC822-folded reading: all lines joined with a single space.
    ///
    /// An empty line in the middle still contributes an empty token, so the
    /// joined result carries a double space there. Fields whose per-line
    /// structure matters (hash tables) must be read through [`Field::lines`]
    /// instead.
    pub fn unfold(&self) -> String {
        self.lines.join(" ")
    }

    /// The line-preserving reading of the value.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut lines = self.lines.iter();
        match lines.next() {
            Some(first) if !first.is_empty() => writeln!(f, "{}: {}", self.name, first)?,
            // No space after the colon, so `SHA256:` blocks round-trip.
            _ => writeln!(f, "{}:", self.name)?,
        }
        for line in lines {
            writeln!(f, " {}", line)?;
        }
        Ok(())
    }
}

/// One blank-line-delimited stanza: an ordered sequence of fields.
///
/// Records are sealed once the parser yields them; no two fields share a
/// case-insensitively equal name.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Record {
    fields: Vec<Field>,
}

impl Record {
    /// Look up a field by name, case-insensitively.
    pub fn field(&self, name: &str) -> Option<&Field> {
        // Linear scan: records hold tens of fields at most, and source order
        // must be preserved for round-tripping.
        self.fields
            .iter()
            .find(|field| field.name.eq_ignore_ascii_case(name))
    }

    /// Get the unfolded value of a field by name.
    ///
    /// Returns `None` if the field does not exist.
    pub fn get(&self, name: &str) -> Option<String> {
        self.field(name).map(Field::unfold)
    }

    /// Get the raw value lines of a field by name.
    pub fn lines(&self, name: &str) -> Option<&[String]> {
        self.field(name).map(Field::lines)
    }

    /// Check whether a field is present, case-insensitively.
    pub fn has(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Field names in their original order of appearance.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.name.as_str())
    }

    /// Iterate over the fields in the record.
    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    /// Return the number of fields in the record.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the record is empty.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Read a single header stanza, RFC822-style.
    ///
    /// Stops at the first record boundary; anything past it is never read.
    /// Returns `Ok(None)` if the input holds no fields at all.
    pub fn read_header<R: std::io::BufRead>(reader: R) -> Result<Option<Self>, Error> {
        RecordReader::new(reader).next().transpose()
    }
}

impl From<Vec<Field>> for Record {
    fn from(fields: Vec<Field>) -> Self {
        Self { fields }
    }
}

impl IntoIterator for Record {
    type Item = Field;
    type IntoIter = std::vec::IntoIter<Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for field in &self.fields {
            field.fmt(f)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for Record {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut reader = RecordReader::new(s.as_bytes());
        let record = reader.next().ok_or(Error::UnexpectedEof)??;
        if reader.next().is_some() {
            return Err(Error::ExpectedEof);
        }
        Ok(record)
    }
}

/// A fully materialized deb822 document.
///
/// For large inputs prefer the lazy [`Document::read`] cursor; collecting a
/// `Packages` file with tens of thousands of stanzas is rarely what you want.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Document(Vec<Record>);

impl Document {
    /// Number of records in the document.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the document is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the records in the document.
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.0.iter()
    }

    /// Read all records from a reader.
    pub fn from_reader<R: std::io::BufRead>(reader: R) -> Result<Self, Error> {
        Self::read(reader).collect::<Result<Vec<_>, _>>().map(Self)
    }

    /// Stream records from a reader, one stanza at a time.
    ///
    /// The returned iterator is pull-based: a consumer that stops early
    /// causes no further input to be read, and the iterator fuses after the
    /// first error.
    pub fn read<R: std::io::BufRead>(reader: R) -> RecordReader<R> {
        RecordReader::new(reader)
    }
}

impl From<Document> for Vec<Record> {
    fn from(doc: Document) -> Self {
        doc.0
    }
}

impl IntoIterator for Document {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl std::fmt::Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for (i, record) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", record)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for Document {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordReader::new(s.as_bytes())
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn test_parse_single_record() {
        let record: Record = indoc! {"
            Package: hello
            Version: 2.10
            Architecture: amd64
        "}
        .parse()
        .unwrap();

        assert_eq!(record.len(), 3);
        assert_eq!(record.get("Package").as_deref(), Some("hello"));
        assert_eq!(record.get("Version").as_deref(), Some("2.10"));
        assert_eq!(
            record.field_names().collect::<Vec<_>>(),
            vec!["Package", "Version", "Architecture"]
        );
    }

    #[test]
    fn test_get_is_case_insensitive() {
        let record: Record = "Origin: Debian\n".parse().unwrap();
        assert_eq!(record.get("Origin").as_deref(), Some("Debian"));
        assert_eq!(record.get("origin").as_deref(), Some("Debian"));
        assert_eq!(record.get("ORIGIN").as_deref(), Some("Debian"));
        assert!(record.has("oRiGiN"));
        assert!(!record.has("Label"));
    }

    #[test]
    fn test_continuation_accumulation() {
        let record: Record = indoc! {"
            Description: line one
             line two
             line three
        "}
        .parse()
        .unwrap();

        assert_eq!(
            record.get("Description").as_deref(),
            Some("line one line two line three")
        );
        assert_eq!(
            record.lines("Description").unwrap(),
            &["line one", "line two", "line three"]
        );
    }

    #[test]
    fn test_unfold_preserves_empty_line_token() {
        let field = Field::new(
            "Description",
            vec![
                "First line".to_string(),
                "".to_string(),
                "Third line".to_string(),
            ],
        );
        // The empty middle line contributes an empty token: double space.
        assert_eq!(field.unfold(), "First line  Third line");
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let result = "Package: a\nVersion: 1\nPackage: b\n".parse::<Record>();
        assert!(matches!(result, Err(Error::DuplicateField(name)) if name == "Package"));
    }

    #[test]
    fn test_duplicate_field_case_insensitive() {
        let result = "Package: a\npackage: b\n".parse::<Record>();
        assert!(matches!(result, Err(Error::DuplicateField(_))));
    }

    #[test]
    fn test_continuation_without_field() {
        let result = " dangling\n".parse::<Record>();
        assert!(matches!(result, Err(Error::ContinuationWithoutField(_))));
    }

    #[test]
    fn test_invalid_field_line() {
        let result = "Package: a\nno colon here\n".parse::<Record>();
        assert!(matches!(result, Err(Error::InvalidFieldLine(line)) if line == "no colon here"));
    }

    #[test]
    fn test_invalid_field_names() {
        for input in ["-Dash: x\n", ": empty\n", "Sp ace: x\n", "Na\u{e9}me: x\n"] {
            let result = input.parse::<Record>();
            assert!(
                matches!(result, Err(Error::InvalidFieldName(_))),
                "accepted {:?}",
                input
            );
        }
    }

    #[test]
    fn test_comments_ignored() {
        let record: Record = indoc! {"
            # leading comment
            Package: hello
              # indented comment
            Version: 2.10
        "}
        .parse()
        .unwrap();

        assert_eq!(record.len(), 2);
        assert_eq!(record.get("Package").as_deref(), Some("hello"));
    }

    #[test]
    fn test_continuation_keeps_colons() {
        let record: Record = "Description: short\n line: with colon\n".parse().unwrap();
        assert_eq!(
            record.get("Description").as_deref(),
            Some("short line: with colon")
        );
    }

    #[test]
    fn test_trailing_whitespace_survives() {
        // Only leading whitespace is stripped from value lines.
        let record: Record = "Description: one \n two \n".parse().unwrap();
        assert_eq!(record.lines("Description").unwrap(), &["one ", "two "]);
        assert_eq!(record.get("Description").as_deref(), Some("one  two "));
    }

    #[test]
    fn test_no_trailing_blank_line_required() {
        let record: Record = "Package: hello".parse().unwrap();
        assert_eq!(record.get("Package").as_deref(), Some("hello"));
    }

    #[test]
    fn test_crlf_line_endings() {
        let record: Record = "Package: hello\r\nVersion: 2.10\r\n".parse().unwrap();
        assert_eq!(record.get("Package").as_deref(), Some("hello"));
        assert_eq!(record.get("Version").as_deref(), Some("2.10"));
    }

    #[test]
    fn test_record_from_str_wants_one_stanza() {
        let result = "Package: a\n\nPackage: b\n".parse::<Record>();
        assert!(matches!(result, Err(Error::ExpectedEof)));

        let result = "".parse::<Record>();
        assert!(matches!(result, Err(Error::UnexpectedEof)));

        let result = "\n# only comments\n\n".parse::<Record>();
        assert!(matches!(result, Err(Error::UnexpectedEof)));
    }

    #[test]
    fn test_round_trip() {
        let input = indoc! {"
            Origin: Debian
            Suite: stable
            Description: a release
             with a second line
            SHA256:
             4c195df3750b6fdb056bd98d18542d25 4188 main/binary-amd64/Packages
             93a1f3750b6fdb056bd98d18542d25aa 1234 main/binary-arm64/Packages
        "};
        let record: Record = input.parse().unwrap();
        assert_eq!(record.to_string(), input);
    }

    #[test]
    fn test_document_round_trip() {
        let input = indoc! {"
            Package: a
            Version: 1

            Package: b
            Version: 2
            Description: second
             stanza
        "};
        let doc: Document = input.parse().unwrap();
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.to_string(), input);
    }

    #[test]
    fn test_document_parse() {
        let doc: Document = indoc! {"
            Package: hello
            Version: 2.10

            # a comment between stanzas

            Package: world
            Version: 1.0
        "}
        .parse()
        .unwrap();

        assert_eq!(doc.len(), 2);
        let records: Vec<_> = doc.iter().collect();
        assert_eq!(records[0].get("Package").as_deref(), Some("hello"));
        assert_eq!(records[1].get("Package").as_deref(), Some("world"));
    }

    #[test]
    fn test_document_empty_input() {
        let doc: Document = "".parse().unwrap();
        assert!(doc.is_empty());
        let doc: Document = "\n\n# nothing but comments\n\n".parse().unwrap();
        assert_eq!(doc.len(), 0);
    }

    #[test]
    fn test_read_header_stops_at_boundary() {
        let input = "Origin: Debian\nSuite: stable\n\nPackage: ignored\n";
        let header = Record::read_header(input.as_bytes()).unwrap().unwrap();
        assert_eq!(header.len(), 2);
        assert_eq!(header.get("Origin").as_deref(), Some("Debian"));
        assert!(!header.has("Package"));
    }

    #[test]
    fn test_read_header_ignores_garbage_past_boundary() {
        // The second stanza is malformed, but a header read never gets there.
        let input = "Origin: Debian\n\nnot a field line\n";
        let header = Record::read_header(input.as_bytes()).unwrap().unwrap();
        assert_eq!(header.get("Origin").as_deref(), Some("Debian"));
    }

    #[test]
    fn test_read_header_empty_input() {
        assert!(Record::read_header("".as_bytes()).unwrap().is_none());
        assert!(Record::read_header("\n\n".as_bytes()).unwrap().is_none());
    }

    #[test]
    fn test_lazy_reader_early_termination() {
        // Three stanzas, the third malformed. Stopping after the second must
        // never touch the third.
        let input = indoc! {"
            Package: a
            Version: 1

            Package: b
            Version: 2

            broken stanza without colon
        "};
        let mut reader = Document::read(input.as_bytes());
        assert_eq!(
            reader.next().unwrap().unwrap().get("Package").as_deref(),
            Some("a")
        );
        assert_eq!(
            reader.next().unwrap().unwrap().get("Package").as_deref(),
            Some("b")
        );
        drop(reader);

        // Consumed to the end, the same input does fail.
        let err = Document::read(input.as_bytes())
            .collect::<Result<Vec<_>, _>>()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidFieldLine(_)));
    }

    #[test]
    fn test_reader_fuses_after_error() {
        let input = "Package: a\nPackage: b\n\nPackage: c\n";
        let mut reader = Document::read(input.as_bytes());
        assert!(matches!(
            reader.next(),
            Some(Err(Error::DuplicateField(_)))
        ));
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_reader_io_error() {
        struct FailingReader;
        impl std::io::Read for FailingReader {
            fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("test error"))
            }
        }

        let mut reader = Document::read(std::io::BufReader::new(FailingReader));
        assert!(matches!(reader.next(), Some(Err(Error::Io(_)))));
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_empty_first_line_serialization() {
        let record: Record = "SHA256:\n aa 1 path\n".parse().unwrap();
        assert_eq!(record.lines("SHA256").unwrap(), &["", "aa 1 path"]);
        assert_eq!(record.to_string(), "SHA256:\n aa 1 path\n");
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::InvalidFieldLine("x".to_string()).to_string(),
            "Not a valid field line: x"
        );
        assert_eq!(
            Error::DuplicateField("Package".to_string()).to_string(),
            "Duplicate field: Package"
        );
        assert_eq!(Error::UnexpectedEof.to_string(), "Unexpected end-of-file");
        let err = Error::Io(std::io::Error::other("test error"));
        assert!(err.to_string().contains("IO error: test error"));
    }
}
