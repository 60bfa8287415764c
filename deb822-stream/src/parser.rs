//! The line-oriented record state machine.
//!
//! One pass, one line at a time: comments are dropped, blank lines seal the
//! current record, continuation lines extend the open field, and `Name:`
//! lines open a new one. [`RecordReader`] drives the machine over a
//! [`std::io::BufRead`] and yields records lazily, never reading past the
//! boundary of the last consumed stanza.

use crate::{Error, Field, Record};

/// Valid deb822 field names are non-empty, printable US-ASCII without space
/// or colon, and may not start with `#` or `-`.
fn valid_field_name(name: &str) -> bool {
    if name.is_empty() || name.starts_with('#') || name.starts_with('-') {
        return false;
    }
    name.bytes().all(|b| (0x21..=0x7e).contains(&b) && b != b':')
}

/// Accumulates fields for one record as lines are fed in.
#[derive(Default)]
struct RecordBuilder {
    fields: Vec<Field>,
    pending: Option<Field>,
}

impl RecordBuilder {
    /// Consume one physical line.
    ///
    /// Returns `Ok(Some(record))` when a blank line seals a non-empty
    /// record; blank lines before any field are skipped.
    fn feed(&mut self, raw: &str) -> Result<Option<Record>, Error> {
        let line = raw.strip_suffix('\n').unwrap_or(raw);
        let line = line.strip_suffix('\r').unwrap_or(line);

        if line.trim_start().starts_with('#') {
            return Ok(None);
        }
        if line.trim().is_empty() {
            return Ok(self.seal());
        }
        if line.starts_with(' ') || line.starts_with('\t') {
            return match self.pending.as_mut() {
                Some(field) => {
                    // Only leading whitespace is continuation markup; a
                    // trailing space is part of the value.
                    field.lines.push(line.trim_start().to_string());
                    Ok(None)
                }
                None => Err(Error::ContinuationWithoutField(line.to_string())),
            };
        }
        match line.find(':') {
            Some(colon) => {
                let name = line[..colon].trim();
                if !valid_field_name(name) {
                    return Err(Error::InvalidFieldName(name.to_string()));
                }
                self.flush_pending();
                if self.fields.iter().any(|f| f.name.eq_ignore_ascii_case(name)) {
                    return Err(Error::DuplicateField(name.to_string()));
                }
                self.pending = Some(Field::new(
                    name,
                    vec![line[colon + 1..].trim_start().to_string()],
                ));
                Ok(None)
            }
            None => Err(Error::InvalidFieldLine(line.to_string())),
        }
    }

    /// End-of-input behaves exactly like a blank line.
    fn finish(&mut self) -> Option<Record> {
        self.seal()
    }

    fn flush_pending(&mut self) {
        if let Some(field) = self.pending.take() {
            self.fields.push(field);
        }
    }

    fn seal(&mut self) -> Option<Record> {
        self.flush_pending();
        if self.fields.is_empty() {
            None
        } else {
            Some(Record::from(std::mem::take(&mut self.fields)))
        }
    }
}

/// Iterator that streams records from a buffered reader.
///
/// Yields one [`Record`] per blank-line-delimited stanza. Input is consumed
/// strictly on demand, so dropping the iterator after the n-th record leaves
/// everything past that stanza unread. The iterator fuses after yielding an
/// error: a parse that has failed produces nothing further.
pub struct RecordReader<R: std::io::BufRead> {
    reader: R,
    line: String,
    finished: bool,
}

impl<R: std::io::BufRead> RecordReader<R> {
    /// Create a new record reader from a buffered reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            finished: false,
        }
    }
}

impl<R: std::io::BufRead> Iterator for RecordReader<R> {
    type Item = Result<Record, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let mut builder = RecordBuilder::default();
        loop {
            self.line.clear();
            match self.reader.read_line(&mut self.line) {
                Ok(0) => {
                    self.finished = true;
                    return builder.finish().map(Ok);
                }
                Ok(_) => match builder.feed(&self.line) {
                    Ok(Some(record)) => return Some(Ok(record)),
                    Ok(None) => {}
                    Err(e) => {
                        self.finished = true;
                        return Some(Err(e));
                    }
                },
                Err(e) => {
                    self.finished = true;
                    return Some(Err(Error::Io(e)));
                }
            }
        }
    }
}
