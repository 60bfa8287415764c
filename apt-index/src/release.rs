//! Typed view of an APT `Release` header.

use crate::error::ExtractError;
use crate::fields::{parse_date, parse_flag, HashEntry};
use chrono::{DateTime, Utc};
use deb822_stream::Record;

/// The top-level metadata stanza of a repository suite.
///
/// Carries the validated standard fields and keeps the source [`Record`]
/// around, so non-standard fields stay reachable through
/// [`Release::get`] and friends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    /// Origin of the release.
    pub origin: Option<String>,

    /// Label of the release.
    pub label: Option<String>,

    /// Suite name, e.g. `stable`. At least one of suite and codename is set.
    pub suite: Option<String>,

    /// Codename, e.g. `trixie`.
    pub codename: Option<String>,

    /// Version of the release.
    pub version: Option<String>,

    /// Architectures supported by the release.
    pub architectures: Vec<String>,

    /// Components of the release. Empty for flat repositories, which carry
    /// no `Components` field at all.
    pub components: Vec<String>,

    /// Date the release was published.
    pub date: DateTime<Utc>,

    /// Point in time after which the release should be considered stale.
    pub valid_until: Option<DateTime<Utc>>,

    /// Fingerprints or key paths from `Signed-By`, comma-separated in source.
    pub signed_by: Vec<String>,

    /// Whether APT should refrain from installing packages automatically.
    pub not_automatic: bool,

    /// Whether upgrades of already-installed packages are still automatic.
    pub but_automatic_upgrades: bool,

    /// Whether index files can be acquired by hash.
    pub acquire_by_hash: bool,

    /// Whether the release lacks `Architecture: all` support.
    pub no_support_for_architecture_all: bool,

    /// SHA256 hash table, one entry per index file.
    pub sha256: Vec<HashEntry>,

    /// Legacy SHA1 hash table.
    pub sha1: Vec<HashEntry>,

    /// Legacy MD5 hash table.
    pub md5sum: Vec<HashEntry>,

    record: Record,
}

/// Decode a hash-table field into its rows, skipping blank lines.
///
/// Rows live one per physical line, so this reads the field through the
/// line-preserving view; unfolding would merge all rows into one blob.
fn hash_entries(record: &Record, name: &str) -> Result<Vec<HashEntry>, ExtractError> {
    match record.lines(name) {
        Some(lines) => lines
            .iter()
            .filter(|line| !line.trim().is_empty())
            .map(|line| line.parse())
            .collect(),
        None => Ok(Vec::new()),
    }
}

fn whitespace_list(value: Option<String>) -> Vec<String> {
    value
        .map(|v| v.split_whitespace().map(|s| s.to_string()).collect())
        .unwrap_or_default()
}

impl Release {
    /// Extract a typed release from a parsed record.
    ///
    /// The record is consumed; it remains accessible via [`Release::record`].
    pub fn from_record(record: Record) -> Result<Self, ExtractError> {
        let suite = record.get("Suite").filter(|s| !s.is_empty());
        let codename = record.get("Codename").filter(|s| !s.is_empty());
        if suite.is_none() && codename.is_none() {
            return Err(ExtractError::MissingMandatoryField("Suite or Codename"));
        }

        let architectures = whitespace_list(record.get("Architectures"));
        if architectures.is_empty() {
            return Err(ExtractError::MissingMandatoryField("Architectures"));
        }

        // Flat repositories legitimately omit Components.
        let components = whitespace_list(record.get("Components"));

        let date = match record.get("Date") {
            Some(raw) => parse_date(&raw)?,
            None => return Err(ExtractError::MissingMandatoryField("Date")),
        };

        let sha256 = hash_entries(&record, "SHA256")?;

        let valid_until = match record.get("Valid-Until") {
            Some(raw) => Some(parse_date(&raw)?),
            None => None,
        };

        let sha1 = hash_entries(&record, "SHA1")?;
        let md5sum = hash_entries(&record, "MD5Sum")?;

        let signed_by = record
            .get("Signed-By")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            origin: record.get("Origin"),
            label: record.get("Label"),
            suite,
            codename,
            version: record.get("Version"),
            architectures,
            components,
            date,
            valid_until,
            signed_by,
            not_automatic: record.get("NotAutomatic").is_some_and(|v| parse_flag(&v)),
            but_automatic_upgrades: record
                .get("ButAutomaticUpgrades")
                .is_some_and(|v| parse_flag(&v)),
            acquire_by_hash: record.get("Acquire-By-Hash").is_some_and(|v| parse_flag(&v)),
            no_support_for_architecture_all: record
                .get("No-Support-for-Architecture-all")
                .is_some_and(|v| parse_flag(&v)),
            sha256,
            sha1,
            md5sum,
            record,
        })
    }

    /// Read the header stanza from a decompressed Release document and
    /// extract it.
    pub fn read_from<R: std::io::BufRead>(reader: R) -> Result<Self, ExtractError> {
        match Record::read_header(reader)? {
            Some(record) => Self::from_record(record),
            None => Err(ExtractError::Parse(deb822_stream::Error::UnexpectedEof)),
        }
    }

    /// The source record, including non-standard fields.
    pub fn record(&self) -> &Record {
        &self.record
    }

    /// Unfolded value of any field of the source record.
    pub fn get(&self, name: &str) -> Option<String> {
        self.record.get(name)
    }

    /// Raw value lines of any field of the source record.
    pub fn get_lines(&self, name: &str) -> Option<&[String]> {
        self.record.lines(name)
    }

    /// Whether the source record carries a field, case-insensitively.
    pub fn has_field(&self, name: &str) -> bool {
        self.record.has(name)
    }

    /// Field names of the source record, in original order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.record.field_names()
    }
}

impl std::str::FromStr for Release {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::read_from(s.as_bytes())
    }
}
