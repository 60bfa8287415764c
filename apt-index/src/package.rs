//! Typed view of one `Packages` stanza.

use crate::error::ExtractError;
use crate::fields::parse_flag;
use deb822_stream::{Record, RecordReader};

/// The dependency-relation fields a package stanza can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RelationKind {
    /// `Depends`
    Depends,
    /// `Pre-Depends`
    PreDepends,
    /// `Recommends`
    Recommends,
    /// `Suggests`
    Suggests,
    /// `Enhances`
    Enhances,
    /// `Breaks`
    Breaks,
    /// `Conflicts`
    Conflicts,
    /// `Provides`
    Provides,
    /// `Replaces`
    Replaces,
}

impl RelationKind {
    /// All relation kinds, in the order they are reported by
    /// [`Package::relations`].
    pub const ALL: [RelationKind; 9] = [
        RelationKind::Depends,
        RelationKind::PreDepends,
        RelationKind::Recommends,
        RelationKind::Suggests,
        RelationKind::Enhances,
        RelationKind::Breaks,
        RelationKind::Conflicts,
        RelationKind::Provides,
        RelationKind::Replaces,
    ];

    /// The field name carrying this relation.
    pub fn as_field(&self) -> &'static str {
        match self {
            RelationKind::Depends => "Depends",
            RelationKind::PreDepends => "Pre-Depends",
            RelationKind::Recommends => "Recommends",
            RelationKind::Suggests => "Suggests",
            RelationKind::Enhances => "Enhances",
            RelationKind::Breaks => "Breaks",
            RelationKind::Conflicts => "Conflicts",
            RelationKind::Provides => "Provides",
            RelationKind::Replaces => "Replaces",
        }
    }
}

impl std::fmt::Display for RelationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_field())
    }
}

impl std::str::FromStr for RelationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_field().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("not a relation field: {}", s))
    }
}

/// One installable package, as described by a `Packages` stanza.
///
/// Only `Package`, `Filename` and `Size` are mandatory; everything else is
/// carried through when present. The source [`Record`] stays reachable for
/// non-standard fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    /// The name of the package.
    pub name: String,

    /// The version of the package, as the raw version string.
    pub version: Option<String>,

    /// The architecture of the package.
    pub architecture: Option<String>,

    /// Path of the `.deb` file, relative to the repository root.
    pub filename: String,

    /// Size of the `.deb` file, in bytes.
    pub size: u64,

    /// Disk space the installed package occupies, in kibibytes.
    pub installed_size: Option<i64>,

    /// Rollout percentage for phased updates, within `0..=100`.
    pub phased_update_percentage: Option<u8>,

    /// MD5 hash of the `.deb` file.
    pub md5sum: Option<String>,

    /// SHA1 hash of the `.deb` file.
    pub sha1: Option<String>,

    /// SHA256 hash of the `.deb` file.
    pub sha256: Option<String>,

    /// The source package, if different from the binary name.
    pub source: Option<String>,

    /// Section of the package.
    pub section: Option<String>,

    /// Priority of the package.
    pub priority: Option<String>,

    /// The maintainer of the package.
    pub maintainer: Option<String>,

    /// Description of the package.
    pub description: Option<String>,

    /// Homepage of the package.
    pub homepage: Option<String>,

    /// Multi-arch policy.
    pub multi_arch: Option<String>,

    /// Whether the package is essential.
    pub essential: Option<bool>,

    /// Debtags of the package.
    pub tag: Option<String>,

    /// Tasks the package belongs to.
    pub task: Option<String>,

    /// License of the package, as declared by some third-party feeds.
    pub license: Option<String>,

    /// Vendor of the package, as declared by some third-party feeds.
    pub vendor: Option<String>,

    /// Build dependencies, raw.
    pub build_depends: Option<String>,

    /// Architecture-independent build dependencies, raw.
    pub build_depends_indep: Option<String>,

    record: Record,
}

fn required(record: &Record, field: &'static str) -> Result<String, ExtractError> {
    record
        .get(field)
        .filter(|v| !v.is_empty())
        .ok_or(ExtractError::MissingMandatoryField(field))
}

fn numeric<T: std::str::FromStr>(
    record: &Record,
    field: &'static str,
) -> Result<Option<T>, ExtractError> {
    match record.get(field) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ExtractError::InvalidNumericField { field, value: raw }),
        None => Ok(None),
    }
}

impl Package {
    /// Extract a typed package from a parsed record.
    ///
    /// The record is consumed; it remains accessible via [`Package::record`].
    pub fn from_record(record: Record) -> Result<Self, ExtractError> {
        let name = required(&record, "Package")?;
        let filename = required(&record, "Filename")?;

        let size = match record.get("Size") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ExtractError::InvalidNumericField {
                    field: "Size",
                    value: raw,
                })?,
            None => return Err(ExtractError::MissingMandatoryField("Size")),
        };

        let installed_size = numeric(&record, "Installed-Size")?;

        let phased_update_percentage = numeric::<i64>(&record, "Phased-Update-Percentage")?
            .map(|value| {
                if (0..=100).contains(&value) {
                    Ok(value as u8)
                } else {
                    Err(ExtractError::OutOfRangeField {
                        field: "Phased-Update-Percentage",
                        value,
                    })
                }
            })
            .transpose()?;

        Ok(Self {
            name,
            version: record.get("Version"),
            architecture: record.get("Architecture"),
            filename,
            size,
            installed_size,
            phased_update_percentage,
            md5sum: record.get("MD5sum"),
            sha1: record.get("SHA1"),
            sha256: record.get("SHA256"),
            source: record.get("Source"),
            section: record.get("Section"),
            priority: record.get("Priority"),
            maintainer: record.get("Maintainer"),
            description: record.get("Description"),
            homepage: record.get("Homepage"),
            multi_arch: record.get("Multi-Arch"),
            essential: record.get("Essential").map(|v| parse_flag(&v)),
            tag: record.get("Tag"),
            task: record.get("Task"),
            license: record.get("License"),
            vendor: record.get("Vendor"),
            build_depends: record.get("Build-Depends"),
            build_depends_indep: record.get("Build-Depends-Indep"),
            record,
        })
    }

    /// Stream typed packages from a decompressed Packages document.
    ///
    /// Lazy like the underlying record reader: stop pulling and no further
    /// input is read. The first grammar or extraction error ends the
    /// sequence.
    pub fn read_all<R: std::io::BufRead>(
        reader: R,
    ) -> impl Iterator<Item = Result<Package, ExtractError>> {
        PackageReader {
            records: deb822_stream::Document::read(reader),
            failed: false,
        }
    }

    /// The raw dependency expressions of one relation field, split on commas.
    ///
    /// Splitting is deliberately naive: `|` alternatives and version
    /// constraints such as `(>= 1.2)` stay inside the returned strings.
    pub fn relation(&self, kind: RelationKind) -> Vec<String> {
        self.record
            .get(kind.as_field())
            .map(|value| {
                value
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Decompose all present relation fields, in [`RelationKind::ALL`] order.
    pub fn relations(&self) -> Vec<(RelationKind, Vec<String>)> {
        RelationKind::ALL
            .into_iter()
            .filter(|kind| self.record.has(kind.as_field()))
            .map(|kind| (kind, self.relation(kind)))
            .collect()
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

impl std::str::FromStr for Package {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let record: Record = s.parse()?;
        Self::from_record(record)
    }
}

struct PackageReader<R: std::io::BufRead> {
    records: RecordReader<R>,
    failed: bool,
}

impl<R: std::io::BufRead> Iterator for PackageReader<R> {
    type Item = Result<Package, ExtractError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let result = match self.records.next()? {
            Ok(record) => Package::from_record(record),
            Err(e) => Err(e.into()),
        };
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }
}
