//! Field-level value types and coercions shared by the extractors.

use crate::error::ExtractError;
use chrono::{DateTime, NaiveDateTime, Utc};

/// One row of a hash-table field: content hash, byte size, relative path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct HashEntry {
    /// The hex-encoded content hash.
    pub hash: String,

    /// Size of the file, in bytes.
    pub size: u64,

    /// Path of the file, relative to the directory of the Release file.
    pub path: String,
}

impl std::fmt::Display for HashEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} {} {}", self.hash, self.size, self.path)
    }
}

impl std::str::FromStr for HashEntry {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ExtractError::InvalidHashEntry(s.to_string());
        let mut parts = s.split_whitespace();
        let hash = parts.next().ok_or_else(invalid)?;
        let size = parts
            .next()
            .ok_or_else(invalid)?
            .parse()
            .map_err(|_| invalid())?;
        let path = parts.next().ok_or_else(invalid)?;
        // Exactly three tokens per row.
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(Self {
            hash: hash.to_string(),
            size,
            path: path.to_string(),
        })
    }
}

/// Parse an APT boolean field.
///
/// Case-insensitive and trimmed; `yes`, `true` and `1` are true, anything
/// else (including garbage) is false. There is no error path here.
pub(crate) fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "yes" | "true" | "1"
    )
}

/// Parse a date field of an index document.
///
/// Repositories in the wild disagree on the exact shape, so a fallback chain
/// is tried in order: the RFC 1123 / RFC 2822 family first (weekday optional,
/// 1- or 2-digit day, named or numeric zone), then asctime-style dates, which
/// carry no zone and are taken as UTC.
pub(crate) fn parse_date(raw: &str) -> Result<DateTime<Utc>, ExtractError> {
    let value = raw.trim();
    // chrono's RFC 2822 parser knows `GMT` and `UT` but not `UTC`, which is
    // the zone name nearly every Release file emits. Rewrite a trailing
    // `UTC` token to the numeric offset before handing the value over.
    let rfc2822 = match value.rsplit_once(char::is_whitespace) {
        Some((rest, "UTC")) => std::borrow::Cow::Owned(format!("{} +0000", rest.trim_end())),
        _ => std::borrow::Cow::Borrowed(value),
    };
    if let Ok(date) = DateTime::parse_from_rfc2822(&rfc2822) {
        return Ok(date.with_timezone(&Utc));
    }
    // e.g. `Mon May 19 10:00:02 2025`
    if let Ok(date) = NaiveDateTime::parse_from_str(value, "%a %b %e %H:%M:%S %Y") {
        return Ok(date.and_utc());
    }
    Err(ExtractError::UnparsableDate(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_hash_entry_parse() {
        let entry: HashEntry = "4c195df3750b6fdb056bd98d18542d25 4188 non-free/binary-amd64/Packages"
            .parse()
            .unwrap();
        assert_eq!(entry.hash, "4c195df3750b6fdb056bd98d18542d25");
        assert_eq!(entry.size, 4188);
        assert_eq!(entry.path, "non-free/binary-amd64/Packages");
    }

    #[test]
    fn test_hash_entry_display_round_trip() {
        let line = "4c195df3750b6fdb056bd98d18542d25 4188 non-free/binary-amd64/Packages";
        let entry: HashEntry = line.parse().unwrap();
        assert_eq!(entry.to_string(), line);
    }

    #[test]
    fn test_hash_entry_rejects_wrong_arity() {
        assert!(matches!(
            "4c195df3750b6fdb056bd98d18542d25 4188".parse::<HashEntry>(),
            Err(ExtractError::InvalidHashEntry(_))
        ));
        assert!(matches!(
            "aa 1 path extra".parse::<HashEntry>(),
            Err(ExtractError::InvalidHashEntry(_))
        ));
        assert!(matches!(
            "".parse::<HashEntry>(),
            Err(ExtractError::InvalidHashEntry(_))
        ));
    }

    #[test]
    fn test_hash_entry_rejects_bad_size() {
        for line in ["aa notanumber path", "aa -1 path", "aa 1.5 path"] {
            assert!(matches!(
                line.parse::<HashEntry>(),
                Err(ExtractError::InvalidHashEntry(_))
            ));
        }
    }

    #[test]
    fn test_parse_flag() {
        for value in ["yes", "Yes", "YES", "true", "True", "1", " yes "] {
            assert!(parse_flag(value), "{:?} should be true", value);
        }
        for value in ["no", "false", "0", "", "maybe", "2"] {
            assert!(!parse_flag(value), "{:?} should be false", value);
        }
    }

    #[test]
    fn test_date_fallback_chain() {
        let expected = Utc.with_ymd_and_hms(2025, 5, 19, 10, 0, 2).unwrap();
        // Every supported shape lands on the same instant.
        for raw in [
            "Mon, 19 May 2025 10:00:02 UTC",
            "Mon, 19 May 2025 10:00:02 GMT",
            "Mon, 19 May 2025 10:00:02 +0000",
            "19 May 2025 10:00:02 UTC",
            "Mon May 19 10:00:02 2025",
        ] {
            assert_eq!(parse_date(raw).unwrap(), expected, "failed on {:?}", raw);
        }
    }

    #[test]
    fn test_date_single_digit_day() {
        let expected = Utc.with_ymd_and_hms(2025, 5, 2, 10, 0, 2).unwrap();
        for raw in [
            "Fri, 2 May 2025 10:00:02 UTC",
            "2 May 2025 10:00:02 UTC",
            "Fri May  2 10:00:02 2025",
            "Fri May 2 10:00:02 2025",
        ] {
            assert_eq!(parse_date(raw).unwrap(), expected, "failed on {:?}", raw);
        }
    }

    #[test]
    fn test_date_offset_zone() {
        let parsed = parse_date("Mon, 19 May 2025 12:00:02 +0200").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 5, 19, 10, 0, 2).unwrap());
    }

    #[test]
    fn test_utc_rewrite_is_token_bounded() {
        // Only a whole trailing `UTC` token is rewritten; a zone merely
        // ending in those letters is not silently accepted.
        assert!(matches!(
            parse_date("Mon, 19 May 2025 10:00:02 XUTC"),
            Err(ExtractError::UnparsableDate(_))
        ));
    }

    #[test]
    fn test_unparsable_date() {
        for raw in ["2025-05-19", "19.05.2025 10:00", "yesterday", ""] {
            assert!(matches!(
                parse_date(raw),
                Err(ExtractError::UnparsableDate(_))
            ));
        }
    }
}
