#![deny(missing_docs)]
//! Typed records for APT repository indices.
//!
//! Builds on [`deb822_stream`]: that crate turns a byte stream into generic
//! records, this one turns those records into validated [`Release`] and
//! [`Package`] objects — mandatory-field checks, numeric bounds, the
//! multi-format date fallback chain, and hash-table decoding.
//!
//! ```rust
//! use apt_index::Release;
//!
//! let release: Release = "Suite: stable\n\
//!     Architectures: amd64 arm64\n\
//!     Date: Mon, 19 May 2025 10:00:02 UTC\n"
//!     .parse()
//!     .unwrap();
//! assert_eq!(release.architectures, vec!["amd64", "arm64"]);
//! ```
//!
//! Extraction never recovers partially: the first malformed field aborts the
//! document, because a truncated package list presented as complete is worse
//! than no list at all.

pub mod error;
mod fields;
mod package;
mod release;

pub use error::ExtractError;
pub use fields::HashEntry;
pub use package::{Package, RelationKind};
pub use release::Release;
