//! Reference resolution for URL-shaped entity identifiers.
//!
//! The catalog links entities through reference strings such as
//! `https://ghibliapi.vercel.app/people/598f7048`. The last path segment is the
//! referenced entity id. A reference ending in `/` points at the whole
//! collection instead of one item:
//!
//! ```text
//! https://ghibliapi.vercel.app/people/id1   -> "id1"
//! https://ghibliapi.vercel.app/people/      -> ""  (all people)
//! ```
//!
//! A reference list consisting of exactly one collection reference means
//! "every entity of this type", which is distinct from an explicit list.
//!
//! # Examples
//!
//! ```
//! use ghibli_core::models::{extract_reference_id, is_collection_reference};
//!
//! assert_eq!(extract_reference_id("https://x/people/id"), "id");
//! assert!(is_collection_reference(&["https://x/people/".to_string()]));
//! ```

/// Returns the entity id addressed by a reference string.
///
/// Returns an empty string when the reference ends in a trailing `/`.
#[must_use]
pub fn extract_reference_id(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or_default()
}

/// Returns `true` if the reference list points at every entity of its type.
///
/// Holds only for a list of exactly one reference whose id is empty.
#[must_use]
pub fn is_collection_reference<S: AsRef<str>>(references: &[S]) -> bool {
    match references {
        [only] => extract_reference_id(only.as_ref()).is_empty(),
        _ => false,
    }
}
