//! Records owned by the local store, and the list-column codec.
//!
//! List- and set-valued columns are stored comma-joined. The empty string
//! decodes to an empty collection.

use std::collections::BTreeSet;

/// A favorited film as persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteFilmRecord {
    /// Film id (primary key).
    pub id: String,
    /// Title.
    pub title: String,
    /// Synopsis.
    pub description: String,
    /// Director.
    pub director: String,
    /// Producer.
    pub producer: String,
    /// Release year as delivered by the catalog.
    pub release_date: String,
    /// Running time in minutes as delivered by the catalog.
    pub running_time: String,
    /// Rotten Tomatoes score.
    pub rt_score: String,
    /// People reference strings, in catalog order.
    pub people_references: Vec<String>,
}

/// A person appearing in at least one favorited film.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoritePersonRecord {
    /// Person id (primary key).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Ids of the favorited films referencing this person.
    pub film_ids: BTreeSet<String>,
}

/// An active film list filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFilterRecord {
    /// Filter id (primary key).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Filter kind tag, see [`crate::FilterKind::as_str`].
    pub kind: String,
}

/// Joins values into a list column.
pub fn encode_list<I, S>(values: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut encoded = String::new();
    for (index, value) in values.into_iter().enumerate() {
        if index > 0 {
            encoded.push(',');
        }
        encoded.push_str(value.as_ref());
    }
    encoded
}

/// Splits a list column.
#[must_use]
pub fn decode_list(column: &str) -> Vec<String> {
    if column.is_empty() {
        return Vec::new();
    }
    column.split(',').map(str::to_string).collect()
}

/// Splits a set column, dropping duplicates.
#[must_use]
pub fn decode_set(column: &str) -> BTreeSet<String> {
    decode_list(column).into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(&[], ""; "empty")]
    #[test_case(&["a"], "a"; "single")]
    #[test_case(
        &["https://x/people/1", "https://x/people/2"],
        "https://x/people/1,https://x/people/2";
        "urls"
    )]
    fn test_encode_list(values: &[&str], expected: &str) {
        assert_eq!(encode_list(values), expected);
    }

    #[test]
    fn test_empty_column_decodes_to_empty_collections() {
        assert!(decode_list("").is_empty());
        assert!(decode_set("").is_empty());
    }

    #[test]
    fn test_decode_set_deduplicates() {
        let set = decode_set("f2,f1,f2");
        assert_eq!(set.into_iter().collect::<Vec<_>>(), vec!["f1", "f2"]);
    }
}
