//! Field name casing helpers.

use convert_case::{Case, Casing};

use crate::config::NameCasing;

/// Casts a raw column name to the UI casing.
pub fn cast_name(raw: &str, casing: NameCasing) -> String {
    let trimmed = raw.trim();
    match casing {
        NameCasing::Camel => trimmed.to_case(Case::Camel),
        NameCasing::Snake => trimmed.to_case(Case::Snake),
        NameCasing::Preserve => trimmed.to_string(),
    }
}

/// Casing-insensitive comparison key: lowercase with separators removed.
pub fn normalize_key(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' ' | '.'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// True when both names refer to the same field regardless of casing.
pub fn same_key(left: &str, right: &str) -> bool {
    normalize_key(left) == normalize_key(right)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn casts_snake_to_camel() {
        assert_eq!(cast_name("created_at", NameCasing::Camel), "createdAt");
        assert_eq!(cast_name("createdAt", NameCasing::Snake), "created_at");
        assert_eq!(cast_name("Created_At", NameCasing::Preserve), "Created_At");
    }

    #[test]
    fn keys_match_across_casings() {
        assert!(same_key("ref_include", "refInclude"));
        assert!(same_key("updatedAt", "updated_at"));
        assert!(!same_key("ref_include", "ref_exclude"));
    }
}
