use super::{ForumPostSummary, LaunchSummary, Profile};
use serde::{Deserialize, Serialize};

pub const MAX_SEARCH_LEN: usize = 100;
pub const SEARCH_RESULTS_PER_KIND: u64 = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResults {
    pub query: String,
    pub launches: Vec<LaunchSummary>,
    pub students: Vec<Profile>,
    pub posts: Vec<ForumPostSummary>,
}

impl SearchResults {
    pub fn total(&self) -> usize {
        self.launches.len() + self.students.len() + self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Case-insensitive substring match of `needle` against any of `fields`.
pub fn matches_any(needle: &str, fields: &[&str]) -> bool {
    let needle = needle.to_lowercase();
    fields.iter().any(|f| f.to_lowercase().contains(&needle))
}

/// `LIKE` pattern matching `term` anywhere, with the wildcards in `term` escaped
/// by `\`. Lowercased, so compare it against `LOWER(column)`.
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_any_ignores_case() {
        assert!(matches_any("dorm", &["Dawg Dash", "Snacks to your DORM"]));
        assert!(!matches_any("gym", &["Dawg Dash", ""]));
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("Café"), "%café%");
        assert_eq!(like_pattern("100%_off"), "%100\\%\\_off%");
    }
}
