use crate::domain::{
    forum_category, ForumPostInput, LaunchInput, CATEGORIES, MAX_COMMENT_LEN, MAX_FORUM_BODY_LEN,
    MAX_FORUM_TITLE_LEN, MAX_SEARCH_LEN, MAX_TAGS,
};
use dublaunch_errors::AppError;

const MAX_URL_LENGTH: usize = 2048;
const MAX_NAME_LENGTH: usize = 100;
const MAX_TAGLINE_LENGTH: usize = 140;
const MAX_DESCRIPTION_LENGTH: usize = 5000;
const MAX_TAG_LENGTH: usize = 32;

const ALLOWED_SCHEMES: &[&str] = &["http", "https"];

pub struct InputSanitizer;

impl InputSanitizer {
    pub fn validate_url(url: &str) -> Result<String, AppError> {
        let url = url.trim();

        if url.is_empty() {
            return Err(AppError::invalid("Website URL is required"));
        }

        if url.len() > MAX_URL_LENGTH {
            return Err(AppError::invalid("Website URL is too long"));
        }

        let parsed =
            url::Url::parse(url).map_err(|_| AppError::invalid("Website URL is not valid"))?;

        let scheme = parsed.scheme().to_lowercase();
        if !ALLOWED_SCHEMES.contains(&scheme.as_str()) {
            return Err(AppError::invalid("Only http and https links are allowed"));
        }

        let Some(host) = parsed.host_str() else {
            return Err(AppError::invalid("Website URL needs a host"));
        };

        if host == "localhost" || host.starts_with("127.") || host.starts_with("192.168.") {
            return Err(AppError::invalid("Local addresses are not allowed"));
        }

        Ok(parsed.to_string())
    }

    /// Trims every field and rejects what the submit form would have rejected.
    pub fn validate_launch(input: LaunchInput) -> Result<LaunchInput, AppError> {
        let name = Self::bounded("Name", &input.name, MAX_NAME_LENGTH, true)?;
        let tagline = Self::bounded("Tagline", &input.tagline, MAX_TAGLINE_LENGTH, true)?;
        let description =
            Self::bounded("Description", &input.description, MAX_DESCRIPTION_LENGTH, false)?;
        let website_url = Self::validate_url(&input.website_url)?;

        let primary_category = input.primary_category.trim().to_string();
        if !CATEGORIES.contains(&primary_category.as_str()) {
            return Err(AppError::invalid("Pick a category from the list"));
        }

        let mut tags: Vec<String> = Vec::new();
        for tag in &input.tags {
            let tag = Self::clean_text(tag);
            if tag.is_empty() || tags.contains(&tag) {
                continue;
            }
            if tag.chars().count() > MAX_TAG_LENGTH {
                return Err(AppError::invalid("Tags must be 32 characters or fewer"));
            }
            tags.push(tag);
        }
        if tags.len() > MAX_TAGS {
            return Err(AppError::invalid("Use at most 3 tags"));
        }

        let first_comment = input
            .first_comment
            .as_deref()
            .map(Self::clean_text)
            .filter(|c| !c.is_empty());
        if first_comment
            .as_ref()
            .is_some_and(|c| c.chars().count() > MAX_COMMENT_LEN)
        {
            return Err(AppError::invalid("First comment is too long"));
        }

        Ok(LaunchInput {
            name,
            tagline,
            description,
            website_url,
            primary_category,
            tags,
            pricing_type: input.pricing_type,
            first_comment,
        })
    }

    pub fn validate_comment(content: &str) -> Result<String, AppError> {
        Self::bounded("Comment", content, MAX_COMMENT_LEN, true)
    }

    pub fn validate_forum_post(input: ForumPostInput) -> Result<ForumPostInput, AppError> {
        let category = input.category.trim().to_string();
        if forum_category(&category).is_none() {
            return Err(AppError::invalid("Pick a forum category from the list"));
        }
        let title = Self::bounded("Title", &input.title, MAX_FORUM_TITLE_LEN, true)?;
        let content = Self::bounded("Post", &input.content, MAX_FORUM_BODY_LEN, true)?;
        Ok(ForumPostInput {
            category,
            title,
            content,
        })
    }

    /// A search term, or `None` when there is nothing to search for.
    pub fn search_term(raw: &str) -> Result<Option<String>, AppError> {
        let term = Self::bounded("Search", raw, MAX_SEARCH_LEN, false)?;
        Ok(Some(term).filter(|t| !t.is_empty()))
    }

    /// Drops control characters other than newlines and tabs, then trims.
    pub fn clean_text(text: &str) -> String {
        text.chars()
            .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
            .collect::<String>()
            .trim()
            .to_string()
    }

    fn bounded(field: &str, value: &str, max: usize, required: bool) -> Result<String, AppError> {
        let value = Self::clean_text(value);
        if required && value.is_empty() {
            return Err(AppError::invalid(format!("{} is required", field)));
        }
        if value.chars().count() > max {
            return Err(AppError::invalid(format!(
                "{} must be {} characters or fewer",
                field, max
            )));
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> LaunchInput {
        LaunchInput {
            name: "  Dawg Dash  ".into(),
            tagline: "Late-night snacks to your dorm".into(),
            website_url: "https://dawgdash.app".into(),
            primary_category: "Mobile App".into(),
            tags: vec!["food".into(), "food".into(), " delivery ".into()],
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_url() {
        assert!(InputSanitizer::validate_url("https://uw.edu").is_ok());
        assert!(InputSanitizer::validate_url("http://example.com/path").is_ok());
    }

    #[test]
    fn test_invalid_url() {
        assert!(InputSanitizer::validate_url("").is_err());
        assert!(InputSanitizer::validate_url("not-a-url").is_err());
        assert!(InputSanitizer::validate_url("ftp://example.com").is_err());
        assert!(InputSanitizer::validate_url("http://localhost").is_err());
    }

    #[test]
    fn test_launch_fields_are_trimmed_and_tags_deduplicated() {
        let cleaned = InputSanitizer::validate_launch(input()).unwrap();
        assert_eq!(cleaned.name, "Dawg Dash");
        assert_eq!(cleaned.tags, vec!["food", "delivery"]);
        assert!(cleaned.first_comment.is_none());
    }

    #[test]
    fn test_launch_requires_name_and_known_category() {
        let missing_name = LaunchInput {
            name: "   ".into(),
            ..input()
        };
        assert_eq!(
            InputSanitizer::validate_launch(missing_name),
            Err(AppError::invalid("Name is required"))
        );

        let odd_category = LaunchInput {
            primary_category: "Spaceships".into(),
            ..input()
        };
        assert!(InputSanitizer::validate_launch(odd_category).is_err());
    }

    #[test]
    fn test_too_many_tags() {
        let tagged = LaunchInput {
            tags: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            ..input()
        };
        assert_eq!(
            InputSanitizer::validate_launch(tagged),
            Err(AppError::invalid("Use at most 3 tags"))
        );
    }

    #[test]
    fn test_comment_bounds() {
        assert!(InputSanitizer::validate_comment("  \n ").is_err());
        assert_eq!(
            InputSanitizer::validate_comment(" Nice launch! ").unwrap(),
            "Nice launch!"
        );
        assert!(InputSanitizer::validate_comment(&"x".repeat(MAX_COMMENT_LEN + 1)).is_err());
    }

    #[test]
    fn test_forum_post_rules() {
        let post = ForumPostInput {
            category: "help".into(),
            title: "  Rust borrow checker help  ".into(),
            content: "It hates me".into(),
        };
        let cleaned = InputSanitizer::validate_forum_post(post.clone()).unwrap();
        assert_eq!(cleaned.title, "Rust borrow checker help");

        let long_title = ForumPostInput {
            title: "t".repeat(MAX_FORUM_TITLE_LEN + 1),
            ..post.clone()
        };
        assert!(InputSanitizer::validate_forum_post(long_title).is_err());

        let empty = ForumPostInput {
            content: " ".into(),
            ..post.clone()
        };
        assert_eq!(
            InputSanitizer::validate_forum_post(empty),
            Err(AppError::invalid("Post is required"))
        );

        let unknown = ForumPostInput {
            category: "memes".into(),
            ..post
        };
        assert!(InputSanitizer::validate_forum_post(unknown).is_err());
    }

    #[test]
    fn test_search_term() {
        assert_eq!(InputSanitizer::search_term("  ").unwrap(), None);
        assert_eq!(
            InputSanitizer::search_term(" dorm ").unwrap(),
            Some("dorm".to_string())
        );
        assert!(InputSanitizer::search_term(&"q".repeat(MAX_SEARCH_LEN + 1)).is_err());
    }
}
