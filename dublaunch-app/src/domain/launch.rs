use super::Author;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchStatus {
    Published,
    Unpublished,
}

impl LaunchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Published => "published",
            Self::Unpublished => "unpublished",
        }
    }
}

impl FromStr for LaunchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "published" => Ok(Self::Published),
            "unpublished" => Ok(Self::Unpublished),
            other => Err(format!("unknown launch status `{}`", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingType {
    #[default]
    Free,
    Paid,
    Freemium,
    FreeTrial,
}

impl PricingType {
    pub const ALL: [PricingType; 4] = [Self::Free, Self::Paid, Self::Freemium, Self::FreeTrial];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Paid => "paid",
            Self::Freemium => "freemium",
            Self::FreeTrial => "free_trial",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Free => "Free",
            Self::Paid => "Paid",
            Self::Freemium => "Freemium",
            Self::FreeTrial => "Free Trial",
        }
    }
}

impl fmt::Display for PricingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PricingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("unknown pricing type `{}`", s))
    }
}

pub const CATEGORIES: &[&str] = &[
    "Web App",
    "Mobile App",
    "Desktop App",
    "API",
    "Library",
    "Chrome Extension",
    "Design Tool",
    "Developer Tool",
    "AI/ML",
    "Blockchain",
    "Gaming",
    "E-commerce",
    "Education",
    "Health",
    "Finance",
    "Productivity",
    "Social",
    "Entertainment",
    "Other",
];

pub const MAX_TAGS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Launch {
    pub id: uuid::Uuid,
    pub slug: String,
    pub name: String,
    pub tagline: String,
    pub description: String,
    pub website_url: String,
    pub primary_category: String,
    pub tags: Vec<String>,
    pub pricing_type: PricingType,
    pub creator_id: uuid::Uuid,
    pub status: LaunchStatus,
    pub votes_count: i32,
    pub comments_count: i32,
    pub views_count: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// What a student fills in on the submit form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchInput {
    pub name: String,
    pub tagline: String,
    pub description: String,
    pub website_url: String,
    pub primary_category: String,
    pub tags: Vec<String>,
    pub pricing_type: PricingType,
    pub first_comment: Option<String>,
}

/// A validated launch waiting for its slug to be claimed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLaunch {
    pub id: uuid::Uuid,
    pub slug: String,
    pub name: String,
    pub tagline: String,
    pub description: String,
    pub website_url: String,
    pub primary_category: String,
    pub tags: Vec<String>,
    pub pricing_type: PricingType,
    pub creator_id: uuid::Uuid,
    pub status: LaunchStatus,
}

impl NewLaunch {
    pub fn new(name: String, creator_id: uuid::Uuid) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            slug: String::new(),
            name,
            tagline: String::new(),
            description: String::new(),
            website_url: String::new(),
            primary_category: String::from("Other"),
            tags: Vec::new(),
            pricing_type: PricingType::default(),
            creator_id,
            status: LaunchStatus::Published,
        }
    }

    pub fn with_slug(mut self, slug: String) -> Self {
        self.slug = slug;
        self
    }

    pub fn with_status(mut self, status: LaunchStatus) -> Self {
        self.status = status;
        self
    }

    pub fn into_launch(self, created_at: chrono::DateTime<chrono::Utc>) -> Launch {
        Launch {
            id: self.id,
            slug: self.slug,
            name: self.name,
            tagline: self.tagline,
            description: self.description,
            website_url: self.website_url,
            primary_category: self.primary_category,
            tags: self.tags,
            pricing_type: self.pricing_type,
            creator_id: self.creator_id,
            status: self.status,
            votes_count: 0,
            comments_count: 0,
            views_count: 0,
            created_at,
        }
    }
}

/// Launch with everything the detail page needs, resolved at fetch time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchDetails {
    pub launch: Launch,
    pub author: Author,
    pub viewer_has_voted: bool,
    pub viewer_is_creator: bool,
}

/// Leaderboard and discover rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchSummary {
    pub launch: Launch,
    pub author: Author,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchSort {
    #[default]
    Newest,
    Oldest,
    MostVoted,
    MostViewed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchQuery {
    pub category: Option<String>,
    pub creator: Option<uuid::Uuid>,
    /// Case-insensitive substring of name, tagline or description.
    pub text: Option<String>,
    pub sort: LaunchSort,
    pub limit: u64,
}

impl LaunchQuery {
    pub const DEFAULT_LIMIT: u64 = 24;

    pub fn limit_or_default(&self) -> u64 {
        if self.limit == 0 {
            Self::DEFAULT_LIMIT
        } else {
            self.limit.min(100)
        }
    }

    /// The search term, or `None` when it is blank.
    pub fn text_term(&self) -> Option<&str> {
        self.text.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pricing_type_parses_its_own_names() {
        for p in PricingType::ALL {
            assert_eq!(p.as_str().parse::<PricingType>(), Ok(p));
        }
        assert!("lifetime".parse::<PricingType>().is_err());
    }

    #[test]
    fn test_query_limit_is_clamped() {
        let q = LaunchQuery::default();
        assert_eq!(q.limit_or_default(), LaunchQuery::DEFAULT_LIMIT);

        let q = LaunchQuery {
            limit: 5000,
            ..Default::default()
        };
        assert_eq!(q.limit_or_default(), 100);
    }

    #[test]
    fn test_blank_text_is_no_filter() {
        let q = LaunchQuery {
            text: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(q.text_term(), None);

        let q = LaunchQuery {
            text: Some(" dorm ".into()),
            ..Default::default()
        };
        assert_eq!(q.text_term(), Some("dorm"));
    }
}
