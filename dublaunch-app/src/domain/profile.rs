use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: uuid::Uuid,
    pub provider_subject: String,
    pub email: String,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Profile {
    pub fn new(
        provider_subject: String,
        email: String,
        display_name: String,
        avatar_url: Option<String>,
    ) -> Self {
        let username = email
            .split('@')
            .next()
            .unwrap_or_default()
            .to_lowercase();
        Self {
            id: uuid::Uuid::new_v4(),
            provider_subject,
            email,
            username,
            display_name,
            avatar_url,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn initial(&self) -> char {
        self.display_name
            .chars()
            .next()
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or('?')
    }
}

/// Who wrote a launch or comment. Decided once when the row is fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Author {
    Known(Profile),
    Unknown,
}

impl Author {
    pub fn from_profile(profile: Option<Profile>) -> Self {
        profile.map_or(Self::Unknown, Self::Known)
    }

    pub fn display_name(&self) -> &str {
        match self {
            Self::Known(p) => &p.display_name,
            Self::Unknown => "Unknown student",
        }
    }

    pub fn handle(&self) -> Option<&str> {
        match self {
            Self::Known(p) => Some(&p.username),
            Self::Unknown => None,
        }
    }

    pub fn avatar_url(&self) -> Option<&str> {
        match self {
            Self::Known(p) => p.avatar_url.as_deref(),
            Self::Unknown => None,
        }
    }
}

/// A student's public page: who they are and what they launched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentPage {
    pub profile: Profile,
    pub launches: Vec<super::Launch>,
    pub total_votes: i64,
}

impl StudentPage {
    pub fn new(profile: Profile, launches: Vec<super::Launch>) -> Self {
        let total_votes = launches.iter().map(|l| i64::from(l.votes_count)).sum();
        Self {
            profile,
            launches,
            total_votes,
        }
    }
}
