use super::{Author, Threaded};
use serde::{Deserialize, Serialize};

pub const MAX_FORUM_TITLE_LEN: usize = 100;
pub const MAX_FORUM_BODY_LEN: usize = 10_000;

pub struct ForumCategory {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub const FORUM_CATEGORIES: &[ForumCategory] = &[
    ForumCategory {
        id: "general",
        name: "General",
        description: "Anything about building things on campus",
    },
    ForumCategory {
        id: "feedback",
        name: "Feedback",
        description: "Ask classmates to tear your launch apart",
    },
    ForumCategory {
        id: "show-and-tell",
        name: "Show & Tell",
        description: "Works in progress, demos and screenshots",
    },
    ForumCategory {
        id: "help",
        name: "Help",
        description: "Stuck on code, design or a pitch deck",
    },
    ForumCategory {
        id: "teams",
        name: "Find a Team",
        description: "Co-founders, collaborators and hackathon squads",
    },
    ForumCategory {
        id: "events",
        name: "Events",
        description: "Hackathons, demo days and meetups",
    },
];

pub fn forum_category(id: &str) -> Option<&'static ForumCategory> {
    FORUM_CATEGORIES.iter().find(|c| c.id == id)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForumPost {
    pub id: uuid::Uuid,
    pub category: String,
    pub author_id: uuid::Uuid,
    pub title: String,
    pub content: String,
    pub is_pinned: bool,
    pub is_locked: bool,
    pub likes_count: i32,
    pub comments_count: i32,
    pub views_count: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl ForumPost {
    pub fn category_name(&self) -> &'static str {
        forum_category(&self.category).map_or("General", |c| c.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForumPostInput {
    pub category: String,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewForumPost {
    pub id: uuid::Uuid,
    pub category: String,
    pub author_id: uuid::Uuid,
    pub title: String,
    pub content: String,
    pub is_pinned: bool,
    pub is_locked: bool,
}

impl NewForumPost {
    pub fn new(author_id: uuid::Uuid, input: ForumPostInput) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            category: input.category,
            author_id,
            title: input.title,
            content: input.content,
            is_pinned: false,
            is_locked: false,
        }
    }

    pub fn pinned(mut self) -> Self {
        self.is_pinned = true;
        self
    }

    pub fn locked(mut self) -> Self {
        self.is_locked = true;
        self
    }

    pub fn into_post(self, now: chrono::DateTime<chrono::Utc>) -> ForumPost {
        ForumPost {
            id: self.id,
            category: self.category,
            author_id: self.author_id,
            title: self.title,
            content: self.content,
            is_pinned: self.is_pinned,
            is_locked: self.is_locked,
            likes_count: 0,
            comments_count: 0,
            views_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForumComment {
    pub id: uuid::Uuid,
    pub post_id: uuid::Uuid,
    pub author_id: uuid::Uuid,
    pub parent_id: Option<uuid::Uuid>,
    pub content: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl ForumComment {
    pub fn new(
        post_id: uuid::Uuid,
        author_id: uuid::Uuid,
        parent_id: Option<uuid::Uuid>,
        content: String,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            post_id,
            author_id,
            parent_id,
            content,
            created_at: chrono::Utc::now(),
        }
    }
}

impl Threaded for ForumComment {
    fn id(&self) -> uuid::Uuid {
        self.id
    }

    fn parent_id(&self) -> Option<uuid::Uuid> {
        self.parent_id
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForumSort {
    #[default]
    Newest,
    MostLiked,
    MostCommented,
}

/// Pinned posts always come first; `sort` orders within each group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForumQuery {
    pub category: Option<String>,
    pub author: Option<uuid::Uuid>,
    pub text: Option<String>,
    pub sort: ForumSort,
    pub limit: u64,
}

impl ForumQuery {
    pub const DEFAULT_LIMIT: u64 = 30;

    pub fn limit_or_default(&self) -> u64 {
        if self.limit == 0 {
            Self::DEFAULT_LIMIT
        } else {
            self.limit.min(100)
        }
    }

    pub fn text_term(&self) -> Option<&str> {
        self.text.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForumPostSummary {
    pub post: ForumPost,
    pub author: Author,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForumPostDetails {
    pub post: ForumPost,
    pub author: Author,
    pub viewer_has_liked: bool,
}
