mod comment;
mod forum;
mod launch;
mod profile;
mod search;
pub mod slug;
mod vote;

pub use comment::{build_thread, Comment, CommentNode, Threaded, MAX_COMMENT_LEN};
pub use forum::{
    forum_category, ForumCategory, ForumComment, ForumPost, ForumPostDetails, ForumPostInput,
    ForumPostSummary, ForumQuery, ForumSort, NewForumPost, FORUM_CATEGORIES, MAX_FORUM_BODY_LEN,
    MAX_FORUM_TITLE_LEN,
};
pub use launch::{
    Launch, LaunchDetails, LaunchInput, LaunchQuery, LaunchSort, LaunchStatus, LaunchSummary,
    NewLaunch, PricingType, CATEGORIES, MAX_TAGS,
};
pub use profile::{Author, Profile, StudentPage};
pub use search::{
    like_pattern, matches_any, SearchResults, MAX_SEARCH_LEN, SEARCH_RESULTS_PER_KIND,
};
pub use vote::{Vote, VoteResult, VoteState, VoteTarget};
