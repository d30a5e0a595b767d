pub mod comment;
pub mod forum_comment;
pub mod forum_post;
pub mod forum_post_like;
pub mod launch;
pub mod profile;
pub mod vote;

pub use comment::Entity as Comment;
pub use forum_comment::Entity as ForumComment;
pub use forum_post::Entity as ForumPost;
pub use forum_post_like::Entity as ForumPostLike;
pub use launch::Entity as Launch;
pub use profile::Entity as Profile;
pub use vote::Entity as Vote;
