mod auth_section;
mod author_link;
mod comment_thread;
mod error_display;
mod forum_thread;
mod launch_card;
mod loading_spinner;
mod vote_button;

pub use auth_section::{current_user, AuthSection, CurrentUserFn};
pub use comment_thread::{comment_thread, post_comment, CommentThread, CommentThreadFn, PostCommentFn};
pub use author_link::author_link;
pub use error_display::{error_message, ErrorDisplay};
pub use forum_thread::{
    forum_thread, post_forum_comment, ForumThread, ForumThreadFn, PostForumCommentFn,
};
pub use launch_card::LaunchCard;
pub use loading_spinner::LoadingSpinner;
pub use vote_button::{toggle_like, toggle_vote, ToggleLikeFn, ToggleVoteFn, VoteButton};
