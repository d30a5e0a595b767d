pub mod ports;

mod comment_threads;
mod forum_board;
mod launch_catalog;
mod search;
mod slug_allocator;
mod vote_ledger;

pub use comment_threads::CommentThreads;
pub use forum_board::ForumBoard;
pub use launch_catalog::{LaunchCatalog, DEFAULT_LEADERBOARD_TTL};
pub use search::Search;
pub use slug_allocator::{SlugAllocator, SlugFallback};
pub use vote_ledger::VoteLedger;
