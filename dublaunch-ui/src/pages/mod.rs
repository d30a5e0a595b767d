mod forum_post;
mod forums;
mod home;
mod launch;
mod profile;
mod search;
mod submit;

pub use forum_post::{forum_post, ForumPostFn, ForumPostPage};
pub use forums::{create_forum_post, forum_posts, CreateForumPostFn, ForumPostsFn, ForumsPage};
pub use home::{discover, leaderboard, DiscoverFn, HomePage, LeaderboardFn};
pub use launch::{delete_launch, launch_detail, DeleteLaunchFn, LaunchDetailFn, LaunchPage};
pub use profile::{student_page, ProfilePage, StudentPageFn};
pub use search::{search, SearchFn, SearchPage};
pub use submit::{create_launch, split_tags, CreateLaunchFn, SubmitPage};
