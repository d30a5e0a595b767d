use crate::application::ports::{CommentStore, ForumStore, LaunchStore, ProfileStore, VoteStore};
use crate::domain::{
    matches_any, Comment, ForumComment, ForumPost, ForumQuery, ForumSort, Launch, LaunchQuery,
    LaunchSort, LaunchStatus, NewForumPost, NewLaunch, Profile, Vote, VoteResult, VoteTarget,
};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use dublaunch_errors::AppError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Process-local store with the same constraint semantics as the Postgres schema.
///
/// Slug and vote uniqueness go through `DashMap::entry`, and every write that also
/// touches a launch or post counter holds that parent's entry for the whole
/// operation.
#[derive(Clone, Default)]
pub struct MemoryStore {
    launches: Arc<DashMap<Uuid, Launch>>,
    slugs: Arc<DashMap<String, Uuid>>,
    votes: Arc<DashMap<(VoteTarget, Uuid), Vote>>,
    comments: Arc<DashMap<Uuid, Comment>>,
    profiles: Arc<DashMap<Uuid, Profile>>,
    forum_posts: Arc<DashMap<Uuid, ForumPost>>,
    forum_comments: Arc<DashMap<Uuid, ForumComment>>,
    writes: Arc<AtomicU64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of write operations applied so far.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    fn wrote(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }

    fn count_votes(&self, target: VoteTarget) -> usize {
        self.votes.iter().filter(|v| v.key().0 == target).count()
    }

    fn count_forum_comments(&self, post_id: Uuid) -> usize {
        self.forum_comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .count()
    }

    /// Removes the voter's row if present, inserts it otherwise. Callers hold the
    /// target's parent entry.
    fn flip_vote(&self, voter_id: Uuid, target: VoteTarget) -> Result<bool, AppError> {
        let key = (target, voter_id);
        if self.votes.remove(&key).is_some() {
            return Ok(false);
        }
        match self.votes.entry(key) {
            Entry::Occupied(_) => Err(AppError::ConflictRetryable(
                "vote already recorded".to_string(),
            )),
            Entry::Vacant(slot) => {
                let mut vote = Vote::new(voter_id, target);
                vote.created_at = Some(chrono::Utc::now());
                slot.insert(vote);
                Ok(true)
            }
        }
    }

    fn target_exists(&self, target: VoteTarget) -> bool {
        match target {
            VoteTarget::Launch(id) => self.launches.contains_key(&id),
            VoteTarget::ForumPost(id) => self.forum_posts.contains_key(&id),
        }
    }

    fn count_comments(&self, launch_id: Uuid) -> usize {
        self.comments
            .iter()
            .filter(|c| c.launch_id == launch_id)
            .count()
    }
}

#[async_trait]
impl LaunchStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Launch>, AppError> {
        Ok(self.launches.get(&id).map(|l| l.clone()))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Launch>, AppError> {
        let id = match self.slugs.get(slug) {
            Some(id) => *id,
            None => return Ok(None),
        };
        Ok(self.launches.get(&id).map(|l| l.clone()))
    }

    async fn slug_exists(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool, AppError> {
        Ok(self
            .slugs
            .get(slug)
            .is_some_and(|owner| Some(*owner) != exclude))
    }

    async fn insert(&self, launch: NewLaunch) -> Result<Launch, AppError> {
        match self.slugs.entry(launch.slug.clone()) {
            Entry::Occupied(_) => Err(AppError::ConflictRetryable(format!(
                "slug `{}` is taken",
                launch.slug
            ))),
            Entry::Vacant(slot) => {
                let launch = launch.into_launch(chrono::Utc::now());
                self.launches.insert(launch.id, launch.clone());
                slot.insert(launch.id);
                self.wrote();
                Ok(launch)
            }
        }
    }

    async fn list(&self, query: &LaunchQuery) -> Result<Vec<Launch>, AppError> {
        let mut launches: Vec<Launch> = self
            .launches
            .iter()
            .filter(|l| l.status == LaunchStatus::Published)
            .filter(|l| {
                query
                    .category
                    .as_deref()
                    .map_or(true, |c| l.primary_category == c)
            })
            .filter(|l| query.creator.map_or(true, |c| l.creator_id == c))
            .filter(|l| {
                query.text_term().map_or(true, |t| {
                    matches_any(t, &[&l.name, &l.tagline, &l.description])
                })
            })
            .map(|l| l.clone())
            .collect();

        match query.sort {
            LaunchSort::Newest => launches.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            LaunchSort::Oldest => launches.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            LaunchSort::MostVoted => launches.sort_by(|a, b| {
                b.votes_count
                    .cmp(&a.votes_count)
                    .then(b.created_at.cmp(&a.created_at))
            }),
            LaunchSort::MostViewed => launches.sort_by(|a, b| {
                b.views_count
                    .cmp(&a.views_count)
                    .then(b.created_at.cmp(&a.created_at))
            }),
        }

        launches.truncate(query.limit_or_default() as usize);
        Ok(launches)
    }

    async fn record_view(&self, id: Uuid) -> Result<i32, AppError> {
        let mut launch = self
            .launches
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("launch"))?;
        launch.views_count += 1;
        self.wrote();
        Ok(launch.views_count)
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let (_, launch) = self
            .launches
            .remove(&id)
            .ok_or_else(|| AppError::not_found("launch"))?;
        self.slugs.remove(&launch.slug);
        self.votes
            .retain(|(target, _), _| *target != VoteTarget::Launch(id));
        self.comments.retain(|_, c| c.launch_id != id);
        self.wrote();
        Ok(())
    }
}

#[async_trait]
impl VoteStore for MemoryStore {
    async fn has_voted(&self, voter_id: Uuid, target: VoteTarget) -> Result<bool, AppError> {
        Ok(self.votes.contains_key(&(target, voter_id)))
    }

    async fn count(&self, target: VoteTarget) -> Result<i64, AppError> {
        Ok(self.count_votes(target) as i64)
    }

    async fn insert(&self, vote: Vote) -> Result<(), AppError> {
        if !self.target_exists(vote.target) {
            return Err(AppError::not_found(vote.target.noun()));
        }
        match self.votes.entry((vote.target, vote.voter_id)) {
            Entry::Occupied(_) => Err(AppError::ConflictRetryable(
                "vote already recorded".to_string(),
            )),
            Entry::Vacant(slot) => {
                slot.insert(vote);
                self.wrote();
                Ok(())
            }
        }
    }

    async fn toggle(&self, voter_id: Uuid, target: VoteTarget) -> Result<VoteResult, AppError> {
        // Holding the parent entry serializes toggles on the same target.
        let (voted, new_count) = match target {
            VoteTarget::Launch(id) => {
                let mut launch = self
                    .launches
                    .get_mut(&id)
                    .filter(|l| l.status == LaunchStatus::Published)
                    .ok_or_else(|| AppError::not_found(target.noun()))?;
                let voted = self.flip_vote(voter_id, target)?;
                launch.votes_count = self.count_votes(target) as i32;
                (voted, launch.votes_count)
            }
            VoteTarget::ForumPost(id) => {
                let mut post = self
                    .forum_posts
                    .get_mut(&id)
                    .ok_or_else(|| AppError::not_found(target.noun()))?;
                let voted = self.flip_vote(voter_id, target)?;
                post.likes_count = self.count_votes(target) as i32;
                (voted, post.likes_count)
            }
        };
        self.wrote();

        Ok(VoteResult { voted, new_count })
    }
}

#[async_trait]
impl CommentStore for MemoryStore {
    async fn find(&self, id: Uuid) -> Result<Option<Comment>, AppError> {
        Ok(self.comments.get(&id).map(|c| c.clone()))
    }

    async fn insert(&self, comment: Comment) -> Result<Comment, AppError> {
        let mut launch = self
            .launches
            .get_mut(&comment.launch_id)
            .ok_or_else(|| AppError::not_found("launch"))?;

        if let Some(parent_id) = comment.parent_id {
            let same_launch = self
                .comments
                .get(&parent_id)
                .is_some_and(|p| p.launch_id == comment.launch_id);
            if !same_launch {
                return Err(AppError::not_found("parent comment"));
            }
        }

        self.comments.insert(comment.id, comment.clone());
        launch.comments_count = self.count_comments(comment.launch_id) as i32;
        self.wrote();
        Ok(comment)
    }

    async fn for_launch(&self, launch_id: Uuid) -> Result<Vec<Comment>, AppError> {
        let mut comments: Vec<Comment> = self
            .comments
            .iter()
            .filter(|c| c.launch_id == launch_id)
            .map(|c| c.clone())
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(comments)
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>, AppError> {
        Ok(self.profiles.get(&id).map(|p| p.clone()))
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Profile>, AppError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.profiles.get(id).map(|p| p.clone()))
            .collect())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Profile>, AppError> {
        Ok(self
            .profiles
            .iter()
            .find(|p| p.username.eq_ignore_ascii_case(username))
            .map(|p| p.clone()))
    }

    async fn search(&self, term: &str, limit: u64) -> Result<Vec<Profile>, AppError> {
        let mut found: Vec<Profile> = self
            .profiles
            .iter()
            .filter(|p| matches_any(term, &[&p.username, &p.display_name]))
            .map(|p| p.clone())
            .collect();
        found.sort_by(|a, b| a.username.cmp(&b.username));
        found.truncate(limit as usize);
        Ok(found)
    }

    async fn upsert(&self, profile: &Profile) -> Result<Profile, AppError> {
        let now = Some(chrono::Utc::now());
        let existing = self
            .profiles
            .iter()
            .find(|p| p.provider_subject == profile.provider_subject)
            .map(|p| p.id);

        let stored = match existing.and_then(|id| self.profiles.get_mut(&id)) {
            Some(mut current) => {
                current.email = profile.email.clone();
                current.display_name = profile.display_name.clone();
                current.avatar_url = profile.avatar_url.clone();
                current.updated_at = now;
                current.clone()
            }
            None => {
                let mut fresh = profile.clone();
                fresh.created_at = now;
                fresh.updated_at = now;
                self.profiles.insert(fresh.id, fresh.clone());
                fresh
            }
        };
        self.wrote();
        Ok(stored)
    }
}

#[async_trait]
impl ForumStore for MemoryStore {
    async fn find_post(&self, id: Uuid) -> Result<Option<ForumPost>, AppError> {
        Ok(self.forum_posts.get(&id).map(|p| p.clone()))
    }

    async fn insert_post(&self, post: NewForumPost) -> Result<ForumPost, AppError> {
        let post = post.into_post(chrono::Utc::now());
        self.forum_posts.insert(post.id, post.clone());
        self.wrote();
        Ok(post)
    }

    async fn list_posts(&self, query: &ForumQuery) -> Result<Vec<ForumPost>, AppError> {
        let mut posts: Vec<ForumPost> = self
            .forum_posts
            .iter()
            .filter(|p| query.category.as_deref().map_or(true, |c| p.category == c))
            .filter(|p| query.author.map_or(true, |a| p.author_id == a))
            .filter(|p| {
                query
                    .text_term()
                    .map_or(true, |t| matches_any(t, &[&p.title, &p.content]))
            })
            .map(|p| p.clone())
            .collect();

        posts.sort_by(|a, b| {
            let within = match query.sort {
                ForumSort::Newest => std::cmp::Ordering::Equal,
                ForumSort::MostLiked => b.likes_count.cmp(&a.likes_count),
                ForumSort::MostCommented => b.comments_count.cmp(&a.comments_count),
            };
            b.is_pinned
                .cmp(&a.is_pinned)
                .then(within)
                .then(b.created_at.cmp(&a.created_at))
        });

        posts.truncate(query.limit_or_default() as usize);
        Ok(posts)
    }

    async fn record_post_view(&self, id: Uuid) -> Result<i32, AppError> {
        let mut post = self
            .forum_posts
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("forum post"))?;
        post.views_count += 1;
        self.wrote();
        Ok(post.views_count)
    }

    async fn insert_comment(&self, comment: ForumComment) -> Result<ForumComment, AppError> {
        let mut post = self
            .forum_posts
            .get_mut(&comment.post_id)
            .ok_or_else(|| AppError::not_found("forum post"))?;
        if post.is_locked {
            return Err(AppError::invalid("This thread is locked."));
        }

        if let Some(parent_id) = comment.parent_id {
            let same_post = self
                .forum_comments
                .get(&parent_id)
                .is_some_and(|p| p.post_id == comment.post_id);
            if !same_post {
                return Err(AppError::not_found("parent comment"));
            }
        }

        self.forum_comments.insert(comment.id, comment.clone());
        post.comments_count = self.count_forum_comments(comment.post_id) as i32;
        self.wrote();
        Ok(comment)
    }

    async fn comments_for(&self, post_id: Uuid) -> Result<Vec<ForumComment>, AppError> {
        let mut comments: Vec<ForumComment> = self
            .forum_comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .map(|c| c.clone())
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(comments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seed_launch(store: &MemoryStore, slug: &str) -> Launch {
        let draft = NewLaunch::new(slug.to_string(), Uuid::new_v4()).with_slug(slug.to_string());
        LaunchStore::insert(store, draft).await.unwrap()
    }

    #[tokio::test]
    async fn test_duplicate_vote_row_is_rejected() {
        let store = MemoryStore::new();
        let launch = seed_launch(&store, "demo").await;
        let voter = Uuid::new_v4();

        VoteStore::insert(&store, Vote::new(voter, VoteTarget::Launch(launch.id)))
            .await
            .unwrap();
        let second =
            VoteStore::insert(&store, Vote::new(voter, VoteTarget::Launch(launch.id))).await;

        assert!(matches!(second, Err(AppError::ConflictRetryable(_))));
        assert_eq!(store.count(VoteTarget::Launch(launch.id)).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_slug_is_rejected() {
        let store = MemoryStore::new();
        seed_launch(&store, "demo").await;

        let draft = NewLaunch::new("Demo".into(), Uuid::new_v4()).with_slug("demo".into());
        let result = LaunchStore::insert(&store, draft).await;

        assert!(matches!(result, Err(AppError::ConflictRetryable(_))));
    }

    #[tokio::test]
    async fn test_unpublished_slug_stays_reserved() {
        let store = MemoryStore::new();
        let hidden = NewLaunch::new("Hidden".into(), Uuid::new_v4())
            .with_slug("hidden".into())
            .with_status(LaunchStatus::Unpublished);
        LaunchStore::insert(&store, hidden).await.unwrap();

        assert!(store.slug_exists("hidden", None).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_cascades_votes() {
        let store = MemoryStore::new();
        let launch = seed_launch(&store, "demo").await;
        store
            .toggle(Uuid::new_v4(), VoteTarget::Launch(launch.id))
            .await
            .unwrap();

        store.delete(launch.id).await.unwrap();

        assert_eq!(store.count(VoteTarget::Launch(launch.id)).await.unwrap(), 0);
        assert!(store.find_by_slug("demo").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_slug_exists_ignores_excluded_owner() {
        let store = MemoryStore::new();
        let launch = seed_launch(&store, "demo").await;

        assert!(store.slug_exists("demo", None).await.unwrap());
        assert!(!store.slug_exists("demo", Some(launch.id)).await.unwrap());
    }

    #[tokio::test]
    async fn test_unpublished_launches_are_not_listed() {
        let store = MemoryStore::new();
        seed_launch(&store, "visible").await;
        let hidden = NewLaunch::new("Hidden".into(), Uuid::new_v4())
            .with_slug("hidden".into())
            .with_status(LaunchStatus::Unpublished);
        LaunchStore::insert(&store, hidden).await.unwrap();

        let listed = store.list(&LaunchQuery::default()).await.unwrap();
        let slugs: Vec<_> = listed.iter().map(|l| l.slug.as_str()).collect();
        assert_eq!(slugs, vec!["visible"]);
    }

    #[tokio::test]
    async fn test_comment_parent_must_share_launch() {
        let store = MemoryStore::new();
        let a = seed_launch(&store, "a").await;
        let b = seed_launch(&store, "b").await;
        let first = Comment::new(a.id, Uuid::new_v4(), None, "hi".into());
        let parent = CommentStore::insert(&store, first).await.unwrap();

        let stray = Comment::new(b.id, Uuid::new_v4(), Some(parent.id), "reply".into());
        let result = CommentStore::insert(&store, stray).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        let a = LaunchStore::find_by_id(&store, a.id).await.unwrap().unwrap();
        let b = LaunchStore::find_by_id(&store, b.id).await.unwrap().unwrap();
        assert_eq!(a.comments_count, 1);
        assert_eq!(b.comments_count, 0);
    }

    #[tokio::test]
    async fn test_upsert_refreshes_existing_profile() {
        let store = MemoryStore::new();
        let first = Profile::new("sub".into(), "a@uw.edu".into(), "A".into(), None);
        let stored = store.upsert(&first).await.unwrap();

        let again = Profile::new("sub".into(), "a@uw.edu".into(), "Alex".into(), None);
        let updated = store.upsert(&again).await.unwrap();

        assert_eq!(updated.id, stored.id);
        assert_eq!(updated.display_name, "Alex");
    }

    async fn seed_post(store: &MemoryStore, title: &str) -> ForumPost {
        let draft = NewForumPost::new(
            Uuid::new_v4(),
            crate::domain::ForumPostInput {
                category: "general".into(),
                title: title.to_string(),
                content: "body".into(),
            },
        );
        store.insert_post(draft).await.unwrap()
    }

    #[tokio::test]
    async fn test_list_matches_text_in_any_launch_field() {
        let store = MemoryStore::new();
        let mut draft = NewLaunch::new("Dawg Dash".into(), Uuid::new_v4()).with_slug("dd".into());
        draft.description = "Late-night snacks delivered to your DORM".into();
        LaunchStore::insert(&store, draft).await.unwrap();
        seed_launch(&store, "other").await;

        let query = LaunchQuery {
            text: Some("dorm".into()),
            ..Default::default()
        };
        let found = store.list(&query).await.unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Dawg Dash");
    }

    #[tokio::test]
    async fn test_like_toggle_keeps_post_counter_in_step() {
        let store = MemoryStore::new();
        let post = seed_post(&store, "Anyone up for a hackathon?").await;
        let target = VoteTarget::ForumPost(post.id);
        let voter = Uuid::new_v4();

        let liked = store.toggle(voter, target).await.unwrap();
        assert_eq!(liked, VoteResult { voted: true, new_count: 1 });

        let unliked = store.toggle(voter, target).await.unwrap();
        assert_eq!(unliked, VoteResult { voted: false, new_count: 0 });

        let post = store.find_post(post.id).await.unwrap().unwrap();
        assert_eq!(post.likes_count, 0);
        assert_eq!(store.count(VoteTarget::Launch(post.id)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_like_on_missing_post_is_not_found() {
        let store = MemoryStore::new();
        let result = store
            .toggle(Uuid::new_v4(), VoteTarget::ForumPost(Uuid::new_v4()))
            .await;

        assert_eq!(result, Err(AppError::not_found("forum post")));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_locked_post_rejects_comments() {
        let store = MemoryStore::new();
        let draft = NewForumPost::new(Uuid::new_v4(), Default::default()).locked();
        let post = store.insert_post(draft).await.unwrap();

        let comment = ForumComment::new(post.id, Uuid::new_v4(), None, "late".into());
        let result = store.insert_comment(comment).await;

        assert!(matches!(result, Err(AppError::InvalidInput(_))));
        assert!(store.comments_for(post.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_forum_reply_must_share_post() {
        let store = MemoryStore::new();
        let a = seed_post(&store, "a").await;
        let b = seed_post(&store, "b").await;
        let parent = store
            .insert_comment(ForumComment::new(a.id, Uuid::new_v4(), None, "hi".into()))
            .await
            .unwrap();

        let stray = ForumComment::new(b.id, Uuid::new_v4(), Some(parent.id), "reply".into());
        let result = store.insert_comment(stray).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        let a = store.find_post(a.id).await.unwrap().unwrap();
        let b = store.find_post(b.id).await.unwrap().unwrap();
        assert_eq!(a.comments_count, 1);
        assert_eq!(b.comments_count, 0);
    }

    #[tokio::test]
    async fn test_pinned_posts_list_first() {
        let store = MemoryStore::new();
        let draft = NewForumPost::new(
            Uuid::new_v4(),
            crate::domain::ForumPostInput {
                title: "Read me first".into(),
                ..Default::default()
            },
        )
        .pinned();
        store.insert_post(draft).await.unwrap();
        let popular = seed_post(&store, "Popular").await;
        seed_post(&store, "Newest").await;
        store
            .toggle(Uuid::new_v4(), VoteTarget::ForumPost(popular.id))
            .await
            .unwrap();

        let query = ForumQuery {
            sort: ForumSort::MostLiked,
            ..Default::default()
        };
        let titles: Vec<String> = store
            .list_posts(&query)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();

        assert_eq!(titles, vec!["Read me first", "Popular", "Newest"]);
    }

    #[tokio::test]
    async fn test_profile_lookup_by_username_and_search() {
        let store = MemoryStore::new();
        let ana = Profile::new("sub-a".into(), "ana@uw.edu".into(), "Ana Lima".into(), None);
        store.upsert(&ana).await.unwrap();
        let ben = Profile::new("sub-b".into(), "ben@uw.edu".into(), "Ben".into(), None);
        store.upsert(&ben).await.unwrap();

        let found = store.find_by_username("ANA").await.unwrap();
        assert_eq!(found.map(|p| p.id), Some(ana.id));

        let hits = store.search("lima", 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].username, "ana");
    }
}
