use super::ports::VoteStore;
use crate::domain::{VoteResult, VoteTarget};
use crate::infrastructure::security::RateLimiter;
use dublaunch_errors::AppError;
use std::sync::Arc;
use uuid::Uuid;

/// Upvotes on launches and likes on forum posts.
///
/// The store does the toggle and the recount in one transaction, so the
/// target's counter always equals the number of vote rows once a toggle returns.
#[derive(Clone)]
pub struct VoteLedger {
    votes: Arc<dyn VoteStore>,
    rate_limiter: RateLimiter,
}

impl VoteLedger {
    pub fn new(votes: Arc<dyn VoteStore>, rate_limiter: RateLimiter) -> Self {
        Self {
            votes,
            rate_limiter,
        }
    }

    /// Adds the voter's vote, or removes it if they already voted.
    pub async fn toggle_vote(
        &self,
        voter: Option<Uuid>,
        launch_id: Uuid,
    ) -> Result<VoteResult, AppError> {
        self.toggle(voter, VoteTarget::Launch(launch_id)).await
    }

    /// Same as [`toggle_vote`](Self::toggle_vote), but re-runs the toggle once when
    /// it lost a uniqueness race. The re-run reads the state left by the winner.
    pub async fn toggle_vote_with_retry(
        &self,
        voter: Option<Uuid>,
        launch_id: Uuid,
    ) -> Result<VoteResult, AppError> {
        self.toggle_with_retry(voter, VoteTarget::Launch(launch_id))
            .await
    }

    pub async fn has_voted(&self, voter: Option<Uuid>, launch_id: Uuid) -> Result<bool, AppError> {
        self.has_toggled(voter, VoteTarget::Launch(launch_id)).await
    }

    pub async fn toggle_like(
        &self,
        voter: Option<Uuid>,
        post_id: Uuid,
    ) -> Result<VoteResult, AppError> {
        self.toggle(voter, VoteTarget::ForumPost(post_id)).await
    }

    pub async fn toggle_like_with_retry(
        &self,
        voter: Option<Uuid>,
        post_id: Uuid,
    ) -> Result<VoteResult, AppError> {
        self.toggle_with_retry(voter, VoteTarget::ForumPost(post_id))
            .await
    }

    pub async fn has_liked(&self, voter: Option<Uuid>, post_id: Uuid) -> Result<bool, AppError> {
        self.has_toggled(voter, VoteTarget::ForumPost(post_id)).await
    }

    async fn toggle(&self, voter: Option<Uuid>, target: VoteTarget) -> Result<VoteResult, AppError> {
        let voter = voter.ok_or(AppError::Unauthenticated)?;
        self.rate_limiter.check(voter)?;

        let result = self.votes.toggle(voter, target).await?;
        tracing::debug!(
            "Vote on {} by {}: voted={} count={}",
            target,
            voter,
            result.voted,
            result.new_count
        );
        Ok(result)
    }

    async fn toggle_with_retry(
        &self,
        voter: Option<Uuid>,
        target: VoteTarget,
    ) -> Result<VoteResult, AppError> {
        match self.toggle(voter, target).await {
            Err(AppError::ConflictRetryable(reason)) => {
                tracing::info!("Retrying vote toggle on {}: {}", target, reason);
                let voter = voter.ok_or(AppError::Unauthenticated)?;
                self.votes.toggle(voter, target).await
            }
            other => other,
        }
    }

    async fn has_toggled(&self, voter: Option<Uuid>, target: VoteTarget) -> Result<bool, AppError> {
        match voter {
            Some(voter) => self.votes.has_voted(voter, target).await,
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::LaunchStore;
    use crate::application::ports::ForumStore;
    use crate::domain::{Launch, LaunchStatus, NewForumPost, NewLaunch, Vote};
    use crate::infrastructure::memory::MemoryStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn ledger(store: &MemoryStore) -> VoteLedger {
        VoteLedger::new(Arc::new(store.clone()), RateLimiter::new(1000, 10_000))
    }

    async fn launch(store: &MemoryStore) -> Launch {
        let draft = NewLaunch::new("Husky Notes".into(), Uuid::new_v4()).with_slug("husky-notes".into());
        LaunchStore::insert(store, draft).await.unwrap()
    }

    async fn votes_count(store: &MemoryStore, id: Uuid) -> i32 {
        LaunchStore::find_by_id(store, id)
            .await
            .unwrap()
            .map(|l| l.votes_count)
            .unwrap_or(-1)
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_count() {
        let store = MemoryStore::new();
        let ledger = ledger(&store);
        let launch = launch(&store).await;
        let voter = Some(Uuid::new_v4());

        let on = ledger.toggle_vote(voter, launch.id).await.unwrap();
        let off = ledger.toggle_vote(voter, launch.id).await.unwrap();

        assert_eq!(on, VoteResult { voted: true, new_count: 1 });
        assert_eq!(off, VoteResult { voted: false, new_count: 0 });
        assert!(!ledger.has_voted(voter, launch.id).await.unwrap());
        assert_eq!(votes_count(&store, launch.id).await, 0);
    }

    #[tokio::test]
    async fn test_count_matches_rows_after_mixed_toggles() {
        let store = MemoryStore::new();
        let ledger = ledger(&store);
        let launch = launch(&store).await;
        let voters: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();

        for (i, voter) in voters.iter().cycle().take(13).enumerate() {
            let result = ledger.toggle_vote(Some(*voter), launch.id).await.unwrap();
            assert_eq!(
                i64::from(result.new_count),
                store.count(VoteTarget::Launch(launch.id)).await.unwrap(),
                "toggle {} left the counter out of step",
                i
            );
        }

        assert_eq!(
            i64::from(votes_count(&store, launch.id).await),
            store.count(VoteTarget::Launch(launch.id)).await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_vote_from_four_to_five_and_back() {
        let store = MemoryStore::new();
        let ledger = ledger(&store);
        let launch = launch(&store).await;
        for _ in 0..4 {
            ledger.toggle_vote(Some(Uuid::new_v4()), launch.id).await.unwrap();
        }
        let voter = Some(Uuid::new_v4());

        assert_eq!(
            ledger.toggle_vote(voter, launch.id).await.unwrap(),
            VoteResult { voted: true, new_count: 5 }
        );
        assert_eq!(
            ledger.toggle_vote(voter, launch.id).await.unwrap(),
            VoteResult { voted: false, new_count: 4 }
        );
    }

    #[tokio::test]
    async fn test_anonymous_vote_writes_nothing() {
        let store = MemoryStore::new();
        let ledger = ledger(&store);
        let launch = launch(&store).await;
        let writes_before = store.write_count();

        let result = ledger.toggle_vote(None, launch.id).await;

        assert_eq!(result, Err(AppError::Unauthenticated));
        assert_eq!(store.write_count(), writes_before);
        assert_eq!(votes_count(&store, launch.id).await, 0);
    }

    #[tokio::test]
    async fn test_missing_or_deleted_launch_is_not_found() {
        let store = MemoryStore::new();
        let ledger = ledger(&store);
        let voter = Some(Uuid::new_v4());

        let missing = ledger.toggle_vote(voter, Uuid::new_v4()).await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));

        let launch = launch(&store).await;
        ledger.toggle_vote(voter, launch.id).await.unwrap();
        LaunchStore::delete(&store, launch.id).await.unwrap();

        let after_delete = ledger.toggle_vote(voter, launch.id).await;
        assert!(matches!(after_delete, Err(AppError::NotFound(_))));
        assert_eq!(store.count(VoteTarget::Launch(launch.id)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unpublished_launch_cannot_be_voted() {
        let store = MemoryStore::new();
        let ledger = ledger(&store);
        let draft = NewLaunch::new("Hidden".into(), Uuid::new_v4())
            .with_slug("hidden".into())
            .with_status(LaunchStatus::Unpublished);
        let hidden = LaunchStore::insert(&store, draft).await.unwrap();

        let result = ledger.toggle_vote(Some(Uuid::new_v4()), hidden.id).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_voters_are_rate_limited() {
        let store = MemoryStore::new();
        let ledger = VoteLedger::new(Arc::new(store.clone()), RateLimiter::new(2, 100));
        let launch = launch(&store).await;
        let voter = Some(Uuid::new_v4());

        ledger.toggle_vote(voter, launch.id).await.unwrap();
        ledger.toggle_vote(voter, launch.id).await.unwrap();
        let third = ledger.toggle_vote(voter, launch.id).await;

        assert!(matches!(third, Err(AppError::RateLimited(_))));
        assert!(ledger.toggle_vote(Some(Uuid::new_v4()), launch.id).await.is_ok());
    }

    /// Loses the first `conflicts` toggles to a concurrent duplicate insert.
    struct RacingVotes {
        inner: MemoryStore,
        conflicts: AtomicUsize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl VoteStore for RacingVotes {
        async fn has_voted(&self, voter_id: Uuid, target: VoteTarget) -> Result<bool, AppError> {
            self.inner.has_voted(voter_id, target).await
        }

        async fn count(&self, target: VoteTarget) -> Result<i64, AppError> {
            self.inner.count(target).await
        }

        async fn insert(&self, vote: Vote) -> Result<(), AppError> {
            VoteStore::insert(&self.inner, vote).await
        }

        async fn toggle(&self, voter_id: Uuid, target: VoteTarget) -> Result<VoteResult, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let lose = self
                .conflicts
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if lose {
                return Err(AppError::ConflictRetryable("vote already recorded".into()));
            }
            self.inner.toggle(voter_id, target).await
        }
    }

    #[tokio::test]
    async fn test_conflict_is_retried_exactly_once() {
        let store = MemoryStore::new();
        let launch = launch(&store).await;
        let racing = Arc::new(RacingVotes {
            inner: store.clone(),
            conflicts: AtomicUsize::new(1),
            calls: AtomicUsize::new(0),
        });
        let ledger = VoteLedger::new(racing.clone(), RateLimiter::for_votes());

        let result = ledger
            .toggle_vote_with_retry(Some(Uuid::new_v4()), launch.id)
            .await
            .unwrap();

        assert_eq!(result, VoteResult { voted: true, new_count: 1 });
        assert_eq!(racing.calls.load(Ordering::SeqCst), 2);

        racing.conflicts.store(2, Ordering::SeqCst);
        racing.calls.store(0, Ordering::SeqCst);
        let gave_up = ledger
            .toggle_vote_with_retry(Some(Uuid::new_v4()), launch.id)
            .await;

        assert!(matches!(gave_up, Err(AppError::ConflictRetryable(_))));
        assert_eq!(racing.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_voters_keep_count_consistent() {
        let store = MemoryStore::new();
        let ledger = ledger(&store);
        let launch_id = launch(&store).await.id;

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let ledger = ledger.clone();
                tokio::spawn(async move {
                    ledger.toggle_vote(Some(Uuid::new_v4()), launch_id).await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(votes_count(&store, launch_id).await, 16);
        assert_eq!(store.count(VoteTarget::Launch(launch_id)).await.unwrap(), 16);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_one_voter_racing_themselves_ends_with_one_vote() {
        let store = MemoryStore::new();
        let ledger = ledger(&store);
        let launch_id = launch(&store).await.id;
        let voter = Some(Uuid::new_v4());

        // An odd number of toggles by the same voter must leave them voted.
        let handles: Vec<_> = (0..201)
            .map(|_| {
                let ledger = ledger.clone();
                tokio::spawn(async move { ledger.toggle_vote(voter, launch_id).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.count(VoteTarget::Launch(launch_id)).await.unwrap(), 1);
        assert_eq!(votes_count(&store, launch_id).await, 1);
        assert!(ledger.has_voted(voter, launch_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_likes_share_the_toggle_but_not_the_rows() {
        let store = MemoryStore::new();
        let ledger = ledger(&store);
        let launch = launch(&store).await;
        let post = store
            .insert_post(NewForumPost::new(Uuid::new_v4(), Default::default()))
            .await
            .unwrap();
        let voter = Some(Uuid::new_v4());

        ledger.toggle_vote(voter, launch.id).await.unwrap();
        let liked = ledger.toggle_like(voter, post.id).await.unwrap();

        assert_eq!(liked, VoteResult { voted: true, new_count: 1 });
        assert!(ledger.has_liked(voter, post.id).await.unwrap());
        assert!(!ledger.has_liked(voter, launch.id).await.unwrap());

        let unliked = ledger.toggle_like_with_retry(voter, post.id).await.unwrap();
        assert_eq!(unliked, VoteResult { voted: false, new_count: 0 });
        assert_eq!(votes_count(&store, launch.id).await, 1);
        assert_eq!(store.find_post(post.id).await.unwrap().unwrap().likes_count, 0);
    }

    #[tokio::test]
    async fn test_anonymous_like_is_rejected() {
        let store = MemoryStore::new();
        let ledger = ledger(&store);
        let post = store
            .insert_post(NewForumPost::new(Uuid::new_v4(), Default::default()))
            .await
            .unwrap();

        let result = ledger.toggle_like(None, post.id).await;

        assert_eq!(result, Err(AppError::Unauthenticated));
        assert!(!ledger.has_liked(None, post.id).await.unwrap());
    }
}
