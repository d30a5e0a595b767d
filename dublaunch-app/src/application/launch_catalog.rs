use super::ports::{CommentStore, LaunchStore, ProfileStore, VoteStore};
use super::slug_allocator::SlugAllocator;
use crate::domain::{
    Author, Comment, Launch, LaunchDetails, LaunchInput, LaunchQuery, LaunchSort, LaunchStatus,
    LaunchSummary, NewLaunch, Profile, StudentPage, VoteTarget,
};
use crate::infrastructure::cache::RevalidatingCache;
use crate::infrastructure::security::{InputSanitizer, RateLimiter};
use dublaunch_errors::AppError;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub const DEFAULT_LEADERBOARD_TTL: Duration = Duration::from_secs(3600);

/// Creating, finding and ranking launches.
pub struct LaunchCatalog {
    launches: Arc<dyn LaunchStore>,
    votes: Arc<dyn VoteStore>,
    comments: Arc<dyn CommentStore>,
    profiles: Arc<dyn ProfileStore>,
    slugs: SlugAllocator,
    rate_limiter: RateLimiter,
    leaderboard: RevalidatingCache<u64, Vec<LaunchSummary>>,
}

impl LaunchCatalog {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        launches: Arc<dyn LaunchStore>,
        votes: Arc<dyn VoteStore>,
        comments: Arc<dyn CommentStore>,
        profiles: Arc<dyn ProfileStore>,
        slugs: SlugAllocator,
        rate_limiter: RateLimiter,
        leaderboard_ttl: Duration,
    ) -> Self {
        Self {
            launches,
            votes,
            comments,
            profiles,
            slugs,
            rate_limiter,
            leaderboard: RevalidatingCache::new(leaderboard_ttl),
        }
    }

    pub async fn create_launch(
        &self,
        creator: Option<Uuid>,
        input: LaunchInput,
    ) -> Result<Launch, AppError> {
        let creator = creator.ok_or(AppError::Unauthenticated)?;
        self.rate_limiter.check(creator)?;

        let input = InputSanitizer::validate_launch(input)?;
        let draft = NewLaunch {
            tagline: input.tagline,
            description: input.description,
            website_url: input.website_url,
            primary_category: input.primary_category,
            tags: input.tags,
            pricing_type: input.pricing_type,
            ..NewLaunch::new(input.name.clone(), creator)
        };

        let mut launch = self.slugs.claim(&input.name, draft).await?;
        tracing::info!("Launch {} created at /launch/{}", launch.id, launch.slug);

        if let Some(text) = input.first_comment {
            match self
                .comments
                .insert(Comment::new(launch.id, creator, None, text))
                .await
            {
                Ok(_) => launch.comments_count += 1,
                Err(e) => tracing::warn!("First comment on {} not saved: {}", launch.id, e),
            }
        }

        Ok(launch)
    }

    /// Published launch behind `slug`, counting one more view.
    pub async fn launch_by_slug(
        &self,
        slug: &str,
        viewer: Option<Uuid>,
    ) -> Result<LaunchDetails, AppError> {
        let mut launch = self
            .launches
            .find_by_slug(slug)
            .await?
            .filter(|l| l.status == LaunchStatus::Published)
            .ok_or_else(|| AppError::not_found(format!("launch `{}`", slug)))?;

        match self.launches.record_view(launch.id).await {
            Ok(views) => launch.views_count = views,
            Err(e) => tracing::warn!("View of {} not recorded: {}", launch.id, e),
        }

        let author = Author::from_profile(self.profiles.find_by_id(launch.creator_id).await?);
        let viewer_has_voted = match viewer {
            Some(viewer) => {
                self.votes
                    .has_voted(viewer, VoteTarget::Launch(launch.id))
                    .await?
            }
            None => false,
        };
        let viewer_is_creator = viewer == Some(launch.creator_id);

        Ok(LaunchDetails {
            launch,
            author,
            viewer_has_voted,
            viewer_is_creator,
        })
    }

    pub async fn discover(&self, query: LaunchQuery) -> Result<Vec<LaunchSummary>, AppError> {
        let launches = self.launches.list(&query).await?;
        self.with_authors(launches).await
    }

    /// Most-voted launches, refreshed at most once per TTL for each `limit`.
    pub async fn leaderboard(&self, limit: u64) -> Result<Vec<LaunchSummary>, AppError> {
        let query = LaunchQuery {
            sort: LaunchSort::MostVoted,
            limit,
            ..Default::default()
        };
        self.leaderboard
            .get_or_refresh(query.limit_or_default(), || self.discover(query.clone()))
            .await
    }

    /// Public page for `username`: their published launches, newest first.
    pub async fn student_page(&self, username: &str) -> Result<StudentPage, AppError> {
        let username = username.trim().to_lowercase();
        let profile = self
            .profiles
            .find_by_username(&username)
            .await?
            .ok_or_else(|| AppError::not_found(format!("student `{}`", username)))?;

        let launches = self
            .launches
            .list(&LaunchQuery {
                creator: Some(profile.id),
                limit: 100,
                ..Default::default()
            })
            .await?;
        Ok(StudentPage::new(profile, launches))
    }

    /// Hard delete by the creator. Votes and comments go with it and the slug is
    /// free again.
    pub async fn delete_launch(
        &self,
        requester: Option<Uuid>,
        launch_id: Uuid,
    ) -> Result<(), AppError> {
        let requester = requester.ok_or(AppError::Unauthenticated)?;
        let launch = self
            .launches
            .find_by_id(launch_id)
            .await?
            .filter(|l| l.creator_id == requester)
            .ok_or_else(|| AppError::not_found("launch"))?;

        self.launches.delete(launch.id).await?;
        self.leaderboard.clear().await;
        tracing::info!("Launch {} ({}) deleted", launch.id, launch.slug);
        Ok(())
    }

    async fn with_authors(&self, launches: Vec<Launch>) -> Result<Vec<LaunchSummary>, AppError> {
        let ids: Vec<Uuid> = launches.iter().map(|l| l.creator_id).collect();
        let authors = load_authors(self.profiles.as_ref(), ids).await?;

        Ok(launches
            .into_iter()
            .map(|launch| LaunchSummary {
                author: Author::from_profile(authors.get(&launch.creator_id).cloned()),
                launch,
            })
            .collect())
    }
}

/// Profiles for the given ids, fetched in one round trip.
pub(crate) async fn load_authors(
    profiles: &dyn ProfileStore,
    mut ids: Vec<Uuid>,
) -> Result<HashMap<Uuid, Profile>, AppError> {
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    Ok(profiles
        .find_many(&ids)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::slug_allocator::SlugFallback;
    use crate::domain::PricingType;
    use crate::infrastructure::memory::MemoryStore;

    fn catalog(store: &MemoryStore) -> LaunchCatalog {
        let shared = Arc::new(store.clone());
        LaunchCatalog::new(
            shared.clone(),
            shared.clone(),
            shared.clone(),
            shared.clone(),
            SlugAllocator::new(shared, SlugFallback::default()),
            RateLimiter::new(100, 1000),
            DEFAULT_LEADERBOARD_TTL,
        )
    }

    async fn student(store: &MemoryStore, name: &str) -> Profile {
        let email = format!("{}@uw.edu", name.to_lowercase());
        let profile = Profile::new(format!("sub-{}", name), email, name.to_string(), None);
        store.upsert(&profile).await.unwrap()
    }

    fn input(name: &str) -> LaunchInput {
        LaunchInput {
            name: name.to_string(),
            tagline: "Built in the HUB basement".into(),
            website_url: "https://example.com".into(),
            primary_category: "Web App".into(),
            pricing_type: PricingType::Freemium,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_launch_requires_sign_in() {
        let store = MemoryStore::new();
        let result = catalog(&store).create_launch(None, input("Dorm Eats")).await;

        assert_eq!(result, Err(AppError::Unauthenticated));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_create_launch_claims_slug_and_posts_first_comment() {
        let store = MemoryStore::new();
        let catalog = catalog(&store);
        let maker = student(&store, "Ana").await;

        let launch = catalog
            .create_launch(
                Some(maker.id),
                LaunchInput {
                    first_comment: Some("Hi! We built this over finals week.".into()),
                    ..input("Café del Mar")
                },
            )
            .await
            .unwrap();

        assert_eq!(launch.slug, "cafe-del-mar");
        assert_eq!(launch.status, LaunchStatus::Published);
        assert_eq!(launch.pricing_type, PricingType::Freemium);
        assert_eq!(launch.comments_count, 1);
        assert_eq!(store.for_launch(launch.id).await.unwrap().len(), 1);

        let second = catalog
            .create_launch(Some(maker.id), input("cafe del mar"))
            .await
            .unwrap();
        assert_eq!(second.slug, "cafe-del-mar-1");
    }

    #[tokio::test]
    async fn test_invalid_input_is_rejected_before_any_write() {
        let store = MemoryStore::new();
        let catalog = catalog(&store);
        let maker = student(&store, "Ana").await;
        let writes = store.write_count();

        let result = catalog
            .create_launch(
                Some(maker.id),
                LaunchInput {
                    website_url: "javascript:alert(1)".into(),
                    ..input("Sneaky")
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::InvalidInput(_))));
        assert_eq!(store.write_count(), writes);
    }

    #[tokio::test]
    async fn test_launch_by_slug_counts_views_and_resolves_author() {
        let store = MemoryStore::new();
        let catalog = catalog(&store);
        let maker = student(&store, "Ana").await;
        let launch = catalog
            .create_launch(Some(maker.id), input("Dorm Eats"))
            .await
            .unwrap();

        let anonymous = catalog.launch_by_slug("dorm-eats", None).await.unwrap();
        let again = catalog
            .launch_by_slug("dorm-eats", Some(maker.id))
            .await
            .unwrap();

        assert_eq!(anonymous.launch.id, launch.id);
        assert_eq!(anonymous.launch.views_count, 1);
        assert_eq!(again.launch.views_count, 2);
        assert_eq!(anonymous.author, Author::Known(maker));
        assert!(!again.viewer_has_voted);
    }

    #[tokio::test]
    async fn test_unknown_creator_resolves_to_unknown_author() {
        let store = MemoryStore::new();
        let catalog = catalog(&store);
        catalog
            .create_launch(Some(Uuid::new_v4()), input("Ghost Notes"))
            .await
            .unwrap();

        let details = catalog.launch_by_slug("ghost-notes", None).await.unwrap();

        assert_eq!(details.author, Author::Unknown);
    }

    #[tokio::test]
    async fn test_missing_and_unpublished_slugs_are_not_found() {
        let store = MemoryStore::new();
        let catalog = catalog(&store);
        let hidden = NewLaunch::new("Hidden".into(), Uuid::new_v4())
            .with_slug("hidden".into())
            .with_status(LaunchStatus::Unpublished);
        LaunchStore::insert(&store, hidden).await.unwrap();

        for slug in ["nope", "hidden"] {
            let result = catalog.launch_by_slug(slug, None).await;
            assert!(matches!(result, Err(AppError::NotFound(_))), "{}", slug);
        }
    }

    #[tokio::test]
    async fn test_discover_filters_by_category() {
        let store = MemoryStore::new();
        let catalog = catalog(&store);
        let maker = student(&store, "Ana").await;
        catalog
            .create_launch(Some(maker.id), input("Web Thing"))
            .await
            .unwrap();
        catalog
            .create_launch(
                Some(maker.id),
                LaunchInput {
                    primary_category: "Gaming".into(),
                    ..input("Quad Quest")
                },
            )
            .await
            .unwrap();

        let games = catalog
            .discover(LaunchQuery {
                category: Some("Gaming".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(games.len(), 1);
        assert_eq!(games[0].launch.name, "Quad Quest");
        assert_eq!(games[0].author.display_name(), "Ana");
    }

    #[tokio::test]
    async fn test_leaderboard_orders_by_votes_and_is_cached() {
        let store = MemoryStore::new();
        let catalog = catalog(&store);
        let maker = student(&store, "Ana").await;
        let quiet = catalog
            .create_launch(Some(maker.id), input("Quiet"))
            .await
            .unwrap();
        let loud = catalog
            .create_launch(Some(maker.id), input("Loud"))
            .await
            .unwrap();
        store
            .toggle(Uuid::new_v4(), VoteTarget::Launch(loud.id))
            .await
            .unwrap();

        let board = catalog.leaderboard(10).await.unwrap();
        assert_eq!(board[0].launch.id, loud.id);
        assert_eq!(board[1].launch.id, quiet.id);

        for _ in 0..2 {
            store
                .toggle(Uuid::new_v4(), VoteTarget::Launch(quiet.id))
                .await
                .unwrap();
        }
        let cached = catalog.leaderboard(10).await.unwrap();
        assert_eq!(cached[0].launch.id, loud.id);

        let fresh = catalog.discover(LaunchQuery {
            sort: LaunchSort::MostVoted,
            ..Default::default()
        });
        assert_eq!(fresh.await.unwrap()[0].launch.id, quiet.id);
    }

    #[tokio::test]
    async fn test_only_creator_can_delete_and_slug_is_released() {
        let store = MemoryStore::new();
        let catalog = catalog(&store);
        let maker = student(&store, "Ana").await;
        let other = student(&store, "Ben").await;
        let launch = catalog
            .create_launch(Some(maker.id), input("Dorm Eats"))
            .await
            .unwrap();

        let stranger = catalog.delete_launch(Some(other.id), launch.id).await;
        assert!(matches!(stranger, Err(AppError::NotFound(_))));

        catalog.delete_launch(Some(maker.id), launch.id).await.unwrap();
        assert!(matches!(
            catalog.launch_by_slug("dorm-eats", None).await,
            Err(AppError::NotFound(_))
        ));

        let reused = catalog
            .create_launch(Some(maker.id), input("Dorm Eats"))
            .await
            .unwrap();
        assert_eq!(reused.slug, "dorm-eats");
    }

    #[tokio::test]
    async fn test_creator_sees_their_own_launch_as_theirs() {
        let store = MemoryStore::new();
        let catalog = catalog(&store);
        let maker = student(&store, "Ana").await;
        catalog
            .create_launch(Some(maker.id), input("Dorm Eats"))
            .await
            .unwrap();

        let own = catalog.launch_by_slug("dorm-eats", Some(maker.id)).await;
        let other = catalog.launch_by_slug("dorm-eats", Some(Uuid::new_v4())).await;

        assert!(own.unwrap().viewer_is_creator);
        assert!(!other.unwrap().viewer_is_creator);
    }

    #[tokio::test]
    async fn test_discover_searches_text() {
        let store = MemoryStore::new();
        let catalog = catalog(&store);
        let maker = student(&store, "Ana").await;
        catalog
            .create_launch(Some(maker.id), input("Quad Quest"))
            .await
            .unwrap();
        catalog
            .create_launch(Some(maker.id), input("Dorm Eats"))
            .await
            .unwrap();

        let found = catalog
            .discover(LaunchQuery {
                text: Some("QUEST".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].launch.name, "Quad Quest");
    }

    #[tokio::test]
    async fn test_student_page_lists_only_their_launches() {
        let store = MemoryStore::new();
        let catalog = catalog(&store);
        let ana = student(&store, "Ana").await;
        let ben = student(&store, "Ben").await;
        let mine = catalog
            .create_launch(Some(ana.id), input("Dorm Eats"))
            .await
            .unwrap();
        catalog
            .create_launch(Some(ben.id), input("Quad Quest"))
            .await
            .unwrap();
        for _ in 0..3 {
            store
                .toggle(Uuid::new_v4(), VoteTarget::Launch(mine.id))
                .await
                .unwrap();
        }

        let page = catalog.student_page(" ANA ").await.unwrap();

        assert_eq!(page.profile.id, ana.id);
        assert_eq!(page.launches.len(), 1);
        assert_eq!(page.launches[0].id, mine.id);
        assert_eq!(page.total_votes, 3);

        let missing = catalog.student_page("nobody").await;
        assert_eq!(missing, Err(AppError::not_found("student `nobody`")));
    }
}
