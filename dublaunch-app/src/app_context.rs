use crate::application::ports::{CommentStore, ForumStore, LaunchStore, ProfileStore, VoteStore};
use crate::application::{
    CommentThreads, ForumBoard, LaunchCatalog, Search, SlugAllocator, VoteLedger,
};
use crate::config::{AppConfig, Storage};
use crate::domain::Profile;
use crate::infrastructure::auth::{GoogleOAuth, GoogleUserInfo};
use crate::infrastructure::db::{
    create_connection, map_db_err, run_migrations, CommentRepository, ForumRepository,
    LaunchRepository, ProfileRepository, VoteRepository,
};
use crate::infrastructure::memory::MemoryStore;
use crate::infrastructure::security::RateLimiter;
use dublaunch_errors::AppError;
use std::sync::Arc;
use uuid::Uuid;

/// Everything a request handler needs, cheap to clone into each request.
#[derive(Clone)]
pub struct AppContext {
    pub votes: Arc<VoteLedger>,
    pub catalog: Arc<LaunchCatalog>,
    pub comments: Arc<CommentThreads>,
    pub forum: ForumBoard,
    pub search: Search,
    pub profiles: Arc<dyn ProfileStore>,
    pub oauth: Option<Arc<GoogleOAuth>>,
}

impl AppContext {
    pub fn with_stores(
        launches: Arc<dyn LaunchStore>,
        votes: Arc<dyn VoteStore>,
        comments: Arc<dyn CommentStore>,
        profiles: Arc<dyn ProfileStore>,
        forum: Arc<dyn ForumStore>,
        config: &AppConfig,
    ) -> Result<Self, AppError> {
        let post_limiter = RateLimiter::for_posts();
        let slugs = SlugAllocator::new(launches.clone(), config.slug_fallback);

        let oauth = match &config.google {
            Some(google) => Some(Arc::new(GoogleOAuth::new(
                &google.client_id,
                &google.client_secret,
                &google.redirect_uri,
                &google.allowed_domain,
            )?)),
            None => {
                tracing::warn!("GOOGLE_CLIENT_ID not set, sign-in is disabled");
                None
            }
        };

        let catalog = Arc::new(LaunchCatalog::new(
            launches,
            votes.clone(),
            comments.clone(),
            profiles.clone(),
            slugs,
            post_limiter.clone(),
            config.leaderboard_ttl,
        ));
        let forum = ForumBoard::new(
            forum,
            votes.clone(),
            profiles.clone(),
            post_limiter.clone(),
        );

        Ok(Self {
            votes: Arc::new(VoteLedger::new(votes, RateLimiter::for_votes())),
            search: Search::new(catalog.clone(), forum.clone(), profiles.clone()),
            catalog,
            comments: Arc::new(CommentThreads::new(comments, profiles.clone(), post_limiter)),
            forum,
            profiles,
            oauth,
        })
    }

    pub fn in_memory(config: &AppConfig) -> Result<Self, AppError> {
        let store = Arc::new(MemoryStore::new());
        Self::with_stores(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store,
            config,
        )
    }

    pub async fn postgres(database_url: &str, config: &AppConfig) -> Result<Self, AppError> {
        let db = create_connection(database_url).await.map_err(map_db_err)?;
        run_migrations(&db).await.map_err(map_db_err)?;

        Self::with_stores(
            Arc::new(LaunchRepository::new(db.clone())),
            Arc::new(VoteRepository::new(db.clone())),
            Arc::new(CommentRepository::new(db.clone())),
            Arc::new(ProfileRepository::new(db.clone())),
            Arc::new(ForumRepository::new(db)),
            config,
        )
    }

    pub async fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        match (config.storage, config.database_url.as_deref()) {
            (Storage::Postgres, Some(url)) => {
                tracing::info!("Using PostgreSQL storage");
                Self::postgres(url, config).await
            }
            (Storage::Postgres, None) => Err(AppError::invalid("DATABASE_URL is not set")),
            (Storage::Memory, _) => {
                tracing::info!("Using in-memory storage, nothing is persisted");
                Self::in_memory(config)
            }
        }
    }

    /// Creates or refreshes the profile behind a completed Google sign-in.
    pub async fn sign_in(&self, info: GoogleUserInfo) -> Result<Profile, AppError> {
        let profile = self.profiles.upsert(&info.into_profile()).await?;
        tracing::info!("Signed in {} as {}", profile.id, profile.username);
        Ok(profile)
    }

    pub async fn profile(&self, id: Option<Uuid>) -> Result<Option<Profile>, AppError> {
        match id {
            Some(id) => self.profiles.find_by_id(id).await,
            None => Ok(None),
        }
    }
}
