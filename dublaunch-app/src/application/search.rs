use super::ports::ProfileStore;
use super::{ForumBoard, LaunchCatalog};
use crate::domain::{ForumQuery, LaunchQuery, SearchResults, SEARCH_RESULTS_PER_KIND};
use crate::infrastructure::security::InputSanitizer;
use dublaunch_errors::AppError;
use std::sync::Arc;

/// One box that looks through launches, students and forum posts at once.
#[derive(Clone)]
pub struct Search {
    catalog: Arc<LaunchCatalog>,
    forum: ForumBoard,
    profiles: Arc<dyn ProfileStore>,
}

impl Search {
    pub fn new(
        catalog: Arc<LaunchCatalog>,
        forum: ForumBoard,
        profiles: Arc<dyn ProfileStore>,
    ) -> Self {
        Self {
            catalog,
            forum,
            profiles,
        }
    }

    /// Up to ten hits of each kind. A blank query finds nothing.
    pub async fn search(&self, raw: &str) -> Result<SearchResults, AppError> {
        let Some(term) = InputSanitizer::search_term(raw)? else {
            return Ok(SearchResults::default());
        };

        let (launches, students, posts) = tokio::try_join!(
            self.catalog.discover(LaunchQuery {
                text: Some(term.clone()),
                limit: SEARCH_RESULTS_PER_KIND,
                ..Default::default()
            }),
            self.profiles.search(&term, SEARCH_RESULTS_PER_KIND),
            self.forum.posts(ForumQuery {
                text: Some(term.clone()),
                limit: SEARCH_RESULTS_PER_KIND,
                ..Default::default()
            }),
        )?;

        tracing::debug!(
            "Search `{}`: {} launches, {} students, {} posts",
            term,
            launches.len(),
            students.len(),
            posts.len()
        );
        Ok(SearchResults {
            query: term,
            launches,
            students,
            posts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::slug_allocator::SlugFallback;
    use crate::application::{SlugAllocator, DEFAULT_LEADERBOARD_TTL};
    use crate::domain::{ForumPostInput, LaunchInput, Profile};
    use crate::infrastructure::memory::MemoryStore;
    use crate::infrastructure::security::RateLimiter;

    fn search(store: &MemoryStore) -> (Search, Arc<LaunchCatalog>, ForumBoard) {
        let shared = Arc::new(store.clone());
        let catalog = Arc::new(LaunchCatalog::new(
            shared.clone(),
            shared.clone(),
            shared.clone(),
            shared.clone(),
            SlugAllocator::new(shared.clone(), SlugFallback::default()),
            RateLimiter::new(100, 1000),
            DEFAULT_LEADERBOARD_TTL,
        ));
        let forum = ForumBoard::new(
            shared.clone(),
            shared.clone(),
            shared.clone(),
            RateLimiter::new(100, 1000),
        );
        (
            Search::new(catalog.clone(), forum.clone(), shared),
            catalog,
            forum,
        )
    }

    #[tokio::test]
    async fn test_blank_query_finds_nothing() {
        let store = MemoryStore::new();
        let (search, _, _) = search(&store);

        let results = search.search("   ").await.unwrap();

        assert!(results.is_empty());
        assert_eq!(results.query, "");
    }

    #[tokio::test]
    async fn test_search_spans_launches_students_and_posts() {
        let store = MemoryStore::new();
        let (search, catalog, forum) = search(&store);
        let ana = store
            .upsert(&Profile::new(
                "sub-ana".into(),
                "ana@uw.edu".into(),
                "Ana the Husky".into(),
                None,
            ))
            .await
            .unwrap();
        catalog
            .create_launch(
                Some(ana.id),
                LaunchInput {
                    name: "Husky Notes".into(),
                    tagline: "Shared lecture notes".into(),
                    website_url: "https://huskynotes.app".into(),
                    primary_category: "Education".into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        forum
            .create_post(
                Some(ana.id),
                ForumPostInput {
                    category: "general".into(),
                    title: "Best husky merch?".into(),
                    content: "Asking for a friend".into(),
                },
            )
            .await
            .unwrap();

        let results = search.search(" HUSKY ").await.unwrap();

        assert_eq!(results.query, "HUSKY");
        assert_eq!(results.launches.len(), 1);
        assert_eq!(results.students, vec![ana]);
        assert_eq!(results.posts.len(), 1);
        assert_eq!(results.total(), 3);
    }

    #[tokio::test]
    async fn test_wildcards_are_literal() {
        let store = MemoryStore::new();
        let (search, _, _) = search(&store);
        store
            .upsert(&Profile::new("s".into(), "ana@uw.edu".into(), "Ana".into(), None))
            .await
            .unwrap();

        let results = search.search("%").await.unwrap();

        assert!(results.is_empty());
    }
}
