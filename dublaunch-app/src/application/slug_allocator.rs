use super::ports::LaunchStore;
use crate::domain::{slug, Launch, NewLaunch};
use dublaunch_errors::AppError;
use rand::Rng;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

const MAX_SUFFIX: u32 = 10_000;
const MAX_CLAIM_ATTEMPTS: usize = 16;
const TOKEN_LEN: usize = 6;
const TOKEN_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// What to do with a title that normalizes to nothing, such as `"!!!"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SlugFallback {
    /// Use `launch-<token>`.
    #[default]
    RandomToken,
    Reject,
}

impl FromStr for SlugFallback {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" | "random_token" => Ok(Self::RandomToken),
            "reject" => Ok(Self::Reject),
            other => Err(format!("unknown slug fallback `{}`", other)),
        }
    }
}

impl fmt::Display for SlugFallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RandomToken => f.write_str("random"),
            Self::Reject => f.write_str("reject"),
        }
    }
}

/// Hands out launch slugs that no other launch holds.
///
/// `allocate` only finds a free candidate. Uniqueness is guaranteed by `claim`,
/// which inserts under the store's unique constraint and moves on to the next
/// candidate when someone else got there first.
#[derive(Clone)]
pub struct SlugAllocator {
    launches: Arc<dyn LaunchStore>,
    fallback: SlugFallback,
}

impl SlugAllocator {
    pub fn new(launches: Arc<dyn LaunchStore>, fallback: SlugFallback) -> Self {
        Self { launches, fallback }
    }

    pub async fn allocate(&self, title: &str, exclude: Option<Uuid>) -> Result<String, AppError> {
        let base = self.base_for(title)?;

        for suffix in std::iter::once(None).chain((1..=MAX_SUFFIX).map(Some)) {
            let candidate = slug::with_suffix(&base, suffix);
            if !self.launches.slug_exists(&candidate, exclude).await? {
                return Ok(candidate);
            }
        }

        tracing::warn!("Slug `{}` has {} siblings, using a token", base, MAX_SUFFIX);
        Ok(format!("{}-{}", base, random_token()))
    }

    /// Allocates a slug for `title` and inserts `draft` under it.
    pub async fn claim(&self, title: &str, draft: NewLaunch) -> Result<Launch, AppError> {
        for attempt in 1..=MAX_CLAIM_ATTEMPTS {
            let candidate = self.allocate(title, None).await?;

            match self.launches.insert(draft.clone().with_slug(candidate.clone())).await {
                Ok(launch) => return Ok(launch),
                Err(AppError::ConflictRetryable(reason)) => {
                    tracing::debug!(
                        "Slug `{}` taken concurrently (attempt {}): {}",
                        candidate,
                        attempt,
                        reason
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::ExhaustedRetries(format!(
            "no free slug for `{}` after {} attempts",
            title, MAX_CLAIM_ATTEMPTS
        )))
    }

    fn base_for(&self, title: &str) -> Result<String, AppError> {
        let base = slug::normalize(title);
        if !base.is_empty() {
            return Ok(base);
        }
        match self.fallback {
            SlugFallback::RandomToken => Ok(format!("launch-{}", random_token())),
            SlugFallback::Reject => Err(AppError::invalid(
                "Name needs at least one letter or digit",
            )),
        }
    }
}

fn random_token() -> String {
    let mut rng = rand::thread_rng();
    (0..TOKEN_LEN)
        .map(|_| TOKEN_ALPHABET[rng.gen_range(0..TOKEN_ALPHABET.len())] as char)
        .collect()
}
