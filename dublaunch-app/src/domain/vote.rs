use serde::{Deserialize, Serialize};
use std::fmt;

/// What a vote is cast on. Launch upvotes and forum post likes go through the
/// same ledger and the same toggle-and-recount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteTarget {
    Launch(uuid::Uuid),
    ForumPost(uuid::Uuid),
}

impl VoteTarget {
    pub fn id(&self) -> uuid::Uuid {
        match self {
            Self::Launch(id) | Self::ForumPost(id) => *id,
        }
    }

    /// Used in `NotFound` payloads.
    pub fn noun(&self) -> &'static str {
        match self {
            Self::Launch(_) => "launch",
            Self::ForumPost(_) => "forum post",
        }
    }
}

impl fmt::Display for VoteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.noun(), self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub voter_id: uuid::Uuid,
    pub target: VoteTarget,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Vote {
    pub fn new(voter_id: uuid::Uuid, target: VoteTarget) -> Self {
        Self {
            voter_id,
            target,
            created_at: None,
        }
    }
}

/// Result of a vote toggle operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteResult {
    pub voted: bool,
    pub new_count: i32,
}

/// What the heart button shows. The button flips this immediately on click,
/// then either adopts the server's answer or puts the old state back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteState {
    pub voted: bool,
    pub count: i32,
}

impl VoteState {
    pub fn new(voted: bool, count: i32) -> Self {
        Self { voted, count }
    }

    pub fn optimistic_toggle(self) -> Self {
        if self.voted {
            Self {
                voted: false,
                count: (self.count - 1).max(0),
            }
        } else {
            Self {
                voted: true,
                count: self.count + 1,
            }
        }
    }

    pub fn reconcile(self, result: &VoteResult) -> Self {
        Self {
            voted: result.voted,
            count: result.new_count,
        }
    }
}

impl From<VoteResult> for VoteState {
    fn from(result: VoteResult) -> Self {
        Self::new(result.voted, result.new_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optimistic_toggle_flips_and_counts() {
        let before = VoteState::new(false, 4);
        let after = before.optimistic_toggle();
        assert_eq!(after, VoteState::new(true, 5));
        assert_eq!(after.optimistic_toggle(), before);
    }

    #[test]
    fn test_optimistic_unvote_never_goes_negative() {
        let state = VoteState::new(true, 0).optimistic_toggle();
        assert_eq!(state, VoteState::new(false, 0));
    }

    #[test]
    fn test_target_names_its_subject() {
        let id = uuid::Uuid::nil();
        assert_eq!(VoteTarget::Launch(id).noun(), "launch");
        assert_eq!(VoteTarget::ForumPost(id).id(), id);
        assert_ne!(VoteTarget::Launch(id), VoteTarget::ForumPost(id));
    }

    #[test]
    fn test_reconcile_prefers_server_truth() {
        // Someone else voted in the meantime: the server says 7, not 5.
        let optimistic = VoteState::new(false, 4).optimistic_toggle();
        let settled = optimistic.reconcile(&VoteResult {
            voted: true,
            new_count: 7,
        });
        assert_eq!(settled, VoteState::new(true, 7));
    }
}
