use super::Author;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const MAX_COMMENT_LEN: usize = 2000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: uuid::Uuid,
    pub launch_id: uuid::Uuid,
    pub author_id: uuid::Uuid,
    pub parent_id: Option<uuid::Uuid>,
    pub content: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Comment {
    pub fn new(
        launch_id: uuid::Uuid,
        author_id: uuid::Uuid,
        parent_id: Option<uuid::Uuid>,
        content: String,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            launch_id,
            author_id,
            parent_id,
            content,
            created_at: chrono::Utc::now(),
        }
    }
}

/// Anything that hangs in a reply tree: launch comments and forum comments.
pub trait Threaded {
    fn id(&self) -> uuid::Uuid;
    fn parent_id(&self) -> Option<uuid::Uuid>;
}

impl Threaded for Comment {
    fn id(&self) -> uuid::Uuid {
        self.id
    }

    fn parent_id(&self) -> Option<uuid::Uuid> {
        self.parent_id
    }
}

/// A comment with its author resolved and its replies attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentNode<C = Comment> {
    pub comment: C,
    pub author: Author,
    pub replies: Vec<CommentNode<C>>,
}

impl<C> CommentNode<C> {
    pub fn reply_count(&self) -> usize {
        self.replies
            .iter()
            .map(|r| 1 + r.reply_count())
            .sum()
    }
}

/// Builds the reply tree from a flat list of comments.
///
/// Siblings keep the order they had in `flat`. The result does not depend on
/// parents appearing before their replies. A reply whose parent is not in the list
/// becomes a root.
pub fn build_thread<C: Threaded>(flat: Vec<(C, Author)>) -> Vec<CommentNode<C>> {
    let known: std::collections::HashSet<uuid::Uuid> =
        flat.iter().map(|(c, _)| c.id()).collect();

    let mut children: HashMap<uuid::Uuid, Vec<CommentNode<C>>> = HashMap::new();
    let mut roots = Vec::new();
    let mut order = Vec::with_capacity(flat.len());

    for (comment, author) in flat {
        order.push(comment.id());
        let node = CommentNode {
            comment,
            author,
            replies: Vec::new(),
        };
        let (id, parent_id) = (node.comment.id(), node.comment.parent_id());
        match parent_id {
            Some(parent) if known.contains(&parent) && parent != id => {
                children.entry(parent).or_default().push(node);
            }
            _ => roots.push(node),
        }
    }

    fn attach<C: Threaded>(
        node: &mut CommentNode<C>,
        children: &mut HashMap<uuid::Uuid, Vec<CommentNode<C>>>,
    ) {
        if let Some(mut replies) = children.remove(&node.comment.id()) {
            for reply in replies.iter_mut() {
                attach(reply, children);
            }
            node.replies = replies;
        }
    }

    for root in roots.iter_mut() {
        attach(root, &mut children);
    }

    // Whatever is left sits on a parent cycle and never hangs off a root.
    if !children.is_empty() {
        let mut stranded: Vec<CommentNode<C>> = children.into_values().flatten().collect();
        stranded.sort_by_key(|n| order.iter().position(|id| *id == n.comment.id()));
        roots.extend(stranded);
    }

    roots
}
