use crate::comment::model::{Comment, CommentNode, CommentTree, MoreChildren, TreeParams};
use crate::comment::repository::CommentRepository;
use crate::utils::error::StoreError;
use mongodb::bson::oid::ObjectId;
use std::collections::HashMap;

/// A comment waiting to be turned into a node. Its children are the next
/// `child_count` slots of the tier below.
struct Slot {
    comment: Comment,
    child_count: usize,
    more: Option<MoreChildren>,
}

impl Slot {
    fn new(comment: Comment) -> Self {
        Slot {
            comment,
            child_count: 0,
            more: None,
        }
    }
}

/// Splits sorted siblings into the returned page and the remainder.
fn split_page(mut siblings: Vec<Comment>, limit: usize) -> (Vec<Comment>, Vec<Comment>) {
    let rest = siblings.split_off(limit.min(siblings.len()));
    (siblings, rest)
}

/// Builds depth-bounded, paginated comment trees, reading one tier of the
/// thread per store request.
pub struct CommentTreeAssembler<'a> {
    comments: &'a dyn CommentRepository,
    params: TreeParams,
}

impl<'a> CommentTreeAssembler<'a> {
    pub fn new(comments: &'a dyn CommentRepository, params: TreeParams) -> Self {
        CommentTreeAssembler { comments, params }
    }

    /// Tree of a post's top-level comments. The post must already be known
    /// to exist.
    pub async fn post_tree(&self, post_id: &ObjectId) -> Result<CommentTree, StoreError> {
        let top_level = self
            .comments
            .find_children(&[*post_id], self.params.sort)
            .await?;
        let (roots, rest) = split_page(top_level, self.params.limit);

        Ok(CommentTree {
            comments: self.expand(roots, self.params.depth).await?,
            more_children: MoreChildren::from_ids(rest.iter().map(|c| &c.id)),
        })
    }

    /// Tree rooted at a single comment, used to continue a thread.
    pub async fn anchored_tree(&self, anchor: Comment) -> Result<CommentTree, StoreError> {
        Ok(CommentTree {
            comments: self.expand(vec![anchor], self.params.depth).await?,
            more_children: None,
        })
    }

    /// Sorts the requested comments and expands each of them `depth` levels
    /// further down.
    pub async fn expand_children(
        &self,
        mut roots: Vec<Comment>,
    ) -> Result<Vec<CommentNode>, StoreError> {
        roots.sort_by(|a, b| self.params.sort.compare(a, b));
        self.expand(roots, self.params.depth + 1).await
    }

    /// `levels` counts the roots as the first level.
    async fn expand(
        &self,
        roots: Vec<Comment>,
        levels: usize,
    ) -> Result<Vec<CommentNode>, StoreError> {
        let mut tiers: Vec<Vec<Slot>> = vec![roots.into_iter().map(Slot::new).collect()];

        while tiers.len() < levels {
            let Some(tier) = tiers.last_mut() else { break };
            let parents: Vec<ObjectId> = tier
                .iter()
                .filter(|slot| !slot.comment.replies.is_empty())
                .map(|slot| slot.comment.id)
                .collect();
            if parents.is_empty() {
                break;
            }

            let children = self
                .comments
                .find_children(&parents, self.params.sort)
                .await?;
            let mut by_parent: HashMap<ObjectId, Vec<Comment>> = HashMap::new();
            for child in children {
                by_parent.entry(child.parent).or_default().push(child);
            }

            let mut next = Vec::new();
            for slot in tier.iter_mut() {
                let Some(siblings) = by_parent.remove(&slot.comment.id) else {
                    continue;
                };
                let (page, rest) = split_page(siblings, self.params.limit);
                slot.child_count = page.len();
                slot.more = MoreChildren::from_ids(rest.iter().map(|c| &c.id));
                next.extend(page.into_iter().map(Slot::new));
            }
            if next.is_empty() {
                break;
            }
            tiers.push(next);
        }

        // Replies below the deepest returned tier are left for the client to
        // fetch. They are listed in reply order; sorting them would cost a read.
        if tiers.len() == levels {
            if let Some(tier) = tiers.last_mut() {
                for slot in tier.iter_mut() {
                    slot.more = MoreChildren::from_ids(&slot.comment.replies);
                }
            }
        }

        let mut below: Vec<CommentNode> = Vec::new();
        for tier in tiers.into_iter().rev() {
            let mut children = below.into_iter();
            below = tier
                .into_iter()
                .map(|slot| {
                    let mut node = CommentNode::from(slot.comment);
                    node.children = children.by_ref().take(slot.child_count).collect();
                    node.more_children = slot.more;
                    node
                })
                .collect();
        }
        Ok(below)
    }
}
