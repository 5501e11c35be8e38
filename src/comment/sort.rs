use crate::comment::model::Comment;
use crate::post::post_model::Post;
use chrono::{DateTime, Utc};
use mongodb::bson::{Document, oid::ObjectId};
use std::cmp::Ordering;

/// Seconds between the unix epoch and the reference point used for hot scores.
const HOT_EPOCH_OFFSET: i64 = 1_134_028_003;

/// Seconds of age that weigh as much as a tenfold increase in votes.
const HOT_DECAY_SECONDS: f64 = 45_000.0;

/// Stored fields a listing can be ranked on.
pub trait Ranked {
    fn id(&self) -> &ObjectId;
    fn created_at(&self) -> DateTime<Utc>;
    fn votes(&self) -> i64;
    fn sort_on_hot(&self) -> f64;
}

impl Ranked for Comment {
    fn id(&self) -> &ObjectId {
        &self.id
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    fn votes(&self) -> i64 {
        self.votes
    }
    fn sort_on_hot(&self) -> f64 {
        self.sort_on_hot
    }
}

impl Ranked for Post {
    fn id(&self) -> &ObjectId {
        &self.id
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    fn votes(&self) -> i64 {
        self.votes
    }
    fn sort_on_hot(&self) -> f64 {
        self.sort_on_hot
    }
}

/// Ordering applied to siblings of a comment tree and to post listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommentSort {
    #[default]
    New,
    Top,
    Hot,
}

impl CommentSort {
    /// Maps the wire value to a sort. Anything unknown orders by creation time.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("new") => CommentSort::New,
            Some("top") => CommentSort::Top,
            Some("hot") => CommentSort::Hot,
            _ => CommentSort::New,
        }
    }

    /// Stored field the sort ranks on.
    pub fn field(&self) -> &'static str {
        match self {
            CommentSort::New => "created_at",
            CommentSort::Top => "votes",
            CommentSort::Hot => "sort_on_hot",
        }
    }

    /// Sort document for the store. Ties break on `_id` so pages are stable.
    pub fn sort_document(&self) -> Document {
        let mut sort = Document::new();
        sort.insert(self.field(), -1);
        sort.insert("_id", -1);
        sort
    }

    /// In-process equivalent of [`CommentSort::sort_document`].
    pub fn compare<T: Ranked>(&self, a: &T, b: &T) -> Ordering {
        let primary = match self {
            CommentSort::New => b.created_at().cmp(&a.created_at()),
            CommentSort::Top => b.votes().cmp(&a.votes()),
            CommentSort::Hot => b.sort_on_hot().total_cmp(&a.sort_on_hot()),
        };
        primary.then_with(|| b.id().bytes().cmp(&a.id().bytes()))
    }
}

/// Ranking that mixes net votes with recency; newer comments need
/// exponentially fewer votes to rank the same.
pub fn hot_score(votes: i64, created_at: DateTime<Utc>) -> f64 {
    let order = (votes.unsigned_abs().max(1) as f64).log10();
    let sign = votes.signum() as f64;
    let seconds = (created_at.timestamp() - HOT_EPOCH_OFFSET) as f64;
    let score = sign * order + seconds / HOT_DECAY_SECONDS;
    (score * 1e7).round() / 1e7
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn parses_known_sorts() {
        assert_eq!(CommentSort::parse(Some("new")), CommentSort::New);
        assert_eq!(CommentSort::parse(Some("top")), CommentSort::Top);
        assert_eq!(CommentSort::parse(Some("hot")), CommentSort::Hot);
    }

    #[test]
    fn unknown_sort_falls_back_to_creation_time() {
        for value in [None, Some(""), Some("best"), Some("TOP"), Some("controversial")] {
            assert_eq!(CommentSort::parse(value), CommentSort::New);
        }
        assert_eq!(CommentSort::parse(Some("oldest")).field(), "created_at");
    }

    #[test]
    fn sort_document_breaks_ties_on_id() {
        let sort = CommentSort::Top.sort_document();
        let keys: Vec<&String> = sort.keys().collect();
        assert_eq!(keys, vec!["votes", "_id"]);
        assert_eq!(sort.get_i32("votes").unwrap(), -1);
    }

    #[test]
    fn hot_score_rewards_votes_and_recency() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        assert!(hot_score(100, now) > hot_score(10, now));
        assert!(hot_score(10, now) > hot_score(-10, now));
        assert!(hot_score(0, now + Duration::hours(1)) > hot_score(0, now));
        // 12.5 hours of age is worth one order of magnitude of votes.
        let older = now - Duration::seconds(45_000);
        assert!((hot_score(10, older) - hot_score(1, now)).abs() < 1e-6);
    }
}
