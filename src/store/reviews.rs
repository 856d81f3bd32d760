//! User feedback on individual analyses.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{load_json, save_json, KeyValueStore, StoreError};

pub const REVIEWS_KEY: &str = "xrayai_reviews";
const ANONYMOUS: &str = "Anonymous";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub analysis_id: String,
    /// 1 to 5.
    pub rating: u8,
    pub comment: String,
    pub date: String,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub helpful: u32,
}

pub struct ReviewStore<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> ReviewStore<'a> {
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    /// Newest first.
    pub fn list(&self) -> Result<Vec<Review>, StoreError> {
        Ok(load_json(self.store, REVIEWS_KEY)?.unwrap_or_default())
    }

    pub fn add(
        &self,
        analysis_id: &str,
        rating: u8,
        comment: &str,
        user_name: Option<&str>,
    ) -> Result<Review, StoreError> {
        if !(1..=5).contains(&rating) {
            return Err(StoreError::InvalidRating(rating));
        }

        let review = Review {
            id: Uuid::new_v4().to_string(),
            analysis_id: analysis_id.to_string(),
            rating,
            comment: comment.trim().to_string(),
            date: Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            user_name: Some(
                user_name
                    .filter(|n| !n.is_empty())
                    .unwrap_or(ANONYMOUS)
                    .to_string(),
            ),
            helpful: 0,
        };

        let mut reviews = self.list()?;
        reviews.insert(0, review.clone());
        save_json(self.store, REVIEWS_KEY, &reviews)?;
        tracing::debug!(analysis_id, rating, "Review added");
        Ok(review)
    }

    pub fn for_analysis(&self, analysis_id: &str) -> Result<Vec<Review>, StoreError> {
        let mut reviews = self.list()?;
        reviews.retain(|r| r.analysis_id == analysis_id);
        Ok(reviews)
    }

    /// Increment the helpful counter. Returns the new count.
    pub fn mark_helpful(&self, review_id: &str) -> Result<u32, StoreError> {
        let mut reviews = self.list()?;
        let review = reviews
            .iter_mut()
            .find(|r| r.id == review_id)
            .ok_or_else(|| StoreError::NotFound {
                entity_type: "Review".into(),
                id: review_id.to_string(),
            })?;
        review.helpful += 1;
        let helpful = review.helpful;
        save_json(self.store, REVIEWS_KEY, &reviews)?;
        Ok(helpful)
    }

    /// Returns false when no review had this id.
    pub fn delete(&self, review_id: &str) -> Result<bool, StoreError> {
        let mut reviews = self.list()?;
        let before = reviews.len();
        reviews.retain(|r| r.id != review_id);
        if reviews.len() == before {
            return Ok(false);
        }
        save_json(self.store, REVIEWS_KEY, &reviews)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn add_trims_and_defaults_user() {
        let kv = MemoryStore::new();
        let reviews = ReviewStore::new(&kv);
        let review = reviews.add("a1", 4, "  Very clear report  ", None).unwrap();
        assert_eq!(review.comment, "Very clear report");
        assert_eq!(review.user_name.as_deref(), Some("Anonymous"));
        assert_eq!(review.helpful, 0);
    }

    #[test]
    fn rating_must_be_one_to_five() {
        let kv = MemoryStore::new();
        let reviews = ReviewStore::new(&kv);
        assert!(matches!(reviews.add("a1", 0, "", None), Err(StoreError::InvalidRating(0))));
        assert!(matches!(reviews.add("a1", 6, "", None), Err(StoreError::InvalidRating(6))));
        assert!(reviews.add("a1", 5, "", Some("Dr. Kim")).is_ok());
        assert_eq!(reviews.list().unwrap().len(), 1);
    }

    #[test]
    fn filter_by_analysis() {
        let kv = MemoryStore::new();
        let reviews = ReviewStore::new(&kv);
        reviews.add("a1", 3, "ok", None).unwrap();
        reviews.add("a2", 5, "great", None).unwrap();
        reviews.add("a1", 4, "better", None).unwrap();

        let a1 = reviews.for_analysis("a1").unwrap();
        assert_eq!(a1.len(), 2);
        assert_eq!(a1[0].comment, "better");
    }

    #[test]
    fn helpful_votes_and_delete() {
        let kv = MemoryStore::new();
        let reviews = ReviewStore::new(&kv);
        let review = reviews.add("a1", 5, "great", None).unwrap();

        assert_eq!(reviews.mark_helpful(&review.id).unwrap(), 1);
        assert_eq!(reviews.mark_helpful(&review.id).unwrap(), 2);
        assert!(matches!(
            reviews.mark_helpful("missing"),
            Err(StoreError::NotFound { .. })
        ));

        assert!(reviews.delete(&review.id).unwrap());
        assert!(!reviews.delete(&review.id).unwrap());
        assert!(reviews.list().unwrap().is_empty());
    }
}
