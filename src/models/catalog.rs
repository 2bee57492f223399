use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A canonical interest category such as "beach" or "family"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub id: i32,
    /// Unique machine name, matched against survey profiles
    pub name: String,
    /// Human readable display label
    pub label: String,
}

/// A candidate travel destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Destination {
    pub id: i32,
    pub name: String,
    pub country: String,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set when the destination has been soft-deleted
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Destination {
    pub fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// Curated relevance of one tag to one destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DestinationTag {
    pub id: i32,
    pub destination_id: i32,
    pub tag_id: i32,
    /// Relevance strength used by the recommendation scorer
    pub score: i32,
    pub weight_score: i32,
}

/// Fields needed to register a destination in a store
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewDestination {
    pub name: String,
    pub country: String,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn destination(deleted_at: Option<DateTime<Utc>>) -> Destination {
        let now = Utc::now();
        Destination {
            id: 1,
            name: "Jeju".to_string(),
            country: "South Korea".to_string(),
            description: "Volcanic island".to_string(),
            latitude: 33.4996,
            longitude: 126.5312,
            created_at: now,
            updated_at: now,
            deleted_at,
        }
    }

    #[test]
    fn test_new_destination_is_live() {
        assert!(destination(None).is_live());
    }

    #[test]
    fn test_soft_deleted_destination_is_not_live() {
        assert!(!destination(Some(Utc::now())).is_live());
    }
}
