//! Storage seams consumed by the services
//!
//! The recommendation path only needs the read-only `CatalogStore`. Accounts
//! and the survey counter live behind their own traits so the HTTP layer can
//! run against Postgres or the in-memory store interchangeably.

use crate::{
    error::AppResult,
    models::{Destination, DestinationTag, NewUser, Tag, User},
};

/// Read-only access to the tag vocabulary and destination catalog
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    /// Tags whose `name` is in `names`. Unknown names are simply absent.
    async fn tags_by_names(&self, names: &[String]) -> AppResult<Vec<Tag>>;

    /// Destination-tag rows whose `tag_id` is in `tag_ids`
    async fn destination_tags_by_tag_ids(&self, tag_ids: &[i32])
        -> AppResult<Vec<DestinationTag>>;

    /// A live destination by id; soft-deleted rows read as `None`
    async fn destination_by_id(&self, id: i32) -> AppResult<Option<Destination>>;

    async fn list_tags(&self) -> AppResult<Vec<Tag>>;

    /// Live destinations ordered by id
    async fn list_destinations(&self) -> AppResult<Vec<Destination>>;
}

/// Account persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// Live (not soft-deleted) account with the given email
    async fn find_active_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Inserts an account. Fails with `InvalidInput` when a live account
    /// already uses the email.
    async fn create_user(&self, new_user: NewUser) -> AppResult<User>;
}

/// Request counters
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CounterStore: Send + Sync {
    /// Atomically increments the survey counter and returns the new value
    async fn increment_survey_calls(&self) -> AppResult<i64>;

    async fn survey_calls(&self) -> AppResult<i64>;
}
