use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{CatalogStore, CounterStore, UserStore},
    error::{AppError, AppResult},
    models::{Destination, DestinationTag, NewUser, Tag, User},
};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Applies the embedded migrations in `migrations/`
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

const DESTINATION_COLUMNS: &str = "id, name, country, description, latitude, longitude, \
     created_at, updated_at, deleted_at";

const USER_COLUMNS: &str =
    "id, public_id, email, password, nickname, created_at, updated_at, deleted_at";

/// Postgres-backed implementation of every storage trait
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl CatalogStore for PgStore {
    async fn tags_by_names(&self, names: &[String]) -> AppResult<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>(
            "SELECT id, name, label FROM tag WHERE name = ANY($1) ORDER BY id",
        )
        .bind(names)
        .fetch_all(&self.pool)
        .await?;

        Ok(tags)
    }

    async fn destination_tags_by_tag_ids(
        &self,
        tag_ids: &[i32],
    ) -> AppResult<Vec<DestinationTag>> {
        let rows = sqlx::query_as::<_, DestinationTag>(
            r#"
            SELECT id, destination_id, tag_id, score, weight_score
            FROM destination_tag
            WHERE tag_id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(tag_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn destination_by_id(&self, id: i32) -> AppResult<Option<Destination>> {
        let query = format!(
            "SELECT {} FROM destination WHERE id = $1 AND deleted_at IS NULL",
            DESTINATION_COLUMNS
        );
        let destination = sqlx::query_as::<_, Destination>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(destination)
    }

    async fn list_tags(&self) -> AppResult<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>("SELECT id, name, label FROM tag ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(tags)
    }

    async fn list_destinations(&self) -> AppResult<Vec<Destination>> {
        let query = format!(
            "SELECT {} FROM destination WHERE deleted_at IS NULL ORDER BY id",
            DESTINATION_COLUMNS
        );
        let destinations = sqlx::query_as::<_, Destination>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(destinations)
    }
}

#[async_trait::async_trait]
impl UserStore for PgStore {
    async fn find_active_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let query = format!(
            "SELECT {} FROM users WHERE email = $1 AND deleted_at IS NULL",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn create_user(&self, new_user: NewUser) -> AppResult<User> {
        let query = format!(
            "INSERT INTO users (email, password, nickname) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        );
        let result = sqlx::query_as::<_, User>(&query)
            .bind(&new_user.email)
            .bind(&new_user.password_hash)
            .bind(&new_user.nickname)
            .fetch_one(&self.pool)
            .await;

        match result {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(
                AppError::InvalidInput("Email already registered".to_string()),
            ),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait::async_trait]
impl CounterStore for PgStore {
    async fn increment_survey_calls(&self) -> AppResult<i64> {
        // Single-statement upsert so concurrent submissions never lose an increment
        let count: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO survey_call_count (id, count) VALUES (1, 1)
            ON CONFLICT (id) DO UPDATE SET count = survey_call_count.count + 1
            RETURNING count
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn survey_calls(&self) -> AppResult<i64> {
        let count: Option<i64> =
            sqlx::query_scalar("SELECT count FROM survey_call_count WHERE id = 1")
                .fetch_optional(&self.pool)
                .await?;

        Ok(count.unwrap_or(0))
    }
}
