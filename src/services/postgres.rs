use crate::models::{Budget, MemberPreference};
use crate::services::provider::{PreferenceStore, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

/// Row shape of the `member_preferences` table
#[derive(Debug, Clone, sqlx::FromRow)]
struct PreferenceRow {
    member_id: String,
    cuisine_types: Vec<String>,
    dietary_restrictions: Vec<String>,
    spice_level: i32,
    budget: String,
    location: String,
    desired_time: Option<DateTime<Utc>>,
}

impl TryFrom<PreferenceRow> for MemberPreference {
    type Error = StoreError;

    fn try_from(row: PreferenceRow) -> Result<Self, Self::Error> {
        let budget: Budget = row
            .budget
            .parse()
            .map_err(|e| StoreError::InvalidRecord(format!("member {}: {}", row.member_id, e)))?;

        Ok(MemberPreference {
            member_id: row.member_id,
            cuisine_types: row.cuisine_types,
            dietary_restrictions: row.dietary_restrictions,
            spice_level: row.spice_level.clamp(1, 5) as u8,
            budget,
            location_text: row.location,
            desired_time: row.desired_time,
        })
    }
}

/// PostgreSQL-backed preference store
///
/// Read-only from the engine's side; preferences are written by the group
/// service that owns the table.
pub struct PgPreferenceStore {
    pool: PgPool,
}

impl PgPreferenceStore {
    /// Connect and run pending migrations
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout_secs: u64,
        idle_timeout_secs: u64,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(idle_timeout_secs))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl PreferenceStore for PgPreferenceStore {
    async fn list_by_group(&self, group_id: &str) -> Result<Vec<MemberPreference>, StoreError> {
        let rows: Vec<PreferenceRow> = sqlx::query_as(
            r#"
            SELECT member_id, cuisine_types, dietary_restrictions, spice_level,
                   budget, location, desired_time
            FROM member_preferences
            WHERE group_id = $1
            ORDER BY submitted_at, member_id
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        if rows.is_empty() {
            return Err(StoreError::NotFound(format!("No preferences for group {}", group_id)));
        }

        tracing::debug!("Loaded {} preferences for group {}", rows.len(), group_id);

        rows.into_iter().map(MemberPreference::try_from).collect()
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        let one: i32 = sqlx::query_scalar("SELECT 1").fetch_one(&self.pool).await?;
        Ok(one == 1)
    }
}
