//! Profile repository for database operations.

use chrono::{DateTime, Utc};
use domain::models::Profile;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::ProfileEntity;
use crate::metrics::QueryTimer;

const PROFILE_COLUMNS: &str = "id, provider_id, login, name, email, avatar_url, api_token_hash, \
                               home_ids, device_ids, created_at, updated_at";

/// Repository for profile-related database operations.
#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    /// Creates a new ProfileRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ProfileEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_profile");
        let sql = format!("SELECT {} FROM profiles WHERE id = $1", PROFILE_COLUMNS);
        let result = sqlx::query_as::<_, ProfileEntity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    pub async fn find_by_api_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<ProfileEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_profile_by_api_token");
        let sql = format!(
            "SELECT {} FROM profiles WHERE api_token_hash = $1",
            PROFILE_COLUMNS
        );
        let result = sqlx::query_as::<_, ProfileEntity>(&sql)
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    pub async fn find_by_provider_id(
        &self,
        provider_id: &str,
    ) -> Result<Option<ProfileEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_profile_by_provider_id");
        let sql = format!(
            "SELECT {} FROM profiles WHERE provider_id = $1",
            PROFILE_COLUMNS
        );
        let result = sqlx::query_as::<_, ProfileEntity>(&sql)
            .bind(provider_id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    pub async fn insert(&self, profile: &Profile) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("insert_profile");
        let result = sqlx::query(
            r#"
            INSERT INTO profiles (id, provider_id, login, name, email, avatar_url,
                                  api_token_hash, home_ids, device_ids, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(profile.id)
        .bind(&profile.identity.provider_id)
        .bind(&profile.identity.login)
        .bind(&profile.identity.name)
        .bind(&profile.identity.email)
        .bind(&profile.identity.avatar_url)
        .bind(&profile.api_token_hash)
        .bind(&profile.home_ids)
        .bind(&profile.device_ids)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|_| ())
    }

    /// Returns the number of rows affected (0 if profile not found).
    pub async fn set_api_token_hash(
        &self,
        id: Uuid,
        token_hash: &str,
        at: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("set_api_token");
        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET api_token_hash = $2, updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(token_hash)
        .bind(at)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected())
    }

    /// Adds `member` to one of the id arrays unless already present.
    async fn add_member(
        &self,
        query_name: &'static str,
        column: &'static str,
        profile_id: Uuid,
        member: Uuid,
    ) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new(query_name);
        let sql = format!(
            "UPDATE profiles SET {col} = array_append({col}, $2), updated_at = $3 \
             WHERE id = $1 AND NOT ($2 = ANY({col}))",
            col = column
        );
        let result = sqlx::query(&sql)
            .bind(profile_id)
            .bind(member)
            .bind(Utc::now())
            .execute(&self.pool)
            .await;
        timer.record();
        result.map(|_| ())
    }

    /// Removes every occurrence of `member` from one of the id arrays.
    async fn remove_member(
        &self,
        query_name: &'static str,
        column: &'static str,
        profile_id: Uuid,
        member: Uuid,
    ) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new(query_name);
        let sql = format!(
            "UPDATE profiles SET {col} = array_remove({col}, $2), updated_at = $3 \
             WHERE id = $1 AND $2 = ANY({col})",
            col = column
        );
        let result = sqlx::query(&sql)
            .bind(profile_id)
            .bind(member)
            .bind(Utc::now())
            .execute(&self.pool)
            .await;
        timer.record();
        result.map(|_| ())
    }

    pub async fn add_home(&self, profile_id: Uuid, home_id: Uuid) -> Result<(), sqlx::Error> {
        self.add_member("add_home_to_profile", "home_ids", profile_id, home_id)
            .await
    }

    pub async fn remove_home(&self, profile_id: Uuid, home_id: Uuid) -> Result<(), sqlx::Error> {
        self.remove_member("remove_home_from_profile", "home_ids", profile_id, home_id)
            .await
    }

    pub async fn add_device(&self, profile_id: Uuid, device_id: Uuid) -> Result<(), sqlx::Error> {
        self.add_member("add_device_to_profile", "device_ids", profile_id, device_id)
            .await
    }

    pub async fn remove_device(
        &self,
        profile_id: Uuid,
        device_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        self.remove_member(
            "remove_device_from_profile",
            "device_ids",
            profile_id,
            device_id,
        )
        .await
    }
}
