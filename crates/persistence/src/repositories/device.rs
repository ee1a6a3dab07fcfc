//! Device repository for database operations.

use domain::models::Device;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::DeviceEntity;
use crate::metrics::QueryTimer;

/// Repository for device-related database operations.
#[derive(Clone)]
pub struct DeviceRepository {
    pool: PgPool,
}

impl DeviceRepository {
    /// Creates a new DeviceRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a device by its UUID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<DeviceEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_device");
        let result = sqlx::query_as::<_, DeviceEntity>(
            r#"
            SELECT id, mac, manufacturer, model, features, created_at, updated_at
            FROM devices
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a device by its normalized MAC address.
    pub async fn find_by_mac(&self, mac: &str) -> Result<Option<DeviceEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_device_by_mac");
        let result = sqlx::query_as::<_, DeviceEntity>(
            r#"
            SELECT id, mac, manufacturer, model, features, created_at, updated_at
            FROM devices
            WHERE mac = $1
            "#,
        )
        .bind(mac)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<DeviceEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_devices");
        let result = sqlx::query_as::<_, DeviceEntity>(
            r#"
            SELECT id, mac, manufacturer, model, features, created_at, updated_at
            FROM devices
            WHERE id = ANY($1)
            ORDER BY created_at, id
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Insert a device. A MAC collision surfaces as a unique violation.
    pub async fn insert(&self, device: &Device) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("insert_device");
        let result = sqlx::query(
            r#"
            INSERT INTO devices (id, mac, manufacturer, model, features, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(device.id)
        .bind(&device.mac)
        .bind(&device.manufacturer)
        .bind(&device.model)
        .bind(Json(&device.features))
        .bind(device.created_at)
        .bind(device.updated_at)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|_| ())
    }

    /// Returns the number of rows affected (0 if device not found).
    pub async fn delete(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_device");
        let result = sqlx::query("DELETE FROM devices WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected())
    }
}
