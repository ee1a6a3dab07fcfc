//! Home repository for database operations.
//!
//! Rooms are embedded in the home row as a JSONB array. Every room mutation is
//! a single `UPDATE` that rebuilds the array in place, preserving room order
//! through `WITH ORDINALITY`. Ids inside the JSON are lowercase hyphenated
//! strings, so they are bound as text.

use chrono::{DateTime, Utc};
use domain::models::{Home, Room};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::HomeEntity;
use crate::metrics::QueryTimer;

/// Repository for home-related database operations.
#[derive(Clone)]
pub struct HomeRepository {
    pool: PgPool,
}

impl HomeRepository {
    /// Creates a new HomeRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<HomeEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_home");
        let result = sqlx::query_as::<_, HomeEntity>(
            r#"
            SELECT id, name, location, rooms, created_at, updated_at
            FROM homes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<HomeEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_homes");
        let result = sqlx::query_as::<_, HomeEntity>(
            r#"
            SELECT id, name, location, rooms, created_at, updated_at
            FROM homes
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

    pub async fn insert(&self, home: &Home) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("insert_home");
        let result = sqlx::query(
            r#"
            INSERT INTO homes (id, name, location, rooms, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(home.id)
        .bind(&home.name)
        .bind(&home.location)
        .bind(Json(&home.rooms))
        .bind(home.created_at)
        .bind(home.updated_at)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|_| ())
    }

    /// Returns the number of rows affected (0 if home not found).
    pub async fn update_fields(
        &self,
        id: Uuid,
        name: &str,
        location: &str,
        at: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("update_home_fields");
        let result = sqlx::query(
            r#"
            UPDATE homes
            SET name = $2, location = $3, updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(location)
        .bind(at)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected())
    }

    /// Returns the number of rows affected (0 if home not found).
    pub async fn delete(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_home");
        let result = sqlx::query("DELETE FROM homes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected())
    }

    /// Appends a room. Returns the number of rows affected.
    pub async fn push_room(&self, home_id: Uuid, room: &Room) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("push_room");
        let result = sqlx::query(
            r#"
            UPDATE homes
            SET rooms = rooms || jsonb_build_array($2::jsonb),
                updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(home_id)
        .bind(Json(room))
        .bind(room.created_at)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected())
    }

    /// Merges name, floor and timestamp into one room. Returns the number of
    /// rows affected (0 if the home or the room is missing).
    pub async fn update_room_fields(
        &self,
        home_id: Uuid,
        room_id: Uuid,
        name: &str,
        floor: i32,
        at: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("update_room_fields");
        let result = sqlx::query(
            r#"
            UPDATE homes
            SET rooms = (
                    SELECT jsonb_agg(
                        CASE WHEN r.room->>'id' = $2
                             THEN r.room || jsonb_build_object(
                                      'name', $3::text,
                                      'floor', $4::int,
                                      'updatedAt', $5::jsonb)
                             ELSE r.room
                        END
                        ORDER BY r.ord)
                    FROM jsonb_array_elements(homes.rooms) WITH ORDINALITY AS r(room, ord)
                ),
                updated_at = $6
            WHERE id = $1
              AND rooms @> jsonb_build_array(jsonb_build_object('id', $2::text))
            "#,
        )
        .bind(home_id)
        .bind(room_id.to_string())
        .bind(name)
        .bind(floor)
        .bind(Json(at))
        .bind(at)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected())
    }

    /// Drops one room and its placements. Returns the number of rows
    /// affected (0 if the home or the room is missing).
    pub async fn remove_room(
        &self,
        home_id: Uuid,
        room_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("remove_room");
        let result = sqlx::query(
            r#"
            UPDATE homes
            SET rooms = (
                    SELECT COALESCE(jsonb_agg(r.room ORDER BY r.ord), '[]'::jsonb)
                    FROM jsonb_array_elements(homes.rooms) WITH ORDINALITY AS r(room, ord)
                    WHERE r.room->>'id' <> $2
                ),
                updated_at = $3
            WHERE id = $1
              AND rooms @> jsonb_build_array(jsonb_build_object('id', $2::text))
            "#,
        )
        .bind(home_id)
        .bind(room_id.to_string())
        .bind(at)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected())
    }

    /// Removes a device id from every room of the listed homes.
    ///
    /// Only rows that actually contain the device are rewritten; each row is
    /// updated atomically on its own.
    pub async fn pull_device_from_rooms(
        &self,
        home_ids: &[Uuid],
        device_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("pull_device_from_rooms");
        let result = sqlx::query(
            r#"
            UPDATE homes
            SET rooms = (
                SELECT jsonb_agg(
                    CASE WHEN COALESCE(r.room->'devices', '[]'::jsonb) @> to_jsonb($2::text)
                         THEN jsonb_set(r.room, '{devices}', (
                                  SELECT COALESCE(jsonb_agg(d.value ORDER BY d.ord), '[]'::jsonb)
                                  FROM jsonb_array_elements(r.room->'devices')
                                       WITH ORDINALITY AS d(value, ord)
                                  WHERE d.value <> to_jsonb($2::text)))
                         ELSE r.room
                    END
                    ORDER BY r.ord)
                FROM jsonb_array_elements(homes.rooms) WITH ORDINALITY AS r(room, ord)
            )
            WHERE id = ANY($1)
              AND rooms @> jsonb_build_array(
                      jsonb_build_object('devices', jsonb_build_array($2::text)))
            "#,
        )
        .bind(home_ids)
        .bind(device_id.to_string())
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected())
    }

    /// Adds a device id to one room's set if absent and refreshes the room
    /// and home timestamps. Returns the number of rows affected (0 if the
    /// home or the room is missing).
    pub async fn add_device_to_room(
        &self,
        home_id: Uuid,
        room_id: Uuid,
        device_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("add_device_to_room");
        let result = sqlx::query(
            r#"
            UPDATE homes
            SET rooms = (
                    SELECT jsonb_agg(
                        CASE WHEN r.room->>'id' = $2
                             THEN r.room || jsonb_build_object(
                                      'devices',
                                      CASE WHEN COALESCE(r.room->'devices', '[]'::jsonb)
                                                @> to_jsonb($3::text)
                                           THEN COALESCE(r.room->'devices', '[]'::jsonb)
                                           ELSE COALESCE(r.room->'devices', '[]'::jsonb)
                                                || to_jsonb($3::text)
                                      END,
                                      'updatedAt', $4::jsonb)
                             ELSE r.room
                        END
                        ORDER BY r.ord)
                    FROM jsonb_array_elements(homes.rooms) WITH ORDINALITY AS r(room, ord)
                ),
                updated_at = $5
            WHERE id = $1
              AND rooms @> jsonb_build_array(jsonb_build_object('id', $2::text))
            "#,
        )
        .bind(home_id)
        .bind(room_id.to_string())
        .bind(device_id.to_string())
        .bind(Json(at))
        .bind(at)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected())
    }
}
