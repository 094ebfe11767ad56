#![allow(dead_code)]

//! Postgres-backed `AlertStore`.
//!
//! Optimistic locking: the `version` column is compared in the UPDATE's
//! WHERE clause, so a racing writer makes the statement touch zero rows and
//! the loser gets `ConcurrentModification` instead of silently overwriting.
//! See `schema.sql` for the table definition.

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::alert::Alert;
use crate::store::AlertStore;

pub struct PgAlertStore {
    pool: PgPool,
}

impl PgAlertStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Raw row shape. Enums travel as TEXT / TEXT[] and are parsed on the way
/// out so the domain model never leaks into the schema.
#[derive(Debug, FromRow)]
struct AlertRow {
    id: Uuid,
    user_id: Uuid,
    medication_id: Uuid,
    time: NaiveTime,
    frequency: String,
    days_of_week: Vec<String>,
    is_active: bool,
    last_triggered: Option<DateTime<Utc>>,
    next_trigger: Option<DateTime<Utc>>,
    snooze_minutes: i32,
    max_snoozes: i32,
    current_snoozes: i32,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AlertRow> for Alert {
    type Error = AppError;

    fn try_from(row: AlertRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let frequency = row
            .frequency
            .parse()
            .map_err(|e| anyhow!("alert {id}: {e}"))?;
        let days_of_week = row
            .days_of_week
            .iter()
            .map(|day| day.parse().map_err(|e| anyhow!("alert {id}: {e}")))
            .collect::<Result<_, _>>()?;
        let counter = |value: i32, field: &str| {
            u32::try_from(value).map_err(|_| anyhow!("alert {id}: negative {field} ({value})"))
        };

        Ok(Alert {
            id,
            user_id: row.user_id,
            medication_id: row.medication_id,
            time: row.time,
            frequency,
            days_of_week,
            is_active: row.is_active,
            last_triggered: row.last_triggered,
            next_trigger: row.next_trigger,
            snooze_minutes: counter(row.snooze_minutes, "snooze_minutes")?,
            max_snoozes: counter(row.max_snoozes, "max_snoozes")?,
            current_snoozes: counter(row.current_snoozes, "current_snoozes")?,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn days_to_text(alert: &Alert) -> Vec<String> {
    alert
        .days_of_week
        .iter()
        .map(|day| day.as_str().to_string())
        .collect()
}

#[async_trait]
impl AlertStore for PgAlertStore {
    async fn load(&self, id: Uuid) -> Result<Alert, AppError> {
        let row: Option<AlertRow> = sqlx::query_as("SELECT * FROM alerts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.ok_or_else(|| AppError::NotFound(format!("Alert {id} not found")))?
            .try_into()
    }

    async fn save(&self, alert: Alert) -> Result<Alert, AppError> {
        if alert.version == 0 {
            let row: AlertRow = sqlx::query_as(
                r#"
                INSERT INTO alerts
                    (id, user_id, medication_id, time, frequency, days_of_week,
                     is_active, last_triggered, next_trigger,
                     snooze_minutes, max_snoozes, current_snoozes, version)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, 1)
                RETURNING *
                "#,
            )
            .bind(alert.id)
            .bind(alert.user_id)
            .bind(alert.medication_id)
            .bind(alert.time)
            .bind(alert.frequency.as_str())
            .bind(days_to_text(&alert))
            .bind(alert.is_active)
            .bind(alert.last_triggered)
            .bind(alert.next_trigger)
            .bind(alert.snooze_minutes as i32)
            .bind(alert.max_snoozes as i32)
            .bind(alert.current_snoozes as i32)
            .fetch_one(&self.pool)
            .await?;
            return row.try_into();
        }

        let updated: Option<AlertRow> = sqlx::query_as(
            r#"
            UPDATE alerts SET
                time = $3,
                frequency = $4,
                days_of_week = $5,
                is_active = $6,
                last_triggered = $7,
                next_trigger = $8,
                snooze_minutes = $9,
                max_snoozes = $10,
                current_snoozes = $11,
                version = version + 1,
                updated_at = now()
            WHERE id = $1 AND version = $2
            RETURNING *
            "#,
        )
        .bind(alert.id)
        .bind(alert.version)
        .bind(alert.time)
        .bind(alert.frequency.as_str())
        .bind(days_to_text(&alert))
        .bind(alert.is_active)
        .bind(alert.last_triggered)
        .bind(alert.next_trigger)
        .bind(alert.snooze_minutes as i32)
        .bind(alert.max_snoozes as i32)
        .bind(alert.current_snoozes as i32)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(row) => row.try_into(),
            None => {
                // Zero rows: either the version moved under us or the record
                // is gone. Tell the caller which.
                let exists: bool =
                    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM alerts WHERE id = $1)")
                        .bind(alert.id)
                        .fetch_one(&self.pool)
                        .await?;
                if exists {
                    Err(AppError::ConcurrentModification(format!(
                        "Alert {} was modified by another writer (version {} is stale)",
                        alert.id, alert.version
                    )))
                } else {
                    Err(AppError::NotFound(format!("Alert {} not found", alert.id)))
                }
            }
        }
    }
}
