#![allow(dead_code)]

//! In-memory `AlertStore` with the same versioning discipline as the
//! Postgres adapter. Used by the lifecycle tests and handy for local runs
//! without a database.

use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::alert::Alert;
use crate::store::AlertStore;

#[derive(Default)]
pub struct MemoryAlertStore {
    alerts: RwLock<HashMap<Uuid, Alert>>,
}

impl MemoryAlertStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AlertStore for MemoryAlertStore {
    async fn load(&self, id: Uuid) -> Result<Alert, AppError> {
        let alerts = self
            .alerts
            .read()
            .map_err(|_| anyhow!("alert store lock poisoned"))?;
        alerts
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Alert {id} not found")))
    }

    async fn save(&self, mut alert: Alert) -> Result<Alert, AppError> {
        let mut alerts = self
            .alerts
            .write()
            .map_err(|_| anyhow!("alert store lock poisoned"))?;

        match alerts.get(&alert.id) {
            None if alert.version == 0 => {}
            // Deleted between load and save; retrying won't help the caller.
            None => return Err(AppError::NotFound(format!("Alert {} not found", alert.id))),
            Some(existing) if existing.version == alert.version => {}
            Some(existing) => {
                return Err(AppError::ConcurrentModification(format!(
                    "Alert {} was modified by another writer (expected version {}, found {})",
                    alert.id, alert.version, existing.version
                )));
            }
        }

        alert.version += 1;
        alert.updated_at = Utc::now();
        alerts.insert(alert.id, alert.clone());
        Ok(alert)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::alert::Frequency;
    use chrono::NaiveTime;
    use std::collections::BTreeSet;

    fn fresh_alert() -> Alert {
        let now = Utc::now();
        Alert {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            medication_id: Uuid::new_v4(),
            time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            frequency: Frequency::Daily,
            days_of_week: BTreeSet::new(),
            is_active: true,
            last_triggered: None,
            next_trigger: Some(now),
            snooze_minutes: 15,
            max_snoozes: 3,
            current_snoozes: 0,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_version_one() {
        let store = MemoryAlertStore::new();
        let saved = store.save(fresh_alert()).await.unwrap();
        assert_eq!(saved.version, 1);
        let loaded = store.load(saved.id).await.unwrap();
        assert_eq!(loaded.version, 1);
    }

    #[tokio::test]
    async fn test_load_unknown_id_is_not_found() {
        let store = MemoryAlertStore::new();
        let err = store.load(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_matching_version_updates_and_bumps() {
        let store = MemoryAlertStore::new();
        let mut saved = store.save(fresh_alert()).await.unwrap();
        saved.current_snoozes = 1;
        let again = store.save(saved).await.unwrap();
        assert_eq!(again.version, 2);
        assert_eq!(store.load(again.id).await.unwrap().current_snoozes, 1);
    }

    #[tokio::test]
    async fn test_stale_version_conflicts() {
        let store = MemoryAlertStore::new();
        let saved = store.save(fresh_alert()).await.unwrap();

        // Two writers load the same version; the second save must lose.
        let mut first = saved.clone();
        first.current_snoozes = 1;
        store.save(first).await.unwrap();

        let mut second = saved;
        second.current_snoozes = 2;
        let err = store.save(second).await.unwrap_err();
        assert!(matches!(err, AppError::ConcurrentModification(_)));
    }

    #[tokio::test]
    async fn test_save_after_delete_is_not_found() {
        let store = MemoryAlertStore::new();
        let mut saved = store.save(fresh_alert()).await.unwrap();
        store.alerts.write().unwrap().remove(&saved.id);
        saved.current_snoozes = 1;
        let err = store.save(saved).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
