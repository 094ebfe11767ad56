#![allow(dead_code)]

//! Alert lifecycle state machine.
//!
//! Three states, all derived from the record (`Alert::status`):
//! `active` (armed: snoozes remaining, future trigger), `overdue` (snoozes
//! exhausted, trigger still pending until the caller fires or deactivates),
//! `inactive`. Transitions run a full load → validate → mutate → save
//! sequence; `AlertStore::save` is the single commit point, so an illegal
//! transition changes nothing.
//!
//! Per-alert serialization comes from the store's versioned save: a racing
//! writer turns into `ConcurrentModification`, and the whole sequence is
//! re-run from a fresh load up to `MAX_WRITE_ATTEMPTS` times. Different
//! alert ids never contend with each other.
//!
//! The clock is always the caller's `now` argument — there are no hidden
//! `Utc::now()` reads below the handlers, which keeps every transition
//! replayable in tests.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::alert::{Alert, AlertStatus};
use crate::scheduler::schedule::{self, Schedule, SchedulePayload};
use crate::scheduler::trigger::next_trigger;
use crate::store::AlertStore;

/// Write-conflict retries per transition before the conflict is surfaced.
const MAX_WRITE_ATTEMPTS: u32 = 3;

/// Inputs for `create`. The schedule part shares validation with
/// `update_schedule`.
#[derive(Debug, Clone)]
pub struct CreateAlert {
    pub user_id: Uuid,
    pub medication_id: Uuid,
    pub schedule: SchedulePayload,
}

/// Creates an alert: validated schedule, `current_snoozes = 0`, the first
/// trigger computed from creation time. Newborn alerts are active (or
/// immediately overdue when `max_snoozes` is 0).
pub async fn create(
    store: &dyn AlertStore,
    params: CreateAlert,
    now: DateTime<Utc>,
) -> Result<Alert, AppError> {
    let schedule = schedule::validate(&params.schedule)?;
    let first_trigger = next_trigger(&schedule, now)?;

    store
        .save(Alert {
            id: Uuid::new_v4(),
            user_id: params.user_id,
            medication_id: params.medication_id,
            time: schedule.time,
            frequency: schedule.frequency,
            days_of_week: schedule.days_of_week,
            is_active: true,
            last_triggered: None,
            next_trigger: Some(first_trigger),
            snooze_minutes: schedule.snooze_minutes,
            max_snoozes: schedule.max_snoozes,
            current_snoozes: 0,
            version: 0,
            created_at: now,
            updated_at: now,
        })
        .await
}

/// The reminder went off: stamp `last_triggered`, reset the snooze counter,
/// and schedule the next occurrence. Legal from `active` and `overdue` —
/// firing is how an overdue alert gets back to armed. Whether the user
/// actually took the dose is the report collaborator's business, not ours.
pub async fn fire(
    store: &dyn AlertStore,
    id: Uuid,
    now: DateTime<Utc>,
) -> Result<Alert, AppError> {
    apply(store, id, |mut alert| {
        match alert.status() {
            AlertStatus::Inactive => Err(AppError::InvalidTransition {
                current: AlertStatus::Inactive,
                transition: "fire",
            }),
            AlertStatus::Active | AlertStatus::Overdue => {
                alert.last_triggered = Some(now);
                alert.current_snoozes = 0;
                alert.next_trigger = Some(next_trigger(&Schedule::from(&alert), now)?);
                Ok(alert)
            }
        }
    })
    .await
}

/// Defers the pending trigger by the configured snooze duration, counted
/// from this call's `now` — repeated snoozes therefore drift forward
/// relative to the original slot. Reaching `max_snoozes` leaves the alert
/// overdue; snoozing an overdue alert fails with the distinct snooze-limit
/// error so clients can offer "mark taken" instead.
pub async fn snooze(
    store: &dyn AlertStore,
    id: Uuid,
    now: DateTime<Utc>,
) -> Result<Alert, AppError> {
    apply(store, id, |mut alert| {
        match alert.status() {
            AlertStatus::Inactive => Err(AppError::InvalidTransition {
                current: AlertStatus::Inactive,
                transition: "snooze",
            }),
            AlertStatus::Overdue => Err(AppError::SnoozeLimitExceeded {
                max: alert.max_snoozes,
            }),
            AlertStatus::Active => {
                alert.current_snoozes += 1;
                alert.next_trigger = Some(now + Duration::minutes(alert.snooze_minutes as i64));
                Ok(alert)
            }
        }
    })
    .await
}

/// Turns the alert off and clears its pending trigger. Legal from any
/// state, including `inactive` (a no-op there, but still persisted).
pub async fn deactivate(store: &dyn AlertStore, id: Uuid) -> Result<Alert, AppError> {
    apply(store, id, |mut alert| {
        alert.is_active = false;
        alert.next_trigger = None;
        Ok(alert)
    })
    .await
}

/// Brings an inactive alert back: snooze counter reset, fresh trigger from
/// `now`. Reactivating an alert that is already on is a conflict, not a
/// silent reset.
pub async fn reactivate(
    store: &dyn AlertStore,
    id: Uuid,
    now: DateTime<Utc>,
) -> Result<Alert, AppError> {
    apply(store, id, |mut alert| {
        let current = alert.status();
        if current != AlertStatus::Inactive {
            return Err(AppError::InvalidTransition {
                current,
                transition: "reactivate",
            });
        }
        alert.is_active = true;
        alert.current_snoozes = 0;
        alert.next_trigger = Some(next_trigger(&Schedule::from(&alert), now)?);
        Ok(alert)
    })
    .await
}

/// Replaces the schedule fields. Legal from any state. The next trigger is
/// recomputed from `now` only while the alert is active; inactive alerts
/// keep their trigger unset until reactivation. The snooze counter is
/// preserved — changing *when* an alert fires doesn't refund snoozes —
/// but clamped so it never exceeds a lowered `max_snoozes`.
pub async fn update_schedule(
    store: &dyn AlertStore,
    id: Uuid,
    payload: SchedulePayload,
    now: DateTime<Utc>,
) -> Result<Alert, AppError> {
    let schedule = schedule::validate(&payload)?;
    apply(store, id, move |mut alert| {
        alert.time = schedule.time;
        alert.frequency = schedule.frequency;
        alert.days_of_week = schedule.days_of_week.clone();
        alert.snooze_minutes = schedule.snooze_minutes;
        alert.max_snoozes = schedule.max_snoozes;
        alert.current_snoozes = alert.current_snoozes.min(schedule.max_snoozes);
        alert.next_trigger = if alert.is_active {
            Some(next_trigger(&Schedule::from(&alert), now)?)
        } else {
            None
        };
        Ok(alert)
    })
    .await
}

/// Runs one load → validate/mutate → save sequence, re-running it from a
/// fresh load when the save loses a version race. Only the conflict error
/// is retried; everything else (including `NotFound` on load) propagates
/// immediately.
async fn apply<F>(store: &dyn AlertStore, id: Uuid, mutate: F) -> Result<Alert, AppError>
where
    F: Fn(Alert) -> Result<Alert, AppError>,
{
    let mut attempt = 1;
    loop {
        let alert = store.load(id).await?;
        let updated = mutate(alert)?;
        match store.save(updated).await {
            Ok(saved) => return Ok(saved),
            Err(AppError::ConcurrentModification(_)) if attempt < MAX_WRITE_ATTEMPTS => {
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
