#![allow(dead_code)]

//! Schedule payload validation.
//!
//! Turns an untrusted `SchedulePayload` into a validated `Schedule`. Every
//! rejection is a field-level `Validation` error, except an empty day set on
//! a `custom` frequency, which gets its own `InvalidSchedule` error.

use std::collections::BTreeSet;

use chrono::NaiveTime;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::alert::{Alert, DayOfWeek, Frequency};

pub const MIN_SNOOZE_MINUTES: u32 = 1;
pub const MAX_SNOOZE_MINUTES: u32 = 60;
pub const MAX_MAX_SNOOZES: u32 = 10;

/// Schedule fields as submitted by the client (create or update).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulePayload {
    /// `"HH:MM"`, 24-hour.
    pub time: String,
    pub frequency: Frequency,
    #[serde(default)]
    pub days_of_week: BTreeSet<DayOfWeek>,
    pub snooze_minutes: u32,
    pub max_snoozes: u32,
}

/// A validated schedule, ready for trigger computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub time: NaiveTime,
    pub frequency: Frequency,
    pub days_of_week: BTreeSet<DayOfWeek>,
    pub snooze_minutes: u32,
    pub max_snoozes: u32,
}

impl From<&Alert> for Schedule {
    fn from(alert: &Alert) -> Self {
        Schedule {
            time: alert.time,
            frequency: alert.frequency,
            days_of_week: alert.days_of_week.clone(),
            snooze_minutes: alert.snooze_minutes,
            max_snoozes: alert.max_snoozes,
        }
    }
}

/// Validates a submitted schedule. Same rules on create and update.
pub fn validate(payload: &SchedulePayload) -> Result<Schedule, AppError> {
    let time = parse_time_of_day(&payload.time)?;

    if !(MIN_SNOOZE_MINUTES..=MAX_SNOOZE_MINUTES).contains(&payload.snooze_minutes) {
        return Err(AppError::Validation(format!(
            "snoozeMinutes must be between {MIN_SNOOZE_MINUTES} and {MAX_SNOOZE_MINUTES}, got {}",
            payload.snooze_minutes
        )));
    }

    if payload.max_snoozes > MAX_MAX_SNOOZES {
        return Err(AppError::Validation(format!(
            "maxSnoozes must be between 0 and {MAX_MAX_SNOOZES}, got {}",
            payload.max_snoozes
        )));
    }

    if payload.frequency == Frequency::Custom && payload.days_of_week.is_empty() {
        return Err(AppError::InvalidSchedule(
            "custom frequency requires at least one day in daysOfWeek".to_string(),
        ));
    }

    Ok(Schedule {
        time,
        frequency: payload.frequency,
        // Non-custom frequencies carry the set along but never consult it.
        days_of_week: payload.days_of_week.clone(),
        snooze_minutes: payload.snooze_minutes,
        max_snoozes: payload.max_snoozes,
    })
}

/// Strict `"HH:MM"` parse. Seconds, 12-hour forms, and out-of-range
/// components are all rejected.
pub fn parse_time_of_day(raw: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .map_err(|_| AppError::Validation(format!("time '{raw}' is not a valid HH:MM value")))
}
