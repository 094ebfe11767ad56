// Reminder Scheduling Engine.
// Implements: schedule validation, pure next-trigger computation, and the
// alert lifecycle state machine. Handlers are a thin HTTP shell — all
// scheduling decisions live in schedule/trigger/lifecycle.

pub mod handlers;
pub mod lifecycle;
pub mod schedule;
pub mod trigger;
