//! Executes a [`Command`] against an [`AppointmentStore`] and phrases the
//! outcome as a reply for the user.
//!
//! Missing or unusable slots turn into a clarifying question with no store
//! call. Store failures are logged and answered with an apology; they are
//! never retried here.

use chrono::{Duration, NaiveDateTime};

use crate::models::{Appointment, AppointmentChanges, Command, Intent, NewAppointment, SlotSet};
use crate::services::store::AppointmentStore;

use super::resolver::{self, ResolveError};
use super::rules::DEFAULT_DURATION_MINUTES;

pub const ASK_WHEN_TO_SCHEDULE: &str =
    "I need a date and time for the appointment. When would you like to schedule it?";
pub const ASK_FOR_TITLE: &str = "What would you like to title this appointment?";
pub const ASK_WHICH_TO_RESCHEDULE: &str =
    "I couldn't find that appointment. Could you specify which appointment you'd like to reschedule?";
pub const ASK_WHEN_TO_RESCHEDULE: &str = "When would you like to reschedule it to?";
pub const ASK_WHICH_TO_CANCEL: &str =
    "I couldn't find that appointment. Which appointment would you like to cancel?";
pub const ASK_FOR_VALID_DATE: &str =
    "I couldn't understand that date. Could you say it another way, like \"tomorrow\" or \"next Friday\"?";
pub const ASK_FOR_VALID_TIME: &str =
    "I couldn't understand that time. Could you say it another way, like \"3pm\" or \"15:30\"?";
pub const NO_UPCOMING: &str = "You have no upcoming appointments.";
pub const APOLOGY: &str =
    "Sorry, I encountered an error processing your request. Please try again.";

/// Run `command` and return the reply text. Never fails: every outcome,
/// including store errors, is a conversational reply.
pub async fn dispatch(command: Command, store: &dyn AppointmentStore, now: NaiveDateTime) -> String {
    let intent = command.intent;
    let result = match intent {
        Intent::Schedule => schedule(command.parameters, store, now).await,
        Intent::Reschedule => reschedule(command.parameters, store, now).await,
        Intent::Cancel => cancel(command.parameters, store).await,
        Intent::Query => query(store, now).await,
    };

    result.unwrap_or_else(|e| {
        let detail = format!("{e:#}");
        tracing::error!(error = %detail, intent = intent.as_str(), "command processing failed");
        APOLOGY.to_string()
    })
}

async fn schedule(
    slots: SlotSet,
    store: &dyn AppointmentStore,
    now: NaiveDateTime,
) -> anyhow::Result<String> {
    let start = match resolve_start(&slots, now) {
        Ok(Some(start)) => start,
        Ok(None) => return Ok(ASK_WHEN_TO_SCHEDULE.to_string()),
        Err(e) => return Ok(clarify_resolve_error(&e)),
    };

    let Some(title) = slots.title else {
        return Ok(ASK_FOR_TITLE.to_string());
    };

    let duration = slots.duration.unwrap_or(DEFAULT_DURATION_MINUTES);
    let end = start + Duration::minutes(i64::from(duration));

    let created = store
        .create(NewAppointment {
            title,
            description: slots.description,
            start_time: start,
            end_time: end,
            status: Default::default(),
        })
        .await?;

    tracing::info!(id = %created.id, start = %created.start_time, "appointment scheduled");
    Ok(format!(
        "I've scheduled \"{}\" for {}.",
        created.title,
        format_when(&start)
    ))
}

async fn reschedule(
    slots: SlotSet,
    store: &dyn AppointmentStore,
    now: NaiveDateTime,
) -> anyhow::Result<String> {
    let appointments = store.list().await?;
    let Some(existing) = find_by_title(&appointments, slots.title.as_deref()) else {
        return Ok(ASK_WHICH_TO_RESCHEDULE.to_string());
    };

    let start = match resolve_start(&slots, now) {
        Ok(Some(start)) => start,
        Ok(None) => return Ok(ASK_WHEN_TO_RESCHEDULE.to_string()),
        Err(e) => return Ok(clarify_resolve_error(&e)),
    };

    let duration = slots
        .duration
        .map(i64::from)
        .unwrap_or_else(|| existing.duration_minutes());
    let end = start + Duration::minutes(duration);

    store
        .update(&existing.id, AppointmentChanges::reschedule(start, end))
        .await?;

    tracing::info!(id = %existing.id, start = %start, "appointment rescheduled");
    Ok(format!(
        "I've rescheduled \"{}\" to {}.",
        existing.title,
        format_when(&start)
    ))
}

async fn cancel(slots: SlotSet, store: &dyn AppointmentStore) -> anyhow::Result<String> {
    let appointments = store.list().await?;
    let Some(existing) = find_by_title(&appointments, slots.title.as_deref()) else {
        return Ok(ASK_WHICH_TO_CANCEL.to_string());
    };

    store.delete(&existing.id).await?;

    tracing::info!(id = %existing.id, "appointment cancelled");
    Ok(format!(
        "I've cancelled your appointment \"{}\".",
        existing.title
    ))
}

async fn query(store: &dyn AppointmentStore, now: NaiveDateTime) -> anyhow::Result<String> {
    let mut upcoming: Vec<Appointment> = store
        .list()
        .await?
        .into_iter()
        .filter(|a| a.start_time > now)
        .collect();
    upcoming.sort_by_key(|a| a.start_time);

    let Some(next) = upcoming.first() else {
        return Ok(NO_UPCOMING.to_string());
    };

    let count = upcoming.len();
    Ok(format!(
        "Your next appointment is \"{}\" on {}.\nYou have {} upcoming appointment{} in total.",
        next.title,
        format_when(&next.start_time),
        count,
        if count == 1 { "" } else { "s" }
    ))
}

fn resolve_start(
    slots: &SlotSet,
    now: NaiveDateTime,
) -> Result<Option<NaiveDateTime>, ResolveError> {
    resolver::resolve(slots.date.as_deref(), slots.time.as_deref(), now)
}

fn clarify_resolve_error(error: &ResolveError) -> String {
    tracing::warn!(error = %error, "could not resolve requested time");
    match error {
        ResolveError::InvalidDate(_) => ASK_FOR_VALID_DATE.to_string(),
        ResolveError::InvalidTime(_) => ASK_FOR_VALID_TIME.to_string(),
    }
}

/// First appointment, in store order, whose title contains `title`
/// case-insensitively. A missing or blank title matches nothing.
pub fn find_by_title<'a>(appointments: &'a [Appointment], title: Option<&str>) -> Option<&'a Appointment> {
    let needle = title.map(str::trim).filter(|t| !t.is_empty())?.to_lowercase();
    appointments
        .iter()
        .find(|a| a.title.to_lowercase().contains(&needle))
}

/// en-US style local rendering, e.g. `6/19/2025, 3:00:00 PM`.
pub fn format_when(when: &NaiveDateTime) -> String {
    when.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}
