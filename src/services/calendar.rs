use chrono::NaiveDateTime;

use crate::models::{Appointment, AppointmentStatus};

const PRODID: &str = "-//Appointment Agent//Voice Assistant//EN";

pub fn generate_ics(appointment: &Appointment) -> String {
    wrap_calendar(&vevent(appointment))
}

/// One calendar holding every given appointment, in order.
pub fn generate_feed(appointments: &[Appointment]) -> String {
    let events: String = appointments.iter().map(vevent).collect();
    wrap_calendar(&events)
}

fn wrap_calendar(events: &str) -> String {
    format!(
        "BEGIN:VCALENDAR\r\n\
         VERSION:2.0\r\n\
         PRODID:{PRODID}\r\n\
         CALSCALE:GREGORIAN\r\n\
         {events}\
         END:VCALENDAR\r\n"
    )
}

fn vevent(appointment: &Appointment) -> String {
    let uid = format!("{}@appointment-agent", appointment.id);
    // created_at is stamped in UTC
    let dtstamp = format!("{}Z", ics_timestamp(&appointment.created_at));
    let dtstart = ics_timestamp(&appointment.start_time);
    let dtend = ics_timestamp(&appointment.end_time);
    let summary = escape_text(&appointment.title);
    let description = escape_text(
        appointment
            .description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or("No additional notes"),
    );
    let status = match appointment.status {
        AppointmentStatus::Cancelled => "CANCELLED",
        _ => "CONFIRMED",
    };

    format!(
        "BEGIN:VEVENT\r\n\
         UID:{uid}\r\n\
         DTSTAMP:{dtstamp}\r\n\
         DTSTART:{dtstart}\r\n\
         DTEND:{dtend}\r\n\
         SUMMARY:{summary}\r\n\
         DESCRIPTION:{description}\r\n\
         STATUS:{status}\r\n\
         END:VEVENT\r\n"
    )
}

fn ics_timestamp(ts: &NaiveDateTime) -> String {
    ts.format("%Y%m%dT%H%M%S").to_string()
}

// RFC 5545 TEXT escaping
fn escape_text(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace("\r\n", "\\n")
        .replace('\n', "\\n")
}
