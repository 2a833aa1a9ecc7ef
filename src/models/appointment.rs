use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub status: AppointmentStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Appointment {
    /// A fresh record with a random id, stamped `now`.
    pub fn from_new(fields: NewAppointment, now: NaiveDateTime) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: fields.title,
            description: fields.description,
            start_time: fields.start_time,
            end_time: fields.end_time,
            status: fields.status,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "completed" => AppointmentStatus::Completed,
            "cancelled" => AppointmentStatus::Cancelled,
            _ => AppointmentStatus::Scheduled,
        }
    }
}

/// Fields supplied when creating an appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAppointment {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    #[serde(default)]
    pub status: AppointmentStatus,
}

impl NewAppointment {
    pub fn validate(&self) -> anyhow::Result<()> {
        validate_fields(&self.title, &self.start_time, &self.end_time)
    }
}

/// Partial update; `None` leaves the stored value untouched and an empty
/// `description` removes it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentChanges {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub end_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub status: Option<AppointmentStatus>,
}

impl AppointmentChanges {
    pub fn reschedule(start_time: NaiveDateTime, end_time: NaiveDateTime) -> Self {
        Self {
            start_time: Some(start_time),
            end_time: Some(end_time),
            ..Self::default()
        }
    }

    pub fn apply_to(&self, appointment: &mut Appointment) {
        if let Some(title) = &self.title {
            appointment.title = title.clone();
        }
        // An empty description clears the stored one
        if let Some(description) = &self.description {
            let trimmed = description.trim();
            appointment.description = (!trimmed.is_empty()).then(|| trimmed.to_string());
        }
        if let Some(start) = self.start_time {
            appointment.start_time = start;
        }
        if let Some(end) = self.end_time {
            appointment.end_time = end;
        }
        if let Some(status) = self.status {
            appointment.status = status;
        }
    }
}

pub fn validate_appointment(appointment: &Appointment) -> anyhow::Result<()> {
    validate_fields(
        &appointment.title,
        &appointment.start_time,
        &appointment.end_time,
    )
}

fn validate_fields(
    title: &str,
    start: &NaiveDateTime,
    end: &NaiveDateTime,
) -> anyhow::Result<()> {
    if title.trim().is_empty() {
        anyhow::bail!("title is required");
    }
    if end <= start {
        anyhow::bail!("end time must be after start time");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn sample() -> Appointment {
        Appointment {
            id: "a-1".to_string(),
            title: "Client Review".to_string(),
            description: None,
            start_time: dt("2025-06-16 10:00"),
            end_time: dt("2025-06-16 10:45"),
            status: AppointmentStatus::Scheduled,
            created_at: dt("2025-06-01 09:00"),
            updated_at: dt("2025-06-01 09:00"),
        }
    }

    #[test]
    fn test_duration_minutes() {
        assert_eq!(sample().duration_minutes(), 45);
    }

    #[test]
    fn test_status_parse_defaults_to_scheduled() {
        assert_eq!(AppointmentStatus::parse("cancelled"), AppointmentStatus::Cancelled);
        assert_eq!(AppointmentStatus::parse("completed"), AppointmentStatus::Completed);
        assert_eq!(AppointmentStatus::parse("bogus"), AppointmentStatus::Scheduled);
    }

    #[test]
    fn test_new_appointment_requires_title() {
        let new = NewAppointment {
            title: "   ".to_string(),
            description: None,
            start_time: dt("2025-06-16 10:00"),
            end_time: dt("2025-06-16 11:00"),
            status: AppointmentStatus::Scheduled,
        };
        assert!(new.validate().is_err());
    }

    #[test]
    fn test_new_appointment_end_after_start() {
        let new = NewAppointment {
            title: "Standup".to_string(),
            description: None,
            start_time: dt("2025-06-16 10:00"),
            end_time: dt("2025-06-16 10:00"),
            status: AppointmentStatus::Scheduled,
        };
        let err = new.validate().unwrap_err();
        assert!(err.to_string().contains("end time must be after start time"));
    }

    #[test]
    fn test_changes_apply_only_set_fields() {
        let mut appt = sample();
        let changes = AppointmentChanges::reschedule(dt("2025-06-17 14:00"), dt("2025-06-17 14:45"));
        changes.apply_to(&mut appt);
        assert_eq!(appt.title, "Client Review");
        assert_eq!(appt.start_time, dt("2025-06-17 14:00"));
        assert_eq!(appt.duration_minutes(), 45);
        assert!(validate_appointment(&appt).is_ok());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&AppointmentStatus::Cancelled).unwrap();
        assert_eq!(json, "\"cancelled\"");
    }

    #[test]
    fn test_empty_description_clears_field() {
        let mut appt = Appointment {
            description: Some("bring slides".to_string()),
            ..sample()
        };
        let changes = AppointmentChanges {
            description: Some("  ".to_string()),
            ..AppointmentChanges::default()
        };
        changes.apply_to(&mut appt);
        assert_eq!(appt.description, None);

        AppointmentChanges::default().apply_to(&mut appt);
        assert_eq!(appt.description, None);
    }
}
