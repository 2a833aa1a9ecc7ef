use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, Connection};

use crate::models::{Appointment, AppointmentChanges, AppointmentStatus};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const APPOINTMENT_COLUMNS: &str =
    "id, title, description, start_time, end_time, status, created_at, updated_at";

// ── Appointments ──

pub fn create_appointment(conn: &Connection, appointment: &Appointment) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO appointments (id, title, description, start_time, end_time, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            appointment.id,
            appointment.title,
            appointment.description,
            format_ts(&appointment.start_time),
            format_ts(&appointment.end_time),
            appointment.status.as_str(),
            format_ts(&appointment.created_at),
            format_ts(&appointment.updated_at),
        ],
    )?;
    Ok(())
}

/// All appointments, earliest start first.
pub fn list_appointments(conn: &Connection) -> anyhow::Result<Vec<Appointment>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments ORDER BY start_time ASC, rowid ASC"
    ))?;

    let rows = stmt.query_map([], |row| Ok(parse_appointment_row(row)))?;

    let mut appointments = vec![];
    for row in rows {
        appointments.push(row??);
    }
    Ok(appointments)
}

/// Non-cancelled appointments, earliest start first.
pub fn list_active_appointments(conn: &Connection) -> anyhow::Result<Vec<Appointment>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE status != 'cancelled' ORDER BY start_time ASC, rowid ASC"
    ))?;

    let rows = stmt.query_map([], |row| Ok(parse_appointment_row(row)))?;

    let mut appointments = vec![];
    for row in rows {
        appointments.push(row??);
    }
    Ok(appointments)
}

pub fn get_appointment_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Appointment>> {
    let result = conn.query_row(
        &format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = ?1"),
        params![id],
        |row| Ok(parse_appointment_row(row)),
    );

    match result {
        Ok(appointment) => Ok(Some(appointment?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Applies `changes` and returns the stored record, or `None` for an unknown id.
pub fn update_appointment(
    conn: &Connection,
    id: &str,
    changes: &AppointmentChanges,
) -> anyhow::Result<Option<Appointment>> {
    let Some(mut appointment) = get_appointment_by_id(conn, id)? else {
        return Ok(None);
    };

    changes.apply_to(&mut appointment);
    appointment.updated_at = Utc::now().naive_utc();

    conn.execute(
        "UPDATE appointments SET title = ?1, description = ?2, start_time = ?3, end_time = ?4, status = ?5, updated_at = ?6
         WHERE id = ?7",
        params![
            appointment.title,
            appointment.description,
            format_ts(&appointment.start_time),
            format_ts(&appointment.end_time),
            appointment.status.as_str(),
            format_ts(&appointment.updated_at),
            id,
        ],
    )?;

    Ok(Some(appointment))
}

pub fn delete_appointment(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM appointments WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

pub fn count_upcoming(conn: &Connection, now: &NaiveDateTime) -> anyhow::Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM appointments WHERE start_time > ?1 AND status = 'scheduled'",
        params![format_ts(now)],
        |row| row.get(0),
    )?;
    Ok(count)
}

fn format_ts(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

fn parse_ts(s: &str) -> anyhow::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .map_err(|e| anyhow::anyhow!("invalid timestamp {s:?}: {e}"))
}

fn parse_appointment_row(row: &rusqlite::Row) -> anyhow::Result<Appointment> {
    let id: String = row.get(0)?;
    let title: String = row.get(1)?;
    let description: Option<String> = row.get(2)?;
    let start_time_str: String = row.get(3)?;
    let end_time_str: String = row.get(4)?;
    let status_str: String = row.get(5)?;
    let created_at_str: String = row.get(6)?;
    let updated_at_str: String = row.get(7)?;

    Ok(Appointment {
        id,
        title,
        description,
        start_time: parse_ts(&start_time_str)?,
        end_time: parse_ts(&end_time_str)?,
        status: AppointmentStatus::parse(&status_str),
        created_at: parse_ts(&created_at_str)?,
        updated_at: parse_ts(&updated_at_str)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn appt(id: &str, start: &str, status: AppointmentStatus) -> Appointment {
        Appointment {
            id: id.to_string(),
            title: format!("Appointment {id}"),
            description: Some("notes".to_string()),
            start_time: dt(start),
            end_time: dt(start) + chrono::Duration::minutes(30),
            status,
            created_at: dt("2025-06-01 08:00"),
            updated_at: dt("2025-06-01 08:00"),
        }
    }

    #[test]
    fn test_create_and_get_round_trip() {
        let conn = db::init_db(":memory:").unwrap();
        let original = appt("a1", "2025-06-16 10:00", AppointmentStatus::Scheduled);
        create_appointment(&conn, &original).unwrap();

        let loaded = get_appointment_by_id(&conn, "a1").unwrap().unwrap();
        assert_eq!(loaded, original);
        assert!(get_appointment_by_id(&conn, "nope").unwrap().is_none());
    }

    #[test]
    fn test_active_list_skips_cancelled() {
        let conn = db::init_db(":memory:").unwrap();
        create_appointment(&conn, &appt("a1", "2025-06-16 10:00", AppointmentStatus::Cancelled)).unwrap();
        create_appointment(&conn, &appt("a2", "2025-06-17 10:00", AppointmentStatus::Scheduled)).unwrap();

        assert_eq!(list_appointments(&conn).unwrap().len(), 2);
        let active = list_active_appointments(&conn).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "a2");
    }

    #[test]
    fn test_update_missing_returns_none() {
        let conn = db::init_db(":memory:").unwrap();
        let result = update_appointment(&conn, "ghost", &AppointmentChanges::default()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_count_upcoming() {
        let conn = db::init_db(":memory:").unwrap();
        create_appointment(&conn, &appt("past", "2025-06-01 10:00", AppointmentStatus::Scheduled)).unwrap();
        create_appointment(&conn, &appt("soon", "2025-06-20 10:00", AppointmentStatus::Scheduled)).unwrap();
        create_appointment(&conn, &appt("off", "2025-06-21 10:00", AppointmentStatus::Cancelled)).unwrap();

        assert_eq!(count_upcoming(&conn, &dt("2025-06-10 00:00")).unwrap(), 1);
    }
}
