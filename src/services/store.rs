use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::Connection;

use crate::db::queries;
use crate::models::{Appointment, AppointmentChanges, NewAppointment};

/// Where appointments live. Every call is one request/response round trip;
/// callers re-`list` after a mutation instead of relying on any cache.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn list(&self) -> anyhow::Result<Vec<Appointment>>;
    async fn create(&self, fields: NewAppointment) -> anyhow::Result<Appointment>;
    async fn update(&self, id: &str, changes: AppointmentChanges) -> anyhow::Result<Appointment>;
    async fn delete(&self, id: &str) -> anyhow::Result<()>;
}

pub struct SqliteAppointmentStore {
    db: Arc<Mutex<Connection>>,
}

impl SqliteAppointmentStore {
    pub fn new(db: Arc<Mutex<Connection>>) -> Self {
        Self { db }
    }

    fn conn(&self) -> anyhow::Result<MutexGuard<'_, Connection>> {
        self.db
            .lock()
            .map_err(|_| anyhow::anyhow!("database lock poisoned"))
    }
}

#[async_trait]
impl AppointmentStore for SqliteAppointmentStore {
    async fn list(&self) -> anyhow::Result<Vec<Appointment>> {
        let db = self.conn()?;
        queries::list_appointments(&db).context("failed to list appointments")
    }

    async fn create(&self, fields: NewAppointment) -> anyhow::Result<Appointment> {
        let appointment = Appointment::from_new(fields, Utc::now().naive_utc());

        let db = self.conn()?;
        queries::create_appointment(&db, &appointment).context("failed to create appointment")?;
        Ok(appointment)
    }

    async fn update(&self, id: &str, changes: AppointmentChanges) -> anyhow::Result<Appointment> {
        let db = self.conn()?;
        queries::update_appointment(&db, id, &changes)
            .context("failed to update appointment")?
            .ok_or_else(|| anyhow::anyhow!("appointment not found: {id}"))
    }

    async fn delete(&self, id: &str) -> anyhow::Result<()> {
        let db = self.conn()?;
        let removed = queries::delete_appointment(&db, id).context("failed to delete appointment")?;
        anyhow::ensure!(removed, "appointment not found: {id}");
        Ok(())
    }
}
