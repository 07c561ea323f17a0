// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::thread;
use tavola_app::{Row, seed_rows};
use tavola_cloud::{
    Client, LoadOutcome, Session, clear_session, load_cached_session, store_session,
};
use tavola_tui::{AppRuntime, CloudEvent, InternalEvent, LoadResult};

/// Bridges the UI to the cloud backend. Holds the live session and keeps the
/// on-disk session cache in step with it, so a later launch resumes signed in.
pub struct CloudSync {
    client: Client,
    session: Option<Session>,
    session_path: PathBuf,
}

impl CloudSync {
    pub fn new(client: Client, session_path: PathBuf) -> Self {
        let session = load_cached_session(&session_path);
        Self {
            client,
            session,
            session_path,
        }
    }

    fn current_session(&self) -> Result<&Session> {
        match &self.session {
            Some(session) => Ok(session),
            None => bail!("Not signed in."),
        }
    }
}

fn to_load_result(outcome: LoadOutcome) -> LoadResult {
    match outcome {
        LoadOutcome::Loaded(rows) => LoadResult::Loaded(rows),
        LoadOutcome::NoSavedData => LoadResult::NoSavedData,
        LoadOutcome::InvalidFormat => LoadResult::InvalidFormat,
    }
}

impl AppRuntime for CloudSync {
    fn session_email(&self) -> Option<String> {
        self.session.as_ref().map(|session| session.email.clone())
    }

    fn sign_in(&mut self, email: &str, password: &str) -> Result<()> {
        let session = self.client.sign_in(email, password)?;
        store_session(&self.session_path, &session).context("cache session")?;
        self.session = Some(session);
        Ok(())
    }

    fn sign_up(&mut self, email: &str, password: &str) -> Result<()> {
        self.client.sign_up(email, password)
    }

    fn sign_out(&mut self) -> Result<()> {
        clear_session(&self.session_path)?;
        self.session = None;
        Ok(())
    }

    fn load_row_set(&mut self) -> Result<LoadResult> {
        let session = self.current_session()?;
        Ok(to_load_result(self.client.load_row_set(session)?))
    }

    fn save_row_set(&mut self, rows: &[Row]) -> Result<()> {
        let session = self.current_session()?;
        self.client.save_row_set(session, rows)
    }

    // Network calls run off-thread so the UI stays responsive; the busy flag
    // in the view gates a second call until the completion event lands.
    fn spawn_load(&mut self, request_id: u64, tx: Sender<InternalEvent>) -> Result<()> {
        let session = self.current_session()?.clone();
        let client = self.client.clone();
        thread::spawn(move || {
            let event = match client.load_row_set(&session) {
                Ok(outcome) => CloudEvent::LoadCompleted {
                    request_id,
                    result: to_load_result(outcome),
                },
                Err(error) => CloudEvent::LoadFailed {
                    request_id,
                    error: error.to_string(),
                },
            };
            let _ = tx.send(InternalEvent::Cloud(event));
        });
        Ok(())
    }

    fn spawn_save(
        &mut self,
        request_id: u64,
        rows: &[Row],
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let session = self.current_session()?.clone();
        let client = self.client.clone();
        let rows = rows.to_vec();
        thread::spawn(move || {
            let event = match client.save_row_set(&session, &rows) {
                Ok(()) => CloudEvent::SaveCompleted { request_id },
                Err(error) => CloudEvent::SaveFailed {
                    request_id,
                    error: error.to_string(),
                },
            };
            let _ = tx.send(InternalEvent::Cloud(event));
        });
        Ok(())
    }
}

/// Offline stand-in used by `--demo`: a fixed local account whose saved table
/// is the built-in seed data. Saves are accepted and dropped.
pub struct DemoSync {
    signed_in: bool,
}

impl Default for DemoSync {
    fn default() -> Self {
        Self { signed_in: true }
    }
}

impl AppRuntime for DemoSync {
    fn session_email(&self) -> Option<String> {
        self.signed_in.then(|| "demo@tavola.local".to_owned())
    }

    fn sign_in(&mut self, email: &str, password: &str) -> Result<()> {
        tavola_cloud::validate_credentials(email, password)?;
        self.signed_in = true;
        Ok(())
    }

    fn sign_up(&mut self, email: &str, password: &str) -> Result<()> {
        tavola_cloud::validate_credentials(email, password)
    }

    fn sign_out(&mut self) -> Result<()> {
        self.signed_in = false;
        Ok(())
    }

    fn load_row_set(&mut self) -> Result<LoadResult> {
        if !self.signed_in {
            bail!("Not signed in.");
        }
        Ok(LoadResult::Loaded(seed_rows()))
    }

    fn save_row_set(&mut self, _rows: &[Row]) -> Result<()> {
        if !self.signed_in {
            bail!("Not signed in.");
        }
        Ok(())
    }
}
