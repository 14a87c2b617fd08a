//! Sampling session coordinator.
//!
//! This manager is the bus-owned state holder for the exclusion list, the
//! currently displayed record and the in-progress draw. Draws run on a worker
//! thread and report back over the bus.

use std::sync::Arc;
use std::thread;

use log::{debug, error, info, warn};
use tokio::sync::broadcast::{Receiver, Sender};
use uuid::Uuid;

use crate::app_bootstrap::services::panic_payload_to_string;
use crate::backends::CatalogRecord;
use crate::exclusion_set::ExclusionSet;
use crate::protocol::{Message, SessionMessage, SessionSnapshot};
use crate::sampler::{DrawOutcome, Sampler};

/// Coordinates user intents, sampling draws and snapshot fan-out over the event bus.
pub struct SessionManager {
    bus_consumer: Receiver<Message>,
    bus_producer: Sender<Message>,
    sampler: Arc<Sampler>,
    exclusions: ExclusionSet,
    current_record: Option<CatalogRecord>,
    pending_draw_id: Option<String>,
    snapshot_version: u64,
}

impl SessionManager {
    /// Creates a manager bound to bus channels.
    pub fn new(
        bus_consumer: Receiver<Message>,
        bus_producer: Sender<Message>,
        sampler: Arc<Sampler>,
    ) -> Self {
        Self {
            bus_consumer,
            bus_producer,
            sampler,
            exclusions: ExclusionSet::new(),
            current_record: None,
            pending_draw_id: None,
            snapshot_version: 0,
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            version: self.snapshot_version,
            record: self.current_record.clone(),
            in_progress: self.pending_draw_id.is_some(),
            exclusions: self.exclusions.snapshot(),
        }
    }

    fn emit_snapshot(&mut self) {
        self.snapshot_version = self.snapshot_version.saturating_add(1);
        let snapshot = self.snapshot();
        let _ = self
            .bus_producer
            .send(Message::Session(SessionMessage::SnapshotUpdated(snapshot)));
    }

    fn emit_exclusions_changed(&mut self) {
        let _ = self.bus_producer.send(Message::Session(
            SessionMessage::ExclusionListChanged(self.exclusions.snapshot()),
        ));
        self.emit_snapshot();
    }

    fn request_next(&mut self) {
        if let Some(draw_id) = &self.pending_draw_id {
            debug!(
                "SessionManager: next request ignored, draw {} still in progress",
                draw_id
            );
            return;
        }
        if self.sampler.is_busy() {
            debug!("SessionManager: next request ignored, sampler busy");
            return;
        }

        let draw_id = Uuid::new_v4().to_string();
        let exclusions = self.exclusions.snapshot();
        info!(
            "SessionManager[{}]: draw started with {} exclusion(s)",
            draw_id,
            exclusions.len()
        );
        self.pending_draw_id = Some(draw_id.clone());
        self.emit_snapshot();

        let sampler = Arc::clone(&self.sampler);
        let bus_producer = self.bus_producer.clone();
        let worker_draw_id = draw_id.clone();
        let spawn_result = thread::Builder::new()
            .name("catalog-draw".to_string())
            .spawn(move || {
                let run_result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                    sampler.draw_next(&exclusions).ok()
                }));
                let outcome = match run_result {
                    Ok(outcome) => outcome,
                    Err(payload) => {
                        error!(
                            "SessionManager[{}]: draw worker panicked: {}",
                            worker_draw_id,
                            panic_payload_to_string(payload.as_ref())
                        );
                        None
                    }
                };
                let _ = bus_producer.send(Message::Session(SessionMessage::DrawFinished {
                    draw_id: worker_draw_id,
                    outcome,
                }));
            });
        if let Err(err) = spawn_result {
            error!(
                "SessionManager[{}]: failed to spawn draw worker: {}",
                draw_id, err
            );
            self.pending_draw_id = None;
            self.emit_snapshot();
        }
    }

    fn finish_draw(&mut self, draw_id: &str, outcome: Option<DrawOutcome>) {
        if self.pending_draw_id.as_deref() != Some(draw_id) {
            warn!("SessionManager: ignoring result of stale draw {}", draw_id);
            return;
        }
        self.pending_draw_id = None;

        match outcome {
            Some(DrawOutcome::Found { record, attempts }) => {
                info!(
                    "SessionManager[{}]: accepted id={} name={} after {} draw(s)",
                    draw_id, record.id, record.name, attempts
                );
                self.current_record = Some(record);
            }
            Some(DrawOutcome::Exhausted { attempts }) => {
                warn!(
                    "SessionManager[{}]: no admissible record after {} draw(s)",
                    draw_id, attempts
                );
                let _ = self.bus_producer.send(Message::Session(
                    SessionMessage::NoAdmissibleRecord { attempts },
                ));
            }
            Some(DrawOutcome::TransportError { error, attempts }) => {
                error!(
                    "SessionManager[{}]: draw abandoned after {} attempt(s): {}",
                    draw_id, attempts, error
                );
            }
            None => {
                debug!("SessionManager[{}]: draw ended without outcome", draw_id);
            }
        }
        self.emit_snapshot();
    }

    // A skipped message may have been this draw's `DrawFinished`.
    fn on_bus_lagged(&mut self, skipped: u64) {
        warn!(
            "SessionManager lagged on control bus, skipped {} message(s)",
            skipped
        );
        let Some(draw_id) = self.pending_draw_id.clone() else {
            return;
        };
        if self.sampler.is_busy() {
            return;
        }
        warn!(
            "SessionManager[{}]: draw result may have been skipped, releasing pending draw",
            draw_id
        );
        self.pending_draw_id = None;
        self.emit_snapshot();
    }

    fn exclude_value(&mut self, token: &str) {
        if self.exclusions.add(token) {
            debug!("SessionManager: excluded '{}'", token);
            self.emit_exclusions_changed();
        }
    }

    fn unexclude_value(&mut self, token: &str) {
        if self.exclusions.remove(token) {
            debug!("SessionManager: un-excluded '{}'", token);
            self.emit_exclusions_changed();
        }
    }

    fn unexclude_at(&mut self, index: usize) {
        match self.exclusions.remove_at(index) {
            Some(token) => {
                debug!("SessionManager: un-excluded '{}' at {}", token, index);
                self.emit_exclusions_changed();
            }
            None => debug!("SessionManager: no exclusion at position {}", index),
        }
    }

    /// Starts the blocking event loop.
    pub fn run(&mut self) {
        loop {
            match self.bus_consumer.blocking_recv() {
                Ok(Message::Session(SessionMessage::RequestNext)) => {
                    self.request_next();
                }
                Ok(Message::Session(SessionMessage::ExcludeValue(token))) => {
                    self.exclude_value(&token);
                }
                Ok(Message::Session(SessionMessage::UnexcludeValue(token))) => {
                    self.unexclude_value(&token);
                }
                Ok(Message::Session(SessionMessage::UnexcludeAt(index))) => {
                    self.unexclude_at(index);
                }
                Ok(Message::Session(SessionMessage::RequestSnapshot)) => {
                    self.emit_snapshot();
                }
                Ok(Message::Session(SessionMessage::DrawFinished { draw_id, outcome })) => {
                    self.finish_draw(&draw_id, outcome);
                }
                Ok(Message::Session(SessionMessage::SnapshotUpdated(_)))
                | Ok(Message::Session(SessionMessage::ExclusionListChanged(_)))
                | Ok(Message::Session(SessionMessage::NoAdmissibleRecord { .. })) => {}
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    self.on_bus_lagged(skipped);
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    }
}
