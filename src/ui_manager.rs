use std::io::Write;
use std::sync::{Arc, Mutex};

use log::{debug, warn};
use tokio::sync::broadcast::Receiver;

use crate::protocol::{Message, SessionMessage, SessionSnapshot};

/// Snapshot shared between the renderer thread and the input loop.
pub type SharedSnapshot = Arc<Mutex<Option<SessionSnapshot>>>;

/// Renders the session screen as plain text.
pub fn render_snapshot(snapshot: &SessionSnapshot) -> String {
    let mut lines = vec!["Creature Stumbler".to_string(), String::new()];

    if let Some(record) = &snapshot.record {
        lines.push(format!(
            "Image: {}",
            record.image_url.as_deref().unwrap_or("(no image)")
        ));
        lines.push(format!("Name: {}", record.name));
        lines.push(format!("ID: {}", record.id));
        lines.push(format!("Types: {}", record.category_tags.join(", ")));
        lines.push(format!("Height: {} dm", record.height));
        lines.push(format!("Weight: {} hg", record.weight));
        lines.push(String::new());
    }

    if snapshot.in_progress {
        lines.push("Loading...".to_string());
    } else {
        lines.push("[n] Next creature".to_string());
    }

    if !snapshot.exclusions.is_empty() {
        lines.push(String::new());
        lines.push("Ban List".to_string());
        for (index, token) in snapshot.exclusions.iter().enumerate() {
            lines.push(format!("  {}. {}", index + 1, token));
        }
    }

    lines.join("\n")
}

// Draws session snapshots to the terminal
pub struct UiManager {
    bus_receiver: Receiver<Message>,
    latest_snapshot: SharedSnapshot,
    output: Box<dyn Write + Send>,
    last_rendered_version: Option<u64>,
}

impl UiManager {
    pub fn new(
        bus_receiver: Receiver<Message>,
        latest_snapshot: SharedSnapshot,
        output: Box<dyn Write + Send>,
    ) -> Self {
        Self {
            bus_receiver,
            latest_snapshot,
            output,
            last_rendered_version: None,
        }
    }

    fn write_block(&mut self, text: &str) {
        if let Err(err) = writeln!(self.output, "\n{}", text).and_then(|_| self.output.flush()) {
            warn!("UiManager: failed to write to terminal: {}", err);
        }
    }

    fn on_snapshot(&mut self, snapshot: SessionSnapshot) {
        {
            let mut latest = self
                .latest_snapshot
                .lock()
                .expect("latest snapshot lock poisoned");
            *latest = Some(snapshot.clone());
        }
        if self.last_rendered_version == Some(snapshot.version) {
            debug!("UiManager: snapshot {} already rendered", snapshot.version);
            return;
        }
        self.last_rendered_version = Some(snapshot.version);
        self.write_block(&render_snapshot(&snapshot));
    }

    fn handle_message(&mut self, message: Message) {
        match message {
            Message::Session(SessionMessage::SnapshotUpdated(snapshot)) => {
                self.on_snapshot(snapshot);
            }
            Message::Session(SessionMessage::NoAdmissibleRecord { attempts }) => {
                self.write_block(&format!(
                    "No creature passed the ban list after {} draw(s). Try removing a ban.",
                    attempts
                ));
            }
            _ => {}
        }
    }

    pub fn run(&mut self) {
        loop {
            match self.bus_receiver.blocking_recv() {
                Ok(message) => self.handle_message(message),
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("UiManager lagged on bus, skipped {} message(s)", skipped);
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    }
}
