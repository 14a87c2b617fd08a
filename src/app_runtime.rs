//! Application runtime bootstrap and top-level orchestration.

use std::{
    io::BufRead,
    sync::{Arc, Mutex},
};

use log::{info, warn};
use tokio::sync::broadcast;

use crate::{
    app_bootstrap::services::{spawn_background_services, BackgroundServicesConfig},
    config::Config,
    protocol::{Message, SessionMessage},
    ui_commands::{parse_command, UiCommand, HELP_TEXT},
    ui_manager::SharedSnapshot,
};

const BUS_CAPACITY: usize = 256;

/// What the input loop should do after one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum InputFlow {
    Continue(Option<String>),
    Quit,
}

/// Owns startup wiring and the interactive input loop.
pub(crate) struct AppRuntime {
    config: Config,
    bus_sender: broadcast::Sender<Message>,
    latest_snapshot: SharedSnapshot,
}

fn publish(bus_sender: &broadcast::Sender<Message>, message: Message) {
    if bus_sender.send(message).is_err() {
        warn!("AppRuntime: no bus subscribers, message dropped");
    }
}

/// Applies one line of user input against the latest displayed snapshot.
pub(crate) fn handle_input_line(
    line: &str,
    latest_snapshot: &SharedSnapshot,
    bus_sender: &broadcast::Sender<Message>,
) -> InputFlow {
    let record = latest_snapshot
        .lock()
        .expect("latest snapshot lock poisoned")
        .as_ref()
        .and_then(|snapshot| snapshot.record.clone());

    match parse_command(line, record.as_ref()) {
        Ok(None) => InputFlow::Continue(None),
        Ok(Some(UiCommand::Quit)) => InputFlow::Quit,
        Ok(Some(UiCommand::Help)) => InputFlow::Continue(Some(HELP_TEXT.to_string())),
        Ok(Some(command)) => {
            for message in command.into_messages() {
                publish(bus_sender, message);
            }
            InputFlow::Continue(None)
        }
        Err(err) => InputFlow::Continue(Some(err)),
    }
}

impl AppRuntime {
    pub(crate) fn new(config: Config) -> Self {
        let (bus_sender, _) = broadcast::channel(BUS_CAPACITY);
        Self {
            config,
            bus_sender,
            latest_snapshot: Arc::new(Mutex::new(None)),
        }
    }

    /// Spawns background services, requests the first draw and reads commands until quit.
    pub(crate) fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        spawn_background_services(BackgroundServicesConfig {
            bus_sender: self.bus_sender.clone(),
            config: self.config.clone(),
            latest_snapshot: Arc::clone(&self.latest_snapshot),
        });

        info!(
            "Sampling from {}/{} (ids 1..={})",
            self.config.catalog.base_url,
            self.config.catalog.resource_path,
            self.config.catalog.catalog_size
        );
        publish(&self.bus_sender, Message::Session(SessionMessage::RequestNext));
        println!("Type 'help' for commands.");

        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let line = line?;
            match handle_input_line(&line, &self.latest_snapshot, &self.bus_sender) {
                InputFlow::Continue(Some(feedback)) => println!("{}", feedback),
                InputFlow::Continue(None) => {}
                InputFlow::Quit => break,
            }
        }
        info!("Input closed, shutting down");
        Ok(())
    }
}
