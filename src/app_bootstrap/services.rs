use std::{any::Any, sync::Arc, thread};

use tokio::sync::broadcast;

use crate::{
    backends::pokeapi::PokeApiAdapter,
    config::Config,
    protocol::Message,
    sampler::Sampler,
    session_manager::SessionManager,
    ui_manager::{SharedSnapshot, UiManager},
};

pub struct BackgroundServicesConfig {
    pub bus_sender: broadcast::Sender<Message>,
    pub config: Config,
    pub latest_snapshot: SharedSnapshot,
}

pub(crate) fn panic_payload_to_string(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        return (*s).to_string();
    }
    if let Some(s) = payload.downcast_ref::<String>() {
        return s.clone();
    }
    "non-string panic payload".to_string()
}

pub fn spawn_background_services(config: BackgroundServicesConfig) {
    let BackgroundServicesConfig {
        bus_sender,
        config,
        latest_snapshot,
    } = config;

    // Subscribe before spawning so no startup message is missed.
    let ui_manager_bus_receiver = bus_sender.subscribe();
    thread::spawn(move || {
        let run_result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut ui_manager = UiManager::new(
                ui_manager_bus_receiver,
                latest_snapshot,
                Box::new(std::io::stdout()),
            );
            ui_manager.run();
        }));
        if let Err(payload) = run_result {
            log::error!(
                "UiManager thread terminated due to panic: {}",
                panic_payload_to_string(payload.as_ref())
            );
        }
    });

    let session_manager_bus_receiver = bus_sender.subscribe();
    let session_manager_bus_sender = bus_sender.clone();
    thread::spawn(move || {
        let catalog = Arc::new(PokeApiAdapter::new(&config.catalog));
        let sampler = Arc::new(Sampler::new(
            catalog,
            config.catalog.catalog_size,
            config.sampler,
        ));
        let mut session_manager = SessionManager::new(
            session_manager_bus_receiver,
            session_manager_bus_sender,
            sampler,
        );
        session_manager.run();
    });
}
