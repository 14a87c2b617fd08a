mod app_bootstrap;
mod app_runtime;
mod backends;
mod config;
mod config_persistence;
mod exclusion_set;
mod protocol;
mod sampler;
mod session_manager;
mod ui_commands;
mod ui_manager;

use app_runtime::AppRuntime;
use config_persistence::{default_config_path, load_or_create_config};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut clog = colog::default_builder();
    clog.filter(None, log::LevelFilter::Trace);
    clog.init();

    let config_file = default_config_path()?;
    let config = load_or_create_config(&config_file)?;
    log::set_max_level(config.logging.level.to_level_filter());
    log::info!("Loaded config from {}", config_file.display());

    std::panic::set_hook(Box::new(|panic_info| {
        let current_thread = std::thread::current();
        let thread_name = current_thread.name().unwrap_or("unnamed");
        log::error!("panic in thread '{}': {}", thread_name, panic_info);
    }));

    AppRuntime::new(config).run()
}
