use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing::*;

use pihole_display::{
    cli,
    controller::{self, RefreshConfig, RefreshController},
    helper::{
        shutdown::Shutdown,
        threads::{join_named, spawn_named},
    },
    logger::{self, manager::LoggerSettings},
    metrics::{MetricsCollector, SysinfoSource},
    render::{
        self,
        display::{GlyphCell, TextPanel},
        Sink,
    },
    settings::{self, manager::SettingsStruct},
};

fn main() -> ExitCode {
    // CLI should be started before logger to allow control over verbosity
    cli::manager::init();

    let logger = match logger::manager::init(&LoggerSettings {
        verbose: cli::manager::is_verbose(),
        directory: cli::manager::log_path(),
        retention: cli::manager::log_retention(),
    }) {
        Ok(logger) => logger,
        Err(error) => {
            eprintln!("Failed to start the logger: {error:#}");
            return ExitCode::FAILURE;
        }
    };

    info!("Command line call: {}", cli::manager::command_line_string());
    debug!("Command line input struct: {}", cli::manager::command_line());

    let code = match run() {
        Ok(code) => code,
        Err(error) => {
            error!("{error:#}");
            1
        }
    };

    logger.shutdown();

    ExitCode::from(code)
}

fn run() -> Result<u8> {
    let settings = settings::manager::Manager::load(
        &cli::manager::settings_file(),
        cli::manager::is_reset(),
    )?;
    let config = settings.config();

    let refresh_config = RefreshConfig::from_settings(
        config,
        cli::manager::is_display_enabled(),
        cli::manager::is_once(),
        cli::manager::ftl_address(),
    )?;
    info!(
        "FTL at {}, {:?} mode",
        refresh_config.address(),
        refresh_config.run_mode
    );

    let shutdown = Shutdown::new(config.refresh.sleep_slice());
    shutdown.install_signal_handler()?;

    let sink = create_sink(config)?;
    let metrics = MetricsCollector::new(SysinfoSource::new(), config.refresh.cpu_sample_window());

    let mut refresh = RefreshController::new(refresh_config, metrics, sink, shutdown);
    let handle = spawn_named("RefreshLoop", move || refresh.run())?;
    let result = join_named(handle)?;

    Ok(controller::exit_code(&result))
}

fn create_sink(config: &SettingsStruct) -> Result<Sink> {
    if !cli::manager::is_display_enabled() {
        info!("No display selected, pages go to the log");
        return Ok(render::create_log_sink());
    }

    let display = &config.display;
    let panel = TextPanel::new(
        &display.device_path,
        display.width_px,
        display.height_px,
        GlyphCell {
            width: display.glyph_width_px,
            height: display.glyph_height_px,
        },
    );

    let (columns, rows) = panel.capacity_from(display.origin_x, display.origin_y);
    let viewport = config.viewport.budget().context("Invalid viewport")?;
    if viewport.width_chars() > columns || viewport.height_chars() > rows {
        warn!(
            "Viewport {}x{} is larger than the {columns}x{rows} characters left from ({}, {}), text will be cut",
            viewport.width_chars(),
            viewport.height_chars(),
            config.display.origin_x,
            config.display.origin_y
        );
    }

    info!("Drawing on {:?}", config.display.device_path);
    Ok(render::create_display_sink(
        Box::new(panel),
        display.origin_x,
        display.origin_y,
    ))
}
