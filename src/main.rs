//! Omok desktop client
//!
//! Set `OMOK_CONFIG` to a TOML file to override the defaults and `RUST_LOG`
//! to change log verbosity.

use std::sync::Arc;

use omok::record::{JsonlArchive, RecordSink, SampleWriter, TrainingSink};
use omok::ui::{OmokApp, Persistence};
use omok::GameConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::var_os("OMOK_CONFIG") {
        Some(path) => {
            info!(path = ?path, "loading config");
            GameConfig::load(path)?
        }
        None => GameConfig::default(),
    };

    let persistence = Persistence {
        archive: Arc::new(JsonlArchive::new(config.records_path.clone())) as Arc<dyn RecordSink>,
        trainer: config.samples_path.clone().map(|path| {
            Arc::new(SampleWriter::new(path, config.board_size)) as Arc<dyn TrainingSink>
        }),
    };
    info!(board_size = config.board_size, records = %config.records_path.display(), "starting omok");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 750.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Omok"),
        ..Default::default()
    };

    eframe::run_native(
        "Omok",
        options,
        Box::new(move |cc| Ok(Box::new(OmokApp::new(cc, config, persistence)?))),
    )?;
    Ok(())
}
