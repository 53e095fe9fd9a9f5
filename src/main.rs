mod app;
mod canvas;
mod codec;
mod config;
mod coordinate;
mod cropper;
mod editor;
mod error;
mod placement;
mod session;
mod tool;
mod ui;

use app::StringArtistApp;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    log::info!("Starting {} v{}", config::WINDOW_TITLE, config::VERSION);

    let native_options = eframe::NativeOptions {
        initial_window_size: Some(egui::vec2(config::WINDOW_WIDTH, config::WINDOW_HEIGHT)),
        min_window_size: Some(egui::vec2(config::MIN_WINDOW_WIDTH, config::MIN_WINDOW_HEIGHT)),
        resizable: true,
        ..Default::default()
    };

    let title = format!("{} | Version: {}", config::WINDOW_TITLE, config::VERSION);
    eframe::run_native(
        &title,
        native_options,
        Box::new(|cc| Box::new(StringArtistApp::new(cc))),
    )
}
