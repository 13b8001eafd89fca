//! eframe/egui host for a sparkfield: a window whose canvas follows the pointer.

use sparkfield_core::FieldConfig;
use tracing::info;

mod app;
mod host;
mod surface;

pub use app::SparkfieldApp;
pub use host::EguiHost;
pub use surface::EguiSurface;

/// Opens the window and blocks until it is closed.
pub fn run_window(config: FieldConfig, seed: Option<u64>) -> sparkfield_platform::Result<()> {
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Sparkfield")
            .with_inner_size([1024.0, 640.0]),
        ..Default::default()
    };
    info!("opening window with preset '{}'", config.name);
    eframe::run_native(
        "Sparkfield",
        native_options,
        Box::new(move |creation_context| {
            Ok(Box::new(SparkfieldApp::new(
                &creation_context.egui_ctx,
                config,
                seed,
            )))
        }),
    )
    .map_err(|err| format!("eframe failed: {err}").into())
}
