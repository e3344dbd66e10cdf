// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Application entry point wiring logging, settings and egui/eframe to launch the PDFLock UI.

use eframe::egui;
use egui_phosphor::Variant;

use crate::models::Settings;
use crate::ui::PdfLockApp;

/// Log filter used when `RUST_LOG` is not set.
const DEFAULT_LOG_FILTER: &str = "pdflock=info";

/// Bootstrap the desktop application and run the main egui event loop.
pub fn run() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_LOG_FILTER))
        .init();

    let settings = Settings::discover();
    log::info!(
        "starting PDFLock {} (language {:?}, scheme {}, unlock fallback {:?})",
        env!("CARGO_PKG_VERSION"),
        settings.language,
        settings.scheme.label(),
        settings.unlock_fallback
    );

    // Register Phosphor icon font.
    let mut fonts = egui::FontDefinitions::default();
    egui_phosphor::add_to_fonts(&mut fonts, Variant::Regular);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([640.0, 720.0])
            .with_min_inner_size([480.0, 420.0]),
        ..Default::default()
    };

    eframe::run_native(
        "PDFLock",
        options,
        Box::new(|cc| {
            cc.egui_ctx.set_fonts(fonts);
            Ok(Box::new(PdfLockApp::new(settings)))
        }),
    )
    .map_err(|err| anyhow::anyhow!("Failed to start the UI: {err}"))
}
