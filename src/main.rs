mod accounts;
mod config;
mod defaults;
mod display;
mod error;
mod heap;
mod images;
mod logging;
mod model;
mod price_index;
mod recent;
mod session;
mod snapshot;
mod stats;
mod storage;
mod store;
mod ui;

use eframe::egui;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;
use tracing::{info, warn};

use accounts::AccountRegistry;
use config::{AppConfig, CONFIG_FILE};
use images::{ImageLookup, RemoteImageLookup, RuleImageLookup};
use storage::{KeyValueStore, MemoryStore, SqliteStore};
use ui::TrackerApp;

// Fonts with a rupee glyph, tried in order.
const FONT_CANDIDATES: [&str; 3] = [
    "C:\\Windows\\Fonts\\segoeui.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial Unicode.ttf",
];

fn load_fonts() -> egui::FontDefinitions {
    let mut fonts = egui::FontDefinitions::default();

    if let Some(data) = FONT_CANDIDATES.iter().find_map(|path| std::fs::read(path).ok()) {
        fonts
            .font_data
            .insert("UiFont".to_owned(), egui::FontData::from_owned(data).into());
        if let Some(family) = fonts.families.get_mut(&egui::FontFamily::Proportional) {
            family.insert(0, "UiFont".to_owned());
        }
    }
    fonts
}

fn open_storage(config: &AppConfig) -> Rc<dyn KeyValueStore> {
    match SqliteStore::open(&config.db_path) {
        Ok(store) => {
            info!(path = %config.db_path.display(), "opened database");
            Rc::new(store)
        }
        Err(e) => {
            warn!(path = %config.db_path.display(), error = %e, "database unavailable, changes will not be saved");
            Rc::new(MemoryStore::new())
        }
    }
}

fn image_lookup(config: &AppConfig) -> Box<dyn ImageLookup> {
    let Some(key) = config.unsplash_access_key.as_deref() else {
        return Box::new(RuleImageLookup);
    };
    let timeout = Duration::from_millis(config.image_timeout_ms);
    match RemoteImageLookup::new(config.image_api_url.as_str(), key, timeout) {
        Ok(remote) => {
            info!("image search enabled");
            Box::new(remote)
        }
        Err(e) => {
            warn!(error = %e, "image search unavailable, using built-in pictures");
            Box::new(RuleImageLookup)
        }
    }
}

fn main() -> eframe::Result<()> {
    let config = AppConfig::load(Path::new(CONFIG_FILE));
    logging::init_logging(&config.log_level);

    let storage = open_storage(&config);
    let accounts = AccountRegistry::new(storage.clone());
    let images = image_lookup(&config);
    if config.seed_demo_account {
        match accounts.ensure_demo_account() {
            Ok(true) => info!("created demo account"),
            Ok(false) => {}
            Err(e) => warn!(error = %e, "could not prepare demo account"),
        }
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1000.0, 640.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Smart Resell Tracker",
        options,
        Box::new(move |cc| {
            cc.egui_ctx.set_fonts(load_fonts());
            let app = TrackerApp::new(storage, accounts, images, config);
            ui::set_custom_style(&cc.egui_ctx, app.is_dark());
            Ok(Box::new(app))
        }),
    )
}
