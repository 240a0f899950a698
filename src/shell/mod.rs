// Tauri shell: wires the coordinator into a Tauri app.
// The embedding binary calls `builder()` and runs it with its own generated context.

pub mod commands;
pub mod view;

use std::sync::Mutex;

use tauri::{AppHandle, Manager, Wry};

use crate::browser::{Browser, Host};
use crate::modules::closed_tabs::ClosedTabs;
use crate::modules::tabs::TabStore;
use crate::settings::Settings;
use crate::view::ViewEvents;

use commands::{closed_tabs_path, emit_tabs, BrowserState};
use view::{TauriViewFactory, MAIN_WINDOW};

pub struct TauriHost {
    app: AppHandle,
}

impl TauriHost {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }
}

impl Host for TauriHost {
    fn close_window(&self) {
        if let Some(window) = self.app.get_window(MAIN_WINDOW) {
            if let Err(e) = window.close() {
                log::error!("[Shell] Failed to close main window: {}", e);
            }
        }
    }
}

/// Feeds view events into the coordinator from the async runtime.
fn spawn_event_pump(app: AppHandle, mut events: ViewEvents) {
    tauri::async_runtime::spawn(async move {
        while let Some(msg) = events.recv().await {
            let state = app.state::<BrowserState>();
            let Ok(mut browser) = state.lock() else {
                log::error!("[Shell] Browser state poisoned, stopping event pump");
                break;
            };
            browser.handle_view_event(msg);
            if let Err(e) = emit_tabs(&app, &browser) {
                log::warn!("[Shell] Failed to emit tabs: {}", e);
            }
        }
    });
}

pub fn builder() -> tauri::Builder<Wry> {
    tauri::Builder::default()
        .plugin(
            tauri_plugin_log::Builder::default()
                .level(log::LevelFilter::Info)
                .build(),
        )
        .setup(|app| {
            let handle = app.handle().clone();
            let data_dir = app.path().app_data_dir()?;
            let settings = Settings::load(&data_dir.join("settings.json"));
            let closed_tabs = match closed_tabs_path(&handle) {
                Ok(path) => ClosedTabs::load(&path),
                Err(_) => ClosedTabs::new(),
            };

            let mut browser = Browser::new(
                TabStore::new(),
                Box::new(TauriViewFactory::new(handle.clone())),
                Box::new(TauriHost::new(handle.clone())),
                settings,
            )
            .with_closed_tabs(closed_tabs);
            browser.initialize_tabs();
            let events = browser.take_event_receiver();
            app.manage::<BrowserState>(Mutex::new(browser));

            if let Some(events) = events {
                spawn_event_pump(handle, events);
            }
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::get_tabs,
            commands::navigate,
            commands::go_back,
            commands::go_forward,
            commands::reload_stop,
            commands::new_tab,
            commands::close_tab,
            commands::select_tab,
            commands::move_tab,
            commands::reorder_tabs,
            commands::set_zoom,
            commands::reopen_closed_tab,
            commands::clear_data,
            commands::content_event,
            commands::shutdown,
        ])
}
