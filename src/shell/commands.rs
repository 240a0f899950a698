// Tauri commands: thin wrappers that lock the coordinator, run one operation and
// push the new tab strip to the UI.

use std::path::PathBuf;
use std::sync::Mutex;

use tauri::{AppHandle, Emitter, Manager, State, Webview};

use crate::browser::Browser;
use crate::modules::tabs::TabStore;
use crate::modules::tabs::TabsSnapshot;
use crate::state::TabId;
use crate::view::{ViewEvent, ViewMessage};

use super::view::{accepts_page_event, tab_for_label};

pub type BrowserState = Mutex<Browser<TabStore>>;

pub const UPDATE_TABS_EVENT: &str = "update-tabs";

pub(crate) fn emit_tabs(app: &AppHandle, browser: &Browser<TabStore>) -> Result<(), String> {
    app.emit(UPDATE_TABS_EVENT, browser.tabs().snapshot())
        .map_err(|e| e.to_string())
}

pub(crate) fn closed_tabs_path(app: &AppHandle) -> Result<PathBuf, String> {
    app.path()
        .app_data_dir()
        .map(|dir| dir.join("closed_tabs.json"))
        .map_err(|e| e.to_string())
}

fn with_browser(
    app: &AppHandle,
    state: &State<'_, BrowserState>,
    op: impl FnOnce(&mut Browser<TabStore>),
) -> Result<(), String> {
    let mut browser = state.lock().map_err(|e| e.to_string())?;
    op(&mut browser);
    emit_tabs(app, &browser)
}

#[tauri::command]
pub fn get_tabs(state: State<'_, BrowserState>) -> Result<TabsSnapshot, String> {
    let browser = state.lock().map_err(|e| e.to_string())?;
    Ok(browser.tabs().snapshot())
}

#[tauri::command]
pub fn navigate(app: AppHandle, state: State<'_, BrowserState>, url: String) -> Result<(), String> {
    with_browser(&app, &state, |b| b.navigate(&url))
}

#[tauri::command]
pub fn go_back(app: AppHandle, state: State<'_, BrowserState>) -> Result<(), String> {
    with_browser(&app, &state, |b| b.back())
}

#[tauri::command]
pub fn go_forward(app: AppHandle, state: State<'_, BrowserState>) -> Result<(), String> {
    with_browser(&app, &state, |b| b.forward())
}

#[tauri::command]
pub fn reload_stop(app: AppHandle, state: State<'_, BrowserState>) -> Result<(), String> {
    with_browser(&app, &state, |b| b.reload_stop())
}

#[tauri::command]
pub fn new_tab(app: AppHandle, state: State<'_, BrowserState>) -> Result<(), String> {
    with_browser(&app, &state, |b| b.create_new_tab())
}

#[tauri::command]
pub fn close_tab(app: AppHandle, state: State<'_, BrowserState>, index: usize) -> Result<(), String> {
    with_browser(&app, &state, |b| b.close_tab(index))
}

#[tauri::command]
pub fn select_tab(app: AppHandle, state: State<'_, BrowserState>, index: usize) -> Result<(), String> {
    with_browser(&app, &state, |b| b.select_tab(index))
}

#[tauri::command]
pub fn move_tab(
    app: AppHandle,
    state: State<'_, BrowserState>,
    from: usize,
    to: usize,
) -> Result<(), String> {
    with_browser(&app, &state, |b| b.move_tab(from, to))
}

/// Drag-and-drop reorder; only emits when the order actually changed.
#[tauri::command]
pub fn reorder_tabs(
    app: AppHandle,
    state: State<'_, BrowserState>,
    new_order: Vec<TabId>,
) -> Result<(), String> {
    let mut browser = state.lock().map_err(|e| e.to_string())?;
    log::debug!("[Tab Reorder] Received new order: {:?}", new_order);
    if browser.reorder_tabs(&new_order) {
        emit_tabs(&app, &browser)?;
    }
    Ok(())
}

#[tauri::command]
pub fn set_zoom(app: AppHandle, state: State<'_, BrowserState>, factor: f64) -> Result<(), String> {
    with_browser(&app, &state, |b| b.set_zoom(factor))
}

#[tauri::command]
pub fn reopen_closed_tab(app: AppHandle, state: State<'_, BrowserState>) -> Result<bool, String> {
    let mut browser = state.lock().map_err(|e| e.to_string())?;
    let reopened = browser.reopen_closed_tab();
    emit_tabs(&app, &browser)?;
    Ok(reopened)
}

#[tauri::command]
pub async fn clear_data(state: State<'_, BrowserState>) -> Result<(), String> {
    let pending = {
        let mut browser = state.lock().map_err(|e| e.to_string())?;
        browser.clear_data()
    };
    pending.await.map_err(|e| e.to_string())
}

/// Page-script reports from a content webview (favicon). The tab is taken from the calling
/// webview's label, never from the payload.
#[tauri::command]
pub fn content_event(
    app: AppHandle,
    webview: Webview,
    state: State<'_, BrowserState>,
    event: ViewEvent,
) -> Result<(), String> {
    let Some(tab) = tab_for_label(webview.label()) else {
        return Err(format!("{} is not a content webview", webview.label()));
    };
    if !accepts_page_event(&event) {
        return Err("event not accepted from page script".to_string());
    }
    with_browser(&app, &state, |b| b.handle_view_event(ViewMessage { tab, event }))
}

#[tauri::command]
pub fn shutdown(app: AppHandle, state: State<'_, BrowserState>) -> Result<(), String> {
    let browser = state.lock().map_err(|e| e.to_string())?;
    let path = closed_tabs_path(&app)?;
    if let Err(e) = browser.closed_tabs().save(&path) {
        log::warn!("[ClosedTabs] Failed to save: {}", e);
    }
    browser.shutdown();
    Ok(())
}
