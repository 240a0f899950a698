// Tauri child-webview backend for `ContentView`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures_util::future::{self, BoxFuture, FutureExt};
use tauri::webview::{NewWindowResponse, PageLoadEvent};
use tauri::{AppHandle, Manager, PhysicalPosition, PhysicalSize, Webview, WebviewBuilder, WebviewUrl};
use url::Url;

use crate::error::ViewError;
use crate::settings::WebviewState;
use crate::state::{NavState, TabId};
use crate::view::{
    ClearDataOptions, ClearDataTypes, ContentView, EventSink, ViewConfig, ViewEvent, ViewFactory,
    FOREGROUND_DISPOSITION, USER_ABORT_REASON,
};

pub const MAIN_WINDOW: &str = "main";
/// Toolbar + tab strip drawn by the main webview above the content area.
const TOOLBAR_HEIGHT_LOGICAL: f64 = 56.0 + 28.0;
const CONTENT_LABEL_PREFIX: &str = "content-";

/// Runs in every content page and reports its favicon through the `content_event` command.
/// Pages on remote origins can only reach it if the app's capability file lists the
/// `content-*` webviews with remote IPC allowed.
const ICON_REPORT_SCRIPT: &str = r#"
(function () {
  function report() {
    var link = document.querySelector('link[rel~="icon"]');
    var ipc = window.__TAURI_INTERNALS__;
    if (!ipc) return;
    ipc.invoke('content_event', { event: { type: 'iconChange', icon: link ? link.href : null } });
  }
  if (document.readyState === 'loading') {
    document.addEventListener('DOMContentLoaded', report);
  } else {
    report();
  }
})();
"#;

pub(crate) fn content_label(tab: TabId) -> String {
    format!("{}{}", CONTENT_LABEL_PREFIX, tab.0)
}

/// Inverse of `content_label`; `None` for any webview that is not a content view.
pub(crate) fn tab_for_label(label: &str) -> Option<TabId> {
    label
        .strip_prefix(CONTENT_LABEL_PREFIX)
        .and_then(|id| id.parse().ok())
        .map(TabId)
}

/// Only page-observable state may come from page script; commands stay with the shell.
pub(crate) fn accepts_page_event(event: &ViewEvent) -> bool {
    matches!(event, ViewEvent::IconChange { .. })
}

/// Popups and `target=_blank` links open as a foreground tab instead of a window.
fn new_tab_request(url: &Url) -> ViewEvent {
    ViewEvent::NewTabRequest {
        target_url: url.to_string(),
        window_open_disposition: FOREGROUND_DISPOSITION.to_string(),
    }
}

pub struct TauriView {
    webview: Option<Webview>,
    events: EventSink,
    is_loading: Arc<AtomicBool>,
    /// Set when a load failed; cleared when the next load starts.
    aborted: Arc<AtomicBool>,
}

impl TauriView {
    fn fail_load(&self, reason: String) {
        log::warn!("[TauriView] load failed for {}: {}", self.events.tab(), reason);
        self.aborted.store(true, Ordering::Relaxed);
        self.events.emit(ViewEvent::LoadAbort { reason });
    }

    fn eval(&self, js: &str) {
        if let Some(webview) = &self.webview {
            if let Err(e) = webview.eval(js) {
                log::warn!("[TauriView] eval failed: {}", e);
            }
        }
    }
}

impl ContentView for TauriView {
    fn navigate(&mut self, url: &str) {
        let Some(webview) = &self.webview else { return };
        let result = Url::parse(url)
            .map_err(|e| format!("ERR_INVALID_URL: {}", e))
            .and_then(|url| webview.navigate(url).map_err(|e| e.to_string()));
        if let Err(reason) = result {
            self.fail_load(reason);
        }
    }

    fn back(&mut self) {
        self.eval("window.history.back()");
    }

    fn forward(&mut self) {
        self.eval("window.history.forward()");
    }

    fn reload_stop(&mut self) {
        if self.is_loading.load(Ordering::Relaxed) {
            self.eval("window.stop()");
            self.is_loading.store(false, Ordering::Relaxed);
            self.events.emit(ViewEvent::LoadAbort {
                reason: USER_ABORT_REASON.to_string(),
            });
        } else {
            self.eval("window.location.reload()");
        }
    }

    fn set_zoom(&mut self, factor: f64) {
        if let Some(webview) = &self.webview {
            if let Err(e) = webview.set_zoom(factor) {
                log::warn!("[TauriView] set_zoom failed: {}", e);
            }
        }
    }

    // The platform clears the whole shared store at once; options and types are not selectable.
    fn clear_data(
        &mut self,
        _options: ClearDataOptions,
        _types: ClearDataTypes,
    ) -> BoxFuture<'static, Result<(), ViewError>> {
        let result = match &self.webview {
            Some(webview) => webview.clear_all_browsing_data().map_err(backend),
            None => Err(ViewError::Backend("webview was never created".to_string())),
        };
        future::ready(result).boxed()
    }

    fn before_delete(&mut self) {
        if let Some(webview) = self.webview.take() {
            if let Err(e) = webview.close() {
                log::warn!("[TauriView] close failed: {}", e);
            }
        }
    }

    fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Relaxed)
    }
}

fn backend(e: tauri::Error) -> ViewError {
    ViewError::Backend(e.to_string())
}

/// Creates content webviews as children of the main window, below the toolbar.
pub struct TauriViewFactory {
    app: AppHandle,
}

impl TauriViewFactory {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }

    fn build(
        &self,
        config: &ViewConfig,
        events: EventSink,
        is_loading: Arc<AtomicBool>,
        aborted: Arc<AtomicBool>,
    ) -> Result<Webview, ViewError> {
        let window = self
            .app
            .get_window(MAIN_WINDOW)
            .ok_or_else(|| ViewError::Backend("main window not found".to_string()))?;

        let url = Url::parse(&config.url).map_err(|e| ViewError::InvalidUrl(e.to_string()))?;
        let label = content_label(events.tab());

        let nav_events = events.clone();
        let title_events = events.clone();
        let popup_events = events;
        let mut builder = WebviewBuilder::new(&label, WebviewUrl::External(url))
            .initialization_script(ICON_REPORT_SCRIPT)
            .on_page_load(move |_webview, payload| {
                let loading = matches!(payload.event(), PageLoadEvent::Started);
                if loading {
                    aborted.store(false, Ordering::Relaxed);
                }
                is_loading.store(loading, Ordering::Relaxed);
                nav_events.emit(ViewEvent::NavStateChanged(NavState {
                    url: payload.url().to_string(),
                    is_loading: loading,
                    ..NavState::default()
                }));
            })
            .on_document_title_changed(move |_webview, title| {
                title_events.emit(ViewEvent::TitleChange { title });
            })
            .on_new_window(move |url, _features| {
                popup_events.emit(new_tab_request(&url));
                NewWindowResponse::Deny
            });
        if let Some(useragent) = &config.useragent_override {
            builder = builder.user_agent(useragent);
        }

        let physical_size = window.inner_size().map_err(backend)?;
        let toolbar = (TOOLBAR_HEIGHT_LOGICAL * window.scale_factor().map_err(backend)?) as u32;
        let height = physical_size.height.saturating_sub(toolbar).max(100);
        let webview = window.add_child(
            builder,
            PhysicalPosition::new(0, toolbar as i32),
            PhysicalSize::new(physical_size.width, height),
        ).map_err(backend)?;

        webview.set_zoom(config.zoom_factor).map_err(backend)?;
        if !config.visible || config.active_state == WebviewState::Deactivated {
            webview.hide().map_err(backend)?;
        }
        Ok(webview)
    }
}

impl ViewFactory for TauriViewFactory {
    fn create(&mut self, config: ViewConfig, events: EventSink) -> Box<dyn ContentView> {
        let is_loading = Arc::new(AtomicBool::new(false));
        let aborted = Arc::new(AtomicBool::new(false));
        let webview = match self.build(&config, events.clone(), is_loading.clone(), aborted.clone()) {
            Ok(webview) => Some(webview),
            Err(e) => {
                log::error!("[TauriView] Failed to create webview for {}: {}", config.url, e);
                None
            }
        };
        Box::new(TauriView { webview, events, is_loading, aborted })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_label_round_trips_tab_id() {
        assert_eq!(content_label(TabId(7)), "content-7");
        assert_eq!(tab_for_label(&content_label(TabId(7))), Some(TabId(7)));
    }

    #[test]
    fn test_non_content_labels_are_rejected() {
        assert_eq!(tab_for_label(MAIN_WINDOW), None);
        assert_eq!(tab_for_label("content-"), None);
        assert_eq!(tab_for_label("content-abc"), None);
    }

    #[test]
    fn test_page_may_only_report_icons() {
        assert!(accepts_page_event(&ViewEvent::IconChange { icon: None }));
        assert!(!accepts_page_event(&ViewEvent::TitleChange { title: "x".into() }));
        assert!(!accepts_page_event(&ViewEvent::NewTabRequest {
            target_url: "https://example.org/".into(),
            window_open_disposition: FOREGROUND_DISPOSITION.into(),
        }));
    }

    #[test]
    fn test_popup_becomes_foreground_tab_request() {
        let url = Url::parse("https://example.org/login").unwrap();
        assert_eq!(
            new_tab_request(&url),
            ViewEvent::NewTabRequest {
                target_url: "https://example.org/login".into(),
                window_open_disposition: FOREGROUND_DISPOSITION.into(),
            }
        );
    }

    #[test]
    fn test_icon_script_matches_event_wire_format() {
        let event: ViewEvent =
            serde_json::from_str(r#"{"type":"iconChange","icon":"https://example.org/favicon.ico"}"#)
                .unwrap();
        assert!(accepts_page_event(&event));
        assert!(ICON_REPORT_SCRIPT.contains("'content_event'"));
        assert!(ICON_REPORT_SCRIPT.contains("type: 'iconChange'"));
    }
}
