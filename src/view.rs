// Content view seam.
// A content view renders one webview tab. Backends implement `ContentView` and `ViewFactory`;
// everything a view reports goes through its `EventSink`, tagged with the owning tab id.

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::error::ViewError;
use crate::settings::WebviewState;
use crate::state::{NavState, TabId};

/// Abort reason a view reports when the user cancelled the load.
pub const USER_ABORT_REASON: &str = "ERR_ABORTED";
/// Disposition of a new-tab request that wants the tab in the foreground.
pub const FOREGROUND_DISPOSITION: &str = "new_foreground_tab";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ViewEvent {
    NavStateChanged(NavState),
    #[serde(rename_all = "camelCase")]
    NewTabRequest {
        target_url: String,
        window_open_disposition: String,
    },
    LoadAbort { reason: String },
    TitleChange { title: String },
    IconChange { icon: Option<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewMessage {
    pub tab: TabId,
    pub event: ViewEvent,
}

pub type ViewEvents = UnboundedReceiver<ViewMessage>;

/// Sender half handed to a view at creation. Cloneable; sending never blocks.
#[derive(Debug, Clone)]
pub struct EventSink {
    tab: TabId,
    tx: UnboundedSender<ViewMessage>,
}

impl EventSink {
    pub fn new(tab: TabId, tx: UnboundedSender<ViewMessage>) -> Self {
        Self { tab, tx }
    }

    pub fn tab(&self) -> TabId {
        self.tab
    }

    /// Delivers `event`. Returns false once the receiving side is gone.
    pub fn emit(&self, event: ViewEvent) -> bool {
        self.tx.send(ViewMessage { tab: self.tab, event }).is_ok()
    }
}

pub fn event_channel() -> (UnboundedSender<ViewMessage>, ViewEvents) {
    mpsc::unbounded_channel()
}

/// Everything a backend needs to build a view.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewConfig {
    pub url: String,
    pub partition: String,
    pub zoom_factor: f64,
    pub active_state: WebviewState,
    pub useragent_override: Option<String>,
    /// False for throwaway views that must never be shown.
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ClearDataOptions {
    /// Only data newer than this (ms since epoch) is removed; 0 clears everything.
    pub since: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearDataTypes {
    pub appcache: bool,
    pub cache: bool,
    pub cookies: bool,
    pub session_cookies: bool,
    pub persistent_cookies: bool,
    pub file_systems: bool,
    #[serde(rename = "indexedDB")]
    pub indexed_db: bool,
    pub local_storage: bool,
    #[serde(rename = "webSQL")]
    pub web_sql: bool,
}

impl ClearDataTypes {
    pub fn all() -> Self {
        Self {
            appcache: true,
            cache: true,
            cookies: true,
            session_cookies: true,
            persistent_cookies: true,
            file_systems: true,
            indexed_db: true,
            local_storage: true,
            web_sql: true,
        }
    }
}

/// A live content-rendering surface bound to exactly one webview tab.
pub trait ContentView: Send {
    fn navigate(&mut self, url: &str);
    fn back(&mut self);
    fn forward(&mut self);
    fn reload_stop(&mut self);
    fn set_zoom(&mut self, factor: f64);

    /// Clears the view's storage partition. The future resolves once the backend is done.
    fn clear_data(
        &mut self,
        options: ClearDataOptions,
        types: ClearDataTypes,
    ) -> BoxFuture<'static, Result<(), ViewError>>;

    /// Mounts the surface. Views do not report readiness or accept storage commands before this.
    fn attach(&mut self) {}

    /// Teardown, called exactly once right before the view is dropped.
    fn before_delete(&mut self);

    /// True while the current load was aborted; such views keep their error on nav updates.
    fn is_aborted(&self) -> bool {
        false
    }
}

pub trait ViewFactory: Send {
    fn create(&mut self, config: ViewConfig, events: EventSink) -> Box<dyn ContentView>;
}
