// Shared tab records and constants.
// Plain serializable state only: live content views are kept by the coordinator, keyed by id.

use std::fmt;
use serde::{Deserialize, Serialize};

/// Title constants used when building tab records.
pub struct TabTitles;

impl TabTitles {
    pub const NEW_TAB_PAGE_TITLE: &'static str = "New Tab";
    pub const INITIAL_WEBVIEW_TITLE: &'static str = "Loading...";
}

pub const ABOUT_BLANK: &str = "about:blank";
pub const NEW_TAB_PAGE_URL: &str = "about:newtab";

/// Opaque tab identity issued by [`crate::ids::IdGenerator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub u64);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tab-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TabKind {
    #[serde(rename = "WEBVIEW")]
    WebView,
    NewTabPage,
    ManagePage,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavState {
    pub url: String,
    pub is_loading: bool,
    pub can_go_back: bool,
    pub can_go_forward: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabState {
    pub id: TabId,
    #[serde(rename = "type")]
    pub kind: TabKind,
    pub title: String,
    pub nav_state: NavState,
    pub icon: Option<String>,
    pub error: Option<String>,
}

impl TabState {
    /// Blank record of the given kind; callers fill in title and url.
    pub fn new(id: TabId, kind: TabKind) -> Self {
        Self {
            id,
            kind,
            title: String::new(),
            nav_state: NavState::default(),
            icon: None,
            error: None,
        }
    }

    pub fn is_webview(&self) -> bool {
        self.kind == TabKind::WebView
    }

    pub fn set_nav_state(&mut self, nav_state: NavState) {
        self.nav_state = nav_state;
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_icon(&mut self, icon: Option<String>) {
        self.icon = icon;
    }
}
