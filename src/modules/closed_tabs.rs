use std::collections::VecDeque;
use serde::{Deserialize, Serialize};

use crate::state::TabState;

pub const MAX_CLOSED_TABS: usize = 25;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosedTab {
    pub url: String,
    pub title: String,
    pub closed_at: String,
}

impl From<&TabState> for ClosedTab {
    fn from(tab: &TabState) -> Self {
        Self {
            url: tab.nav_state.url.clone(),
            title: tab.title.clone(),
            closed_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Bounded stack of recently closed webview tabs.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ClosedTabs {
    pub tabs: VecDeque<ClosedTab>,
}

impl ClosedTabs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a tab; the oldest entry is dropped past `MAX_CLOSED_TABS`.
    pub fn archive(&mut self, tab: &TabState) {
        self.tabs.push_back(ClosedTab::from(tab));
        if self.tabs.len() > MAX_CLOSED_TABS {
            self.tabs.pop_front();
        }
        log::info!("[ClosedTabs] Archived tab '{}' at URL: {}", tab.title, tab.nav_state.url);
    }

    /// Most recently closed first.
    pub fn pop(&mut self) -> Option<ClosedTab> {
        let tab = self.tabs.pop_back();
        if let Some(ref t) = tab {
            log::info!("[ClosedTabs] Restored tab '{}' at URL: {}", t.title, t.url);
        }
        tab
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{TabId, TabKind};

    fn webview_tab(n: u64) -> TabState {
        let mut tab = TabState::new(TabId(n), TabKind::WebView);
        tab.set_title(format!("Page {}", n));
        tab.nav_state.url = format!("https://example.com/{}", n);
        tab
    }

    #[test]
    fn test_archive_restore_cycle() {
        let mut closed = ClosedTabs::new();
        closed.archive(&webview_tab(1));
        closed.archive(&webview_tab(2));

        assert_eq!(closed.pop().unwrap().url, "https://example.com/2");
        assert_eq!(closed.pop().unwrap().title, "Page 1");
        assert!(closed.pop().is_none());
    }

    #[test]
    fn test_max_size_enforced() {
        let mut closed = ClosedTabs::new();
        for n in 0..(MAX_CLOSED_TABS as u64 + 5) {
            closed.archive(&webview_tab(n));
        }
        assert_eq!(closed.len(), MAX_CLOSED_TABS);
        assert_eq!(closed.tabs.front().unwrap().url, "https://example.com/5");
    }
}
