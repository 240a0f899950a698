// Tab list model - pure logic, no Tauri imports.
// Owns ordering, selection and identity lookup. Knows nothing about content views:
// deletions are reported one way, through the content-delete hook.

use std::collections::HashMap;
use serde::Serialize;

use crate::state::{TabId, TabState};

/// Called with the id of every record removed from the list (close or in-place replace).
pub type ContentDeleteHook = Box<dyn FnMut(TabId) + Send>;

/// The tab-list collaborator the coordinator drives.
pub trait TabsModel: Send {
    fn add_tab(&mut self, state: TabState, select: bool);
    fn replace_tab(&mut self, index: usize, state: TabState);
    fn delete_tab(&mut self, index: usize);
    fn move_tab(&mut self, from: usize, to: usize);
    fn select_tab(&mut self, index: usize);
    fn tab(&self, id: TabId) -> Option<&TabState>;
    fn tab_mut(&mut self, id: TabId) -> Option<&mut TabState>;
    fn tabs(&self) -> &[TabState];
    fn selected_index(&self) -> Option<usize>;
    fn set_on_content_delete(&mut self, hook: ContentDeleteHook);

    /// Applies a full order (drag and drop). Selection stays on the same tab.
    /// Returns true if the order changed.
    fn reorder(&mut self, new_order: &[TabId]) -> bool;

    fn selected_id(&self) -> Option<TabId> {
        self.selected_index()
            .and_then(|i| self.tabs().get(i))
            .map(|t| t.id)
    }

    fn has_tab(&self, id: TabId) -> bool {
        self.tab(id).is_some()
    }

    fn len(&self) -> usize {
        self.tabs().len()
    }

    fn is_empty(&self) -> bool {
        self.tabs().is_empty()
    }
}

/// Payload the UI renders the tab strip from.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabsSnapshot {
    pub tabs: Vec<TabState>,
    pub selected_index: Option<usize>,
}

/// In-memory, `Vec`-backed tab list.
#[derive(Default)]
pub struct TabStore {
    tabs: Vec<TabState>,
    selected: Option<usize>,
    on_content_delete: Option<ContentDeleteHook>,
}

impl TabStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> TabsSnapshot {
        TabsSnapshot {
            tabs: self.tabs.clone(),
            selected_index: self.selected,
        }
    }

    fn position(&self, id: TabId) -> Option<usize> {
        self.tabs.iter().position(|t| t.id == id)
    }

    fn notify_deleted(&mut self, id: TabId) {
        if let Some(hook) = self.on_content_delete.as_mut() {
            hook(id);
        }
    }
}

impl TabsModel for TabStore {
    fn add_tab(&mut self, state: TabState, select: bool) {
        self.tabs.push(state);
        if select || self.selected.is_none() {
            self.selected = Some(self.tabs.len() - 1);
        }
    }

    fn replace_tab(&mut self, index: usize, state: TabState) {
        let Some(slot) = self.tabs.get_mut(index) else {
            log::warn!("[Tabs] replace_tab: index {} out of range", index);
            return;
        };
        let old = std::mem::replace(slot, state);
        self.notify_deleted(old.id);
    }

    fn delete_tab(&mut self, index: usize) {
        if index >= self.tabs.len() {
            log::warn!("[Tabs] delete_tab: index {} out of range", index);
            return;
        }
        let removed = self.tabs.remove(index);

        self.selected = match self.selected {
            _ if self.tabs.is_empty() => None,
            Some(sel) if index < sel => Some(sel - 1),
            Some(sel) if index == sel => Some(sel.min(self.tabs.len() - 1)),
            other => other,
        };

        self.notify_deleted(removed.id);
    }

    fn move_tab(&mut self, from: usize, to: usize) {
        if from >= self.tabs.len() || to >= self.tabs.len() {
            log::warn!("[Tabs] move_tab: {} -> {} out of range", from, to);
            return;
        }
        let selected_id = self.selected_id();
        let tab = self.tabs.remove(from);
        self.tabs.insert(to, tab);
        self.selected = selected_id.and_then(|id| self.position(id));
    }

    fn select_tab(&mut self, index: usize) {
        if index < self.tabs.len() {
            self.selected = Some(index);
        } else {
            log::warn!("[Tabs] select_tab: index {} out of range", index);
        }
    }

    fn tab(&self, id: TabId) -> Option<&TabState> {
        self.tabs.iter().find(|t| t.id == id)
    }

    fn tab_mut(&mut self, id: TabId) -> Option<&mut TabState> {
        self.tabs.iter_mut().find(|t| t.id == id)
    }

    fn tabs(&self) -> &[TabState] {
        &self.tabs
    }

    fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    fn set_on_content_delete(&mut self, hook: ContentDeleteHook) {
        self.on_content_delete = Some(hook);
    }

    fn reorder(&mut self, new_order: &[TabId]) -> bool {
        let selected_id = self.selected_id();
        let changed = reorder_logic(&mut self.tabs, new_order);
        if changed {
            self.selected = selected_id.and_then(|id| self.position(id));
        }
        changed
    }
}

/// Rebuilds `tabs` in the order given by `new_order`.
/// Tabs missing from `new_order` are appended so a stale UI order never loses tabs.
fn reorder_logic(tabs: &mut Vec<TabState>, new_order: &[TabId]) -> bool {
    if tabs.is_empty() || new_order.is_empty() {
        return false;
    }

    let old_order: Vec<TabId> = tabs.iter().map(|t| t.id).collect();
    let mut tab_map: HashMap<TabId, TabState> = tabs.drain(..).map(|t| (t.id, t)).collect();

    let mut reordered = Vec::with_capacity(old_order.len());
    for id in new_order {
        if let Some(tab) = tab_map.remove(id) {
            reordered.push(tab);
        }
    }
    // Keep leftovers in their previous relative order
    for id in &old_order {
        if let Some(tab) = tab_map.remove(id) {
            reordered.push(tab);
        }
    }

    let changed = reordered.iter().map(|t| t.id).ne(old_order.iter().copied());
    *tabs = reordered;
    changed
}
