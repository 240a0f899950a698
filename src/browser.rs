// Tab coordinator.
// Keeps the tab list and the set of live content views in step:
// - records live in the `TabsModel`, views live here, joined only by `TabId`
// - views are created lazily and destroyed only through the store's content-delete hook
// - view events arrive as tagged messages and are dropped once their tab's view is gone

use std::collections::HashMap;

use futures_util::future::{BoxFuture, FutureExt, TryFutureExt};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::error::BrowserError;
use crate::ids::IdGenerator;
use crate::modules::closed_tabs::ClosedTabs;
use crate::modules::navigation::get_url_with_prefix;
use crate::modules::tabs::TabsModel;
use crate::settings::{SessionSettings, Settings, WebviewState};
use crate::state::{TabId, TabKind, TabState, TabTitles, ABOUT_BLANK, NEW_TAB_PAGE_URL};
use crate::view::{
    event_channel, ClearDataOptions, ClearDataTypes, ContentView, EventSink, ViewConfig,
    ViewEvent, ViewEvents, ViewFactory, ViewMessage, FOREGROUND_DISPOSITION, USER_ABORT_REASON,
};

/// The window/process hosting the browser.
pub trait Host: Send {
    fn close_window(&self);
}

pub struct Browser<T: TabsModel> {
    tabs: T,
    views: HashMap<TabId, Box<dyn ContentView>>,
    factory: Box<dyn ViewFactory>,
    host: Box<dyn Host>,
    ids: IdGenerator,
    settings: Settings,
    session: SessionSettings,
    closed_tabs: ClosedTabs,
    events_tx: UnboundedSender<ViewMessage>,
    events_rx: Option<ViewEvents>,
    deleted_rx: UnboundedReceiver<TabId>,
}

impl<T: TabsModel> Browser<T> {
    pub fn new(
        mut tabs: T,
        factory: Box<dyn ViewFactory>,
        host: Box<dyn Host>,
        settings: Settings,
    ) -> Self {
        let (deleted_tx, deleted_rx) = mpsc::unbounded_channel();
        tabs.set_on_content_delete(Box::new(move |id| {
            let _ = deleted_tx.send(id);
        }));
        let (events_tx, events_rx) = event_channel();

        Self {
            tabs,
            views: HashMap::new(),
            factory,
            host,
            ids: IdGenerator::new(),
            session: settings.session(),
            settings,
            closed_tabs: ClosedTabs::new(),
            events_tx,
            events_rx: Some(events_rx),
            deleted_rx,
        }
    }

    pub fn with_closed_tabs(mut self, closed_tabs: ClosedTabs) -> Self {
        self.closed_tabs = closed_tabs;
        self
    }

    pub fn tabs(&self) -> &T {
        &self.tabs
    }

    pub fn closed_tabs(&self) -> &ClosedTabs {
        &self.closed_tabs
    }

    pub fn session(&self) -> &SessionSettings {
        &self.session
    }

    pub fn has_view(&self, id: TabId) -> bool {
        self.views.contains_key(&id)
    }

    pub fn view_ids(&self) -> Vec<TabId> {
        let mut ids: Vec<TabId> = self.views.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn allocate_id(&self) -> TabId {
        self.ids.next_id()
    }

    pub fn selected_tab_state(&self) -> Option<&TabState> {
        self.tabs.selected_id().and_then(|id| self.tabs.tab(id))
    }

    pub fn initialize_tabs(&mut self) {
        if !self.tabs.is_empty() {
            log::warn!("[Tabs] initialize_tabs called on a non-empty tab list, ignoring");
            return;
        }
        let page = self.create_new_tab_page();
        self.tabs.add_tab(page, true);
    }

    pub fn select_tab(&mut self, index: usize) {
        self.tabs.select_tab(index);
    }

    pub fn create_new_tab(&mut self) {
        let page = self.create_new_tab_page();
        self.tabs.add_tab(page, true);
    }

    /// Closes the tab at `index` through the store; its view, if any, is torn down by the
    /// content-delete hook before this returns.
    ///
    /// Beyond the store delete: a closed webview tab is pushed onto the recently-closed stack,
    /// and closing the last tab adds a selected new-tab page so a selection always exists.
    pub fn close_tab(&mut self, index: usize) {
        if let Some(tab) = self.tabs.tabs().get(index) {
            if tab.is_webview() {
                self.closed_tabs.archive(tab);
            }
        }
        self.tabs.delete_tab(index);
        self.flush_deleted();

        if self.tabs.is_empty() {
            self.create_new_tab();
        }
    }

    pub fn move_tab(&mut self, from: usize, to: usize) {
        self.tabs.move_tab(from, to);
    }

    /// Applies a full tab order coming from the UI. Returns true if the order changed.
    pub fn reorder_tabs(&mut self, new_order: &[TabId]) -> bool {
        self.tabs.reorder(new_order)
    }

    /// Loads `user_url` in the selected tab. A non-webview tab is replaced in place by a new
    /// webview tab; a webview tab keeps its identity and its view navigates.
    pub fn navigate(&mut self, user_url: &str) {
        let Some(index) = self.tabs.selected_index() else {
            log::warn!("[Tabs] navigate with no selected tab");
            return;
        };
        let Some((kind, id)) = self.tabs.tabs().get(index).map(|t| (t.kind, t.id)) else {
            return;
        };

        if kind != TabKind::WebView {
            let state = self.create_webview(user_url);
            self.tabs.replace_tab(index, state);
            self.flush_deleted();
        } else {
            let url = get_url_with_prefix(user_url, &self.settings);
            if let Some(view) = self.views.get_mut(&id) {
                view.navigate(&url);
            }
        }
    }

    pub fn reload_stop(&mut self) {
        if let Some(view) = self.selected_view() {
            view.reload_stop();
        }
    }

    pub fn back(&mut self) {
        if let Some(view) = self.selected_view() {
            view.back();
        }
    }

    pub fn forward(&mut self) {
        if let Some(view) = self.selected_view() {
            view.forward();
        }
    }

    /// Applies `factor` to every live webview now and to every view created later.
    pub fn set_zoom(&mut self, factor: f64) {
        self.session.zoom_factor = factor;
        for tab in self.tabs.tabs().iter().filter(|t| t.is_webview()) {
            if let Some(view) = self.views.get_mut(&tab.id) {
                view.set_zoom(factor);
            }
        }
    }

    pub fn set_default_webview_state(&mut self, state: WebviewState) {
        self.session.default_webview_state = state;
    }

    pub fn set_useragent_override(&mut self, useragent: Option<String>) {
        self.session.useragent_override = useragent;
    }

    pub fn shutdown(&self) {
        log::info!("[Tabs] Shutting down");
        self.host.close_window();
    }

    /// Clears every kind of stored site data in the shared partition.
    ///
    /// All views share one partition, so any live view can do it. Without one, a throwaway
    /// invisible view is attached, awaited until it reports its first navigation state
    /// (storage commands sent earlier have no effect), used for the clear and torn down.
    pub fn clear_data(&mut self) -> BoxFuture<'static, Result<(), BrowserError>> {
        let options = ClearDataOptions { since: 0 };
        let types = ClearDataTypes::all();

        if let Some(view) = self.views.values_mut().next() {
            return view.clear_data(options, types).err_into::<BrowserError>().boxed();
        }

        log::info!("[ClearData] No live webview, creating a transient one");
        let (tx, mut rx) = event_channel();
        let mut config = self.view_config(ABOUT_BLANK);
        config.active_state = WebviewState::Activated;
        config.visible = false;
        let mut view = self.factory.create(config, EventSink::new(self.ids.next_id(), tx));
        view.attach();

        async move {
            loop {
                match rx.recv().await {
                    Some(ViewMessage { event: ViewEvent::NavStateChanged(_), .. }) => break,
                    Some(_) => continue,
                    None => {
                        view.before_delete();
                        return Err(BrowserError::ViewDetached);
                    }
                }
            }
            let result = view.clear_data(options, types).await;
            view.before_delete();
            log::info!("[ClearData] Transient view done");
            result.map_err(BrowserError::from)
        }
        .boxed()
    }

    /// Opens the most recently closed webview tab in the foreground.
    pub fn reopen_closed_tab(&mut self) -> bool {
        let Some(closed) = self.closed_tabs.pop() else {
            return false;
        };
        let state = self.create_webview(&closed.url);
        self.tabs.add_tab(state, true);
        true
    }

    /// Selects the manage page with `id`, adding it first if it is not open yet.
    pub fn open_manage_page(&mut self, id: TabId, kind: TabKind, title: &str, url: &str) {
        if let Some(index) = self.tabs.tabs().iter().position(|t| t.id == id) {
            self.tabs.select_tab(index);
            return;
        }
        let page = self.create_manage_page(id, kind, title, url);
        self.tabs.add_tab(page, true);
    }

    /// Hands the event stream to a host loop that feeds [`Browser::handle_view_event`].
    /// After this, [`Browser::dispatch_pending`] does nothing.
    pub fn take_event_receiver(&mut self) -> Option<ViewEvents> {
        self.events_rx.take()
    }

    /// Handles every queued view event. Returns how many were processed.
    pub fn dispatch_pending(&mut self) -> usize {
        let Some(mut rx) = self.events_rx.take() else {
            return 0;
        };
        let mut handled = 0;
        while let Ok(msg) = rx.try_recv() {
            self.handle_view_event(msg);
            handled += 1;
        }
        self.events_rx = Some(rx);
        handled
    }

    pub fn handle_view_event(&mut self, msg: ViewMessage) {
        self.flush_deleted();

        let ViewMessage { tab: id, event } = msg;
        let Some(view) = self.views.get(&id) else {
            log::debug!("[Tabs] Dropping event for {} without a live view", id);
            return;
        };
        let aborted = view.is_aborted();

        match event {
            ViewEvent::NavStateChanged(nav_state) => {
                if let Some(tab) = self.tabs.tab_mut(id) {
                    if tab.error.is_some() && !aborted {
                        tab.set_error(None);
                    }
                    tab.set_nav_state(nav_state);
                }
            }
            ViewEvent::NewTabRequest { target_url, window_open_disposition } => {
                self.handle_new_tab(&target_url, &window_open_disposition);
            }
            ViewEvent::LoadAbort { reason } => {
                if reason != USER_ABORT_REASON {
                    if let Some(tab) = self.tabs.tab_mut(id) {
                        tab.set_error(Some(reason));
                    }
                }
            }
            ViewEvent::TitleChange { title } => {
                if let Some(tab) = self.tabs.tab_mut(id) {
                    tab.set_title(title);
                }
            }
            ViewEvent::IconChange { icon } => {
                if let Some(tab) = self.tabs.tab_mut(id) {
                    tab.set_icon(icon);
                }
            }
        }
    }

    /// Builds a webview record for `url` (normalized here, blank means `about:blank`) and its
    /// live view. The caller inserts the record.
    fn create_webview(&mut self, url: &str) -> TabState {
        let mut state = TabState::new(self.ids.next_id(), TabKind::WebView);
        state.nav_state.url = get_url_with_prefix(url, &self.settings);
        state.title = TabTitles::INITIAL_WEBVIEW_TITLE.to_string();

        let config = self.view_config(&state.nav_state.url);
        let sink = EventSink::new(state.id, self.events_tx.clone());
        let view = self.factory.create(config, sink);
        self.views.insert(state.id, view);
        log::debug!("[Tabs] Created webview {} for {}", state.id, state.nav_state.url);

        state
    }

    fn create_new_tab_page(&self) -> TabState {
        let mut state = TabState::new(self.ids.next_id(), TabKind::NewTabPage);
        state.title = TabTitles::NEW_TAB_PAGE_TITLE.to_string();
        state.nav_state.url = NEW_TAB_PAGE_URL.to_string();
        state
    }

    /// Returns the existing record for `id` untouched, or a fresh one.
    pub fn create_manage_page(&self, id: TabId, kind: TabKind, title: &str, url: &str) -> TabState {
        if let Some(existing) = self.tabs.tab(id) {
            return existing.clone();
        }
        let mut state = TabState::new(id, kind);
        state.title = title.to_string();
        state.nav_state.url = url.to_string();
        state
    }

    fn handle_new_tab(&mut self, target_url: &str, disposition: &str) {
        let state = self.create_webview(target_url);
        let select = disposition == FOREGROUND_DISPOSITION;
        self.tabs.add_tab(state, select);
    }

    fn handle_content_delete(&mut self, id: TabId) {
        if let Some(mut view) = self.views.remove(&id) {
            view.before_delete();
            log::debug!("[Tabs] Destroyed webview {}", id);
        }
    }

    fn flush_deleted(&mut self) {
        while let Ok(id) = self.deleted_rx.try_recv() {
            self.handle_content_delete(id);
        }
    }

    fn selected_view(&mut self) -> Option<&mut Box<dyn ContentView>> {
        let id = self.tabs.selected_id()?;
        self.views.get_mut(&id)
    }

    fn view_config(&self, url: &str) -> ViewConfig {
        ViewConfig {
            url: url.to_string(),
            partition: self.session.partition.clone(),
            zoom_factor: self.session.zoom_factor,
            active_state: self.session.default_webview_state,
            useragent_override: self.session.useragent_override.clone(),
            visible: true,
        }
    }
}
