// Recording test doubles for the content view and host seams.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use futures_util::future::{self, BoxFuture, FutureExt};

use crate::browser::Host;
use crate::error::ViewError;
use crate::state::{NavState, TabId};
use crate::view::{
    ClearDataOptions, ClearDataTypes, ContentView, EventSink, ViewConfig, ViewEvent, ViewFactory,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Navigate(String),
    Back,
    Forward,
    ReloadStop,
    SetZoom(f64),
    ClearData(ClearDataOptions, ClearDataTypes),
    Attach,
    BeforeDelete,
}

#[derive(Debug)]
pub struct ViewRecord {
    pub tab: TabId,
    pub config: ViewConfig,
    /// `None` once the view has let go of its event sink.
    pub sink: Option<EventSink>,
    pub calls: Vec<Call>,
    pub aborted: bool,
}

impl ViewRecord {
    pub fn count(&self, call: &Call) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    pub fn deleted(&self) -> bool {
        self.calls.contains(&Call::BeforeDelete)
    }
}

pub type SharedRecord = Arc<Mutex<ViewRecord>>;

struct MockView {
    record: SharedRecord,
    ready_on_attach: bool,
    drop_sink_on_attach: bool,
    fail_clear: bool,
}

impl MockView {
    fn log(&self, call: Call) {
        self.record.lock().unwrap().calls.push(call);
    }
}

impl ContentView for MockView {
    fn navigate(&mut self, url: &str) {
        self.log(Call::Navigate(url.to_string()));
    }

    fn back(&mut self) {
        self.log(Call::Back);
    }

    fn forward(&mut self) {
        self.log(Call::Forward);
    }

    fn reload_stop(&mut self) {
        self.log(Call::ReloadStop);
    }

    fn set_zoom(&mut self, factor: f64) {
        self.log(Call::SetZoom(factor));
    }

    fn clear_data(
        &mut self,
        options: ClearDataOptions,
        types: ClearDataTypes,
    ) -> BoxFuture<'static, Result<(), ViewError>> {
        self.log(Call::ClearData(options, types));
        let result = if self.fail_clear {
            Err(ViewError::Backend("storage locked".to_string()))
        } else {
            Ok(())
        };
        future::ready(result).boxed()
    }

    fn attach(&mut self) {
        self.log(Call::Attach);
        let mut record = self.record.lock().unwrap();
        if self.ready_on_attach {
            let nav = NavState {
                url: record.config.url.clone(),
                ..NavState::default()
            };
            if let Some(sink) = &record.sink {
                sink.emit(ViewEvent::NavStateChanged(nav));
            }
        }
        if self.drop_sink_on_attach {
            record.sink = None;
        }
    }

    fn before_delete(&mut self) {
        self.log(Call::BeforeDelete);
    }

    fn is_aborted(&self) -> bool {
        self.record.lock().unwrap().aborted
    }
}

/// Builds recording views; every view ever created stays reachable through `views`.
#[derive(Clone, Default)]
pub struct MockFactory {
    pub views: Arc<Mutex<Vec<SharedRecord>>>,
    pub ready_on_attach: bool,
    pub drop_sink_on_attach: bool,
    pub fail_clear: bool,
}

impl MockFactory {
    pub fn new() -> Self {
        Self {
            ready_on_attach: true,
            ..Self::default()
        }
    }

    pub fn created(&self) -> usize {
        self.views.lock().unwrap().len()
    }

    pub fn record(&self, index: usize) -> SharedRecord {
        self.views.lock().unwrap()[index].clone()
    }

    pub fn record_for(&self, tab: TabId) -> Option<SharedRecord> {
        self.views
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.lock().unwrap().tab == tab)
            .cloned()
    }

    /// Emits `event` the way the view for `tab` would.
    pub fn emit(&self, tab: TabId, event: ViewEvent) {
        let record = self.record_for(tab).expect("no view for tab");
        let record = record.lock().unwrap();
        if let Some(sink) = &record.sink {
            sink.emit(event);
        }
    }
}

impl ViewFactory for MockFactory {
    fn create(&mut self, config: ViewConfig, events: EventSink) -> Box<dyn ContentView> {
        let record = Arc::new(Mutex::new(ViewRecord {
            tab: events.tab(),
            config,
            sink: Some(events),
            calls: Vec::new(),
            aborted: false,
        }));
        self.views.lock().unwrap().push(record.clone());
        Box::new(MockView {
            record,
            ready_on_attach: self.ready_on_attach,
            drop_sink_on_attach: self.drop_sink_on_attach,
            fail_clear: self.fail_clear,
        })
    }
}

#[derive(Clone, Default)]
pub struct MockHost {
    pub closed: Arc<AtomicBool>,
}

impl Host for MockHost {
    fn close_window(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
