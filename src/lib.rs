// Tab Shell Library Entry Point
// Coordinates browser tabs with the content webviews behind them.

pub mod browser;
pub mod error;
pub mod ids;
pub mod settings;
pub mod view;

// Shared state
pub mod state;

// Pure logic modules (no Tauri imports)
pub mod modules;

// Tauri-backed views and commands
#[cfg(feature = "shell")]
pub mod shell;

#[cfg(test)]
mod testing;

pub use browser::{Browser, Host};
pub use error::{BrowserError, ViewError};
pub use modules::tabs::{TabStore, TabsModel};
pub use state::{NavState, TabId, TabKind, TabState};
pub use view::{ContentView, EventSink, ViewEvent, ViewFactory};
