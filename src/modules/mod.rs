// Module exports for pure logic
pub mod navigation;
pub mod closed_tabs;         // Recently closed tabs stack
pub mod closed_tabs_store;   // Persistence layer
pub mod tabs;                // Tab list model
