//! Shared pieces of the Stagehand demos: settings loading and an in-memory
//! host scene standing in for a real engine.

pub mod sandbox;
pub mod settings;

pub use sandbox::{LoggingAllocator, Sandbox};
pub use settings::{ScriptSettings, Settings, load_or_default, load_settings};
