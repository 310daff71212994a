//! Terminal page runtime for the Venta Libre client.
//!
//! A small component framework on top of ratatui: a path router with a
//! browser-like history, pages with mount/unmount lifecycle, shared state
//! entities and per-mount task tracking.

pub mod application;
pub mod component;
pub mod error;
pub mod notify;
pub mod router;
pub mod state;
pub mod task;

pub use error::{Error, Result};

// Re-export common types for convenience
pub use application::{AppContext, Application, Context, EventContext};
pub use component::{Action, AnyComponent, Component, Event};
pub use notify::{Notifier, Toast};
pub use router::{page, History, PageHandle, ReloadPolicy, Router};
pub use state::{Entity, EntityId, WeakEntity};
pub use task::{TaskHandle, TaskTracker};
