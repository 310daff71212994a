//! Component module.
//!
//! Defines the `Component` trait (the page/view contract) and its
//! dyn-compatible twin used by the router.

pub mod traits;

pub use traits::{Action, AnyComponent, Component, Event};
