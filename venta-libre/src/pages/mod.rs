//! Routed pages.
//!
//! Each page keeps its view state in an `Entity`, loads data on mount and
//! aborts whatever it spawned on unmount. A result that lands after the page
//! was left is dropped by comparing mount generations.

pub mod home;
pub mod not_found;
pub mod users;

pub use home::{HomePage, ProductFeed};
pub use not_found::NotFoundPage;
pub use users::UsersPage;

/// Where a page's primary data stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Loading,
    Ready,
    Failed(String),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }
}
