//! Presentational components
//!
//! Stateless widgets the pages and the root compose. Each takes borrowed view
//! data and draws into the area it is given.

pub mod category_list;
pub mod nav_bar;
pub mod placeholder;
pub mod product_card;
pub mod search_bar;

pub use category_list::CategoryList;
pub use nav_bar::{BottomNav, NavBar};
pub use product_card::ProductCard;
pub use search_bar::SearchBar;
