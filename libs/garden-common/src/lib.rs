//! Garden Common - Shared constants and helpers for the garden insight engine
//!
//! # Examples
//!
//! ```
//! use garden_common::{display_name, pluralize, DASHBOARD_HARVEST_WINDOW_DAYS};
//!
//! assert_eq!(DASHBOARD_HARVEST_WINDOW_DAYS, 7);
//! assert_eq!(display_name("Pepper", Some("Jalapeño")), "Pepper (Jalapeño)");
//! assert_eq!(pluralize(2, "task", "tasks"), "2 tasks");
//! ```

pub mod constants;
pub mod utils;

pub use constants::*;
pub use utils::*;
