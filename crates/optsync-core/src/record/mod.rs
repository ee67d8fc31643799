//! Domain records exchanged between the CSV side and the admin API.

pub mod model;

pub use model::{CSV_HEADERS, CSV_WIDTH};
