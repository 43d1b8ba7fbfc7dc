//! Tower layers for the HTTP client middleware stack

mod default_header;

pub use default_header::{DefaultHeaderLayer, DefaultHeaderService};
