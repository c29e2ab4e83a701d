//! atlas-desk: an operator console for appointment requests stored behind
//! an HTTP document Data API, with a local-fallback sample mode.

pub mod charts;
pub mod config;
pub mod gateway;
pub mod model;
pub mod mutation;
pub mod poller;
pub mod render;
pub mod sample;
pub mod store;
