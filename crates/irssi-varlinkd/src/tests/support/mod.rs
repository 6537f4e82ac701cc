//! Test harness utilities for the service behavioural suites.

mod client;
mod reporter;
mod world;

pub use client::TestClient;
pub use reporter::{HealthEvent, RecordingHealthReporter};
pub use world::{ServiceWorld, world};
