//! State module for tracking worker progress
//!
//! # Components
//!
//! - `WorkerState`: Tracks what each worker is doing (idle, fetching, enriching, etc.)

mod worker_state;

pub use worker_state::WorkerState;
