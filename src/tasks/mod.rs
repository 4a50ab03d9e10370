//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Sweep: Removes expired cache entries at configured intervals

mod sweep;

pub use sweep::{spawn_sweep_task, start_configured_sweep, SweepHandle};
