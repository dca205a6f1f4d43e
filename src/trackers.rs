/// Gated detection-to-track association
pub mod association;

/// Per-camera tracking cycle
pub mod camera;

/// Frame loop controller that drives all cameras
pub mod frame_loop;

/// Tracker configuration
pub mod options;

/// Evaluation sinks
pub mod sink;

/// Detection and ground-truth sources
pub mod source;

/// Track spawning strategies
pub mod spawn;

#[cfg(test)]
mod scenario_tests;
