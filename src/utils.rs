/// Bounding boxes and reference frame sizes
pub mod bbox;

/// Kalman filter
pub mod kalman;

/// Minimum-cost rectangular assignment
pub mod linear_sum_assignment;
