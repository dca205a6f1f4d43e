use thiserror::Error;

/// Camera identifier as supplied by the detection source (1-based in DukeMTMC-like datasets)
pub type CameraId = u32;

/// Frame number; global for the frame loop, camera-local for detection lookups
pub type FrameId = u64;

/// Globally unique track identifier
pub type TrackId = u64;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Errors {
    #[error("Time step must be finite and non-negative, got {0}.")]
    InvalidTimeStep(f32),
    #[error("Gating distance must be finite and positive, got {0}.")]
    InvalidGatingDistance(f32),
    #[error("Sentinel cost {sentinel} must be within [1000 * gate, 1e9] for the gating distance {gate}.")]
    InvalidSentinelCost { sentinel: f32, gate: f32 },
    #[error("Confidence threshold must be within [0.0, 1.0], got {0}.")]
    InvalidConfidence(f32),
    #[error("Lifecycle thresholds must be positive (init={init}, delete={delete}).")]
    InvalidLifecycle { init: usize, delete: usize },
    #[error("Noise parameter `{0}` must be finite and positive.")]
    InvalidNoise(&'static str),
    #[error("Frame interval [{first}, {last}] is reversed.")]
    ReversedInterval { first: FrameId, last: FrameId },
    #[error("Camera {0} is registered twice.")]
    DuplicateCamera(CameraId),
    #[error("Recording of camera {0} must start at frame 1 or later.")]
    InvalidStartFrame(CameraId),
    #[error("Camera {0} is not registered.")]
    UnknownCamera(CameraId),
    #[error("Track of camera {actual} cannot be added to camera {expected}.")]
    CameraMismatch { expected: CameraId, actual: CameraId },
    #[error("Evaluation sink is closed.")]
    SinkClosed,
}

pub(crate) const EPS: f32 = 0.00001;

/// Approximate equality for floating point geometry
pub trait EstimateClose {
    fn almost_same(&self, other: &Self, eps: f32) -> bool;
}

/// Bounding boxes, frame sizes, Kalman filtering and assignment solving
pub mod utils;

/// Track lifecycle and the per-track motion model
pub mod track;

/// Association, per-camera cycle and the frame loop
pub mod trackers;

/// Synthetic scene generators for demos, benches and tests
pub mod examples;

pub mod prelude;
