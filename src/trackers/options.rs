use crate::track::Lifecycle;
use crate::utils::bbox::FrameSize;
use crate::utils::kalman::kalman_2d_point::Point2DKalmanFilter;
use crate::utils::kalman::DEFAULT_DT;
use crate::{Errors, FrameId};
use anyhow::Result;

/// Default gating distance in pixels
pub const DEFAULT_GATING_DISTANCE: f32 = 200.0;

/// Cost substituted for pairs beyond the gate
pub const DEFAULT_SENTINEL_COST: f32 = 999_999.0;

/// The sentinel must be at least this many gating distances, so that the solver never prefers a
/// sentinel pair to a set of valid matches of up to this size
pub const MIN_SENTINEL_GATE_RATIO: f32 = 1_000.0;

/// Upper bound of the sentinel, keeps the scaled integer costs of the solver far from overflow
pub const MAX_SENTINEL_COST: f32 = 1e9;

/// Detections at or below this confidence are discarded
pub const DEFAULT_CONTINUE_CONFIDENCE: f32 = 0.0;

/// Unmatched detections above this confidence spawn tracks
pub const DEFAULT_SPAWN_CONFIDENCE: f32 = 0.3;

/// Noise model of the constant-velocity filter
///
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionModelOptions {
    /// Time step between two frames, seconds
    pub dt: f32,
    pub initial_position_std: f32,
    pub initial_velocity_std: f32,
    pub process_position_std: f32,
    pub process_velocity_std: f32,
    pub measurement_std: f32,
}

impl Default for MotionModelOptions {
    fn default() -> Self {
        Self {
            dt: DEFAULT_DT,
            initial_position_std: 10.0,
            initial_velocity_std: 100.0,
            process_position_std: 1.0,
            process_velocity_std: 1.0,
            measurement_std: 10.0,
        }
    }
}

impl MotionModelOptions {
    pub fn filter(&self) -> Point2DKalmanFilter {
        Point2DKalmanFilter::new(
            self.dt,
            [self.initial_position_std, self.initial_velocity_std],
            [self.process_position_std, self.process_velocity_std],
            self.measurement_std,
        )
    }

    pub fn validate(&self) -> Result<()> {
        if !self.dt.is_finite() || self.dt < 0.0 {
            return Err(Errors::InvalidTimeStep(self.dt).into());
        }
        let positive = [
            ("initial_position_std", self.initial_position_std),
            ("initial_velocity_std", self.initial_velocity_std),
            ("process_position_std", self.process_position_std),
            ("process_velocity_std", self.process_velocity_std),
            ("measurement_std", self.measurement_std),
        ];
        for (name, v) in positive {
            if !v.is_finite() || v <= 0.0 {
                return Err(Errors::InvalidNoise(name).into());
            }
        }
        Ok(())
    }
}

/// How new tracks come into existence, chosen once per run
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpawnMode {
    /// Unmatched confident detections become tracks
    #[default]
    Detections,
    /// Every ground-truth identity seen for the first time in a camera becomes a track
    Oracle,
}

/// Tracker configuration
///
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerOptions {
    pub motion: MotionModelOptions,
    /// Maximal center distance in pixels for a track/detection pair to be associated
    pub gating_distance: f32,
    pub sentinel_cost: f32,
    pub continue_confidence: f32,
    pub spawn_confidence: f32,
    pub detection_lifecycle: Lifecycle,
    pub oracle_lifecycle: Lifecycle,
    pub spawn_mode: SpawnMode,
    /// Maximal length of a track position history, 0 keeps everything
    pub history_length: usize,
    /// Reference frame for ground-truth boxes
    pub frame_size: FrameSize,
    /// Run the per-camera predict/associate/update phase on the rayon pool
    pub parallel_cameras: bool,
}

impl Default for TrackerOptions {
    fn default() -> Self {
        Self {
            motion: MotionModelOptions::default(),
            gating_distance: DEFAULT_GATING_DISTANCE,
            sentinel_cost: DEFAULT_SENTINEL_COST,
            continue_confidence: DEFAULT_CONTINUE_CONFIDENCE,
            spawn_confidence: DEFAULT_SPAWN_CONFIDENCE,
            detection_lifecycle: Lifecycle::default(),
            oracle_lifecycle: Lifecycle::new(3, 5),
            spawn_mode: SpawnMode::Detections,
            history_length: 0,
            frame_size: FrameSize::default(),
            parallel_cameras: false,
        }
    }
}

impl TrackerOptions {
    pub fn with_motion(mut self, motion: MotionModelOptions) -> Self {
        self.motion = motion;
        self
    }

    pub fn with_gating_distance(mut self, gating_distance: f32) -> Self {
        self.gating_distance = gating_distance;
        self
    }

    pub fn with_sentinel_cost(mut self, sentinel_cost: f32) -> Self {
        self.sentinel_cost = sentinel_cost;
        self
    }

    pub fn with_confidence(mut self, continue_confidence: f32, spawn_confidence: f32) -> Self {
        self.continue_confidence = continue_confidence;
        self.spawn_confidence = spawn_confidence;
        self
    }

    pub fn with_detection_lifecycle(mut self, lifecycle: Lifecycle) -> Self {
        self.detection_lifecycle = lifecycle;
        self
    }

    pub fn with_oracle_lifecycle(mut self, lifecycle: Lifecycle) -> Self {
        self.oracle_lifecycle = lifecycle;
        self
    }

    pub fn with_spawn_mode(mut self, spawn_mode: SpawnMode) -> Self {
        self.spawn_mode = spawn_mode;
        self
    }

    pub fn with_history_length(mut self, history_length: usize) -> Self {
        self.history_length = history_length;
        self
    }

    pub fn with_frame_size(mut self, frame_size: FrameSize) -> Self {
        self.frame_size = frame_size;
        self
    }

    pub fn with_parallel_cameras(mut self, parallel_cameras: bool) -> Self {
        self.parallel_cameras = parallel_cameras;
        self
    }

    /// Lifecycle thresholds of the tracks spawned by the configured mode
    ///
    pub fn spawn_lifecycle(&self) -> Lifecycle {
        match self.spawn_mode {
            SpawnMode::Detections => self.detection_lifecycle,
            SpawnMode::Oracle => self.oracle_lifecycle,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.motion.validate()?;
        if !self.gating_distance.is_finite() || self.gating_distance <= 0.0 {
            return Err(Errors::InvalidGatingDistance(self.gating_distance).into());
        }
        let sentinel_range = self.gating_distance * MIN_SENTINEL_GATE_RATIO..=MAX_SENTINEL_COST;
        if !sentinel_range.contains(&self.sentinel_cost) {
            return Err(Errors::InvalidSentinelCost {
                sentinel: self.sentinel_cost,
                gate: self.gating_distance,
            }
            .into());
        }
        for c in [self.continue_confidence, self.spawn_confidence] {
            if !(0.0..=1.0).contains(&c) {
                return Err(Errors::InvalidConfidence(c).into());
            }
        }
        for l in [self.detection_lifecycle, self.oracle_lifecycle] {
            if l.init_threshold == 0 || l.delete_threshold == 0 {
                return Err(Errors::InvalidLifecycle {
                    init: l.init_threshold,
                    delete: l.delete_threshold,
                }
                .into());
            }
        }
        Ok(())
    }
}

/// Closed interval of global frames processed by a run
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInterval {
    pub first: FrameId,
    pub last: FrameId,
}

impl FrameInterval {
    pub fn new(first: FrameId, last: FrameId) -> Result<Self> {
        if first > last {
            return Err(Errors::ReversedInterval { first, last }.into());
        }
        Ok(Self { first, last })
    }

    pub fn frames(&self) -> impl Iterator<Item = FrameId> {
        self.first..=self.last
    }

    pub fn frame_count(&self) -> u64 {
        (self.last - self.first).saturating_add(1)
    }
}

#[cfg(test)]
mod tests {
    use crate::track::Lifecycle;
    use crate::trackers::options::{
        FrameInterval, MotionModelOptions, SpawnMode, TrackerOptions,
    };
    use crate::Errors;

    fn error_of(opts: &TrackerOptions) -> Errors {
        opts.validate()
            .unwrap_err()
            .downcast::<Errors>()
            .unwrap()
    }

    #[test]
    fn defaults_are_valid() {
        let opts = TrackerOptions::default();
        opts.validate().unwrap();
        assert_eq!(opts.spawn_lifecycle(), Lifecycle::new(2, 3));
        assert_eq!(
            opts.with_spawn_mode(SpawnMode::Oracle).spawn_lifecycle(),
            Lifecycle::new(3, 5)
        );
    }

    #[test]
    fn invalid_values() {
        assert_eq!(
            error_of(&TrackerOptions::default().with_gating_distance(-1.0)),
            Errors::InvalidGatingDistance(-1.0)
        );
        assert_eq!(
            error_of(&TrackerOptions::default().with_gating_distance(1e7)),
            Errors::InvalidSentinelCost {
                sentinel: 999_999.0,
                gate: 1e7
            }
        );
        assert_eq!(
            error_of(&TrackerOptions::default().with_confidence(0.0, 1.5)),
            Errors::InvalidConfidence(1.5)
        );
        assert_eq!(
            error_of(&TrackerOptions::default().with_detection_lifecycle(Lifecycle::new(0, 3))),
            Errors::InvalidLifecycle { init: 0, delete: 3 }
        );
        let motion = MotionModelOptions {
            measurement_std: 0.0,
            ..Default::default()
        };
        assert_eq!(
            error_of(&TrackerOptions::default().with_motion(motion)),
            Errors::InvalidNoise("measurement_std")
        );
        let motion = MotionModelOptions {
            dt: f32::NAN,
            ..Default::default()
        };
        assert!(matches!(
            error_of(&TrackerOptions::default().with_motion(motion)),
            Errors::InvalidTimeStep(_)
        ));
    }

    #[test]
    fn sentinel_bounds() {
        let opts = TrackerOptions::default().with_gating_distance(200.0);
        opts.clone().with_sentinel_cost(200_000.0).validate().unwrap();
        opts.clone().with_sentinel_cost(1e9).validate().unwrap();

        // a sentinel barely above the gate lets the solver trade two valid matches for one
        assert_eq!(
            error_of(&opts.clone().with_sentinel_cost(201.0)),
            Errors::InvalidSentinelCost {
                sentinel: 201.0,
                gate: 200.0
            }
        );
        // large sentinels overflow the integer costs of the solver
        assert_eq!(
            error_of(&opts.clone().with_sentinel_cost(1e16)),
            Errors::InvalidSentinelCost {
                sentinel: 1e16,
                gate: 200.0
            }
        );
        assert!(matches!(
            error_of(&opts.with_sentinel_cost(f32::NAN)),
            Errors::InvalidSentinelCost { .. }
        ));
    }

    #[test]
    fn interval() {
        let i = FrameInterval::new(3, 5).unwrap();
        assert_eq!(i.frames().collect::<Vec<_>>(), vec![3, 4, 5]);
        assert_eq!(i.frame_count(), 3);
        assert_eq!(FrameInterval::new(4, 4).unwrap().frame_count(), 1);
        assert!(FrameInterval::new(5, 3).is_err());
        assert_eq!(FrameInterval::new(0, u64::MAX).unwrap().frame_count(), u64::MAX);
    }
}
