use crate::track::id_allocator::TrackIdAllocator;
use crate::track::{Lifecycle, Track};
use crate::trackers::options::{SpawnMode, TrackerOptions};
use crate::trackers::source::{Detection, GroundTruthEntry};
use crate::utils::bbox::FrameSize;
use crate::utils::kalman::kalman_2d_point::Point2DKalmanFilter;
use crate::{CameraId, FrameId};
use log::trace;
use std::collections::HashSet;

/// Inputs available to a spawn policy at the end of a camera cycle
///
#[derive(Debug, Clone, Copy)]
pub struct SpawnContext<'a> {
    pub camera_id: CameraId,
    /// Global frame number
    pub frame_id: FrameId,
    /// Detections of the frame left without an accepted association
    pub unmatched_detections: &'a [Detection],
    pub ground_truth: &'a [GroundTruthEntry],
}

/// Strategy creating new tracks for one camera
///
pub trait SpawnPolicy: Send {
    fn spawn(&mut self, ctx: &SpawnContext<'_>, ids: &TrackIdAllocator) -> Vec<Track>;

    fn mode(&self) -> SpawnMode;
}

/// Creates the spawn policy of one camera for the configured mode
///
pub fn policy_for(options: &TrackerOptions) -> Box<dyn SpawnPolicy> {
    let filter = options.motion.filter();
    match options.spawn_mode {
        SpawnMode::Detections => Box::new(DetectionSpawn {
            spawn_confidence: options.spawn_confidence,
            lifecycle: options.detection_lifecycle,
            filter,
            history_length: options.history_length,
        }),
        SpawnMode::Oracle => Box::new(OracleSpawn {
            lifecycle: options.oracle_lifecycle,
            filter,
            frame_size: options.frame_size,
            history_length: options.history_length,
            spawned: HashSet::default(),
        }),
    }
}

/// Every unmatched detection whose confidence exceeds the threshold becomes an `Init` track
///
#[derive(Debug, Clone)]
pub struct DetectionSpawn {
    spawn_confidence: f32,
    lifecycle: Lifecycle,
    filter: Point2DKalmanFilter,
    history_length: usize,
}

impl SpawnPolicy for DetectionSpawn {
    fn spawn(&mut self, ctx: &SpawnContext<'_>, ids: &TrackIdAllocator) -> Vec<Track> {
        ctx.unmatched_detections
            .iter()
            .filter(|d| d.confidence > self.spawn_confidence)
            .map(|d| {
                let track_id = ids.allocate();
                trace!(
                    "Camera {}, frame {}: track {} spawned from detection {:?}",
                    ctx.camera_id,
                    ctx.frame_id,
                    track_id,
                    d.bbox
                );
                Track::new(
                    track_id,
                    ctx.camera_id,
                    ctx.frame_id,
                    &d.bbox,
                    self.filter,
                    self.lifecycle,
                )
                .with_history_length(self.history_length)
            })
            .collect()
    }

    fn mode(&self) -> SpawnMode {
        SpawnMode::Detections
    }
}

/// Seeds one track per ground-truth identity the first time the identity shows up in the camera.
///
/// An identity is never respawned, even after its track has been deleted.
///
#[derive(Debug, Clone)]
pub struct OracleSpawn {
    lifecycle: Lifecycle,
    filter: Point2DKalmanFilter,
    frame_size: FrameSize,
    history_length: usize,
    spawned: HashSet<u64>,
}

impl SpawnPolicy for OracleSpawn {
    fn spawn(&mut self, ctx: &SpawnContext<'_>, ids: &TrackIdAllocator) -> Vec<Track> {
        let mut res = Vec::default();
        for gt in ctx.ground_truth {
            if !self.spawned.insert(gt.identity) {
                continue;
            }
            let track_id = ids.allocate();
            trace!(
                "Camera {}, frame {}: track {} seeded from identity {}",
                ctx.camera_id,
                ctx.frame_id,
                track_id,
                gt.identity
            );
            res.push(
                Track::new(
                    track_id,
                    ctx.camera_id,
                    ctx.frame_id,
                    &gt.pixel_box(self.frame_size),
                    self.filter,
                    self.lifecycle,
                )
                .with_history_length(self.history_length)
                .with_ground_truth_id(gt.identity),
            );
        }
        res
    }

    fn mode(&self) -> SpawnMode {
        SpawnMode::Oracle
    }
}
