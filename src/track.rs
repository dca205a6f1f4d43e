use crate::track::motion::MotionModel;
use crate::trackers::sink::EvalRecord;
use crate::utils::bbox::BoundingBox;
use crate::utils::kalman::kalman_2d_point::Point2DKalmanFilter;
use crate::{CameraId, FrameId, TrackId};
use nalgebra::Point2;
use std::collections::VecDeque;
use std::fmt;

/// Monotonic track id allocation
pub mod id_allocator;

/// Constant-velocity motion model owned by a track
pub mod motion;

/// Lifecycle state of a track.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackStatus {
    /// Spawned but has not yet collected `init_threshold` consecutive hits
    Init,
    /// Associated with a detection in the current frame
    Matched,
    /// No detection was associated in the current frame
    Missed,
    /// Terminal; the track is dropped at the end of the cycle
    Deleted,
}

impl TrackStatus {
    /// Status after a successful association.
    ///
    /// `confirmed` tells whether the track has ever reached the init threshold.
    ///
    pub fn on_hit(self, confirmed: bool, hits: usize, lifecycle: &Lifecycle) -> Self {
        match self {
            TrackStatus::Deleted => TrackStatus::Deleted,
            _ if !confirmed && hits < lifecycle.init_threshold => TrackStatus::Init,
            _ => TrackStatus::Matched,
        }
    }

    /// Status after a frame without association
    ///
    pub fn on_miss(self, misses: usize, lifecycle: &Lifecycle) -> Self {
        match self {
            TrackStatus::Deleted => TrackStatus::Deleted,
            _ if misses >= lifecycle.delete_threshold => TrackStatus::Deleted,
            _ => TrackStatus::Missed,
        }
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, TrackStatus::Deleted)
    }
}

/// Promotion and deletion thresholds of a track
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lifecycle {
    /// Consecutive hits, including the spawning one, required to leave `Init`
    pub init_threshold: usize,
    /// Consecutive misses after which the track is `Deleted`
    pub delete_threshold: usize,
}

impl Lifecycle {
    pub fn new(init_threshold: usize, delete_threshold: usize) -> Self {
        Self {
            init_threshold,
            delete_threshold,
        }
    }
}

/// Thresholds used for detection-spawned tracks
impl Default for Lifecycle {
    fn default() -> Self {
        Self::new(2, 3)
    }
}

/// Confirmed position of a track in a frame
///
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryEntry {
    pub frame_id: FrameId,
    pub position: Point2<f32>,
}

/// One tracked object of a single camera
///
#[derive(Debug, Clone)]
pub struct Track {
    track_id: TrackId,
    camera_id: CameraId,
    motion: MotionModel,
    status: TrackStatus,
    confirmed: bool,
    hits: usize,
    misses: usize,
    lifecycle: Lifecycle,
    history: VecDeque<HistoryEntry>,
    history_length: usize,
    box_size: (f32, f32),
    ground_truth_id: Option<u64>,
    first_frame: FrameId,
    last_matched_frame: FrameId,
}

impl Track {
    /// Spawns a track seeded at the center of `seed`.
    ///
    /// The spawning observation counts as the first consecutive hit, so the track starts in
    /// `Init` unless `init_threshold` is 1.
    ///
    pub fn new(
        track_id: TrackId,
        camera_id: CameraId,
        frame_id: FrameId,
        seed: &BoundingBox,
        filter: Point2DKalmanFilter,
        lifecycle: Lifecycle,
    ) -> Self {
        let position = seed.center();
        let status = TrackStatus::Init.on_hit(false, 1, &lifecycle);
        let mut track = Self {
            track_id,
            camera_id,
            motion: MotionModel::new(filter, &position),
            status,
            confirmed: status == TrackStatus::Matched,
            hits: 1,
            misses: 0,
            lifecycle,
            history: VecDeque::default(),
            history_length: 0,
            box_size: (seed.width(), seed.height()),
            ground_truth_id: None,
            first_frame: frame_id,
            last_matched_frame: frame_id,
        };
        track.record(frame_id, position);
        track
    }

    /// Bounds the position history to the last `length` entries, 0 keeps everything
    ///
    pub fn with_history_length(mut self, length: usize) -> Self {
        self.history_length = length;
        self.trim_history();
        self
    }

    pub fn with_ground_truth_id(mut self, ground_truth_id: u64) -> Self {
        self.ground_truth_id = Some(ground_truth_id);
        self
    }

    pub fn predict(&mut self) {
        self.motion.predict();
    }

    /// Applies an accepted association with the detection box `observed`
    ///
    pub fn mark_matched(&mut self, frame_id: FrameId, observed: &BoundingBox) {
        if self.status.is_deleted() {
            return;
        }
        self.motion.update(&observed.center());
        self.hits += 1;
        self.misses = 0;
        self.status = self.status.on_hit(self.confirmed, self.hits, &self.lifecycle);
        self.confirmed |= self.status == TrackStatus::Matched;
        self.box_size = (observed.width(), observed.height());
        self.last_matched_frame = frame_id;
        self.record(frame_id, self.motion.position());
    }

    /// Registers a frame without an accepted association
    ///
    pub fn mark_missed(&mut self) {
        if self.status.is_deleted() {
            return;
        }
        self.misses += 1;
        self.hits = 0;
        self.status = self.status.on_miss(self.misses, &self.lifecycle);
    }

    fn record(&mut self, frame_id: FrameId, position: Point2<f32>) {
        self.history.push_back(HistoryEntry { frame_id, position });
        self.trim_history();
    }

    fn trim_history(&mut self) {
        if self.history_length > 0 {
            while self.history.len() > self.history_length {
                self.history.pop_front();
            }
        }
    }

    /// Evaluation record for `frame_id`, `None` once the track is deleted
    ///
    pub fn eval_record(&self, frame_id: FrameId) -> Option<EvalRecord> {
        if self.status.is_deleted() || self.history.is_empty() {
            return None;
        }
        let position = self.position();
        Some(EvalRecord {
            camera_id: self.camera_id,
            frame_id,
            track_id: self.track_id,
            position,
            bbox: BoundingBox::centered_at(&position, self.box_size.0, self.box_size.1),
            status: self.status,
        })
    }

    pub fn track_id(&self) -> TrackId {
        self.track_id
    }

    pub fn camera_id(&self) -> CameraId {
        self.camera_id
    }

    pub fn status(&self) -> TrackStatus {
        self.status
    }

    /// Current position estimate; after `predict` and before association it is the prediction
    ///
    pub fn position(&self) -> Point2<f32> {
        self.motion.position()
    }

    pub fn motion(&self) -> &MotionModel {
        &self.motion
    }

    pub fn consecutive_hit_count(&self) -> usize {
        self.hits
    }

    pub fn consecutive_miss_count(&self) -> usize {
        self.misses
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    pub fn history(&self) -> &VecDeque<HistoryEntry> {
        &self.history
    }

    pub fn ground_truth_id(&self) -> Option<u64> {
        self.ground_truth_id
    }

    pub fn first_frame(&self) -> FrameId {
        self.first_frame
    }

    pub fn last_matched_frame(&self) -> FrameId {
        self.last_matched_frame
    }
}

/// Per-status census of a track list
///
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub matched: usize,
    pub missed: usize,
    pub init: usize,
    pub deleted: usize,
    pub total: usize,
}

impl StatusCounts {
    pub fn of<'a>(tracks: impl IntoIterator<Item = &'a Track>) -> Self {
        tracks
            .into_iter()
            .fold(StatusCounts::default(), |mut acc, t| {
                match t.status() {
                    TrackStatus::Matched => acc.matched += 1,
                    TrackStatus::Missed => acc.missed += 1,
                    TrackStatus::Init => acc.init += 1,
                    TrackStatus::Deleted => acc.deleted += 1,
                }
                acc.total += 1;
                acc
            })
    }
}

impl fmt::Display for StatusCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:2} +{:2} +{:2} ={:2}",
            self.matched, self.missed, self.init, self.total
        )
    }
}
