use crate::track::id_allocator::TrackIdAllocator;
use crate::track::{StatusCounts, Track, TrackStatus};
use crate::trackers::association::Associator;
use crate::trackers::options::TrackerOptions;
use crate::trackers::sink::EvalRecord;
use crate::trackers::source::{Detection, GroundTruthEntry};
use crate::trackers::spawn::{policy_for, SpawnContext, SpawnPolicy};
use crate::{CameraId, Errors, FrameId};
use anyhow::Result;
use log::{debug, trace};
use nalgebra::Point2;

/// What a single cycle did to the track list of a camera
///
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub matched: usize,
    pub missed: usize,
    pub spawned: usize,
    pub deleted: usize,
}

/// Unmatched detections handed from the association phase to the spawn phase
///
#[derive(Debug, Clone, Default)]
pub struct Advance {
    pub report: CycleReport,
    pub unmatched_detections: Vec<Detection>,
}

/// Track list and tracking cycle of one camera.
///
/// A cycle is `predict -> filter detections -> associate -> update/miss -> spawn -> prune`.
/// It is split in [`CameraTracker::advance`], which touches only this camera, and
/// [`CameraTracker::spawn_and_prune`], which allocates track ids.
///
pub struct CameraTracker {
    camera_id: CameraId,
    tracks: Vec<Track>,
    associator: Associator,
    continue_confidence: f32,
    spawn_policy: Box<dyn SpawnPolicy>,
}

impl CameraTracker {
    pub fn new(camera_id: CameraId, options: &TrackerOptions) -> Self {
        Self::with_spawn_policy(camera_id, options, policy_for(options))
    }

    pub fn with_spawn_policy(
        camera_id: CameraId,
        options: &TrackerOptions,
        spawn_policy: Box<dyn SpawnPolicy>,
    ) -> Self {
        Self {
            camera_id,
            tracks: Vec::default(),
            associator: Associator::new(options.gating_distance, options.sentinel_cost),
            continue_confidence: options.continue_confidence,
            spawn_policy,
        }
    }

    pub fn camera_id(&self) -> CameraId {
        self.camera_id
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn status_counts(&self) -> StatusCounts {
        StatusCounts::of(&self.tracks)
    }

    /// Adds an externally created track, it must belong to this camera
    ///
    pub fn insert_track(&mut self, track: Track) -> Result<()> {
        if track.camera_id() != self.camera_id {
            return Err(Errors::CameraMismatch {
                expected: self.camera_id,
                actual: track.camera_id(),
            }
            .into());
        }
        self.tracks.push(track);
        Ok(())
    }

    /// Runs the complete cycle for `frame_id`
    ///
    pub fn step(
        &mut self,
        frame_id: FrameId,
        detections: Vec<Detection>,
        ground_truth: &[GroundTruthEntry],
        ids: &TrackIdAllocator,
    ) -> CycleReport {
        let advance = self.advance(frame_id, detections);
        self.spawn_and_prune(frame_id, advance, ground_truth, ids)
    }

    /// Predicts every track, associates it with the confident detections and applies hits and misses.
    ///
    pub fn advance(&mut self, frame_id: FrameId, detections: Vec<Detection>) -> Advance {
        for t in self.tracks.iter_mut() {
            t.predict();
        }

        let detections = detections
            .into_iter()
            .filter(|d| d.confidence > self.continue_confidence)
            .collect::<Vec<_>>();

        let predicted = self
            .tracks
            .iter()
            .map(|t| t.position())
            .collect::<Vec<_>>();
        let centers = detections
            .iter()
            .map(|d| d.center())
            .collect::<Vec<Point2<f32>>>();

        let association = self.associator.associate(&predicted, &centers);

        for (t, d) in &association.matches {
            self.tracks[*t].mark_matched(frame_id, &detections[*d].bbox);
        }
        for t in &association.unmatched_tracks {
            self.tracks[*t].mark_missed();
        }

        trace!(
            "Camera {}, frame {}: {} tracks, {} detections, matches {:?}",
            self.camera_id,
            frame_id,
            predicted.len(),
            centers.len(),
            association.matches
        );

        Advance {
            report: CycleReport {
                matched: association.matches.len(),
                missed: association.unmatched_tracks.len(),
                ..Default::default()
            },
            unmatched_detections: association
                .unmatched_detections
                .iter()
                .map(|d| detections[*d])
                .collect(),
        }
    }

    /// Spawns new tracks with the configured policy and drops the deleted ones
    ///
    pub fn spawn_and_prune(
        &mut self,
        frame_id: FrameId,
        advance: Advance,
        ground_truth: &[GroundTruthEntry],
        ids: &TrackIdAllocator,
    ) -> CycleReport {
        let mut report = advance.report;
        let ctx = SpawnContext {
            camera_id: self.camera_id,
            frame_id,
            unmatched_detections: &advance.unmatched_detections,
            ground_truth,
        };
        let spawned = self.spawn_policy.spawn(&ctx, ids);
        report.spawned = spawned.len();
        self.tracks.extend(spawned);

        let before = self.tracks.len();
        self.tracks.retain(|t| t.status() != TrackStatus::Deleted);
        report.deleted = before - self.tracks.len();

        debug!(
            "Camera {}, frame {}: {} matched/missed/init/total, {} spawned, {} deleted",
            self.camera_id,
            frame_id,
            self.status_counts(),
            report.spawned,
            report.deleted
        );
        report
    }

    /// Records of every track still alive in `frame_id`
    ///
    pub fn eval_records(&self, frame_id: FrameId) -> impl Iterator<Item = EvalRecord> + '_ {
        self.tracks.iter().filter_map(move |t| t.eval_record(frame_id))
    }
}
