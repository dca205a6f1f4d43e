use crate::track::id_allocator::TrackIdAllocator;
use crate::trackers::camera::{Advance, CameraTracker, CycleReport};
use crate::trackers::options::{FrameInterval, SpawnMode, TrackerOptions};
use crate::trackers::sink::EvaluationSink;
use crate::trackers::source::{CameraTimeline, Detection, FrameSource};
use crate::{CameraId, Errors, FrameId};
use anyhow::Result;
use itertools::Itertools;
use log::{debug, info, warn};
use rayon::prelude::*;
use rayon::ThreadPool;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Totals of one frame over all cameras
///
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub frame_id: FrameId,
    pub cycle: CycleReport,
    pub records: usize,
}

/// Totals of a run
///
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub records: usize,
    pub tracks_spawned: usize,
    pub tracks_deleted: usize,
    pub interrupted: bool,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn fps(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.frames as f64 / secs
        } else {
            0.0
        }
    }
}

/// Drives the per-camera cycles over an interval of frames.
///
/// Cameras are independent; only the track id allocator is shared between them. Spawning always
/// runs camera by camera in ascending camera order, so id assignment does not depend on whether
/// the association phase runs in parallel.
///
pub struct FrameLoop {
    options: TrackerOptions,
    cameras: Vec<CameraTracker>,
    ids: TrackIdAllocator,
    timeline: CameraTimeline,
    stop: Option<Arc<AtomicBool>>,
    pool: Option<ThreadPool>,
}

impl FrameLoop {
    pub fn new<I>(options: TrackerOptions, cameras: I) -> Result<Self>
    where
        I: IntoIterator<Item = CameraId>,
    {
        options.validate()?;

        let mut seen = HashSet::new();
        let mut camera_ids = Vec::default();
        for c in cameras {
            if !seen.insert(c) {
                return Err(Errors::DuplicateCamera(c).into());
            }
            camera_ids.push(c);
        }
        camera_ids.sort_unstable();

        let pool = if options.parallel_cameras {
            Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(num_cpus::get().min(camera_ids.len()).max(1))
                    .build()?,
            )
        } else {
            None
        };

        let cameras = camera_ids
            .into_iter()
            .map(|c| CameraTracker::new(c, &options))
            .collect();

        Ok(Self {
            options,
            cameras,
            ids: TrackIdAllocator::default(),
            timeline: CameraTimeline::default(),
            stop: None,
            pool,
        })
    }

    pub fn with_timeline(mut self, timeline: CameraTimeline) -> Self {
        self.timeline = timeline;
        self
    }

    /// The run stops before the next frame once `stop` is raised
    ///
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn options(&self) -> &TrackerOptions {
        &self.options
    }

    pub fn cameras(&self) -> &[CameraTracker] {
        &self.cameras
    }

    pub fn camera(&self, camera_id: CameraId) -> Result<&CameraTracker> {
        self.cameras
            .iter()
            .find(|c| c.camera_id() == camera_id)
            .ok_or_else(|| Errors::UnknownCamera(camera_id).into())
    }

    pub fn camera_mut(&mut self, camera_id: CameraId) -> Result<&mut CameraTracker> {
        self.cameras
            .iter_mut()
            .find(|c| c.camera_id() == camera_id)
            .ok_or_else(|| Errors::UnknownCamera(camera_id).into())
    }

    pub fn ids(&self) -> &TrackIdAllocator {
        &self.ids
    }

    fn stop_requested(&self) -> bool {
        self.stop
            .as_ref()
            .map(|s| s.load(Ordering::Relaxed))
            .unwrap_or(false)
    }

    /// Processes every frame of `interval` in order and forwards the records to `sink`
    ///
    pub fn run<S, K>(&mut self, interval: FrameInterval, source: &S, mut sink: K) -> Result<RunSummary>
    where
        S: FrameSource,
        K: EvaluationSink,
    {
        info!(
            "Tracking frames [{}, {}] over {} cameras, spawn mode {:?}",
            interval.first,
            interval.last,
            self.cameras.len(),
            self.options.spawn_mode
        );
        let started = Instant::now();
        let mut summary = RunSummary::default();

        for frame_id in interval.frames() {
            if self.stop_requested() {
                warn!("Run interrupted before frame {}", frame_id);
                summary.interrupted = true;
                break;
            }
            let report = self.process_frame(frame_id, source, &mut sink)?;
            summary.frames += 1;
            summary.records += report.records;
            summary.tracks_spawned += report.cycle.spawned;
            summary.tracks_deleted += report.cycle.deleted;
        }

        sink.flush()?;
        summary.elapsed = started.elapsed();
        info!(
            "Processed {} frames, {} records, {} tracks spawned, FPS: {:.3}",
            summary.frames,
            summary.records,
            summary.tracks_spawned,
            summary.fps()
        );
        Ok(summary)
    }

    /// Runs one cycle per camera for the global frame `frame_id`, then emits the records of all
    /// still active tracks
    ///
    pub fn process_frame<S, K>(&mut self, frame_id: FrameId, source: &S, sink: &mut K) -> Result<FrameReport>
    where
        S: FrameSource,
        K: EvaluationSink,
    {
        let detections = self
            .cameras
            .iter()
            .map(|c| {
                self.timeline
                    .to_local(c.camera_id(), frame_id)
                    .map(|local| source.detections(c.camera_id(), local))
                    .unwrap_or_default()
            })
            .collect::<Vec<Vec<Detection>>>();

        let advances = self.advance_all(frame_id, detections);

        let mut report = FrameReport {
            frame_id,
            ..Default::default()
        };

        for (camera, advance) in self.cameras.iter_mut().zip(advances) {
            let ground_truth = match self.options.spawn_mode {
                SpawnMode::Oracle => source.ground_truth(camera.camera_id(), frame_id),
                SpawnMode::Detections => Vec::default(),
            };
            let cycle = camera.spawn_and_prune(frame_id, advance, &ground_truth, &self.ids);
            report.cycle.matched += cycle.matched;
            report.cycle.missed += cycle.missed;
            report.cycle.spawned += cycle.spawned;
            report.cycle.deleted += cycle.deleted;
        }

        for camera in &self.cameras {
            for record in camera.eval_records(frame_id) {
                sink.accept(&record)?;
                report.records += 1;
            }
        }

        debug!(
            "Frame {}, {} matched/missed/init/total tracks, {} ids allocated",
            frame_id,
            self.cameras
                .iter()
                .map(|c| c.status_counts().to_string())
                .join(", "),
            self.ids.peek() - 1
        );

        Ok(report)
    }

    fn advance_all(&mut self, frame_id: FrameId, detections: Vec<Vec<Detection>>) -> Vec<Advance> {
        match &self.pool {
            Some(pool) => {
                let cameras = &mut self.cameras;
                pool.install(|| {
                    cameras
                        .par_iter_mut()
                        .zip(detections.into_par_iter())
                        .map(|(c, d)| c.advance(frame_id, d))
                        .collect()
                })
            }
            None => self
                .cameras
                .iter_mut()
                .zip(detections)
                .map(|(c, d)| c.advance(frame_id, d))
                .collect(),
        }
    }
}
