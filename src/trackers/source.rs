use crate::utils::bbox::{BoundingBox, FrameSize, NormalizedBox};
use crate::{CameraId, Errors, FrameId};
use anyhow::Result;
use itertools::Itertools;
use nalgebra::Point2;
use std::collections::HashMap;

/// Detector output for one object in one camera frame, in pixels
///
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub camera_id: CameraId,
    /// Camera-local frame number
    pub frame_id: FrameId,
    pub bbox: BoundingBox,
    pub confidence: f32,
}

impl Detection {
    pub fn new(camera_id: CameraId, frame_id: FrameId, bbox: BoundingBox, confidence: f32) -> Self {
        Self {
            camera_id,
            frame_id,
            bbox,
            confidence,
        }
    }

    pub fn center(&self) -> Point2<f32> {
        self.bbox.center()
    }
}

/// Annotated identity present in one camera frame
///
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundTruthEntry {
    pub camera_id: CameraId,
    /// Global frame number
    pub frame_id: FrameId,
    pub identity: u64,
    /// Box in fractions of the reference frame size
    pub bbox: NormalizedBox,
}

impl GroundTruthEntry {
    pub fn pixel_box(&self, frame: FrameSize) -> BoundingBox {
        self.bbox.denormalize(frame)
    }
}

/// Supplies materialized per-frame records to the frame loop
///
pub trait FrameSource {
    /// Detections of `camera_id` in the camera-local frame `local_frame`
    ///
    fn detections(&self, camera_id: CameraId, local_frame: FrameId) -> Vec<Detection>;

    /// Ground truth of `camera_id` in the global frame `frame_id`
    ///
    fn ground_truth(&self, _camera_id: CameraId, _frame_id: FrameId) -> Vec<GroundTruthEntry> {
        Vec::default()
    }
}

/// Maps global frame numbers to camera-local ones.
///
/// A camera whose recording starts at global frame `s` sees global frame `g` as local frame
/// `g - s + 1`. Cameras without an offset use global numbering.
///
#[derive(Debug, Clone, Default)]
pub struct CameraTimeline {
    start_frames: HashMap<CameraId, FrameId>,
}

impl CameraTimeline {
    pub fn new<I>(start_frames: I) -> Result<Self>
    where
        I: IntoIterator<Item = (CameraId, FrameId)>,
    {
        let mut res = HashMap::default();
        for (camera_id, start) in start_frames {
            if start == 0 {
                return Err(Errors::InvalidStartFrame(camera_id).into());
            }
            if res.insert(camera_id, start).is_some() {
                return Err(Errors::DuplicateCamera(camera_id).into());
            }
        }
        Ok(Self { start_frames: res })
    }

    /// Recording start offsets of the eight DukeMTMC cameras
    ///
    pub fn duke_mtmc() -> Self {
        let start_frames = [5543, 3607, 27244, 31182, 1, 22402, 18968, 46766];
        Self {
            start_frames: (1..).zip(start_frames).collect(),
        }
    }

    /// Camera-local frame, `None` before the camera starts recording
    ///
    pub fn to_local(&self, camera_id: CameraId, global: FrameId) -> Option<FrameId> {
        match self.start_frames.get(&camera_id) {
            Some(start) => global
                .checked_sub(start.saturating_sub(1))
                .filter(|f| *f > 0),
            None => Some(global),
        }
    }

    pub fn to_global(&self, camera_id: CameraId, local: FrameId) -> FrameId {
        match self.start_frames.get(&camera_id) {
            Some(start) => local.saturating_add(start.saturating_sub(1)),
            None => local,
        }
    }
}

/// Source over fully materialized detection and ground-truth lists
///
#[derive(Debug, Default, Clone)]
pub struct InMemorySource {
    detections: HashMap<(CameraId, FrameId), Vec<Detection>>,
    ground_truth: HashMap<(CameraId, FrameId), Vec<GroundTruthEntry>>,
}

impl InMemorySource {
    pub fn new<D, G>(detections: D, ground_truth: G) -> Self
    where
        D: IntoIterator<Item = Detection>,
        G: IntoIterator<Item = GroundTruthEntry>,
    {
        Self {
            detections: detections
                .into_iter()
                .into_group_map_by(|d| (d.camera_id, d.frame_id)),
            ground_truth: ground_truth
                .into_iter()
                .into_group_map_by(|g| (g.camera_id, g.frame_id)),
        }
    }

    pub fn from_detections<D>(detections: D) -> Self
    where
        D: IntoIterator<Item = Detection>,
    {
        Self::new(detections, Vec::<GroundTruthEntry>::new())
    }

    /// Distinct cameras present in either list, ascending
    ///
    pub fn cameras(&self) -> Vec<CameraId> {
        self.detections
            .keys()
            .chain(self.ground_truth.keys())
            .map(|(c, _)| *c)
            .unique()
            .sorted()
            .collect()
    }
}

impl FrameSource for InMemorySource {
    fn detections(&self, camera_id: CameraId, local_frame: FrameId) -> Vec<Detection> {
        self.detections
            .get(&(camera_id, local_frame))
            .cloned()
            .unwrap_or_default()
    }

    fn ground_truth(&self, camera_id: CameraId, frame_id: FrameId) -> Vec<GroundTruthEntry> {
        self.ground_truth
            .get(&(camera_id, frame_id))
            .cloned()
            .unwrap_or_default()
    }
}
