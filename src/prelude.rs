use crate::track;
use crate::trackers;

pub use track::id_allocator::TrackIdAllocator;
pub use track::{Lifecycle, StatusCounts, Track, TrackStatus};
pub use trackers::association::{Association, Associator};
pub use trackers::camera::{CameraTracker, CycleReport};
pub use trackers::frame_loop::{FrameLoop, FrameReport, RunSummary};
pub use trackers::options::{FrameInterval, MotionModelOptions, SpawnMode, TrackerOptions};
pub use trackers::sink::{ChannelSink, EvalRecord, EvaluationSink, MotTextSink, VecSink};
pub use trackers::source::{
    CameraTimeline, Detection, FrameSource, GroundTruthEntry, InMemorySource,
};
pub use trackers::spawn::{SpawnContext, SpawnPolicy};

pub use crate::utils::bbox::{BoundingBox, FrameSize, NormalizedBox};
