use anyhow::Result;
use multicam::examples::SceneGenerator;
use multicam::prelude::{FrameInterval, FrameLoop, MotTextSink, TrackerOptions};
use std::io::BufWriter;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

const CAMERAS: [u32; 4] = [1, 2, 3, 4];
const FRAMES: u64 = 600;

fn main() -> Result<()> {
    env_logger::init();

    let scene = SceneGenerator::new(42)
        .with_noise(4.0, 0.1, 0.3)
        .generate(&CAMERAS, 6, FRAMES);
    let source = scene.source();

    let stop = Arc::new(AtomicBool::new(false));
    let opts = TrackerOptions::default().with_parallel_cameras(true);
    let mut tracker = FrameLoop::new(opts, CAMERAS)?.with_stop_flag(stop);

    let stdout = std::io::stdout();
    let sink = MotTextSink::new(BufWriter::new(stdout.lock()));
    let summary = tracker.run(FrameInterval::new(1, FRAMES)?, &source, sink)?;

    for camera in tracker.cameras() {
        eprintln!(
            "Camera {}: {} matched/missed/init/total",
            camera.camera_id(),
            camera.status_counts()
        );
    }
    eprintln!(
        "{} frames, {} records, {} tracks spawned, FPS: {:.3}",
        summary.frames,
        summary.records,
        summary.tracks_spawned,
        summary.fps()
    );
    Ok(())
}
