use anyhow::Result;
use multicam::examples::SceneGenerator;
use multicam::prelude::{
    ChannelSink, EvalRecord, FrameInterval, FrameLoop, SpawnMode, TrackerOptions,
};
use std::collections::HashMap;
use std::thread;

const CAMERAS: [u32; 2] = [1, 2];
const FRAMES: u64 = 300;

fn main() -> Result<()> {
    env_logger::init();

    let scene = SceneGenerator::new(7)
        .with_noise(3.0, 0.2, 0.0)
        .generate(&CAMERAS, 5, FRAMES);
    let source = scene.source();

    let (tx, rx) = crossbeam::channel::unbounded::<EvalRecord>();
    let consumer = thread::spawn(move || {
        let mut lengths: HashMap<u64, usize> = HashMap::new();
        for r in rx {
            *lengths.entry(r.track_id).or_default() += 1;
        }
        lengths
    });

    let opts = TrackerOptions::default().with_spawn_mode(SpawnMode::Oracle);
    let mut tracker = FrameLoop::new(opts, CAMERAS)?;
    let summary = tracker.run(
        FrameInterval::new(1, FRAMES)?,
        &source,
        ChannelSink::new(tx),
    )?;

    let lengths = consumer.join().expect("consumer thread panicked");
    let mut ids = lengths.keys().copied().collect::<Vec<_>>();
    ids.sort_unstable();
    for id in ids {
        println!("track {:3}: {:4} frames", id, lengths[&id]);
    }
    println!(
        "{} tracks spawned, {} deleted",
        summary.tracks_spawned, summary.tracks_deleted
    );
    Ok(())
}
