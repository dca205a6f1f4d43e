use crate::examples::SceneGenerator;
use crate::track::id_allocator::TrackIdAllocator;
use crate::track::{Lifecycle, Track, TrackStatus};
use crate::trackers::camera::CameraTracker;
use crate::trackers::frame_loop::FrameLoop;
use crate::trackers::options::{FrameInterval, SpawnMode, TrackerOptions};
use crate::trackers::sink::VecSink;
use crate::trackers::source::{Detection, InMemorySource};
use crate::utils::bbox::BoundingBox;
use nalgebra::Point2;
use std::collections::{HashMap, HashSet};

fn det(frame_id: u64, x: f32, y: f32, confidence: f32) -> Detection {
    Detection::new(
        1,
        frame_id,
        BoundingBox::centered_at(&Point2::new(x, y), 40.0, 100.0),
        confidence,
    )
}

fn seeded_track(ids: &TrackIdAllocator, opts: &TrackerOptions, x: f32, y: f32) -> Track {
    Track::new(
        ids.allocate(),
        1,
        1,
        &BoundingBox::centered_at(&Point2::new(x, y), 40.0, 100.0),
        opts.motion.filter(),
        opts.detection_lifecycle,
    )
}

#[test]
fn single_track_is_corrected_towards_detection() {
    let source = InMemorySource::from_detections([
        det(1, 100.0, 100.0, 0.9),
        det(2, 105.0, 105.0, 0.8),
    ]);
    let opts = TrackerOptions::default().with_gating_distance(200.0);
    let mut fl = FrameLoop::new(opts, [1]).unwrap();
    let mut sink = VecSink::default();

    fl.process_frame(1, &source, &mut sink).unwrap();
    let t = &fl.camera(1).unwrap().tracks()[0];
    assert_eq!(t.status(), TrackStatus::Init);
    assert_eq!(t.position(), Point2::new(100.0, 100.0));

    fl.process_frame(2, &source, &mut sink).unwrap();
    let tracks = fl.camera(1).unwrap().tracks();
    assert_eq!(tracks.len(), 1);
    let t = &tracks[0];
    assert!((t.position().x - 102.5).abs() < 0.1, "{:?}", t.position());
    assert!((t.position().y - 102.5).abs() < 0.1, "{:?}", t.position());
    assert_eq!(t.consecutive_hit_count(), 2);
    assert_eq!(t.status(), TrackStatus::Matched);
    assert_eq!(sink.records.len(), 2);
}

#[test]
fn nearest_candidate_beyond_gate_is_a_miss() {
    let ids = TrackIdAllocator::default();
    let opts = TrackerOptions::default().with_gating_distance(200.0);
    let mut cam = CameraTracker::new(1, &opts);
    cam.insert_track(seeded_track(&ids, &opts, 500.0, 500.0)).unwrap();

    let report = cam.step(2, vec![det(2, 800.0, 500.0, 0.9)], &[], &ids);
    assert_eq!(report.matched, 0);
    assert_eq!(report.missed, 1);
    assert_eq!(report.spawned, 1);

    let tracks = cam.tracks();
    assert_eq!(tracks[0].track_id(), 1);
    assert_eq!(tracks[0].status(), TrackStatus::Missed);
    assert_eq!(tracks[0].position(), Point2::new(500.0, 500.0));
    assert_eq!(tracks[1].track_id(), 2);
    assert_eq!(tracks[1].status(), TrackStatus::Init);
    assert_eq!(tracks[1].position(), Point2::new(800.0, 500.0));
}

#[test]
fn unconfident_detection_beyond_gate_spawns_nothing() {
    let ids = TrackIdAllocator::default();
    let opts = TrackerOptions::default();
    let mut cam = CameraTracker::new(1, &opts);
    cam.insert_track(seeded_track(&ids, &opts, 500.0, 500.0)).unwrap();

    let report = cam.step(2, vec![det(2, 800.0, 500.0, 0.3)], &[], &ids);
    assert_eq!(report.missed, 1);
    assert_eq!(report.spawned, 0);
    assert_eq!(cam.tracks().len(), 1);
}

#[test]
fn last_allowed_miss_deletes_track_in_the_same_cycle() {
    let ids = TrackIdAllocator::default();
    let opts = TrackerOptions::default().with_detection_lifecycle(Lifecycle::new(2, 3));
    let mut cam = CameraTracker::new(1, &opts);
    cam.insert_track(seeded_track(&ids, &opts, 100.0, 100.0)).unwrap();

    cam.step(2, vec![], &[], &ids);
    cam.step(3, vec![], &[], &ids);
    let t = &cam.tracks()[0];
    assert_eq!(t.status(), TrackStatus::Missed);
    assert_eq!(t.consecutive_miss_count(), 2);
    assert_eq!(cam.eval_records(3).count(), 1);

    let report = cam.step(4, vec![], &[], &ids);
    assert_eq!(report.deleted, 1);
    assert!(cam.tracks().is_empty());
    assert_eq!(cam.eval_records(4).count(), 0);

    let report = cam.step(5, vec![det(5, 100.0, 100.0, 0.9)], &[], &ids);
    assert_eq!(report.spawned, 1);
    assert_eq!(cam.tracks()[0].track_id(), 2);
}

#[test]
fn empty_frame_misses_every_track() {
    let ids = TrackIdAllocator::default();
    let opts = TrackerOptions::default();
    let mut cam = CameraTracker::new(1, &opts);
    for x in [100.0, 400.0, 700.0] {
        cam.insert_track(seeded_track(&ids, &opts, x, 300.0)).unwrap();
    }

    let report = cam.step(2, vec![], &[], &ids);
    assert_eq!(report.missed, 3);
    assert_eq!(report.spawned, 0);
    assert_eq!(report.deleted, 0);
    assert!(cam
        .tracks()
        .iter()
        .all(|t| t.status() == TrackStatus::Missed));
    assert_eq!(cam.tracks().len(), 3);
}

#[test]
fn clean_scene_keeps_one_identity_per_walker() {
    let scene = SceneGenerator::new(11)
        .with_noise(2.0, 0.0, 0.3)
        .generate(&[1, 2], 4, 120);
    let source = scene.source();
    let opts = TrackerOptions::default().with_confidence(0.3, 0.3);
    let mut fl = FrameLoop::new(opts, [1, 2]).unwrap();
    let mut sink = VecSink::default();
    let summary = fl
        .run(FrameInterval::new(1, 120).unwrap(), &source, &mut sink)
        .unwrap();

    assert_eq!(summary.frames, 120);
    assert_eq!(summary.tracks_spawned, 8);
    assert_eq!(summary.tracks_deleted, 0);
    assert_eq!(summary.records, 8 * 120);
    for camera in fl.cameras() {
        assert_eq!(camera.tracks().len(), 4);
        assert!(camera
            .tracks()
            .iter()
            .all(|t| t.status() == TrackStatus::Matched));
    }
}

#[test]
fn census_holds_after_every_cycle() {
    let scene = SceneGenerator::new(5)
        .with_noise(6.0, 0.35, 0.5)
        .generate(&[1, 2, 3], 5, 150);
    let source = scene.source();
    let mut fl = FrameLoop::new(TrackerOptions::default(), [1, 2, 3]).unwrap();
    let mut sink = VecSink::default();

    for frame_id in 1..=150 {
        fl.process_frame(frame_id, &source, &mut sink).unwrap();
        for camera in fl.cameras() {
            let counts = camera.status_counts();
            assert_eq!(counts.deleted, 0);
            assert_eq!(
                counts.matched + counts.missed + counts.init,
                camera.tracks().len()
            );
            assert!(camera.tracks().iter().all(|t| t.camera_id() == camera.camera_id()));
        }
    }
}

#[test]
fn ids_increase_in_spawn_order_and_are_never_reused() {
    let scene = SceneGenerator::new(21)
        .with_noise(4.0, 0.5, 0.0)
        .generate(&[1, 2], 6, 200);
    let source = scene.source();
    let mut fl = FrameLoop::new(TrackerOptions::default(), [1, 2]).unwrap();
    let mut sink = VecSink::default();

    let mut max_seen = 0;
    let mut alive_before: HashSet<u64> = HashSet::new();
    let mut gone: HashSet<u64> = HashSet::new();
    for frame_id in 1..=200 {
        fl.process_frame(frame_id, &source, &mut sink).unwrap();
        let alive = fl
            .cameras()
            .iter()
            .flat_map(|c| c.tracks().iter().map(|t| t.track_id()))
            .collect::<HashSet<_>>();

        let mut fresh = alive.difference(&alive_before).copied().collect::<Vec<_>>();
        fresh.sort_unstable();
        for id in fresh {
            assert!(id > max_seen, "id {} is not above {}", id, max_seen);
            assert!(!gone.contains(&id));
            max_seen = id;
        }
        gone.extend(alive_before.difference(&alive));
        assert!(alive.iter().all(|id| !gone.contains(id)));
        alive_before = alive;
    }
    assert!(!gone.is_empty(), "the scene is expected to lose tracks");
    assert_eq!(fl.ids().peek(), max_seen + 1);
}

#[test]
fn identical_inputs_give_identical_runs() {
    let scene = SceneGenerator::new(8)
        .with_noise(5.0, 0.2, 0.4)
        .generate(&[1, 2, 3, 4], 4, 100);
    let source = scene.source();

    let run = |parallel: bool| {
        let opts = TrackerOptions::default().with_parallel_cameras(parallel);
        let mut fl = FrameLoop::new(opts, [1, 2, 3, 4]).unwrap();
        let mut sink = VecSink::default();
        fl.run(FrameInterval::new(1, 100).unwrap(), &source, &mut sink)
            .unwrap();
        sink.records
    };

    let first = run(false);
    assert!(!first.is_empty());
    assert_eq!(first, run(false));
    assert_eq!(first, run(true));
}

#[test]
fn oracle_mode_seeds_one_track_per_identity() {
    let scene = SceneGenerator::new(13)
        .with_noise(2.0, 0.0, 0.0)
        .generate(&[1, 2], 3, 60);
    let source = scene.source();
    let opts = TrackerOptions::default().with_spawn_mode(SpawnMode::Oracle);
    let mut fl = FrameLoop::new(opts, [1, 2]).unwrap();
    let mut sink = VecSink::default();
    let summary = fl
        .run(FrameInterval::new(1, 60).unwrap(), &source, &mut sink)
        .unwrap();

    assert_eq!(summary.tracks_spawned, 6);
    assert_eq!(summary.tracks_deleted, 0);

    let mut identities: HashMap<u64, u64> = HashMap::new();
    for camera in fl.cameras() {
        for t in camera.tracks() {
            assert_eq!(*t.lifecycle(), Lifecycle::new(3, 5));
            let gt = t.ground_truth_id().unwrap();
            assert!(identities.insert(gt, t.track_id()).is_none());
            assert_eq!(t.status(), TrackStatus::Matched);
        }
    }
    assert_eq!(identities.len(), 6);
}

#[test]
fn oracle_identity_is_not_respawned_after_deletion() {
    let scene = SceneGenerator::new(2)
        .with_noise(2.0, 0.0, 0.0)
        .generate(&[1], 1, 3);
    // ground truth keeps coming, detections stop after the first frame
    let source = InMemorySource::new(
        scene.detections.iter().copied().filter(|d| d.frame_id == 1),
        scene.ground_truth.clone(),
    );
    let opts = TrackerOptions::default()
        .with_spawn_mode(SpawnMode::Oracle)
        .with_oracle_lifecycle(Lifecycle::new(3, 1));
    let mut fl = FrameLoop::new(opts, [1]).unwrap();
    let summary = fl
        .run(FrameInterval::new(1, 3).unwrap(), &source, VecSink::default())
        .unwrap();

    assert_eq!(summary.tracks_spawned, 1);
    assert_eq!(summary.tracks_deleted, 1);
    assert!(fl.camera(1).unwrap().tracks().is_empty());
}
