use crate::trackers::source::{Detection, GroundTruthEntry, InMemorySource};
use crate::utils::bbox::{BoundingBox, FrameSize, NormalizedBox};
use crate::utils::kalman::DEFAULT_DT;
use crate::{CameraId, FrameId};
use nalgebra::{Point2, Vector2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Pedestrian-like target moving at constant velocity in pixel space
///
#[derive(Debug, Clone, Copy)]
pub struct Walker {
    pub identity: u64,
    pub position: Point2<f32>,
    /// Pixels per second
    pub velocity: Vector2<f32>,
    pub width: f32,
    pub height: f32,
}

impl Walker {
    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::centered_at(&self.position, self.width, self.height)
    }

    pub fn step(&mut self, dt: f32) {
        self.position += self.velocity * dt;
    }
}

/// Deterministic generator of multi-camera detections and ground truth
///
#[derive(Debug, Clone)]
pub struct SceneGenerator {
    rng: StdRng,
    frame_size: FrameSize,
    /// Uniform jitter applied to detected box centers, pixels
    pub jitter: f32,
    /// Probability that a visible walker is not detected in a frame
    pub miss_probability: f64,
    /// Probability of one low-confidence clutter detection per camera and frame
    pub clutter_probability: f64,
}

/// Materialized output of [`SceneGenerator::generate`]
///
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub detections: Vec<Detection>,
    pub ground_truth: Vec<GroundTruthEntry>,
}

impl Scene {
    pub fn source(&self) -> InMemorySource {
        InMemorySource::new(self.detections.clone(), self.ground_truth.clone())
    }
}

impl SceneGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            frame_size: FrameSize::default(),
            jitter: 2.0,
            miss_probability: 0.0,
            clutter_probability: 0.0,
        }
    }

    pub fn with_noise(mut self, jitter: f32, miss_probability: f64, clutter_probability: f64) -> Self {
        self.jitter = jitter;
        self.miss_probability = miss_probability;
        self.clutter_probability = clutter_probability;
        self
    }

    /// Walkers spread over the frame, moving slowly enough to stay in view for a few seconds
    ///
    pub fn walkers(&mut self, first_identity: u64, count: usize) -> Vec<Walker> {
        let cell = self.frame_size.width / count.max(1) as f32;
        (0..count)
            .map(|i| Walker {
                identity: first_identity + i as u64,
                position: Point2::new(
                    cell * (i as f32 + 0.5),
                    self.rng.gen_range(200.0..self.frame_size.height - 200.0),
                ),
                velocity: Vector2::new(
                    self.rng.gen_range(-60.0..60.0),
                    self.rng.gen_range(-30.0..30.0),
                ),
                width: self.rng.gen_range(40.0..80.0),
                height: self.rng.gen_range(120.0..200.0),
            })
            .collect()
    }

    /// Simulates `walkers_per_camera` walkers in every camera over `frames` frames starting at 1.
    ///
    /// Ground-truth identities are unique over all cameras.
    ///
    pub fn generate(&mut self, cameras: &[CameraId], walkers_per_camera: usize, frames: FrameId) -> Scene {
        let mut scene = Scene::default();
        for (n, camera_id) in cameras.iter().enumerate() {
            let mut walkers = self.walkers((n * walkers_per_camera) as u64 + 1, walkers_per_camera);
            for frame_id in 1..=frames {
                for w in walkers.iter_mut() {
                    scene.ground_truth.push(GroundTruthEntry {
                        camera_id: *camera_id,
                        frame_id,
                        identity: w.identity,
                        bbox: NormalizedBox::from_pixels(&w.bbox(), self.frame_size),
                    });
                    if !self.rng.gen_bool(self.miss_probability) {
                        let dx = self.rng.gen_range(-self.jitter..=self.jitter);
                        let dy = self.rng.gen_range(-self.jitter..=self.jitter);
                        let center = w.position + Vector2::new(dx, dy);
                        scene.detections.push(Detection::new(
                            *camera_id,
                            frame_id,
                            BoundingBox::centered_at(&center, w.width, w.height),
                            self.rng.gen_range(0.5..1.0),
                        ));
                    }
                    w.step(DEFAULT_DT);
                }
                if self.rng.gen_bool(self.clutter_probability) {
                    let center = Point2::new(
                        self.rng.gen_range(0.0..self.frame_size.width),
                        self.rng.gen_range(0.0..self.frame_size.height),
                    );
                    scene.detections.push(Detection::new(
                        *camera_id,
                        frame_id,
                        BoundingBox::centered_at(&center, 50.0, 150.0),
                        self.rng.gen_range(0.0..0.3),
                    ));
                }
            }
        }
        scene
    }
}
