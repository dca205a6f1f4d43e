use crate::trackers::options::{DEFAULT_GATING_DISTANCE, DEFAULT_SENTINEL_COST};
use crate::utils::linear_sum_assignment::linear_sum_assignment;
use log::trace;
use nalgebra::Point2;

/// Outcome of associating the tracks of one camera with the detections of one frame.
///
/// Indices refer to the slices passed to [`Associator::associate`].
///
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Association {
    /// Accepted `(track, detection)` pairs
    pub matches: Vec<(usize, usize)>,
    pub unmatched_tracks: Vec<usize>,
    pub unmatched_detections: Vec<usize>,
}

/// Gated minimum-cost matcher between predicted track positions and detection centers
///
#[derive(Debug, Clone, Copy)]
pub struct Associator {
    gating_distance: f32,
    sentinel_cost: f32,
}

impl Default for Associator {
    fn default() -> Self {
        Self::new(DEFAULT_GATING_DISTANCE, DEFAULT_SENTINEL_COST)
    }
}

impl Associator {
    pub fn new(gating_distance: f32, sentinel_cost: f32) -> Self {
        Self {
            gating_distance,
            sentinel_cost,
        }
    }

    pub fn gating_distance(&self) -> f32 {
        self.gating_distance
    }

    /// Euclidean distances, tracks by rows and detections by columns
    ///
    pub fn distances(tracks: &[Point2<f32>], detections: &[Point2<f32>]) -> Vec<Vec<f32>> {
        tracks
            .iter()
            .map(|t| {
                detections
                    .iter()
                    .map(|d| nalgebra::distance(t, d))
                    .collect()
            })
            .collect()
    }

    /// Replaces every distance beyond the gate with the sentinel cost, keeping the matrix full
    ///
    pub fn gate(&self, distances: &[Vec<f32>]) -> Vec<Vec<f32>> {
        distances
            .iter()
            .map(|row| {
                row.iter()
                    .map(|d| {
                        if *d > self.gating_distance {
                            self.sentinel_cost
                        } else {
                            *d
                        }
                    })
                    .collect()
            })
            .collect()
    }

    pub fn associate(&self, tracks: &[Point2<f32>], detections: &[Point2<f32>]) -> Association {
        if tracks.is_empty() || detections.is_empty() {
            return Association {
                matches: Vec::default(),
                unmatched_tracks: (0..tracks.len()).collect(),
                unmatched_detections: (0..detections.len()).collect(),
            };
        }

        let distances = Self::distances(tracks, detections);
        let costs = self.gate(&distances);
        let solution = linear_sum_assignment(&costs);

        let mut track_matched = vec![false; tracks.len()];
        let mut detection_matched = vec![false; detections.len()];
        let mut matches = Vec::with_capacity(solution.len());

        for (t, d) in solution {
            let distance = distances[t][d];
            if distance <= self.gating_distance {
                track_matched[t] = true;
                detection_matched[d] = true;
                matches.push((t, d));
            } else {
                trace!(
                    "Assigned pair (track={}, detection={}) is rejected by the gate: {:.2} > {:.2}",
                    t,
                    d,
                    distance,
                    self.gating_distance
                );
            }
        }

        Association {
            matches,
            unmatched_tracks: unset_indices(&track_matched),
            unmatched_detections: unset_indices(&detection_matched),
        }
    }
}

fn unset_indices(flags: &[bool]) -> Vec<usize> {
    flags
        .iter()
        .enumerate()
        .filter(|(_, f)| !**f)
        .map(|(i, _)| i)
        .collect()
}
