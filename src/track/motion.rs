use crate::utils::kalman::kalman_2d_point::{Point2DKalmanFilter, DIM_2D_POINT_X2};
use crate::utils::kalman::KalmanState;
use log::{trace, warn};
use nalgebra::{Point2, SVector};

/// Per-track constant-velocity predictor/corrector.
///
/// Owns the `(x, vx, y, vy)` estimate and its covariance; the filter parameters are shared by value.
///
#[derive(Debug, Clone)]
pub struct MotionModel {
    filter: Point2DKalmanFilter,
    state: KalmanState<DIM_2D_POINT_X2>,
}

impl MotionModel {
    pub fn new(filter: Point2DKalmanFilter, position: &Point2<f32>) -> Self {
        Self {
            state: filter.initiate(position),
            filter,
        }
    }

    /// Advances the estimate by one time step
    ///
    pub fn predict(&mut self) {
        self.state = self.filter.predict(&self.state);
    }

    /// Fuses a measured position into the estimate.
    ///
    /// A degenerate innovation covariance keeps the predicted state.
    ///
    pub fn update(&mut self, measured: &Point2<f32>) {
        match self.filter.update(&self.state, measured) {
            Some(state) => self.state = state,
            None => {
                warn!(
                    "Innovation covariance is not positive definite, measurement {:?} is ignored",
                    measured
                );
                trace!("{}", self.state.dump());
            }
        }
    }

    pub fn position(&self) -> Point2<f32> {
        Point2DKalmanFilter::position(&self.state)
    }

    pub fn velocity(&self) -> SVector<f32, 2> {
        Point2DKalmanFilter::velocity(&self.state)
    }

    pub fn distance(&self, p: &Point2<f32>) -> f32 {
        self.filter.distance(&self.state, p)
    }

    pub fn state(&self) -> &KalmanState<DIM_2D_POINT_X2> {
        &self.state
    }
}
