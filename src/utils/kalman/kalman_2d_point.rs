use crate::utils::kalman::{KalmanState, DEFAULT_DT};
use nalgebra::{Point2, SMatrix, SVector};

pub const DIM_2D_POINT: usize = 2;
pub const DIM_2D_POINT_X2: usize = DIM_2D_POINT * 2;

/// Constant-velocity Kalman filter over a 2D point.
///
/// The state vector is laid out as `(x, vx, y, vy)`; the measurement is `(x, y)`.
///
#[derive(Debug, Clone, Copy)]
pub struct Point2DKalmanFilter {
    motion_matrix: SMatrix<f32, DIM_2D_POINT_X2, DIM_2D_POINT_X2>,
    update_matrix: SMatrix<f32, DIM_2D_POINT, DIM_2D_POINT_X2>,
    process_noise: SMatrix<f32, DIM_2D_POINT_X2, DIM_2D_POINT_X2>,
    measurement_noise: SMatrix<f32, DIM_2D_POINT, DIM_2D_POINT>,
    initial_covariance: SMatrix<f32, DIM_2D_POINT_X2, DIM_2D_POINT_X2>,
}

/// Default initializer
impl Default for Point2DKalmanFilter {
    fn default() -> Self {
        Point2DKalmanFilter::new(DEFAULT_DT, [10.0, 100.0], [1.0, 1.0], 10.0)
    }
}

fn diagonal(position: f32, velocity: f32) -> SMatrix<f32, DIM_2D_POINT_X2, DIM_2D_POINT_X2> {
    let std: SVector<f32, DIM_2D_POINT_X2> =
        SVector::from_iterator([position, velocity, position, velocity]);
    SMatrix::from_diagonal(&std.component_mul(&std))
}

impl Point2DKalmanFilter {
    /// Creates the filter
    ///
    /// # Parameters
    /// * `dt` - time step between two consecutive predictions
    /// * `initial_std` - (position, velocity) standard deviations of a freshly initiated state
    /// * `process_std` - (position, velocity) standard deviations added on every prediction
    /// * `measurement_std` - standard deviation of a measured coordinate
    ///
    pub fn new(dt: f32, initial_std: [f32; 2], process_std: [f32; 2], measurement_std: f32) -> Self {
        let mut motion_matrix: SMatrix<f32, DIM_2D_POINT_X2, DIM_2D_POINT_X2> = SMatrix::identity();
        let mut update_matrix: SMatrix<f32, DIM_2D_POINT, DIM_2D_POINT_X2> = SMatrix::zeros();

        for i in 0..DIM_2D_POINT {
            motion_matrix[(2 * i, 2 * i + 1)] = dt;
            update_matrix[(i, 2 * i)] = 1.0;
        }

        let r = measurement_std * measurement_std;

        Point2DKalmanFilter {
            motion_matrix,
            update_matrix,
            process_noise: diagonal(process_std[0], process_std[1]),
            measurement_noise: SMatrix::from_diagonal_element(r),
            initial_covariance: diagonal(initial_std[0], initial_std[1]),
        }
    }

    pub fn initiate(&self, p: &Point2<f32>) -> KalmanState<DIM_2D_POINT_X2> {
        let mean: SVector<f32, DIM_2D_POINT_X2> = SVector::from_iterator([p.x, 0.0, p.y, 0.0]);
        KalmanState {
            mean,
            covariance: self.initial_covariance,
        }
    }

    pub fn predict(&self, state: &KalmanState<DIM_2D_POINT_X2>) -> KalmanState<DIM_2D_POINT_X2> {
        let (mean, covariance) = (state.mean, state.covariance);

        let mean = self.motion_matrix * mean;
        let covariance =
            self.motion_matrix * covariance * self.motion_matrix.transpose() + self.process_noise;
        KalmanState { mean, covariance }
    }

    fn project(
        &self,
        mean: SVector<f32, DIM_2D_POINT_X2>,
        covariance: SMatrix<f32, DIM_2D_POINT_X2, DIM_2D_POINT_X2>,
    ) -> KalmanState<DIM_2D_POINT> {
        let mean = self.update_matrix * mean;
        let covariance = self.update_matrix * covariance * self.update_matrix.transpose()
            + self.measurement_noise;
        KalmanState { mean, covariance }
    }

    /// Fuses a measured position into the state.
    ///
    /// Returns `None` when the innovation covariance is not positive definite or the
    /// correction is not finite, which only happens with degenerate noise parameters.
    ///
    pub fn update(
        &self,
        state: &KalmanState<DIM_2D_POINT_X2>,
        p: &Point2<f32>,
    ) -> Option<KalmanState<DIM_2D_POINT_X2>> {
        let (mean, covariance) = (state.mean, state.covariance);
        let projected_state = self.project(mean, covariance);
        let (projected_mean, projected_cov) = (projected_state.mean, projected_state.covariance);

        let cholesky = projected_cov.cholesky()?;
        let b = self.update_matrix * covariance;
        let kalman_gain = cholesky.solve(&b).transpose();

        let innovation = SVector::from_iterator([p.x, p.y]) - projected_mean;

        let mean = mean + kalman_gain * innovation;
        let covariance = covariance - kalman_gain * projected_cov * kalman_gain.transpose();
        if !mean.iter().chain(covariance.iter()).all(|v| v.is_finite()) {
            return None;
        }
        Some(KalmanState { mean, covariance })
    }

    /// Euclidean distance between the estimated position and `p`
    ///
    pub fn distance(&self, state: &KalmanState<DIM_2D_POINT_X2>, p: &Point2<f32>) -> f32 {
        nalgebra::distance(&Self::position(state), p)
    }

    pub fn position(state: &KalmanState<DIM_2D_POINT_X2>) -> Point2<f32> {
        Point2::new(state.mean[0], state.mean[2])
    }

    pub fn velocity(state: &KalmanState<DIM_2D_POINT_X2>) -> SVector<f32, DIM_2D_POINT> {
        SVector::from_iterator([state.mean[1], state.mean[3]])
    }
}

impl From<KalmanState<{ DIM_2D_POINT_X2 }>> for Point2<f32> {
    fn from(s: KalmanState<{ DIM_2D_POINT_X2 }>) -> Self {
        Point2DKalmanFilter::position(&s)
    }
}
