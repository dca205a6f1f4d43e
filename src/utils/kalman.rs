use nalgebra::{SMatrix, SVector};

/// Constant-velocity Kalman filter over a 2D point
pub mod kalman_2d_point;

/// Default frame period of 60 fps footage
pub const DEFAULT_DT: f32 = 1.0 / 60.0;

macro_rules! pretty_print {
    ($arr:expr) => {{
        let indent = 4;
        let prefix = " ".repeat(indent);
        let mut result_els = vec!["".to_string()];
        for i in 0..$arr.nrows() {
            let mut row_els = vec![];
            for j in 0..$arr.ncols() {
                row_els.push(format!("{:12.3}", $arr[(i, j)]));
            }
            let row_str = row_els.into_iter().collect::<Vec<_>>().join(" ");
            let row_str = format!("{}{}", prefix, row_str);
            result_els.push(row_str);
        }
        result_els.into_iter().collect::<Vec<_>>().join("\n")
    }};
}

/// Kalman filter current state
///
#[derive(Copy, Clone, Debug)]
pub struct KalmanState<const X: usize> {
    pub(crate) mean: SVector<f32, X>,
    pub(crate) covariance: SMatrix<f32, X, X>,
}

impl<const X: usize> KalmanState<X> {
    pub fn mean(&self) -> &SVector<f32, X> {
        &self.mean
    }

    pub fn covariance(&self) -> &SMatrix<f32, X, X> {
        &self.covariance
    }

    /// Human readable rendering of the mean and covariance, used in trace logs
    ///
    pub fn dump(&self) -> String {
        format!(
            "Mean={}\nCovariance={}",
            pretty_print!(self.mean.transpose()),
            pretty_print!(self.covariance)
        )
    }
}
