//! Small dense helpers for the 3-parameter normal equations.

use crate::error::{FitError, Result};

pub type Mat3 = [[f64; 3]; 3];
pub type Vec3 = [f64; 3];

#[inline]
pub fn det3(m: &Mat3) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

/// Closed-form inverse via the adjugate.
///
/// Fails with `SingularSystem` when `|det| < det_eps`.
pub fn inverse3(m: &Mat3, det_eps: f64) -> Result<Mat3> {
    let det = det3(m);
    if !det.is_finite() || det.abs() < det_eps {
        return Err(FitError::SingularSystem { det });
    }
    let inv_det = 1.0 / det;
    // Transposed cofactor matrix scaled by 1/det.
    let adj = [
        [
            m[1][1] * m[2][2] - m[1][2] * m[2][1],
            m[0][2] * m[2][1] - m[0][1] * m[2][2],
            m[0][1] * m[1][2] - m[0][2] * m[1][1],
        ],
        [
            m[1][2] * m[2][0] - m[1][0] * m[2][2],
            m[0][0] * m[2][2] - m[0][2] * m[2][0],
            m[0][2] * m[1][0] - m[0][0] * m[1][2],
        ],
        [
            m[1][0] * m[2][1] - m[1][1] * m[2][0],
            m[0][1] * m[2][0] - m[0][0] * m[2][1],
            m[0][0] * m[1][1] - m[0][1] * m[1][0],
        ],
    ];
    let mut out = [[0.0; 3]; 3];
    for (r, row) in adj.iter().enumerate() {
        for (c, v) in row.iter().enumerate() {
            out[r][c] = v * inv_det;
        }
    }
    Ok(out)
}

#[inline]
pub fn mat_vec3(m: &Mat3, v: &Vec3) -> Vec3 {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

/// Accumulate `XᵗX` and `Xᵗy` for design rows `x` and targets `y`.
pub fn normal_equations<I>(rows: I) -> (Mat3, Vec3)
where
    I: IntoIterator<Item = (Vec3, f64)>,
{
    let mut xtx = [[0.0; 3]; 3];
    let mut xty = [0.0; 3];
    for (x, y) in rows {
        for r in 0..3 {
            xty[r] += x[r] * y;
            for c in 0..3 {
                xtx[r][c] += x[r] * x[c];
            }
        }
    }
    (xtx, xty)
}

/// Arithmetic mean; `None` for an empty input.
pub fn mean<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    let (sum, n) = values
        .into_iter()
        .fold((0.0f64, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}
