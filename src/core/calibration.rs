//! Calibration correction field.
//!
//! Two scalar radial-basis interpolants (thin-plate spline kernel with a
//! first-degree polynomial tail, zero smoothing) are fitted over the
//! reference positions: one for the easting correction, one for the northing
//! correction. The fit passes exactly through every reference correction and
//! extends smoothly outside their convex hull. With exactly three reference
//! points the kernel weights vanish and the field is the plane through them.
//!
//! Positions are shifted to the centre of their bounding box and divided by a
//! single scale factor before fitting. A uniform scale leaves the thin-plate
//! interpolant unchanged while keeping the linear system well conditioned for
//! grid coordinates in the hundreds of kilometres.

use crate::domain::model::{Correction, RawCoordinate, ReferencePoint};
use crate::utils::error::{PlotError, Result};

/// Number of monomials in a first-degree polynomial of two variables.
const POLY_TERMS: usize = 3;

/// Smallest reference set that determines the polynomial tail.
pub const MIN_REFERENCE_POINTS: usize = POLY_TERMS;

const PIVOT_TOLERANCE: f64 = 1e-10;

fn thin_plate(r: f64) -> f64 {
    if r == 0.0 {
        0.0
    } else {
        r * r * r.ln()
    }
}

#[derive(Debug, Clone)]
struct Interpolant {
    weights: Vec<f64>,
    poly: [f64; POLY_TERMS],
}

#[derive(Debug, Clone)]
pub struct CorrectionField {
    shift: (f64, f64),
    scale: f64,
    centers: Vec<(f64, f64)>,
    easting: Interpolant,
    northing: Interpolant,
}

impl CorrectionField {
    /// Fits the field. Fails when fewer than three reference points are
    /// given, when any value is not finite, or when the positions are
    /// colinear or coincident.
    pub fn build(reference_points: &[ReferencePoint]) -> Result<Self> {
        if reference_points.len() < MIN_REFERENCE_POINTS {
            return Err(PlotError::calibration(format!(
                "at least {} reference points are required, got {}",
                MIN_REFERENCE_POINTS,
                reference_points.len()
            )));
        }

        for (i, rp) in reference_points.iter().enumerate() {
            let values = [
                rp.position.easting,
                rp.position.northing,
                rp.correction.d_easting,
                rp.correction.d_northing,
            ];
            if values.iter().any(|v| !v.is_finite()) {
                return Err(PlotError::calibration(format!(
                    "reference point {} has a non-finite component",
                    i
                )));
            }
        }

        let (shift, scale) = normalisation(reference_points.iter().map(|rp| rp.position));
        let centers: Vec<(f64, f64)> = reference_points
            .iter()
            .map(|rp| scaled(rp.position, shift, scale))
            .collect();

        let easting_values: Vec<f64> = reference_points
            .iter()
            .map(|rp| rp.correction.d_easting)
            .collect();
        let northing_values: Vec<f64> = reference_points
            .iter()
            .map(|rp| rp.correction.d_northing)
            .collect();

        let solution = solve(system_matrix(&centers), &[easting_values, northing_values])?;
        let n = centers.len();
        let split = |coeffs: &Vec<f64>| Interpolant {
            weights: coeffs[..n].to_vec(),
            poly: [coeffs[n], coeffs[n + 1], coeffs[n + 2]],
        };

        let field = Self {
            shift,
            scale,
            easting: split(&solution[0]),
            northing: split(&solution[1]),
            centers,
        };

        tracing::debug!(
            "🎯 Calibration field fitted over {} reference points",
            reference_points.len()
        );

        Ok(field)
    }

    /// Correction at an arbitrary grid position.
    pub fn evaluate(&self, point: RawCoordinate) -> Correction {
        let (x, y) = scaled(point, self.shift, self.scale);
        Correction::new(
            self.evaluate_one(&self.easting, x, y),
            self.evaluate_one(&self.northing, x, y),
        )
    }

    /// Single correction for a whole batch, evaluated at the batch mean.
    ///
    /// This assumes a plot is small enough that the correction does not vary
    /// across it. Returns `None` for an empty batch.
    pub fn batch_correction(&self, points: &[RawCoordinate]) -> Option<Correction> {
        let mean = mean_position(points)?;
        Some(self.evaluate(mean))
    }

    fn evaluate_one(&self, interpolant: &Interpolant, x: f64, y: f64) -> f64 {
        let radial: f64 = self
            .centers
            .iter()
            .zip(&interpolant.weights)
            .map(|(&(cx, cy), w)| w * thin_plate((x - cx).hypot(y - cy)))
            .sum();
        let [c0, c1, c2] = interpolant.poly;
        radial + c0 + c1 * x + c2 * y
    }
}

pub fn mean_position(points: &[RawCoordinate]) -> Option<RawCoordinate> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (e, no) = points
        .iter()
        .fold((0.0, 0.0), |(e, no), p| (e + p.easting, no + p.northing));
    Some(RawCoordinate::new(e / n, no / n))
}

fn normalisation(points: impl Iterator<Item = RawCoordinate>) -> ((f64, f64), f64) {
    let (mut min_e, mut max_e) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_n, mut max_n) = (f64::INFINITY, f64::NEG_INFINITY);
    for p in points {
        min_e = min_e.min(p.easting);
        max_e = max_e.max(p.easting);
        min_n = min_n.min(p.northing);
        max_n = max_n.max(p.northing);
    }
    let shift = ((min_e + max_e) / 2.0, (min_n + max_n) / 2.0);
    let half_range = ((max_e - min_e) / 2.0).max((max_n - min_n) / 2.0);
    let scale = if half_range > 0.0 { half_range } else { 1.0 };
    (shift, scale)
}

fn scaled(p: RawCoordinate, shift: (f64, f64), scale: f64) -> (f64, f64) {
    ((p.easting - shift.0) / scale, (p.northing - shift.1) / scale)
}

/// Saddle-point system `[K P; Pᵀ 0]` for the kernel block `K` and the
/// polynomial block `P = [1 x y]`.
fn system_matrix(centers: &[(f64, f64)]) -> Vec<Vec<f64>> {
    let n = centers.len();
    let size = n + POLY_TERMS;
    let mut a = vec![vec![0.0; size]; size];

    for (i, &(xi, yi)) in centers.iter().enumerate() {
        for (j, &(xj, yj)) in centers.iter().enumerate() {
            a[i][j] = thin_plate((xi - xj).hypot(yi - yj));
        }
        let poly = [1.0, xi, yi];
        for (k, value) in poly.iter().enumerate() {
            a[i][n + k] = *value;
            a[n + k][i] = *value;
        }
    }

    a
}

/// Gaussian elimination with partial pivoting, shared across right-hand sides.
/// Each right-hand side holds one value per center; the polynomial rows are zero.
fn solve(mut a: Vec<Vec<f64>>, values: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
    let size = a.len();
    let mut rhs: Vec<Vec<f64>> = values
        .iter()
        .map(|v| {
            let mut b = v.clone();
            b.resize(size, 0.0);
            b
        })
        .collect();

    for col in 0..size {
        let pivot_row = (col..size)
            .max_by(|&r1, &r2| a[r1][col].abs().total_cmp(&a[r2][col].abs()))
            .unwrap_or(col);

        if a[pivot_row][col].abs() < PIVOT_TOLERANCE {
            return Err(PlotError::calibration(
                "reference points are colinear or coincident; the correction field is undefined",
            ));
        }

        a.swap(col, pivot_row);
        for b in rhs.iter_mut() {
            b.swap(col, pivot_row);
        }

        for row in (col + 1)..size {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..size {
                a[row][k] -= factor * a[col][k];
            }
            for b in rhs.iter_mut() {
                b[row] -= factor * b[col];
            }
        }
    }

    for b in rhs.iter_mut() {
        for row in (0..size).rev() {
            let tail: f64 = ((row + 1)..size).map(|k| a[row][k] * b[k]).sum();
            b[row] = (b[row] - tail) / a[row][row];
        }
    }

    Ok(rhs)
}
