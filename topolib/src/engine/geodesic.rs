//! Inverse geodesic problem on an ellipsoid of revolution (Vincenty).

use super::{EngineError, EngineResult, Ellipsoid};

const MAX_ITERATIONS: usize = 200;
const TOLERANCE: f64 = 1e-12;

/// Geodesic length in metres between two (longitude, latitude) positions in
/// degrees. NaN when a latitude is outside [-90, 90]; an error when the
/// iteration does not converge (nearly antipodal points).
pub(crate) fn inverse(
    ellipsoid: &Ellipsoid,
    (lon1, lat1): (f64, f64),
    (lon2, lat2): (f64, f64),
) -> EngineResult<f64> {
    if !(lat1.abs() <= 90.0 && lat2.abs() <= 90.0) || !lon1.is_finite() || !lon2.is_finite() {
        return Ok(f64::NAN);
    }

    let a = ellipsoid.semi_major_metre;
    let b = ellipsoid.semi_minor_metre;
    let f = (a - b) / a;

    let l = (lon2 - lon1).to_radians();
    let u1 = ((1.0 - f) * lat1.to_radians().tan()).atan();
    let u2 = ((1.0 - f) * lat2.to_radians().tan()).atan();
    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();

    let mut lambda = l;
    let mut converged = false;
    let (mut sin_sigma, mut cos_sigma, mut sigma) = (0.0, 0.0, 0.0);
    let (mut cos_sq_alpha, mut cos_2sigma_m) = (0.0, 0.0);

    for _ in 0..MAX_ITERATIONS {
        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        sin_sigma = (cos_u2 * sin_lambda).hypot(cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda);
        if sin_sigma == 0.0 {
            return Ok(0.0);
        }
        cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        sigma = sin_sigma.atan2(cos_sigma);

        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
        // equatorial line
        cos_2sigma_m = if cos_sq_alpha.abs() < 1e-12 {
            0.0
        } else {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
        };

        let c = f / 16.0 * cos_sq_alpha * (4.0 + f * (4.0 - 3.0 * cos_sq_alpha));
        let previous = lambda;
        lambda = l
            + (1.0 - c)
                * f
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))));
        if (lambda - previous).abs() < TOLERANCE {
            converged = true;
            break;
        }
    }

    if !converged {
        return Err(EngineError::Operation(format!(
            "geodesic between ({}, {}) and ({}, {}) did not converge",
            lon1, lat1, lon2, lat2
        )));
    }

    let u_sq = cos_sq_alpha * (a * a - b * b) / (b * b);
    let big_a = 1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
    let big_b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
    let delta_sigma = big_b
        * sin_sigma
        * (cos_2sigma_m
            + big_b / 4.0
                * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))
                    - big_b / 6.0
                        * cos_2sigma_m
                        * (-3.0 + 4.0 * sin_sigma.powi(2))
                        * (-3.0 + 4.0 * cos_2sigma_m.powi(2))));

    Ok(b * big_a * (sigma - delta_sigma))
}
