//! Electrical mobility of singly and multiply charged particles.
//!
//! Diameters are in nanometres throughout. Mobilities share those units, so
//! they are only meaningful relative to each other; this is enough to find
//! the diameter at which a particle with a different number of charges has
//! the same mobility (and is therefore classified into the same bin).

use crate::constants::mobility::{
    AIR_VISCOSITY, CUNNINGHAM_A, CUNNINGHAM_B, CUNNINGHAM_C, ELEMENTARY_CHARGE, MEAN_FREE_PATH_NM,
    SOLVER_MAX_NM, SOLVER_MIN_NM, SOLVER_TOLERANCE,
};
use crate::error::{Result, SmpsError};
use std::f64::consts::PI;

const MAX_ITERATIONS: usize = 200;

/// Cunningham slip correction factor for a diameter in nm
pub fn cunningham_correction(dp_nm: f64) -> f64 {
    let knudsen = 2.0 * MEAN_FREE_PATH_NM / dp_nm;
    1.0 + knudsen * (CUNNINGHAM_A + CUNNINGHAM_B * (-CUNNINGHAM_C * dp_nm / MEAN_FREE_PATH_NM).exp())
}

/// Electrical mobility of a particle carrying `charges` elementary charges
pub fn electrical_mobility(dp_nm: f64, charges: u32) -> f64 {
    charges as f64 * ELEMENTARY_CHARGE * cunningham_correction(dp_nm) / (3.0 * PI * AIR_VISCOSITY * dp_nm)
}

/// Diameter of a particle with `charges_2` charges whose mobility equals that
/// of a `dp1_nm` particle carrying `charges_1`.
///
/// Mobility falls monotonically with diameter, so the root is bracketed and
/// found by bisection in log space.
pub fn equivalent_diameter(dp1_nm: f64, charges_1: u32, charges_2: u32) -> Result<f64> {
    if !(dp1_nm.is_finite() && dp1_nm > 0.0) {
        return Err(SmpsError::Mobility {
            reason: format!("diameter must be positive, got {}", dp1_nm),
        });
    }
    if charges_1 == 0 || charges_2 == 0 {
        return Err(SmpsError::Mobility {
            reason: "charge counts must be positive".to_string(),
        });
    }
    if charges_1 == charges_2 {
        return Ok(dp1_nm);
    }

    let target = electrical_mobility(dp1_nm, charges_1);
    let residual = |dp: f64| electrical_mobility(dp, charges_2) - target;

    let (mut low, mut high) = (SOLVER_MIN_NM.ln(), SOLVER_MAX_NM.ln());
    if residual(low.exp()) < 0.0 || residual(high.exp()) > 0.0 {
        return Err(SmpsError::Mobility {
            reason: format!(
                "no diameter between {} and {} nm matches the mobility of {} nm with {} charges",
                SOLVER_MIN_NM, SOLVER_MAX_NM, dp1_nm, charges_1
            ),
        });
    }

    for _ in 0..MAX_ITERATIONS {
        let mid = 0.5 * (low + high);
        if residual(mid.exp()) > 0.0 {
            low = mid;
        } else {
            high = mid;
        }
        if high - low < SOLVER_TOLERANCE {
            break;
        }
    }

    Ok((0.5 * (low + high)).exp())
}
