// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Electromagnetic material properties and Fresnel reflection.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::PEC_PERMITTIVITY_THRESHOLD;

#[derive(Error, Debug)]
pub enum MaterialError {
    #[error("Relative permittivity must be finite, got {0}")]
    NonFinitePermittivity(Complex64),

    #[error("Relative permeability must be finite, got {0}")]
    NonFinitePermeability(Complex64),
}

/// Relative permittivity and permeability of a surface.
///
/// A perfect electric conductor is encoded as a permittivity with a very large
/// real part; both Fresnel coefficients are then forced to −1. Lossy
/// dielectrics use the plain complex extension of the real Fresnel formulas
/// with the principal square root; a negative imaginary part of ε is accepted
/// as given.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub permittivity: Complex64,
    pub permeability: Complex64,
}

/// TE and TM reflection coefficients at one incidence.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Fresnel {
    pub te: Complex64,
    pub tm: Complex64,
}

impl Material {
    pub fn new(permittivity: Complex64, permeability: Complex64) -> Result<Material, MaterialError> {
        if !permittivity.is_finite() {
            return Err(MaterialError::NonFinitePermittivity(permittivity));
        }
        if !permeability.is_finite() {
            return Err(MaterialError::NonFinitePermeability(permeability));
        }
        Ok(Material {
            permittivity,
            permeability,
        })
    }

    /// A perfect electric conductor.
    pub fn pec() -> Material {
        Material {
            permittivity: Complex64::new(1e30, 0.0),
            permeability: Complex64::new(1.0, 0.0),
        }
    }

    pub fn is_pec(&self) -> bool {
        self.permittivity.re >= PEC_PERMITTIVITY_THRESHOLD
    }

    /// Reflection coefficients for a wave arriving from vacuum at an incidence
    /// with the given cosine (cos θᵢ ∈ (0, 1]).
    pub(crate) fn fresnel(&self, cos_i: f64) -> Fresnel {
        if self.is_pec() {
            return Fresnel {
                te: Complex64::new(-1.0, 0.0),
                tm: Complex64::new(-1.0, 0.0),
            };
        }
        let n_sq = self.permittivity * self.permeability;
        let sin_i_sq = 1.0 - cos_i * cos_i;
        let cos_t = (Complex64::new(1.0, 0.0) - sin_i_sq / n_sq).sqrt();
        // Relative wave impedance of the surface medium.
        let z = (self.permeability / self.permittivity).sqrt();
        let te = (z * cos_i - cos_t) / (z * cos_i + cos_t);
        let tm = (z * cos_t - cos_i) / (z * cos_t + cos_i);
        Fresnel { te, tm }
    }
}

impl Default for Material {
    fn default() -> Material {
        Material::pec()
    }
}

/// The permittivity field of a target config: either the literal string
/// `"PEC"` or a complex value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Permittivity {
    Pec,
    Dielectric(Complex64),
}

impl Default for Permittivity {
    fn default() -> Permittivity {
        Permittivity::Pec
    }
}

impl Serialize for Permittivity {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Permittivity::Pec => serializer.serialize_str("PEC"),
            Permittivity::Dielectric(eps) => eps.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Permittivity {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Tag(String),
            Value(Complex64),
        }
        match Repr::deserialize(deserializer)? {
            Repr::Tag(s) if s.eq_ignore_ascii_case("pec") => Ok(Permittivity::Pec),
            Repr::Tag(s) => Err(serde::de::Error::custom(format!(
                "unrecognised permittivity \"{s}\"; expected \"PEC\" or a complex value"
            ))),
            Repr::Value(eps) => Ok(Permittivity::Dielectric(eps)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn pec_reflects_with_minus_one() {
        let f = Material::pec().fresnel(0.5);
        assert_abs_diff_eq!(f.te.re, -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(f.tm.re, -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(f.te.im, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn dielectric_normal_incidence() {
        // ε = 4 gives n = 2 and the classic (1 − n)/(1 + n) = −1/3.
        let m = Material::new(Complex64::new(4.0, 0.0), Complex64::new(1.0, 0.0)).unwrap();
        let f = m.fresnel(1.0);
        assert_abs_diff_eq!(f.te.re, -1.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(f.tm.re, -1.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn brewster_angle_kills_tm() {
        // Brewster for ε = 4: tan θ_B = 2.
        let theta_b = 2.0_f64.atan();
        let m = Material::new(Complex64::new(4.0, 0.0), Complex64::new(1.0, 0.0)).unwrap();
        let f = m.fresnel(theta_b.cos());
        assert_abs_diff_eq!(f.tm.norm(), 0.0, epsilon = 1e-12);
        assert!(f.te.norm() > 0.1);
    }

    #[test]
    fn rejects_non_finite() {
        assert!(Material::new(
            Complex64::new(f64::NAN, 0.0),
            Complex64::new(1.0, 0.0)
        )
        .is_err());
    }

    #[test]
    fn permittivity_round_trip() {
        let json = serde_json::to_string(&Permittivity::Pec).unwrap();
        assert_eq!(json, "\"PEC\"");
        let back: Permittivity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Permittivity::Pec);
    }
}
