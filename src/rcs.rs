// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The radar-cross-section front-end.
//!
//! Drives the ray tracer in a non-coherent, single-shot mode with no waveform:
//! an incident plane wave is approximated by a planar bundle of parallel rays,
//! and σ = 4π·|E_far|²/|E_inc|² with a unit incident field.

use num_complex::Complex64;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MAX_REFLECTIONS, PI, TAU, VEL_C};
use crate::error::EchosimError;
use crate::math::{cexp, spherical_to_unit, CVec3};
use crate::radar::ConfigError;
use crate::sbr::{planar_grid, prepare_targets, trace, transverse, world_sphere, Observation, TraceSpec};
use crate::target::MeshTarget;
use crate::tier::Tier;

/// One (incidence, observation) pair of a batch. Angles in degrees; spherical
/// convention: φ is the azimuth from +x, θ the polar angle from +z, and the
/// angles name the direction from the scene toward the source/observer.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RcsDirection {
    pub inc_phi: f64,
    pub inc_theta: f64,
    /// Observation azimuth \[deg\]; defaults to the incidence (monostatic).
    #[serde(default)]
    pub obs_phi: Option<f64>,
    /// Observation polar angle \[deg\]; defaults to the incidence.
    #[serde(default)]
    pub obs_theta: Option<f64>,
}

impl RcsDirection {
    pub fn monostatic(phi_deg: f64, theta_deg: f64) -> RcsDirection {
        RcsDirection {
            inc_phi: phi_deg,
            inc_theta: theta_deg,
            obs_phi: None,
            obs_theta: None,
        }
    }

    pub fn bistatic(
        inc_phi: f64,
        inc_theta: f64,
        obs_phi: f64,
        obs_theta: f64,
    ) -> RcsDirection {
        RcsDirection {
            inc_phi,
            inc_theta,
            obs_phi: Some(obs_phi),
            obs_theta: Some(obs_theta),
        }
    }
}

/// Radar cross sections \[m²\] of a scene at one frequency, for a batch of
/// (incidence, observation) pairs sharing one polarization setup.
pub fn sim_rcs(
    targets: &[&MeshTarget],
    freq_hz: f64,
    inc_pol: [Complex64; 3],
    obs_pol: [Complex64; 3],
    directions: &[RcsDirection],
    density: f64,
    tier: Tier,
) -> Result<Vec<f64>, EchosimError> {
    if freq_hz <= 0.0 {
        return Err(ConfigError::NonPositiveFrequency(freq_hz).into());
    }
    if density <= 0.0 {
        return Err(ConfigError::NonPositiveDensity(density).into());
    }
    tier.check_meshes(targets)?;

    let lambda = VEL_C / freq_hz;
    let wavenumber = TAU / lambda;
    let spacing = lambda / density;

    // Static scene: poses at t = 0.
    let prepared = prepare_targets(targets, (0, 0, 0), 0.0);
    let spheres: Vec<_> = prepared.iter().map(world_sphere).collect();

    let sigmas: Vec<f64> = directions
        .par_iter()
        .map(|direction| {
            let to_source = spherical_to_unit(
                direction.inc_phi.to_radians(),
                direction.inc_theta.to_radians(),
            );
            let propagation = -to_source;
            let to_observer = spherical_to_unit(
                direction.obs_phi.unwrap_or(direction.inc_phi).to_radians(),
                direction
                    .obs_theta
                    .unwrap_or(direction.inc_theta)
                    .to_radians(),
            );

            let launch_pol = transverse(CVec3::from(inc_pol), propagation).normalize();
            let observer_pol = transverse(CVec3::from(obs_pol), to_observer).normalize();

            let mut primaries = vec![];
            planar_grid(propagation, &spheres, spacing, &mut primaries);

            let spec = TraceSpec {
                targets: &prepared,
                observation: Observation::Direction(to_observer),
                max_reflections: DEFAULT_MAX_REFLECTIONS,
                sensor_velocity: glam::DVec3::ZERO,
            };
            let out = trace(&primaries, launch_pol, &spec, false);

            // Coherent far-field sum. Incident phase is referenced to the
            // plane through the origin; the outgoing wavefront advances along
            // the observation direction.
            let mut far_field = Complex64::new(0.0, 0.0);
            for c in &out.contributions {
                let r_out = -c.point.dot(to_observer);
                let match_term = c.pol.dot(observer_pol);
                far_field += match_term * c.footprint * cexp(-wavenumber * (c.path + r_out));
            }
            4.0 * PI * far_field.norm_sqr() / (lambda * lambda)
        })
        .collect();

    if sigmas.iter().any(|s| !s.is_finite()) {
        return Err(EchosimError::Numeric {
            stage: "RCS evaluation",
        });
    }
    Ok(sigmas)
}
