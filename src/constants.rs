// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

All constants *must* be double precision. `echosim` does every calculation in
double precision; there is no single-precision fallback.
 */

pub use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Speed of light in vacuum \[m/s\] (CODATA).
pub const VEL_C: f64 = 299792458.0;

/// Boltzmann constant \[J/K\] (CODATA).
pub const BOLTZMANN: f64 = 1.380649e-23;

/// Reference noise temperature for receiver noise budgets \[K\].
pub const T0: f64 = 290.0;

/// Triangles with an area below this value are rejected as degenerate \[m²\].
pub const MIN_TRIANGLE_AREA: f64 = 1e-12;

/// Surface hits with |cos θᵢ| below this value contribute nothing; the
/// incidence is treated as grazing.
pub const GRAZING_COS_FLOOR: f64 = 1e-6;

/// Child rays are re-launched this far along the surface normal so they cannot
/// re-intersect their origin surface \[m\].
pub const SELF_INTERSECT_OFFSET: f64 = 1e-4;

/// Default cap on the number of reflections a ray may undergo.
pub const DEFAULT_MAX_REFLECTIONS: u32 = 10;

/// Rays whose accumulated field amplitude falls below this floor are retired.
pub const AMPLITUDE_FLOOR: f64 = 1e-9;

/// Relative permittivities with a real part at or above this value are treated
/// as perfect electric conductors.
pub const PEC_PERMITTIVITY_THRESHOLD: f64 = 1e10;
