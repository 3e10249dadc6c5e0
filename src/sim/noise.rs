// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The receiver noise budget.
//!
//! The engine reports a per-sample noise amplitude; the caller injects AWGN
//! with that standard deviation outside the engine.

use crate::constants::{BOLTZMANN, T0};
use crate::math::{db_to_amplitude, db_to_power};
use crate::radar::Radar;

/// Per-sample baseband noise amplitude σ_n \[V\]:
/// `sqrt(k·T0·B·F·G_rf·R_load) · 10^(G_bb/20)` with B the baseband bandwidth
/// and F the noise figure.
pub(crate) fn noise_amplitude(radar: &Radar) -> f64 {
    let rx = &radar.rx;
    let noise_power_w = BOLTZMANN
        * T0
        * rx.baseband_bw
        * db_to_power(rx.noise_figure_db)
        * db_to_power(rx.rf_gain_db);
    (noise_power_w * rx.load_resistor).sqrt() * db_to_amplitude(rx.baseband_gain_db)
}
