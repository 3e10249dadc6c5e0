// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The radar simulation entry point and its scheduler.
//!
//! The scheduler pins ray-tracer invocations to snapshots according to the
//! fidelity level — one per (frame, tx), per (frame, tx, pulse), or per
//! (frame, tx, pulse, sample) — and the baseband synthesizer then runs
//! exhaustively over every sample, reading the nearest snapshot at or before
//! its timestamp.

mod baseband;
mod interference;
mod noise;

pub(crate) use baseband::{SnapshotResult, SnapshotSet, SynthInputs};

use std::path::PathBuf;

use itertools::Itertools;
use log::{debug, info};
use ndarray::Array3;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::constants::{DEFAULT_MAX_REFLECTIONS, VEL_C};
use crate::error::EchosimError;
use crate::radar::{ChannelLayout, ConfigError, Radar};
use crate::sbr::{
    angular_grid, prepare_targets, trace, world_sphere, Observation, PrimaryRay, RayLogger,
    TraceSpec,
};
use crate::target::{MeshTarget, PointTarget, Target};
use crate::tier::Tier;

/// How often the ray tracer is re-invoked along the sample axis.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FidelityLevel {
    /// One ray trace per (frame, tx channel).
    #[default]
    Frame,
    /// One ray trace per (frame, tx channel, pulse).
    Pulse,
    /// One ray trace per (frame, tx channel, pulse, sample).
    Sample,
}

#[derive(Clone, Debug)]
pub struct SimOptions {
    /// Ray density override \[rays per wavelength\]; defaults to the
    /// transmitter's.
    pub density: Option<f64>,

    pub level: FidelityLevel,

    /// Keep only ray contributions whose reflection count lies in this
    /// inclusive range.
    pub ray_filter: Option<(u32, u32)>,

    /// Write a newline-delimited JSON record per traced ray to this path.
    pub log_path: Option<PathBuf>,

    /// Log per-snapshot ray accounting at debug level.
    pub debug: bool,

    pub tier: Tier,

    /// Reflection cap for the ray tracer.
    pub max_reflections: u32,
}

impl Default for SimOptions {
    fn default() -> SimOptions {
        SimOptions {
            density: None,
            level: FidelityLevel::default(),
            ray_filter: None,
            log_path: None,
            debug: false,
            tier: Tier::default(),
            max_reflections: DEFAULT_MAX_REFLECTIONS,
        }
    }
}

/// The output of [sim_radar]. Either the whole tensor set is written or the
/// call fails; there is no partial-result contract.
#[derive(Clone, Debug)]
pub struct SimOutput {
    /// Complex baseband samples \[frames·channels, pulses, samples\]. In real
    /// output mode the imaginary parts are zero.
    pub baseband: Array3<Complex64>,

    /// The timestamp tensor \[s\].
    pub timestamp: Array3<f64>,

    /// Per-sample noise amplitude \[V\]; the caller injects AWGN with this
    /// standard deviation.
    pub noise_sigma: f64,

    /// Interference samples with the victim radar's shape, when an interferer
    /// was supplied.
    pub interference: Option<Array3<Complex64>>,
}

/// Synthesize the baseband I/Q samples a radar records from a scene.
///
/// `frame_times` holds the start time of every frame \[s\]. `interf`, when
/// given, is a second radar whose transmission couples directly into this
/// radar's receiver.
pub fn sim_radar(
    radar: &Radar,
    targets: &[Target],
    frame_times: &[f64],
    opts: &SimOptions,
    interf: Option<&Radar>,
) -> Result<SimOutput, EchosimError> {
    let density = opts.density.unwrap_or(radar.density);
    if density <= 0.0 {
        return Err(ConfigError::NonPositiveDensity(density).into());
    }
    opts.tier.check_radar(radar)?;
    opts.tier.check_targets(targets)?;

    let ts = radar.timestamps(frame_times)?;
    let dim = ts.dim();
    validate_tables(radar, targets, dim)?;

    let meshes: Vec<&MeshTarget> = targets
        .iter()
        .filter_map(|t| match t {
            Target::Mesh(m) => Some(m),
            Target::Point(_) => None,
        })
        .collect();
    let points: Vec<&PointTarget> = targets
        .iter()
        .filter_map(|t| match t {
            Target::Point(p) => Some(p),
            Target::Mesh(_) => None,
        })
        .collect();
    info!(
        "Simulating {} frames × {} pulses × {} samples over {} mesh and {} point targets",
        frame_times.len(),
        radar.waveform.num_pulses(),
        radar.num_samples(),
        meshes.len(),
        points.len()
    );

    let layout = radar.layout(frame_times.len());
    let logger = match &opts.log_path {
        Some(path) => Some(RayLogger::create(path)?),
        None => None,
    };
    let snapshots = build_snapshots(radar, &meshes, &ts, layout, density, opts, logger.as_ref())?;
    if let Some(logger) = logger {
        logger.finish()?;
    }

    let mut baseband = Array3::from_elem(dim, Complex64::new(0.0, 0.0));
    baseband::synthesize(
        &SynthInputs {
            radar,
            layout,
            ts: &ts,
            points: &points,
            snapshots: &snapshots,
        },
        &mut baseband,
    );
    if !baseband.iter().all(|v| v.is_finite()) {
        return Err(EchosimError::Numeric {
            stage: "baseband synthesis",
        });
    }

    let interference = match interf {
        Some(other) => {
            let tensor = interference::simulate(radar, other, &ts, layout)?;
            Some(tensor)
        }
        None => None,
    };

    Ok(SimOutput {
        baseband,
        timestamp: ts,
        noise_sigma: noise::noise_amplitude(radar),
        interference,
    })
}

/// Every tabulated motion/RCS/phase series must match the timestamp tensor.
fn validate_tables(
    radar: &Radar,
    targets: &[Target],
    dim: (usize, usize, usize),
) -> Result<(), ConfigError> {
    if let Some(got) = radar.phase_noise.as_ref().map(|pn| pn.dim()) {
        if got != dim {
            return Err(ConfigError::PhaseNoiseShape { got, expected: dim });
        }
    }
    let mut shapes: Vec<Option<(usize, usize, usize)>> = vec![
        radar.kinematic.table_shape(),
        radar.attitude.table_shape(),
    ];
    for target in targets {
        match target {
            Target::Mesh(m) => {
                shapes.push(m.kinematic().table_shape());
                shapes.push(m.attitude().table_shape());
            }
            Target::Point(p) => {
                shapes.push(p.kinematic().table_shape());
                shapes.push(p.rcs().table_shape());
                shapes.push(p.phase().table_shape());
            }
        }
    }
    for got in shapes.into_iter().flatten() {
        if got != dim {
            return Err(ConfigError::MotionShape { got, expected: dim });
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn build_snapshots(
    radar: &Radar,
    meshes: &[&MeshTarget],
    ts: &Array3<f64>,
    layout: ChannelLayout,
    density: f64,
    opts: &SimOptions,
    logger: Option<&RayLogger>,
) -> Result<SnapshotSet, EchosimError> {
    let num_pulses = radar.waveform.num_pulses();
    let samples = radar.num_samples();
    let pins: Vec<(usize, usize)> = match opts.level {
        FidelityLevel::Frame => vec![(0, 0)],
        FidelityLevel::Pulse => (0..num_pulses).map(|p| (p, 0)).collect(),
        FidelityLevel::Sample => (0..num_pulses).cartesian_product(0..samples).collect(),
    };

    let mut table = Vec::with_capacity(layout.frames);
    for frame in 0..layout.frames {
        let mut per_tx = Vec::with_capacity(layout.num_tx);
        for tx_i in 0..layout.num_tx {
            let mut snaps = Vec::with_capacity(pins.len());
            for &(pulse, sample) in &pins {
                let ch0 = layout.flat(frame, tx_i, 0);
                let idx = (ch0, pulse, sample);
                let t = ts[[ch0, pulse, sample]];
                let (snap, records) =
                    run_snapshot(radar, meshes, idx, t, tx_i, pulse, density, opts, logger.is_some());
                if opts.debug {
                    debug!(
                        "snapshot t={t:.9}s frame={frame} tx={tx_i} pulse={pulse} sample={sample}: \
                         {} contributions",
                        snap.contributions.len()
                    );
                }
                if let Some(logger) = logger {
                    logger.log_snapshot(t, frame, tx_i, pulse, sample, &records)?;
                }
                snaps.push(snap);
            }
            per_tx.push(snaps);
        }
        table.push(per_tx);
    }
    Ok(SnapshotSet {
        level: opts.level,
        samples_per_pulse: samples,
        table,
    })
}

/// One ray-tracer invocation, pinned to (frame, tx, pulse, sample).
#[allow(clippy::too_many_arguments)]
fn run_snapshot(
    radar: &Radar,
    meshes: &[&MeshTarget],
    idx: (usize, usize, usize),
    t: f64,
    tx_i: usize,
    pulse: usize,
    density: f64,
    opts: &SimOptions,
    want_records: bool,
) -> (SnapshotResult, Vec<crate::sbr::RayRecord>) {
    if meshes.is_empty() {
        return (
            SnapshotResult {
                time: t,
                contributions: vec![],
            },
            vec![],
        );
    }
    let tx = &radar.tx[tx_i];
    let pose = radar.platform_pose(idx, t);
    let sensor = pose.antenna_position(tx.location);
    let launch_pol = tx.polarization.rotate(pose.rotation);
    let lambda = VEL_C / radar.waveform.carrier(pulse);

    let prepared = prepare_targets(meshes, idx, t);
    let mut primaries: Vec<PrimaryRay> = vec![];
    for tt in &prepared {
        let (centre, radius) = world_sphere(tt);
        let spacing = tx
            .grid_rad
            .unwrap_or_else(|| lambda / (density * (2.0 * radius).max(lambda)));
        angular_grid(sensor, centre, radius, spacing, &mut primaries);
    }

    let spec = TraceSpec {
        targets: &prepared,
        observation: Observation::Point(pose.location),
        max_reflections: opts.max_reflections,
        sensor_velocity: pose.antenna_velocity(tx.location),
    };
    let out = trace(&primaries, launch_pol, &spec, want_records);
    let mut contributions = out.contributions;
    if let Some((lo, hi)) = opts.ray_filter {
        contributions.retain(|c| c.reflections >= lo && c.reflections <= hi);
    }
    (
        SnapshotResult {
            time: t,
            contributions,
        },
        out.records,
    )
}
