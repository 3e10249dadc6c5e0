// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Radar scene simulation engine.
//!
//! Given a fully parameterized radar (transmitter chain, receiver chain,
//! platform motion) and a scene of ideal point scatterers and/or triangular
//! surface meshes with electromagnetic material properties, `echosim`
//! synthesizes the complex baseband I/Q samples the radar receiver would
//! record. The same engine, specialized to a single incident/observation
//! direction pair, returns monostatic and bistatic radar cross sections, and,
//! specialized to directional rays without coherent integration, returns
//! LiDAR-style point clouds.
//!
//! The engine is a single-entry library: it is called from one host thread
//! and parallelises internally with rayon.

pub mod constants;
mod error;
pub mod geom;
pub mod lidar;
pub mod math;
pub mod motion;
pub mod radar;
pub mod rcs;
pub(crate) mod sbr;
pub mod sim;
pub mod target;
pub mod tier;

// Re-exports.
pub use error::EchosimError;
pub use geom::LengthUnit;
pub use lidar::{sim_lidar, LidarPose, LidarReturn};
pub use math::{CVec3, EulerZyx};
pub use radar::{
    BasebandType, ChannelConfig, PlatformConfig, Radar, RadarConfig, ReceiverConfig,
    TransmitterConfig, WaveformModConfig,
};
pub use rcs::{sim_rcs, RcsDirection};
pub use sim::{sim_radar, FidelityLevel, SimOptions, SimOutput};
pub use target::{
    Material, MeshTarget, MeshTargetConfig, Permittivity, PointTarget, PointTargetConfig, Target,
};
pub use tier::Tier;
