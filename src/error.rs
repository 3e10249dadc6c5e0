// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all echosim-related errors. This should be the *only*
//! error enum that is publicly visible.

use thiserror::Error;

use crate::geom::MeshError;
use crate::radar::ConfigError;
use crate::target::{MaterialError, TargetError};
use crate::tier::TierError;

/// The *only* publicly visible error from echosim. Validation errors surface
/// before any heavy work; numeric errors abort the call with no partial
/// output.
#[derive(Error, Debug)]
pub enum EchosimError {
    /// Shape or monotonicity violations in waveform, timestamp or motion
    /// arrays.
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),

    /// Scene validation failures: bad meshes, bad materials, negative RCS.
    #[error(transparent)]
    Scene(#[from] TargetError),

    /// Free-tier caps exceeded.
    #[error(transparent)]
    Tier(#[from] TierError),

    /// A non-finite intermediate value (NaN/Inf) was detected. Always fatal.
    #[error("Non-finite value detected during {stage}")]
    Numeric { stage: &'static str },

    /// The optional ray log could not be written.
    #[error("Ray log I/O error: {0}")]
    RayLog(#[from] std::io::Error),
}

// When changing the error propagation below, ensure `Self::from(e)` uses the
// correct `e`!

impl From<MeshError> for EchosimError {
    fn from(e: MeshError) -> Self {
        Self::Scene(TargetError::Mesh(e))
    }
}

impl From<MaterialError> for EchosimError {
    fn from(e: MaterialError) -> Self {
        Self::Scene(TargetError::Material(e))
    }
}
