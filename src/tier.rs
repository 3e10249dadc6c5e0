// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Licensing-tier caps.
//!
//! The license gate itself (token verification, `is_free_tier()`) lives
//! outside the engine; callers resolve their entitlement to a [Tier] and the
//! engine enforces the numeric caps as a pure predicate before any heavy work.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::radar::Radar;
use crate::target::Target;

const FREE_MAX_TX_CHANNELS: usize = 1;
const FREE_MAX_RX_CHANNELS: usize = 1;
const FREE_MAX_TARGETS: usize = 2;
const FREE_MAX_TRIANGLES: usize = 8;

#[derive(Error, Debug)]
pub enum TierError {
    #[error("The free tier supports up to {max} transmitter channels, got {got}")]
    TooManyTxChannels { got: usize, max: usize },

    #[error("The free tier supports up to {max} receiver channels, got {got}")]
    TooManyRxChannels { got: usize, max: usize },

    #[error("The free tier supports up to {max} targets, got {got}")]
    TooManyTargets { got: usize, max: usize },

    #[error("The free tier supports meshes of up to {max} triangles, got {got}")]
    MeshTooLarge { got: usize, max: usize },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Standard,
    Free,
}

impl Tier {
    pub(crate) fn check_radar(&self, radar: &Radar) -> Result<(), TierError> {
        if let Tier::Standard = self {
            return Ok(());
        }
        let num_tx = radar.tx_channels().len();
        if num_tx > FREE_MAX_TX_CHANNELS {
            return Err(TierError::TooManyTxChannels {
                got: num_tx,
                max: FREE_MAX_TX_CHANNELS,
            });
        }
        let num_rx = radar.rx_channels().len();
        if num_rx > FREE_MAX_RX_CHANNELS {
            return Err(TierError::TooManyRxChannels {
                got: num_rx,
                max: FREE_MAX_RX_CHANNELS,
            });
        }
        Ok(())
    }

    pub(crate) fn check_targets(&self, targets: &[Target]) -> Result<(), TierError> {
        if let Tier::Standard = self {
            return Ok(());
        }
        if targets.len() > FREE_MAX_TARGETS {
            return Err(TierError::TooManyTargets {
                got: targets.len(),
                max: FREE_MAX_TARGETS,
            });
        }
        for target in targets {
            if let Target::Mesh(mesh) = target {
                if mesh.num_triangles() > FREE_MAX_TRIANGLES {
                    return Err(TierError::MeshTooLarge {
                        got: mesh.num_triangles(),
                        max: FREE_MAX_TRIANGLES,
                    });
                }
            }
        }
        Ok(())
    }

    /// Cap check for the mesh-only front-ends (RCS, LiDAR).
    pub(crate) fn check_meshes(&self, meshes: &[&crate::target::MeshTarget]) -> Result<(), TierError> {
        if let Tier::Standard = self {
            return Ok(());
        }
        if meshes.len() > FREE_MAX_TARGETS {
            return Err(TierError::TooManyTargets {
                got: meshes.len(),
                max: FREE_MAX_TARGETS,
            });
        }
        for mesh in meshes {
            if mesh.num_triangles() > FREE_MAX_TRIANGLES {
                return Err(TierError::MeshTooLarge {
                    got: mesh.num_triangles(),
                    max: FREE_MAX_TRIANGLES,
                });
            }
        }
        Ok(())
    }
}
