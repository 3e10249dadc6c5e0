// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! RCS front-end checks against analytical scattering results.

mod common;

use num_complex::Complex64;

use common::plate_config;
use echosim::{sim_rcs, LengthUnit, MeshTarget, Permittivity, RcsDirection, Tier};

const VEL_C: f64 = 299792458.0;

fn vertical() -> [Complex64; 3] {
    [
        Complex64::new(0.0, 0.0),
        Complex64::new(0.0, 0.0),
        Complex64::new(1.0, 0.0),
    ]
}

fn db(x: f64) -> f64 {
    10.0 * x.log10()
}

#[test]
fn flat_plate_broadside_matches_physical_optics() {
    // 1 m × 1 m PEC plate, broadside at 77 GHz: σ = 4π·A²/λ².
    let plate = MeshTarget::new(&plate_config(0.0, 1.0)).unwrap();
    let freq = 77.0e9;
    let lambda = VEL_C / freq;
    let sigma = sim_rcs(
        &[&plate],
        freq,
        vertical(),
        vertical(),
        &[RcsDirection::monostatic(180.0, 90.0)],
        1.0,
        Tier::Standard,
    )
    .unwrap()[0];

    let expected = 4.0 * std::f64::consts::PI / (lambda * lambda);
    assert!(
        (db(sigma) - db(expected)).abs() < 1.0,
        "plate RCS {:.1} dBsm, expected {:.1} dBsm",
        db(sigma),
        db(expected)
    );
}

#[test]
fn corner_reflector_returns_strongly() {
    // A trihedral of three mutually perpendicular unit squares on the
    // coordinate planes, corner at the origin, lit along its boresight
    // (1,1,1)/√3. The analytical peak for a 1 m square trihedral at 77 GHz is
    // 12π·L⁴/λ² ≈ 2.5·10⁶ m²; anything at or above 10⁴ m² proves the triple
    // bounce is coherent.
    let trihedral = MeshTarget::new(&echosim::MeshTargetConfig {
        vertices: vec![
            [0.0, 0.0, 0.0],
            // Face in the xy plane.
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
            // Face in the yz plane.
            [0.0, 1.0, 1.0],
            [0.0, 0.0, 1.0],
            // Face in the xz plane.
            [1.0, 0.0, 1.0],
        ],
        triangles: vec![
            // xy face (normal +z).
            [0, 1, 2],
            [0, 2, 3],
            // yz face (normal +x).
            [0, 3, 4],
            [0, 4, 5],
            // xz face (normal +y).
            [0, 5, 6],
            [0, 6, 1],
        ],
        origin: [0.0; 3],
        location: [0.0; 3],
        speed: [0.0; 3],
        rotation: [0.0; 3],
        rotation_rate: [0.0; 3],
        unit: LengthUnit::M,
        permittivity: Permittivity::Pec,
        permeability: Complex64::new(1.0, 0.0),
        skip_diffusion: false,
    })
    .unwrap();

    // Boresight: θ = acos(1/√3), φ = 45°.
    let theta = (1.0_f64 / 3.0_f64.sqrt()).acos().to_degrees();
    let sigma = sim_rcs(
        &[&trihedral],
        77.0e9,
        vertical(),
        vertical(),
        &[RcsDirection::monostatic(45.0, theta)],
        1.0,
        Tier::Standard,
    )
    .unwrap()[0];
    assert!(sigma >= 1.0e4, "trihedral RCS {sigma:.3e} m²");
}

#[test]
fn rcs_is_rotation_invariant() {
    // Rotating the plate and the look direction together leaves σ unchanged.
    let freq = 24.0e9;
    let upright = MeshTarget::new(&plate_config(0.0, 0.3)).unwrap();
    let sigma_a = sim_rcs(
        &[&upright],
        freq,
        vertical(),
        vertical(),
        &[RcsDirection::monostatic(180.0, 90.0)],
        4.0,
        Tier::Standard,
    )
    .unwrap()[0];

    let mut rotated_config = plate_config(0.0, 0.3);
    rotated_config.rotation = [25.0, 0.0, 0.0];
    let rotated = MeshTarget::new(&rotated_config).unwrap();
    let sigma_b = sim_rcs(
        &[&rotated],
        freq,
        vertical(),
        vertical(),
        &[RcsDirection::monostatic(205.0, 90.0)],
        4.0,
        Tier::Standard,
    )
    .unwrap()[0];

    assert!(
        (db(sigma_a) - db(sigma_b)).abs() < 0.5,
        "{:.2} dBsm vs {:.2} dBsm",
        db(sigma_a),
        db(sigma_b)
    );
}

#[test]
fn unit_scaling_is_transparent() {
    // The same plate declared in millimetres must return the same σ.
    let freq = 10.0e9;
    let metres = MeshTarget::new(&plate_config(0.0, 0.3)).unwrap();

    let mut mm_config = plate_config(0.0, 0.3);
    mm_config.vertices = mm_config
        .vertices
        .iter()
        .map(|v| [v[0] * 1000.0, v[1] * 1000.0, v[2] * 1000.0])
        .collect();
    mm_config.unit = LengthUnit::Mm;
    let millimetres = MeshTarget::new(&mm_config).unwrap();

    let dirs = [RcsDirection::monostatic(180.0, 90.0)];
    let a = sim_rcs(&[&metres], freq, vertical(), vertical(), &dirs, 1.0, Tier::Standard)
        .unwrap()[0];
    let b = sim_rcs(
        &[&millimetres],
        freq,
        vertical(),
        vertical(),
        &dirs,
        1.0,
        Tier::Standard,
    )
    .unwrap()[0];
    assert!((db(a) - db(b)).abs() < 1e-6, "{a:.6e} vs {b:.6e}");
}

#[test]
fn batches_preserve_order_and_tilted_plates_fade() {
    let plate = MeshTarget::new(&plate_config(0.0, 0.3)).unwrap();
    let freq = 24.0e9;
    let sigmas = sim_rcs(
        &[&plate],
        freq,
        vertical(),
        vertical(),
        &[
            RcsDirection::monostatic(180.0, 90.0),
            RcsDirection::monostatic(160.0, 90.0),
        ],
        1.0,
        Tier::Standard,
    )
    .unwrap();
    assert_eq!(sigmas.len(), 2);
    // Away from broadside the specular return collapses.
    assert!(
        sigmas[1] < sigmas[0] / 10.0,
        "broadside {:.3e}, tilted {:.3e}",
        sigmas[0],
        sigmas[1]
    );
}

#[test]
fn free_tier_rejects_oversized_scenes() {
    // Three targets exceed the free-tier target cap of two.
    let plates: Vec<MeshTarget> = (0..3)
        .map(|i| MeshTarget::new(&plate_config(i as f64, 0.3)).unwrap())
        .collect();
    let refs: Vec<&MeshTarget> = plates.iter().collect();
    let err = sim_rcs(
        &refs,
        10.0e9,
        vertical(),
        vertical(),
        &[RcsDirection::monostatic(180.0, 90.0)],
        1.0,
        Tier::Free,
    )
    .unwrap_err();
    assert!(matches!(err, echosim::EchosimError::Tier(_)));
}
