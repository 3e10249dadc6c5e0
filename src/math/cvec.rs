// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A complex-valued 3-vector, used for polarization states and the electric
//! field a ray carries.

use glam::{DMat3, DVec3};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CVec3 {
    pub x: Complex64,
    pub y: Complex64,
    pub z: Complex64,
}

impl CVec3 {
    pub fn new(x: Complex64, y: Complex64, z: Complex64) -> CVec3 {
        CVec3 { x, y, z }
    }

    /// Promote a real vector.
    pub fn from_real(v: DVec3) -> CVec3 {
        CVec3 {
            x: Complex64::new(v.x, 0.0),
            y: Complex64::new(v.y, 0.0),
            z: Complex64::new(v.z, 0.0),
        }
    }

    /// The bilinear (unconjugated) inner product against a real direction.
    pub fn dot_real(self, v: DVec3) -> Complex64 {
        self.x * v.x + self.y * v.y + self.z * v.z
    }

    /// The bilinear (unconjugated) inner product. Used for polarization
    /// matching; antenna effective lengths pair without conjugation.
    pub fn dot(self, rhs: CVec3) -> Complex64 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    /// Euclidean norm over all six real components.
    pub fn norm(self) -> f64 {
        (self.x.norm_sqr() + self.y.norm_sqr() + self.z.norm_sqr()).sqrt()
    }

    pub fn normalize(self) -> CVec3 {
        let n = self.norm();
        if n > 0.0 {
            self * Complex64::new(1.0 / n, 0.0)
        } else {
            self
        }
    }

    /// Apply a real rotation to both the real and imaginary parts.
    pub fn rotate(self, m: DMat3) -> CVec3 {
        let re = m * DVec3::new(self.x.re, self.y.re, self.z.re);
        let im = m * DVec3::new(self.x.im, self.y.im, self.z.im);
        CVec3 {
            x: Complex64::new(re.x, im.x),
            y: Complex64::new(re.y, im.y),
            z: Complex64::new(re.z, im.z),
        }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<[Complex64; 3]> for CVec3 {
    fn from(a: [Complex64; 3]) -> CVec3 {
        CVec3::new(a[0], a[1], a[2])
    }
}

impl std::ops::Add for CVec3 {
    type Output = CVec3;

    fn add(self, rhs: CVec3) -> CVec3 {
        CVec3 {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        }
    }
}

impl std::ops::AddAssign for CVec3 {
    fn add_assign(&mut self, rhs: CVec3) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl std::ops::Mul<Complex64> for CVec3 {
    type Output = CVec3;

    fn mul(self, rhs: Complex64) -> CVec3 {
        CVec3 {
            x: self.x * rhs,
            y: self.y * rhs,
            z: self.z * rhs,
        }
    }
}

impl std::ops::Mul<f64> for CVec3 {
    type Output = CVec3;

    fn mul(self, rhs: f64) -> CVec3 {
        CVec3 {
            x: self.x * rhs,
            y: self.y * rhs,
            z: self.z * rhs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn rotate_real_vector() {
        let v = CVec3::from_real(DVec3::X);
        let m = DMat3::from_rotation_z(std::f64::consts::FRAC_PI_2);
        let r = v.rotate(m);
        assert_abs_diff_eq!(r.y.re, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(r.x.re, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn norm_and_normalize() {
        let v = CVec3::new(
            Complex64::new(3.0, 0.0),
            Complex64::new(0.0, 4.0),
            Complex64::new(0.0, 0.0),
        );
        assert_abs_diff_eq!(v.norm(), 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(v.normalize().norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn bilinear_dot_does_not_conjugate() {
        let v = CVec3::new(
            Complex64::new(0.0, 1.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, 0.0),
        );
        // j · j = −1, not +1.
        assert_abs_diff_eq!(v.dot(v).re, -1.0, epsilon = 1e-12);
    }
}
