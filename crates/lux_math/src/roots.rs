//! Closed-form real roots of quadratic, cubic and quartic polynomials.
//!
//! Coefficients are given lowest order first: `c[0] + c[1]*x + c[2]*x^2 ...`.
//! Everything runs in `f64`; the quartic in particular loses too much
//! precision in `f32` to be useful for ray-torus intersection.
//!
//! Roots are returned unsorted. Repeated roots are reported once.

use std::f64::consts::PI;

/// Threshold below which a discriminant or coefficient counts as zero.
pub const EQN_EPS: f64 = 1e-12;

#[inline]
fn is_zero(x: f64) -> bool {
    x > -EQN_EPS && x < EQN_EPS
}

/// Up to four real roots, stored inline.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Roots {
    values: [f64; 4],
    len: usize,
}

impl Roots {
    fn push(&mut self, x: f64) {
        if self.len < self.values.len() {
            self.values[self.len] = x;
            self.len += 1;
        }
    }

    fn extend(&mut self, other: Roots) {
        for &x in other.as_slice() {
            self.push(x);
        }
    }

    fn shift(mut self, sub: f64) -> Self {
        for x in &mut self.values[..self.len] {
            *x -= sub;
        }
        self
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.as_slice().iter().copied()
    }
}

/// Real roots of `c[0] + c[1] x + c[2] x^2`.
///
/// `c[2]` must be non-zero.
pub fn solve_quadratic(c: [f64; 3]) -> Roots {
    let mut roots = Roots::default();

    // x^2 + 2px + q = 0
    let p = c[1] / (2.0 * c[2]);
    let q = c[0] / c[2];
    let d = p * p - q;

    if is_zero(d) {
        roots.push(-p);
    } else if d > 0.0 {
        let sqrt_d = d.sqrt();
        roots.push(sqrt_d - p);
        roots.push(-sqrt_d - p);
    }
    roots
}

/// Real roots of `c[0] + c[1] x + c[2] x^2 + c[3] x^3`.
///
/// `c[3]` must be non-zero.
pub fn solve_cubic(c: [f64; 4]) -> Roots {
    let mut roots = Roots::default();

    // x^3 + Ax^2 + Bx + C = 0
    let a = c[2] / c[3];
    let b = c[1] / c[3];
    let cc = c[0] / c[3];

    // x = y - A/3 leaves the depressed cubic y^3 + 3py + 2q = 0
    let sq_a = a * a;
    let p = (-sq_a / 3.0 + b) / 3.0;
    let q = (2.0 / 27.0 * a * sq_a - a * b / 3.0 + cc) / 2.0;

    let cb_p = p * p * p;
    let d = q * q + cb_p;

    if is_zero(d) {
        if is_zero(q) {
            roots.push(0.0);
        } else {
            let u = (-q).cbrt();
            roots.push(2.0 * u);
            roots.push(-u);
        }
    } else if d < 0.0 {
        // Casus irreducibilis: three distinct real roots.
        let phi = (-q / (-cb_p).sqrt()).clamp(-1.0, 1.0).acos() / 3.0;
        let t = 2.0 * (-p).sqrt();
        roots.push(t * phi.cos());
        roots.push(-t * (phi + PI / 3.0).cos());
        roots.push(-t * (phi - PI / 3.0).cos());
    } else {
        let sqrt_d = d.sqrt();
        let u = (sqrt_d - q).cbrt();
        let v = -(sqrt_d + q).cbrt();
        roots.push(u + v);
    }

    roots.shift(a / 3.0)
}

/// Real roots of `c[0] + c[1] x + c[2] x^2 + c[3] x^3 + c[4] x^4`.
///
/// Solved through the resolvent cubic (Ferrari). `c[4]` must be non-zero.
pub fn solve_quartic(c: [f64; 5]) -> Roots {
    // x^4 + Ax^3 + Bx^2 + Cx + D = 0
    let a = c[3] / c[4];
    let b = c[2] / c[4];
    let cc = c[1] / c[4];
    let d = c[0] / c[4];

    // x = y - A/4 leaves y^4 + py^2 + qy + r = 0
    let sq_a = a * a;
    let p = -3.0 / 8.0 * sq_a + b;
    let q = sq_a * a / 8.0 - a * b / 2.0 + cc;
    let r = -3.0 / 256.0 * sq_a * sq_a + sq_a * b / 16.0 - a * cc / 4.0 + d;

    let mut roots = Roots::default();

    if is_zero(r) {
        // y (y^3 + py + q) = 0
        roots.extend(solve_cubic([q, p, 0.0, 1.0]));
        roots.push(0.0);
    } else {
        // Any real root of the resolvent cubic works.
        let resolvent = solve_cubic([r * p / 2.0 - q * q / 8.0, -r, -p / 2.0, 1.0]);
        let Some(z) = resolvent.iter().next() else {
            return roots;
        };

        let u = z * z - r;
        let v = 2.0 * z - p;

        let u = if is_zero(u) {
            0.0
        } else if u > 0.0 {
            u.sqrt()
        } else {
            return roots;
        };
        let v = if is_zero(v) {
            0.0
        } else if v > 0.0 {
            v.sqrt()
        } else {
            return roots;
        };

        let signed_v = if q < 0.0 { -v } else { v };
        roots.extend(solve_quadratic([z - u, signed_v, 1.0]));
        roots.extend(solve_quadratic([z + u, -signed_v, 1.0]));
    }

    roots.shift(a / 4.0)
}
