//! Cubic polynomial helpers for bezier segments:
//! - power-basis conversion of four bezier ordinates
//! - real root solving (constant / linear / quadratic / cubic with 1 or 3 roots)
//! - extrema parameters via the derivative's quadratic roots
//!
//! Solving runs in f64; parameters are returned as f32 like the rest of the core.

use std::f64::consts::PI;

/// Coefficients whose magnitude falls below this fraction of the largest
/// coefficient are treated as zero when picking the polynomial degree.
const DEGREE_EPS: f64 = 1e-7;

/// Slack allowed when accepting a root as lying in the unit interval.
const UNIT_EPS: f32 = 1e-4;

/// Evaluate a 1D cubic bezier with ordinates p0..p3 at t.
#[inline]
pub fn cubic_bezier(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let u = 1.0 - t;
    u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
}

#[inline]
pub fn cubic_bezier_derivative(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let u = 1.0 - t;
    3.0 * u * u * (p1 - p0) + 6.0 * u * t * (p2 - p1) + 3.0 * t * t * (p3 - p2)
}

/// Up to three real roots, in ascending order.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Roots {
    values: [f32; 3],
    len: usize,
}

impl Roots {
    fn push(&mut self, root: f64) {
        if self.len < 3 && root.is_finite() {
            self.values[self.len] = root as f32;
            self.len += 1;
        }
    }

    fn sorted(mut self) -> Self {
        self.values[..self.len].sort_by(|a, b| a.total_cmp(b));
        self
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.values[..self.len]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Roots within the unit interval (with a small tolerance), clamped to [0, 1].
    pub fn in_unit_interval(&self) -> impl Iterator<Item = f32> + '_ {
        self.as_slice()
            .iter()
            .copied()
            .filter(|r| *r >= -UNIT_EPS && *r <= 1.0 + UNIT_EPS)
            .map(|r| r.clamp(0.0, 1.0))
    }
}

/// `a*s^3 + b*s^2 + c*s + d` in power basis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubicPolynomial {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl CubicPolynomial {
    pub fn new(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self { a, b, c, d }
    }

    /// Convert four bezier control ordinates into power-basis coefficients.
    pub fn from_bezier(p0: f32, p1: f32, p2: f32, p3: f32) -> Self {
        let (p0, p1, p2, p3) = (p0 as f64, p1 as f64, p2 as f64, p3 as f64);
        Self {
            a: -p0 + 3.0 * p1 - 3.0 * p2 + p3,
            b: 3.0 * p0 - 6.0 * p1 + 3.0 * p2,
            c: -3.0 * p0 + 3.0 * p1,
            d: p0,
        }
    }

    #[inline]
    pub fn evaluate(&self, s: f32) -> f32 {
        let s = s as f64;
        (((self.a * s + self.b) * s + self.c) * s + self.d) as f32
    }

    #[inline]
    pub fn derivative(&self, s: f32) -> f32 {
        let s = s as f64;
        ((3.0 * self.a * s + 2.0 * self.b) * s + self.c) as f32
    }

    /// Real roots of the polynomial.
    ///
    /// An identically-zero polynomial reports the single root 0.
    pub fn roots(&self) -> Roots {
        let scale = self
            .a
            .abs()
            .max(self.b.abs())
            .max(self.c.abs())
            .max(self.d.abs());
        let negligible = |x: f64| x.abs() <= scale * DEGREE_EPS;

        if scale == 0.0 {
            let mut roots = Roots::default();
            roots.push(0.0);
            return roots;
        }
        if !negligible(self.a) {
            return solve_cubic(self.a, self.b, self.c, self.d);
        }
        if !negligible(self.b) {
            return solve_quadratic(self.b, self.c, self.d);
        }
        if !negligible(self.c) {
            let mut roots = Roots::default();
            roots.push(-self.d / self.c);
            return roots;
        }
        // Constant and non-zero.
        Roots::default()
    }

    /// Parameters in [0, 1] where the derivative vanishes.
    pub fn extrema_parameters(&self) -> Roots {
        let mut out = Roots::default();
        let derivative = solve_quadratic_or_lower(3.0 * self.a, 2.0 * self.b, self.c);
        for r in derivative.in_unit_interval() {
            out.push(r as f64);
        }
        out
    }

    /// (max, min) of the polynomial over s in [0, 1].
    pub fn unit_extrema(&self) -> (f32, f32) {
        let mut max = self.evaluate(0.0).max(self.evaluate(1.0));
        let mut min = self.evaluate(0.0).min(self.evaluate(1.0));
        for s in self.extrema_parameters().as_slice() {
            let v = self.evaluate(*s);
            max = max.max(v);
            min = min.min(v);
        }
        (max, min)
    }
}

fn solve_quadratic_or_lower(a: f64, b: f64, c: f64) -> Roots {
    let scale = a.abs().max(b.abs()).max(c.abs());
    if scale == 0.0 {
        return Roots::default();
    }
    if a.abs() > scale * DEGREE_EPS {
        return solve_quadratic(a, b, c);
    }
    let mut roots = Roots::default();
    if b.abs() > scale * DEGREE_EPS {
        roots.push(-c / b);
    }
    roots
}

fn solve_quadratic(a: f64, b: f64, c: f64) -> Roots {
    let mut roots = Roots::default();
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return roots;
    }
    if disc == 0.0 {
        roots.push(-b / (2.0 * a));
        return roots;
    }
    // Numerically stable form: avoid cancellation between -b and sqrt(disc).
    let sq = disc.sqrt();
    let q = -0.5 * (b + b.signum() * sq);
    if q == 0.0 {
        // b == 0 and c == 0 collapse here; disc > 0 rules that out, but guard anyway.
        roots.push(0.0);
        return roots;
    }
    roots.push(q / a);
    roots.push(c / q);
    roots.sorted()
}

fn solve_cubic(a: f64, b: f64, c: f64, d: f64) -> Roots {
    let mut roots = Roots::default();
    let aa = b / a;
    let bb = c / a;
    let cc = d / a;

    let q = (3.0 * bb - aa * aa) / 9.0;
    let r = (9.0 * aa * bb - 27.0 * cc - 2.0 * aa * aa * aa) / 54.0;
    let disc = q * q * q + r * r;
    let shift = aa / 3.0;

    if disc > 0.0 || q >= 0.0 {
        // One real root (or a triple root when q == r == 0).
        let sq = disc.max(0.0).sqrt();
        let s = (r + sq).cbrt();
        let t = (r - sq).cbrt();
        roots.push(s + t - shift);
    } else {
        // Three real roots.
        let rho = (-q * q * q).sqrt();
        let theta = (r / rho).clamp(-1.0, 1.0).acos();
        let m = 2.0 * (-q).sqrt();
        for k in 0..3 {
            roots.push(m * ((theta + 2.0 * PI * k as f64) / 3.0).cos() - shift);
        }
    }
    roots.sorted()
}
