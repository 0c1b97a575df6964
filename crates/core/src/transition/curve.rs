use std::f64::consts::TAU;

/// Critically damped spring, normalized to a fixed duration.
///
/// `sample(t)` maps normalized time `t` in `[0, 1]` to progress in
/// `[0, 1]`. The raw spring `1 - (1 + wt)e^(-wt)` only approaches 1, so it
/// is rescaled to land exactly on 1 at `t = 1`: the final frame is the
/// destination, with no residual snap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnappyCurve {
    /// Angular frequency in normalized time units.
    omega: f64,
}

impl SnappyCurve {
    /// Response equal to the leg duration, no bounce.
    pub fn new() -> Self {
        Self { omega: TAU }
    }

    fn raw(&self, t: f64) -> f64 {
        let wt = self.omega * t;
        1.0 - (1.0 + wt) * (-wt).exp()
    }

    pub fn sample(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        (self.raw(t) / self.raw(1.0)).clamp(0.0, 1.0)
    }
}

impl Default for SnappyCurve {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_exact() {
        let curve = SnappyCurve::new();
        assert_eq!(curve.sample(0.0), 0.0);
        assert!((curve.sample(1.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn clamps_out_of_range_time() {
        let curve = SnappyCurve::new();
        assert_eq!(curve.sample(-1.0), 0.0);
        assert!((curve.sample(2.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn monotonic_without_overshoot() {
        let curve = SnappyCurve::new();
        let mut prev = 0.0;
        for i in 0..=100 {
            let v = curve.sample(f64::from(i) / 100.0);
            assert!(v >= prev, "curve must not move backwards at step {i}");
            assert!(v <= 1.0, "critically damped curve must not overshoot");
            prev = v;
        }
    }

    #[test]
    fn front_loaded() {
        // Snappy: most of the distance is covered in the first half.
        assert!(SnappyCurve::new().sample(0.5) > 0.75);
    }
}
