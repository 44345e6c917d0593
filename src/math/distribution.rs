use rand::Rng;
use std::f32::consts::PI;

/// A source of uniform samples in `[0, 1)`.
///
/// Every `rand::Rng` is a `UniformSource`, so a seeded `StdRng` gives
/// reproducible initialisation and `rand::thread_rng()` keeps the source
/// confined to the calling thread.
pub trait UniformSource {
    fn next_float(&mut self) -> f32;
}

impl<R: Rng + ?Sized> UniformSource for R {
    fn next_float(&mut self) -> f32 {
        self.gen::<f32>()
    }
}

/// Samples a single value from N(mu, sigma) using the Box-Muller transform.
///
/// Consumes exactly two draws from `source`: `alpha` for the radius and
/// `beta` for the angle. `sigma` is not checked; a negative value mirrors the
/// distribution around `mu`.
///
/// If `alpha` comes out as exactly `0.0`, `ln(alpha)` is `-inf` and the result
/// is `±inf` (or NaN when the sine term is also zero). The degenerate draw is
/// passed through unchanged rather than clamped.
pub fn sample_normal<S: UniformSource + ?Sized>(source: &mut S, mu: f32, sigma: f32) -> f32 {
    let alpha = source.next_float();
    let beta = source.next_float();
    sigma * (-2.0 * alpha.ln()).sqrt() * (2.0 * PI * beta).sin() + mu
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Replays a fixed list of uniform draws.
    struct Replay {
        draws: Vec<f32>,
        next: usize,
    }

    impl Replay {
        fn new(draws: Vec<f32>) -> Replay {
            Replay { draws, next: 0 }
        }
    }

    impl UniformSource for Replay {
        fn next_float(&mut self) -> f32 {
            let v = self.draws[self.next];
            self.next += 1;
            v
        }
    }

    #[test]
    fn follows_box_muller_formula() {
        let mut src = Replay::new(vec![0.5, 0.25]);
        let z = sample_normal(&mut src, 1.0, 2.0);
        // sin(pi / 2) == 1
        let expected = 2.0 * (-2.0 * 0.5f32.ln()).sqrt() + 1.0;
        assert!((z - expected).abs() < 1e-5, "{z} != {expected}");
        assert_eq!(src.next, 2);
    }

    #[test]
    fn zero_angle_returns_mean() {
        let mut src = Replay::new(vec![0.3, 0.0]);
        assert_eq!(sample_normal(&mut src, 4.5, 3.0), 4.5);
    }

    #[test]
    fn zero_alpha_is_not_clamped() {
        let mut src = Replay::new(vec![0.0, 0.25]);
        let z = sample_normal(&mut src, 0.0, 1.0);
        assert!(z.is_infinite());
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        for _ in 0..16 {
            assert_eq!(sample_normal(&mut a, 0.0, 1.0), sample_normal(&mut b, 0.0, 1.0));
        }
    }

    #[test]
    fn uniform_draws_stay_in_unit_interval() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1000 {
            let u = rng.next_float();
            assert!((0.0..1.0).contains(&u));
        }
    }
}
