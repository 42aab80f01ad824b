use crate::harmonic::HarmonicScanner;
use crate::SignalGenerator;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Creates the default signal generator.
///
/// With a seed the scanner is fully reproducible; without one it is seeded from
/// operating-system entropy.
pub fn create_signal_generator(seed: Option<u64>) -> Box<dyn SignalGenerator> {
    let rng = match seed {
        Some(seed) => {
            tracing::debug!(seed, "Seeding harmonic scanner.");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };
    Box::new(HarmonicScanner::new(rng))
}
