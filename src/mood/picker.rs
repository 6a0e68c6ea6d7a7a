//! Uniform random artist selection with an injectable RNG.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Picks one artist uniformly at random from a candidate slice.
///
/// The RNG sits behind a `Mutex` so the picker can be shared by `&self`
/// from an async context.  Tests seed it with [`ArtistPicker::seeded`].
pub struct ArtistPicker {
    rng: Mutex<StdRng>,
}

impl ArtistPicker {
    /// A picker seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// A deterministic picker.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }

    /// One element of `candidates`, or `None` when it is empty.
    pub fn choose<'a>(&self, candidates: &'a [String]) -> Option<&'a str> {
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        candidates.choose(&mut *rng).map(String::as_str)
    }
}

impl Default for ArtistPicker {
    fn default() -> Self {
        Self::from_entropy()
    }
}
