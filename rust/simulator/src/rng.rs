//! Deterministic RNG for data generation.
//!
//! Every draw in the simulator goes through an explicit [`SimRng`] handle;
//! there is no global random state.

use ndarray::Array3;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

use crate::error::{SimError, SimResult};

/// Seeded RNG for simulation runs.
#[derive(Debug, Clone)]
pub struct SimRng {
    inner: ChaCha8Rng,
}

impl SimRng {
    /// Create a new RNG from a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Create an RNG seeded from OS entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            inner: ChaCha8Rng::from_entropy(),
        }
    }

    /// Derive a child RNG from the current stream.
    ///
    /// Subgroups each get a child so their draws do not shift one another.
    #[must_use]
    pub fn fork(&mut self) -> Self {
        let seed = self.inner.next_u64();
        Self::new(seed)
    }

    /// Draw a tensor of i.i.d. `N(0, scale)` values.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Configuration`] if `scale` is negative or not finite.
    pub fn normal_tensor(
        &mut self,
        scale: f64,
        shape: (usize, usize, usize),
    ) -> SimResult<Array3<f64>> {
        if !(scale.is_finite() && scale >= 0.0) {
            return Err(SimError::Configuration(format!(
                "invalid noise scale {scale}: expected a finite number >= 0"
            )));
        }
        let normal = Normal::new(0.0, scale).map_err(|e| {
            SimError::Configuration(format!("invalid noise scale {scale}: {e}"))
        })?;
        Ok(Array3::from_shape_simple_fn(shape, || {
            normal.sample(&mut self.inner)
        }))
    }
}

impl RngCore for SimRng {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.inner.try_fill_bytes(dest)
    }
}
