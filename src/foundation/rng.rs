use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Deterministic random source for one augmentation call.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Independent stream for item `index` of a batch sharing `seed`.
pub fn rng_for(seed: u64, index: u64) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(index);
    rng
}

/// Fair coin flip.
#[inline]
pub(crate) fn coin<R: Rng + ?Sized>(rng: &mut R) -> bool {
    rng.random::<bool>()
}

/// `RngCore` wrapper that counts how many times the inner generator was called.
#[derive(Clone, Debug)]
pub struct CountingRng<R> {
    inner: R,
    draws: u64,
}

impl<R: RngCore> CountingRng<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, draws: 0 }
    }

    /// Number of `next_u32` / `next_u64` / `fill_bytes` calls so far.
    pub fn draws(&self) -> u64 {
        self.draws
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: RngCore> RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.draws += 1;
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws += 1;
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        self.draws += 1;
        self.inner.fill_bytes(dst);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/rng.rs"]
mod tests;
