//! # Gradient Noise Implementation
//!
//! Deterministic 2D lattice gradient noise for cloud tiles.
//!
//! ## Why only four gradients?
//!
//! The lattice hash is reduced to two bits, selecting one of the diagonals
//! (1,1), (-1,1), (1,-1), (-1,-1). The tiles are 32x16 pixels, so a full
//! gradient table buys nothing visible, and the reduced set keeps existing
//! tiles bit-for-bit stable.
//!
//! ## Determinism Guarantee
//!
//! Given the same `NoiseSeed`, this implementation will produce
//! **exactly** the same table on any platform, any time. The shuffle is
//! driven by ChaCha8 and only ever draws `u32` ranges, so pointer width
//! never leaks into the sequence.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::{CloudError, CloudResult};

/// Number of distinct lattice hashes.
pub const PERMUTATION_SIZE: usize = 256;

/// Period of the noise field along each axis.
pub const NOISE_PERIOD: f64 = 256.0;

/// Seed for deterministic table construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NoiseSeed(u64);

impl NoiseSeed {
    /// Creates a new noise seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Returns the raw seed value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl Default for NoiseSeed {
    fn default() -> Self {
        Self(1337)
    }
}

impl From<u64> for NoiseSeed {
    fn from(seed: u64) -> Self {
        Self(seed)
    }
}

/// Pre-computed permutation table for noise.
///
/// 512 entries: a shuffled copy of `0..=255` followed by the same 256 values
/// again, so `perm[perm[xi + 1] + yi + 1]` never needs a wrap.
#[derive(Clone, PartialEq, Eq)]
pub struct PermutationTable {
    perm: [u8; PERMUTATION_SIZE * 2],
}

impl PermutationTable {
    /// Creates a new permutation table from a seed.
    #[must_use]
    pub fn new(seed: NoiseSeed) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed.value());
        Self::from_rng(&mut rng)
    }

    /// Creates a permutation table by drawing from a caller-provided source.
    ///
    /// Values are pulled without replacement: each draw picks a uniform index
    /// into the values still remaining and removes it.
    #[must_use]
    pub fn from_rng<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut remaining: Vec<u8> = (0..=255).collect();
        let mut perm = [0u8; PERMUTATION_SIZE * 2];

        for slot in perm.iter_mut().take(PERMUTATION_SIZE) {
            // `remaining` holds at most 256 entries, so the cast is lossless.
            #[allow(clippy::cast_possible_truncation)]
            let upper = remaining.len() as u32;
            let index = rng.gen_range(0..upper) as usize;
            *slot = remaining.remove(index);
        }

        let (head, tail) = perm.split_at_mut(PERMUTATION_SIZE);
        tail.copy_from_slice(head);

        Self { perm }
    }

    /// Returns the full 512-entry table.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.perm
    }

    /// Hashes a lattice corner through both levels of the table.
    #[inline]
    fn hash(&self, xi: usize, yi: usize) -> u8 {
        self.perm[self.perm[xi] as usize + yi]
    }

    /// Samples 2D gradient noise at the given coordinates.
    ///
    /// # Returns
    ///
    /// A value in the range [0, 1]. Integer lattice points always return 0.5,
    /// and so do infinite or NaN coordinates, which have no lattice cell.
    #[must_use]
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        if !(x.is_finite() && y.is_finite()) {
            return 0.5;
        }

        let x_floor = x.floor();
        let y_floor = y.floor();

        let xi = lattice_index(x_floor);
        let yi = lattice_index(y_floor);
        let xf = x - x_floor;
        let yf = y - y_floor;

        let u = fade(xf);
        let v = fade(yf);

        let aa = self.hash(xi, yi);
        let ab = self.hash(xi, yi + 1);
        let ba = self.hash(xi + 1, yi);
        let bb = self.hash(xi + 1, yi + 1);

        let x1 = lerp(gradient(aa, xf, yf), gradient(ba, xf - 1.0, yf), u);
        let x2 = lerp(
            gradient(ab, xf, yf - 1.0),
            gradient(bb, xf - 1.0, yf - 1.0),
            u,
        );

        // Remap [-1, 1] to [0, 1]; clamp absorbs float noise at the extremes.
        ((lerp(x1, x2, v) + 1.0) * 0.5).clamp(0.0, 1.0)
    }
}

impl std::fmt::Debug for PermutationTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermutationTable")
            .field("head", &&self.perm[..8])
            .finish_non_exhaustive()
    }
}

/// Seeded 2D gradient noise source.
///
/// Starts without a table; [`NoiseEngine::init`] builds one. Sampling an
/// engine that was never initialized is an error, never a read of garbage.
///
/// # Example
///
/// ```rust
/// use cirrus_procedural::{NoiseEngine, NoiseSeed};
///
/// let mut engine = NoiseEngine::new();
/// assert!(engine.sample(0.5, 0.5).is_err());
///
/// engine.init(NoiseSeed::new(42));
/// let value = engine.sample(1.3, 2.7).unwrap();
/// assert!((0.0..=1.0).contains(&value));
/// ```
#[derive(Clone, Debug, Default)]
pub struct NoiseEngine {
    table: Option<PermutationTable>,
    seed: Option<NoiseSeed>,
}

impl NoiseEngine {
    /// Creates an engine with no permutation table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            table: None,
            seed: None,
        }
    }

    /// Creates an engine and initializes it from `seed`.
    #[must_use]
    pub fn with_seed(seed: NoiseSeed) -> Self {
        let mut engine = Self::new();
        engine.init(seed);
        engine
    }

    /// Builds a fresh permutation table from `seed`, replacing any previous one.
    pub fn init(&mut self, seed: NoiseSeed) {
        self.table = Some(PermutationTable::new(seed));
        self.seed = Some(seed);
        tracing::info!("noise engine initialized with seed {}", seed.value());
    }

    /// Installs a table built elsewhere, e.g. from a host-provided source.
    pub fn install(&mut self, table: PermutationTable) {
        self.table = Some(table);
        self.seed = None;
        tracing::info!("noise engine initialized from external table");
    }

    /// Returns true once a table is present.
    #[inline]
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.table.is_some()
    }

    /// Returns the seed the current table was built from, if any.
    #[inline]
    #[must_use]
    pub const fn seed(&self) -> Option<NoiseSeed> {
        self.seed
    }

    /// Returns the current permutation table.
    ///
    /// # Errors
    ///
    /// Returns `CloudError::Uninitialized` if `init` has not been called.
    pub fn table(&self) -> CloudResult<&PermutationTable> {
        self.table.as_ref().ok_or(CloudError::Uninitialized)
    }

    /// Samples noise at the given coordinates.
    ///
    /// # Errors
    ///
    /// Returns `CloudError::Uninitialized` if `init` has not been called and
    /// `CloudError::NonFiniteCoordinate` if either coordinate is infinite or NaN.
    pub fn sample(&self, x: f64, y: f64) -> CloudResult<f64> {
        let table = self.table()?;
        if !(x.is_finite() && y.is_finite()) {
            return Err(CloudError::NonFiniteCoordinate);
        }
        Ok(table.sample(x, y))
    }
}

/// Reduces a floored coordinate to its lattice cell in `0..256`.
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lattice_index(floored: f64) -> usize {
    // rem_euclid keeps the `& 255` semantics for negative and huge inputs.
    floored.rem_euclid(NOISE_PERIOD) as usize & (PERMUTATION_SIZE - 1)
}

/// Quintic fade curve: 6t^5 - 15t^4 + 10t^3.
#[inline]
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

/// Dot product of the local offset with one of four diagonal gradients.
#[inline]
fn gradient(hash: u8, x: f64, y: f64) -> f64 {
    match hash & 3 {
        0 => x + y,
        1 => -x + y,
        2 => x - y,
        _ => -x - y,
    }
}
