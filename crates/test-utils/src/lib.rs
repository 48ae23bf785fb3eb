//! Generic `Arbitrary` generator for tests across the Accord workspace.

use arbitrary::{Arbitrary, Unstructured};
use rand_core::{OsRng, RngCore};

/// Default entropy buffer size.  Large enough for any type we generate.
const ARB_GEN_LEN: usize = 65_536;

/// Draws arbitrary values from OS randomness over a persistent buffer.
#[derive(Debug)]
pub struct ArbitraryGenerator {
    buf: Vec<u8>,
}

impl Default for ArbitraryGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ArbitraryGenerator {
    pub fn new() -> Self {
        Self::new_with_size(ARB_GEN_LEN)
    }

    pub fn new_with_size(s: usize) -> Self {
        Self { buf: vec![0u8; s] }
    }

    /// Generates an arbitrary instance of `T`.
    ///
    /// # Panics
    ///
    /// Panics if `T` repeatedly fails to build from fresh entropy, which
    /// for the types in this workspace indicates a bug in an `Arbitrary`
    /// impl rather than bad luck.
    pub fn generate<T>(&mut self) -> T
    where
        T: for<'a> Arbitrary<'a>,
    {
        const MAX_ATTEMPTS: usize = 16;

        let mut last_err = None;
        for _ in 0..MAX_ATTEMPTS {
            OsRng.fill_bytes(&mut self.buf);
            let mut u = Unstructured::new(&self.buf);
            match T::arbitrary(&mut u) {
                Ok(v) => return v,
                Err(e) => last_err = Some(e),
            }
        }

        panic!(
            "test-utils: failed to generate arbitrary instance: {}",
            last_err.expect("at least one attempt ran")
        );
    }
}
