use rand::{RngExt, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

/// Seed used when the caller doesn't pick one.
pub const DEFAULT_SEED: u64 = 1234;

/// A fresh generator per invocation, so runs with the same seed repeat exactly.
pub fn new(seed: u64) -> impl RngExt {
    Xoshiro256PlusPlus::seed_from_u64(seed)
}
