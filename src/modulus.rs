use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::CodecError;

/// The first 62 primes. Every modulus set is drawn from this table.
pub const PRIMES: [u32; 62] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
    101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191, 193,
    197, 199, 211, 223, 227, 229, 233, 239, 241, 251, 257, 263, 269, 271, 277, 281, 283, 293,
];

// xorshift32 never leaves zero.
const ZERO_SEED_REPLACEMENT: u32 = 0x9e37_79b9;

/// Ascending list of distinct primes drawn from [`PRIMES`].
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct ModulusSet(Vec<u32>);

impl ModulusSet {
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }

    pub fn into_vec(self) -> Vec<u32> {
        self.0
    }
}

impl AsRef<[u32]> for ModulusSet {
    fn as_ref(&self) -> &[u32] {
        &self.0
    }
}

pub struct Xorshift32 {
    state: u32,
}

impl Xorshift32 {
    pub fn new(seed: u32) -> Self {
        let state = if seed == 0 {
            ZERO_SEED_REPLACEMENT
        } else {
            seed
        };
        Self { state }
    }

    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }
}

/// Folds the first 16 bytes of `SHA-256(key)` into a 32-bit seed by XORing
/// four little-endian words.
pub fn seed_from_key(key: &[u8]) -> u32 {
    let digest = Sha256::digest(key);
    digest[..16]
        .chunks_exact(4)
        .map(|word| u32::from_le_bytes([word[0], word[1], word[2], word[3]]))
        .fold(0, |acc, word| acc ^ word)
}

/// Deterministically selects `count` distinct primes for `key`.
pub fn select_moduli(key: &[u8], count: usize) -> Result<ModulusSet, CodecError> {
    if count == 0 || count > PRIMES.len() {
        return Err(CodecError::InvalidParameters {
            reason: format!(
                "modulus count must be within 1..={}, got {}",
                PRIMES.len(),
                count
            ),
        });
    }

    let mut rng = Xorshift32::new(seed_from_key(key));
    let mut taken = [false; PRIMES.len()];
    let mut moduli = Vec::with_capacity(count);
    while moduli.len() < count {
        let index = rng.next_u32() as usize % PRIMES.len();
        if !taken[index] {
            taken[index] = true;
            moduli.push(PRIMES[index]);
        }
    }
    moduli.sort_unstable();
    Ok(ModulusSet(moduli))
}

/// Product of the `count` smallest table primes, saturating at `u64::MAX`.
/// This lower-bounds the product of any modulus set of that size.
pub fn smallest_product(count: usize) -> u64 {
    PRIMES
        .iter()
        .take(count)
        .try_fold(1u64, |acc, &p| acc.checked_mul(p as u64))
        .unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::RngCore;

    use super::{seed_from_key, select_moduli, smallest_product, Xorshift32, PRIMES};

    #[test]
    fn prime_table_is_ascending_and_prime() {
        for window in PRIMES.windows(2) {
            assert!(window[0] < window[1]);
        }
        for p in PRIMES {
            assert!((2..p).take_while(|d| d * d <= p).all(|d| p % d != 0));
        }
        assert_eq!(PRIMES[PRIMES.len() - 1], 293);
    }

    #[test]
    fn selection_is_deterministic() {
        let lhs = select_moduli(b"space:42", 32).unwrap();
        let rhs = select_moduli(b"space:42", 32).unwrap();
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn selection_is_sorted_and_distinct() {
        let mut rng = rand::thread_rng();
        for count in [1, 3, 16, 32, 62] {
            let mut key = [0u8; 16];
            rng.fill_bytes(&mut key);
            let moduli = select_moduli(&key, count).unwrap();
            assert_eq!(moduli.len(), count);
            assert!(moduli.as_slice().windows(2).all(|w| w[0] < w[1]));
            let distinct: HashSet<_> = moduli.iter().collect();
            assert_eq!(distinct.len(), count);
            assert!(moduli.iter().all(|p| PRIMES.contains(&p)));
        }
    }

    #[test]
    fn full_table_selection_returns_every_prime() {
        let moduli = select_moduli(b"everything", PRIMES.len()).unwrap();
        assert_eq!(moduli.as_slice(), &PRIMES[..]);
    }

    #[test]
    fn different_keys_usually_differ() {
        let lhs = select_moduli(b"file:a", 32).unwrap();
        let rhs = select_moduli(b"file:b", 32).unwrap();
        assert_ne!(lhs, rhs);
    }

    #[test]
    fn rejects_out_of_range_counts() {
        assert!(select_moduli(b"key", 0).is_err());
        assert!(select_moduli(b"key", PRIMES.len() + 1).is_err());
    }

    #[test]
    fn seed_folds_digest_as_little_endian_words() {
        assert_eq!(seed_from_key(b"space:42"), 0x17f9_98bb);
        assert_eq!(seed_from_key(b"k"), 0x0658_0d91);
        assert_eq!(
            select_moduli(b"space:42", 7).unwrap().as_slice(),
            &[5, 11, 139, 149, 181, 197, 199]
        );
        assert_eq!(
            select_moduli(b"k", 7).unwrap().as_slice(),
            &[2, 79, 107, 127, 157, 211, 271]
        );
    }

    #[test]
    fn xorshift_matches_reference_sequence() {
        let mut rng = Xorshift32::new(1);
        assert_eq!(rng.next_u32(), 270_369);
        assert_eq!(rng.next_u32(), 67_634_689);
    }

    #[test]
    fn xorshift_never_sticks_at_zero() {
        let mut rng = Xorshift32::new(0);
        assert_ne!(rng.next_u32(), 0);
    }

    #[test]
    fn smallest_product_bounds() {
        assert_eq!(smallest_product(3), 30);
        assert_eq!(smallest_product(7), 510_510);
        assert_eq!(smallest_product(62), u64::MAX);
    }
}
