use serde::{Deserialize, Serialize};

use crate::{
    error::CodecError,
    modulus::{smallest_product, PRIMES},
};

/// Tuning knobs shared by encoder and decoder.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Params {
    /// Number of moduli `k`.
    pub modulus_count: usize,
    /// Fingerprint quantization levels `Q`.
    pub levels: u32,
    /// Symbol width in bits.
    pub chunk_bits: u32,
}

impl Params {
    pub const DEFAULT: Self = Self {
        modulus_count: 32,
        levels: 64,
        chunk_bits: 16,
    };

    /// Smallest configuration that still covers 16-bit symbols for any key.
    pub const TOY: Self = Self {
        modulus_count: 7,
        levels: 64,
        chunk_bits: 16,
    };

    /// Rejects configurations the codec cannot round-trip.
    ///
    /// Besides range checks this requires the product of the `k` smallest
    /// table primes to exceed `2^chunk_bits - 1`, so every key-derived modulus
    /// set can represent every symbol.
    pub fn validate(&self) -> Result<(), CodecError> {
        if self.modulus_count == 0 || self.modulus_count > PRIMES.len() {
            return Err(CodecError::InvalidParameters {
                reason: format!(
                    "modulus count must be within 1..={}, got {}",
                    PRIMES.len(),
                    self.modulus_count
                ),
            });
        }
        if !(2..=256).contains(&self.levels) {
            return Err(CodecError::InvalidParameters {
                reason: format!("levels must be within 2..=256, got {}", self.levels),
            });
        }
        if !(1..=32).contains(&self.chunk_bits) {
            return Err(CodecError::InvalidParameters {
                reason: format!("chunk bits must be within 1..=32, got {}", self.chunk_bits),
            });
        }
        let max_symbol = (1u64 << self.chunk_bits) - 1;
        if smallest_product(self.modulus_count) <= max_symbol {
            return Err(CodecError::InsufficientModulusRange {
                modulus_count: self.modulus_count,
                chunk_bits: self.chunk_bits,
            });
        }
        Ok(())
    }
}

impl Default for Params {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use crate::error::CodecError;

    use super::Params;

    #[test]
    fn presets_are_valid() {
        assert!(Params::default().validate().is_ok());
        assert!(Params::TOY.validate().is_ok());
        assert_eq!(Params::default().modulus_count, 32);
        assert_eq!(Params::default().levels, 64);
        assert_eq!(Params::default().chunk_bits, 16);
    }

    #[test]
    fn too_few_moduli_for_symbol_width() {
        let params = Params {
            modulus_count: 6,
            ..Params::default()
        };
        assert!(matches!(
            params.validate(),
            Err(CodecError::InsufficientModulusRange {
                modulus_count: 6,
                chunk_bits: 16
            })
        ));

        // 2·3·5 = 30 covers every 4-bit symbol
        let params = Params {
            modulus_count: 3,
            chunk_bits: 4,
            ..Params::default()
        };
        assert!(params.validate().is_ok());
    }

    #[test]
    fn thirty_two_bit_symbols_need_ten_moduli() {
        let mut params = Params {
            chunk_bits: 32,
            ..Params::default()
        };
        params.modulus_count = 9;
        assert!(params.validate().is_err());
        params.modulus_count = 10;
        assert!(params.validate().is_ok());
    }

    #[test]
    fn out_of_range_values() {
        for params in [
            Params {
                modulus_count: 0,
                ..Params::default()
            },
            Params {
                modulus_count: 63,
                ..Params::default()
            },
            Params {
                levels: 1,
                ..Params::default()
            },
            Params {
                levels: 257,
                ..Params::default()
            },
            Params {
                chunk_bits: 0,
                ..Params::default()
            },
            Params {
                chunk_bits: 33,
                ..Params::default()
            },
        ] {
            assert!(params.validate().is_err(), "{:?}", params);
        }
    }
}
