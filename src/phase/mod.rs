pub mod decoder;
pub mod encoder;

use std::{collections::BTreeMap, f64::consts::TAU};

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::CodecError;

type HmacSha256 = Hmac<Sha256>;

const GOLDEN_RATIO: f64 = 1.618_033_988_749_895;
const SILVER_RATIO: f64 = 2.414_213_562_373_095;

/// Symbol indices are fed to the MAC as two big-endian bytes, so keyed
/// recipes address at most this many symbols.
pub const MAX_SYMBOLS: usize = u16::MAX as usize + 1;

/// The two fixed irrational rotations applied to every phase.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RotationOffsets {
    /// `2π/φ`
    pub phi: f64,
    /// `2π/δ_S`, `δ_S = 1 + √2`
    pub silver: f64,
}

pub fn rotation_offsets() -> RotationOffsets {
    RotationOffsets {
        phi: TAU / GOLDEN_RATIO,
        silver: TAU / SILVER_RATIO,
    }
}

/// Reduces `angle` into `[0, 2π)`.
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs.
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Everything needed to map residues to angles and back.
///
/// A recipe is a pure function of `(moduli, n, phase_key)` and is recomputed
/// on both sides rather than transmitted.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PhaseRecipe {
    pub phi_offset: f64,
    pub silver_offset: f64,
    pub secret_phase: BTreeMap<u32, Vec<f64>>,
}

impl PhaseRecipe {
    pub fn derive(
        moduli: &[u32],
        symbol_count: usize,
        phase_key: Option<&[u8]>,
    ) -> Result<Self, CodecError> {
        if phase_key.is_some() && symbol_count > MAX_SYMBOLS {
            return Err(CodecError::PayloadTooLarge {
                symbols: symbol_count,
                max: MAX_SYMBOLS,
            });
        }

        let mut secret_phase = BTreeMap::new();
        for &modulus in moduli {
            let angles = match phase_key {
                Some(key) => {
                    let mac = HmacSha256::new_from_slice(key).map_err(|_| {
                        CodecError::InvalidParameters {
                            reason: "phase key rejected by HMAC".into(),
                        }
                    })?;
                    (0..symbol_count)
                        .map(|index| secret_angle(mac.clone(), modulus, index as u16))
                        .collect()
                }
                None => vec![0.0; symbol_count],
            };
            secret_phase.insert(modulus, angles);
        }

        let offsets = rotation_offsets();
        Ok(Self {
            phi_offset: offsets.phi,
            silver_offset: offsets.silver,
            secret_phase,
        })
    }

    /// Total rotation applied to symbol `index` on `modulus`.
    ///
    /// Moduli or indices outside the recipe contribute no secret phase.
    pub fn offset(&self, modulus: u32, index: usize) -> f64 {
        let secret = self
            .secret_phase
            .get(&modulus)
            .and_then(|angles| angles.get(index))
            .copied()
            .unwrap_or(0.0);
        self.phi_offset + self.silver_offset + secret
    }

    pub fn symbol_count(&self) -> usize {
        self.secret_phase.values().next().map_or(0, Vec::len)
    }
}

fn secret_angle(mut mac: HmacSha256, modulus: u32, index: u16) -> f64 {
    mac.update(&modulus.to_be_bytes());
    mac.update(&index.to_be_bytes());
    let tag = mac.finalize().into_bytes();
    let head = u16::from_be_bytes([tag[0], tag[1]]);
    head as f64 / 65536.0 * TAU
}

#[cfg(test)]
mod tests {
    use std::f64::consts::TAU;

    use crate::error::CodecError;

    use super::{rotation_offsets, wrap_angle, PhaseRecipe, MAX_SYMBOLS};

    #[test]
    fn offsets_are_fixed_irrational_rotations() {
        let offsets = rotation_offsets();
        assert!((offsets.phi - TAU * (5f64.sqrt() - 1.0) / 2.0).abs() < 1e-12);
        assert!((offsets.silver - TAU * (2f64.sqrt() - 1.0)).abs() < 1e-12);
        assert_eq!(offsets, rotation_offsets());
    }

    #[test]
    fn keyless_recipe_has_zero_secret_phase() {
        let recipe = PhaseRecipe::derive(&[2, 3, 5], 4, None).unwrap();
        assert_eq!(recipe.secret_phase.len(), 3);
        assert!(recipe
            .secret_phase
            .values()
            .all(|angles| angles.len() == 4 && angles.iter().all(|&a| a == 0.0)));
    }

    #[test]
    fn keyed_recipe_is_deterministic_and_in_range() {
        let lhs = PhaseRecipe::derive(&[7, 11, 13], 32, Some(b"phase key")).unwrap();
        let rhs = PhaseRecipe::derive(&[7, 11, 13], 32, Some(b"phase key")).unwrap();
        assert_eq!(lhs, rhs);
        for angles in lhs.secret_phase.values() {
            assert!(angles.iter().all(|&a| (0.0..TAU).contains(&a)));
        }
        assert!(lhs.secret_phase[&7].iter().any(|&a| a != 0.0));
    }

    #[test]
    fn recipe_depends_on_key() {
        let lhs = PhaseRecipe::derive(&[7, 11, 13], 32, Some(b"alice")).unwrap();
        let rhs = PhaseRecipe::derive(&[7, 11, 13], 32, Some(b"bob")).unwrap();
        assert_ne!(lhs.secret_phase, rhs.secret_phase);
    }

    #[test]
    fn recipe_prefix_is_stable_across_lengths() {
        let short = PhaseRecipe::derive(&[17], 8, Some(b"k")).unwrap();
        let long = PhaseRecipe::derive(&[17], 16, Some(b"k")).unwrap();
        assert_eq!(short.secret_phase[&17][..], long.secret_phase[&17][..8]);
        assert_eq!(long.symbol_count(), 16);
    }

    #[test]
    fn keyed_recipe_rejects_unaddressable_symbol_counts() {
        assert!(PhaseRecipe::derive(&[2], MAX_SYMBOLS, Some(b"k")).is_ok());
        assert!(matches!(
            PhaseRecipe::derive(&[2], MAX_SYMBOLS + 1, Some(b"k")),
            Err(CodecError::PayloadTooLarge {
                symbols,
                max: MAX_SYMBOLS
            }) if symbols == MAX_SYMBOLS + 1
        ));
    }

    #[test]
    fn keyless_recipe_has_no_symbol_limit() {
        let recipe = PhaseRecipe::derive(&[2, 3], MAX_SYMBOLS + 1, None).unwrap();
        assert_eq!(recipe.symbol_count(), MAX_SYMBOLS + 1);
    }

    #[test]
    fn wrap_angle_stays_in_range() {
        assert_eq!(wrap_angle(0.0), 0.0);
        assert!((wrap_angle(TAU + 1.0) - 1.0).abs() < 1e-12);
        assert!((wrap_angle(-1.0) - (TAU - 1.0)).abs() < 1e-12);
        let tiny = wrap_angle(-1e-300);
        assert!((0.0..TAU).contains(&tiny));
    }
}
