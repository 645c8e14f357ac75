use crypto_bigint::{Encoding, Limb, NonZero, Word, U512};

use crate::{chunk::chunk_bytes, error::CodecError, phase::encoder::ResidueTable};

/// Wide enough for the product of the whole prime table (< 2^400).
pub type Wide = U512;

fn rem_small(value: &Wide, modulus: u32) -> Result<u32, CodecError> {
    let divisor = Option::<NonZero<Limb>>::from(NonZero::new(Limb(modulus as Word)))
        .ok_or_else(|| CodecError::InvalidParameters {
            reason: "zero modulus".into(),
        })?;
    let (_, rem) = value.div_rem_limb(divisor);
    Ok(rem.0 as u32)
}

/// Inverse of `value` modulo `modulus`, if they are coprime.
pub fn inverse_mod(value: u32, modulus: u32) -> Option<u32> {
    let (mut old_r, mut r) = (value as i64 % modulus as i64, modulus as i64);
    let (mut old_s, mut s) = (1i64, 0i64);
    while r != 0 {
        let q = old_r / r;
        (old_r, r) = (r, old_r - q * r);
        (old_s, s) = (s, old_s - q * s);
    }
    if old_r != 1 {
        return None;
    }
    Some(old_s.rem_euclid(modulus as i64) as u32)
}

/// Combines `(residues[i], moduli[i])` pairs with Garner's algorithm into the
/// unique value in `[0, ∏ moduli)` congruent to every residue.
pub fn garner(residues: &[u32], moduli: &[u32]) -> Result<Wide, CodecError> {
    let mut value = Wide::ZERO;
    let mut product = Wide::ONE;
    let mut product_small = 1u64;

    for (&residue, &modulus) in residues.iter().zip(moduli) {
        let product_mod = rem_small(&product, modulus)?;
        let inverse = inverse_mod(product_mod, modulus).ok_or(CodecError::NotCoprime {
            lhs: product_small,
            rhs: modulus,
        })?;
        let value_mod = rem_small(&value, modulus)?;

        let diff = (residue % modulus + modulus - value_mod) % modulus;
        let correction = (diff as u64 * inverse as u64) % modulus as u64;

        value = value.wrapping_add(&product.wrapping_mul(&Wide::from_u64(correction)));
        product = product.wrapping_mul(&Wide::from_u32(modulus));
        product_small = product_small.saturating_mul(modulus as u64);
    }
    Ok(value)
}

/// Reassembles the payload bytes from exact per-modulus residues.
///
/// Every symbol becomes `chunk_bytes(chunk_bits)` big-endian bytes; values
/// wider than that are truncated to their low bytes.
pub fn reconstruct(
    moduli: &[u32],
    residues: &ResidueTable,
    chunk_bits: u32,
) -> Result<Vec<u8>, CodecError> {
    let columns = moduli
        .iter()
        .map(|&modulus| {
            residues
                .get(&modulus)
                .map(Vec::as_slice)
                .ok_or(CodecError::MissingPhases { modulus })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let symbol_count = columns.first().map_or(0, |column| column.len());

    let width = chunk_bytes(chunk_bits);
    let mut payload = Vec::with_capacity(symbol_count * width);
    let mut row = vec![0u32; moduli.len()];
    for index in 0..symbol_count {
        for (slot, column) in row.iter_mut().zip(&columns) {
            *slot = column.get(index).copied().unwrap_or(0);
        }
        let value = garner(&row, moduli)?;
        let bytes = value.to_be_bytes();
        payload.extend_from_slice(&bytes[bytes.len() - width..]);
    }
    Ok(payload)
}
