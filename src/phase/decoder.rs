use std::f64::consts::TAU;

use crate::{error::CodecError, fingerprint::coarse_residue};

use super::{
    encoder::{PhaseTable, ResidueTable},
    wrap_angle, PhaseRecipe,
};

/// Source of per-modulus phase sequences for decoding.
pub trait PhaseProvider {
    fn phases(&self, modulus: u32) -> Option<Vec<f64>>;
}

impl PhaseProvider for PhaseTable {
    fn phases(&self, modulus: u32) -> Option<Vec<f64>> {
        self.get(modulus).map(<[f64]>::to_vec)
    }
}

impl<F> PhaseProvider for F
where
    F: Fn(u32) -> Option<Vec<f64>>,
{
    fn phases(&self, modulus: u32) -> Option<Vec<f64>> {
        self(modulus)
    }
}

/// Collects the phases for every modulus, failing on the first one missing.
pub fn gather_phases(
    moduli: &[u32],
    provider: &impl PhaseProvider,
) -> Result<PhaseTable, CodecError> {
    let mut table = PhaseTable::default();
    let mut symbol_count = None;
    for &modulus in moduli {
        let angles = provider
            .phases(modulus)
            .ok_or(CodecError::MissingPhases { modulus })?;
        let expected = *symbol_count.get_or_insert(angles.len());
        if angles.len() != expected {
            return Err(CodecError::PhaseLengthMismatch {
                modulus,
                expected,
                actual: angles.len(),
            });
        }
        table.insert(modulus, angles);
    }
    Ok(table)
}

pub fn angle_to_residue(angle: f64, modulus: u32, offset: f64) -> u32 {
    let unrotated = wrap_angle(angle - offset);
    let scaled = (unrotated * modulus as f64 / TAU).round() as u64;
    (scaled % modulus as u64) as u32
}

/// Recovers exact residues from `phases` and scores them against the coarse
/// guess implied by `fingerprint`.
///
/// The alignment is the fraction of `(modulus, symbol)` pairs where the
/// guess matches; with no symbols it is 1.
pub fn decode_residues(
    moduli: &[u32],
    fingerprint: &[u8],
    phases: &PhaseTable,
    recipe: &PhaseRecipe,
    levels: u32,
) -> Result<(ResidueTable, f64), CodecError> {
    let mut residues = ResidueTable::new();
    let mut matches = 0usize;
    let mut total = 0usize;

    for (position, &modulus) in moduli.iter().enumerate() {
        let angles = phases
            .get(modulus)
            .ok_or(CodecError::MissingPhases { modulus })?;
        let guess = fingerprint
            .get(position)
            .map(|&level| coarse_residue(level, modulus, levels));

        let column: Vec<u32> = angles
            .iter()
            .enumerate()
            .map(|(index, &angle)| angle_to_residue(angle, modulus, recipe.offset(modulus, index)))
            .collect();

        matches += column.iter().filter(|&&r| Some(r) == guess).count();
        total += column.len();
        residues.insert(modulus, column);
    }

    let alignment = if total == 0 {
        1.0
    } else {
        matches as f64 / total as f64
    };
    Ok((residues, alignment))
}
