use crate::phase::encoder::ResidueTable;

/// Quantizes the mean residue of every modulus into `levels` buckets.
///
/// The result is one byte per modulus, in the order of `moduli`. A modulus
/// with no residues (empty payload) quantizes to level 0.
pub fn quantize(residues: &ResidueTable, moduli: &[u32], levels: u32) -> Vec<u8> {
    let top = levels.saturating_sub(1) as f64;
    moduli
        .iter()
        .map(|modulus| {
            let column = residues.get(modulus).map(Vec::as_slice).unwrap_or(&[]);
            if column.is_empty() {
                return 0;
            }
            let sum: u64 = column.iter().map(|&r| r as u64).sum();
            let mean = sum as f64 / column.len() as f64;
            let level = (mean * top / *modulus as f64).round();
            level.clamp(0.0, top) as u8
        })
        .collect()
}

/// The single residue a fingerprint level stands for: `round(level/(Q-1) * p)`.
pub fn coarse_residue(level: u8, modulus: u32, levels: u32) -> u32 {
    let top = levels.saturating_sub(1).max(1) as f64;
    (level as f64 / top * modulus as f64).round() as u32
}

#[cfg(test)]
mod tests {
    use crate::phase::encoder::ResidueTable;

    use super::{coarse_residue, quantize};

    #[test]
    fn empty_table_quantizes_to_zero() {
        let residues: ResidueTable = [(2, vec![]), (3, vec![])].into_iter().collect();
        assert_eq!(quantize(&residues, &[2, 3], 64), vec![0, 0]);
        assert_eq!(quantize(&ResidueTable::new(), &[2, 3, 5], 64), vec![0, 0, 0]);
    }

    #[test]
    fn mean_is_rescaled_and_rounded() {
        // mean 3.5 on modulus 7 sits at the middle of the scale
        let residues: ResidueTable = [(7, vec![3, 4]), (13, vec![0, 6, 1, 5, 2, 4])]
            .into_iter()
            .collect();
        assert_eq!(quantize(&residues, &[7, 13], 64), vec![32, 15]);
    }

    #[test]
    fn levels_stay_within_scale() {
        let residues: ResidueTable = [(293, vec![292; 10]), (2, vec![1; 10])]
            .into_iter()
            .collect();
        let fingerprint = quantize(&residues, &[2, 293], 64);
        assert!(fingerprint.iter().all(|&level| level < 64));
        assert_eq!(fingerprint[0], 32);
        assert_eq!(fingerprint[1], 63);
    }

    #[test]
    fn fingerprint_follows_modulus_order() {
        let residues: ResidueTable = [(5, vec![4]), (11, vec![0])].into_iter().collect();
        assert_eq!(quantize(&residues, &[5, 11], 64), vec![50, 0]);
        assert_eq!(quantize(&residues, &[11, 5], 64), vec![0, 50]);
    }

    #[test]
    fn coarse_residue_inverts_quantization_scale() {
        assert_eq!(coarse_residue(0, 97, 64), 0);
        assert_eq!(coarse_residue(63, 97, 64), 97);
        assert_eq!(coarse_residue(32, 7, 64), 4);
    }
}
