use std::{collections::BTreeMap, f64::consts::TAU};

use serde::{Deserialize, Serialize};

use super::{wrap_angle, PhaseRecipe};

/// Per-modulus residues, keyed by modulus.
pub type ResidueTable = BTreeMap<u32, Vec<u32>>;

/// Per-modulus phase angles in `[0, 2π)`, keyed by modulus.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct PhaseTable(pub BTreeMap<u32, Vec<f64>>);

impl PhaseTable {
    pub fn get(&self, modulus: u32) -> Option<&[f64]> {
        self.0.get(&modulus).map(Vec::as_slice)
    }

    pub fn insert(&mut self, modulus: u32, angles: Vec<f64>) -> Option<Vec<f64>> {
        self.0.insert(modulus, angles)
    }

    pub fn remove(&mut self, modulus: u32) -> Option<Vec<f64>> {
        self.0.remove(&modulus)
    }

    pub fn moduli(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub fn residue_to_angle(residue: u32, modulus: u32, offset: f64) -> f64 {
    wrap_angle(TAU * (residue as f64 / modulus as f64) + offset)
}

/// Maps every symbol to its residue and phase under each modulus.
pub fn encode_phases(
    symbols: &[u32],
    moduli: &[u32],
    recipe: &PhaseRecipe,
) -> (ResidueTable, PhaseTable) {
    let mut residues = ResidueTable::new();
    let mut phases = PhaseTable::default();
    for &modulus in moduli {
        let column: Vec<u32> = symbols.iter().map(|symbol| symbol % modulus).collect();
        let angles = column
            .iter()
            .enumerate()
            .map(|(index, &residue)| {
                residue_to_angle(residue, modulus, recipe.offset(modulus, index))
            })
            .collect();
        residues.insert(modulus, column);
        phases.insert(modulus, angles);
    }
    (residues, phases)
}
