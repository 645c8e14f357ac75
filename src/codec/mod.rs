pub mod params;

use log::debug;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::{
    beacon::Beacon,
    chunk::chunk,
    crt::reconstruct,
    error::CodecError,
    fingerprint::quantize,
    modulus::select_moduli,
    phase::{
        decoder::{decode_residues, gather_phases, PhaseProvider},
        encoder::{encode_phases, PhaseTable, ResidueTable},
        PhaseRecipe,
    },
};

use self::params::Params;

/// Output of [`encode`].
///
/// `beacon` and `phases` must be persisted together; `recipe` and `residues`
/// are returned for inspection and are recomputable.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Encoded {
    pub beacon: Beacon,
    pub phases: PhaseTable,
    pub recipe: PhaseRecipe,
    pub residues: ResidueTable,
    pub payload_len: usize,
}

/// Output of [`decode`].
#[derive(Clone, Debug, PartialEq)]
pub struct Decoded {
    /// Whole symbols; a payload whose length is not a multiple of the chunk
    /// width comes back with its zero padding.
    pub payload: Vec<u8>,
    pub alignment: f64,
}

pub fn encode(
    key: &[u8],
    payload: &[u8],
    epoch: u32,
    auth_key: &[u8],
    phase_key: Option<&[u8]>,
    params: &Params,
) -> Result<Encoded, CodecError> {
    params.validate()?;

    let moduli = select_moduli(key, params.modulus_count)?;
    let symbols = chunk(payload, params.chunk_bits);
    let recipe = PhaseRecipe::derive(moduli.as_slice(), symbols.len(), phase_key)?;
    let (residues, phases) = encode_phases(&symbols, moduli.as_slice(), &recipe);
    let fingerprint = quantize(&residues, moduli.as_slice(), params.levels);
    let beacon = Beacon::sign(moduli.as_slice(), epoch, fingerprint, auth_key)?;

    debug!(
        "encoded {} bytes into {} symbols over {} moduli (epoch {})",
        payload.len(),
        symbols.len(),
        moduli.len(),
        epoch
    );

    Ok(Encoded {
        beacon,
        phases,
        recipe,
        residues,
        payload_len: payload.len(),
    })
}

/// Reconstructs the payload from a beacon and its out-of-band phases.
///
/// The beacon's moduli must be the ones `key` selects. The signature is not
/// checked here; use [`decode_verified`] when the auth key is at hand.
pub fn decode(
    key: &[u8],
    beacon: &Beacon,
    phase_key: Option<&[u8]>,
    phases: &impl PhaseProvider,
    params: &Params,
) -> Result<Decoded, CodecError> {
    params.validate()?;

    let moduli = select_moduli(key, params.modulus_count)?;
    if moduli.as_slice() != beacon.index.as_slice() {
        return Err(CodecError::ModulusMismatch);
    }

    let phases = gather_phases(moduli.as_slice(), phases)?;
    let symbol_count = phases.0.values().next().map_or(0, Vec::len);
    let recipe = PhaseRecipe::derive(moduli.as_slice(), symbol_count, phase_key)?;
    let (residues, alignment) = decode_residues(
        moduli.as_slice(),
        &beacon.fingerprint,
        &phases,
        &recipe,
        params.levels,
    )?;
    let payload = reconstruct(moduli.as_slice(), &residues, params.chunk_bits)?;

    debug!(
        "decoded {} symbols over {} moduli (epoch {}, alignment {:.3})",
        symbol_count,
        moduli.len(),
        beacon.epoch,
        alignment
    );

    Ok(Decoded { payload, alignment })
}

/// [`decode`] preceded by a signature check under `auth_key`.
pub fn decode_verified(
    key: &[u8],
    beacon: &Beacon,
    auth_key: &[u8],
    phase_key: Option<&[u8]>,
    phases: &impl PhaseProvider,
    params: &Params,
) -> Result<Decoded, CodecError> {
    beacon.verify(auth_key)?;
    decode(key, beacon, phase_key, phases, params)
}

/// Draws a fresh 32-byte key.
pub fn generate_key(mut rng: impl CryptoRng + RngCore) -> [u8; 32] {
    let mut key = [0u8; 32];
    rng.fill_bytes(&mut key);
    key
}
