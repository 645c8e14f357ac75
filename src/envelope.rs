//! Companion record that ships the phase table together with the inputs its
//! recipe was derived from, so a mismatched decode fails instead of silently
//! producing garbage.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{
    beacon::Beacon,
    chunk::symbol_count,
    codec::{decode, params::Params, Decoded, Encoded},
    error::CodecError,
    phase::encoder::PhaseTable,
};

pub const KEY_ID_BYTES: usize = 8;

/// First [`KEY_ID_BYTES`] bytes of `SHA-256(phase_key)`.
pub fn phase_key_id(phase_key: &[u8]) -> [u8; KEY_ID_BYTES] {
    let digest = Sha256::digest(phase_key);
    let mut id = [0u8; KEY_ID_BYTES];
    id.copy_from_slice(&digest[..KEY_ID_BYTES]);
    id
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PhaseEnvelope {
    pub symbol_count: usize,
    pub payload_len: usize,
    pub phase_key_id: Option<[u8; KEY_ID_BYTES]>,
    pub phases: PhaseTable,
}

impl PhaseEnvelope {
    pub fn seal(encoded: &Encoded, phase_key: Option<&[u8]>) -> Self {
        Self {
            symbol_count: encoded.recipe.symbol_count(),
            payload_len: encoded.payload_len,
            phase_key_id: phase_key.map(phase_key_id),
            phases: encoded.phases.clone(),
        }
    }

    /// Checks the recipe inputs against this envelope, then decodes and trims
    /// the payload to its original length.
    pub fn open(
        &self,
        key: &[u8],
        beacon: &Beacon,
        phase_key: Option<&[u8]>,
        params: &Params,
    ) -> Result<Decoded, CodecError> {
        params.validate()?;
        if self.phase_key_id != phase_key.map(phase_key_id) {
            return Err(CodecError::PhaseKeyMismatch);
        }
        if symbol_count(self.payload_len, params.chunk_bits) != self.symbol_count {
            return Err(CodecError::PayloadLengthMismatch {
                payload_len: self.payload_len,
                symbol_count: self.symbol_count,
                chunk_bits: params.chunk_bits,
            });
        }
        for angles in self.phases.0.values() {
            if angles.len() != self.symbol_count {
                return Err(CodecError::SymbolCountMismatch {
                    expected: self.symbol_count,
                    actual: angles.len(),
                });
            }
        }

        let mut decoded = decode(key, beacon, phase_key, &self.phases, params)?;
        decoded.payload.truncate(self.payload_len);
        Ok(decoded)
    }

    pub fn to_json(&self) -> Result<String, CodecError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, CodecError> {
        Ok(serde_json::from_str(json)?)
    }
}
