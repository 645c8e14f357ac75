use crypto_bigint::subtle::ConstantTimeEq;
use hmac::{Hmac, Mac};
use log::info;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::CodecError;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_BYTES: usize = 32;

/// The signed, storable part of an encoded payload.
///
/// A beacon authenticates its moduli, epoch and fingerprint but does not carry
/// enough information to reconstruct the payload; the phase table travels
/// separately.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Beacon {
    pub index: Vec<u32>,
    pub epoch: u32,
    pub fingerprint: Vec<u8>,
    pub signature: [u8; SIGNATURE_BYTES],
}

impl Beacon {
    pub fn sign(
        moduli: &[u32],
        epoch: u32,
        fingerprint: Vec<u8>,
        auth_key: &[u8],
    ) -> Result<Self, CodecError> {
        let signature = compute_signature(auth_key, moduli, epoch, &fingerprint)?;
        Ok(Self {
            index: moduli.to_vec(),
            epoch,
            fingerprint,
            signature,
        })
    }

    /// Recomputes the signature under `auth_key` and compares it in constant time.
    pub fn verify(&self, auth_key: &[u8]) -> Result<(), CodecError> {
        let expected = compute_signature(auth_key, &self.index, self.epoch, &self.fingerprint)?;
        if bool::from(expected[..].ct_eq(&self.signature[..])) {
            Ok(())
        } else {
            info!("Beacon::verify failed for epoch {}", self.epoch);
            Err(CodecError::SignatureMismatch)
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        Ok(bincode::deserialize(bytes)?)
    }
}

/// `BE32(moduli)... || BE32(epoch) || fingerprint`
pub fn signing_bytes(moduli: &[u32], epoch: u32, fingerprint: &[u8]) -> Vec<u8> {
    let mut message = Vec::with_capacity(4 * moduli.len() + 4 + fingerprint.len());
    for modulus in moduli {
        message.extend_from_slice(&modulus.to_be_bytes());
    }
    message.extend_from_slice(&epoch.to_be_bytes());
    message.extend_from_slice(fingerprint);
    message
}

fn compute_signature(
    auth_key: &[u8],
    moduli: &[u32],
    epoch: u32,
    fingerprint: &[u8],
) -> Result<[u8; SIGNATURE_BYTES], CodecError> {
    let mut mac =
        HmacSha256::new_from_slice(auth_key).map_err(|_| CodecError::InvalidParameters {
            reason: "auth key rejected by HMAC".into(),
        })?;
    mac.update(&signing_bytes(moduli, epoch, fingerprint));
    let mut signature = [0u8; SIGNATURE_BYTES];
    signature.copy_from_slice(&mac.finalize().into_bytes());
    Ok(signature)
}
