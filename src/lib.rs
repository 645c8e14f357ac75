pub mod beacon;
pub mod chunk;
pub mod codec;
pub mod crt;
pub mod envelope;
pub mod error;
pub mod fingerprint;
pub mod modulus;
pub mod phase;
pub mod util;

pub use beacon::Beacon;
pub use codec::{decode, decode_verified, encode, params::Params, Decoded, Encoded};
pub use envelope::PhaseEnvelope;
pub use error::CodecError;
pub use phase::{decoder::PhaseProvider, encoder::PhaseTable, PhaseRecipe};

pub mod examples {
    use std::error::Error;
    use std::time::Instant;

    use log::info;
    use rand::{RngCore, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    use crate::codec::{encode, generate_key, params::Params};
    use crate::envelope::PhaseEnvelope;

    /// Encodes and decodes `num_payloads` random payloads of `payload_len`
    /// bytes, returning the mean alignment.
    pub fn roundtrip(
        params: &Params,
        payload_len: usize,
        num_payloads: usize,
        seed: u64,
    ) -> Result<f64, Box<dyn Error>> {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let now = Instant::now();
        let mut alignment_sum = 0.0;

        for epoch in 0..num_payloads {
            let key = generate_key(&mut rng);
            let auth_key = generate_key(&mut rng);
            let phase_key = generate_key(&mut rng);
            let mut payload = vec![0u8; payload_len];
            rng.fill_bytes(&mut payload);

            let encoded = encode(
                &key,
                &payload,
                epoch as u32,
                &auth_key,
                Some(&phase_key),
                params,
            )?;
            let envelope = PhaseEnvelope::seal(&encoded, Some(&phase_key));
            encoded.beacon.verify(&auth_key)?;
            let decoded = envelope.open(&key, &encoded.beacon, Some(&phase_key), params)?;
            if decoded.payload != payload {
                return Err(format!("payload {} did not round-trip", epoch).into());
            }
            alignment_sum += decoded.alignment;
        }

        let elapsed_time = now.elapsed();
        info!(
            "{} payloads of {} bytes round-tripped in {} ms",
            num_payloads,
            payload_len,
            elapsed_time.as_millis()
        );

        if num_payloads == 0 {
            Ok(1.0)
        } else {
            Ok(alignment_sum / num_payloads as f64)
        }
    }

}
