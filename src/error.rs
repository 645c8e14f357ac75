#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum CodecError {
    #[display(fmt = "missing phases for modulus {}", modulus)]
    MissingPhases { modulus: u32 },

    #[display(fmt = "moduli {} and {} are not coprime", lhs, rhs)]
    NotCoprime { lhs: u64, rhs: u32 },

    #[display(
        fmt = "modulus {} carries {} phases, expected {}",
        modulus,
        actual,
        expected
    )]
    PhaseLengthMismatch {
        modulus: u32,
        expected: usize,
        actual: usize,
    },

    #[display(fmt = "invalid parameters: {}", reason)]
    InvalidParameters { reason: String },

    #[display(
        fmt = "{} moduli cannot represent {}-bit symbols",
        modulus_count,
        chunk_bits
    )]
    InsufficientModulusRange {
        modulus_count: usize,
        chunk_bits: u32,
    },

    #[display(fmt = "{} symbols exceed the maximum of {}", symbols, max)]
    PayloadTooLarge { symbols: usize, max: usize },

    #[display(fmt = "beacon moduli do not match the moduli selected from the key")]
    ModulusMismatch,

    #[display(fmt = "beacon signature mismatch")]
    SignatureMismatch,

    #[display(fmt = "envelope declares {} symbols, found {}", expected, actual)]
    SymbolCountMismatch { expected: usize, actual: usize },

    #[display(
        fmt = "payload of {} bytes does not split into {} symbols of {} bits",
        payload_len,
        symbol_count,
        chunk_bits
    )]
    PayloadLengthMismatch {
        payload_len: usize,
        symbol_count: usize,
        chunk_bits: u32,
    },

    #[display(fmt = "phase key does not match the envelope's key id")]
    PhaseKeyMismatch,

    Serialization(bincode::Error),

    Json(serde_json::Error),
}

impl From<bincode::Error> for CodecError {
    fn from(err: bincode::Error) -> Self {
        Self::Serialization(err)
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}
