/// Number of bytes backing one symbol of `chunk_bits` bits.
pub const fn chunk_bytes(chunk_bits: u32) -> usize {
    ((chunk_bits + 7) / 8) as usize
}

/// Number of symbols a payload of `payload_len` bytes splits into.
pub const fn symbol_count(payload_len: usize, chunk_bits: u32) -> usize {
    let width = chunk_bytes(chunk_bits);
    (payload_len + width - 1) / width
}

fn symbol_mask(chunk_bits: u32) -> u32 {
    if chunk_bits >= 32 {
        u32::MAX
    } else {
        (1u32 << chunk_bits) - 1
    }
}

/// Splits `payload` into big-endian symbols of `chunk_bits` bits.
///
/// A trailing partial chunk is padded with zero bytes on the right, so
/// `chunk(&[0xab], 16) == [0xab00]`. Callers validate `1 <= chunk_bits <= 32`.
pub fn chunk(payload: &[u8], chunk_bits: u32) -> Vec<u32> {
    let width = chunk_bytes(chunk_bits);
    let mask = symbol_mask(chunk_bits);
    payload
        .chunks(width)
        .map(|bytes| {
            let mut symbol = 0u32;
            for i in 0..width {
                symbol = (symbol << 8) | *bytes.get(i).unwrap_or(&0) as u32;
            }
            symbol & mask
        })
        .collect()
}

/// Serializes symbols back into `chunk_bytes(chunk_bits)` big-endian bytes each.
pub fn unchunk(symbols: &[u32], chunk_bits: u32) -> Vec<u8> {
    let width = chunk_bytes(chunk_bits);
    let mut out = Vec::with_capacity(symbols.len() * width);
    for symbol in symbols {
        out.extend_from_slice(&symbol.to_be_bytes()[4 - width..]);
    }
    out
}

#[cfg(test)]
mod tests {
    use rand::{Rng, RngCore};

    use super::{chunk, chunk_bytes, symbol_count, unchunk};

    #[test]
    fn sixteen_bit_symbols_are_big_endian() {
        assert_eq!(chunk(&[0x12, 0x34, 0xab, 0xcd], 16), vec![0x1234, 0xabcd]);
    }

    #[test]
    fn uneven_length_is_padded_on_the_right() {
        assert_eq!(chunk(&[0x12, 0x34, 0xab], 16), vec![0x1234, 0xab00]);
        assert_eq!(symbol_count(3, 16), 2);
    }

    #[test]
    fn empty_payload_has_no_symbols() {
        assert!(chunk(&[], 16).is_empty());
        assert_eq!(symbol_count(0, 16), 0);
    }

    #[test]
    fn narrow_symbols_are_masked() {
        assert_eq!(chunk(&[0xff, 0xff], 12), vec![0x0fff]);
        assert_eq!(chunk(&[0b1110_0101], 5), vec![0b0_0101]);
    }

    #[test]
    fn wide_symbols() {
        assert_eq!(chunk_bytes(32), 4);
        assert_eq!(chunk(&[1, 2, 3, 4, 5], 32), vec![0x0102_0304, 0x0500_0000]);
        assert_eq!(chunk_bytes(24), 3);
        assert_eq!(chunk(&[1, 2, 3], 24), vec![0x0001_0203]);
    }

    #[test]
    fn unchunk_restores_byte_aligned_payloads() {
        let mut rng = rand::thread_rng();
        for chunk_bits in [8, 16, 24, 32] {
            let width = chunk_bytes(chunk_bits);
            let len = width * rng.gen_range(0..64);
            let mut payload = vec![0u8; len];
            rng.fill_bytes(&mut payload);
            assert_eq!(unchunk(&chunk(&payload, chunk_bits), chunk_bits), payload);
        }
    }
}
