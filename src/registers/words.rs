/// Word order used when packing a raw register into 32-bit words
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WordOrder {
    /// CID/CSD layout: the first four bytes land in the highest word, so word 0 holds
    /// register bits [31:0]
    Reversed,
    /// SCR/SD status layout: words follow the byte stream
    Natural,
}

/// Pack `4 * N` big-endian bytes into `N` words.
///
/// Register fetches hand fixed-size arrays in, a short slice is a caller bug and panics.
pub fn assemble<const N: usize>(bytes: &[u8], order: WordOrder) -> [u32; N] {
    let mut words = [0u32; N];
    for (i, chunk) in bytes[..N * 4].chunks_exact(4).enumerate() {
        let word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        match order {
            WordOrder::Reversed => words[N - 1 - i] = word,
            WordOrder::Natural => words[i] = word,
        }
    }
    words
}

/// Inverse of `assemble::<4>(.., WordOrder::Reversed)`
pub fn disassemble_reversed(words: &[u32; 4]) -> [u8; 16] {
    let mut bytes = [0u8; 16];
    for (i, chunk) in bytes.chunks_exact_mut(4).enumerate() {
        chunk.copy_from_slice(&words[3 - i].to_be_bytes());
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    const BYTES: [u8; 16] = [
        0x00, 0x01, 0x02, 0x03, 0x10, 0x11, 0x12, 0x13, //
        0x20, 0x21, 0x22, 0x23, 0x30, 0x31, 0x32, 0x33,
    ];

    #[test]
    fn test_reversed_order() {
        let words: [u32; 4] = assemble(&BYTES, WordOrder::Reversed);
        assert_eq!(words, [0x3031_3233, 0x2021_2223, 0x1011_1213, 0x0001_0203]);
    }

    #[test]
    fn test_natural_order() {
        let words: [u32; 2] = assemble(&BYTES, WordOrder::Natural);
        assert_eq!(words, [0x0001_0203, 0x1011_1213]);
    }

    #[test]
    fn test_reversed_is_invertible() {
        let mut bytes = BYTES;
        for seed in 0..=255u8 {
            for (i, b) in bytes.iter_mut().enumerate() {
                *b = seed.wrapping_mul(31).wrapping_add(i as u8 * 17);
            }
            let words: [u32; 4] = assemble(&bytes, WordOrder::Reversed);
            assert_eq!(disassemble_reversed(&words), bytes);
        }
    }

    #[test]
    #[should_panic]
    fn test_short_buffer_panics() {
        let _: [u32; 4] = assemble(&BYTES[..12], WordOrder::Natural);
    }
}
