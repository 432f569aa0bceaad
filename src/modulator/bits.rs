//! dense bit packing, least significant bit first

/// pack 0/1 decisions into bytes, LSB first; a partial last byte is zero filled
pub fn pack_bits(bits: &[u8]) -> Vec<u8> {
    bits.chunks(8)
        .map(|group| {
            group
                .iter()
                .enumerate()
                .fold(0u8, |byte, (i, &bit)| byte | ((bit & 1) << i))
        })
        .collect()
}

/// expand `len` decisions out of packed bytes
///
/// Stops early if `packed` holds fewer than `len` bits.
pub fn unpack_bits(packed: &[u8], len: usize) -> Vec<u8> {
    packed
        .iter()
        .flat_map(|&byte| (0..8).map(move |i| (byte >> i) & 1))
        .take(len)
        .collect()
}
