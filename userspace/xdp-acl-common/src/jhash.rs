mod test;

/// An arbitrary initial parameter.
pub const JHASH_INITVAL: u32 = 0xdead_beef;

/// Longest key `jhash` mixes, three 32-bit words.
pub const MAX_KEY_LEN: usize = 12;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "user", derive(thiserror::Error))]
pub enum HashError {
    /// Only the last-block path of the kernel's jhash is implemented.
    #[cfg_attr(feature = "user", error("hash key is {0} bytes long, at most 12 are supported"))]
    KeyTooLong(usize),
}

#[inline]
fn final_mix(mut a: u32, mut b: u32, mut c: u32) -> u32 {
    c ^= b;
    c = c.wrapping_sub(b.rotate_left(14));
    a ^= c;
    a = a.wrapping_sub(c.rotate_left(11));
    b ^= a;
    b = b.wrapping_sub(a.rotate_left(25));
    c ^= b;
    c = c.wrapping_sub(b.rotate_left(16));
    a ^= c;
    a = a.wrapping_sub(c.rotate_left(4));
    b ^= a;
    b = b.wrapping_sub(a.rotate_left(14));
    c ^= b;
    c = c.wrapping_sub(b.rotate_left(24));
    c
}

/// Hashes `key` the way the kernel's `jhash(key, length, initval)` does for keys of
/// at most [`MAX_KEY_LEN`] bytes.
///
/// The result depends on the byte order of `key`, nothing is normalized, so both the
/// control plane and the XDP program must build keys byte for byte the same way
/// (see [`HashKey`](crate::HashKey)).
pub fn jhash(key: &[u8], initval: u32) -> Result<u32, HashError> {
    let length = key.len();
    if length > MAX_KEY_LEN {
        return Err(HashError::KeyTooLong(length));
    }

    let init = JHASH_INITVAL
        .wrapping_add(length as u32)
        .wrapping_add(initval);
    let mut words = [init; 3];

    // Nothing left to add
    if length == 0 {
        return Ok(words[2]);
    }

    // Last block: byte i lands in word i / 4, little-endian within the word
    for (i, byte) in key.iter().enumerate() {
        let word = &mut words[i / 4];
        *word = word.wrapping_add(u32::from(*byte) << (8 * (i % 4)));
    }

    let [a, b, c] = words;
    Ok(final_mix(a, b, c))
}
