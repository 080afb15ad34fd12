//! MurmurHash3 x86_32 implementation.
//!
//! Original algorithm by Austin Appleby. All rights to the original belong to the author.
//! The 32-bit variant is used for object names: keys are short and the
//! hash only has to select a slot in a small open-addressing table.

const C1: u32 = 0xcc9e2d51;
const C2: u32 = 0x1b873593;

/// Compute MurmurHash3 x86_32 of `data` with the given seed.
#[inline]
pub fn hash32(data: &[u8], seed: u32) -> u32 {
    let len = data.len();
    let mut h1 = seed;

    // Body - process 4-byte blocks as little-endian words
    let mut blocks = data.chunks_exact(4);
    for block in &mut blocks {
        let k1 = u32::from_le_bytes([block[0], block[1], block[2], block[3]]);
        h1 ^= mix_k1(k1);
        h1 = h1.rotate_left(13);
        h1 = h1.wrapping_mul(5).wrapping_add(0xe6546b64);
    }

    // Tail - up to 3 trailing bytes
    let tail = blocks.remainder();
    let mut k1: u32 = 0;
    if tail.len() >= 3 {
        k1 ^= (tail[2] as u32) << 16;
    }
    if tail.len() >= 2 {
        k1 ^= (tail[1] as u32) << 8;
    }
    if !tail.is_empty() {
        k1 ^= tail[0] as u32;
        h1 ^= mix_k1(k1);
    }

    // Finalization
    h1 ^= len as u32;
    fmix32(h1)
}

/// Hash a string key with seed 0.
#[inline]
pub fn hash_str(key: &str) -> u32 {
    hash32(key.as_bytes(), 0)
}

#[inline]
fn mix_k1(k1: u32) -> u32 {
    k1.wrapping_mul(C1).rotate_left(15).wrapping_mul(C2)
}

/// Final avalanche for 32-bit values.
#[inline]
fn fmix32(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}
