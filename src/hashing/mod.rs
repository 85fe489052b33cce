//! BLAKE3-derived keys for caches and deterministic stub vectors.

use blake3::Hasher;

/// First 8 bytes of the BLAKE3 digest, little-endian.
///
/// 64 bits is plenty for in-memory cache keys over a bounded corpus; a collision only
/// costs a wrong cache hit on a score, never a corrupted corpus entry. Use
/// [`hash_bytes`] when the full digest is needed.
#[inline]
pub fn hash_to_u64(data: &[u8]) -> u64 {
    truncate(blake3::hash(data))
}

#[inline]
pub fn hash_bytes(data: &[u8]) -> [u8; 32] {
    *blake3::hash(data).as_bytes()
}

/// Key for a `(query, document)` pair.
///
/// Length-prefixed so `("ab", "c")` and `("a", "bc")` hash differently.
#[inline]
pub fn pair_key(query: &str, document: &str) -> u64 {
    let mut hasher = Hasher::new();
    hasher.update(&(query.len() as u64).to_le_bytes());
    hasher.update(query.as_bytes());
    hasher.update(b"|");
    hasher.update(document.as_bytes());
    truncate(hasher.finalize())
}

#[inline]
fn truncate(hash: blake3::Hash) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}
