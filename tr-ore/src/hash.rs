//! Hashing utilities.

use tr_types::Fingerprint;

/// Streaming xxh3 hasher used to fingerprint resolved configurations.
pub struct Xxh3Hasher {
    inner: xxhash_rust::xxh3::Xxh3,
}

impl Default for Xxh3Hasher {
    fn default() -> Self {
        Xxh3Hasher::new()
    }
}

impl Xxh3Hasher {
    /// Create a new [`Xxh3Hasher`].
    pub const fn new() -> Self {
        Xxh3Hasher {
            inner: xxhash_rust::xxh3::Xxh3::new(),
        }
    }

    pub fn reset(&mut self) {
        self.inner.reset();
    }

    pub fn update(&mut self, input: &[u8]) {
        self.inner.update(input);
    }

    /// Hash a length-prefixed field, so `("ab", "c")` and `("a", "bc")` never collide.
    pub fn update_field(&mut self, input: &[u8]) {
        let len = u64::try_from(input.len()).unwrap_or(u64::MAX);
        self.inner.update(&len.to_le_bytes());
        self.inner.update(input);
    }

    pub fn digest(&self) -> Fingerprint {
        Fingerprint::new(self.inner.digest())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_are_length_prefixed() {
        let mut a = Xxh3Hasher::new();
        a.update_field(b"ab");
        a.update_field(b"c");

        let mut b = Xxh3Hasher::new();
        b.update_field(b"a");
        b.update_field(b"bc");

        assert_ne!(a.digest(), b.digest());
    }

    #[test]
    fn reset_starts_over() {
        let mut hasher = Xxh3Hasher::new();
        hasher.update(b"use_static_crt");
        let first = hasher.digest();

        hasher.reset();
        hasher.update(b"use_static_crt");
        assert_eq!(first, hasher.digest());
    }
}
