use std::hash::Hasher;

const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

/// FNV-1a 64-bit hasher.
/// Switch dispatch and module ids must hash identically in every process,
/// so `DefaultHasher` (randomly seeded) is not an option.
#[derive(Debug, Clone, Copy)]
pub struct DeterministicHasher {
    hash: u64,
}

impl DeterministicHasher {
    pub fn new() -> Self {
        Self { hash: FNV_OFFSET_BASIS }
    }
}

impl Default for DeterministicHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for DeterministicHasher {
    fn finish(&self) -> u64 {
        self.hash
    }

    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.hash ^= byte as u64;
            self.hash = self.hash.wrapping_mul(FNV_PRIME);
        }
    }
}

/// Hash of the UTF-8 bytes of `value`, used by string switch dispatch.
pub fn hash_str(value: &str) -> u64 {
    hash_bytes(value.as_bytes())
}

pub fn hash_bytes(bytes: &[u8]) -> u64 {
    let mut hasher = DeterministicHasher::new();
    hasher.write(bytes);
    hasher.finish()
}
