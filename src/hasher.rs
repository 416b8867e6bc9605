use std::hash::{Hash, Hasher};

/// Hash code of a single key for trial parameter `a`.
///
/// Every character `c` at position `i` within the key contributes
/// `i * (a + c)`, where `c` is the Unicode scalar value. The sum is reduced
/// modulo `modulus`. The first character always contributes nothing, so all
/// single-character keys hash to 0.
pub fn key_hash(key: &str, a: u64, modulus: u64) -> u64 {
    key.chars().enumerate().fold(0, |sum, (i, c)| {
        let term = mul_mod(i as u64, add_mod(a, c as u64, modulus), modulus);
        add_mod(sum, term, modulus)
    })
}

/// Per-key sums that turn [`key_hash`] into a single multiply-add per trial.
///
/// `key_hash(k, a, m) == (a * index_sum + code_sum) mod m`, with both sums
/// already reduced modulo `m`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyWeights {
    pub index_sum: u64,
    pub code_sum: u64,
}

impl KeyWeights {
    pub fn new(key: &str, modulus: u64) -> Self {
        let mut index_sum = 0;
        let mut code_sum = 0;

        for (i, c) in key.chars().enumerate() {
            let i = i as u64 % modulus;
            index_sum = add_mod(index_sum, i, modulus);
            code_sum = add_mod(code_sum, mul_mod(i, c as u64, modulus), modulus);
        }

        Self {
            index_sum,
            code_sum,
        }
    }

    pub fn hash(&self, a: u64, modulus: u64) -> u64 {
        add_mod(mul_mod(a, self.index_sum, modulus), self.code_sum, modulus)
    }
}

fn add_mod(x: u64, y: u64, modulus: u64) -> u64 {
    ((x as u128 + y as u128) % modulus as u128) as u64
}

fn mul_mod(x: u64, y: u64, modulus: u64) -> u64 {
    ((x as u128 * y as u128) % modulus as u128) as u64
}

/// Turns a seed string into the `u64` the search generator starts from.
pub struct SeedHasher {
    hash: u64,
    p: u64,
}

impl SeedHasher {
    pub fn new() -> Self {
        Self {
            hash: 99876516661,
            p: 779126527,
        }
    }

    pub fn seed_of(seed: &str) -> u64 {
        let mut hasher = Self::new();
        seed.hash(&mut hasher);
        hasher.finish()
    }
}

impl Default for SeedHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for SeedHasher {
    fn finish(&self) -> u64 {
        self.hash
    }

    fn write(&mut self, bytes: &[u8]) {
        for b in bytes {
            self.hash = (self.hash ^ *b as u64).wrapping_mul(self.p);
        }
    }
}
