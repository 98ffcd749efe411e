// CRC32 block primitives and partial results

use crc32fast::Hasher as Crc32Hasher;

/// Digest algorithms the engine can compute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// CRC32 (IEEE), computed with the parallel chunk reducer
    #[default]
    Crc32,
    /// MD5, serial only since it has no combine operation
    Md5,
}

impl Algorithm {
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Crc32 => "crc32",
            Algorithm::Md5 => "md5",
        }
    }
}

impl std::str::FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "crc" | "crc32" => Ok(Algorithm::Crc32),
            "md5" => Ok(Algorithm::Md5),
            other => Err(format!("unsupported algorithm '{}' (expected crc32 or md5)", other)),
        }
    }
}

/// CRC32 of `data`, continuing from `start` (0 for a fresh computation)
#[inline]
pub fn crc32(data: &[u8], start: u32) -> u32 {
    let mut hasher = Crc32Hasher::new_with_initial(start);
    hasher.update(data);
    hasher.finalize()
}

/// CRC32 of `A ++ B` given `crc32(A)`, `crc32(B)` and `len(B)`
#[inline]
pub fn combine(crc_a: u32, crc_b: u32, len_b: u64) -> u32 {
    let mut hasher = Crc32Hasher::new_with_initial(crc_a);
    hasher.combine(&Crc32Hasher::new_with_initial_len(crc_b, len_b));
    hasher.finalize()
}

/// CRC over a contiguous run of bytes plus the number of bytes it covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartialResult {
    pub crc: u32,
    pub length: u64,
}

impl PartialResult {
    pub fn new(crc: u32, length: u64) -> Self {
        Self { crc, length }
    }

    /// Extend this prefix with the bytes that immediately follow it
    pub fn append(self, suffix: PartialResult) -> PartialResult {
        PartialResult {
            crc: combine(self.crc, suffix.crc, suffix.length),
            length: self.length + suffix.length,
        }
    }
}
