// Chunk planner
// Chooses block size and mapping strategy from file size and thread count

use super::config::EngineConfig;

/// How a file's bytes are brought into memory and reduced
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum Strategy {
    /// Map fixed-size chunks left to right, chaining the CRC accumulator
    SingleThread,
    /// Map the whole file once, reduce slices in parallel
    WholeFileMap(u32),
    /// Map each block separately inside its own task
    TieredBlockMap(u32),
}

impl Strategy {
    /// Worker threads the strategy wants
    pub fn threads(&self) -> u32 {
        match self {
            Strategy::SingleThread => 1,
            Strategy::WholeFileMap(n) | Strategy::TieredBlockMap(n) => *n,
        }
    }
}

/// A contiguous byte range of the target file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub offset: u64,
    pub length: u64,
    pub is_final: bool,
}

/// Result of planning one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    pub strategy: Strategy,
    pub block_size: u64,
    pub file_size: u64,
}

impl ChunkPlan {
    /// Number of chunks; an empty file still has one zero-length chunk
    pub fn chunk_count(&self) -> u64 {
        if self.file_size == 0 {
            1
        } else {
            self.file_size.div_ceil(self.block_size)
        }
    }

    /// Chunks tiling `[0, file_size)` in order
    pub fn chunks(&self) -> impl Iterator<Item = Chunk> + '_ {
        let count = self.chunk_count();
        (0..count).map(move |index| {
            let offset = index * self.block_size;
            let is_final = index + 1 == count;
            let length = if is_final {
                self.file_size - offset
            } else {
                self.block_size
            };
            Chunk { offset, length, is_final }
        })
    }
}

/// Number of hardware threads, never less than one
pub fn available_parallelism() -> u32 {
    u32::try_from(num_cpus::get()).unwrap_or(u32::MAX).max(1)
}

/// Thread count a parallel plan will use: 0 means every core, and the
/// result is clamped to `max_threads`
pub fn resolve_threads(requested_threads: u32, config: &EngineConfig) -> u32 {
    let wanted = match requested_threads {
        0 => available_parallelism(),
        n => n,
    };
    wanted.clamp(1, config.max_threads.max(1))
}

/// Pick a strategy and block size for a file of `file_size` bytes
pub fn plan(file_size: u64, requested_threads: u32, config: &EngineConfig) -> ChunkPlan {
    if requested_threads == 1 {
        return ChunkPlan {
            strategy: Strategy::SingleThread,
            block_size: config.serial_block_size.max(1),
            file_size,
        };
    }

    let num_threads = resolve_threads(requested_threads, config);

    let mut block_size = file_size
        .div_ceil(u64::from(num_threads))
        .max(config.min_parallel_block)
        .max(1);

    let strategy = if file_size > config.large_file_limit {
        // Keep every individual mapping under the limit as well
        block_size = block_size.min(config.large_file_limit.max(1));
        Strategy::TieredBlockMap(num_threads)
    } else {
        Strategy::WholeFileMap(num_threads)
    };

    ChunkPlan {
        strategy,
        block_size,
        file_size,
    }
}
