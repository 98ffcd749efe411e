// Recursive parallel reducer
// Splits a byte range into blocks, checksums them concurrently and merges
// the partial CRCs back into the CRC of the whole range

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, trace};

use super::crc::{crc32, PartialResult};
use super::error::ChecksumError;
use super::mapping::ChunkSource;
use super::plan::ChunkPlan;

/// Raised by the first failing block so later blocks skip their mapping
#[derive(Debug, Default)]
pub struct AbortFlag(AtomicBool);

impl AbortFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

fn block_crc<S>(source: &S, offset: u64, length: u64, abort: &AbortFlag) -> Result<PartialResult, ChecksumError>
where
    S: ChunkSource + ?Sized,
{
    match source.with_block(offset, length, |bytes| crc32(bytes, 0)) {
        Ok(crc) => Ok(PartialResult::new(crc, length)),
        Err(e) => {
            debug!(offset, length, "block checksum failed: {}", e.kind_label());
            abort.raise();
            Err(e)
        }
    }
}

/// Checksum `[offset, offset + remaining)` of `source` in blocks of `max_block_size`.
///
/// Each call checksums its own first block while the rest of the range is
/// handed to [`rayon::join`] for another worker to steal, so every block of
/// the chain can be in flight at once. Results are merged prefix-first,
/// which makes the output identical to a serial scan.
///
/// Must run inside the rayon pool that should do the work (see
/// [`rayon::ThreadPool::install`]); outside of one, the global pool is used.
pub fn reduce<S>(
    source: &S,
    offset: u64,
    remaining: u64,
    max_block_size: u64,
    abort: &AbortFlag,
) -> Result<PartialResult, ChecksumError>
where
    S: ChunkSource + ?Sized,
{
    if abort.is_raised() {
        return Err(ChecksumError::Aborted);
    }

    if remaining <= max_block_size {
        return block_crc(source, offset, remaining, abort);
    }

    trace!(offset, remaining, "splitting block off range");
    let (current, rest) = rayon::join(
        || block_crc(source, offset, max_block_size, abort),
        || {
            reduce(
                source,
                offset + max_block_size,
                remaining - max_block_size,
                max_block_size,
                abort,
            )
        },
    );

    // Head first: an abort seen by the tail must not hide the real failure
    let current = current?;
    let rest = rest?;
    Ok(current.append(rest))
}

/// Checksum every chunk of `plan` on the current thread, chaining the CRC
/// accumulator from one chunk into the next
pub fn reduce_serial<S>(source: &S, plan: &ChunkPlan) -> Result<PartialResult, ChecksumError>
where
    S: ChunkSource + ?Sized,
{
    let mut running = PartialResult::new(0, 0);
    for chunk in plan.chunks() {
        let crc = source.with_block(chunk.offset, chunk.length, |bytes| crc32(bytes, running.crc))?;
        running = PartialResult::new(crc, running.length + chunk.length);
    }
    Ok(running)
}
