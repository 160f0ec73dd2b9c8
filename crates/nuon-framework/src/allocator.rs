//! The allocator contract.

use std::fmt;
use std::ptr::NonNull;

use nuon_common::{Result, Status};

use crate::memory_info::MemoryInfo;

/// Runtime statistics reported by an allocator.
///
/// Allocators that do not track usage may return a zeroed value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AllocatorStats {
    /// Number of allocations served.
    pub num_allocs: i64,
    /// Bytes currently outstanding.
    pub bytes_in_use: i64,
    /// Total bytes handed out over the allocator's lifetime.
    pub total_allocated_bytes: i64,
    /// High-water mark of `bytes_in_use`.
    pub max_bytes_in_use: i64,
    /// Largest single allocation.
    pub max_alloc_size: i64,
    /// Upper limit on allocatable bytes, 0 if unknown.
    pub bytes_limit: i64,
}

impl fmt::Display for AllocatorStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Limit:                    {}", self.bytes_limit)?;
        writeln!(f, "InUse:                    {}", self.bytes_in_use)?;
        writeln!(f, "TotalAllocated:           {}", self.total_allocated_bytes)?;
        writeln!(f, "MaxInUse:                 {}", self.max_bytes_in_use)?;
        writeln!(f, "NumAllocs:                {}", self.num_allocs)?;
        writeln!(f, "MaxAllocSize:             {}", self.max_alloc_size)
    }
}

/// Rounds `size` up to the next multiple of `alignment`.
///
/// `alignment` must be zero or a power of two; zero disables rounding.
pub fn calc_aligned_size(size: usize, alignment: usize) -> usize {
    if alignment == 0 {
        size
    } else {
        debug_assert!(alignment.is_power_of_two());
        let mask = alignment - 1;
        (size + mask) & !mask
    }
}

/// A pluggable memory provider.
///
/// Returned pointers are aligned to at least 64 bytes.
pub trait Allocator: fmt::Debug + Send + Sync {
    /// Allocates `size` bytes, or fails with `OUT_OF_MEMORY`.
    fn alloc(&self, size: usize) -> Result<NonNull<u8>>;

    /// Releases memory previously returned by [`alloc`](Self::alloc).
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by this allocator's `alloc` and must
    /// not be freed twice.
    unsafe fn free(&self, ptr: NonNull<u8>);

    /// The memory identity stamped onto buffers from this allocator.
    fn info(&self) -> &MemoryInfo;

    /// Usage statistics; zeroed when the allocator does not track them.
    fn stats(&self) -> AllocatorStats {
        AllocatorStats::default()
    }

    /// Allocates room for `item_num` items of `item_size` bytes each.
    fn alloc_array(&self, item_num: usize, item_size: usize) -> Result<NonNull<u8>> {
        let size = item_num
            .checked_mul(item_size)
            .ok_or_else(|| Status::OutOfMemory("array size overflows usize".into()))?;
        self.alloc(size)
    }

    /// Like [`alloc_array`](Self::alloc_array), with the total rounded up
    /// to `alignment` (a power of two, or zero for no rounding).
    fn alloc_array_aligned(
        &self,
        item_num: usize,
        item_size: usize,
        alignment: usize,
    ) -> Result<NonNull<u8>> {
        let size = item_num
            .checked_mul(item_size)
            .ok_or_else(|| Status::OutOfMemory("array size overflows usize".into()))?;
        self.alloc(calc_aligned_size(size, alignment))
    }
}
