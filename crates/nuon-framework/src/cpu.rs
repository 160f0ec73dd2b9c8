//! Host-memory allocator.

use std::alloc::Layout;
use std::collections::HashMap;
use std::ptr::NonNull;
use std::sync::Mutex;

use nuon_common::{Result, Status};

use crate::allocator::{Allocator, AllocatorStats};
use crate::memory_info::{AllocatorType, MemoryInfo};

/// Minimum alignment of every CPU allocation.
const PREFERRED_ALIGNMENT: usize = 64;

#[derive(Debug, Default)]
struct Ledger {
    /// Outstanding allocations: address → size. `free` needs the size to
    /// rebuild the layout for `std::alloc::dealloc`.
    live: HashMap<usize, usize>,
    stats: AllocatorStats,
}

/// 64-byte-aligned allocator over the global Rust allocator.
#[derive(Debug)]
pub struct CpuAllocator {
    memory_info: MemoryInfo,
    ledger: Mutex<Ledger>,
}

impl Default for CpuAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuAllocator {
    pub fn new() -> Self {
        Self {
            memory_info: MemoryInfo::new("CPU", AllocatorType::Device),
            ledger: Mutex::new(Ledger::default()),
        }
    }
}

impl Allocator for CpuAllocator {
    fn alloc(&self, size: usize) -> Result<NonNull<u8>> {
        if size == 0 {
            return Err(Status::InvalidParam("zero-size allocation".into()));
        }

        let layout = Layout::from_size_align(size, PREFERRED_ALIGNMENT)
            .map_err(|_| Status::OutOfMemory(format!("invalid layout for {size} bytes")))?;
        let ptr = NonNull::new(unsafe { std::alloc::alloc(layout) })
            .ok_or_else(|| Status::OutOfMemory(format!("allocation of {size} bytes failed")))?;

        let mut ledger = self.ledger.lock().expect("cpu allocator ledger poisoned");
        ledger.live.insert(ptr.as_ptr() as usize, size);
        let stats = &mut ledger.stats;
        stats.num_allocs += 1;
        stats.bytes_in_use += size as i64;
        stats.total_allocated_bytes += size as i64;
        stats.max_bytes_in_use = stats.max_bytes_in_use.max(stats.bytes_in_use);
        stats.max_alloc_size = stats.max_alloc_size.max(size as i64);

        Ok(ptr)
    }

    unsafe fn free(&self, ptr: NonNull<u8>) {
        let size = {
            let mut ledger = self.ledger.lock().expect("cpu allocator ledger poisoned");
            let Some(size) = ledger.live.remove(&(ptr.as_ptr() as usize)) else {
                debug_assert!(false, "free of pointer not owned by this allocator");
                return;
            };
            ledger.stats.bytes_in_use -= size as i64;
            size
        };

        // from_size_align succeeded in alloc for this exact (size, align)
        let layout = Layout::from_size_align_unchecked(size, PREFERRED_ALIGNMENT);
        std::alloc::dealloc(ptr.as_ptr(), layout);
    }

    fn info(&self) -> &MemoryInfo {
        &self.memory_info
    }

    fn stats(&self) -> AllocatorStats {
        self.ledger
            .lock()
            .expect("cpu allocator ledger poisoned")
            .stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_returns_aligned_pointer() {
        let alloc = CpuAllocator::new();
        let ptr = alloc.alloc(100).unwrap();
        assert_eq!(ptr.as_ptr() as usize % PREFERRED_ALIGNMENT, 0);
        unsafe { alloc.free(ptr) };
    }

    #[test]
    fn alloc_zero_is_rejected() {
        let alloc = CpuAllocator::new();
        assert!(alloc.alloc(0).is_err());
    }

    #[test]
    fn stats_track_in_use_bytes() {
        let alloc = CpuAllocator::new();
        let a = alloc.alloc(128).unwrap();
        let b = alloc.alloc(256).unwrap();

        let stats = alloc.stats();
        assert_eq!(stats.num_allocs, 2);
        assert_eq!(stats.bytes_in_use, 384);
        assert_eq!(stats.max_alloc_size, 256);

        unsafe { alloc.free(a) };
        let stats = alloc.stats();
        assert_eq!(stats.bytes_in_use, 256);
        assert_eq!(stats.max_bytes_in_use, 384);

        unsafe { alloc.free(b) };
        assert_eq!(alloc.stats().bytes_in_use, 0);
    }

    #[test]
    fn alloc_array_multiplies() {
        let alloc = CpuAllocator::new();
        let ptr = alloc.alloc_array(10, 4).unwrap();
        assert_eq!(alloc.stats().bytes_in_use, 40);
        unsafe { alloc.free(ptr) };
    }

    #[test]
    fn alloc_array_overflow_is_out_of_memory() {
        let alloc = CpuAllocator::new();
        let err = alloc.alloc_array(usize::MAX, 8).unwrap_err();
        assert_eq!(err.kind(), nuon_common::StatusKind::OutOfMemory);
    }

    #[test]
    fn memory_info_names_cpu() {
        let alloc = CpuAllocator::new();
        assert_eq!(alloc.info().name, "CPU");
        assert_eq!(alloc.info().alloc_type, AllocatorType::Device);
    }

    #[test]
    fn writes_through_allocated_buffer() {
        let alloc = CpuAllocator::new();
        let ptr = alloc.alloc(16).unwrap();
        unsafe {
            let slice = std::slice::from_raw_parts_mut(ptr.as_ptr(), 16);
            slice.fill(0xAB);
            assert!(slice.iter().all(|&b| b == 0xAB));
            alloc.free(ptr);
        }
    }
}
