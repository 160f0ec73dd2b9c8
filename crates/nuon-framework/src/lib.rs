//! Memory framework for nuon.
//!
//! Defines the [`Allocator`] trait, the aligned [`CpuAllocator`], the
//! process-wide [`AllocatorRegistry`], and the [`MemoryInfo`]/[`Device`]
//! identity types stamped onto every tensor buffer.

mod allocator;
mod cpu;
mod device;
mod memory_info;
mod registry;

pub use allocator::{calc_aligned_size, Allocator, AllocatorStats};
pub use cpu::CpuAllocator;
pub use device::{Device, DeviceKind};
pub use memory_info::{AllocatorType, MemoryInfo, MemoryType};
pub use registry::{AllocatorKind, AllocatorRegistry};
