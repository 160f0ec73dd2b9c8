//! Owned or borrowed typed buffers.

use std::fmt;
use std::ptr::NonNull;
use std::sync::Arc;

use nuon_common::{Result, Status};
use nuon_framework::{Allocator, MemoryInfo};

use crate::tensor_shape::TensorShape;
use crate::types::{size_of_datatype, PrimitiveDataType};

/// A named, typed buffer with shape metadata.
///
/// A tensor either owns its buffer through an allocator handle (released
/// on drop) or borrows an externally-owned buffer. Tensors are move-only;
/// ownership transfers with the value and the buffer is released exactly
/// once.
pub struct Tensor {
    name: String,
    data_type: PrimitiveDataType,
    shape: TensorShape,
    memory_info: MemoryInfo,
    data: Option<NonNull<u8>>,
    byte_offset: isize,
    allocator: Option<Arc<dyn Allocator>>,
}

// The buffer is either exclusively owned via the allocator handle or
// borrowed under the caller's aliasing contract.
unsafe impl Send for Tensor {}
unsafe impl Sync for Tensor {}

impl Tensor {
    /// Creates an empty tensor carrying only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: PrimitiveDataType::Unknown,
            shape: TensorShape::new(),
            memory_info: MemoryInfo::default(),
            data: None,
            byte_offset: 0,
            allocator: None,
        }
    }

    /// Required storage in bytes: `bytes_per_element × element_count`,
    /// or 0 for an empty shape. A negative element count (symbolic dims)
    /// is invalid here.
    pub fn calc_storage_size(data_type: PrimitiveDataType, shape: &TensorShape) -> Result<usize> {
        let element_num = shape.element_num();
        if element_num < 0 {
            return Err(Status::Fail(format!("invalid tensor shape: {shape}")));
        }
        Ok(size_of_datatype(data_type) * element_num as usize)
    }

    /// Points the tensor at a pre-allocated buffer it does not own.
    ///
    /// The caller guarantees `data` stays valid for the tensor's lifetime
    /// and has room for the shape; this is not checked.
    pub fn init_with_buffer(
        &mut self,
        data_type: PrimitiveDataType,
        shape: TensorShape,
        data: Option<NonNull<u8>>,
        memory_info: MemoryInfo,
        byte_offset: isize,
    ) {
        self.release_buffer();
        self.data_type = data_type;
        self.shape = shape;
        self.memory_info = memory_info;
        self.data = data;
        self.byte_offset = byte_offset;
        self.allocator = None;
    }

    /// Allocates and takes ownership of the buffer required for `shape`.
    ///
    /// An empty shape allocates nothing and leaves the base pointer null.
    pub fn init_with_allocator(
        &mut self,
        data_type: PrimitiveDataType,
        shape: TensorShape,
        allocator: Arc<dyn Allocator>,
    ) -> Result<()> {
        self.release_buffer();
        let len = Self::calc_storage_size(data_type, &shape)?;

        self.data_type = data_type;
        self.shape = shape;
        self.memory_info = allocator.info().clone();
        self.byte_offset = 0;
        self.data = if len > 0 {
            Some(allocator.alloc(len)?)
        } else {
            None
        };
        self.allocator = Some(allocator);

        Ok(())
    }

    /// Releases the buffer if this tensor owns it.
    fn release_buffer(&mut self) {
        if let (Some(allocator), Some(data)) = (self.allocator.take(), self.data.take()) {
            unsafe { allocator.free(data) };
        }
        self.data = None;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> PrimitiveDataType {
        self.data_type
    }

    pub fn shape(&self) -> &TensorShape {
        &self.shape
    }

    pub fn memory_info(&self) -> &MemoryInfo {
        &self.memory_info
    }

    pub fn byte_offset(&self) -> isize {
        self.byte_offset
    }

    pub fn set_byte_offset(&mut self, byte_offset: isize) {
        self.byte_offset = byte_offset;
    }

    /// Raw pointer to the element storage at `base + byte_offset`, or
    /// null for an empty tensor. Alignment is the allocator's business.
    pub fn data_as<T>(&self) -> *mut T {
        match self.data {
            Some(ptr) => unsafe { ptr.as_ptr().offset(self.byte_offset) as *mut T },
            None => std::ptr::null_mut(),
        }
    }

    /// Raw byte pointer to the element storage, or null when empty.
    pub fn data_raw(&self) -> *mut u8 {
        self.data_as::<u8>()
    }
}

impl Drop for Tensor {
    fn drop(&mut self) {
        self.release_buffer();
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("name", &self.name)
            .field("data_type", &self.data_type)
            .field("shape", &self.shape)
            .field("owned", &self.allocator.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nuon_framework::CpuAllocator;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct TrackingAllocator {
        inner: CpuAllocator,
        allocs: AtomicUsize,
        frees: AtomicUsize,
    }

    impl Allocator for TrackingAllocator {
        fn alloc(&self, size: usize) -> Result<NonNull<u8>> {
            self.allocs.fetch_add(1, Ordering::SeqCst);
            self.inner.alloc(size)
        }

        unsafe fn free(&self, ptr: NonNull<u8>) {
            self.frees.fetch_add(1, Ordering::SeqCst);
            self.inner.free(ptr)
        }

        fn info(&self) -> &MemoryInfo {
            self.inner.info()
        }
    }

    #[test]
    fn storage_size_is_width_times_count() {
        let shape = TensorShape::from_dims([2, 3]);
        let size = Tensor::calc_storage_size(PrimitiveDataType::Float32, &shape).unwrap();
        assert_eq!(size, 24);
    }

    #[test]
    fn storage_size_empty_shape_is_zero() {
        let size =
            Tensor::calc_storage_size(PrimitiveDataType::Float32, &TensorShape::new()).unwrap();
        assert_eq!(size, 0);
    }

    #[test]
    fn storage_size_rejects_symbolic_dims() {
        let shape = TensorShape::from_dims([-1, 3]);
        assert!(Tensor::calc_storage_size(PrimitiveDataType::Float32, &shape).is_err());
    }

    #[test]
    fn allocator_init_owns_and_releases_once() {
        let alloc = Arc::new(TrackingAllocator::default());
        {
            let mut tensor = Tensor::new("w");
            tensor
                .init_with_allocator(
                    PrimitiveDataType::Float32,
                    TensorShape::from_dims([4]),
                    alloc.clone(),
                )
                .unwrap();
            assert!(!tensor.data_raw().is_null());
        }
        assert_eq!(alloc.allocs.load(Ordering::SeqCst), 1);
        assert_eq!(alloc.frees.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn moving_does_not_double_free() {
        let alloc = Arc::new(TrackingAllocator::default());
        {
            let mut tensor = Tensor::new("w");
            tensor
                .init_with_allocator(
                    PrimitiveDataType::Float32,
                    TensorShape::from_dims([4]),
                    alloc.clone(),
                )
                .unwrap();
            let moved = tensor;
            let boxed = vec![moved];
            drop(boxed);
        }
        assert_eq!(alloc.frees.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn empty_shape_allocates_nothing() {
        let alloc = Arc::new(TrackingAllocator::default());
        let mut tensor = Tensor::new("empty");
        tensor
            .init_with_allocator(PrimitiveDataType::Float32, TensorShape::new(), alloc.clone())
            .unwrap();
        assert!(tensor.data_raw().is_null());
        assert_eq!(alloc.allocs.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn data_as_roundtrips_elements() {
        let alloc: Arc<dyn Allocator> = Arc::new(CpuAllocator::new());
        let mut tensor = Tensor::new("x");
        tensor
            .init_with_allocator(
                PrimitiveDataType::Float32,
                TensorShape::from_dims([3]),
                alloc,
            )
            .unwrap();

        let data = tensor.data_as::<f32>();
        unsafe {
            for i in 0..3 {
                *data.add(i) = i as f32 * 1.5;
            }
            assert_eq!(*data.add(2), 3.0);
        }
    }

    #[test]
    fn borrowed_buffer_is_not_freed() {
        let alloc = Arc::new(TrackingAllocator::default());
        let mut backing = [0u8; 16];
        {
            let mut tensor = Tensor::new("view");
            tensor.init_with_buffer(
                PrimitiveDataType::Float32,
                TensorShape::from_dims([4]),
                NonNull::new(backing.as_mut_ptr()),
                MemoryInfo::default(),
                0,
            );
        }
        assert_eq!(alloc.frees.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn byte_offset_shifts_data_pointer() {
        let mut backing = [0u8; 16];
        let base = backing.as_mut_ptr();
        let mut tensor = Tensor::new("view");
        tensor.init_with_buffer(
            PrimitiveDataType::Float32,
            TensorShape::from_dims([2]),
            NonNull::new(base),
            MemoryInfo::default(),
            8,
        );
        assert_eq!(tensor.data_raw(), unsafe { base.add(8) });
        assert_eq!(tensor.byte_offset(), 8);
    }

    #[test]
    fn reinit_releases_previous_buffer() {
        let alloc = Arc::new(TrackingAllocator::default());
        let mut tensor = Tensor::new("w");
        tensor
            .init_with_allocator(
                PrimitiveDataType::Float32,
                TensorShape::from_dims([4]),
                alloc.clone(),
            )
            .unwrap();
        tensor
            .init_with_allocator(
                PrimitiveDataType::Float32,
                TensorShape::from_dims([8]),
                alloc.clone(),
            )
            .unwrap();
        assert_eq!(alloc.allocs.load(Ordering::SeqCst), 2);
        assert_eq!(alloc.frees.load(Ordering::SeqCst), 1);
        drop(tensor);
        assert_eq!(alloc.frees.load(Ordering::SeqCst), 2);
    }
}
