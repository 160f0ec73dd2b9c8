//! Process-wide allocator registry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use crate::allocator::Allocator;
use crate::cpu::CpuAllocator;

/// Key selecting an allocator from the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AllocatorKind {
    /// The CPU allocator.
    Cpu,
    /// The process default (currently the CPU allocator).
    Default,
    /// No allocator; lookups return `None`.
    Invalid,
}

/// Lazily-populated, process-wide allocator table.
///
/// Allocators are instantiated on first lookup; instantiation is
/// serialized by a single mutex.
pub struct AllocatorRegistry {
    allocators: Mutex<HashMap<AllocatorKind, Arc<dyn Allocator>>>,
}

impl AllocatorRegistry {
    /// The process-wide registry.
    pub fn instance() -> &'static AllocatorRegistry {
        static INSTANCE: OnceLock<AllocatorRegistry> = OnceLock::new();
        INSTANCE.get_or_init(|| AllocatorRegistry {
            allocators: Mutex::new(HashMap::new()),
        })
    }

    /// Returns the allocator for `kind`, creating it on first use.
    pub fn get(&self, kind: AllocatorKind) -> Option<Arc<dyn Allocator>> {
        let mut map = self.allocators.lock().expect("allocator registry poisoned");
        match kind {
            AllocatorKind::Cpu | AllocatorKind::Default => Some(Arc::clone(
                map.entry(kind)
                    .or_insert_with(|| Arc::new(CpuAllocator::new())),
            )),
            AllocatorKind::Invalid => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_lookup_is_stable() {
        let registry = AllocatorRegistry::instance();
        let a = registry.get(AllocatorKind::Cpu).unwrap();
        let b = registry.get(AllocatorKind::Cpu).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn invalid_kind_has_no_allocator() {
        assert!(AllocatorRegistry::instance()
            .get(AllocatorKind::Invalid)
            .is_none());
    }

    #[test]
    fn default_kind_resolves_to_cpu_allocator() {
        let alloc = AllocatorRegistry::instance()
            .get(AllocatorKind::Default)
            .unwrap();
        assert_eq!(alloc.info().name, "CPU");
    }

    #[test]
    fn concurrent_lookups_agree() {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                std::thread::spawn(|| {
                    AllocatorRegistry::instance()
                        .get(AllocatorKind::Cpu)
                        .unwrap()
                })
            })
            .collect();
        let allocs: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for pair in allocs.windows(2) {
            assert!(Arc::ptr_eq(&pair[0], &pair[1]));
        }
    }
}
