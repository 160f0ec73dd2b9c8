//! Memory region identity.

use std::fmt;

use crate::device::Device;

/// Category of memory within a device.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MemoryType {
    /// The device's ordinary memory.
    #[default]
    Default,
}

impl fmt::Display for MemoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("DEFAULT"),
        }
    }
}

/// How an allocator manages its backing memory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AllocatorType {
    /// Direct device allocation.
    Device,
    /// Arena-managed allocation.
    Arena,
    /// Unspecified.
    #[default]
    Invalid,
}

impl fmt::Display for AllocatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Device => "DEVICE",
            Self::Arena => "ARENA",
            Self::Invalid => "INVALID",
        })
    }
}

/// Identity of a memory region: who allocated it, where it lives.
///
/// Two values are equal iff every field matches.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemoryInfo {
    pub alloc_type: AllocatorType,
    pub mem_type: MemoryType,
    pub device: Device,
    pub id: i32,
    pub name: String,
}

impl MemoryInfo {
    pub fn new(name: impl Into<String>, alloc_type: AllocatorType) -> Self {
        Self {
            alloc_type,
            mem_type: MemoryType::Default,
            device: Device::CPU,
            id: 0,
            name: name.into(),
        }
    }

    pub fn with_device(mut self, device: Device, id: i32) -> Self {
        self.device = device;
        self.id = id;
        self
    }
}

impl fmt::Display for MemoryInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MemoryInfo:[name:{} id:{} MemoryType:{} AllocatorType:{} {}]",
            self.name, self.id, self.mem_type, self.alloc_type, self.device
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn equality_over_all_fields() {
        let a = MemoryInfo::new("CPU", AllocatorType::Device);
        let b = MemoryInfo::new("CPU", AllocatorType::Device);
        assert_eq!(a, b);

        let c = MemoryInfo::new("CPU", AllocatorType::Arena);
        assert_ne!(a, c);

        let d = MemoryInfo::new("other", AllocatorType::Device);
        assert_ne!(a, d);
    }

    #[test]
    fn usable_as_hash_key() {
        let mut set = HashSet::new();
        set.insert(MemoryInfo::new("CPU", AllocatorType::Device));
        set.insert(MemoryInfo::new("CPU", AllocatorType::Device));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn display_lists_fields() {
        let info = MemoryInfo::new("CPU", AllocatorType::Device);
        let text = info.to_string();
        assert!(text.contains("name:CPU"));
        assert!(text.contains("AllocatorType:DEVICE"));
        assert!(text.contains("MemoryType:DEFAULT"));
    }
}
