//! Physical device identity.

use std::fmt;

/// The kind of device a memory region lives on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeviceKind {
    /// Host CPU.
    #[default]
    Cpu,
    /// Discrete or integrated GPU.
    Gpu,
    /// Neural processing unit.
    Npu,
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Cpu => "CPU",
            Self::Gpu => "GPU",
            Self::Npu => "NPU",
        })
    }
}

/// A physical device: kind plus ordinal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Device {
    pub kind: DeviceKind,
    pub id: i16,
}

impl Device {
    /// CPU device 0, the default placement.
    pub const CPU: Device = Device {
        kind: DeviceKind::Cpu,
        id: 0,
    };

    pub fn new(kind: DeviceKind, id: i16) -> Self {
        Self { kind, id }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Device:[DeviceType:{} DeviceId:{}]", self.kind, self.id)
    }
}
