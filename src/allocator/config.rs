// src/allocator/config.rs
//! Configuration for buffer allocation and growth

use crate::memory::StorageKind;

/// Maximum buffer capacity (1GB)
pub const BUF_MAX_SIZE: usize = 1_000_000_000;

/// How a buffer picks its new capacity when a write does not fit.
///
/// Whatever the policy, the new capacity is never below what the write
/// needs, and never above [`AllocatorConfig::max_capacity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GrowthPolicy {
    /// Grow to exactly the required capacity
    Exact,
    /// Grow to at least twice the current capacity
    #[default]
    Doubling,
    /// Grow in multiples of a fixed step (bytes)
    Step(usize),
}

impl GrowthPolicy {
    /// Picks the capacity to grow to, given the current capacity and the
    /// minimum the pending operation needs. Returns `required` unchanged if
    /// the policy would overshoot `max`.
    pub fn next_capacity(&self, current: usize, required: usize, max: usize) -> usize {
        let proposed = match *self {
            Self::Exact => required,
            Self::Doubling => current.saturating_mul(2).max(required),
            Self::Step(step) if step > 0 => required.div_ceil(step).saturating_mul(step),
            Self::Step(_) => required,
        };
        if proposed > max { required } else { proposed }
    }
}

/// Configuration for a [`BufferAllocator`](crate::BufferAllocator).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocatorConfig {
    /// Storage kind for new buffers and for growth
    pub kind: StorageKind,
    /// Capacity growth policy
    pub growth: GrowthPolicy,
    /// Largest capacity any buffer may reach (bytes)
    pub max_capacity: usize,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            kind: StorageKind::OnHeap,
            growth: GrowthPolicy::Doubling,
            max_capacity: BUF_MAX_SIZE,
        }
    }
}

impl AllocatorConfig {
    /// Heap storage with doubling growth.
    pub fn on_heap() -> Self {
        Self::default()
    }

    /// Direct storage with doubling growth.
    pub fn off_heap() -> Self {
        Self {
            kind: StorageKind::OffHeap,
            ..Self::default()
        }
    }

    /// Configuration for network packet processing: direct storage growing
    /// in MTU-sized steps.
    pub fn network() -> Self {
        Self {
            kind: StorageKind::OffHeap,
            growth: GrowthPolicy::Step(1500), // Standard MTU
            max_capacity: BUF_MAX_SIZE,
        }
    }

    /// Heap storage that never over-allocates on growth.
    pub fn exact() -> Self {
        Self {
            growth: GrowthPolicy::Exact,
            ..Self::default()
        }
    }

    /// Returns a copy with a different capacity ceiling.
    pub fn with_max_capacity(mut self, max_capacity: usize) -> Self {
        self.max_capacity = max_capacity;
        self
    }
}
