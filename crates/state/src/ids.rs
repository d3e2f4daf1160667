use std::sync::atomic::{AtomicU64, Ordering};

macro_rules! opaque_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(pub u64);

        impl $name {
            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{:016x}", self.0)
            }
        }
    };
}

opaque_id!(ClientId);
opaque_id!(SessionId);
opaque_id!(ConnId);

/// Monotonic id allocator shared by clients, sessions, and the
/// boot-epoch-scoped stateid index. Every id assigned during a server
/// lifetime is unique.
#[derive(Default)]
pub struct IdAllocator(AtomicU64);

impl IdAllocator {
    pub fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocator_is_monotonic_and_unique() {
        let alloc = IdAllocator::default();
        let a = alloc.next();
        let b = alloc.next();
        assert!(b > a);
    }
}
