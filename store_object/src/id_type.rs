//! Id Type module
//!
//! Conversions shared by every supported key type: a printable universal form
//! for errors and logs, and store-side generation for the memory adapter.

use std::fmt::{self, Display};
use uuid::Uuid;

/// Universal ID type that can hold any supported key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UniversalId {
    /// Numeric ID (i32, i64)
    Numeric(i64),
    /// UUID ID
    Uuid(Uuid),
}

impl Display for UniversalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UniversalId::Numeric(n) => write!(f, "{}", n),
            UniversalId::Uuid(uuid) => write!(f, "{}", uuid),
        }
    }
}

/// Trait for types that can provide a universal ID
pub trait HasUniversalId {
    fn universal_id(&self) -> UniversalId;
}

impl HasUniversalId for i32 {
    fn universal_id(&self) -> UniversalId {
        UniversalId::Numeric(*self as i64)
    }
}

impl HasUniversalId for i64 {
    fn universal_id(&self) -> UniversalId {
        UniversalId::Numeric(*self)
    }
}

impl HasUniversalId for Uuid {
    fn universal_id(&self) -> UniversalId {
        UniversalId::Uuid(*self)
    }
}

/// Keys the memory store can assign itself.
///
/// `seq` is the next value of the store's sequence, starting at 1. Returns
/// `None` when the sequence no longer fits the key type.
pub trait GeneratedId: Sized {
    fn generate(seq: u64) -> Option<Self>;
}

impl GeneratedId for i32 {
    fn generate(seq: u64) -> Option<Self> {
        i32::try_from(seq).ok()
    }
}

impl GeneratedId for i64 {
    fn generate(seq: u64) -> Option<Self> {
        i64::try_from(seq).ok()
    }
}

impl GeneratedId for Uuid {
    fn generate(_seq: u64) -> Option<Self> {
        Some(Uuid::new_v4())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids() {
        assert_eq!(i64::generate(1), Some(1));
        assert_eq!(i32::generate(u64::from(u32::MAX)), None);
        assert_ne!(Uuid::generate(1), Uuid::generate(1));
    }

    #[test]
    fn test_universal_id_display() {
        assert_eq!(42i32.universal_id().to_string(), "42");
        let uuid = Uuid::nil();
        assert_eq!(uuid.universal_id().to_string(), uuid.to_string());
    }
}
