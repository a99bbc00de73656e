//! Component trait and the tag registry
//!
//! Components are plain data records identified by a stable tag derived
//! from their declared name, not from language-level type metadata. The
//! tag is what the world indexes by, so external tools (editors, scene
//! files) can name component kinds without sharing Rust types.

use std::any::Any;

/// A stable identifier for a component kind
///
/// Derived from the component's declared name with the FNV-1a 64-bit
/// hash, so any build (or any tool outside this crate) computes the same
/// tag for the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentTag(pub u64);

impl ComponentTag {
    /// FNV-1a 64-bit offset basis
    const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;

    /// FNV-1a 64-bit prime
    const FNV_PRIME: u64 = 0x0100_0000_01b3;

    /// Derive the tag for a component name
    pub const fn from_name(name: &str) -> Self {
        let bytes = name.as_bytes();
        let mut hash = Self::FNV_OFFSET_BASIS;
        let mut i = 0;
        while i < bytes.len() {
            hash ^= bytes[i] as u64;
            hash = hash.wrapping_mul(Self::FNV_PRIME);
            i += 1;
        }
        Self(hash)
    }

    /// Derive the tag for a component type
    pub fn of<T: Component>() -> Self {
        Self::from_name(T::type_name())
    }
}

/// Marker trait for components
///
/// Components are pure data: identity comes from [`Component::type_name`],
/// behavior lives in systems. Exactly one instance of a given kind can be
/// attached to an entity at a time.
pub trait Component: Any + Send + Sync {
    /// Stable name this component kind is registered under
    fn type_name() -> &'static str
    where
        Self: Sized;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Health;

    impl Component for Health {
        fn type_name() -> &'static str {
            "Health"
        }
    }

    #[test]
    fn tag_is_deterministic() {
        assert_eq!(ComponentTag::of::<Health>(), ComponentTag::from_name("Health"));
        assert_eq!(ComponentTag::from_name("Health"), ComponentTag::from_name("Health"));
    }

    #[test]
    fn tags_differ_between_names() {
        assert_ne!(
            ComponentTag::from_name("Health"),
            ComponentTag::from_name("Velocity")
        );
    }

    #[test]
    fn empty_name_hashes_to_offset_basis() {
        // FNV-1a of the empty string is the offset basis itself.
        assert_eq!(ComponentTag::from_name(""), ComponentTag(0xcbf2_9ce4_8422_2325));
    }
}
