//! Specialized collection types
//!
//! Generational keys for the scene's arenas. A key stays valid until its slot
//! is freed; a stale key never aliases a newer occupant.

pub use slotmap::{Key, SlotMap};

slotmap::new_key_type! {
    /// Generational handle of an entity slot
    pub struct EntityId;

    /// Generational handle of a transform node
    pub struct TransformId;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_key_does_not_alias_new_slot() {
        let mut map: SlotMap<EntityId, &str> = SlotMap::with_key();
        let first = map.insert("first");
        map.remove(first);
        let second = map.insert("second");
        assert!(map.get(first).is_none());
        assert_eq!(map.get(second), Some(&"second"));
    }

    #[test]
    fn test_default_key_is_null() {
        assert!(EntityId::default().is_null());
        assert!(TransformId::default().is_null());
    }
}
