use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::BuildHasherDefault;

/// A `HashMap` with deterministic hashing, keyed identically across instances.
pub type FastHashMap<K, V> = HashMap<K, V, BuildHasherDefault<DefaultHasher>>;
pub type FastHashSet<K> = HashSet<K, BuildHasherDefault<DefaultHasher>>;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn collections() {
        let mut set = FastHashSet::default();
        set.insert("asdasd");
        set.insert("asdasd");
        assert_eq!(set.len(), 1);

        let mut map = FastHashMap::default();
        map.insert("a", 1);
        map.insert("a", 2);
        assert_eq!(map.get("a"), Some(&2));
    }
}
