//! Managers keyed by viewer handle.

use crate::config::ManagerConfig;
use crate::manager::RoiManager;
use std::collections::HashMap;
use std::hash::Hash;

/// One [`RoiManager`] per viewer, created on first lookup.
#[derive(Debug)]
pub struct ManagerRegistry<K> {
    config: ManagerConfig,
    managers: HashMap<K, RoiManager>,
}

impl<K: Eq + Hash> Default for ManagerRegistry<K> {
    fn default() -> Self {
        Self::new(ManagerConfig::default())
    }
}

impl<K: Eq + Hash> ManagerRegistry<K> {
    /// Creates an empty registry; new managers start from `config`.
    #[must_use]
    pub fn new(config: ManagerConfig) -> Self {
        Self {
            config,
            managers: HashMap::new(),
        }
    }

    /// Returns the manager for `key`, creating it if needed.
    pub fn get_or_create(&mut self, key: K) -> &mut RoiManager {
        let config = &self.config;
        self.managers.entry(key).or_insert_with(|| {
            log::debug!("creating ROI manager");
            RoiManager::new(config.clone())
        })
    }

    #[must_use]
    pub fn get(&self, key: &K) -> Option<&RoiManager> {
        self.managers.get(key)
    }

    /// Drops the manager for `key`, returning it.
    pub fn remove(&mut self, key: &K) -> Option<RoiManager> {
        self.managers.remove(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.managers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.managers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roikit_core::{ShapeData, ShapeKind};

    #[test]
    fn test_get_or_create_reuses_manager() {
        let mut registry = ManagerRegistry::new(ManagerConfig::default().with_show_all(false));
        assert!(registry.is_empty());
        let manager = registry.get_or_create("viewer-1");
        assert!(!manager.show_all());
        manager
            .register_with(
                ShapeData::new(vec![[0.0, 0.0], [1.0, 1.0]]),
                ShapeKind::Line,
            )
            .unwrap();
        assert_eq!(registry.get_or_create("viewer-1").roi_count(), 1);
        assert_eq!(registry.get_or_create("viewer-2").roi_count(), 0);
        assert_eq!(registry.len(), 2);
        assert!(registry.remove(&"viewer-1").is_some());
        assert!(registry.get(&"viewer-1").is_none());
    }
}
