//! History registry - every entity ever born, dead or alive

use ahash::AHashMap;

use crate::core::error::{GenesisError, Result};
use crate::core::types::EntityId;
use crate::entity::{Entity, KinView};

#[derive(Debug, Clone, Default)]
pub struct Registry {
    entities: AHashMap<EntityId, Entity>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entity: Entity) {
        self.entities.insert(entity.id(), entity);
    }

    /// Remove an entity so it can be stepped mutably while the rest of the
    /// registry stays readable; pair with [`Registry::insert`].
    pub(crate) fn take(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn entity(&self, id: EntityId) -> Result<&Entity> {
        self.get(id).ok_or(GenesisError::EntityNotFound(id))
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Unordered iteration over every registered entity
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn max_generation(&self) -> u32 {
        self.iter().map(|e| e.generation()).max().unwrap_or(0)
    }

    /// Whether `ancestor` appears on the parent chain of `id`
    pub fn descends_from(&self, id: EntityId, ancestor: EntityId) -> bool {
        let mut cursor = self.get(id).and_then(|e| e.parent());
        while let Some(parent) = cursor {
            if parent == ancestor {
                return true;
            }
            cursor = self.get(parent).and_then(|e| e.parent());
        }
        false
    }

    /// Number of registered entities descending from `ancestor`.
    ///
    /// Walks every parent chain, so a single query is O(n * depth). Use
    /// [`Registry::lineage_sizes`] to count all root lineages at once.
    pub fn descendants_of(&self, ancestor: EntityId) -> usize {
        self.iter()
            .filter(|e| self.descends_from(e.id(), ancestor))
            .count()
    }

    /// Descendant count of every parentless entity, keyed by its id.
    ///
    /// Ids are issued in birth order, so a parent is always visited before
    /// its children and each entity inherits its root in one pass.
    pub fn lineage_sizes(&self) -> AHashMap<EntityId, usize> {
        let mut ordered: Vec<&Entity> = self.iter().collect();
        ordered.sort_unstable_by_key(|e| e.id());

        let mut roots: AHashMap<EntityId, EntityId> = AHashMap::with_capacity(ordered.len());
        let mut sizes: AHashMap<EntityId, usize> = AHashMap::new();
        for entity in ordered {
            match entity.parent() {
                Some(parent) => {
                    let root = roots.get(&parent).copied().unwrap_or(parent);
                    roots.insert(entity.id(), root);
                    *sizes.entry(root).or_insert(0) += 1;
                }
                None => {
                    roots.insert(entity.id(), entity.id());
                    sizes.entry(entity.id()).or_insert(0);
                }
            }
        }
        sizes
    }
}

impl KinView for Registry {
    fn kin(&self, id: EntityId) -> Option<&Entity> {
        self.get(id)
    }
}
