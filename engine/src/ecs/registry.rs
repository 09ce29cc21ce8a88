//
// Copyright 2025-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Part Registry for mapping between ECS runtime handles and part ids
//!
//! This module provides bidirectional mapping between:
//! - `EcsEntity`: hecs runtime entity handles (non-persistent, memory-only)
//! - `PartId`: Persistent part identifiers
//!
//! Only placed parts are registered. Parts included in a ledger have no
//! entity and are found through their owner.

use crate::ecs::EcsEntity;
use partledger_common::PartId;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Entity {0:?} is already registered")]
    EntityAlreadyRegistered(EcsEntity),

    #[error("Part {0} is already registered")]
    PartAlreadyRegistered(PartId),
}

/// Registry for mapping between ECS entities and part ids
#[derive(Debug, Default)]
pub struct PartRegistry {
    /// Map from part id to ECS entity handle
    part_to_entity: HashMap<PartId, EcsEntity>,

    /// Map from ECS entity handle to part id
    entity_to_part: HashMap<EcsEntity, PartId>,
}

impl PartRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            part_to_entity: HashMap::new(),
            entity_to_part: HashMap::new(),
        }
    }

    /// Register a mapping between an ECS entity and its part id
    ///
    /// # Returns
    /// * `Ok(())` if registration succeeded
    /// * `Err(RegistryError)` if either the entity or the part is already registered
    pub fn register(&mut self, entity: EcsEntity, part: PartId) -> Result<(), RegistryError> {
        if self.entity_to_part.contains_key(&entity) {
            return Err(RegistryError::EntityAlreadyRegistered(entity));
        }
        if self.part_to_entity.contains_key(&part) {
            return Err(RegistryError::PartAlreadyRegistered(part));
        }

        self.part_to_entity.insert(part, entity);
        self.entity_to_part.insert(entity, part);

        Ok(())
    }

    /// Unregister by ECS handle, returning the part id it was mapped to
    pub fn unregister_entity(&mut self, entity: EcsEntity) -> Option<PartId> {
        let part = self.entity_to_part.remove(&entity)?;
        self.part_to_entity.remove(&part);
        Some(part)
    }

    /// Unregister by part id, returning the entity it was mapped to
    pub fn unregister_part(&mut self, part: PartId) -> Option<EcsEntity> {
        let entity = self.part_to_entity.remove(&part)?;
        self.entity_to_part.remove(&entity);
        Some(entity)
    }

    /// Look up the entity of a placed part
    pub fn get_entity(&self, part: PartId) -> Option<EcsEntity> {
        self.part_to_entity.get(&part).copied()
    }

    pub fn contains_part(&self, part: PartId) -> bool {
        self.part_to_entity.contains_key(&part)
    }

    pub fn len(&self) -> usize {
        self.entity_to_part.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entity_to_part.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::GameWorld;

    #[test]
    fn test_register_and_lookup() {
        let mut registry = PartRegistry::new();
        let mut world = GameWorld::new();

        let entity = world.spawn(());
        let part = PartId::new();

        assert!(registry.register(entity, part).is_ok());

        assert_eq!(registry.get_entity(part), Some(entity));
        assert!(registry.contains_part(part));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_registration() {
        let mut registry = PartRegistry::new();
        let mut world = GameWorld::new();

        let entity = world.spawn(());
        let part = PartId::new();

        assert!(registry.register(entity, part).is_ok());

        let part2 = PartId::new();
        assert_eq!(
            registry.register(entity, part2),
            Err(RegistryError::EntityAlreadyRegistered(entity))
        );

        let entity2 = world.spawn(());
        assert_eq!(
            registry.register(entity2, part),
            Err(RegistryError::PartAlreadyRegistered(part))
        );
    }

    #[test]
    fn test_unregister() {
        let mut registry = PartRegistry::new();
        let mut world = GameWorld::new();

        let entity = world.spawn(());
        let part = PartId::new();

        registry.register(entity, part).unwrap();

        assert_eq!(registry.unregister_entity(entity), Some(part));
        assert_eq!(registry.get_entity(part), None);
        assert!(registry.is_empty());

        registry.register(entity, part).unwrap();

        assert_eq!(registry.unregister_part(part), Some(entity));
        assert_eq!(registry.get_entity(part), None);
        assert!(registry.is_empty());
        assert_eq!(registry.unregister_part(part), None);
    }

    #[test]
    fn test_contains_part() {
        let mut registry = PartRegistry::new();
        let mut world = GameWorld::new();

        let part1 = PartId::new();
        let part2 = PartId::new();
        assert!(!registry.contains_part(part1));

        registry.register(world.spawn(()), part1).unwrap();
        registry.register(world.spawn(()), part2).unwrap();

        assert!(registry.contains_part(part1));
        assert!(registry.contains_part(part2));
        assert_eq!(registry.len(), 2);

        registry.unregister_part(part1);
        assert!(!registry.contains_part(part1));
        assert_eq!(registry.len(), 1);
    }
}
