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

//! Parts system for moving parts between the world and composite ledgers

use crate::ecs::components::{Location, Part};
use crate::ecs::events::{EventBus, PartEvent};
use crate::ecs::registry::PartRegistry;
use crate::ecs::{EcsEntity, GameWorld};
use crate::ledger::{CompositePartLedger, LedgerError, LedgerResult, Placement};
use partledger_common::PartId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PartsError {
    #[error("Entity {0:?} is not a placed part")]
    NotAPart(EcsEntity),

    #[error("Entity {0:?} has no location")]
    NoLocation(EcsEntity),

    #[error("Part {0} does not include subparts")]
    NotComposite(PartId),

    #[error("Part {0} was released but never placed")]
    NotReplaced(PartId),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Entity vanished: {0}")]
    NoSuchEntity(#[from] hecs::NoSuchEntity),
}

pub type PartsResult<T> = Result<T, PartsError>;

/// [`Placement`] backed by a hecs world and the part registry
///
/// Placed parts are entities with a [`Part`] and a [`Location`]. Every move
/// is recorded so the caller can publish matching events.
pub struct WorldPlacement<'w> {
    world: &'w mut GameWorld,
    registry: &'w mut PartRegistry,
    events: Vec<PartEvent>,
}

impl<'w> WorldPlacement<'w> {
    pub fn new(world: &'w mut GameWorld, registry: &'w mut PartRegistry) -> Self {
        Self {
            world,
            registry,
            events: Vec::new(),
        }
    }

    /// Spawn a part into the world at the given location
    pub fn spawn(&mut self, part: Part, location: Location) -> EcsEntity {
        let id = part.id();
        let entity = self.world.spawn((part, location));
        if let Err(e) = self.registry.register(entity, id) {
            tracing::error!("Placed part {} could not be registered: {}", id, e);
        }
        self.events.push(PartEvent::PartPlaced {
            entity,
            part: id,
            location,
        });
        entity
    }

    /// Events recorded so far, in order
    pub fn into_events(self) -> Vec<PartEvent> {
        self.events
    }
}

impl Placement for WorldPlacement<'_> {
    fn withdraw(&mut self, id: PartId) -> Option<Part> {
        let entity = self.registry.get_entity(id)?;
        let part = match self.world.remove_one::<Part>(entity) {
            Ok(part) => part,
            Err(e) => {
                tracing::debug!("Part {} is registered but not available: {}", id, e);
                return None;
            }
        };
        if let Err(e) = self.world.despawn(entity) {
            tracing::warn!("Withdrawn part {} left no entity behind: {}", id, e);
        }
        self.registry.unregister_part(id);
        self.events.push(PartEvent::PartWithdrawn { part: id });
        Some(part)
    }

    fn place_near(&mut self, part: Part, near: Location) {
        self.spawn(part, near);
    }
}

/// Moves parts between the world and the ledgers of placed composite parts
pub struct PartsSystem {
    event_bus: EventBus,
    registry: PartRegistry,
}

impl PartsSystem {
    /// Create a new parts system
    pub fn new(event_bus: EventBus) -> Self {
        Self {
            event_bus,
            registry: PartRegistry::new(),
        }
    }

    pub fn registry(&self) -> &PartRegistry {
        &self.registry
    }

    /// Find the entity of a placed part
    pub fn find(&self, part: PartId) -> Option<EcsEntity> {
        self.registry.get_entity(part)
    }

    /// Put a part into the world
    pub fn spawn_part(&mut self, world: &mut GameWorld, part: Part, location: Location) -> EcsEntity {
        let mut placement = WorldPlacement::new(world, &mut self.registry);
        let entity = placement.spawn(part, location);
        let events = placement.into_events();
        self.publish_all(events);
        entity
    }

    /// Include a placed part in the composite part `owner`
    pub fn add_existing_subpart(
        &mut self,
        world: &mut GameWorld,
        owner: EcsEntity,
        item: PartId,
    ) -> PartsResult<()> {
        let moves = self.with_owner_ledger(world, owner, |ledger, placement| {
            ledger.add_placed_part(item, placement)
        })?;

        self.publish_all(moves);
        self.event_bus
            .publish(PartEvent::SubpartAdded { owner, part: item });
        Ok(())
    }

    /// Release a subpart of `owner` and place it next to the owner
    pub fn split_off_subpart(
        &mut self,
        world: &mut GameWorld,
        owner: EcsEntity,
        part: PartId,
    ) -> PartsResult<EcsEntity> {
        let location = world
            .get::<&Location>(owner)
            .map(|loc| *loc)
            .map_err(|_| PartsError::NoLocation(owner))?;

        let moves = self.with_owner_ledger(world, owner, |ledger, placement| {
            ledger.remove_and_place_part(part, placement, location)
        })?;

        self.event_bus
            .publish(PartEvent::SubpartRemoved { owner, part });
        self.publish_all(moves);
        self.registry.get_entity(part).ok_or(PartsError::NotReplaced(part))
    }

    /// Destroy a placed part together with everything included in it
    pub fn destroy_part(&mut self, world: &mut GameWorld, entity: EcsEntity) -> PartsResult<usize> {
        let part = world
            .remove_one::<Part>(entity)
            .map_err(|_| PartsError::NotAPart(entity))?;
        world.despawn(entity)?;
        self.registry.unregister_entity(entity);

        let id = part.id();
        let destroyed = part.destroy();
        tracing::debug!("Destroyed part {} and {} included parts", id, destroyed - 1);

        self.event_bus
            .publish(PartEvent::PartDestroyed { part: id, destroyed });
        Ok(destroyed)
    }

    /// Run `f` against the ledger of a placed composite part.
    ///
    /// The owner's [`Part`] is detached from its entity for the duration so
    /// the world itself can act as the placement. An owner can therefore never
    /// withdraw itself.
    fn with_owner_ledger<F>(
        &mut self,
        world: &mut GameWorld,
        owner: EcsEntity,
        f: F,
    ) -> PartsResult<Vec<PartEvent>>
    where
        F: FnOnce(&mut CompositePartLedger, &mut dyn Placement) -> LedgerResult<()>,
    {
        let mut owner_part = world
            .remove_one::<Part>(owner)
            .map_err(|_| PartsError::NotAPart(owner))?;

        let mut placement = WorldPlacement::new(world, &mut self.registry);
        let result = match owner_part.ledger_mut() {
            Some(ledger) => f(ledger, &mut placement).map_err(PartsError::from),
            None => Err(PartsError::NotComposite(owner_part.id())),
        };
        let moves = placement.into_events();

        world.insert_one(owner, owner_part)?;
        result.map(|()| moves)
    }

    fn publish_all(&self, events: Vec<PartEvent>) {
        for event in events {
            self.event_bus.publish(event);
        }
    }
}
