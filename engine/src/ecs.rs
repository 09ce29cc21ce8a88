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

//! Entity Component System (ECS) module
//!
//! The world holds every part that is not included in a ledger. This module
//! provides the components, the id registry, events, and the parts system
//! that moves parts between the world and ledgers.

pub use hecs::{Entity, World};

/// Type alias for hecs runtime entity handles (non-persistent, memory-only)
/// This is NOT the same as the persistent PartId carried by a Part
pub type EcsEntity = Entity;

/// Type alias for the game world
pub type GameWorld = World;

pub mod components;
pub mod events;
pub mod registry;
pub mod systems;

pub use registry::PartRegistry;

#[cfg(test)]
pub mod test_utils;
