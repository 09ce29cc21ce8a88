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

//! Event type definitions

use crate::ecs::EcsEntity;
use partledger_common::{Location, PartId};
use serde::{Deserialize, Serialize};

/// Everything that moves a part between the world and a ledger
///
/// Owners are referred to by entity: only placed parts can be acted upon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PartEvent {
    /// A part was put into the world
    PartPlaced {
        entity: EcsEntity,
        part: PartId,
        location: Location,
    },
    /// A placed part left the world to be included somewhere
    PartWithdrawn {
        part: PartId,
    },
    SubpartAdded {
        owner: EcsEntity,
        part: PartId,
    },
    SubpartRemoved {
        owner: EcsEntity,
        part: PartId,
    },
    /// A placed part was destroyed along with `destroyed - 1` included parts
    PartDestroyed {
        part: PartId,
        destroyed: usize,
    },
}
