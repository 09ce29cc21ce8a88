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

//! Saving and loading placed parts
//!
//! Parts are saved by value: a snapshot of a composite part contains full
//! snapshots of everything it includes. Kinds are saved by id and resolved
//! against the catalog on load. Memoized ledger values are never saved; a
//! loaded ledger recomputes them on first use.

use crate::catalog::{CatalogError, PartCatalog};
use crate::ecs::components::{Location, Part};
use crate::ecs::systems::PartsSystem;
use crate::ecs::GameWorld;
use crate::ledger::CompositePartLedger;
use partledger_common::{KindId, PartId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// Current save file format version
pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Save file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Save file is malformed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported save version {0}")]
    UnsupportedVersion(u32),

    #[error("Part {0} appears more than once")]
    DuplicatePart(PartId),

    #[error("Saved part {part} of kind {kind} includes subparts but the kind is not composite")]
    NotComposite { part: PartId, kind: KindId },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Deep value snapshot of a part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartSnapshot {
    pub id: PartId,
    pub kind: KindId,
    /// Snapshots of included parts; present for composite parts only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub included: Option<Vec<PartSnapshot>>,
}

impl PartSnapshot {
    /// Ids of this part and everything it includes, depth first
    pub fn ids(&self) -> Vec<PartId> {
        let mut ids = vec![self.id];
        for child in self.included.iter().flatten() {
            ids.extend(child.ids());
        }
        ids
    }
}

impl From<&Part> for PartSnapshot {
    fn from(part: &Part) -> Self {
        Self {
            id: part.id(),
            kind: part.kind().id().clone(),
            included: part
                .ledger()
                .map(|ledger| ledger.members().iter().map(PartSnapshot::from).collect()),
        }
    }
}

/// A saved part together with where it was placed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedSnapshot {
    pub location: Location,
    pub part: PartSnapshot,
}

/// On-disk save file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveFile {
    pub version: u32,
    pub parts: Vec<PlacedSnapshot>,
}

impl SaveFile {
    /// Snapshot every placed part of a world
    pub fn capture(world: &GameWorld) -> Self {
        let mut parts: Vec<PlacedSnapshot> = world
            .query::<(&Part, &Location)>()
            .iter()
            .map(|(part, location)| PlacedSnapshot {
                location: *location,
                part: PartSnapshot::from(part),
            })
            .collect();
        parts.sort_by_key(|placed| placed.part.id);

        Self {
            version: SAVE_VERSION,
            parts,
        }
    }

    pub fn read(path: impl AsRef<Path>) -> PersistenceResult<Self> {
        let file: SaveFile = serde_json::from_reader(std::io::BufReader::new(std::fs::File::open(path)?))?;
        if file.version != SAVE_VERSION {
            return Err(PersistenceError::UnsupportedVersion(file.version));
        }
        Ok(file)
    }

    /// Fail on the first part id saved more than once
    pub fn check_unique(&self) -> PersistenceResult<()> {
        let mut seen = HashSet::new();
        for id in self.parts.iter().flat_map(|placed| placed.part.ids()) {
            if !seen.insert(id) {
                return Err(PersistenceError::DuplicatePart(id));
            }
        }
        Ok(())
    }

    pub fn write(&self, path: impl AsRef<Path>) -> PersistenceResult<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), self)?;
        Ok(())
    }
}

/// Rebuild a part from its snapshot
///
/// Included parts are handed to the ledger through
/// [`CompositePartLedger::replace_members`], so nothing memoized survives.
pub fn restore_part(catalog: &PartCatalog, snapshot: &PartSnapshot) -> PersistenceResult<Part> {
    let kind = catalog.kind(&snapshot.kind)?.clone();

    let ledger = match (kind.template(), &snapshot.included) {
        (Some(template), included) => {
            let mut ledger = CompositePartLedger::new(kind.clone(), Some(template.clone()));
            match included {
                Some(included) => {
                    let members = included
                        .iter()
                        .map(|child| restore_part(catalog, child))
                        .collect::<PersistenceResult<Vec<_>>>()?;
                    ledger.replace_members(members);
                }
                None => tracing::warn!(
                    "Saved {} ({}) has no subpart list, loading it empty",
                    kind.label(),
                    snapshot.id
                ),
            }
            Some(ledger)
        }
        (None, Some(_)) => {
            return Err(PersistenceError::NotComposite {
                part: snapshot.id,
                kind: snapshot.kind.clone(),
            });
        }
        (None, None) => None,
    };

    Ok(Part::from_parts(snapshot.id, kind, ledger))
}

/// Write every placed part of the world to a save file
pub fn save_world(world: &GameWorld, path: impl AsRef<Path>) -> PersistenceResult<usize> {
    let path = path.as_ref();
    let file = SaveFile::capture(world);
    file.write(path)?;
    tracing::info!("Saved {} parts to {}", file.parts.len(), path.display());
    Ok(file.parts.len())
}

/// Load a save file, placing every saved part into the world
///
/// Nothing is placed unless every part restores and no part id is saved
/// twice or already placed in the world.
pub fn load_world(
    world: &mut GameWorld,
    system: &mut PartsSystem,
    catalog: &PartCatalog,
    path: impl AsRef<Path>,
) -> PersistenceResult<usize> {
    let path = path.as_ref();
    let file = SaveFile::read(path)?;
    file.check_unique()?;
    if let Some(placed) = file
        .parts
        .iter()
        .find(|placed| system.registry().contains_part(placed.part.id))
    {
        return Err(PersistenceError::DuplicatePart(placed.part.id));
    }

    let restored = file
        .parts
        .iter()
        .map(|placed| -> PersistenceResult<(Part, Location)> {
            Ok((restore_part(catalog, &placed.part)?, placed.location))
        })
        .collect::<PersistenceResult<Vec<_>>>()?;

    let count = restored.len();
    for (part, location) in restored {
        system.spawn_part(world, part, location);
    }
    tracing::info!("Loaded {} parts from {}", count, path.display());
    Ok(count)
}
