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

//! Test utilities for ECS testing

use crate::catalog::PartCatalog;
use crate::ecs::components::Location;
use partledger_common::PartDef;

/// Catalog with a bionic arm: two hands of two fingers each, and a power cell
pub fn test_catalog() -> PartCatalog {
    PartCatalog::from_defs([
        PartDef::new("BionicArm", "bionic arm", 1200.0).with_children([
            "BionicHand",
            "BionicHand",
            "PowerCell",
        ]),
        PartDef::new("BionicHand", "bionic hand", 400.0)
            .with_children(["BionicFinger", "BionicFinger"]),
        PartDef::new("BionicFinger", "bionic finger", 50.0),
        PartDef::new("PowerCell", "power cell", 100.0),
    ])
    .expect("test catalog is valid")
}

/// Workshop location used by tests
pub fn test_location() -> Location {
    Location::new(
        uuid::Uuid::parse_str("10000000-0000-0000-0000-000000000000").unwrap(),
        uuid::Uuid::parse_str("10000000-0000-0000-0000-000000000001").unwrap(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_resolves() {
        let catalog = test_catalog();
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.composite_kinds().count(), 2);
    }
}
