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

//! Part component for concrete part instances

use crate::catalog::PartKind;
use crate::ledger::CompositePartLedger;
use partledger_common::PartId;

/// A concrete part instance
///
/// Lives either as a component of a placed entity or as a member of exactly
/// one [`CompositePartLedger`]. Composite parts carry their own ledger.
#[derive(Debug)]
pub struct Part {
    id: PartId,
    kind: PartKind,
    ledger: Option<CompositePartLedger>,
}

impl Part {
    /// Make a fresh part; composite kinds come fully stocked
    pub fn make(kind: PartKind) -> Self {
        let ledger = kind
            .template()
            .map(|template| CompositePartLedger::stocked(kind.clone(), Some(template.clone())));
        Self {
            id: PartId::new(),
            kind,
            ledger,
        }
    }

    /// Make a fresh part; composite kinds start with nothing included
    pub fn unstocked(kind: PartKind) -> Self {
        let ledger = kind
            .template()
            .map(|template| CompositePartLedger::new(kind.clone(), Some(template.clone())));
        Self {
            id: PartId::new(),
            kind,
            ledger,
        }
    }

    /// Reassemble a part from its parts, as when loading a save
    pub fn from_parts(id: PartId, kind: PartKind, ledger: Option<CompositePartLedger>) -> Self {
        Self { id, kind, ledger }
    }

    pub fn id(&self) -> PartId {
        self.id
    }

    pub fn kind(&self) -> &PartKind {
        &self.kind
    }

    pub fn label(&self) -> &str {
        self.kind.label()
    }

    pub fn ledger(&self) -> Option<&CompositePartLedger> {
        self.ledger.as_ref()
    }

    pub fn ledger_mut(&mut self) -> Option<&mut CompositePartLedger> {
        self.ledger.as_mut()
    }

    pub fn is_composite(&self) -> bool {
        self.ledger.is_some()
    }

    /// Market value after the incompleteness penalty
    pub fn market_value(&self) -> f32 {
        let missing = self.ledger.as_ref().map_or(0.0, CompositePartLedger::missing_value);
        self.kind.base_market_value() - missing
    }

    /// Destroy this part and everything included in it.
    ///
    /// Returns the number of parts destroyed, this one included.
    pub fn destroy(self) -> usize {
        1 + self.ledger.map_or(0, CompositePartLedger::destroy)
    }
}
