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

//! Player-facing descriptions of composite parts
//!
//! Everything here is pulled on demand from the ledger; nothing is pushed
//! or stored.

use crate::ecs::components::Part;
use crate::ledger::CompositePartLedger;
use partledger_common::PartId;
use serde::Serialize;

/// Display priority of subpart stat rows
pub const SUBPART_STAT_PRIORITY: i32 = 2500;

/// One row of an item's stat sheet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatEntry {
    pub label: String,
    pub value: String,
    /// Explanation shown when the row is selected
    pub report: String,
    pub display_priority: i32,
    /// Labels of the parts the row refers to
    pub links: Vec<String>,
}

/// One line summary, e.g. `Includes 3 subparts (incomplete).`
pub fn inspect_line(ledger: &CompositePartLedger) -> String {
    let count = ledger.len();
    format!(
        "Includes {} {}{}.",
        count,
        if count != 1 { "subparts" } else { "subpart" },
        if ledger.is_incomplete() { " (incomplete)" } else { "" }
    )
}

/// Stat rows for included and missing subparts
pub fn display_stats(ledger: &CompositePartLedger) -> Vec<StatEntry> {
    let included: Vec<String> = ledger.members().iter().map(|p| p.label().to_string()).collect();
    let missing: Vec<String> = ledger
        .missing_parts()
        .iter()
        .map(|k| k.label().to_string())
        .collect();

    let mut stats = vec![StatEntry {
        label: "Included subparts".to_string(),
        value: included.len().to_string(),
        report: "When implanted it will also install these.".to_string(),
        display_priority: SUBPART_STAT_PRIORITY,
        links: included,
    }];

    if !missing.is_empty() {
        stats.push(StatEntry {
            label: "Missing subparts".to_string(),
            value: missing.len().to_string(),
            report: "These parts are missing.".to_string(),
            display_priority: SUBPART_STAT_PRIORITY,
            links: missing,
        });
    }

    stats
}

/// Everything worth showing about one part
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartReport {
    pub id: PartId,
    pub label: String,
    pub base_market_value: f32,
    pub market_value: f32,
    pub missing_value: f32,
    pub inspect: Option<String>,
    pub stats: Vec<StatEntry>,
}

impl PartReport {
    pub fn of(part: &Part) -> Self {
        let ledger = part.ledger();
        Self {
            id: part.id(),
            label: part.label().to_string(),
            base_market_value: part.kind().base_market_value(),
            market_value: part.market_value(),
            missing_value: ledger.map_or(0.0, CompositePartLedger::missing_value),
            inspect: ledger.map(inspect_line),
            stats: ledger.map(display_stats).unwrap_or_default(),
        }
    }
}

impl std::fmt::Display for PartReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} [{}]", self.label, self.id)?;
        writeln!(
            f,
            "  value {:.2} of {:.2} (missing {:.2})",
            self.market_value, self.base_market_value, self.missing_value
        )?;
        if let Some(inspect) = &self.inspect {
            writeln!(f, "  {}", inspect)?;
        }
        for stat in &self.stats {
            writeln!(f, "  {}: {} ({})", stat.label, stat.value, stat.links.join(", "))?;
        }
        Ok(())
    }
}
