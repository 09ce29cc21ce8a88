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

//! Composite part ledger engine
//!
//! A catalog of part kinds, ledgers that track which parts a composite part
//! currently includes, a hecs world holding every placed part, and JSON
//! persistence of that world.

pub mod catalog;
pub mod config;
pub mod ecs;
pub mod ledger;
pub mod persistence;
pub mod presentation;

pub use catalog::{CatalogError, PartCatalog, PartKind, Template};
pub use ledger::{CompositePartLedger, LedgerError, Placement};
