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

//! Partledger Common Types
//!
//! This crate defines the plain data shared between the ledger engine and
//! anything that feeds it definitions or reads its saves:
//! - Kind identifiers and raw part definitions (the catalog file format)
//! - Part instance identifiers
//! - World locations used when parts are placed outside a ledger

pub mod definition;
pub mod identity;
pub mod spatial;

pub use definition::{KindId, PartDef};
pub use identity::PartId;
pub use spatial::Location;
