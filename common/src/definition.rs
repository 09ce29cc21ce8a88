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

//! Raw part definitions as they appear in catalog files

use serde::{Deserialize, Serialize};

/// Identifier of a part kind (e.g. `"BionicArm"`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KindId(String);

impl KindId {
    /// Create a new kind identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for KindId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for KindId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for KindId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Definition of a part kind
///
/// A definition with `standard_children` describes a composite part: a
/// freshly made instance is stocked with one child per listed kind, in order,
/// and any of them may later go missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartDef {
    pub id: KindId,
    /// Human readable label
    pub label: String,
    /// Market value of a complete instance
    pub base_market_value: f32,
    /// Expected sub-part kinds, duplicates allowed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard_children: Option<Vec<KindId>>,
}

impl PartDef {
    /// Create a definition for a simple (non-composite) part
    pub fn new(id: impl Into<KindId>, label: impl Into<String>, base_market_value: f32) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            base_market_value,
            standard_children: None,
        }
    }

    /// Turn this definition into a composite with the given expected children
    pub fn with_children<I, K>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<KindId>,
    {
        self.standard_children = Some(children.into_iter().map(Into::into).collect());
        self
    }

    /// Check if this definition describes a composite part
    pub fn is_composite(&self) -> bool {
        self.standard_children.is_some()
    }
}
