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

//! Part catalog: resolved, shared part kinds
//!
//! Raw [`PartDef`]s name their expected children by [`KindId`]. The catalog
//! resolves those names into [`PartKind`] handles, so that every template
//! holds the kinds themselves (with their labels and market values) and a
//! ledger never needs to look anything up.
//!
//! Resolution rejects templates that (directly or indirectly) contain their
//! own kind. Such a catalog would make stocking a fresh part recurse forever.

use crate::ecs::components::Part;
use partledger_common::{KindId, PartDef};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while building or querying a catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Unknown part kind: {0}")]
    UnknownKind(KindId),

    #[error("Part kind {parent} expects unknown child kind {child}")]
    UnknownChild { parent: KindId, child: KindId },

    #[error("Part kind {0} is defined more than once")]
    DuplicateKind(KindId),

    #[error("Part kind {kind} has invalid base market value {value}")]
    InvalidValue { kind: KindId, value: f32 },

    #[error("Template cycle: {0}")]
    CyclicTemplate(String),

    #[error("Failed to open catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse catalog file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

struct KindData {
    id: KindId,
    label: String,
    base_market_value: f32,
    template: Option<Template>,
}

/// Shared handle to a resolved part kind
///
/// Cheap to clone. Two handles are equal when their ids are equal.
#[derive(Clone)]
pub struct PartKind(Arc<KindData>);

impl PartKind {
    /// Create a simple (non-composite) kind
    pub fn simple(id: impl Into<KindId>, label: impl Into<String>, base_market_value: f32) -> Self {
        Self(Arc::new(KindData {
            id: id.into(),
            label: label.into(),
            base_market_value,
            template: None,
        }))
    }

    /// Create a composite kind expecting the given template
    pub fn composite(
        id: impl Into<KindId>,
        label: impl Into<String>,
        base_market_value: f32,
        template: Template,
    ) -> Self {
        Self(Arc::new(KindData {
            id: id.into(),
            label: label.into(),
            base_market_value,
            template: Some(template),
        }))
    }

    pub fn id(&self) -> &KindId {
        &self.0.id
    }

    pub fn label(&self) -> &str {
        &self.0.label
    }

    pub fn base_market_value(&self) -> f32 {
        self.0.base_market_value
    }

    /// Expected sub-part kinds, if this kind is composite
    pub fn template(&self) -> Option<&Template> {
        self.0.template.as_ref()
    }

    pub fn is_composite(&self) -> bool {
        self.0.template.is_some()
    }
}

impl PartialEq for PartKind {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for PartKind {}

impl std::hash::Hash for PartKind {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl std::fmt::Debug for PartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PartKind").field(&self.0.id).finish()
    }
}

impl std::fmt::Display for PartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.label)
    }
}

/// Ordered, read-only list of expected sub-part kinds
///
/// Shared by every ledger of the same owner kind. Repeated kinds are
/// meaningful: `[Hand, Hand]` expects two hands.
#[derive(Debug, Clone, PartialEq)]
pub struct Template(Arc<[PartKind]>);

impl Template {
    pub fn new(kinds: impl IntoIterator<Item = PartKind>) -> Self {
        Self(kinds.into_iter().collect())
    }

    pub fn kinds(&self) -> &[PartKind] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PartKind> {
        self.0.iter()
    }

    /// Check if the template expects at least one part of the given kind
    pub fn expects(&self, kind: &KindId) -> bool {
        self.0.iter().any(|k| k.id() == kind)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a Template {
    type Item = &'a PartKind;
    type IntoIter = std::slice::Iter<'a, PartKind>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Catalog of resolved part kinds
#[derive(Debug, Default)]
pub struct PartCatalog {
    kinds: HashMap<KindId, PartKind>,
    /// Definition order, for stable listings
    order: Vec<KindId>,
}

impl PartCatalog {
    /// Resolve a set of raw definitions
    pub fn from_defs(defs: impl IntoIterator<Item = PartDef>) -> CatalogResult<Self> {
        let mut by_id = HashMap::new();
        let mut order = Vec::new();

        for def in defs {
            if !def.base_market_value.is_finite() || def.base_market_value < 0.0 {
                return Err(CatalogError::InvalidValue {
                    kind: def.id,
                    value: def.base_market_value,
                });
            }
            if by_id.contains_key(&def.id) {
                return Err(CatalogError::DuplicateKind(def.id));
            }
            order.push(def.id.clone());
            by_id.insert(def.id.clone(), def);
        }

        let mut kinds = HashMap::with_capacity(by_id.len());
        let mut stack = Vec::new();
        for id in &order {
            resolve(id, &by_id, &mut kinds, &mut stack)?;
        }

        tracing::debug!("Resolved {} part kinds", kinds.len());
        Ok(Self { kinds, order })
    }

    /// Load and resolve a YAML catalog file
    pub fn load(path: impl AsRef<Path>) -> CatalogResult<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading part catalog from {}", path.display());
        let defs: Vec<PartDef> = serde_yaml::from_reader(std::fs::File::open(path)?)?;
        Self::from_defs(defs)
    }

    pub fn get(&self, id: &KindId) -> Option<&PartKind> {
        self.kinds.get(id)
    }

    /// Look up a kind, failing if it is not defined
    pub fn kind(&self, id: &KindId) -> CatalogResult<&PartKind> {
        self.kinds
            .get(id)
            .ok_or_else(|| CatalogError::UnknownKind(id.clone()))
    }

    /// Make a fresh, fully stocked part of the given kind
    pub fn make(&self, id: &KindId) -> CatalogResult<Part> {
        Ok(Part::make(self.kind(id)?.clone()))
    }

    /// All kinds in definition order
    pub fn kinds(&self) -> impl Iterator<Item = &PartKind> {
        self.order.iter().filter_map(|id| self.kinds.get(id))
    }

    /// All composite kinds in definition order
    pub fn composite_kinds(&self) -> impl Iterator<Item = &PartKind> {
        self.kinds().filter(|kind| kind.is_composite())
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

fn resolve(
    id: &KindId,
    defs: &HashMap<KindId, PartDef>,
    resolved: &mut HashMap<KindId, PartKind>,
    stack: &mut Vec<KindId>,
) -> CatalogResult<PartKind> {
    if let Some(kind) = resolved.get(id) {
        return Ok(kind.clone());
    }
    if let Some(start) = stack.iter().position(|s| s == id) {
        let cycle = stack[start..]
            .iter()
            .chain(std::iter::once(id))
            .map(KindId::as_str)
            .collect::<Vec<_>>()
            .join(" -> ");
        return Err(CatalogError::CyclicTemplate(cycle));
    }
    let Some(def) = defs.get(id) else {
        return Err(match stack.last() {
            Some(parent) => CatalogError::UnknownChild {
                parent: parent.clone(),
                child: id.clone(),
            },
            None => CatalogError::UnknownKind(id.clone()),
        });
    };

    stack.push(id.clone());
    let template = match &def.standard_children {
        Some(children) => {
            let mut kinds = Vec::with_capacity(children.len());
            for child in children {
                kinds.push(resolve(child, defs, resolved, stack)?);
            }
            Some(Template::new(kinds))
        }
        None => None,
    };
    stack.pop();

    let kind = PartKind(Arc::new(KindData {
        id: def.id.clone(),
        label: def.label.clone(),
        base_market_value: def.base_market_value,
        template,
    }));
    resolved.insert(id.clone(), kind.clone());
    Ok(kind)
}
