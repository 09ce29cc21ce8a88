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

//! Composite part ledger
//!
//! A [`CompositePartLedger`] tracks the sub-parts bundled inside a composite
//! part (a bionic arm carrying its hands and power cell, say) against the
//! template of kinds the owner is expected to contain.
//!
//! Two derived values are memoized until the next mutation:
//! - **missing parts**: template kinds not matched one-to-one by a member
//! - **missing value**: market value lost to incompleteness, including that
//!   of nested composite members, clamped to a fraction of the owner's value
//!
//! Members are owned by value. A part moved into a ledger is unreachable
//! from anywhere else, so a part can never sit in two ledgers and a ledger
//! can never (transitively) contain itself.

use crate::catalog::{PartKind, Template};
use crate::ecs::components::Part;
use metrics::counter;
use partledger_common::{KindId, Location, PartId};
use std::collections::HashMap;
use std::sync::OnceLock;
use thiserror::Error;

/// Fraction of a missing kind's market value charged against the owner
pub const MISSING_PART_VALUE_FACTOR: f32 = 0.8;

/// Fraction of the owner's market value the penalty may never exceed
pub const MISSING_VALUE_CEILING_FACTOR: f32 = 0.8;

/// Errors reported by ledger mutations
///
/// These never leave the ledger in a modified state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Part {part} is not included in {owner}")]
    NotIncluded { owner: KindId, part: PartId },

    #[error("Part {0} is not placed in the world")]
    NotPlaced(PartId),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// World-side collaborator that holds parts while they are not in a ledger
#[cfg_attr(test, mockall::automock)]
pub trait Placement {
    /// Take a placed part out of the world so it can be included somewhere.
    /// Returns `None` if no such part is placed.
    fn withdraw(&mut self, id: PartId) -> Option<Part>;

    /// Put a released part back into the world near the given location
    fn place_near(&mut self, part: Part, near: Location);
}

/// Sub-part membership of one composite part, with memoized derived values
#[derive(Debug)]
pub struct CompositePartLedger {
    owner: PartKind,
    template: Option<Template>,
    members: Vec<Part>,
    missing_cache: OnceLock<Vec<PartKind>>,
    value_cache: OnceLock<f32>,
}

impl CompositePartLedger {
    /// Create an empty ledger for an owner of the given kind
    ///
    /// A ledger without a template has no expectations: nothing is ever
    /// missing from it.
    pub fn new(owner: PartKind, template: Option<Template>) -> Self {
        Self {
            owner,
            template,
            members: Vec::new(),
            missing_cache: OnceLock::new(),
            value_cache: OnceLock::new(),
        }
    }

    /// Create a ledger stocked with one fresh part per template entry
    pub fn stocked(owner: PartKind, template: Option<Template>) -> Self {
        let mut ledger = Self::new(owner, template);
        if let Some(template) = &ledger.template {
            ledger.members = template.iter().cloned().map(Part::make).collect();
        }
        ledger
    }

    pub fn owner(&self) -> &PartKind {
        &self.owner
    }

    pub fn template(&self) -> Option<&Template> {
        self.template.as_ref()
    }

    pub fn members(&self) -> &[Part] {
        &self.members
    }

    pub fn get(&self, id: PartId) -> Option<&Part> {
        self.members.iter().find(|p| p.id() == id)
    }

    pub fn contains(&self, id: PartId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Check if the template expects parts of this kind
    pub fn expects(&self, kind: &PartKind) -> bool {
        self.template
            .as_ref()
            .is_some_and(|t| t.expects(kind.id()))
    }

    /// Include a part.
    ///
    /// Parts of an unexpected kind are accepted with a warning.
    pub fn add_part(&mut self, part: Part) {
        if !self.expects(part.kind()) {
            tracing::warn!(
                "{} is not a valid subpart for {}",
                part.kind().label(),
                self.owner.label()
            );
        }

        tracing::debug!("Including {} ({}) in {}", part.kind().label(), part.id(), self.owner.label());
        self.members.push(part);
        self.dirty_cache();
    }

    /// Take a part out of the world and include it
    pub fn add_placed_part(&mut self, id: PartId, placement: &mut dyn Placement) -> LedgerResult<()> {
        let Some(part) = placement.withdraw(id) else {
            tracing::error!(
                "Tried to add {} to {} while it wasn't placed in the world",
                id,
                self.owner.label()
            );
            return Err(LedgerError::NotPlaced(id));
        };
        self.add_part(part);
        Ok(())
    }

    /// Release an included part to the caller
    ///
    /// Fails without touching the ledger if the part is not a member.
    pub fn remove_part(&mut self, id: PartId) -> LedgerResult<Part> {
        let Some(index) = self.members.iter().position(|p| p.id() == id) else {
            tracing::error!(
                "Tried to remove {} from {} while it wasn't actually included",
                id,
                self.owner.label()
            );
            return Err(LedgerError::NotIncluded {
                owner: self.owner.id().clone(),
                part: id,
            });
        };

        let part = self.members.swap_remove(index);
        self.dirty_cache();
        tracing::debug!("Released {} ({}) from {}", part.kind().label(), id, self.owner.label());
        Ok(part)
    }

    /// Release an included part and place it in the world near `near`
    pub fn remove_and_place_part(
        &mut self,
        id: PartId,
        placement: &mut dyn Placement,
        near: Location,
    ) -> LedgerResult<()> {
        let part = self.remove_part(id)?;
        placement.place_near(part, near);
        Ok(())
    }

    /// Replace the whole membership, as after loading a save
    pub fn replace_members(&mut self, members: Vec<Part>) {
        self.members = members;
        self.dirty_cache();
    }

    /// Template kinds not matched by a member, in template order
    ///
    /// Matching is one-to-one: a template of `[A, A, B]` with a single `A`
    /// member reports `[A, B]`.
    pub fn missing_parts(&self) -> &[PartKind] {
        let Some(template) = &self.template else {
            return &[];
        };
        self.missing_cache.get_or_init(|| {
            counter!("partledger.ledger.missing_parts.recomputed").increment(1);
            unmatched_kinds(template, &self.members)
        })
    }

    /// Market value lost because parts are missing
    ///
    /// Each missing kind costs [`MISSING_PART_VALUE_FACTOR`] of its value;
    /// composite members add their own missing value as is. The total never
    /// exceeds [`MISSING_VALUE_CEILING_FACTOR`] of the owner's value.
    pub fn missing_value(&self) -> f32 {
        *self.value_cache.get_or_init(|| {
            counter!("partledger.ledger.missing_value.recomputed").increment(1);

            let own: f32 = self
                .missing_parts()
                .iter()
                .map(|kind| kind.base_market_value() * MISSING_PART_VALUE_FACTOR)
                .sum();
            let nested: f32 = self
                .members
                .iter()
                .filter_map(Part::ledger)
                .map(CompositePartLedger::missing_value)
                .sum();
            let ceiling = (self.owner.base_market_value() * MISSING_VALUE_CEILING_FACTOR).max(0.0);

            (own + nested).clamp(0.0, ceiling)
        })
    }

    /// Check if any expected part is missing (ignores nested ledgers)
    pub fn is_incomplete(&self) -> bool {
        !self.missing_parts().is_empty()
    }

    /// Currently memoized missing parts, without computing them
    pub fn cached_missing_parts(&self) -> Option<&[PartKind]> {
        self.missing_cache.get().map(Vec::as_slice)
    }

    /// Currently memoized missing value, without computing it
    pub fn cached_missing_value(&self) -> Option<f32> {
        self.value_cache.get().copied()
    }

    /// Forget both memoized values
    pub fn dirty_cache(&mut self) {
        self.missing_cache.take();
        self.value_cache.take();
    }

    /// Destroy the ledger together with every member.
    ///
    /// Returns the number of parts destroyed, nested members included.
    pub fn destroy(self) -> usize {
        self.members.into_iter().map(Part::destroy).sum()
    }
}

fn unmatched_kinds(template: &Template, members: &[Part]) -> Vec<PartKind> {
    let mut available: HashMap<&KindId, usize> = HashMap::new();
    for member in members {
        *available.entry(member.kind().id()).or_default() += 1;
    }

    let mut missing = Vec::new();
    for expected in template {
        match available.get_mut(expected.id()) {
            Some(count) if *count > 0 => *count -= 1,
            _ => missing.push(expected.clone()),
        }
    }
    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;
    use uuid::Uuid;

    fn kind_a() -> PartKind {
        PartKind::simple("A", "part a", 50.0)
    }

    fn kind_b() -> PartKind {
        PartKind::simple("B", "part b", 25.0)
    }

    fn owner(value: f32, template: Template) -> PartKind {
        PartKind::composite("Owner", "owner", value, template)
    }

    fn ledger_with(template: Vec<PartKind>, members: Vec<PartKind>) -> CompositePartLedger {
        let template = Template::new(template);
        let mut ledger = CompositePartLedger::new(owner(1000.0, template.clone()), Some(template));
        ledger.replace_members(members.into_iter().map(Part::make).collect());
        ledger
    }

    fn ids(kinds: &[PartKind]) -> Vec<&str> {
        kinds.iter().map(|k| k.id().as_str()).collect()
    }

    fn here() -> Location {
        Location::new(Uuid::nil(), Uuid::nil())
    }

    #[test]
    fn test_dirty_cache_idempotent() {
        let mut ledger = ledger_with(vec![kind_a()], vec![]);
        ledger.missing_value();
        assert!(ledger.cached_missing_parts().is_some());
        assert!(ledger.cached_missing_value().is_some());

        ledger.dirty_cache();
        ledger.dirty_cache();
        assert!(ledger.cached_missing_parts().is_none());
        assert!(ledger.cached_missing_value().is_none());
    }

    #[test]
    fn test_missing_parts_with_duplicates() {
        let ledger = ledger_with(vec![kind_a(), kind_a(), kind_b()], vec![kind_a()]);
        assert_eq!(ids(ledger.missing_parts()), ["A", "B"]);
    }

    #[test]
    fn test_missing_parts_exact_match() {
        let ledger = ledger_with(vec![kind_a(), kind_b()], vec![kind_b(), kind_a()]);
        assert!(ledger.missing_parts().is_empty());
        assert!(!ledger.is_incomplete());
    }

    #[test]
    fn test_missing_parts_ignores_surplus_members() {
        let ledger = ledger_with(vec![kind_a()], vec![kind_a(), kind_a(), kind_b()]);
        assert!(ledger.missing_parts().is_empty());
    }

    #[test]
    fn test_missing_parts_template_order() {
        let ledger = ledger_with(vec![kind_b(), kind_a(), kind_b()], vec![]);
        assert_eq!(ids(ledger.missing_parts()), ["B", "A", "B"]);
    }

    #[test]
    fn test_no_template_means_no_expectations() {
        let ledger = CompositePartLedger::new(kind_a(), None);
        assert!(ledger.missing_parts().is_empty());
        assert!(ledger.cached_missing_parts().is_none());
        assert_eq!(ledger.missing_value(), 0.0);
    }

    #[test]
    fn test_missing_value_discounted() {
        let ledger = ledger_with(vec![kind_a(), kind_b()], vec![]);
        assert_eq!(ledger.missing_value(), (50.0 + 25.0) * 0.8);
    }

    #[test]
    fn test_missing_value_clamped_to_owner_ceiling() {
        let expensive = PartKind::simple("Core", "core", 125.0);
        let template = Template::new([expensive.clone(), expensive]);
        let ledger = CompositePartLedger::new(owner(100.0, template.clone()), Some(template));

        // 2 * 125 * 0.8 = 200, clamped to 100 * 0.8
        assert_eq!(ledger.missing_value(), 80.0);
        assert_eq!(ledger.cached_missing_value(), Some(80.0));
    }

    #[test]
    fn test_missing_value_zero_owner() {
        let template = Template::new([kind_a()]);
        let ledger = CompositePartLedger::new(owner(0.0, template.clone()), Some(template));
        assert_eq!(ledger.missing_value(), 0.0);
    }

    #[test]
    fn test_nested_missing_value_not_discounted_twice() {
        let finger = PartKind::simple("Finger", "finger", 50.0);
        let hand = PartKind::composite(
            "Hand",
            "hand",
            400.0,
            Template::new([finger.clone(), finger]),
        );
        let arm_template = Template::new([hand.clone()]);
        let arm = PartKind::composite("Arm", "arm", 1000.0, arm_template.clone());

        let mut hand_part = Part::make(hand);
        let hand_ledger = hand_part.ledger_mut().unwrap();
        let finger_id = hand_ledger.members()[0].id();
        hand_ledger.remove_part(finger_id).unwrap();
        assert_eq!(hand_ledger.missing_value(), 40.0);

        let mut arm_ledger = CompositePartLedger::new(arm, Some(arm_template));
        arm_ledger.add_part(hand_part);
        assert!(arm_ledger.missing_parts().is_empty());
        assert_eq!(arm_ledger.missing_value(), 40.0);
    }

    #[test]
    fn test_nested_missing_value_subject_to_outer_ceiling() {
        let core = PartKind::simple("Core", "core", 500.0);
        let inner = PartKind::composite("Inner", "inner", 1000.0, Template::new([core]));
        let outer_template = Template::new([inner.clone()]);
        let outer = PartKind::composite("Outer", "outer", 200.0, outer_template.clone());

        let inner_part = Part::unstocked(inner);
        assert_eq!(inner_part.ledger().unwrap().missing_value(), 400.0);

        let mut ledger = CompositePartLedger::new(outer, Some(outer_template));
        ledger.add_part(inner_part);
        assert_eq!(ledger.missing_value(), 160.0);
    }

    #[test]
    fn test_add_invalidates_cache() {
        let mut ledger = ledger_with(vec![kind_a(), kind_b()], vec![kind_a()]);
        assert_eq!(ids(ledger.missing_parts()), ["B"]);
        assert_eq!(ledger.missing_value(), 20.0);

        ledger.add_part(Part::make(kind_b()));
        assert!(ledger.cached_missing_parts().is_none());
        assert!(ledger.missing_parts().is_empty());
        assert_eq!(ledger.missing_value(), 0.0);
    }

    #[test]
    fn test_remove_invalidates_cache() {
        let mut ledger = ledger_with(vec![kind_a(), kind_b()], vec![kind_a(), kind_b()]);
        assert_eq!(ledger.missing_value(), 0.0);

        let b = ledger.members()[1].id();
        let removed = ledger.remove_part(b).unwrap();
        assert_eq!(removed.id(), b);
        assert_eq!(ids(ledger.missing_parts()), ["B"]);
        assert_eq!(ledger.missing_value(), 20.0);
    }

    #[test]
    fn test_remove_then_readd_restores_values() {
        let mut ledger = ledger_with(vec![kind_a(), kind_a(), kind_b()], vec![kind_a(), kind_b()]);
        let before_parts = ids(ledger.missing_parts()).join(",");
        let before_value = ledger.missing_value();

        let a = ledger.members()[0].id();
        let part = ledger.remove_part(a).unwrap();
        assert_ne!(ledger.missing_value(), before_value);

        ledger.add_part(part);
        assert_eq!(ids(ledger.missing_parts()).join(","), before_parts);
        assert_eq!(ledger.missing_value(), before_value);
    }

    #[test]
    #[traced_test]
    fn test_failed_remove_is_noop() {
        let mut ledger = ledger_with(vec![kind_a(), kind_b()], vec![kind_a()]);
        ledger.missing_value();
        let members: Vec<PartId> = ledger.members().iter().map(Part::id).collect();

        let stranger = PartId::new();
        let result = ledger.remove_part(stranger);

        assert_eq!(
            result.err(),
            Some(LedgerError::NotIncluded {
                owner: KindId::from("Owner"),
                part: stranger,
            })
        );
        assert_eq!(ledger.members().iter().map(Part::id).collect::<Vec<_>>(), members);
        assert_eq!(ids(ledger.cached_missing_parts().unwrap()), ["B"]);
        assert_eq!(ledger.cached_missing_value(), Some(20.0));
        assert!(logs_contain("wasn't actually included"));
    }

    #[test]
    #[traced_test]
    fn test_invalid_add_still_succeeds() {
        let mut ledger = ledger_with(vec![kind_a()], vec![]);
        let stray = PartKind::simple("Stray", "stray bolt", 5.0);

        ledger.add_part(Part::make(stray));

        assert_eq!(ledger.len(), 1);
        assert_eq!(ids(ledger.missing_parts()), ["A"]);
        assert!(logs_contain("stray bolt is not a valid subpart for owner"));
    }

    #[test]
    #[traced_test]
    fn test_valid_add_does_not_warn() {
        let mut ledger = ledger_with(vec![kind_a()], vec![]);
        ledger.add_part(Part::make(kind_a()));
        assert!(!logs_contain("is not a valid subpart"));
    }

    #[test]
    fn test_stocked_ledger_is_complete() {
        let template = Template::new([kind_a(), kind_a(), kind_b()]);
        let ledger = CompositePartLedger::stocked(owner(500.0, template.clone()), Some(template));
        assert_eq!(ledger.len(), 3);
        assert!(ledger.missing_parts().is_empty());
        assert_eq!(ledger.missing_value(), 0.0);
    }

    #[test]
    fn test_destroy_counts_nested_members() {
        let finger = PartKind::simple("Finger", "finger", 50.0);
        let hand = PartKind::composite("Hand", "hand", 400.0, Template::new([finger.clone(), finger]));
        let template = Template::new([hand.clone(), hand]);
        let ledger = CompositePartLedger::stocked(owner(1000.0, template.clone()), Some(template));

        // two hands, each with two fingers
        assert_eq!(ledger.destroy(), 6);
    }

    #[test]
    fn test_remove_and_place_hands_part_to_placement() {
        let mut ledger = ledger_with(vec![kind_a()], vec![kind_a()]);
        let a = ledger.members()[0].id();

        let mut placement = MockPlacement::new();
        placement
            .expect_place_near()
            .withf(move |part, near| part.id() == a && *near == Location::new(Uuid::nil(), Uuid::nil()))
            .times(1)
            .return_const(());

        ledger.remove_and_place_part(a, &mut placement, here()).unwrap();
        assert!(ledger.is_empty());
        assert_eq!(ids(ledger.missing_parts()), ["A"]);
    }

    #[test]
    fn test_failed_remove_does_not_place() {
        let mut ledger = ledger_with(vec![kind_a()], vec![kind_a()]);
        let mut placement = MockPlacement::new();
        placement.expect_place_near().times(0);

        assert!(ledger.remove_and_place_part(PartId::new(), &mut placement, here()).is_err());
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_add_placed_part_withdraws_from_world() {
        let mut ledger = ledger_with(vec![kind_a()], vec![]);
        ledger.missing_value();

        let part = Part::make(kind_a());
        let id = part.id();
        let mut slot = Some(part);
        let mut placement = MockPlacement::new();
        placement
            .expect_withdraw()
            .withf(move |requested| *requested == id)
            .times(1)
            .returning(move |_| slot.take());

        ledger.add_placed_part(id, &mut placement).unwrap();
        assert!(ledger.contains(id));
        assert!(ledger.cached_missing_value().is_none());
        assert!(ledger.missing_parts().is_empty());
    }

    #[test]
    fn test_add_unplaced_part_fails() {
        let mut ledger = ledger_with(vec![kind_a()], vec![]);
        let mut placement = MockPlacement::new();
        placement.expect_withdraw().returning(|_| None);

        let id = PartId::new();
        assert_eq!(
            ledger.add_placed_part(id, &mut placement),
            Err(LedgerError::NotPlaced(id))
        );
        assert!(ledger.is_empty());
    }
}
