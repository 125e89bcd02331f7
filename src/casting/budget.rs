//! Per-player casting ledger.
//!
//! Tracks the overland skill left this turn, the mana reserve, the queue of
//! overland spells waiting for skill, and how much has already been sunk into
//! the spell at the head of that queue.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::world::SpellId;

/// Result of putting one instalment of skill and mana into the queue head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueStep {
    /// Nothing could be spent: empty queue, no skill, or no mana.
    Stalled,
    /// Some was spent but the spell is not finished.
    Progressed { spent: u32 },
    /// The head spell is fully paid for and has been popped.
    Completed { spell: SpellId, spent: u32 },
}

/// Skill, mana and queue state for one player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CastingBudget {
    pub skill_remaining_this_turn: u32,
    pub mana_reserve: u32,
    pub queue: VecDeque<SpellId>,
    pub mana_spent_on_current: u32,
}

impl CastingBudget {
    /// Returns true if both skill and mana cover the cost this turn.
    pub fn can_cast_now(&self, cost: u32) -> bool {
        self.skill_remaining_this_turn >= cost && self.mana_reserve >= cost
    }

    /// Deducts a cost from both skill and mana. Callers check affordability first.
    pub fn charge(&mut self, cost: u32) {
        self.skill_remaining_this_turn = self.skill_remaining_this_turn.saturating_sub(cost);
        self.mana_reserve = self.mana_reserve.saturating_sub(cost);
    }

    /// Starts a new turn with the given skill allowance.
    pub fn reset_turn_skill(&mut self, skill: u32) {
        self.skill_remaining_this_turn = skill;
    }

    pub fn enqueue(&mut self, spell: SpellId) {
        self.queue.push_back(spell);
    }

    pub fn head(&self) -> Option<&SpellId> {
        self.queue.front()
    }

    /// Puts as much as possible towards the queue head, whose full cost is
    /// `head_cost`. Pops the head once it is fully paid.
    pub fn pay_towards_head(&mut self, head_cost: u32) -> QueueStep {
        if self.queue.is_empty() {
            return QueueStep::Stalled;
        }
        let remaining = head_cost.saturating_sub(self.mana_spent_on_current);
        let spend = remaining
            .min(self.skill_remaining_this_turn)
            .min(self.mana_reserve);

        // A zero-cost head still completes; anything else needs funds.
        if spend == 0 && remaining > 0 {
            return QueueStep::Stalled;
        }

        self.charge(spend);
        self.mana_spent_on_current += spend;

        if self.mana_spent_on_current >= head_cost {
            self.mana_spent_on_current = 0;
            match self.queue.pop_front() {
                Some(spell) => QueueStep::Completed { spell, spent: spend },
                None => QueueStep::Stalled,
            }
        } else {
            QueueStep::Progressed { spent: spend }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn budget(skill: u32, mana: u32, queued: usize) -> CastingBudget {
        let mut b = CastingBudget {
            skill_remaining_this_turn: skill,
            mana_reserve: mana,
            ..CastingBudget::default()
        };
        for _ in 0..queued {
            b.enqueue(SpellId::from("SP001"));
        }
        b
    }

    #[test]
    fn can_cast_now_needs_both() {
        let b = budget(10, 5, 0);
        assert!(b.can_cast_now(5));
        assert!(!b.can_cast_now(6));
        let b = budget(5, 10, 0);
        assert!(!b.can_cast_now(6));
    }

    #[test]
    fn pay_partial_then_complete() {
        let mut b = budget(3, 100, 1);
        assert_eq!(b.pay_towards_head(5), QueueStep::Progressed { spent: 3 });
        assert_eq!(b.mana_spent_on_current, 3);
        assert_eq!(b.skill_remaining_this_turn, 0);
        assert_eq!(b.mana_reserve, 97);

        b.reset_turn_skill(10);
        assert_eq!(
            b.pay_towards_head(5),
            QueueStep::Completed { spell: SpellId::from("SP001"), spent: 2 }
        );
        assert_eq!(b.mana_spent_on_current, 0);
        assert!(b.queue.is_empty());
        assert_eq!(b.skill_remaining_this_turn, 8);
    }

    #[test]
    fn mana_limits_spending() {
        let mut b = budget(10, 2, 1);
        assert_eq!(b.pay_towards_head(5), QueueStep::Progressed { spent: 2 });
        assert_eq!(b.mana_reserve, 0);
        assert_eq!(b.skill_remaining_this_turn, 8);
        assert_eq!(b.pay_towards_head(5), QueueStep::Stalled);
    }

    #[test]
    fn zero_skill_never_mutates() {
        let mut b = budget(0, 50, 2);
        b.mana_spent_on_current = 1;
        let before = b.clone();
        for _ in 0..5 {
            assert_eq!(b.pay_towards_head(5), QueueStep::Stalled);
        }
        assert_eq!(b, before);
    }

    #[test]
    fn empty_queue_stalls() {
        let mut b = budget(10, 10, 0);
        assert_eq!(b.pay_towards_head(5), QueueStep::Stalled);
        assert_eq!(b.skill_remaining_this_turn, 10);
    }
}
