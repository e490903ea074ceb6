use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetGrant {
    Granted,
    Denied,
}

impl BudgetGrant {
    pub fn is_granted(self) -> bool {
        self == Self::Granted
    }
}

/// Shared per-tick allowance for the costlier AI operations.
///
/// A request is all-or-nothing: it is charged in full or denied without spending anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionBudget {
    limit: u32,
    spent: u32,
    exhaustion_count: u32,
}

impl ActionBudget {
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            spent: 0,
            exhaustion_count: 0,
        }
    }

    pub fn limit_for(base: u32, per_actor: u32, living_actors: usize) -> u32 {
        let living = u32::try_from(living_actors).unwrap_or(u32::MAX);
        base.saturating_add(per_actor.saturating_mul(living))
    }

    /// Start a new tick with a fresh limit.
    pub fn reset(&mut self, limit: u32) {
        self.limit = limit;
        self.spent = 0;
        self.exhaustion_count = 0;
    }

    pub fn request(&mut self, amount: u32) -> BudgetGrant {
        match self.spent.checked_add(amount) {
            Some(total) if total <= self.limit => {
                self.spent = total;
                BudgetGrant::Granted
            }
            _ => {
                self.exhaustion_count += 1;
                BudgetGrant::Denied
            }
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn spent(&self) -> u32 {
        self.spent
    }

    pub fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.spent)
    }

    pub fn exhaustion_count(&self) -> u32 {
        self.exhaustion_count
    }
}
