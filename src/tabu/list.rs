//! Short-term memory keyed by move signature.

use std::collections::HashMap;

use crate::neighborhood::MoveSignature;

/// Remaining tenure per forbidden move.
///
/// [`tick`](Self::tick) runs at the start of every iteration, so a move
/// inserted with tenure `t` is tabu for the next `t - 1` iterations.
///
/// # Examples
///
/// ```
/// use u_evrp::neighborhood::MoveSignature;
/// use u_evrp::tabu::TabuList;
///
/// let mv = MoveSignature::exchange(3, 1);
/// let mut list = TabuList::new();
/// list.insert(mv, 2);
///
/// list.tick();
/// assert!(list.is_tabu(&mv));
/// list.tick();
/// assert!(!list.is_tabu(&mv));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TabuList {
    tenures: HashMap<MoveSignature, usize>,
}

impl TabuList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_tabu(&self, signature: &MoveSignature) -> bool {
        self.tenures.contains_key(signature)
    }

    /// Decrements every tenure and forgets the expired ones.
    pub fn tick(&mut self) {
        self.tenures.retain(|_, left| {
            *left = left.saturating_sub(1);
            *left > 0
        });
    }

    /// Forbids `signature` for `tenure` ticks, replacing any older entry.
    pub fn insert(&mut self, signature: MoveSignature, tenure: usize) {
        if tenure > 0 {
            self.tenures.insert(signature, tenure);
        }
    }

    /// Number of moves currently tabu.
    pub fn len(&self) -> usize {
        self.tenures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tenures.is_empty()
    }
}
