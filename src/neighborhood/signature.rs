//! Move identities used as tabu keys.

/// Operator kind plus the positional arguments of an applied move.
///
/// Two moves with equal signatures are treated as the same move by the tabu
/// memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveSignature {
    /// Tail swap after `pos_a` in `route_a` and after `pos_b` in `route_b`.
    TwoOptStar {
        route_a: usize,
        pos_a: usize,
        route_b: usize,
        pos_b: usize,
    },
    /// `node` moved to index `pos` of `route`.
    Relocate { node: usize, route: usize, pos: usize },
    /// Two customers swapped; `first < second`.
    Exchange { first: usize, second: usize },
    /// Recharger `station` moved to index `pos` of its own route.
    StationInRoute {
        station: usize,
        route: usize,
        pos: usize,
    },
}

impl MoveSignature {
    /// Exchange signature with the pair ordered.
    pub fn exchange(a: usize, b: usize) -> Self {
        Self::Exchange {
            first: a.min(b),
            second: a.max(b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exchange_is_symmetric() {
        assert_eq!(MoveSignature::exchange(5, 2), MoveSignature::exchange(2, 5));
    }
}
