//! Content lifecycle states and the moves permitted between them.

use crate::state_enum;

state_enum! {
    /// Publication lifecycle of a piece of marketing content, declared in
    /// lifecycle order.
    pub enum ContentState {
        Draft,
        Review,
        Approved,
        Published,
        Archived,
    }
}

impl ContentState {
    /// Whether the lifecycle allows moving directly from `self` to `to`.
    pub fn permits(self, to: ContentState) -> bool {
        use ContentState::*;

        match self {
            Draft => matches!(to, Review | Archived),
            Review => matches!(to, Approved | Draft | Archived),
            Approved => matches!(to, Published | Draft | Archived),
            Published => matches!(to, Archived),
            Archived => matches!(to, Draft),
        }
    }

    /// States reachable in one move, ignoring transition conditions.
    pub fn successors(self) -> impl Iterator<Item = ContentState> {
        Self::ALL.iter().copied().filter(move |to| self.permits(*to))
    }
}
