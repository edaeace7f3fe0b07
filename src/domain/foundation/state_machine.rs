//! State machine trait for status enums.
//!
//! Status enums list their outgoing edges once; membership checks, validated
//! transitions, and terminal detection are derived from that list.

use super::ValidationError;

/// Trait for status enums that represent state machines.
///
/// # Example
///
/// ```ignore
/// impl StateMachine for CodeStatus {
///     fn valid_transitions(&self) -> &'static [Self] {
///         match self {
///             CodeStatus::Active => &[CodeStatus::Used, CodeStatus::Expired],
///             CodeStatus::Used | CodeStatus::Expired => &[],
///         }
///     }
/// }
///
/// let next = CodeStatus::Active.transition_to(CodeStatus::Used)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug + 'static {
    /// All states reachable in one step from `self`.
    fn valid_transitions(&self) -> &'static [Self];

    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    /// Performs transition with validation, returning error if invalid.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// Checks if current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Ticket {
        Issued,
        Scanned,
        Voided,
    }

    impl StateMachine for Ticket {
        fn valid_transitions(&self) -> &'static [Self] {
            match self {
                Ticket::Issued => &[Ticket::Scanned, Ticket::Voided],
                Ticket::Scanned | Ticket::Voided => &[],
            }
        }
    }

    #[test]
    fn listed_edge_is_allowed() {
        assert_eq!(Ticket::Issued.transition_to(Ticket::Scanned), Ok(Ticket::Scanned));
    }

    #[test]
    fn unlisted_edge_is_rejected() {
        let err = Ticket::Scanned.transition_to(Ticket::Voided).unwrap_err();
        assert!(err.to_string().contains("Cannot transition from Scanned to Voided"));
    }

    #[test]
    fn self_loop_is_not_implied() {
        assert!(!Ticket::Issued.can_transition_to(&Ticket::Issued));
    }

    #[test]
    fn states_without_edges_are_terminal() {
        assert!(!Ticket::Issued.is_terminal());
        assert!(Ticket::Scanned.is_terminal());
        assert!(Ticket::Voided.is_terminal());
    }
}
