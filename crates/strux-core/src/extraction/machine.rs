//! Loop phases and the transition function.

use serde::Serialize;

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The last candidate passed every check.
    Valid,
    /// The attempt budget ran out with errors remaining.
    BudgetExhausted,
}

/// Phase of one extraction request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    Init,
    Extracting,
    Validating,
    Retry,
    Done(Termination),
}

impl LoopPhase {
    pub fn is_done(&self) -> bool {
        matches!(self, LoopPhase::Done(_))
    }
}

/// Next phase given the current one and what the last step produced.
///
/// `is_valid` and `attempt_count` are only consulted when leaving
/// `Validating`. The budget check is `>=`, so exactly `max_attempts`
/// oracle calls are made before giving up.
pub fn transition(phase: LoopPhase, is_valid: bool, attempt_count: u32, max_attempts: u32) -> LoopPhase {
    match phase {
        LoopPhase::Init => LoopPhase::Extracting,
        LoopPhase::Extracting => LoopPhase::Validating,
        LoopPhase::Validating if is_valid => LoopPhase::Done(Termination::Valid),
        LoopPhase::Validating if attempt_count >= max_attempts => {
            LoopPhase::Done(Termination::BudgetExhausted)
        }
        LoopPhase::Validating => LoopPhase::Retry,
        LoopPhase::Retry => LoopPhase::Extracting,
        LoopPhase::Done(t) => LoopPhase::Done(t),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconditional_edges() {
        assert_eq!(transition(LoopPhase::Init, false, 0, 3), LoopPhase::Extracting);
        assert_eq!(transition(LoopPhase::Extracting, false, 1, 3), LoopPhase::Validating);
        assert_eq!(transition(LoopPhase::Retry, false, 1, 3), LoopPhase::Extracting);
    }

    #[test]
    fn test_validating_edges() {
        assert_eq!(
            transition(LoopPhase::Validating, true, 1, 3),
            LoopPhase::Done(Termination::Valid)
        );
        assert_eq!(transition(LoopPhase::Validating, false, 2, 3), LoopPhase::Retry);
        assert_eq!(
            transition(LoopPhase::Validating, false, 3, 3),
            LoopPhase::Done(Termination::BudgetExhausted)
        );
    }

    #[test]
    fn test_success_wins_on_last_attempt() {
        assert_eq!(
            transition(LoopPhase::Validating, true, 3, 3),
            LoopPhase::Done(Termination::Valid)
        );
    }

    #[test]
    fn test_done_is_absorbing() {
        let done = LoopPhase::Done(Termination::BudgetExhausted);
        assert_eq!(transition(done, true, 0, 3), done);
        assert!(done.is_done());
        assert!(!LoopPhase::Retry.is_done());
    }

    #[test]
    fn test_walk_always_invalid() {
        let mut phase = LoopPhase::Init;
        let mut attempts = 0;
        while !phase.is_done() {
            if phase == LoopPhase::Extracting {
                attempts += 1;
            }
            phase = transition(phase, false, attempts, 3);
        }
        assert_eq!(attempts, 3);
        assert_eq!(phase, LoopPhase::Done(Termination::BudgetExhausted));
    }
}
