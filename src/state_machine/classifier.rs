use super::events::Transition;
use super::states::HealthState;
use crate::models::CheckResult;

/// Map a probe result onto a health state.
///
/// Either signal reporting emptiness makes the listing `Empty`.
pub fn classify(result: &CheckResult) -> HealthState {
    if !result.products_exist || result.shop_query_empty {
        HealthState::Empty
    } else {
        HealthState::Ok
    }
}

/// Decide which transition a cycle observed.
///
/// Precedence: desync, then new failure, then recovery, else steady. A new
/// failure is always reported with `recovered_immediately: false`; the engine
/// fills that in after its re-probe.
pub fn detect_transition(previous: HealthState, result: &CheckResult) -> Transition {
    let current = classify(result);

    if result.is_desync() {
        return Transition::Desync;
    }

    if previous != HealthState::Empty && current == HealthState::Empty {
        return Transition::NewFailure {
            recovered_immediately: false,
        };
    }

    if previous == HealthState::Empty && current == HealthState::Ok {
        return Transition::Recovery;
    }

    Transition::Steady
}
