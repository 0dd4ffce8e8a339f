//! Proptest strategies for monitor inputs.

use proptest::prelude::*;

use shop_health_monitor::models::{CheckResult, IncidentKind};

/// Any of the four probe outcomes
pub fn check_result_strategy() -> impl Strategy<Value = CheckResult> {
    (any::<bool>(), any::<bool>()).prop_map(|(products_exist, shop_query_empty)| CheckResult {
        products_exist,
        shop_query_empty,
    })
}

pub fn incident_kind_strategy() -> impl Strategy<Value = IncidentKind> {
    prop_oneof![
        Just(IncidentKind::Info),
        Just(IncidentKind::Warning),
        Just(IncidentKind::Failure),
        Just(IncidentKind::Recovery),
        Just(IncidentKind::Test),
    ]
}

/// Sequences of probe outcomes long enough to overflow the incident log
pub fn cycle_sequence_strategy() -> impl Strategy<Value = Vec<CheckResult>> {
    prop::collection::vec(check_result_strategy(), 1..40)
}
