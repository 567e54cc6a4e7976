//! Property tests: laws that hold for every input, not just the samples in
//! the unit tests.

use archc_core::domain::{
    PortDirection, TypeReference,
    classify::{DIRECTION_PRECEDENCE, DetectorId, Priority, Signal, decide},
    merge_custom_blocks,
};
use proptest::prelude::*;

// ============================================================================
// Type references
// ============================================================================

fn class_name() -> impl Strategy<Value = String> {
    "x[a-z]{0,4}(\\.x[a-z]{0,4}){0,2}\\.[A-Z][a-zA-Z0-9]{1,6}"
}

fn leaf() -> impl Strategy<Value = TypeReference> {
    prop_oneof![
        prop::sample::select(vec!["int", "long", "boolean", "double", "char"]).prop_map(|name| TypeReference::primitive(name)),
        class_name().prop_map(|name| TypeReference::class(name)),
        "[A-Z][0-9]?".prop_map(|name| TypeReference::type_variable(name)),
    ]
}

fn type_reference() -> impl Strategy<Value = TypeReference> {
    leaf().prop_recursive(3, 16, 3, |inner| {
        prop_oneof![
            inner.clone().prop_map(TypeReference::array_of),
            (class_name(), prop::collection::vec(inner, 1..3))
                .prop_map(|(name, arguments)| TypeReference::parameterized(name, arguments)),
        ]
    })
}

proptest! {
    #[test]
    fn type_reference_text_form_round_trips(reference in type_reference()) {
        let text = reference.to_string();
        prop_assert_eq!(TypeReference::parse(&text).ok(), Some(reference), "text: {}", text);
    }

    #[test]
    fn extra_whitespace_does_not_change_the_parse(reference in type_reference()) {
        let spaced = reference.to_string().replace('<', " < ").replace(',', " , ").replace('>', " > ");
        prop_assert_eq!(TypeReference::parse(&spaced).ok(), Some(reference));
    }
}

// ============================================================================
// Custom-block merge
// ============================================================================

fn body() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z][a-z ;=()]{0,24}", 0..4)
        .prop_map(|lines| lines.into_iter().map(|line| format!("{line}\n")).collect())
}

fn document(header: &str, notes: &str, extra: &str) -> String {
    format!(
        "# {header}\n// archc:custom-begin notes\n{notes}// archc:custom-end notes\nmiddle\n// archc:custom-begin extra\n{extra}// archc:custom-end extra\n"
    )
}

proptest! {
    #[test]
    fn merging_twice_changes_nothing(
        header in "[A-Za-z ]{1,12}",
        generated_notes in body(),
        user_notes in body(),
        user_extra in body(),
    ) {
        let generated = document(&header, &generated_notes, "");
        let existing = document("stale", &user_notes, &user_extra);

        let once = merge_custom_blocks(&generated, &existing).unwrap();
        let twice = merge_custom_blocks(&generated, &once.text).unwrap();

        prop_assert_eq!(&twice.text, &once.text);
        prop_assert_eq!(once.text, document(&header, &user_notes, &user_extra));
        prop_assert!(!twice.has_orphans());
    }

    #[test]
    fn merging_onto_fresh_output_is_identity(header in "[A-Za-z ]{1,12}", notes in body()) {
        let generated = document(&header, &notes, "");
        let merged = merge_custom_blocks(&generated, &generated).unwrap();
        prop_assert_eq!(merged.text, generated);
    }
}

// ============================================================================
// Signal precedence
// ============================================================================

fn direction() -> impl Strategy<Value = PortDirection> {
    prop_oneof![Just(PortDirection::Driving), Just(PortDirection::Driven)]
}

/// Any mix of present and absent signals from the non-explicit detectors.
fn lower_signals() -> impl Strategy<Value = Vec<Signal<PortDirection>>> {
    let weaker: Vec<(DetectorId, Priority)> = DIRECTION_PRECEDENCE
        .iter()
        .copied()
        .filter(|(_, priority)| *priority != Priority::Explicit)
        .collect();
    prop::collection::vec(
        (prop::sample::select(weaker), prop::option::of(direction())),
        0..6,
    )
    .prop_map(|entries| {
        entries
            .into_iter()
            .map(|((detector, priority), vote)| match vote {
                Some(vote) => Signal::present(detector, priority, vote, "generated"),
                None => Signal::absent(detector, priority, "generated"),
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn explicit_signal_always_wins(explicit in direction(), others in lower_signals()) {
        let mut signals = others;
        signals.push(Signal::present(DetectorId::ExplicitAnnotation, Priority::Explicit, explicit, "annotated"));

        let evidence = decide(signals, DIRECTION_PRECEDENCE);
        prop_assert_eq!(evidence.verdict(), Some(explicit));
        prop_assert_eq!(evidence.decided_by(), Some(DetectorId::ExplicitAnnotation));
        prop_assert!(!evidence.is_ambiguous());
    }

    #[test]
    fn weaker_signals_never_overturn_a_verdict(
        base in lower_signals(),
        extra in direction(),
    ) {
        let before = decide(base.clone(), DIRECTION_PRECEDENCE);
        let Some(decider) = before.decided_by() else {
            return Ok(());
        };
        let Some(&(_, decided_at)) = DIRECTION_PRECEDENCE.iter().find(|(id, _)| *id == decider) else {
            return Ok(());
        };
        let Some(&(weaker, weaker_priority)) = DIRECTION_PRECEDENCE
            .iter()
            .find(|(_, priority)| *priority > decided_at)
        else {
            return Ok(());
        };

        let mut signals = base;
        signals.push(Signal::present(weaker, weaker_priority, extra, "late"));
        let after = decide(signals, DIRECTION_PRECEDENCE);
        prop_assert_eq!(after.verdict(), before.verdict());
        prop_assert_eq!(after.decided_by(), Some(decider));
    }
}
