//! End-to-end count-up runs driven by a simulated display refresh
//!
//! These tests verify that:
//! - Runs finish on the rounded end value, with or without a smart-easing split
//! - Emitted values never move away from the target
//! - Formatting options reach the display target
//! - Invalid input and zero durations are handled without animating

use blinc_countup::{
    CountUp, CountUpError, CountUpOptions, CountUpState, FrameQueue, Label, SharedLabel,
    TargetRegistry,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

type Engine = CountUp<SharedLabel, FrameQueue>;

const FRAME_MS: f64 = 1000.0 / 60.0;

fn engine() -> (Engine, SharedLabel) {
    let label = Label::shared();
    let engine = CountUp::new(FrameQueue::new()).with_target(label.clone());
    (engine, label)
}

fn text(label: &SharedLabel) -> String {
    label.borrow().as_str().to_string()
}

/// Pump frames at 60fps until the engine stops running; returns the next timestamp
fn run_to_completion(engine: &mut Engine, mut now: f64) -> f64 {
    for _ in 0..100_000 {
        if engine.state() != CountUpState::Running {
            break;
        }
        engine.advance(now);
        now += FRAME_MS;
    }
    now
}

/// Parse the default-formatted history back into numbers
fn emitted_values(label: &SharedLabel) -> Vec<f64> {
    label
        .borrow()
        .history()
        .iter()
        .map(|s| s.replace(',', "").parse::<f64>().unwrap())
        .collect()
}

fn assert_monotonic(values: &[f64], counting_down: bool) {
    for pair in values.windows(2) {
        if counting_down {
            assert!(pair[1] <= pair[0], "count-down went up: {pair:?}");
        } else {
            assert!(pair[1] >= pair[0], "count-up went down: {pair:?}");
        }
    }
}

#[test]
fn test_thousand_finishes_after_settle_phase() {
    let (mut engine, label) = engine();
    engine.configure(Some(1000.into()), None, CountUpOptions::new());
    engine.start();

    // 1000 is past the default threshold: a 1s linear run to 667 first
    engine.advance(0.0);
    engine.advance(2000.0);
    assert_eq!(text(&label), "667");
    assert_eq!(engine.state(), CountUpState::Running);

    // Then an eased settle over the same halved duration
    engine.advance(2016.0);
    assert_eq!(text(&label), "667");
    engine.advance(3016.0);
    assert_eq!(text(&label), "1,000");
    assert_eq!(engine.state(), CountUpState::Completed);
}

#[test]
fn test_below_threshold_finishes_in_two_ticks() {
    let (mut engine, label) = engine();
    engine.configure(Some(999.into()), None, CountUpOptions::new());
    engine.start();

    engine.advance(0.0);
    engine.advance(2000.0);
    assert_eq!(text(&label), "999");
    assert_eq!(engine.state(), CountUpState::Completed);
}

#[test]
fn test_smart_easing_split_for_two_thousand() {
    let (mut engine, label) = engine();
    engine.configure(
        Some(2000.into()),
        None,
        CountUpOptions::new().smart_easing(999.0, 333.0).duration(2.0),
    );
    engine.start();

    let run = engine.run_state();
    assert_eq!(run.end_value, 1667.0);
    assert_eq!(run.final_end_value, Some(2000.0));
    assert_eq!(run.duration_ms, 1000.0);
    assert!(!run.use_easing);

    engine.advance(0.0);
    engine.advance(500.0);
    assert_eq!(text(&label), "834");
    engine.advance(1000.0);
    assert_eq!(text(&label), "1,667");

    // Settle phase: no split left, easing back on, halved duration kept
    let run = engine.run_state();
    assert_eq!(run.final_end_value, None);
    assert_eq!(run.end_value, 2000.0);
    assert_eq!(run.start_value, 1667.0);
    assert_eq!(run.duration_ms, 1000.0);
    assert!(run.use_easing);

    engine.advance(1016.0);
    engine.advance(1516.0);
    engine.advance(2016.0);
    assert_eq!(text(&label), "2,000");
    assert_eq!(engine.state(), CountUpState::Completed);
    assert_monotonic(&emitted_values(&label), false);
}

#[test]
fn test_emitted_values_are_monotonic() {
    // (start, end, decimals, threshold, amount)
    let cases: [(f64, f64, i32, f64, f64); 11] = [
        (0.0, 500.0, 0, 999.0, 333.0),
        (0.0, 25_000.0, 0, 999.0, 333.0),
        (25_000.0, 0.0, 0, 999.0, 333.0),
        (-300.0, 1200.0, 1, 999.0, 333.0),
        (10.0, -5.0, 2, 999.0, 333.0),
        (1.5, 1.75, 2, 999.0, 333.0),
        // Settle longer than the threshold
        (0.0, 1000.0, 0, 100.0, 333.0),
        (1000.0, 0.0, 0, 100.0, 333.0),
        // Settle longer than the whole distance
        (0.0, 1000.0, 0, 999.0, 2000.0),
        (0.0, -1000.0, 0, 999.0, 2000.0),
        // No settle at all
        (0.0, 5000.0, 0, 999.0, 0.0),
    ];
    for (start, end, decimals, threshold, amount) in cases {
        let (mut engine, label) = engine();
        engine.configure(
            Some(end.into()),
            None,
            CountUpOptions::new()
                .start_value(start)
                .decimal_places(decimals)
                .smart_easing(threshold, amount),
        );
        engine.start();
        run_to_completion(&mut engine, 0.0);

        assert_eq!(engine.state(), CountUpState::Completed, "{start} -> {end}");
        let values = emitted_values(&label);
        assert_monotonic(&values, start > end);

        let mult = 10f64.powi(decimals);
        let expected = (end * mult).round() / mult;
        assert_eq!(*values.last().unwrap(), expected, "{start} -> {end}");
        assert_eq!(engine.value(), expected);
    }
}

#[test]
fn test_split_run_converges_with_single_phase_run() {
    let (mut split, split_label) = engine();
    split.configure(Some(50_000.into()), None, CountUpOptions::new());
    split.start();
    assert!(split.run_state().final_end_value.is_some());
    run_to_completion(&mut split, 0.0);

    let (mut single, single_label) = engine();
    single.configure(
        Some(50_000.into()),
        None,
        CountUpOptions::new().smart_easing(f64::MAX, 333.0),
    );
    single.start();
    assert!(single.run_state().final_end_value.is_none());
    run_to_completion(&mut single, 0.0);

    assert_eq!(text(&split_label), "50,000");
    assert_eq!(text(&split_label), text(&single_label));
    assert_eq!(split.value(), single.value());
}

#[test]
fn test_invalid_end_value_blocks_start() {
    let (mut engine, label) = engine();
    engine.configure(Some("abc".into()), None, CountUpOptions::new());

    let err = engine.error().expect("error recorded");
    assert!(matches!(err, CountUpError::InvalidValue { .. }));
    assert!(err.to_string().contains("abc"));

    engine.start();
    assert_eq!(engine.state(), CountUpState::Idle);
    assert_eq!(engine.scheduler().requested_count(), 0);
    assert_eq!(engine.advance(0.0), 0);
    assert_eq!(label.borrow().history(), ["0"]);
}

#[test]
fn test_numeral_glyphs_with_decimals() {
    let (mut engine, label) = engine();
    engine.configure(
        Some(12.3.into()),
        None,
        CountUpOptions::new()
            .decimal_places(2)
            .duration(0.0)
            .numerals(["零", "一", "二", "三", "四", "五", "六", "七", "八", "九"]),
    );
    engine.start();
    assert_eq!(text(&label), "一二.三零");
}

#[test]
fn test_zero_duration_jumps_to_end() {
    let (mut engine, label) = engine();
    engine.configure(
        Some(4200.into()),
        None,
        CountUpOptions::new().duration(0.0).prefix("$"),
    );
    engine.start();

    assert_eq!(text(&label), "$4,200");
    assert_eq!(engine.state(), CountUpState::Completed);
    assert_eq!(engine.value(), 4200.0);
    assert_eq!(engine.scheduler().requested_count(), 0);
    assert_eq!(label.borrow().history().len(), 2);
}

#[test]
fn test_negative_duration_jumps_to_end() {
    let (mut engine, label) = engine();
    engine.configure(Some((-75).into()), None, CountUpOptions::new().duration(-1.0));
    engine.start();
    assert_eq!(text(&label), "-75");
    assert_eq!(engine.state(), CountUpState::Completed);
}

#[test]
fn test_completion_callback_fires_once_per_run() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let (mut engine, _label) = engine();
    engine.configure(Some(5000.into()), None, CountUpOptions::new());
    engine.start_with(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    // The split's hand-over to the settle phase is not a completion
    let now = run_to_completion(&mut engine, 0.0);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    engine.advance(now);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_named_target_resolves_through_scope() {
    let score = Label::shared();
    let mut registry = TargetRegistry::new();
    registry.insert("hud/score", score.clone());

    let mut engine: Engine = CountUp::new(FrameQueue::new()).with_scope(registry);
    engine.configure(
        Some(300.into()),
        Some("hud/score".into()),
        CountUpOptions::new().suffix(" pts"),
    );
    assert!(engine.error().is_none());

    engine.start();
    run_to_completion(&mut engine, 0.0);
    assert_eq!(text(&score), "300 pts");
}

#[test]
fn test_custom_formatter_and_easing() {
    let (mut engine, label) = engine();
    engine.configure(
        Some(100.into()),
        None,
        CountUpOptions::new()
            .formatter(|v| format!("{v:>5.1}%"))
            .easing(blinc_countup::Easing::custom(|t, b, c, d| b + c * (t / d).powi(2))),
    );
    engine.start();
    engine.advance(0.0);
    engine.advance(1000.0);
    assert_eq!(text(&label), " 25.0%");
    engine.advance(2000.0);
    assert_eq!(text(&label), "100.0%");
}
