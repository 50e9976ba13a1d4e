// Property tests over arbitrary symbol streams.

use contact_bits::context::{ContextTracker, MarkovKey};
use contact_bits::divergence::report;
use contact_bits::event::{RecordingSink, TimedEvent};
use contact_bits::markov::{EmissionTable, GATE_TICKS, STEP_TICKS, TAIL_TICKS};
use contact_bits::pipeline::analyze;
use contact_bits::symbol::{Symbol, SymbolStream};
use proptest::prelude::*;

fn symbols() -> impl Strategy<Value = Vec<Symbol>> {
    prop::collection::vec((0u8..4).prop_map(|c| Symbol::from_code(c).unwrap()), 0..300)
}

/// Raw input lines, some of them malformed.
fn raw_lines() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop_oneof![
            4 => "[01]{2}",
            1 => "[01]{0,1}",
            1 => "[01x]{3,4}",
        ],
        0..200,
    )
}

/// Split recorded events into per-step chunks: each step ends with its
/// trailing delta.
fn steps(events: &[TimedEvent]) -> Vec<Vec<TimedEvent>> {
    let mut out = Vec::new();
    let mut current = Vec::new();
    let mut deltas = 0;
    for &event in events {
        current.push(event);
        if let TimedEvent::Delta(_) = event {
            deltas += 1;
            if deltas == 2 {
                out.push(std::mem::take(&mut current));
                deltas = 0;
            }
        }
    }
    assert!(current.is_empty(), "trailing partial step: {current:?}");
    out
}

proptest! {
    #[test]
    fn every_step_has_two_deltas_and_balanced_notes(input in symbols()) {
        let stream = SymbolStream::from_symbols(input.clone());
        let mut sink = RecordingSink::new();
        analyze(&stream, &EmissionTable::default(), &mut sink).unwrap();

        let steps = steps(&sink.events());
        prop_assert_eq!(steps.len(), input.len());
        for step in &steps {
            let deltas: Vec<u32> = step.iter().filter_map(|e| match e {
                TimedEvent::Delta(t) => Some(*t),
                _ => None,
            }).collect();
            prop_assert_eq!(deltas, vec![GATE_TICKS, TAIL_TICKS]);

            let gate = step.iter().position(|e| *e == TimedEvent::Delta(GATE_TICKS)).unwrap();
            let ons: Vec<u8> = step[..gate].iter().filter_map(|e| match e {
                TimedEvent::NoteOn { pitch, .. } => Some(*pitch),
                _ => None,
            }).collect();
            let offs: Vec<u8> = step[gate..].iter().filter_map(|e| match e {
                TimedEvent::NoteOff { pitch } => Some(*pitch),
                _ => None,
            }).collect();
            prop_assert_eq!(ons.len() + offs.len() + 2, step.len());
            prop_assert_eq!(ons, offs);
        }
        prop_assert_eq!(sink.total_ticks(), u64::from(STEP_TICKS) * input.len() as u64);
    }

    #[test]
    fn silent_context_never_sounds(input in symbols()) {
        let table = EmissionTable::default();
        let mut tracker = ContextTracker::new();
        for symbol in input {
            let key = tracker.current().markov_key();
            if key == MarkovKey::SILENT {
                let events = table.encode(key, symbol);
                prop_assert!(events.iter().all(|e| matches!(e, TimedEvent::Delta(_))));
            }
            tracker.advance(symbol);
        }
    }

    #[test]
    fn report_is_bounded_sorted_and_normalized(input in symbols()) {
        let stream = SymbolStream::from_symbols(input);
        let mut sink = RecordingSink::new();
        let table = analyze(&stream, &EmissionTable::default(), &mut sink).unwrap();
        let report = report(&table);

        for pair in report.entries.windows(2) {
            prop_assert!(pair[0].key < pair[1].key);
            prop_assert!(pair[0].key.to_string() < pair[1].key.to_string());
        }
        for entry in &report.entries {
            prop_assert!(entry.samples > 0);
            prop_assert!((0.0..=1.0).contains(&entry.divergence));
            let sum: f64 = entry.probabilities.iter().sum();
            prop_assert!((sum - 1.0).abs() < 1e-9);
        }
        if let Some(global) = report.global {
            let sum: f64 = global.iter().sum();
            prop_assert!((sum - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn pipeline_is_pure(lines in raw_lines()) {
        let input = lines.join("\n");
        let run = || {
            let stream = SymbolStream::decode(input.as_bytes());
            let mut sink = RecordingSink::new();
            let table = analyze(&stream, &EmissionTable::default(), &mut sink).unwrap();
            (sink, report(&table))
        };
        let (sink_a, report_a) = run();
        let (sink_b, report_b) = run();
        prop_assert_eq!(sink_a, sink_b);
        prop_assert_eq!(report_a, report_b);
    }

    #[test]
    fn malformed_lines_are_invisible(lines in raw_lines()) {
        let valid: Vec<String> = lines.iter().filter(|l| l.len() == 2 && !l.contains('x')).cloned().collect();
        let noisy = SymbolStream::decode(lines.join("\n").as_bytes());
        let clean = SymbolStream::decode(valid.join("\n").as_bytes());
        prop_assert_eq!(noisy.symbols(), clean.symbols());

        let total = noisy.len() as u64;
        let mut sink = RecordingSink::new();
        let table = analyze(&noisy, &EmissionTable::default(), &mut sink).unwrap();
        prop_assert_eq!(table.global().samples(), total);
        let bucketed: u64 = table.buckets().map(|(_, h)| h.samples()).sum();
        prop_assert_eq!(bucketed, total.saturating_sub(2));
    }
}
