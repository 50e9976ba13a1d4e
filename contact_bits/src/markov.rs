// Markov-keyed emission rules.
//
// An `EmissionTable` maps each `MarkovKey` (the previous accepted symbol) to
// an `EmissionRule`. A rule is either silent (time passes, nothing sounds) or
// voiced with two pitches, one per bit of the current symbol:
//
//   key   pitches   sound
//   "00"  -         silent
//   "01"  48, 52    C3 / E3
//   "10"  53, 57    F3 / A3
//   "11"  55, 59    G3 / B3
//
// Every encoded step has the same shape and lasts 360 ticks:
//   [NoteOn b0] [NoteOn b1] Delta(120) [NoteOff b0] [NoteOff b1] Delta(240)
// A silent step keeps the two deltas and drops the notes. A key with no rule
// in the table encodes to nothing at all.
//
// The table is loaded from JSON when a custom mapping is wanted; the
// canonical mapping above is `EmissionTable::default()`. The context-free
// track (every symbol voiced on 48/52) is `EmissionRule::direct()`.

use crate::context::MarkovKey;
use crate::error::{Error, Result};
use crate::event::{EventSink, TimedEvent};
use crate::symbol::Symbol;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use std::path::Path;

/// Ticks between the note-ons and the note-offs of a step.
pub const GATE_TICKS: u32 = 120;

/// Ticks after the note-offs, before the next step.
pub const TAIL_TICKS: u32 = 240;

/// Total duration of one encoded step.
pub const STEP_TICKS: u32 = GATE_TICKS + TAIL_TICKS;

/// Velocity of every emitted note-on.
pub const DEFAULT_VELOCITY: u8 = 100;

/// What to emit for one symbol under a given context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmissionRule {
    /// Pitches sounded by `b0` and `b1`. `None` makes the rule silent.
    pub pitches: Option<[u8; 2]>,
    #[serde(default)]
    pub channel: u8,
    #[serde(default = "default_velocity")]
    pub velocity: u8,
}

fn default_velocity() -> u8 {
    DEFAULT_VELOCITY
}

impl EmissionRule {
    pub fn silent() -> Self {
        EmissionRule {
            pitches: None,
            channel: 0,
            velocity: DEFAULT_VELOCITY,
        }
    }

    pub fn voiced(low: u8, high: u8) -> Self {
        EmissionRule {
            pitches: Some([low, high]),
            channel: 0,
            velocity: DEFAULT_VELOCITY,
        }
    }

    /// Rule used for the context-free track: every symbol on 48/52.
    pub fn direct() -> Self {
        Self::voiced(48, 52)
    }

    pub fn is_silent(&self) -> bool {
        self.pitches.is_none()
    }

    /// Events for one step. Always exactly two deltas summing to
    /// `STEP_TICKS`; note-offs mirror the note-ons.
    pub fn encode(&self, symbol: Symbol) -> Vec<TimedEvent> {
        let Some([low, high]) = self.pitches else {
            return vec![TimedEvent::Delta(GATE_TICKS), TimedEvent::Delta(TAIL_TICKS)];
        };

        let sounding: Vec<u8> = [(symbol.b0(), low), (symbol.b1(), high)]
            .into_iter()
            .filter_map(|(on, pitch)| on.then_some(pitch))
            .collect();

        let mut events = Vec::with_capacity(2 * sounding.len() + 2);
        events.extend(sounding.iter().map(|&pitch| TimedEvent::NoteOn {
            pitch,
            velocity: self.velocity,
        }));
        events.push(TimedEvent::Delta(GATE_TICKS));
        events.extend(sounding.iter().map(|&pitch| TimedEvent::NoteOff { pitch }));
        events.push(TimedEvent::Delta(TAIL_TICKS));
        events
    }

    /// Encode one step straight into a sink. Voiced rules select their
    /// channel first; silent rules only advance time.
    pub fn write_step<S: EventSink + ?Sized>(&self, sink: &mut S, symbol: Symbol) -> io::Result<()> {
        if !self.is_silent() {
            sink.set_channel(self.channel)?;
        }
        for event in self.encode(symbol) {
            sink.emit(event)?;
        }
        Ok(())
    }

    fn validate(&self, key: MarkovKey) -> Result<()> {
        if self.channel > 15 {
            return Err(Error::EmissionTable(format!(
                "context {key}: channel {} out of range 0..=15",
                self.channel
            )));
        }
        if self.velocity > 127 {
            return Err(Error::EmissionTable(format!(
                "context {key}: velocity {} out of range 0..=127",
                self.velocity
            )));
        }
        if let Some(p) = self.pitches.iter().flatten().find(|&&p| p > 127) {
            return Err(Error::EmissionTable(format!(
                "context {key}: pitch {p} out of range 0..=127"
            )));
        }
        Ok(())
    }
}

/// Emission rules keyed by the previous symbol. Read-only once built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmissionTable {
    pub rules: BTreeMap<MarkovKey, EmissionRule>,
}

impl Default for EmissionTable {
    fn default() -> Self {
        let mut rules = BTreeMap::new();
        let mut insert = |code: u8, rule: EmissionRule| {
            if let Some(symbol) = Symbol::from_code(code) {
                rules.insert(MarkovKey(symbol), rule);
            }
        };
        insert(0, EmissionRule::silent());
        insert(1, EmissionRule::voiced(48, 52));
        insert(2, EmissionRule::voiced(53, 57));
        insert(3, EmissionRule::voiced(55, 59));
        EmissionTable { rules }
    }
}

impl EmissionTable {
    /// Load and validate a table from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|source| Error::Input {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> Result<Self> {
        let table: EmissionTable = serde_json::from_str(data)?;
        table.validate()?;
        Ok(table)
    }

    pub fn validate(&self) -> Result<()> {
        for (key, rule) in &self.rules {
            rule.validate(*key)?;
        }
        Ok(())
    }

    pub fn rule(&self, key: MarkovKey) -> Option<&EmissionRule> {
        self.rules.get(&key)
    }

    /// Events for `symbol` under `key`. Unmatched keys encode to nothing.
    pub fn encode(&self, key: MarkovKey, symbol: Symbol) -> Vec<TimedEvent> {
        self.rule(key).map(|rule| rule.encode(symbol)).unwrap_or_default()
    }

    /// Encode one step into a sink; a no-op for unmatched keys.
    pub fn write_step<S: EventSink + ?Sized>(
        &self,
        sink: &mut S,
        key: MarkovKey,
        symbol: Symbol,
    ) -> io::Result<()> {
        match self.rule(key) {
            Some(rule) => rule.write_step(sink, symbol),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{RecordingSink, SinkCall};

    fn sym(s: &str) -> Symbol {
        Symbol::parse(s.as_bytes()).unwrap()
    }

    fn key(s: &str) -> MarkovKey {
        MarkovKey(sym(s))
    }

    #[test]
    fn test_silent_context_emits_two_deltas() {
        let table = EmissionTable::default();
        for symbol in Symbol::all() {
            assert_eq!(
                table.encode(MarkovKey::SILENT, symbol),
                vec![TimedEvent::Delta(120), TimedEvent::Delta(240)]
            );
        }
    }

    #[test]
    fn test_voiced_contexts_use_their_pitches() {
        let table = EmissionTable::default();
        let on = |pitch| TimedEvent::NoteOn { pitch, velocity: 100 };
        let off = |pitch| TimedEvent::NoteOff { pitch };

        assert_eq!(
            table.encode(key("01"), sym("11")),
            vec![on(48), on(52), TimedEvent::Delta(120), off(48), off(52), TimedEvent::Delta(240)]
        );
        assert_eq!(
            table.encode(key("10"), sym("10")),
            vec![on(53), TimedEvent::Delta(120), off(53), TimedEvent::Delta(240)]
        );
        assert_eq!(
            table.encode(key("11"), sym("01")),
            vec![on(59), TimedEvent::Delta(120), off(59), TimedEvent::Delta(240)]
        );
        assert_eq!(
            table.encode(key("11"), sym("00")),
            vec![TimedEvent::Delta(120), TimedEvent::Delta(240)]
        );
    }

    #[test]
    fn test_every_step_lasts_360_ticks() {
        let table = EmissionTable::default();
        for k in Symbol::all() {
            for s in Symbol::all() {
                let deltas: Vec<u32> = table
                    .encode(MarkovKey(k), s)
                    .into_iter()
                    .filter_map(|e| match e {
                        TimedEvent::Delta(t) => Some(t),
                        _ => None,
                    })
                    .collect();
                assert_eq!(deltas, vec![GATE_TICKS, TAIL_TICKS]);
                assert_eq!(deltas.iter().sum::<u32>(), STEP_TICKS);
            }
        }
    }

    #[test]
    fn test_unmatched_key_encodes_nothing() {
        let mut table = EmissionTable::default();
        table.rules.remove(&key("10"));
        assert!(table.encode(key("10"), sym("11")).is_empty());

        let mut sink = RecordingSink::new();
        table.write_step(&mut sink, key("10"), sym("11")).unwrap();
        assert!(sink.calls.is_empty());
    }

    #[test]
    fn test_write_step_sets_channel_only_when_voiced() {
        let table = EmissionTable::default();
        let mut sink = RecordingSink::new();
        table.write_step(&mut sink, MarkovKey::SILENT, sym("11")).unwrap();
        assert!(!sink.calls.contains(&SinkCall::Channel(0)));

        table.write_step(&mut sink, key("01"), sym("11")).unwrap();
        assert_eq!(sink.calls[2], SinkCall::Channel(0));
    }

    #[test]
    fn test_table_json_roundtrip_and_defaults() {
        let json = serde_json::to_string(&EmissionTable::default()).unwrap();
        let back = EmissionTable::from_json(&json).unwrap();
        assert_eq!(back, EmissionTable::default());

        let minimal = r#"{"rules": {"01": {"pitches": [60, 64]}}}"#;
        let table = EmissionTable::from_json(minimal).unwrap();
        let rule = table.rule(key("01")).unwrap();
        assert_eq!(rule.velocity, DEFAULT_VELOCITY);
        assert_eq!(rule.channel, 0);
        assert!(table.rule(MarkovKey::SILENT).is_none());
    }

    #[test]
    fn test_validate_rejects_out_of_range_values() {
        let bad_pitch = r#"{"rules": {"01": {"pitches": [60, 200]}}}"#;
        assert!(matches!(
            EmissionTable::from_json(bad_pitch),
            Err(Error::EmissionTable(_))
        ));
        let bad_channel = r#"{"rules": {"11": {"pitches": null, "channel": 16}}}"#;
        assert!(matches!(
            EmissionTable::from_json(bad_channel),
            Err(Error::EmissionTable(_))
        ));
        let bad_key = r#"{"rules": {"2": {"pitches": null}}}"#;
        assert!(matches!(EmissionTable::from_json(bad_key), Err(Error::Json(_))));
    }
}
