// Timed events and the event sink seam.
//
// The encoder produces `TimedEvent` values; an `EventSink` consumes them in
// order and assembles a time-ordered track. `EventSink` mirrors a track
// writer's primitive calls (`set_channel`, `note_on`, `note_off`,
// `set_delta`, `end_of_track`) so a file format adapter can implement it
// directly. See `midi.rs` for the Standard MIDI File sink.
//
// `RecordingSink` keeps everything in memory and is what tests and the
// idempotence checks compare against. `DiscardSink` accepts and drops every
// call, for runs that only want the divergence report.

use serde::{Deserialize, Serialize};
use std::io;

/// One event produced by the encoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimedEvent {
    NoteOn { pitch: u8, velocity: u8 },
    NoteOff { pitch: u8 },
    /// Relative time advance before the next event, in ticks.
    Delta(u32),
}

/// Receiver of encoded events. Calls arrive in exactly the order the
/// encoder produced them.
pub trait EventSink {
    /// Short name used in error messages when the sink fails.
    fn name(&self) -> &str;

    fn set_channel(&mut self, channel: u8) -> io::Result<()>;

    fn note_on(&mut self, pitch: u8, velocity: u8) -> io::Result<()>;

    fn note_off(&mut self, pitch: u8) -> io::Result<()>;

    fn set_delta(&mut self, ticks: u32) -> io::Result<()>;

    fn end_of_track(&mut self) -> io::Result<()>;

    /// Dispatch one encoded event to the matching primitive.
    fn emit(&mut self, event: TimedEvent) -> io::Result<()> {
        match event {
            TimedEvent::NoteOn { pitch, velocity } => self.note_on(pitch, velocity),
            TimedEvent::NoteOff { pitch } => self.note_off(pitch),
            TimedEvent::Delta(ticks) => self.set_delta(ticks),
        }
    }
}

/// A call received by `RecordingSink`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SinkCall {
    Channel(u8),
    Event(TimedEvent),
    EndOfTrack,
}

/// In-memory sink that records every call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordingSink {
    pub calls: Vec<SinkCall>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded events only, without channel changes or the end marker.
    pub fn events(&self) -> Vec<TimedEvent> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                SinkCall::Event(e) => Some(*e),
                _ => None,
            })
            .collect()
    }

    /// Sum of all recorded deltas.
    pub fn total_ticks(&self) -> u64 {
        self.events()
            .iter()
            .map(|e| match e {
                TimedEvent::Delta(t) => u64::from(*t),
                _ => 0,
            })
            .sum()
    }

    pub fn ended(&self) -> bool {
        self.calls.last() == Some(&SinkCall::EndOfTrack)
    }
}

impl EventSink for RecordingSink {
    fn name(&self) -> &str {
        "recording"
    }

    fn set_channel(&mut self, channel: u8) -> io::Result<()> {
        self.calls.push(SinkCall::Channel(channel));
        Ok(())
    }

    fn note_on(&mut self, pitch: u8, velocity: u8) -> io::Result<()> {
        self.calls
            .push(SinkCall::Event(TimedEvent::NoteOn { pitch, velocity }));
        Ok(())
    }

    fn note_off(&mut self, pitch: u8) -> io::Result<()> {
        self.calls.push(SinkCall::Event(TimedEvent::NoteOff { pitch }));
        Ok(())
    }

    fn set_delta(&mut self, ticks: u32) -> io::Result<()> {
        self.calls.push(SinkCall::Event(TimedEvent::Delta(ticks)));
        Ok(())
    }

    fn end_of_track(&mut self) -> io::Result<()> {
        self.calls.push(SinkCall::EndOfTrack);
        Ok(())
    }
}

/// Sink that accepts every call and keeps nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiscardSink;

impl EventSink for DiscardSink {
    fn name(&self) -> &str {
        "discard"
    }

    fn set_channel(&mut self, _channel: u8) -> io::Result<()> {
        Ok(())
    }

    fn note_on(&mut self, _pitch: u8, _velocity: u8) -> io::Result<()> {
        Ok(())
    }

    fn note_off(&mut self, _pitch: u8) -> io::Result<()> {
        Ok(())
    }

    fn set_delta(&mut self, _ticks: u32) -> io::Result<()> {
        Ok(())
    }

    fn end_of_track(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_dispatches_to_primitives() {
        let mut sink = RecordingSink::new();
        sink.emit(TimedEvent::NoteOn { pitch: 48, velocity: 100 }).unwrap();
        sink.emit(TimedEvent::Delta(120)).unwrap();
        sink.emit(TimedEvent::NoteOff { pitch: 48 }).unwrap();
        sink.end_of_track().unwrap();

        assert_eq!(sink.events().len(), 3);
        assert_eq!(sink.total_ticks(), 120);
        assert!(sink.ended());
    }

    #[test]
    fn test_discard_sink_accepts_everything() {
        let mut sink = DiscardSink;
        sink.set_channel(15).unwrap();
        sink.emit(TimedEvent::NoteOn { pitch: 127, velocity: 0 }).unwrap();
        sink.emit(TimedEvent::Delta(u32::MAX)).unwrap();
        sink.end_of_track().unwrap();
        sink.end_of_track().unwrap();
        assert_eq!(sink.name(), "discard");
    }
}
