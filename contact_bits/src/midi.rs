// Standard MIDI File event sink.
//
// `MidiTrackSink` implements `EventSink` by building a single MIDI track in
// memory: deltas accumulate until the next event, which carries the summed
// delta; channel changes apply to every following note event. `save` writes
// an SMF Format 0 file with one track.
//
// Uses the `midly` crate for the file format. SMF deltas are 28-bit; a run of
// silent steps long enough to exceed that is split with empty text meta
// events so no time is lost.

use crate::event::EventSink;
use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u28},
};
use std::io;
use std::path::Path;

/// Ticks per quarter note in MIDI output.
pub const TICKS_PER_QUARTER: u16 = 960;

/// Largest delta one SMF event can carry.
const MAX_DELTA: u32 = (1 << 28) - 1;

/// Event sink that assembles a single-track SMF.
#[derive(Clone, Debug)]
pub struct MidiTrackSink {
    name: &'static str,
    track: Track<'static>,
    channel: u4,
    pending_delta: u32,
    ended: bool,
}

fn invalid(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, msg)
}

impl MidiTrackSink {
    /// New empty track. `name` is written as the track name and used in
    /// error messages.
    pub fn new(name: &'static str) -> Self {
        let mut track: Track<'static> = Vec::new();
        track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::TrackName(name.as_bytes())),
        });
        MidiTrackSink {
            name,
            track,
            channel: u4::new(0),
            pending_delta: 0,
            ended: false,
        }
    }

    pub fn track(&self) -> &Track<'static> {
        &self.track
    }

    /// Wrap the track in a Format 0 SMF.
    pub fn to_smf(&self) -> Smf<'static> {
        let mut smf = Smf::new(Header::new(
            Format::SingleTrack,
            Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
        ));
        smf.tracks.push(self.track.clone());
        smf
    }

    /// Write the finished track to `path`.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        if !self.ended {
            return Err(invalid(format!("track `{}` has no end marker", self.name)));
        }
        self.to_smf().save(path)
    }

    fn push(&mut self, kind: TrackEventKind<'static>) -> io::Result<()> {
        if self.ended {
            return Err(invalid(format!("track `{}` already ended", self.name)));
        }
        self.track.push(TrackEvent {
            delta: u28::new(self.pending_delta),
            kind,
        });
        self.pending_delta = 0;
        Ok(())
    }

    fn push_midi(&mut self, message: MidiMessage) -> io::Result<()> {
        let channel = self.channel;
        self.push(TrackEventKind::Midi { channel, message })
    }
}

fn key(pitch: u8) -> io::Result<u7> {
    if pitch > 127 {
        return Err(invalid(format!("pitch {pitch} out of range 0..=127")));
    }
    Ok(u7::new(pitch))
}

impl EventSink for MidiTrackSink {
    fn name(&self) -> &str {
        self.name
    }

    fn set_channel(&mut self, channel: u8) -> io::Result<()> {
        if channel > 15 {
            return Err(invalid(format!("channel {channel} out of range 0..=15")));
        }
        self.channel = u4::new(channel);
        Ok(())
    }

    fn note_on(&mut self, pitch: u8, velocity: u8) -> io::Result<()> {
        if velocity > 127 {
            return Err(invalid(format!("velocity {velocity} out of range 0..=127")));
        }
        let message = MidiMessage::NoteOn {
            key: key(pitch)?,
            vel: u7::new(velocity),
        };
        self.push_midi(message)
    }

    fn note_off(&mut self, pitch: u8) -> io::Result<()> {
        let message = MidiMessage::NoteOff {
            key: key(pitch)?,
            vel: u7::new(0),
        };
        self.push_midi(message)
    }

    fn set_delta(&mut self, ticks: u32) -> io::Result<()> {
        let mut total = u64::from(self.pending_delta) + u64::from(ticks);
        while total > u64::from(MAX_DELTA) {
            self.pending_delta = MAX_DELTA;
            self.push(TrackEventKind::Meta(MetaMessage::Text(b"")))?;
            total -= u64::from(MAX_DELTA);
        }
        self.pending_delta = total as u32;
        Ok(())
    }

    fn end_of_track(&mut self) -> io::Result<()> {
        self.push(TrackEventKind::Meta(MetaMessage::EndOfTrack))?;
        self.ended = true;
        Ok(())
    }
}
