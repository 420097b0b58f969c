// THEORY:
// The `MotionEventController` is the behavioural layer: it turns a per-frame "did we
// see anything?" into discrete, bounded recording sessions, called motion events.
//
// Key architectural principles:
// 1.  **Two States**: `Idle` and `Recording`. It is the only part of the engine whose
//     state outlives a single frame (apart from the background statistics).
// 2.  **Fixed Clip Window**: Once recording starts, every frame is part of the clip,
//     whether or not it still has blobs, until the clip holds exactly `clip_frames`
//     frames. Motion near the end of a clip does not extend it, and there is no
//     cooldown: if blobs are still present on the frame after a clip closes, a new event
//     starts right there.
// 3.  **Signals, Not Side Effects**: The controller only emits `EventSignal`s. The frame
//     loop decides what a signal means for snapshots, clip files and the log, which
//     keeps this module a pure, easily tested state machine.

use chrono::{DateTime, Local};
use std::fmt;

/// Lifecycle signals emitted by the controller, in the order the frame loop must act on them.
#[derive(Debug, Clone, PartialEq)]
pub enum EventSignal {
    /// A new motion event begins: take a snapshot and open a clip.
    Start { started_at: DateTime<Local> },
    /// The current frame belongs to the open clip. `index` is 0-based within the clip.
    Frame { index: u64 },
    /// The clip is complete (or force-finalized) and must be closed.
    End {
        started_at: DateTime<Local>,
        frames: u64,
    },
}

/// The controller's state.
#[derive(Debug, Clone, PartialEq)]
pub enum EventState {
    Idle,
    Recording {
        started_at: DateTime<Local>,
        frame_count: u64,
    },
}

impl fmt::Display for EventState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventState::Idle => write!(f, "IDLE"),
            EventState::Recording { frame_count, .. } => {
                write!(f, "RECORDING ({frame_count} frames)")
            }
        }
    }
}

/// A read-only view of the active motion event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionEvent {
    pub started_at: DateTime<Local>,
    pub frame_count: u64,
    pub active: bool,
}

pub struct MotionEventController {
    clip_frames: u64,
    state: EventState,
    events_started: u64,
}

impl MotionEventController {
    /// `clip_frames` is the clip length in frames; values below 1 are treated as 1.
    pub fn new(clip_frames: u64) -> Self {
        Self {
            clip_frames: clip_frames.max(1),
            state: EventState::Idle,
            events_started: 0,
        }
    }

    pub fn state(&self) -> &EventState {
        &self.state
    }

    pub fn is_recording(&self) -> bool {
        matches!(self.state, EventState::Recording { .. })
    }

    pub fn clip_frames(&self) -> u64 {
        self.clip_frames
    }

    pub fn events_started(&self) -> u64 {
        self.events_started
    }

    pub fn current_event(&self) -> Option<MotionEvent> {
        match self.state {
            EventState::Idle => None,
            EventState::Recording {
                started_at,
                frame_count,
            } => Some(MotionEvent {
                started_at,
                frame_count,
                active: true,
            }),
        }
    }

    /// Advances the state machine by one frame.
    ///
    /// `blob_count` is the number of blobs that survived filtering on this frame and
    /// `now` its timestamp. The returned signals are ordered: `Start` (if any), then
    /// `Frame`, then `End` (if this frame completed the clip).
    pub fn on_frame(&mut self, blob_count: usize, now: DateTime<Local>) -> Vec<EventSignal> {
        let mut signals = Vec::with_capacity(3);

        if self.state == EventState::Idle && blob_count > 0 {
            self.state = EventState::Recording {
                started_at: now,
                frame_count: 0,
            };
            self.events_started += 1;
            log::debug!("event controller: IDLE -> RECORDING");
            signals.push(EventSignal::Start { started_at: now });
        }

        if let EventState::Recording {
            started_at,
            frame_count,
        } = &mut self.state
        {
            signals.push(EventSignal::Frame {
                index: *frame_count,
            });
            *frame_count += 1;

            if *frame_count >= self.clip_frames {
                let finished = EventSignal::End {
                    started_at: *started_at,
                    frames: *frame_count,
                };
                log::debug!("event controller: RECORDING -> IDLE after {} frames", frame_count);
                self.state = EventState::Idle;
                signals.push(finished);
            }
        }

        signals
    }

    /// Force-finalizes an active recording, e.g. on shutdown or end of stream.
    pub fn finish(&mut self) -> Option<EventSignal> {
        match std::mem::replace(&mut self.state, EventState::Idle) {
            EventState::Idle => None,
            EventState::Recording {
                started_at,
                frame_count,
            } => {
                log::debug!("event controller: forced RECORDING -> IDLE after {} frames", frame_count);
                Some(EventSignal::End {
                    started_at,
                    frames: frame_count,
                })
            }
        }
    }
}
