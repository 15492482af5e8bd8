//! Shared holder state with a single writer and cheap staleness checks.

use chrono::{DateTime, Utc};
use leaderhook_domain::HolderState;
use tokio::sync::watch;

/// Creates the process-wide holder state.
///
/// The writer is not cloneable, so whoever owns it is the only component able
/// to change the tracked holder.
#[must_use]
pub fn holder_state_channel() -> (HolderStateWriter, HolderStateReader) {
    let (sender, receiver) = watch::channel(HolderState::new());
    (HolderStateWriter { sender }, HolderStateReader { receiver })
}

/// Exclusive write handle to the holder state.
#[derive(Debug)]
pub struct HolderStateWriter {
    sender: watch::Sender<HolderState>,
}

impl HolderStateWriter {
    /// Applies one observation atomically and returns the new generation, or
    /// `None` when the observation duplicates the current state.
    pub fn accept(&self, holder: &str, acquire_time: Option<DateTime<Utc>>) -> Option<u64> {
        let mut generation = None;
        self.sender.send_if_modified(|state| {
            generation = state.accept(holder, acquire_time);
            generation.is_some()
        });
        generation
    }

    /// Returns a new read handle.
    #[must_use]
    pub fn reader(&self) -> HolderStateReader {
        HolderStateReader {
            receiver: self.sender.subscribe(),
        }
    }
}

/// Read handle to the holder state.
#[derive(Debug, Clone)]
pub struct HolderStateReader {
    receiver: watch::Receiver<HolderState>,
}

impl HolderStateReader {
    /// Returns a copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> HolderState {
        self.receiver.borrow().clone()
    }

    /// Returns the current generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.receiver.borrow().generation()
    }

    /// Returns a generation guard backed by this reader.
    #[must_use]
    pub fn guard(&self) -> GenerationGuard {
        GenerationGuard {
            state: self.clone(),
        }
    }
}

/// Hands out generation tokens and tells whether they are stale.
#[derive(Debug, Clone)]
pub struct GenerationGuard {
    state: HolderStateReader,
}

impl GenerationGuard {
    /// Captures the current generation.
    #[must_use]
    pub fn snapshot(&self) -> GenerationToken {
        GenerationToken {
            generation: self.state.generation(),
            state: self.state.clone(),
        }
    }

    /// Returns true when a newer change was accepted after `token` was taken.
    #[must_use]
    pub fn is_stale(&self, token: &GenerationToken) -> bool {
        self.state.generation() != token.generation
    }
}

/// Cooperative cancellation token for one reconciliation task.
///
/// Staleness is never pushed to the task; loops must call [`Self::is_stale`]
/// before every attempt.
#[derive(Debug, Clone)]
pub struct GenerationToken {
    generation: u64,
    state: HolderStateReader,
}

impl GenerationToken {
    /// Returns the generation this token was taken at.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns true when the tracked generation moved past this token.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.state.generation() != self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::holder_state_channel;

    #[test]
    fn token_goes_stale_after_next_accepted_change() {
        let (writer, reader) = holder_state_channel();
        let guard = reader.guard();

        assert_eq!(writer.accept("node-1", None), Some(1));
        let token = guard.snapshot();
        assert_eq!(token.generation(), 1);
        assert!(!token.is_stale());
        assert!(!guard.is_stale(&token));

        assert_eq!(writer.accept("node-2", None), Some(2));
        assert!(token.is_stale());
        assert!(guard.is_stale(&token));
    }

    #[test]
    fn duplicate_observation_keeps_token_fresh() {
        let (writer, reader) = holder_state_channel();
        writer.accept("node-1", None);
        let token = reader.guard().snapshot();

        assert_eq!(writer.accept("node-1", None), None);
        assert!(!token.is_stale());
    }

    #[test]
    fn readers_see_writes_from_the_single_writer() {
        let (writer, reader) = holder_state_channel();
        let late_reader = writer.reader();
        assert!(!reader.snapshot().ever_observed());

        writer.accept("node-1", None);

        assert_eq!(reader.snapshot().holder(), "node-1");
        assert_eq!(late_reader.generation(), 1);
    }
}
