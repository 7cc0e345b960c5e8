//! Timed command recognizer.
//!
//! Accumulates timestamped tokens in a [`RingBuffer`], expires tokens older
//! than the configured window, and matches the buffer against registered
//! command sequences after every push.
//!
//! Matching has two modes:
//! - **Full buffer** (`len == capacity`): only commands whose length equals
//!   the capacity are eligible, compared against the whole buffer. The buffer
//!   is cleared afterwards whether or not anything matched.
//! - **Partial buffer** (`len < capacity`): commands of length `L <= len` are
//!   compared against the newest `L` tokens. The first match in registration
//!   order wins and only those `L` tokens are removed.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use super::error::RecognizerError;
use super::ring_buffer::RingBuffer;
use super::token::{InputToken, RawInput, Symbol};

/// Callback invoked when a command is recognized.
pub type CommandCallback = Box<dyn FnMut(&CommandMatch) -> anyhow::Result<()>>;

/// Construction-time parameters of a recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizerConfig {
    /// Maximum number of buffered tokens.
    pub capacity: usize,
    /// Maximum token age in milliseconds.
    pub window_ms: i64,
    /// Whether a push into a full buffer overwrites the oldest token.
    /// When false the push is dropped.
    pub overwrite_on_full: bool,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            capacity: 4,
            window_ms: 1000,
            overwrite_on_full: true,
        }
    }
}

impl RecognizerConfig {
    pub fn validate(&self) -> Result<(), RecognizerError> {
        if self.capacity == 0 {
            return Err(RecognizerError::ZeroCapacity);
        }
        if self.window_ms <= 0 {
            return Err(RecognizerError::InvalidWindow(self.window_ms));
        }
        Ok(())
    }
}

/// Payload handed to a command callback and returned from a matching push.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandMatch {
    pub name: String,
    pub sequence: Vec<Symbol>,
    /// Buffer contents at match time, oldest first.
    pub buffer: Vec<InputToken>,
    /// The tokens that matched the sequence.
    pub entries: Vec<InputToken>,
}

struct CommandDefinition {
    name: String,
    sequence: Vec<Symbol>,
    callback: CommandCallback,
}

impl CommandDefinition {
    fn matches<'a>(&self, tokens: impl Iterator<Item = &'a InputToken>) -> bool {
        let mut expected = self.sequence.iter();
        for token in tokens {
            match expected.next() {
                Some(symbol) if *symbol == token.symbol => {}
                _ => return false,
            }
        }
        expected.next().is_none()
    }
}

/// Post-match buffer cleanup. Runs on drop so a failing or panicking
/// callback still leaves the buffer in its resolved state.
enum Cleanup<'a> {
    Clear(&'a mut RingBuffer<InputToken>),
    PopBack(&'a mut RingBuffer<InputToken>, usize),
}

impl Drop for Cleanup<'_> {
    fn drop(&mut self) {
        match self {
            Self::Clear(buffer) => buffer.clear(),
            Self::PopBack(buffer, n) => {
                for _ in 0..*n {
                    buffer.pop_back();
                }
            }
        }
    }
}

/// Sliding-window recognizer for multi-step commands.
///
/// One instance per stage. Not shared; no locking.
pub struct CommandRecognizer {
    config: RecognizerConfig,
    buffer: RingBuffer<InputToken>,
    commands: Vec<CommandDefinition>,
}

impl CommandRecognizer {
    pub fn new(config: RecognizerConfig) -> Result<Self, RecognizerError> {
        config.validate()?;
        Ok(Self {
            buffer: RingBuffer::try_new(config.capacity).ok_or(RecognizerError::ZeroCapacity)?,
            config,
            commands: Vec::new(),
        })
    }

    pub fn config(&self) -> &RecognizerConfig {
        &self.config
    }

    /// Register a command. Earlier registrations win ties in the partial-buffer case.
    pub fn register<F>(
        &mut self,
        name: impl Into<String>,
        sequence: Vec<Symbol>,
        callback: F,
    ) -> Result<(), RecognizerError>
    where
        F: FnMut(&CommandMatch) -> anyhow::Result<()> + 'static,
    {
        let name = name.into();
        if sequence.is_empty() {
            return Err(RecognizerError::EmptySequence { name });
        }
        if sequence.len() > self.config.capacity {
            return Err(RecognizerError::SequenceTooLong {
                name,
                len: sequence.len(),
                capacity: self.config.capacity,
            });
        }
        if self.commands.iter().any(|c| c.name == name) {
            return Err(RecognizerError::DuplicateCommand { name });
        }
        debug!(command = %name, steps = sequence.len(), "registered command");
        self.commands.push(CommandDefinition {
            name,
            sequence,
            callback: Box::new(callback),
        });
        Ok(())
    }

    /// Registered command names in registration order.
    pub fn commands(&self) -> impl Iterator<Item = (&str, &[Symbol])> {
        self.commands
            .iter()
            .map(|c| (c.name.as_str(), c.sequence.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Buffered tokens, oldest first.
    pub fn snapshot(&self) -> Vec<InputToken> {
        self.buffer.to_vec()
    }

    /// Drop all buffered tokens.
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// Normalize a raw input and push it. `now_ms` stamps untimed input and drives expiry.
    pub fn push_raw(
        &mut self,
        input: &RawInput,
        now_ms: i64,
    ) -> Result<Option<CommandMatch>, RecognizerError> {
        let token = input.normalize(now_ms)?;
        self.push(token, now_ms)
    }

    /// Insert a token, expire stale tokens, then try to match.
    ///
    /// Tokens must arrive in capture order: a token older than the newest
    /// live token is rejected with [`RecognizerError::OutOfOrder`] and the
    /// buffer is left untouched.
    ///
    /// Returns the recognized command, if any. A callback error is reported
    /// as [`RecognizerError::Callback`] after the buffer has been resolved.
    pub fn push(
        &mut self,
        token: InputToken,
        now_ms: i64,
    ) -> Result<Option<CommandMatch>, RecognizerError> {
        // Expire first: a stale newest token must not block the push.
        self.expire(now_ms);
        let newest_ms = self.buffer.peek_back().map(|t| t.time_ms);
        if let Some(newest_ms) = newest_ms.filter(|newest| token.time_ms < *newest) {
            return Err(RecognizerError::OutOfOrder {
                symbol: token.symbol.to_string(),
                time_ms: token.time_ms,
                newest_ms,
            });
        }

        if self.buffer.is_full() && !self.config.overwrite_on_full {
            trace!(symbol = %token.symbol, "buffer full, dropping token");
        } else {
            self.buffer.push(token);
        }
        self.expire(now_ms);
        self.try_match()
    }

    /// Pop tokens from the front while they are older than the window.
    pub fn expire(&mut self, now_ms: i64) {
        while let Some(oldest) = self.buffer.peek_front() {
            if now_ms - oldest.time_ms <= self.config.window_ms {
                break;
            }
            trace!(symbol = %oldest.symbol, age_ms = now_ms - oldest.time_ms, "expired token");
            self.buffer.pop_front();
        }
    }

    fn try_match(&mut self) -> Result<Option<CommandMatch>, RecognizerError> {
        let count = self.buffer.len();
        if count == 0 {
            return Ok(None);
        }

        if self.buffer.is_full() {
            let capacity = self.config.capacity;
            let found = self.commands.iter().position(|c| {
                c.sequence.len() == capacity && c.matches(self.buffer.iter())
            });
            let Some(idx) = found else {
                debug!(len = count, "full buffer matched nothing, clearing");
                self.buffer.clear();
                return Ok(None);
            };
            let snapshot = self.buffer.to_vec();
            let found = self.build_match(idx, snapshot.clone(), snapshot);
            let _cleanup = Cleanup::Clear(&mut self.buffer);
            return Self::dispatch(&mut self.commands[idx], found);
        }

        let found = self.commands.iter().position(|c| {
            let len = c.sequence.len();
            len <= count && c.matches(self.buffer.iter().skip(count - len))
        });
        let Some(idx) = found else {
            return Ok(None);
        };
        let len = self.commands[idx].sequence.len();
        let found = self.build_match(idx, self.buffer.to_vec(), self.buffer.tail(len));
        let _cleanup = Cleanup::PopBack(&mut self.buffer, len);
        Self::dispatch(&mut self.commands[idx], found)
    }

    fn build_match(
        &self,
        idx: usize,
        buffer: Vec<InputToken>,
        entries: Vec<InputToken>,
    ) -> CommandMatch {
        let command = &self.commands[idx];
        CommandMatch {
            name: command.name.clone(),
            sequence: command.sequence.clone(),
            buffer,
            entries,
        }
    }

    fn dispatch(
        command: &mut CommandDefinition,
        found: CommandMatch,
    ) -> Result<Option<CommandMatch>, RecognizerError> {
        debug!(command = %found.name, entries = found.entries.len(), "command recognized");
        match (command.callback)(&found) {
            Ok(()) => Ok(Some(found)),
            Err(source) => {
                warn!(command = %found.name, error = %source, "command callback failed");
                Err(RecognizerError::Callback {
                    name: found.name,
                    source,
                })
            }
        }
    }
}

impl std::fmt::Debug for CommandRecognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRecognizer")
            .field("config", &self.config)
            .field("buffer", &self.buffer)
            .field(
                "commands",
                &self.commands.iter().map(|c| &c.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::test_utils::builders::{symbol, symbols, token};

    fn recognizer(capacity: usize, window_ms: i64) -> CommandRecognizer {
        CommandRecognizer::new(RecognizerConfig {
            capacity,
            window_ms,
            overwrite_on_full: true,
        })
        .unwrap()
    }

    type Hits = Rc<RefCell<Vec<CommandMatch>>>;

    fn counter() -> (Hits, impl FnMut(&CommandMatch) -> anyhow::Result<()>) {
        let hits = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&hits);
        (hits, move |m: &CommandMatch| {
            sink.borrow_mut().push(m.clone());
            Ok(())
        })
    }

    #[test]
    fn rejects_invalid_config() {
        let zero = RecognizerConfig {
            capacity: 0,
            ..Default::default()
        };
        assert!(matches!(
            CommandRecognizer::new(zero),
            Err(RecognizerError::ZeroCapacity)
        ));
        let window = RecognizerConfig {
            window_ms: 0,
            ..Default::default()
        };
        assert!(matches!(
            CommandRecognizer::new(window),
            Err(RecognizerError::InvalidWindow(0))
        ));
    }

    #[test]
    fn registration_validates_sequence() {
        let mut rec = recognizer(3, 1000);
        assert!(matches!(
            rec.register("empty", vec![], |_| Ok(())),
            Err(RecognizerError::EmptySequence { .. })
        ));
        assert!(matches!(
            rec.register("long", symbols(&["A", "A", "A", "A"]), |_| Ok(())),
            Err(RecognizerError::SequenceTooLong { len: 4, capacity: 3, .. })
        ));
        rec.register("ok", symbols(&["A"]), |_| Ok(())).unwrap();
        assert!(matches!(
            rec.register("ok", symbols(&["B"]), |_| Ok(())),
            Err(RecognizerError::DuplicateCommand { .. })
        ));
        assert_eq!(rec.commands().count(), 1);
    }

    #[test]
    fn full_buffer_exact_match_clears() {
        let mut rec = recognizer(4, 1000);
        let (hits, cb) = counter();
        rec.register("attack", symbols(&["A", "A", "A", "B"]), cb).unwrap();

        for (i, s) in ["A", "A", "A"].iter().enumerate() {
            assert!(rec.push(token(s, i as i64 * 100), i as i64 * 100).unwrap().is_none());
        }
        let found = rec.push(token("B", 300), 300).unwrap().unwrap();
        assert_eq!(found.name, "attack");
        assert_eq!(found.entries.len(), 4);
        assert_eq!(found.buffer, found.entries);
        assert_eq!(hits.borrow().len(), 1);
        assert!(rec.is_empty());
    }

    #[test]
    fn full_buffer_without_match_clears() {
        let mut rec = recognizer(4, 1000);
        let (hits, cb) = counter();
        rec.register("attack", symbols(&["A", "A", "A", "B"]), cb).unwrap();

        for (i, s) in ["B", "B", "A", "A"].iter().enumerate() {
            rec.push(token(s, i as i64), i as i64).unwrap();
        }
        assert!(rec.is_empty());
        assert!(hits.borrow().is_empty());
    }

    #[test]
    fn short_command_is_not_checked_on_full_buffer() {
        let mut rec = recognizer(3, 1000);
        let (hits, cb) = counter();
        rec.register("pair", symbols(&["C", "D"]), cb).unwrap();

        rec.push(token("A", 0), 0).unwrap();
        rec.push(token("C", 1), 1).unwrap();
        // Third token fills the buffer; only length-3 commands are eligible.
        assert!(rec.push(token("D", 2), 2).unwrap().is_none());
        assert!(hits.borrow().is_empty());
        assert!(rec.is_empty());
    }

    #[test]
    fn partial_tail_match_removes_only_match() {
        let mut rec = recognizer(4, 1000);
        let (hits, cb) = counter();
        rec.register("defend", symbols(&["B", "A"]), cb).unwrap();

        rec.push(token("X", 0), 0).unwrap();
        rec.push(token("B", 10), 10).unwrap();
        let found = rec.push(token("A", 20), 20).unwrap().unwrap();

        assert_eq!(found.name, "defend");
        let entry_symbols: Vec<_> = found.entries.iter().map(|t| t.symbol.as_str()).collect();
        assert_eq!(entry_symbols, vec!["B", "A"]);
        assert_eq!(found.buffer.len(), 3);
        assert_eq!(hits.borrow().len(), 1);

        let left: Vec<_> = rec.snapshot().into_iter().map(|t| t.symbol).collect();
        assert_eq!(left, symbols(&["X"]));
    }

    #[test]
    fn first_registered_wins_partial() {
        let mut rec = recognizer(4, 1000);
        let (first, cb1) = counter();
        let (second, cb2) = counter();
        rec.register("tail", symbols(&["A"]), cb1).unwrap();
        rec.register("pair", symbols(&["B", "A"]), cb2).unwrap();

        rec.push(token("B", 0), 0).unwrap();
        let found = rec.push(token("A", 1), 1).unwrap().unwrap();
        assert_eq!(found.name, "tail");
        assert_eq!(first.borrow().len(), 1);
        assert!(second.borrow().is_empty());
        assert_eq!(rec.len(), 1);
    }

    #[test]
    fn expiry_runs_before_matching() {
        let mut rec = recognizer(4, 500);
        let (hits, cb) = counter();
        rec.register("defend", symbols(&["B", "A"]), cb).unwrap();

        rec.push(token("B", 0), 0).unwrap();
        // B is 501ms old when A arrives.
        assert!(rec.push(token("A", 501), 501).unwrap().is_none());
        assert!(hits.borrow().is_empty());
        assert_eq!(rec.len(), 1);
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let mut rec = recognizer(4, 500);
        rec.push(token("B", 0), 0).unwrap();
        rec.expire(500);
        assert_eq!(rec.len(), 1);
        rec.expire(501);
        assert!(rec.is_empty());
    }

    #[test]
    fn older_timed_input_is_rejected() {
        let mut rec = recognizer(4, 500);
        let (hits, cb) = counter();
        rec.register("defend", symbols(&["A", "B"]), cb).unwrap();

        rec.push_raw(&RawInput::from("A"), 1000).unwrap();
        let stale = RawInput::Event {
            symbol: "B".to_string(),
            time: Some(0),
        };
        assert!(matches!(
            rec.push_raw(&stale, 1000),
            Err(RecognizerError::OutOfOrder {
                time_ms: 0,
                newest_ms: 1000,
                ..
            })
        ));
        assert!(hits.borrow().is_empty());
        let kept: Vec<_> = rec.snapshot().into_iter().map(|t| (t.symbol, t.time_ms)).collect();
        assert_eq!(kept, vec![(symbol("A"), 1000)]);
    }

    #[test]
    fn older_token_is_rejected() {
        let mut rec = recognizer(4, 500);
        rec.push(token("A", 800), 900).unwrap();
        assert!(matches!(
            rec.push(token("B", 799), 900),
            Err(RecognizerError::OutOfOrder { newest_ms: 800, .. })
        ));
        // Equal timestamps keep arrival order.
        rec.push(token("C", 800), 900).unwrap();
        assert_eq!(rec.len(), 2);
        for kept in rec.snapshot() {
            assert!(900 - kept.time_ms <= 500);
        }
    }

    #[test]
    fn stale_token_behind_expired_newest_is_dropped() {
        let mut rec = recognizer(4, 500);
        rec.push(token("A", 1000), 1000).unwrap();
        // A has expired by 2000, and B is older still: nothing survives.
        assert!(rec.push(token("B", 900), 2000).unwrap().is_none());
        assert!(rec.is_empty());
    }

    #[test]
    fn expire_keeps_exactly_live_tokens() {
        let mut rec = recognizer(8, 300);
        for (i, t) in [0, 100, 250, 400, 550].iter().enumerate() {
            rec.push(token(["A", "B", "C", "D", "E"][i], *t), *t).unwrap();
        }
        rec.expire(550);
        let kept: Vec<_> = rec.snapshot().into_iter().map(|t| t.time_ms).collect();
        assert_eq!(kept, vec![250, 400, 550]);
        // 400 sits exactly on the window edge at 700.
        rec.expire(700);
        let kept: Vec<_> = rec.snapshot().into_iter().map(|t| t.time_ms).collect();
        assert_eq!(kept, vec![400, 550]);
    }

    #[test]
    fn push_raw_stamps_now() {
        let mut rec = recognizer(4, 1000);
        rec.push_raw(&RawInput::from("A"), 42).unwrap();
        assert_eq!(rec.snapshot()[0].time_ms, 42);
        assert!(matches!(
            rec.push_raw(&RawInput::from(" "), 43),
            Err(RecognizerError::Input(_))
        ));
        assert_eq!(rec.len(), 1);
    }

    #[test]
    fn failing_callback_still_resolves_buffer() {
        let mut rec = recognizer(4, 1000);
        rec.register("defend", symbols(&["B", "A"]), |_| {
            anyhow::bail!("boom")
        })
        .unwrap();

        rec.push(token("X", 0), 0).unwrap();
        rec.push(token("B", 1), 1).unwrap();
        let err = rec.push(token("A", 2), 2).unwrap_err();
        assert!(matches!(err, RecognizerError::Callback { ref name, .. } if name == "defend"));
        assert_eq!(rec.len(), 1);
    }

    #[test]
    fn panicking_callback_still_clears_full_buffer() {
        let mut rec = recognizer(2, 1000);
        rec.register("double", symbols(&["A", "A"]), |_| panic!("handler bug"))
            .unwrap();
        rec.push(token("A", 0), 0).unwrap();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = rec.push(token("A", 1), 1);
        }));
        assert!(result.is_err());
        assert!(rec.is_empty());
    }

    #[test]
    fn full_buffer_never_persists_between_pushes() {
        let config = RecognizerConfig {
            capacity: 2,
            window_ms: 1000,
            overwrite_on_full: false,
        };
        let mut rec = CommandRecognizer::new(config).unwrap();
        rec.push(token("A", 0), 0).unwrap();
        assert_eq!(rec.len(), 1);
        rec.push(token("B", 1), 1).unwrap();
        // Filling the buffer without a match resets it.
        assert!(rec.is_empty());
        rec.push(token("C", 2), 2).unwrap();
        assert_eq!(rec.len(), 1);
    }

    #[test]
    fn reset_clears_buffer() {
        let mut rec = recognizer(4, 1000);
        rec.push(token("A", 0), 0).unwrap();
        rec.push(token("B", 0), 0).unwrap();
        rec.reset();
        assert!(rec.is_empty());
        assert!(rec.snapshot().is_empty());
    }
}
