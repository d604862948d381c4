//! Word-by-word reveal of finished AI output.
//!
//! The text is already complete when a reveal starts; the animation is
//! cosmetic. Each tick pushes one more whitespace-delimited word into the
//! target, then a final tick writes the exact original string (undoing any
//! whitespace normalization from the join) and restores the scroll offset
//! captured before the first tick.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

/// Default delay between revealed words.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(50);

/// Receives revealed text.
pub trait RevealTarget: Send + 'static {
    /// Called once with the complete text before any update.
    fn begin(&mut self, _text: &str) {}

    /// Replace the displayed text.
    fn update(&mut self, text: &str);

    /// Current scroll offset of the display surface.
    fn scroll_offset(&self) -> u32 {
        0
    }

    /// Put the display surface back at `offset`.
    fn restore_scroll(&mut self, _offset: u32) {}
}

/// A running reveal.
#[derive(Debug)]
pub struct RevealHandle {
    task: JoinHandle<()>,
}

impl RevealHandle {
    /// Stop the reveal. No further updates are delivered.
    pub fn abort(&self) {
        self.task.abort();
    }

    /// Whether the reveal has finished or been aborted.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the reveal to end. Returns `true` if it ran to completion.
    pub async fn join(&mut self) -> bool {
        (&mut self.task).await.is_ok()
    }
}

/// Start revealing `text` into `target`, one word per `interval`.
///
/// A zero `interval` writes the whole text in a single update.
#[tracing::instrument(skip_all, fields(text_len = text.len(), ?interval))]
pub fn reveal<T: RevealTarget>(text: String, mut target: T, interval: Duration) -> RevealHandle {
    let task = tokio::spawn(async move {
        target.begin(&text);
        let scroll = target.scroll_offset();
        if interval.is_zero() {
            target.update(&text);
            target.restore_scroll(scroll);
            return;
        }
        let words: Vec<&str> = text.split_whitespace().collect();

        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick fires immediately.
        ticker.tick().await;

        for revealed in 1..=words.len() {
            ticker.tick().await;
            target.update(&words[..revealed].join(" "));
        }

        ticker.tick().await;
        target.update(&text);
        target.restore_scroll(scroll);
        tracing::debug!(words = words.len(), "reveal complete");
    });

    RevealHandle { task }
}

/// Holds at most one running reveal.
///
/// Starting a new reveal aborts the previous one, as do [`RevealSlot::clear`]
/// and dropping the slot.
#[derive(Debug, Default)]
pub struct RevealSlot {
    current: Option<RevealHandle>,
}

impl RevealSlot {
    /// Empty slot.
    pub const fn new() -> Self {
        Self { current: None }
    }

    /// Abort any running reveal and start a new one.
    pub fn start<T: RevealTarget>(&mut self, text: String, target: T, interval: Duration) {
        self.clear();
        self.current = Some(reveal(text, target, interval));
    }

    /// Abort the running reveal, if any.
    pub fn clear(&mut self) {
        if let Some(handle) = self.current.take() {
            handle.abort();
        }
    }

    /// Whether a reveal is still in progress.
    pub fn is_running(&self) -> bool {
        self.current.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Wait for the running reveal to finish. Returns `false` if there was
    /// none or it was aborted.
    pub async fn wait(&mut self) -> bool {
        match self.current.as_mut() {
            Some(handle) => {
                let completed = handle.join().await;
                self.current = None;
                completed
            }
            None => false,
        }
    }
}

impl Drop for RevealSlot {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Recorder {
        updates: Arc<Mutex<Vec<String>>>,
        scroll: Arc<Mutex<(u32, Option<u32>)>>,
    }

    impl Recorder {
        fn with_scroll(offset: u32) -> Self {
            let recorder = Self::default();
            recorder.scroll.lock().unwrap().0 = offset;
            recorder
        }

        fn updates(&self) -> Vec<String> {
            self.updates.lock().unwrap().clone()
        }

        fn restored(&self) -> Option<u32> {
            self.scroll.lock().unwrap().1
        }
    }

    impl RevealTarget for Recorder {
        fn update(&mut self, text: &str) {
            self.updates.lock().unwrap().push(text.to_string());
        }

        fn scroll_offset(&self) -> u32 {
            self.scroll.lock().unwrap().0
        }

        fn restore_scroll(&mut self, offset: u32) {
            self.scroll.lock().unwrap().1 = Some(offset);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn reveals_prefixes_then_original() {
        let recorder = Recorder::default();
        let mut handle = reveal("a b c".into(), recorder.clone(), DEFAULT_INTERVAL);

        assert!(handle.join().await);
        assert_eq!(recorder.updates(), vec!["a", "a b", "a b c", "a b c"]);

        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(recorder.updates().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn final_update_restores_exact_whitespace() {
        let recorder = Recorder::default();
        let text = "one  two\n\nthree ";
        let mut handle = reveal(text.into(), recorder.clone(), DEFAULT_INTERVAL);
        handle.join().await;

        let updates = recorder.updates();
        assert_eq!(updates[..3], ["one", "one two", "one two three"]);
        assert_eq!(updates.last().map(String::as_str), Some(text));
    }

    #[tokio::test(start_paused = true)]
    async fn scroll_offset_is_restored() {
        let recorder = Recorder::with_scroll(42);
        let mut handle = reveal("x y".into(), recorder.clone(), DEFAULT_INTERVAL);
        handle.join().await;
        assert_eq!(recorder.restored(), Some(42));
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_follow_the_interval() {
        let recorder = Recorder::default();
        let _handle = reveal("a b c".into(), recorder.clone(), DEFAULT_INTERVAL);

        time::sleep(Duration::from_millis(75)).await;
        assert_eq!(recorder.updates(), vec!["a"]);
        time::sleep(Duration::from_millis(50)).await;
        assert_eq!(recorder.updates(), vec!["a", "a b"]);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_text_emits_only_the_final_update() {
        let recorder = Recorder::default();
        let mut handle = reveal(String::new(), recorder.clone(), DEFAULT_INTERVAL);
        handle.join().await;
        assert_eq!(recorder.updates(), vec![""]);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_writes_everything_at_once() {
        let recorder = Recorder::with_scroll(7);
        let mut handle = reveal("a b c".into(), recorder.clone(), Duration::ZERO);

        assert!(handle.join().await);
        assert_eq!(recorder.updates(), vec!["a b c"]);
        assert_eq!(recorder.restored(), Some(7));
    }

    #[tokio::test(start_paused = true)]
    async fn new_reveal_aborts_previous() {
        let first = Recorder::default();
        let second = Recorder::default();
        let mut slot = RevealSlot::new();

        slot.start("a b c d".into(), first.clone(), DEFAULT_INTERVAL);
        time::sleep(Duration::from_millis(75)).await;
        assert_eq!(first.updates(), vec!["a"]);

        slot.start("x y".into(), second.clone(), DEFAULT_INTERVAL);
        assert!(slot.wait().await);

        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(first.updates(), vec!["a"]);
        assert_eq!(second.updates(), vec!["x", "x y", "x y"]);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_slot_stops_updates() {
        let recorder = Recorder::default();
        let mut slot = RevealSlot::new();
        slot.start("a b c".into(), recorder.clone(), DEFAULT_INTERVAL);
        assert!(slot.is_running());

        time::sleep(Duration::from_millis(75)).await;
        drop(slot);
        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(recorder.updates(), vec!["a"]);
    }

    #[tokio::test(start_paused = true)]
    async fn cleared_slot_has_nothing_to_wait_for() {
        let mut slot = RevealSlot::new();
        slot.start("a".into(), Recorder::default(), DEFAULT_INTERVAL);
        slot.clear();
        assert!(!slot.is_running());
        assert!(!slot.wait().await);
    }
}
