//! Input for the main loop. Keys and resizes arrive through a channel; when
//! nothing arrives within the refresh interval the loop gets a `Tick`, which
//! re-derives the count and rewrites the recovery backup. Elapsed time is
//! never taken from ticks.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

pub trait EventSource: Send + 'static {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;
}

/// Events fed through a channel: by the terminal reader in the binary, by
/// the test itself in headless runs
pub struct ChannelEventSource {
    rx: Receiver<AppEvent>,
}

impl ChannelEventSource {
    pub fn new(rx: Receiver<AppEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for ChannelEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Spawn the terminal reader. Only key presses count: a release would toggle
/// the session timer a second time on terminals that report both.
pub fn terminal_events() -> ChannelEventSource {
    let (tx, rx) = mpsc::channel();

    std::thread::spawn(move || loop {
        let ev = match event::read() {
            Ok(CtEvent::Key(key)) if key.kind == KeyEventKind::Press => AppEvent::Key(key),
            Ok(CtEvent::Resize(_, _)) => AppEvent::Resize,
            Ok(_) => continue,
            Err(e) => {
                log::warn!("terminal event reader stopped: {e}");
                break;
            }
        };
        if tx.send(ev).is_err() {
            break;
        }
    });

    ChannelEventSource::new(rx)
}

pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Display refresh every `tick_rate_ms`
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn from_millis(ms: u64) -> Self {
        Self {
            interval: Duration::from_millis(ms.max(1)),
        }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

pub struct Runner<E: EventSource, T: Ticker> {
    events: E,
    ticker: T,
}

impl<E: EventSource, T: Ticker> Runner<E, T> {
    pub fn new(events: E, ticker: T) -> Self {
        Self { events, ticker }
    }

    pub fn interval(&self) -> Duration {
        self.ticker.interval()
    }

    /// Next key or resize, or `Tick` once the refresh interval passes.
    /// A closed source keeps ticking so a running session stays on screen.
    pub fn step(&self) -> AppEvent {
        match self.events.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => AppEvent::Tick,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    #[test]
    fn quiet_interval_ticks() {
        let (_tx, rx) = mpsc::channel();
        let runner = Runner::new(ChannelEventSource::new(rx), FixedTicker::from_millis(1));
        assert!(matches!(runner.step(), AppEvent::Tick));
    }

    #[test]
    fn queued_keys_come_before_ticks() {
        let (tx, rx) = mpsc::channel();
        let space = KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE);
        tx.send(AppEvent::Key(space)).unwrap();
        tx.send(AppEvent::Resize).unwrap();
        let runner = Runner::new(ChannelEventSource::new(rx), FixedTicker::from_millis(10));
        assert!(matches!(runner.step(), AppEvent::Key(k) if k.code == KeyCode::Char(' ')));
        assert!(matches!(runner.step(), AppEvent::Resize));
        assert!(matches!(runner.step(), AppEvent::Tick));
    }

    #[test]
    fn closed_source_keeps_ticking() {
        let (tx, rx) = mpsc::channel::<AppEvent>();
        drop(tx);
        let runner = Runner::new(ChannelEventSource::new(rx), FixedTicker::from_millis(5));
        assert!(matches!(runner.step(), AppEvent::Tick));
        assert!(matches!(runner.step(), AppEvent::Tick));
    }

    #[test]
    fn zero_tick_rate_is_bumped() {
        assert_eq!(FixedTicker::from_millis(0).interval(), Duration::from_millis(1));
        assert_eq!(FixedTicker::from_millis(250).interval(), Duration::from_millis(250));
    }
}
