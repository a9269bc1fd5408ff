//! Interrupt hook slots
//!
//! One callback slot per timer. Slots live behind a critical-section mutex
//! so they can be swapped from thread context while an interrupt handler
//! dispatches.

use core::cell::Cell;

use critical_section::Mutex;
use log::trace;
use mcal_core::RegisterBus;

use crate::driver::Timers;
use crate::irq::InterruptSource;
use crate::layout::{Channel, TimerId};

/// What a hook is told when its timer fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerEvent {
    pub timer: TimerId,
    pub source: InterruptSource,
    /// Counter value for an overflow, compare register for a compare match
    pub latched: u16,
}

#[cfg(feature = "defmt")]
impl defmt::Format for TimerEvent {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{} {} latched={}", self.timer, self.source, self.latched);
    }
}

/// Callback run from interrupt context
pub type TimerCallback = fn(TimerEvent);

type Slot = Mutex<Cell<Option<TimerCallback>>>;

/// Single-slot callback table, one slot per timer.
pub struct HookTable {
    slots: [Slot; 3],
}

impl HookTable {
    pub const fn new() -> Self {
        const EMPTY: Slot = Mutex::new(Cell::new(None));
        Self { slots: [EMPTY; 3] }
    }

    fn slot(&self, id: TimerId) -> &Slot {
        &self.slots[id.index() as usize]
    }

    /// Install `hook` for `id`, returning the one it replaced
    pub fn register(&self, id: TimerId, hook: TimerCallback) -> Option<TimerCallback> {
        critical_section::with(|cs| self.slot(id).borrow(cs).replace(Some(hook)))
    }

    /// Remove and return the hook for `id`
    pub fn unregister(&self, id: TimerId) -> Option<TimerCallback> {
        critical_section::with(|cs| self.slot(id).borrow(cs).take())
    }

    pub fn is_registered(&self, id: TimerId) -> bool {
        critical_section::with(|cs| self.slot(id).borrow(cs).get().is_some())
    }

    /// Run the hook for `id` with the value latched for `source`.
    ///
    /// Call from the timer's interrupt handler. The hardware flag is
    /// already cleared by vector entry, so nothing is acknowledged here.
    /// The hook runs outside the critical section. Returns whether a hook
    /// ran; a compare source on a channel the timer lacks runs nothing.
    pub fn dispatch<B: RegisterBus>(
        &self,
        timers: &mut Timers<B>,
        id: TimerId,
        source: InterruptSource,
    ) -> bool {
        let hook = critical_section::with(|cs| self.slot(id).borrow(cs).get());
        let Some(hook) = hook else {
            return false;
        };

        let latched = match source {
            InterruptSource::Overflow => timers.counter(id),
            InterruptSource::Compare(ch) => match timers.compare(id, ch) {
                Ok(value) => value,
                Err(_) => return false,
            },
        };

        trace!("{} dispatch {:?} latched={}", id, source, latched);
        hook(TimerEvent {
            timer: id,
            source,
            latched,
        });
        true
    }
}

impl Default for HookTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Hooks used by the application's timer interrupt handlers
pub static HOOKS: HookTable = HookTable::new();

/// Interrupt sources in vector-table order for `id`
pub fn sources(id: TimerId) -> impl Iterator<Item = InterruptSource> {
    let channels = id.descriptor().channels();
    [
        InterruptSource::Compare(Channel::A),
        InterruptSource::Compare(Channel::B),
        InterruptSource::Overflow,
    ]
    .into_iter()
    .filter(move |src| match src {
        InterruptSource::Compare(ch) => ch.index() < channels,
        InterruptSource::Overflow => true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicU16, Ordering};
    use mcal_core::RegisterFile;

    static LAST: AtomicU16 = AtomicU16::new(0);

    fn record(event: TimerEvent) {
        LAST.store(event.latched, Ordering::SeqCst);
    }

    fn other(_: TimerEvent) {}

    #[test]
    fn test_register_replaces_previous() {
        let table = HookTable::new();
        assert!(table.register(TimerId::Timer2, record).is_none());
        assert!(table.register(TimerId::Timer2, other).is_some());
        assert!(table.is_registered(TimerId::Timer2));
        assert!(!table.is_registered(TimerId::Timer0));
        assert!(table.unregister(TimerId::Timer2).is_some());
        assert!(!table.is_registered(TimerId::Timer2));
    }

    #[test]
    fn test_dispatch_latches_compare() {
        let table = HookTable::new();
        let mut timers = Timers::new(RegisterFile::new());
        timers.set_compare(TimerId::Timer1, Channel::B, 0x0321).unwrap();

        assert!(!table.dispatch(&mut timers, TimerId::Timer1, InterruptSource::Overflow));

        table.register(TimerId::Timer1, record);
        assert!(table.dispatch(
            &mut timers,
            TimerId::Timer1,
            InterruptSource::Compare(Channel::B)
        ));
        assert_eq!(LAST.load(Ordering::SeqCst), 0x0321);
    }

    #[test]
    fn test_dispatch_missing_channel_runs_nothing() {
        let table = HookTable::new();
        let mut timers = Timers::new(RegisterFile::new());
        table.register(TimerId::Timer0, other);
        assert!(!table.dispatch(
            &mut timers,
            TimerId::Timer0,
            InterruptSource::Compare(Channel::B)
        ));
    }

    #[test]
    fn test_sources_follow_channels() {
        assert_eq!(sources(TimerId::Timer0).count(), 2);
        assert_eq!(sources(TimerId::Timer1).count(), 3);
        assert!(!sources(TimerId::Timer2).any(|s| s == InterruptSource::Compare(Channel::B)));
    }
}
