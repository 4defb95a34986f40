use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Simulated time, advanced only by the driving loop.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimClock {
    now_seconds: f64,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> f64 {
        self.now_seconds
    }

    pub fn advance(&mut self, dt_seconds: f32) {
        if dt_seconds.is_finite() && dt_seconds > 0.0 {
            self.now_seconds += f64::from(dt_seconds);
        }
    }
}

#[derive(Debug)]
struct ScheduledTimer<T> {
    due_seconds: f64,
    seq: u64,
    event: T,
}

impl<T> PartialEq for ScheduledTimer<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for ScheduledTimer<T> {}

impl<T> PartialOrd for ScheduledTimer<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for ScheduledTimer<T> {
    // Reversed so the max-heap pops the earliest due timer, ties in insertion order.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due_seconds
            .total_cmp(&self.due_seconds)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Deferred continuations keyed by the logical clock. Nothing blocks: the
/// owner polls [`TimerQueue::pop_due`] after advancing its clock.
#[derive(Debug)]
pub struct TimerQueue<T> {
    heap: BinaryHeap<ScheduledTimer<T>>,
    next_seq: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule_at(&mut self, due_seconds: f64, event: T) {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.saturating_add(1);
        self.heap.push(ScheduledTimer {
            due_seconds,
            seq,
            event,
        });
    }

    pub fn schedule_after(&mut self, clock: &SimClock, delay_seconds: f32, event: T) {
        let delay = if delay_seconds.is_finite() {
            f64::from(delay_seconds.max(0.0))
        } else {
            0.0
        };
        self.schedule_at(clock.now() + delay, event);
    }

    pub fn pop_due(&mut self, now_seconds: f64) -> Option<T> {
        if self.heap.peek()?.due_seconds > now_seconds {
            return None;
        }
        self.heap.pop().map(|timer| timer.event)
    }

    pub fn next_due(&self) -> Option<f64> {
        self.heap.peek().map(|timer| timer.due_seconds)
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
