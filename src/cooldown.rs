/// Frame-based countdown gates.
///
/// Every timed behavior in the game (input delay, bonus-ship spawns,
/// explosion linger, pause debounce, reward banner, end-of-level
/// transition) is gated by one of these.  A `Cooldown` holds a duration
/// in frames and a deadline on a caller-supplied monotonic frame
/// counter; it never reads the wall clock, so a session whose frame
/// counter is frozen (paused) freezes all of its cooldowns with it.

use rand::Rng;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Duration {
    Fixed(u64),
    /// Redrawn uniformly from `[base, base + variance)` on every reset.
    Variable { base: u64, variance: u64 },
}

#[derive(Clone, Debug)]
pub struct Cooldown {
    duration: Duration,
    deadline: u64,
}

impl Cooldown {
    /// A cooldown with a fixed duration.  Finished until first `reset`.
    pub fn new(duration: u64) -> Self {
        Cooldown {
            duration: Duration::Fixed(duration),
            deadline: 0,
        }
    }

    /// A cooldown whose duration is re-sampled from
    /// `[base, base + variance)` each time it is reset.
    pub fn variable(base: u64, variance: u64) -> Self {
        Cooldown {
            duration: Duration::Variable { base, variance },
            deadline: 0,
        }
    }

    /// Arm the gate: deadline becomes `now + duration`.
    pub fn reset(&mut self, now: u64, rng: &mut impl Rng) {
        let duration = match self.duration {
            Duration::Fixed(d) => d,
            Duration::Variable { base, variance } => rng.gen_range(base..base + variance),
        };
        self.deadline = now + duration;
    }

    /// Change the duration in place.  An armed deadline is kept; the
    /// new duration takes effect on the next `reset`.
    pub fn retime(&mut self, duration: u64) {
        self.duration = Duration::Fixed(duration);
    }

    /// True iff the deadline has passed.  Pure query, callers poll it
    /// every frame.
    pub fn is_finished(&self, now: u64) -> bool {
        now >= self.deadline
    }

    /// Frames left until the gate opens (0 when finished).  Used by the
    /// renderer for the start-of-level countdown.
    pub fn remaining(&self, now: u64) -> u64 {
        self.deadline.saturating_sub(now)
    }
}
