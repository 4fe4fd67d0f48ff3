//! Run-time core of a terminal arcade shooter: a per-frame game loop
//! advancing a player ship, an enemy formation, a transient bonus ship
//! and a pooled projectile set, with collision, scoring, life rules and
//! the Running / Paused / Finished state machine.
//!
//! The simulation lives in [`session`]; it is deterministic given its
//! input and RNG, so tests drive it with a seeded [`rand::rngs::StdRng`].
//! All terminal I/O is confined to [`display`] and the binary shell.

pub mod cooldown;
pub mod display;
pub mod entities;
pub mod formation;
pub mod pool;
pub mod session;
