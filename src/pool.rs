/// Projectile recycling pool.
///
/// Bullets leave the live set dozens of times per second; instead of
/// dropping them, off-screen and spent projectiles go back into this
/// free-list and are handed out again on the next `acquire`.  A
/// projectile is never in the live set and the pool at the same time —
/// `recycle` consumes the batch the caller just drained.

use crate::entities::{Projectile, ProjectileKind};

#[derive(Debug, Default)]
pub struct BulletPool {
    free: Vec<Projectile>,
}

impl BulletPool {
    pub fn new() -> Self {
        BulletPool { free: Vec::new() }
    }

    /// Hand out a projectile with the given state, reusing a recycled
    /// slot when one is available.
    pub fn acquire(&mut self, x: i32, y: i32, speed: i32, kind: ProjectileKind) -> Projectile {
        match self.free.pop() {
            Some(mut p) => {
                p.x = x;
                p.y = y;
                p.speed = speed;
                p.kind = kind;
                p
            }
            None => Projectile { x, y, speed, kind },
        }
    }

    /// Return a batch of projectiles removed from the live set.
    pub fn recycle(&mut self, spent: impl IntoIterator<Item = Projectile>) {
        self.free.extend(spent);
    }

    /// Number of recycled projectiles waiting for reuse.
    pub fn available(&self) -> usize {
        self.free.len()
    }
}
