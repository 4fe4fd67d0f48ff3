/// Game entity types and the collision predicate.
///
/// Everything on screen implements `Entity`: a position, a footprint
/// and a destroyed flag.  Concrete types carry their own small
/// behaviors (movement, firing, upgrades); the frame-loop orchestration
/// lives in `session`.

use rand::Rng;

use crate::cooldown::Cooldown;
use crate::pool::BulletPool;

/// Frames the player ship stays destroyed before respawning in place.
const SHIP_RESPAWN: u64 = 30;
/// Baseline frames between player volleys.
const SHIP_FIRE_INTERVAL: u64 = 8;
/// Fastest allowed fire interval after upgrades.
const SHIP_FIRE_INTERVAL_MIN: u64 = 3;
/// Caps on the upgradeable ship stats.
const SHIP_MAX_BULLETS: u32 = 3;
const SHIP_MAX_BULLET_SPEED: i32 = 3;
const SHIP_MAX_SPEED: i32 = 3;

// ── Entity capability set ─────────────────────────────────────────────────────

/// Shared view of anything that can collide: top-left position, size,
/// and whether it is currently destroyed.
pub trait Entity {
    fn position(&self) -> (i32, i32);
    fn width(&self) -> i32;
    fn height(&self) -> i32;
    fn is_destroyed(&self) -> bool;
}

/// Center-point bounding-box test.  Two entities collide iff the
/// distance between centers is strictly below the sum of half-extents
/// on both axes — exact edge-touching is not a hit.
pub fn collides(a: &impl Entity, b: &impl Entity) -> bool {
    let (ax, ay) = a.position();
    let (bx, by) = b.position();
    // Everything doubled so half-sizes stay exact in integers.
    let center_ax = 2 * ax + a.width();
    let center_ay = 2 * ay + a.height();
    let center_bx = 2 * bx + b.width();
    let center_by = 2 * by + b.height();
    let max_dx = a.width() + b.width();
    let max_dy = a.height() + b.height();
    (center_ax - center_bx).abs() < max_dx && (center_ay - center_by).abs() < max_dy
}

// ── Projectiles ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectileKind {
    /// Ordinary bullet; the sign of `speed` tells who fired it
    /// (negative = player, moving up; positive = enemy, moving down).
    Standard,
    /// Dropped by a destroyed bonus ship; grants an upgrade on contact
    /// with the player instead of damaging it.
    Reward,
}

#[derive(Clone, Debug)]
pub struct Projectile {
    pub x: i32,
    pub y: i32,
    /// Cells moved per frame; positive moves toward the player.
    pub speed: i32,
    pub kind: ProjectileKind,
}

impl Projectile {
    /// Advance by one frame's displacement.
    pub fn update(&mut self) {
        self.y += self.speed;
    }
}

impl Entity for Projectile {
    fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }
    fn width(&self) -> i32 {
        match self.kind {
            ProjectileKind::Standard => 1,
            // Wider hitbox so the drop is catchable.
            ProjectileKind::Reward => 3,
        }
    }
    fn height(&self) -> i32 {
        1
    }
    fn is_destroyed(&self) -> bool {
        false
    }
}

// ── Player ship ───────────────────────────────────────────────────────────────

/// The player's ship.  3×2 sprite; owns its movement step, fire gate
/// and the upgrade state the reward engine mutates.
#[derive(Clone, Debug)]
pub struct Ship {
    pub x: i32,
    pub y: i32,
    /// Cells moved per frame while a direction key is held.
    pub speed: i32,
    /// Bullets per volley.
    pub bullet_count: u32,
    /// Frames between volleys.
    pub fire_interval: u64,
    /// Cells a fired bullet climbs per frame.
    pub bullet_speed: i32,
    /// Visual tier; bumped once by the stage reward.
    pub tier: u8,
    destroyed: bool,
    fire_gate: Cooldown,
    respawn: Cooldown,
}

impl Ship {
    pub const WIDTH: i32 = 3;
    pub const HEIGHT: i32 = 2;

    pub fn new(x: i32, y: i32) -> Self {
        Ship {
            x,
            y,
            speed: 1,
            bullet_count: 1,
            fire_interval: SHIP_FIRE_INTERVAL,
            bullet_speed: 1,
            tier: 1,
            destroyed: false,
            fire_gate: Cooldown::new(SHIP_FIRE_INTERVAL),
            respawn: Cooldown::new(SHIP_RESPAWN),
        }
    }

    pub fn move_left(&mut self) {
        self.x -= self.speed;
    }

    pub fn move_right(&mut self) {
        self.x += self.speed;
    }

    /// Fire a volley into the live set, drawing bullets from the pool.
    /// Returns false while the fire gate is still closed.
    pub fn shoot(
        &mut self,
        bullets: &mut Vec<Projectile>,
        pool: &mut BulletPool,
        now: u64,
        rng: &mut impl Rng,
    ) -> bool {
        if !self.fire_gate.is_finished(now) {
            return false;
        }
        self.fire_gate.reset(now, rng);
        let center = self.x + Self::WIDTH / 2;
        let offsets: &[i32] = match self.bullet_count {
            1 => &[0],
            2 => &[-1, 1],
            _ => &[-2, 0, 2],
        };
        for off in offsets {
            bullets.push(pool.acquire(
                center + off,
                self.y - 1,
                -self.bullet_speed,
                ProjectileKind::Standard,
            ));
        }
        true
    }

    /// Mark the ship destroyed; it lingers destroyed while the respawn
    /// gate runs and then comes back in place.
    pub fn destroy(&mut self, now: u64, rng: &mut impl Rng) {
        self.destroyed = true;
        self.respawn.reset(now, rng);
    }

    /// Per-frame upkeep: clear the destroyed flag once the respawn gate
    /// opens.
    pub fn update(&mut self, now: u64) {
        if self.destroyed && self.respawn.is_finished(now) {
            self.destroyed = false;
        }
    }

    // Upgrade mutators, driven by the reward engine.

    pub fn increase_bullet_count(&mut self) {
        self.bullet_count = (self.bullet_count + 1).min(SHIP_MAX_BULLETS);
    }

    pub fn decrease_fire_interval(&mut self) {
        self.fire_interval = self.fire_interval.saturating_sub(1).max(SHIP_FIRE_INTERVAL_MIN);
        // An armed fire gate keeps its deadline; no free shot mid-cooldown.
        self.fire_gate.retime(self.fire_interval);
    }

    pub fn increase_bullet_speed(&mut self) {
        self.bullet_speed = (self.bullet_speed + 1).min(SHIP_MAX_BULLET_SPEED);
    }

    pub fn increase_speed(&mut self) {
        self.speed = (self.speed + 1).min(SHIP_MAX_SPEED);
    }

    /// Stage reward: permanent hull change.
    pub fn change_tier(&mut self) {
        self.tier = 2;
    }
}

impl Entity for Ship {
    fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }
    fn width(&self) -> i32 {
        Self::WIDTH
    }
    fn height(&self) -> i32 {
        Self::HEIGHT
    }
    fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

// ── Formation enemies ─────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnemyKind {
    A,
    B,
    C,
}

impl EnemyKind {
    pub fn point_value(self) -> u32 {
        match self {
            EnemyKind::A => 10,
            EnemyKind::B => 20,
            EnemyKind::C => 30,
        }
    }
}

#[derive(Clone, Debug)]
pub struct EnemyShip {
    pub x: i32,
    pub y: i32,
    pub kind: EnemyKind,
    pub destroyed: bool,
}

impl EnemyShip {
    pub const WIDTH: i32 = 3;
    pub const HEIGHT: i32 = 2;

    pub fn new(x: i32, y: i32, kind: EnemyKind) -> Self {
        EnemyShip {
            x,
            y,
            kind,
            destroyed: false,
        }
    }
}

impl Entity for EnemyShip {
    fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }
    fn width(&self) -> i32 {
        Self::WIDTH
    }
    fn height(&self) -> i32 {
        Self::HEIGHT
    }
    fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

// ── Bonus ship ────────────────────────────────────────────────────────────────

/// The transient saucer that crosses along the separation line.  While
/// destroyed it keeps its position (explosion linger) until the session
/// converts it into a reward projectile.
#[derive(Clone, Debug)]
pub struct BonusShip {
    pub x: i32,
    pub y: i32,
    pub destroyed: bool,
}

impl BonusShip {
    pub const WIDTH: i32 = 5;
    pub const HEIGHT: i32 = 2;
    pub const POINT_VALUE: u32 = 100;
    /// Cells crossed per frame, left to right.
    pub const SPEED: i32 = 1;

    pub fn new(y: i32) -> Self {
        BonusShip {
            x: -Self::WIDTH,
            y,
            destroyed: false,
        }
    }

    pub fn advance(&mut self) {
        self.x += Self::SPEED;
    }
}

impl Entity for BonusShip {
    fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }
    fn width(&self) -> i32 {
        Self::WIDTH
    }
    fn height(&self) -> i32 {
        Self::HEIGHT
    }
    fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

// ── Session-level data ────────────────────────────────────────────────────────

/// Snapshot of a session's progress, carried between levels by the
/// enclosing application and emitted when a session ends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    pub level: u32,
    pub score: u32,
    pub lives_remaining: u32,
    pub bullets_shot: u32,
    pub ships_destroyed: u32,
    /// The end-of-level reward banner, shown again during the next
    /// level's countdown.
    pub reward_banner: String,
}

impl GameState {
    pub fn new(level: u32, score: u32, lives_remaining: u32) -> Self {
        GameState {
            level,
            score,
            lives_remaining,
            bullets_shot: 0,
            ships_destroyed: 0,
            reward_banner: String::new(),
        }
    }
}

/// Difficulty knobs for one level's enemy formation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameSettings {
    /// Formation grid size.
    pub formation_width: u32,
    pub formation_height: u32,
    /// Frames between formation march steps (lower = faster).
    pub march_interval: u64,
    /// Base frames between enemy shots (variable cooldown).
    pub shoot_interval: u64,
}

impl GameSettings {
    /// Fixed level-1 difficulty, also used by the pause-menu restart.
    pub fn restart() -> Self {
        GameSettings {
            formation_width: 5,
            formation_height: 4,
            march_interval: 20,
            shoot_interval: 90,
        }
    }
}

/// Fire-and-forget notifications for the audio collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SoundEvent {
    Shoot,
    /// An enemy or bonus ship blew up.
    EnemyExplosion,
    /// The player ship took a hit.
    ShipExplosion,
    /// A reward projectile was caught.
    Pickup,
}
