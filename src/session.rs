/// The per-level game session: one non-recursive frame loop advancing
/// the player ship, the enemy formation, the bonus ship and the live
/// projectile set, with collision, scoring and life rules.
///
/// The session is driven by the shell: once per rendered frame it is
/// handed a `FrameInput` and an RNG and returns whether the level is
/// still in progress.  Running, Paused and Finished are sibling states
/// of one explicit `Phase` enum — pausing freezes the simulation clock
/// rather than re-entering a nested loop.

use log::info;
use rand::Rng;

use crate::cooldown::Cooldown;
use crate::entities::{
    collides, BonusShip, Entity, GameSettings, GameState, Projectile, ProjectileKind, Ship,
    SoundEvent,
};
use crate::formation::EnemyShipFormation;
use crate::pool::BulletPool;

/// Simulation rate the frame counts below are calibrated for.
pub const FRAMES_PER_SECOND: u64 = 30;

/// Frames until the session accepts player/enemy activity.
const INPUT_DELAY: u64 = 6 * FRAMES_PER_SECOND;
/// Bonus score for each life remaining at the end of the level beyond
/// the first.
const LIFE_SCORE: u32 = 100;
/// Minimum frames between bonus ship appearances, plus random variance.
const BONUS_SHIP_INTERVAL: u64 = 225;
const BONUS_SHIP_VARIANCE: u64 = 150;
/// Frames the bonus ship explosion lingers before the reward drop.
const BONUS_SHIP_EXPLOSION: u64 = 15;
/// Frames from finishing the level to handing control back.
const SCREEN_CHANGE_INTERVAL: u64 = 45;
/// Debounce for entering/leaving the pause state.
const PAUSE_DEBOUNCE: u64 = 15;
/// Frames the reward banner stays on screen.
const REWARD_BANNER: u64 = 2 * FRAMES_PER_SECOND;

/// Outcome-set sizes for the reward draw (0..=3 upgrade, 4 = nothing).
pub const REWARD_WITHOUT_FAIL: u32 = 4;
pub const REWARD_WITH_FAIL: u32 = 5;

/// Completing this level grants the one-off stage reward.
pub const FINAL_LEVEL: u32 = 3;

/// Height of the interface separation line; nothing lives above it.
pub const SEPARATION_LINE: i32 = 2;

/// Fixed session values after a pause-menu restart.
const RESTART_LIVES: u32 = 3;

const MIN_FIELD_WIDTH: i32 = 40;
const MIN_FIELD_HEIGHT: i32 = 16;

// ── Shell-facing types ────────────────────────────────────────────────────────

/// Macro-state of the session.  Exactly one holds at any instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Running,
    /// Modal pause: the simulation clock is frozen; only the pause
    /// menu's own debounce keeps ticking.
    Paused,
    /// Level-clear or all-lives-lost latched; counting down to exit.
    Finished,
}

/// Discrete key states polled by the shell each frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput {
    pub left: bool,
    pub right: bool,
    pub fire: bool,
    /// Pause toggle (also resumes from the pause menu).
    pub pause: bool,
    /// Pause menu: restart from level 1.
    pub restart: bool,
    /// Pause menu: quit to the enclosing menu.
    pub quit: bool,
}

/// What the shell should do after this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateResult {
    InProgress,
    /// The finish countdown elapsed; read `game_state()` and move on.
    Finished,
    /// The player quit to the menu from the pause screen.
    Aborted,
}

// ── Session ───────────────────────────────────────────────────────────────────

pub struct GameSession {
    pub settings: GameSettings,
    pub level: u32,
    pub score: u32,
    pub lives: u32,
    pub bullets_shot: u32,
    pub ships_destroyed: u32,
    pub ship: Ship,
    pub formation: EnemyShipFormation,
    /// At most one bonus ship at a time; `None` is the steady state.
    pub bonus_ship: Option<BonusShip>,
    /// The live projectile set.  Uniqueness holds by construction:
    /// projectiles enter only through the pool and leave in batches.
    pub bullets: Vec<Projectile>,
    pub width: i32,
    pub height: i32,
    pub phase: Phase,
    pub bonus_life: bool,
    pub reward_banner: String,
    pool: BulletPool,
    /// Simulation clock; frozen while paused.
    frame: u64,
    /// Wall clock in update calls; only the pause debounce reads it.
    clock: u64,
    input_delay: Cooldown,
    bonus_spawn: Cooldown,
    bonus_explosion: Cooldown,
    screen_finished: Cooldown,
    pause_debounce: Cooldown,
    banner_timer: Cooldown,
    sounds: Vec<SoundEvent>,
}

impl GameSession {
    /// Build a session from the carried game state.  The ship comes
    /// from the enclosing application so upgrades persist between
    /// levels; it is recentered at the bottom of the field.
    ///
    /// Panics on a malformed snapshot (no lives, degenerate field) —
    /// that is a contract violation, not a runtime error.
    pub fn new(
        state: GameState,
        settings: GameSettings,
        bonus_life: bool,
        mut ship: Ship,
        width: i32,
        height: i32,
        rng: &mut impl Rng,
    ) -> Self {
        assert!(state.lives_remaining >= 1, "session needs at least one life");
        assert!(
            width >= MIN_FIELD_WIDTH && height >= MIN_FIELD_HEIGHT,
            "field {}x{} below minimum {}x{}",
            width,
            height,
            MIN_FIELD_WIDTH,
            MIN_FIELD_HEIGHT
        );

        ship.x = width / 2 - Ship::WIDTH / 2;
        ship.y = height - 4;

        let mut lives = state.lives_remaining;
        if bonus_life {
            lives += 1;
        }

        let mut session = GameSession {
            formation: EnemyShipFormation::new(&settings, width, SEPARATION_LINE + 1),
            settings,
            level: state.level,
            score: state.score,
            lives,
            bullets_shot: state.bullets_shot,
            ships_destroyed: state.ships_destroyed,
            ship,
            bonus_ship: None,
            bullets: Vec::new(),
            width,
            height,
            phase: Phase::Running,
            bonus_life,
            reward_banner: state.reward_banner,
            pool: BulletPool::new(),
            frame: 0,
            clock: 0,
            input_delay: Cooldown::new(INPUT_DELAY),
            bonus_spawn: Cooldown::variable(BONUS_SHIP_INTERVAL, BONUS_SHIP_VARIANCE),
            bonus_explosion: Cooldown::new(BONUS_SHIP_EXPLOSION),
            screen_finished: Cooldown::new(SCREEN_CHANGE_INTERVAL),
            pause_debounce: Cooldown::new(PAUSE_DEBOUNCE),
            banner_timer: Cooldown::new(REWARD_BANNER),
            sounds: Vec::new(),
        };
        session.input_delay.reset(0, rng);
        session.bonus_spawn.reset(0, rng);
        session.pause_debounce.reset(0, rng);
        session
    }

    /// Advance one frame.  Collision, cleanup and the finish latch run
    /// every frame; player/enemy/bonus activity is gated behind the
    /// initial input delay and stops once the level has finished.
    pub fn update(&mut self, input: &FrameInput, rng: &mut impl Rng) -> UpdateResult {
        self.clock += 1;
        if self.phase == Phase::Paused {
            return self.update_paused(input, rng);
        }
        self.frame += 1;
        let now = self.frame;
        let finished = self.phase == Phase::Finished;

        if self.input_delay.is_finished(now) && !finished {
            if !self.ship.is_destroyed() {
                let at_left = self.ship.x - self.ship.speed < 1;
                let at_right = self.ship.x + Ship::WIDTH + self.ship.speed > self.width - 1;
                if input.right && !at_right {
                    self.ship.move_right();
                }
                if input.left && !at_left {
                    self.ship.move_left();
                }
                if input.fire && self.ship.shoot(&mut self.bullets, &mut self.pool, now, rng) {
                    self.bullets_shot += 1;
                    self.sounds.push(SoundEvent::Shoot);
                }
                if input.pause && self.pause_debounce.is_finished(self.clock) {
                    self.pause_debounce.reset(self.clock, rng);
                    self.phase = Phase::Paused;
                    info!("paused");
                    return UpdateResult::InProgress;
                }
            }

            self.update_bonus_ship(now, rng);
            self.ship.update(now);
            self.formation.update(now, rng);
            self.formation
                .shoot(&mut self.bullets, &mut self.pool, now, rng);
        }

        self.manage_collisions(now, rng);
        self.clean_bullets();

        if (self.formation.is_empty() || self.lives == 0) && self.phase != Phase::Finished {
            self.phase = Phase::Finished;
            self.screen_finished.reset(now, rng);
            info!(
                "level {} finished ({} lives left)",
                self.level, self.lives
            );
        }

        if self.phase == Phase::Finished && self.screen_finished.is_finished(now) {
            if self.level == FINAL_LEVEL {
                self.stage_reward();
            }
            self.grant_reward(REWARD_WITHOUT_FAIL, rng);
            self.score += LIFE_SCORE * self.lives.saturating_sub(1);
            info!("screen cleared with a score of {}", self.score);
            return UpdateResult::Finished;
        }

        UpdateResult::InProgress
    }

    /// Pause-menu polling.  Unrecognized input means "stay paused".
    fn update_paused(&mut self, input: &FrameInput, rng: &mut impl Rng) -> UpdateResult {
        if input.quit {
            info!("quit to menu");
            return UpdateResult::Aborted;
        }
        if input.restart {
            self.restart(rng);
            return UpdateResult::InProgress;
        }
        if input.pause && self.pause_debounce.is_finished(self.clock) {
            self.pause_debounce.reset(self.clock, rng);
            self.phase = Phase::Running;
            info!("resumed");
        }
        UpdateResult::InProgress
    }

    /// Pause-menu restart: back to level 1 with the fixed initial
    /// values, a fresh formation and a re-armed input delay.  The ship
    /// keeps its upgrades, as when moving between levels.
    fn restart(&mut self, rng: &mut impl Rng) {
        self.settings = GameSettings::restart();
        self.level = 1;
        self.score = 0;
        self.lives = RESTART_LIVES;
        self.bullets_shot = 0;
        self.ships_destroyed = 0;
        self.formation = EnemyShipFormation::new(&self.settings, self.width, SEPARATION_LINE + 1);
        self.bonus_ship = None;
        self.reward_banner.clear();
        let spent = std::mem::take(&mut self.bullets);
        self.pool.recycle(spent);
        self.ship.x = self.width / 2 - Ship::WIDTH / 2;
        self.input_delay.reset(self.frame, rng);
        self.bonus_spawn.reset(self.frame, rng);
        self.pause_debounce.reset(self.clock, rng);
        self.phase = Phase::Running;
        info!("restart");
    }

    /// Bonus-ship controller: Absent → Alive → (Destroyed-lingering →
    /// reward drop) or escape past the right edge.  The spawn timer is
    /// re-armed only on a successful spawn.
    fn update_bonus_ship(&mut self, now: u64, rng: &mut impl Rng) {
        let mut drop_at: Option<(i32, i32)> = None;
        match &mut self.bonus_ship {
            Some(bonus) if !bonus.destroyed => bonus.advance(),
            Some(bonus) if self.bonus_explosion.is_finished(now) => {
                drop_at = Some((bonus.x + BonusShip::WIDTH / 2, bonus.y));
            }
            _ => {}
        }
        if let Some((center_x, y)) = drop_at {
            self.bonus_ship = None;
            info!("a reward projectile appears");
            let mut reward = self.pool.acquire(0, y, 1, ProjectileKind::Reward);
            reward.x = center_x - reward.width() / 2;
            self.bullets.push(reward);
        }

        if self.bonus_ship.is_none() && self.bonus_spawn.is_finished(now) {
            self.bonus_ship = Some(BonusShip::new(SEPARATION_LINE));
            self.bonus_spawn.reset(now, rng);
            info!("a bonus ship appears");
        }
        if let Some(bonus) = &self.bonus_ship {
            if bonus.x > self.width {
                self.bonus_ship = None;
                info!("the bonus ship has escaped");
            }
        }
    }

    /// Per-frame collision scan between every live projectile and the
    /// relevant ships.  Marked projectiles are removed and recycled in
    /// one batch after the full scan.
    fn manage_collisions(&mut self, now: u64, rng: &mut impl Rng) {
        let mut recyclable: Vec<usize> = Vec::new();
        let finished = self.phase == Phase::Finished;

        for bi in 0..self.bullets.len() {
            if self.bullets[bi].speed > 0 {
                // Moving toward the player.
                if !finished && collides(&self.bullets[bi], &self.ship) {
                    if !recyclable.contains(&bi) {
                        recyclable.push(bi);
                    }
                    if !self.ship.is_destroyed() {
                        if self.bullets[bi].kind == ProjectileKind::Reward {
                            info!("reward acquired");
                            self.sounds.push(SoundEvent::Pickup);
                            self.grant_reward(REWARD_WITH_FAIL, rng);
                        } else {
                            self.ship.destroy(now, rng);
                            self.sounds.push(SoundEvent::ShipExplosion);
                            self.lives = self.lives.saturating_sub(1);
                            info!("hit on player ship, {} lives remaining", self.lives);
                        }
                    }
                }
            } else {
                // Player-fired: test the formation, then the bonus ship.
                let mut hits: Vec<(usize, u32)> = Vec::new();
                for (ei, enemy) in self.formation.iter().enumerate() {
                    if !enemy.is_destroyed() && collides(&self.bullets[bi], enemy) {
                        hits.push((ei, enemy.kind.point_value()));
                    }
                }
                for (ei, points) in hits {
                    self.score += points;
                    self.ships_destroyed += 1;
                    self.formation.destroy(ei);
                    self.sounds.push(SoundEvent::EnemyExplosion);
                    if !recyclable.contains(&bi) {
                        recyclable.push(bi);
                    }
                }

                if let Some(bonus) = &mut self.bonus_ship {
                    if !bonus.destroyed && collides(&self.bullets[bi], &*bonus) {
                        self.score += BonusShip::POINT_VALUE;
                        self.ships_destroyed += 1;
                        bonus.destroyed = true;
                        self.bonus_explosion.reset(now, rng);
                        self.sounds.push(SoundEvent::EnemyExplosion);
                        if !recyclable.contains(&bi) {
                            recyclable.push(bi);
                        }
                    }
                }
            }
        }

        self.recycle_marked(&recyclable);
    }

    /// Advance every live projectile and recycle the ones that crossed
    /// the separation line or the play-field bottom.
    fn clean_bullets(&mut self) {
        let bottom = self.field_bottom();
        let mut recyclable: Vec<usize> = Vec::new();
        for (i, bullet) in self.bullets.iter_mut().enumerate() {
            bullet.update();
            if bullet.y < SEPARATION_LINE || bullet.y > bottom {
                recyclable.push(i);
            }
        }
        self.recycle_marked(&recyclable);
    }

    /// Remove the marked indices from the live set in one batch and
    /// return them to the pool.
    fn recycle_marked(&mut self, marked: &[usize]) {
        if marked.is_empty() {
            return;
        }
        let drained = std::mem::take(&mut self.bullets);
        let mut spent = Vec::with_capacity(marked.len());
        for (i, bullet) in drained.into_iter().enumerate() {
            if marked.contains(&i) {
                spent.push(bullet);
            } else {
                self.bullets.push(bullet);
            }
        }
        self.pool.recycle(spent);
    }

    /// Reward engine: draw a uniform outcome in `[0, outcomes)` and
    /// apply the matching ship upgrade.  `REWARD_WITHOUT_FAIL` (4) is
    /// the guaranteed end-of-level draw; `REWARD_WITH_FAIL` (5) allows
    /// the "nothing happened" outcome.  Arms the banner timer.
    pub fn grant_reward(&mut self, outcomes: u32, rng: &mut impl Rng) {
        let mut banner = if outcomes == REWARD_WITHOUT_FAIL {
            String::from("Stage Reward: ")
        } else {
            String::new()
        };
        let text = match rng.gen_range(0..outcomes) {
            0 => {
                self.ship.increase_bullet_count();
                "Shoot more!"
            }
            1 => {
                self.ship.decrease_fire_interval();
                "Shoot interval decreased!"
            }
            2 => {
                self.ship.increase_bullet_speed();
                "Bullets are going faster!"
            }
            3 => {
                self.ship.increase_speed();
                "Move faster!"
            }
            _ => "Oops! Not in here!",
        };
        info!("reward: {}", text);
        banner.push_str(text);
        self.reward_banner = banner;
        self.banner_timer.reset(self.frame, rng);
    }

    /// One-off reward for clearing the final level: a permanent hull
    /// tier change.
    fn stage_reward(&mut self) {
        self.ship.change_tier();
        info!("ship approved: tier {}", self.ship.tier);
    }

    /// Snapshot for the enclosing application.
    pub fn game_state(&self) -> GameState {
        GameState {
            level: self.level,
            score: self.score,
            lives_remaining: self.lives,
            bullets_shot: self.bullets_shot,
            ships_destroyed: self.ships_destroyed,
            reward_banner: self.reward_banner.clone(),
        }
    }

    /// Seconds left on the start-of-level countdown, `None` once play
    /// has begun.
    pub fn countdown(&self) -> Option<u64> {
        if self.input_delay.is_finished(self.frame) {
            None
        } else {
            Some(self.input_delay.remaining(self.frame) / FRAMES_PER_SECOND)
        }
    }

    /// True while the reward banner should be on screen: while its
    /// timer runs, and again during the start-of-level countdown on
    /// every level past the first.
    pub fn banner_active(&self) -> bool {
        !self.banner_timer.is_finished(self.frame)
            || (!self.input_delay.is_finished(self.frame)
                && self.level > 1
                && !self.reward_banner.is_empty())
    }

    /// Last row of the play field; projectiles below it are recycled.
    pub fn field_bottom(&self) -> i32 {
        self.height - 3
    }

    /// Take the sound events queued since the last drain.
    pub fn drain_sounds(&mut self) -> Vec<SoundEvent> {
        std::mem::take(&mut self.sounds)
    }
}
