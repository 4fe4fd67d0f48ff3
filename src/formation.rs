/// The enemy formation: a rigid grid of ships marching side to side,
/// descending a row at each border, firing from the bottom of its
/// columns.  The session consumes it as an iterable plus a destroy
/// mutator; the layout and march logic are private to this module.

use log::debug;
use rand::Rng;

use crate::cooldown::Cooldown;
use crate::entities::{EnemyKind, EnemyShip, GameSettings, Projectile, ProjectileKind};
use crate::pool::BulletPool;

/// Horizontal / vertical cell pitch between grid neighbours.
const COL_PITCH: i32 = 5;
const ROW_PITCH: i32 = 3;
/// Fastest march once the formation has thinned out.
const MARCH_INTERVAL_MIN: u64 = 4;
/// Random spread added on top of the settings' base shoot interval.
const SHOOT_VARIANCE: u64 = 60;

pub struct EnemyShipFormation {
    ships: Vec<EnemyShip>,
    initial_count: usize,
    /// +1 marching right, -1 marching left.
    direction: i32,
    march: Cooldown,
    base_march_interval: u64,
    shooting: Cooldown,
    field_width: i32,
}

impl EnemyShipFormation {
    /// Lay out the grid just under the separation line, horizontally
    /// centered.  Rows are worth more toward the back: the top row is
    /// kind C, the next B, the rest A.
    pub fn new(settings: &GameSettings, field_width: i32, top: i32) -> Self {
        let cols = settings.formation_width as i32;
        let rows = settings.formation_height as i32;
        let origin_x = (field_width - cols * COL_PITCH) / 2;

        let mut ships = Vec::with_capacity((cols * rows) as usize);
        for row in 0..rows {
            let kind = match row {
                0 => EnemyKind::C,
                1 => EnemyKind::B,
                _ => EnemyKind::A,
            };
            for col in 0..cols {
                ships.push(EnemyShip::new(
                    origin_x + col * COL_PITCH,
                    top + row * ROW_PITCH,
                    kind,
                ));
            }
        }

        let initial_count = ships.len();
        EnemyShipFormation {
            ships,
            initial_count,
            direction: 1,
            march: Cooldown::new(settings.march_interval),
            base_march_interval: settings.march_interval,
            shooting: Cooldown::variable(settings.shoot_interval, SHOOT_VARIANCE),
            field_width,
        }
    }

    /// Per-frame update: purge ships destroyed last frame, then march
    /// when the gate opens.  The march quickens as the formation thins.
    pub fn update(&mut self, now: u64, rng: &mut impl Rng) {
        self.ships.retain(|s| !s.destroyed);

        if !self.march.is_finished(now) {
            return;
        }
        let alive = self.ships.len() as u64;
        if alive == 0 {
            return;
        }
        let interval =
            (self.base_march_interval * alive / self.initial_count as u64).max(MARCH_INTERVAL_MIN);
        self.march = Cooldown::new(interval);
        self.march.reset(now, rng);

        let step = self.direction;
        let at_border = self.ships.iter().any(|s| {
            let next = s.x + step;
            next < 1 || next + EnemyShip::WIDTH > self.field_width - 1
        });
        if at_border {
            self.direction = -self.direction;
            for s in &mut self.ships {
                s.y += 1;
            }
        } else {
            for s in &mut self.ships {
                s.x += step;
            }
        }
    }

    /// When the shooting gate opens, one random bottom-of-column ship
    /// fires a standard downward projectile.
    pub fn shoot(
        &mut self,
        bullets: &mut Vec<Projectile>,
        pool: &mut BulletPool,
        now: u64,
        rng: &mut impl Rng,
    ) {
        if !self.shooting.is_finished(now) {
            return;
        }
        self.shooting.reset(now, rng);

        // Bottom-most live ship of each column; columns share an x
        // because the grid marches rigidly.
        let mut shooters: Vec<usize> = Vec::new();
        for (i, ship) in self.ships.iter().enumerate() {
            if ship.destroyed {
                continue;
            }
            match shooters.iter().position(|&j| self.ships[j].x == ship.x) {
                Some(slot) if self.ships[shooters[slot]].y < ship.y => shooters[slot] = i,
                Some(_) => {}
                None => shooters.push(i),
            }
        }
        if shooters.is_empty() {
            return;
        }
        let shooter = &self.ships[shooters[rng.gen_range(0..shooters.len())]];
        bullets.push(pool.acquire(
            shooter.x + EnemyShip::WIDTH / 2,
            shooter.y + EnemyShip::HEIGHT,
            1,
            ProjectileKind::Standard,
        ));
    }

    /// Mark one ship destroyed; it is purged on the next update.
    pub fn destroy(&mut self, index: usize) {
        if let Some(ship) = self.ships.get_mut(index) {
            ship.destroyed = true;
            debug!("formation ship {} destroyed at ({}, {})", index, ship.x, ship.y);
        }
    }

    /// True once every ship has been destroyed.
    pub fn is_empty(&self) -> bool {
        self.ships.iter().all(|s| s.destroyed)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EnemyShip> {
        self.ships.iter()
    }
}
