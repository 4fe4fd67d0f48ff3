use nova_strike::cooldown::Cooldown;
use nova_strike::entities::*;
use nova_strike::pool::BulletPool;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

/// Plain rectangle for exercising the collision predicate on arbitrary
/// geometry.
struct Rect {
    x: i32,
    y: i32,
    w: i32,
    h: i32,
}

impl Entity for Rect {
    fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }
    fn width(&self) -> i32 {
        self.w
    }
    fn height(&self) -> i32 {
        self.h
    }
    fn is_destroyed(&self) -> bool {
        false
    }
}

// ── collides ──────────────────────────────────────────────────────────────────

#[test]
fn collides_overlapping_centers() {
    let a = Rect { x: 10, y: 10, w: 4, h: 4 };
    let b = Rect { x: 10, y: 10, w: 4, h: 4 };
    assert!(collides(&a, &b));
}

#[test]
fn collides_offset_within_half_widths() {
    // Centers 5 apart, half-width sum 20 — a hit.
    let a = Rect { x: 100, y: 0, w: 20, h: 10 };
    let b = Rect { x: 105, y: 0, w: 20, h: 10 };
    assert!(collides(&a, &b));
}

#[test]
fn collides_edge_touching_is_not_a_hit() {
    // Horizontal center distance exactly equals the half-width sum.
    let a = Rect { x: 0, y: 0, w: 4, h: 4 };
    let b = Rect { x: 4, y: 0, w: 4, h: 4 };
    assert!(!collides(&a, &b));
}

#[test]
fn collides_disjoint_on_either_axis() {
    let a = Rect { x: 0, y: 0, w: 4, h: 4 };
    let far_x = Rect { x: 20, y: 0, w: 4, h: 4 };
    let far_y = Rect { x: 0, y: 20, w: 4, h: 4 };
    assert!(!collides(&a, &far_x));
    assert!(!collides(&a, &far_y));
}

#[test]
fn collides_overlap_on_one_axis_only_is_a_miss() {
    let a = Rect { x: 0, y: 0, w: 4, h: 4 };
    let b = Rect { x: 1, y: 30, w: 4, h: 4 };
    assert!(!collides(&a, &b));
}

// ── Cooldown ──────────────────────────────────────────────────────────────────

#[test]
fn cooldown_finished_before_first_reset() {
    let c = Cooldown::new(10);
    assert!(c.is_finished(0));
}

#[test]
fn cooldown_blocks_until_duration_elapses() {
    let mut c = Cooldown::new(10);
    let mut rng = seeded_rng();
    c.reset(5, &mut rng);
    assert!(!c.is_finished(5));
    assert!(!c.is_finished(14));
    assert!(c.is_finished(15));
    assert!(c.is_finished(100));
}

#[test]
fn cooldown_query_has_no_side_effects() {
    let mut c = Cooldown::new(10);
    let mut rng = seeded_rng();
    c.reset(0, &mut rng);
    for _ in 0..5 {
        assert!(!c.is_finished(9));
    }
    assert_eq!(c.remaining(4), 6);
}

#[test]
fn variable_cooldown_draws_within_range() {
    let mut c = Cooldown::variable(225, 150);
    let mut rng = seeded_rng();
    for _ in 0..100 {
        c.reset(0, &mut rng);
        let d = c.remaining(0);
        assert!((225..375).contains(&d), "duration {} out of range", d);
    }
}

// ── BulletPool ────────────────────────────────────────────────────────────────

#[test]
fn pool_reuses_recycled_projectiles() {
    let mut pool = BulletPool::new();
    let b = pool.acquire(5, 5, -1, ProjectileKind::Standard);
    assert_eq!(pool.available(), 0);

    pool.recycle([b]);
    assert_eq!(pool.available(), 1);

    let b2 = pool.acquire(9, 3, 1, ProjectileKind::Reward);
    assert_eq!(pool.available(), 0);
    assert_eq!((b2.x, b2.y, b2.speed, b2.kind), (9, 3, 1, ProjectileKind::Reward));
}

#[test]
fn pool_allocates_when_empty() {
    let mut pool = BulletPool::new();
    let b = pool.acquire(1, 2, 1, ProjectileKind::Standard);
    assert_eq!((b.x, b.y), (1, 2));
}

// ── Ship ──────────────────────────────────────────────────────────────────────

#[test]
fn ship_fires_one_centered_bullet_by_default() {
    let mut ship = Ship::new(10, 16);
    let mut bullets = Vec::new();
    let mut pool = BulletPool::new();
    let mut rng = seeded_rng();

    assert!(ship.shoot(&mut bullets, &mut pool, 0, &mut rng));
    assert_eq!(bullets.len(), 1);
    assert_eq!(bullets[0].x, 10 + Ship::WIDTH / 2);
    assert_eq!(bullets[0].y, 15);
    assert_eq!(bullets[0].speed, -1);
    assert_eq!(bullets[0].kind, ProjectileKind::Standard);
}

#[test]
fn ship_fire_gate_blocks_until_interval_elapses() {
    let mut ship = Ship::new(10, 16);
    let mut bullets = Vec::new();
    let mut pool = BulletPool::new();
    let mut rng = seeded_rng();

    assert!(ship.shoot(&mut bullets, &mut pool, 0, &mut rng));
    assert!(!ship.shoot(&mut bullets, &mut pool, 1, &mut rng));
    assert!(!ship.shoot(&mut bullets, &mut pool, 7, &mut rng));
    assert!(ship.shoot(&mut bullets, &mut pool, 8, &mut rng));
    assert_eq!(bullets.len(), 2);
}

#[test]
fn fire_interval_upgrade_keeps_an_armed_gate_closed() {
    let mut ship = Ship::new(10, 16);
    let mut bullets = Vec::new();
    let mut pool = BulletPool::new();
    let mut rng = seeded_rng();

    // Arm the gate, then catch the upgrade mid-cooldown.
    assert!(ship.shoot(&mut bullets, &mut pool, 0, &mut rng));
    ship.decrease_fire_interval();
    assert_eq!(ship.fire_interval, 7);

    // No free shot: the old deadline still holds.
    assert!(!ship.shoot(&mut bullets, &mut pool, 1, &mut rng));
    assert!(!ship.shoot(&mut bullets, &mut pool, 7, &mut rng));
    assert!(ship.shoot(&mut bullets, &mut pool, 8, &mut rng));

    // The shorter interval applies from the next volley on.
    assert!(!ship.shoot(&mut bullets, &mut pool, 14, &mut rng));
    assert!(ship.shoot(&mut bullets, &mut pool, 15, &mut rng));
}

#[test]
fn ship_volley_grows_with_bullet_count() {
    let mut ship = Ship::new(10, 16);
    ship.increase_bullet_count();
    ship.increase_bullet_count();
    let mut bullets = Vec::new();
    let mut pool = BulletPool::new();
    let mut rng = seeded_rng();

    assert!(ship.shoot(&mut bullets, &mut pool, 0, &mut rng));
    assert_eq!(bullets.len(), 3);
    let xs: Vec<i32> = bullets.iter().map(|b| b.x).collect();
    assert_eq!(xs, vec![9, 11, 13]); // spread around the tip
}

#[test]
fn ship_upgrades_are_capped() {
    let mut ship = Ship::new(0, 0);
    for _ in 0..10 {
        ship.increase_bullet_count();
        ship.decrease_fire_interval();
        ship.increase_bullet_speed();
        ship.increase_speed();
    }
    assert_eq!(ship.bullet_count, 3);
    assert_eq!(ship.fire_interval, 3);
    assert_eq!(ship.bullet_speed, 3);
    assert_eq!(ship.speed, 3);
}

#[test]
fn ship_destroyed_lingers_then_respawns() {
    let mut ship = Ship::new(10, 16);
    let mut rng = seeded_rng();
    assert!(!ship.is_destroyed());

    ship.destroy(10, &mut rng);
    assert!(ship.is_destroyed());

    ship.update(39);
    assert!(ship.is_destroyed());
    ship.update(40);
    assert!(!ship.is_destroyed());
}

#[test]
fn ship_tier_changes_once() {
    let mut ship = Ship::new(0, 0);
    assert_eq!(ship.tier, 1);
    ship.change_tier();
    assert_eq!(ship.tier, 2);
}

// ── Enemy & bonus data ────────────────────────────────────────────────────────

#[test]
fn enemy_point_values() {
    assert_eq!(EnemyKind::A.point_value(), 10);
    assert_eq!(EnemyKind::B.point_value(), 20);
    assert_eq!(EnemyKind::C.point_value(), 30);
}

#[test]
fn bonus_ship_enters_from_the_left() {
    let mut bonus = BonusShip::new(2);
    assert_eq!(bonus.x, -BonusShip::WIDTH);
    bonus.advance();
    assert_eq!(bonus.x, -BonusShip::WIDTH + BonusShip::SPEED);
}

#[test]
fn reward_projectile_is_wider_than_a_bullet() {
    let standard = Projectile { x: 0, y: 0, speed: 1, kind: ProjectileKind::Standard };
    let reward = Projectile { x: 0, y: 0, speed: 1, kind: ProjectileKind::Reward };
    assert_eq!(standard.width(), 1);
    assert_eq!(reward.width(), 3);
}
