use nova_strike::entities::{EnemyKind, EnemyShip, GameSettings, ProjectileKind};
use nova_strike::formation::EnemyShipFormation;
use nova_strike::pool::BulletPool;

use rand::rngs::StdRng;
use rand::SeedableRng;

const WIDTH: i32 = 60;
const TOP: i32 = 3;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn make_formation() -> EnemyShipFormation {
    EnemyShipFormation::new(&GameSettings::restart(), WIDTH, TOP)
}

fn positions(formation: &EnemyShipFormation) -> Vec<(i32, i32)> {
    formation.iter().map(|s| (s.x, s.y)).collect()
}

// ── Layout ────────────────────────────────────────────────────────────────────

#[test]
fn formation_lays_out_centered_grid_with_kinds_by_row() {
    let f = make_formation();
    let ships: Vec<&EnemyShip> = f.iter().collect();
    assert_eq!(ships.len(), 20); // 5 x 4

    // Horizontally centered: 5 columns, 5-cell pitch, in a 60-cell field.
    let origin = (WIDTH - 5 * 5) / 2;
    for (i, ship) in ships.iter().enumerate() {
        let row = i as i32 / 5;
        let col = i as i32 % 5;
        assert_eq!(ship.x, origin + col * 5);
        assert_eq!(ship.y, TOP + row * 3);
    }

    // Back rows are worth more: top row C, next B, the rest A.
    assert!(ships[0..5].iter().all(|s| s.kind == EnemyKind::C));
    assert!(ships[5..10].iter().all(|s| s.kind == EnemyKind::B));
    assert!(ships[10..].iter().all(|s| s.kind == EnemyKind::A));
}

// ── Marching ──────────────────────────────────────────────────────────────────

#[test]
fn formation_marches_one_cell_on_its_interval() {
    let mut rng = seeded_rng();
    let mut f = make_formation();
    let start = positions(&f);

    // Fresh gate: the first update marches, then the full-strength
    // interval (20 frames) applies.
    f.update(1, &mut rng);
    let after: Vec<(i32, i32)> = positions(&f);
    for (a, b) in start.iter().zip(&after) {
        assert_eq!((a.0 + 1, a.1), *b);
    }

    for now in 2..=20 {
        f.update(now, &mut rng);
    }
    assert_eq!(positions(&f), after, "marched before the gate opened");

    f.update(21, &mut rng);
    let later = positions(&f);
    for (a, b) in after.iter().zip(&later) {
        assert_eq!((a.0 + 1, a.1), *b);
    }
}

#[test]
fn formation_reverses_and_descends_at_the_border() {
    let mut rng = seeded_rng();
    // One row in a narrow field so the border comes up fast; the march
    // interval is floored at 4 frames.
    let settings = GameSettings {
        formation_width: 5,
        formation_height: 1,
        march_interval: 1,
        shoot_interval: 90,
    };
    let mut f = EnemyShipFormation::new(&settings, 32, TOP);
    assert_eq!(f.iter().next().unwrap().x, 3);

    // Marches at 1, 5, 9, 13, 17 reach the border; 21 would cross it.
    for now in 1..=21 {
        f.update(now, &mut rng);
    }
    let leftmost = f.iter().next().unwrap();
    assert_eq!(leftmost.x, 8, "kept marching past the border");
    assert_eq!(leftmost.y, TOP + 1, "did not descend");

    // Next march goes the other way, same row.
    for now in 22..=25 {
        f.update(now, &mut rng);
    }
    let leftmost = f.iter().next().unwrap();
    assert_eq!(leftmost.x, 7);
    assert_eq!(leftmost.y, TOP + 1);
}

#[test]
fn march_quickens_as_the_formation_thins() {
    let mut rng = seeded_rng();
    let mut f = make_formation();

    // 5 of 20 left → the 20-frame base interval shrinks to 5.
    for i in 5..20 {
        f.destroy(i);
    }
    f.update(1, &mut rng);
    assert_eq!(f.iter().count(), 5, "destroyed ships were not purged");
    assert!(f.iter().all(|s| !s.destroyed));

    let before = positions(&f);
    for now in 2..=5 {
        f.update(now, &mut rng);
    }
    assert_eq!(positions(&f), before);
    f.update(6, &mut rng);
    for (a, b) in before.iter().zip(positions(&f).iter()) {
        assert_eq!(a.0 + 1, b.0);
    }
}

// ── Shooting ──────────────────────────────────────────────────────────────────

#[test]
fn formation_fires_downward_from_a_bottom_row_ship() {
    let mut rng = seeded_rng();
    let mut f = make_formation();
    let mut bullets = Vec::new();
    let mut pool = BulletPool::new();

    f.shoot(&mut bullets, &mut pool, 1, &mut rng);
    assert_eq!(bullets.len(), 1);
    let shot = &bullets[0];
    assert_eq!(shot.speed, 1);
    assert_eq!(shot.kind, ProjectileKind::Standard);

    // Fired from under the bottom row, centered on one of the columns.
    assert_eq!(shot.y, TOP + 3 * 3 + EnemyShip::HEIGHT);
    let origin = (WIDTH - 5 * 5) / 2;
    let muzzles: Vec<i32> = (0..5).map(|c| origin + c * 5 + 1).collect();
    assert!(muzzles.contains(&shot.x), "fired from x = {}", shot.x);

    // The gate re-arms; no second shot right away.
    f.shoot(&mut bullets, &mut pool, 2, &mut rng);
    assert_eq!(bullets.len(), 1);
}

#[test]
fn destroyed_bottom_ships_pass_the_shot_up_the_column() {
    let mut rng = seeded_rng();
    let mut f = make_formation();
    let mut bullets = Vec::new();
    let mut pool = BulletPool::new();

    // Whole bottom row gone: the next row up fires.
    for i in 15..20 {
        f.destroy(i);
    }
    f.shoot(&mut bullets, &mut pool, 1, &mut rng);
    assert_eq!(bullets.len(), 1);
    assert_eq!(bullets[0].y, TOP + 2 * 3 + EnemyShip::HEIGHT);
}

// ── Destruction ───────────────────────────────────────────────────────────────

#[test]
fn formation_is_empty_once_every_ship_is_destroyed() {
    let mut f = make_formation();
    assert!(!f.is_empty());
    let count = f.iter().count();
    for i in 0..count {
        assert!(!f.is_empty());
        f.destroy(i);
    }
    assert!(f.is_empty());
}
