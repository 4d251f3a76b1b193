// Integration tests for the emoji rain.
// Native-friendly: they drive ParticleField and RainClock directly, no browser APIs.

use std::collections::HashMap;

use greeting_card::config::RainConfig;
use greeting_card::particles::ParticleField;
use greeting_card::rng::Xorshift;
use greeting_card::schedule::RainClock;

fn field(seed: u64) -> ParticleField<Xorshift> {
    ParticleField::with_rng(RainConfig::default(), Xorshift::seeded(seed))
}

// Particles only fall, and culled ones never come back.
#[test]
fn y_never_decreases_and_culled_particles_stay_gone() {
    let mut f = field(1);
    let mut last_y: HashMap<u64, f64> = HashMap::new();
    let mut culled_ids = Vec::new();

    for step in 0..400 {
        if step % 8 == 0 {
            f.spawn_one();
        }
        if step % 37 == 0 {
            f.burst(3);
        }
        f.tick();

        let live: HashMap<u64, f64> = f.particles().iter().map(|p| (p.id(), p.y())).collect();
        for p in f.particles() {
            assert!(p.y() < 110.0, "particle {} at y={} survived the tick", p.id(), p.y());
            if let Some(prev) = last_y.get(&p.id()) {
                assert!(p.y() >= *prev, "particle {} moved up: {} -> {}", p.id(), prev, p.y());
            }
        }
        for id in last_y.keys() {
            if !live.contains_key(id) {
                culled_ids.push(*id);
            }
        }
        for id in &culled_ids {
            assert!(!live.contains_key(id), "culled particle {id} came back");
        }
        last_y = live;
    }
    assert!(!culled_ids.is_empty(), "some particles should have left the frame");
}

// A burst adds exactly n particles on top of the ambient rain.
#[test]
fn burst_adds_exactly_n_while_the_clock_runs() {
    let mut f = field(2);
    let mut clock = RainClock::for_field(&f, 0.0);
    clock.advance_to(1_234.0, &mut f);

    let before = f.len();
    assert_eq!(f.burst(15), 15);
    assert_eq!(f.len(), before + 15);

    clock.advance_to(1_300.0, &mut f);
    let before = f.len();
    f.burst(7);
    assert_eq!(f.len(), before + 7);
}

// A burst on an empty field starts every particle above the frame.
#[test]
fn burst_on_empty_field_starts_above_frame_with_varied_params() {
    let mut f = field(3);
    f.burst(15);
    assert_eq!(f.len(), 15);
    for p in f.particles() {
        assert!((p.y() + 10.0).abs() < 1e-9, "burst particle starts at y=-10, got {}", p.y());
        assert!((0.0..100.0).contains(&p.x()));
        assert!((2.0..5.0).contains(&p.speed()));
        assert!((0.0..360.0).contains(&p.rotation()));
    }
    let mut xs: Vec<u64> = f.particles().iter().map(|p| p.x().to_bits()).collect();
    xs.sort_unstable();
    xs.dedup();
    assert_eq!(xs.len(), 15, "x positions should be distinct");
    let speeds: Vec<f64> = f.particles().iter().map(|p| p.speed()).collect();
    assert!(speeds.iter().any(|s| (s - speeds[0]).abs() > 1e-9));
}

// 2000ms of ambient rain: 5 spawns and 40 advances.
#[test]
fn ambient_rain_reaches_five_after_two_seconds() {
    let mut f = field(4);
    let mut clock = RainClock::for_field(&f, 0.0);
    let report = clock.advance_to(2_000.0, &mut f);
    assert_eq!(report.spawned, 5, "spawns at 400, 800, 1200, 1600, 2000ms");
    assert_eq!(report.ticks, 40);
    assert_eq!(report.culled, 0, "nothing can fall 120 units in 1.6s at <= 3.5/tick");
    assert_eq!(f.len(), 5);
}

// Steady-state rain stays bounded instead of growing.
#[test]
fn ambient_rain_oscillates_instead_of_growing() {
    let mut f = field(5);
    let mut clock = RainClock::for_field(&f, 0.0);
    clock.advance_to(4_000.0, &mut f);

    let mut counts = Vec::new();
    let mut t = 4_000.0;
    while t < 20_000.0 {
        t += 50.0;
        clock.advance_to(t, &mut f);
        counts.push(f.len());
    }
    let max = *counts.iter().max().unwrap();
    let min = *counts.iter().min().unwrap();
    // slowest particle lives 80 ticks (4s) => at most ~10 ambient particles alive
    assert!(max <= 11, "live count grew to {max}");
    assert!(min >= 3, "live count dropped to {min}");
    assert!(max > min, "count should rise and fall");
    assert!(counts.windows(2).any(|w| w[1] < w[0]), "culling should lower the count at times");
}

// A cancelled clock fires neither schedule.
#[test]
fn cancelled_clock_fires_nothing() {
    let mut f = field(6);
    let mut clock = RainClock::for_field(&f, 0.0);
    clock.advance_to(800.0, &mut f);
    let live = f.len();
    clock.cancel();
    let report = clock.advance_to(10_000.0, &mut f);
    assert_eq!(report.spawned, 0);
    assert_eq!(report.ticks, 0);
    assert_eq!(f.len(), live);
    assert!(clock.is_cancelled());
}
