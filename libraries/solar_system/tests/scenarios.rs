//! End-to-end runs of a star with one planet: the integrator moves the angles, the composer
//! turns them into frames, and revolution and rotation must stay independent throughout.
//!
//! Run with: cargo test -p solar_system --test scenarios

use bevy::math::{DAffine3, DVec3};
use solar_system::body::{Body, BodyId, BodyParams, BodyRegistry};
use solar_system::clock::{advance, angular_distance, SimulationClock};
use solar_system::frame::FrameCache;

const PLANET: BodyId = BodyId(1);
const EPSILON: f64 = 1e-6;

fn body(name: &str, orbital_radius: f64, orbital_period: f64, rotation_period: f64) -> BodyParams {
    BodyParams {
        name: name.to_string(),
        color: [1.0, 1.0, 1.0],
        orbital_radius,
        orbital_tilt: 0.0,
        orbital_period,
        radius: 5.0,
        axis_tilt: 0.0,
        rotation_period,
    }
}

/// Star at the origin and a planet with orbital period 360, rotation period 36, radius 100.
fn star_and_planet() -> BodyRegistry {
    BodyRegistry::new(vec![
        Body::new(body("Star", 0.0, 1.0, 25.0), Some(BodyId(0))),
        Body::new(body("Planet", 100.0, 360.0, 36.0), Some(BodyId(0))),
    ])
    .unwrap()
}

fn planet_frame(registry: &BodyRegistry) -> solar_system::frame::BodyFrame {
    *FrameCache::compose(registry).get(PLANET).unwrap()
}

fn assert_vec_eq(a: DVec3, b: DVec3) {
    assert!(a.abs_diff_eq(b, EPSILON), "{a} != {b}");
}

#[test]
fn full_orbit_returns_planet_to_start() {
    let mut registry = star_and_planet();
    let start = planet_frame(&registry);

    advance(&mut registry, 360.0);

    let planet = registry.get(PLANET).unwrap();
    assert!(angular_distance(planet.orbit(), 0.0) < EPSILON);
    // ten full self-rotations
    assert!(angular_distance(planet.spin(), 0.0) < EPSILON);
    let end = planet_frame(&registry);
    assert_vec_eq(end.position(), start.position());
    assert!(end.world.abs_diff_eq(start.world, EPSILON));
}

#[test]
fn half_orbit_moves_position_but_not_orientation() {
    let mut registry = star_and_planet();
    let start = planet_frame(&registry);

    advance(&mut registry, 180.0);

    let planet = registry.get(PLANET).unwrap();
    assert!(angular_distance(planet.orbit(), 180.0) < EPSILON);
    // 180 / 36 = 5 whole rotations
    assert!(angular_distance(planet.spin(), 0.0) < EPSILON);

    let half = planet_frame(&registry);
    assert_vec_eq(half.position(), -start.position());
    assert!(half.world.matrix3.abs_diff_eq(start.world.matrix3, EPSILON));

    // without the decoupling step the planet would also have turned by the orbit angle
    let coupled = DAffine3::from_rotation_y(180f64.to_radians()).matrix3 * start.world.matrix3;
    assert!(!half.world.matrix3.abs_diff_eq(coupled, EPSILON));
}

#[test]
fn spin_follows_rotation_period_alone() {
    let mut registry = star_and_planet();
    let start = planet_frame(&registry).world.matrix3;

    // a quarter orbit in, the planet has turned 2.5 times: half a turn from where it started
    advance(&mut registry, 90.0);
    let planet = registry.get(PLANET).unwrap();
    assert!(angular_distance(planet.spin(), 180.0) < EPSILON);
    let quarter = planet_frame(&registry).world.matrix3;
    let expected = start * DAffine3::from_rotation_z(180f64.to_radians()).matrix3;
    assert!(quarter.abs_diff_eq(expected, EPSILON));
}

#[test]
fn clock_ticks_match_one_large_step() {
    let mut ticked = star_and_planet();
    let mut clock = SimulationClock::default();
    for _ in 0..720 {
        clock.tick(&mut ticked);
    }

    let mut stepped = star_and_planet();
    advance(&mut stepped, clock.date());

    for ((_, lhs), (_, rhs)) in ticked.iter().zip(stepped.iter()) {
        assert!(angular_distance(lhs.orbit(), rhs.orbit()) < EPSILON);
        assert!(angular_distance(lhs.spin(), rhs.spin()) < EPSILON);
    }
    assert_vec_eq(
        planet_frame(&ticked).position(),
        planet_frame(&stepped).position(),
    );
}

#[test]
fn root_stays_at_origin() {
    let mut registry = star_and_planet();
    for _ in 0..10 {
        advance(&mut registry, 17.3);
        let cache = FrameCache::compose(&registry);
        let root = cache.get(registry.root()).unwrap();
        assert_eq!(root.placement, DAffine3::IDENTITY);
        assert_vec_eq(root.world.translation, DVec3::ZERO);
    }
}
