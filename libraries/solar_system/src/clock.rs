//! Simulation time and the per-tick update of every body's angles.

use crate::body::BodyRegistry;
use bevy::prelude::*;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};

/// Days simulated per fixed tick at startup.
pub const DEFAULT_TIME_STEP: f64 = 0.5;
/// Exclusive lower bound of the time step.
pub const MIN_TIME_STEP: f64 = 0.01;
/// Exclusive upper bound of the time step.
pub const MAX_TIME_STEP: f64 = 10.0;
pub const TIME_STEP_INCREMENT: f64 = 0.01;

/// Fixed ticks per real second.
pub const TICK_RATE_HZ: f64 = 60.0;

const SECONDS_PER_DAY: f64 = 86400.0;

pub struct ClockPlugin;

impl Plugin for ClockPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimulationClock>()
            .insert_resource(Time::<Fixed>::from_hz(TICK_RATE_HZ))
            .add_systems(
                FixedUpdate,
                clock_tick.run_if(resource_exists::<BodyRegistry>),
            );
    }
}

#[derive(Debug, Clone, Resource)]
pub struct SimulationClock {
    date: f64,
    time_step: f64,
    epoch: DateTime<Utc>,
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self {
            date: 0.0,
            time_step: DEFAULT_TIME_STEP,
            epoch: j2000(),
        }
    }
}

impl SimulationClock {
    pub fn with_epoch(mut self, epoch: DateTime<Utc>) -> Self {
        self.epoch = epoch;
        self
    }

    /// Days elapsed since the start of the simulation.
    #[inline]
    pub fn date(&self) -> f64 {
        self.date
    }

    #[inline]
    pub fn time_step(&self) -> f64 {
        self.time_step
    }

    pub fn epoch(&self) -> DateTime<Utc> {
        self.epoch
    }

    pub fn set_epoch(&mut self, epoch: DateTime<Utc>) {
        self.epoch = epoch;
    }

    /// Calendar date matching [`Self::date`]. Saturates at the epoch if the offset cannot be
    /// represented.
    pub fn calendar_date(&self) -> DateTime<Utc> {
        let millis = (self.date * SECONDS_PER_DAY * 1000.0).round() as i64;
        TimeDelta::try_milliseconds(millis)
            .and_then(|delta| self.epoch.checked_add_signed(delta))
            .unwrap_or(self.epoch)
    }

    /// Changes the time step by `delta`, keeping it strictly within the allowed range.
    ///
    /// Returns whether the step changed.
    pub fn adjust_time_step(&mut self, delta: f64) -> bool {
        let step = self.time_step + delta;
        if step > MIN_TIME_STEP && step < MAX_TIME_STEP {
            self.time_step = step;
            true
        } else {
            false
        }
    }

    /// Advances the date by one time step and moves every body accordingly.
    pub fn tick(&mut self, registry: &mut BodyRegistry) {
        self.date += self.time_step;
        advance(registry, self.time_step);
    }
}

/// Moves every body forward by `dt` days of simulated time.
///
/// Angles are kept in `[0, 360)`.
pub fn advance(registry: &mut BodyRegistry, dt: f64) {
    for body in registry.bodies_mut() {
        let params = body.params();
        let spin = body.spin() + 360.0 * dt / params.rotation_period;
        let orbit = body.orbit() + 360.0 * dt / params.orbital_period;
        body.set_angles(normalize_degrees(orbit), normalize_degrees(spin));
    }
}

#[inline]
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Smallest absolute difference between two angles in degrees, in `[0, 180]`.
pub fn angular_distance(a: f64, b: f64) -> f64 {
    let d = normalize_degrees(a - b);
    d.min(360.0 - d)
}

fn j2000() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(2000, 1, 1)
        .and_then(|date| Some(date.and_time(NaiveTime::from_hms_opt(12, 0, 0)?)))
        .map(|datetime| datetime.and_utc())
        .unwrap_or_default()
}

fn clock_tick(mut clock: ResMut<SimulationClock>, mut registry: ResMut<BodyRegistry>) {
    clock.tick(&mut registry);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::tests::params;
    use crate::body::{Body, BodyId};
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    fn system(orbital_period: f64, rotation_period: f64, orbit: f64, spin: f64) -> BodyRegistry {
        let mut planet = params("Planet", 100.0, orbital_period);
        planet.rotation_period = rotation_period;
        BodyRegistry::new(vec![
            Body::new(params("Star", 0.0, 1.0), None),
            Body::new(planet, Some(BodyId(0))).with_angles(orbit, spin),
        ])
        .unwrap()
    }

    fn planet(registry: &BodyRegistry) -> &Body {
        registry.get(BodyId(1)).unwrap()
    }

    #[test]
    fn advance_moves_angles_proportionally_to_periods() {
        let mut registry = system(360.0, 36.0, 0.0, 0.0);
        advance(&mut registry, 1.0);
        assert_abs_diff_eq!(planet(&registry).orbit(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(planet(&registry).spin(), 10.0, epsilon = 1e-12);
    }

    #[test]
    fn angles_stay_normalized() {
        let mut registry = system(10.0, 3.0, 350.0, 359.0);
        advance(&mut registry, 1000.5);
        for (_, body) in registry.iter() {
            assert!((0.0..360.0).contains(&body.orbit()));
            assert!((0.0..360.0).contains(&body.spin()));
        }
    }

    #[test]
    fn tick_uses_time_step_and_moves_date() {
        let mut registry = system(360.0, 36.0, 0.0, 0.0);
        let mut clock = SimulationClock::default();
        clock.tick(&mut registry);
        clock.tick(&mut registry);
        assert_abs_diff_eq!(clock.date(), 2.0 * DEFAULT_TIME_STEP);
        assert_abs_diff_eq!(planet(&registry).orbit(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn time_step_stays_within_bounds() {
        let mut clock = SimulationClock::default();
        assert!(clock.adjust_time_step(TIME_STEP_INCREMENT));
        assert_abs_diff_eq!(clock.time_step(), 0.51, epsilon = 1e-12);
        assert!(!clock.adjust_time_step(20.0));
        assert!(!clock.adjust_time_step(-0.51));
        assert_abs_diff_eq!(clock.time_step(), 0.51, epsilon = 1e-12);
    }

    #[test]
    fn calendar_date_counts_from_epoch() {
        let mut registry = system(360.0, 36.0, 0.0, 0.0);
        let mut clock = SimulationClock::default();
        clock.tick(&mut registry);
        clock.tick(&mut registry);
        assert_eq!(
            clock.calendar_date().format("%Y-%m-%d %H:%M").to_string(),
            "2000-01-02 12:00"
        );
    }

    #[test]
    fn angular_distance_wraps() {
        assert_abs_diff_eq!(angular_distance(359.0, 1.0), 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(angular_distance(720.0, 0.0), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(angular_distance(90.0, 270.0), 180.0, epsilon = 1e-12);
    }

    proptest! {
        #[test]
        fn spin_returns_after_one_rotation_period(
            orbital_period in 0.1f64..5000.0,
            rotation_period in 0.1f64..500.0,
            orbit in 0.0f64..360.0,
            spin in 0.0f64..360.0,
        ) {
            let mut registry = system(orbital_period, rotation_period, orbit, spin);
            advance(&mut registry, rotation_period);
            prop_assert!(angular_distance(planet(&registry).spin(), spin) < 1e-6);
        }

        #[test]
        fn orbit_returns_after_one_orbital_period(
            orbital_period in 0.1f64..5000.0,
            orbit in 0.0f64..360.0,
        ) {
            let mut registry = system(orbital_period, 1.0, orbit, 0.0);
            advance(&mut registry, orbital_period);
            prop_assert!(angular_distance(planet(&registry).orbit(), orbit) < 1e-6);
        }

        #[test]
        fn advance_is_linear(a in 0.0f64..1000.0, b in 0.0f64..1000.0) {
            let mut split = system(87.97, 58.6, 12.0, 34.0);
            advance(&mut split, a);
            advance(&mut split, b);
            let mut whole = system(87.97, 58.6, 12.0, 34.0);
            advance(&mut whole, a + b);
            for ((_, lhs), (_, rhs)) in split.iter().zip(whole.iter()) {
                prop_assert!(angular_distance(lhs.orbit(), rhs.orbit()) < 1e-6);
                prop_assert!(angular_distance(lhs.spin(), rhs.spin()) < 1e-6);
            }
        }
    }
}
