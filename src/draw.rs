use bevy::color::palettes::css;
use bevy::math::{DAffine3, DVec3};
use bevy::prelude::*;
use solar_system::body::BodyRegistry;
use solar_system::frame::{orbit_ring, FrameCache, ORBIT_RING_SIDES};
use solar_system::SolarSystemSet;
use std::f64::consts::{PI, TAU};
use viewpoint::components::DISTANCE;
use viewpoint::{ViewController, ViewMode, ViewpointSet};

pub const DEFAULT_SHAPE_DETAIL: u32 = 20;
pub const MIN_SHAPE_DETAIL: u32 = 3;
pub const MAX_SHAPE_DETAIL: u32 = 50;

const AXIS_LENGTH: f32 = (2.0 * DISTANCE) as f32;
const Z_AXIS_COLOR: Color = Color::srgb(0.078, 0.835, 0.96);
/// Polar axis line length, in body radii on each side of the centre.
const POLAR_AXIS_EXTENT: f64 = 3.0;
const SHIP_LENGTH: f64 = 5e6;

pub struct DrawPlugin;

impl Plugin for DrawPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<DisplaySettings>()
            .init_resource::<DisplaySettings>()
            .add_systems(
                Update,
                (
                    draw_axes.run_if(|settings: Res<DisplaySettings>| settings.axes),
                    draw_bodies.run_if(resource_exists::<BodyRegistry>),
                    draw_ship,
                )
                    .after(SolarSystemSet::Compose)
                    .after(ViewpointSet),
            );
    }
}

/// What gets drawn, switched from the keyboard and the top bar.
#[derive(Debug, Clone, Resource, Reflect)]
#[reflect(Resource)]
pub struct DisplaySettings {
    pub labels: bool,
    pub orbits: bool,
    pub axes: bool,
    /// Meridians of each wire sphere. Half as many stacks.
    detail: u32,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            labels: true,
            orbits: true,
            axes: false,
            detail: DEFAULT_SHAPE_DETAIL,
        }
    }
}

impl DisplaySettings {
    pub fn detail(&self) -> u32 {
        self.detail
    }

    /// Changes the sphere detail by `delta`, as long as the result stays strictly between the
    /// minimum and maximum.
    pub fn adjust_detail(&mut self, delta: i32) -> bool {
        let detail = self.detail as i64 + delta as i64;
        if detail > MIN_SHAPE_DETAIL as i64 && detail < MAX_SHAPE_DETAIL as i64 {
            self.detail = detail as u32;
            true
        } else {
            false
        }
    }
}

/// Polylines of a wire sphere around the Z axis: `stacks - 1` closed parallels and `slices`
/// meridians running from pole to pole.
pub fn wire_sphere(radius: f64, slices: u32, stacks: u32) -> Vec<Vec<DVec3>> {
    let point = |theta: f64, phi: f64| {
        DVec3::new(
            radius * phi.sin() * theta.cos(),
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
        )
    };
    let parallels = (1..stacks).map(|stack| {
        let phi = PI * stack as f64 / stacks as f64;
        (0..=slices)
            .map(|slice| point(TAU * slice as f64 / slices as f64, phi))
            .collect::<Vec<_>>()
    });
    let meridians = (0..slices).map(|slice| {
        let theta = TAU * slice as f64 / slices as f64;
        (0..=stacks)
            .map(|stack| point(theta, PI * stack as f64 / stacks as f64))
            .collect::<Vec<_>>()
    });
    parallels.chain(meridians).collect()
}

fn to_world(frame: &DAffine3, point: DVec3) -> Vec3 {
    frame.transform_point3(point).as_vec3()
}

fn draw_axes(mut gizmos: Gizmos) {
    gizmos.line(Vec3::ZERO, Vec3::X * AXIS_LENGTH, css::RED);
    gizmos.line(Vec3::ZERO, Vec3::Y * AXIS_LENGTH, css::LIME);
    gizmos.line(Vec3::ZERO, Vec3::Z * AXIS_LENGTH, Z_AXIS_COLOR);
}

fn draw_bodies(
    mut gizmos: Gizmos,
    registry: Res<BodyRegistry>,
    cache: Res<FrameCache>,
    settings: Res<DisplaySettings>,
) {
    let detail = settings.detail();
    for (id, body) in registry.iter() {
        let Some(frame) = cache.get(id) else {
            continue;
        };
        let [r, g, b] = body.params().color;
        let color = Color::srgb(r, g, b);

        if settings.orbits && !body.is_root() {
            let ring = orbit_ring(body, ORBIT_RING_SIDES)
                .map(|point| to_world(&frame.ring, point))
                .collect::<Vec<_>>();
            if let Some(&first) = ring.first() {
                gizmos.linestrip(ring.into_iter().chain([first]), color);
            }
        }

        let radius = body.params().radius;
        for line in wire_sphere(radius, detail, detail / 2) {
            gizmos.linestrip(
                line.into_iter().map(|point| to_world(&frame.world, point)),
                color,
            );
        }
        let pole = DVec3::Z * POLAR_AXIS_EXTENT * radius;
        gizmos.line(
            to_world(&frame.world, pole),
            to_world(&frame.world, -pole),
            color,
        );
    }
}

fn draw_ship(mut gizmos: Gizmos, q_view: Query<&ViewController>) {
    for view in &q_view {
        if view.mode() != ViewMode::Explore {
            continue;
        }
        let ship = view.ship();
        let tip = ship.position + ship.heading().normalize_or_zero() * SHIP_LENGTH;
        gizmos.arrow(ship.position.as_vec3(), tip.as_vec3(), css::WHITE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn wire_sphere_has_parallels_and_meridians() {
        let lines = wire_sphere(2.0, 20, 10);
        assert_eq!(lines.len(), 9 + 20);
        // parallels close on themselves
        assert!(lines[0].first().unwrap().abs_diff_eq(*lines[0].last().unwrap(), 1e-9));
        // meridians go from pole to pole along Z
        let meridian = &lines[9];
        assert!(meridian.first().unwrap().abs_diff_eq(DVec3::new(0.0, 0.0, 2.0), 1e-9));
        assert!(meridian.last().unwrap().abs_diff_eq(DVec3::new(0.0, 0.0, -2.0), 1e-9));
        for point in lines.iter().flatten() {
            assert_abs_diff_eq!(point.length(), 2.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn detail_stays_within_bounds() {
        let mut settings = DisplaySettings::default();
        assert_eq!(settings.detail(), 20);
        assert!(settings.adjust_detail(29));
        assert_eq!(settings.detail(), 49);
        assert!(!settings.adjust_detail(1));
        assert!(settings.adjust_detail(-45));
        assert_eq!(settings.detail(), 4);
        assert!(!settings.adjust_detail(-1));
        assert_eq!(settings.detail(), 4);
    }

    #[test]
    fn defaults_match_startup_display() {
        let settings = DisplaySettings::default();
        assert!(settings.labels);
        assert!(settings.orbits);
        assert!(!settings.axes);
    }
}
