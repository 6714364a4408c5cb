use bevy::prelude::*;
use bevy::render::mesh::PrimitiveTopology;
use bevy::render::render_asset::RenderAssetUsages;
use rand::Rng;

/// Number of stars in the background.
pub const STAR_COUNT: usize = 1000;
/// Stars are scattered uniformly inside a cube of this half-extent around the origin.
pub const STARFIELD_EXTENT: f32 = 3e8;

pub struct StarryNightPlugin;

impl Plugin for StarryNightPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<StarfieldVisible>()
            .register_type::<StarfieldMesh>()
            .init_resource::<Starfield>()
            .init_resource::<StarfieldVisible>()
            .add_systems(Startup, spawn_starfield)
            .add_systems(
                Update,
                sync_visibility.run_if(resource_changed::<StarfieldVisible>),
            );
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Star {
    pub position: Vec3,
    /// Kelvin.
    pub temperature: f32,
}

impl Star {
    pub fn color(&self) -> Srgba {
        blackbody_color(self.temperature)
    }
}

/// Background stars, generated once and never modified.
#[derive(Debug, Clone, Resource)]
pub struct Starfield {
    stars: Vec<Star>,
}

impl FromWorld for Starfield {
    fn from_world(_world: &mut World) -> Self {
        Self::generate(&mut rand::thread_rng(), STAR_COUNT)
    }
}

impl Starfield {
    pub fn generate(rng: &mut impl Rng, count: usize) -> Self {
        let stars = (0..count)
            .map(|_| Star {
                position: Vec3::from_array(std::array::from_fn(|_| {
                    rng.gen_range(-STARFIELD_EXTENT..=STARFIELD_EXTENT)
                })),
                temperature: rng.gen_range(3000.0..12000.0),
            })
            .collect();
        Self { stars }
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    pub fn mesh(&self) -> Mesh {
        let positions = self
            .stars
            .iter()
            .map(|star| star.position.to_array())
            .collect::<Vec<_>>();
        let colors = self
            .stars
            .iter()
            .map(|star| star.color().to_f32_array())
            .collect::<Vec<_>>();
        Mesh::new(PrimitiveTopology::PointList, RenderAssetUsages::RENDER_WORLD)
            .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
            .with_inserted_attribute(Mesh::ATTRIBUTE_COLOR, colors)
    }
}

/// Whether the starfield is drawn.
#[derive(Debug, Copy, Clone, Resource, Reflect, Deref, DerefMut)]
#[reflect(Resource)]
pub struct StarfieldVisible(pub bool);

impl Default for StarfieldVisible {
    fn default() -> Self {
        Self(true)
    }
}

impl StarfieldVisible {
    pub fn toggle(&mut self) {
        self.0 = !self.0;
    }

    fn visibility(&self) -> Visibility {
        if self.0 {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        }
    }
}

#[derive(Component, Reflect)]
#[reflect(Component)]
pub struct StarfieldMesh;

fn spawn_starfield(
    mut commands: Commands,
    starfield: Res<Starfield>,
    visible: Res<StarfieldVisible>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    debug!("Spawn starfield of {} stars", starfield.len());
    commands.spawn((
        Name::new("Starfield"),
        StarfieldMesh,
        Mesh3d(meshes.add(starfield.mesh())),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::WHITE,
            unlit: true,
            ..default()
        })),
        Transform::default(),
        visible.visibility(),
    ));
}

fn sync_visibility(
    visible: Res<StarfieldVisible>,
    mut q: Query<&mut Visibility, With<StarfieldMesh>>,
) {
    for mut visibility in &mut q {
        *visibility = visible.visibility();
    }
}

/// Approximated blackbody radiation to sRGB color conversion.
///
/// Not accurate, but acceptable to distant stars.
///
/// Taken from https://tannerhelland.com/2012/09/18/convert-temperature-rgb-algorithm-code.html
fn blackbody_color(k: f32) -> Srgba {
    let t = k / 100.0;
    let (r, g, b) = if t <= 66.0 {
        let g = if t < 10.0 {
            0.0
        } else {
            99.470_8 * t.ln() - 161.119_57
        };
        let b = if t < 19.0 {
            0.0
        } else {
            138.517_73 * (t - 10.0).ln() - 305.044_8
        };
        (255.0, g, b)
    } else {
        let r = 329.698_73 * (t - 60.0).powf(-0.133_204_76);
        let g = 288.122_16 * (t - 60.0).powf(-0.075_514_846);
        (r, g, 255.0)
    };

    Srgba::new(
        r.clamp(0.0, 255.0) / 255.0,
        g.clamp(0.0, 255.0) / 255.0,
        b.clamp(0.0, 255.0) / 255.0,
        1.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn generates_stars_inside_the_cube() {
        let starfield = Starfield::generate(&mut StdRng::seed_from_u64(1000), STAR_COUNT);
        assert_eq!(starfield.len(), STAR_COUNT);
        assert!(starfield
            .stars()
            .iter()
            .all(|star| star.position.abs().max_element() <= STARFIELD_EXTENT));
    }

    #[test]
    fn same_seed_same_sky() {
        let a = Starfield::generate(&mut StdRng::seed_from_u64(7), 32);
        let b = Starfield::generate(&mut StdRng::seed_from_u64(7), 32);
        assert_eq!(a.stars(), b.stars());
    }

    #[test]
    fn point_cloud_mesh_has_one_vertex_per_star() {
        let starfield = Starfield::generate(&mut StdRng::seed_from_u64(3), 64);
        let mesh = starfield.mesh();
        assert_eq!(mesh.primitive_topology(), PrimitiveTopology::PointList);
        assert_eq!(mesh.count_vertices(), 64);
    }

    #[test]
    fn blackbody_colors_warm_to_cool() {
        let red = blackbody_color(3000.0);
        let blue = blackbody_color(12000.0);
        assert_eq!(red.red, 1.0);
        assert!(red.blue < red.red);
        assert_eq!(blue.blue, 1.0);
        assert!(blue.red < blue.blue);
    }

    #[test]
    fn toggling_hides_the_mesh() {
        let mut app = App::new();
        app.init_resource::<StarfieldVisible>().add_systems(
            Update,
            sync_visibility.run_if(resource_changed::<StarfieldVisible>),
        );
        let entity = app
            .world_mut()
            .spawn((StarfieldMesh, Visibility::Inherited))
            .id();

        app.world_mut().resource_mut::<StarfieldVisible>().toggle();
        app.update();
        assert_eq!(
            app.world().get::<Visibility>(entity),
            Some(&Visibility::Hidden)
        );

        app.world_mut().resource_mut::<StarfieldVisible>().toggle();
        app.update();
        assert_eq!(
            app.world().get::<Visibility>(entity),
            Some(&Visibility::Inherited)
        );
    }
}
