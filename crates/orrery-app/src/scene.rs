//! Turns the simulation state into the renderer's draw list.

use glam::{Mat4, Vec3, Vec4};
use orrery_render::{DrawItem, MeshKind, SceneFrame, Shading};
use orrery_sim::{PLANETS, Planet, RING_TEXTURE, SKY, SUN, Simulation, Spinner};

/// Solid colour used when a texture file is missing or unreadable, so the
/// body stays recognisable.
pub fn fallback_color(texture: &str) -> [u8; 4] {
    match texture {
        "sun.png" => [255, 200, 64, 255],
        "background.jpg" => [4, 4, 12, 255],
        "mercury.png" => [150, 140, 130, 255],
        "venus.jpg" => [220, 190, 120, 255],
        "earth.jpg" => [60, 110, 200, 255],
        "mars.jpg" => [190, 90, 50, 255],
        "jupiter.jpg" => [200, 160, 120, 255],
        "saturn.jpg" => [220, 200, 150, 255],
        "uranus.png" => [150, 210, 220, 255],
        "neptune.jpg" => [70, 100, 210, 255],
        _ => [255, 255, 255, 255],
    }
}

/// Every texture the scene can reference, each listed once.
pub fn texture_manifest() -> Vec<&'static str> {
    let mut names = vec![SKY.texture, SUN.texture];
    names.extend(PLANETS.iter().map(|p| p.texture));
    if PLANETS.iter().any(|p| p.ring.is_some()) {
        names.push(RING_TEXTURE);
    }
    names
}

fn spinner_model(spinner: &Spinner) -> Mat4 {
    Mat4::from_rotation_y(spinner.spin.to_radians())
        * Mat4::from_scale(Vec3::splat(spinner.body.scale))
}

/// Translate to the orbit position, spin about Y, scale to the diameter.
pub fn planet_model(planet: &Planet) -> Mat4 {
    Mat4::from_translation(planet.position)
        * Mat4::from_rotation_y(planet.spin.to_radians())
        * Mat4::from_scale(Vec3::splat(planet.spec.scale))
}

/// Sky, sun, planets and rings for the current state, in draw order.
pub fn build_scene(sim: &Simulation) -> SceneFrame {
    let system = sim.system();
    let mut frame = SceneFrame::with_capacity(2 + system.planets.len() * 2);

    for spinner in [&system.sky, &system.sun] {
        frame.push(DrawItem {
            mesh: MeshKind::Sphere,
            texture: spinner.body.texture,
            model: spinner_model(spinner),
            tint: Vec4::ONE,
            shading: Shading::Unlit,
        });
    }

    for planet in &system.planets {
        let model = planet_model(planet);
        frame.push(DrawItem {
            mesh: MeshKind::Sphere,
            texture: planet.spec.texture,
            model,
            tint: Vec4::ONE,
            shading: Shading::Lit,
        });

        if let Some(ring) = planet.spec.ring {
            // The quad lies in XY; tip it into the equatorial plane.
            let ring_model = model
                * Mat4::from_translation(Vec3::new(0.0, ring.y_offset, 0.0))
                * Mat4::from_rotation_x(90f32.to_radians())
                * Mat4::from_scale(Vec3::splat(ring.scale));
            frame.push(DrawItem {
                mesh: MeshKind::Quad,
                texture: RING_TEXTURE,
                model: ring_model,
                tint: Vec4::from_array(ring.color()),
                shading: Shading::Ring,
            });
        }
    }

    frame.sort_for_drawing(sim.camera().position);
    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_sim::{CameraPose, FixedDelta, PoseSink, SimCommand, SimSettings};
    use std::collections::VecDeque;

    struct NullSink;

    impl PoseSink for NullSink {
        fn apply_pose(&mut self, _pose: &CameraPose) {}
        fn begin_free_look(&mut self, _pose: &CameraPose) {}
    }

    #[test]
    fn test_scene_has_every_body_and_ring() {
        let sim = Simulation::new(SimSettings::default());
        let frame = build_scene(&sim);
        let rings = PLANETS.iter().filter(|p| p.ring.is_some()).count();
        assert_eq!(frame.len(), 2 + PLANETS.len() + rings);
        assert_eq!(frame.len(), 14);
    }

    #[test]
    fn test_rings_are_drawn_last() {
        let sim = Simulation::new(SimSettings::default());
        let frame = build_scene(&sim);
        let first_ring = frame
            .items
            .iter()
            .position(|item| item.shading == Shading::Ring)
            .unwrap();
        assert!(frame.items[first_ring..].iter().all(|item| item.shading == Shading::Ring));
    }

    #[test]
    fn test_planets_sit_on_their_orbits() {
        let mut sim = Simulation::new(SimSettings::default());
        sim.frame(&mut FixedDelta(0.5), &mut VecDeque::<SimCommand>::new(), &mut NullSink);
        let frame = build_scene(&sim);

        for planet in &sim.system().planets {
            let item = frame
                .items
                .iter()
                .find(|item| item.texture == planet.spec.texture)
                .unwrap();
            assert!(item.origin().abs_diff_eq(planet.position, 1e-4));
            assert!((item.origin().length() - planet.spec.orbit_radius).abs() < 1e-3);
        }
    }

    #[test]
    fn test_sun_and_sky_at_origin_with_body_scale() {
        let sim = Simulation::new(SimSettings::default());
        let frame = build_scene(&sim);
        for body in [SUN, SKY] {
            let item = frame.items.iter().find(|i| i.texture == body.texture).unwrap();
            assert_eq!(item.shading, Shading::Unlit);
            assert!(item.origin().abs_diff_eq(Vec3::ZERO, 1e-5));
            let (scale, _, _) = item.model.to_scale_rotation_translation();
            assert!(scale.abs_diff_eq(Vec3::splat(body.scale), 1e-2));
        }
    }

    #[test]
    fn test_ring_scale_and_tint() {
        let sim = Simulation::new(SimSettings::default());
        let saturn = sim.system().planet("saturn").unwrap();
        let ring = saturn.spec.ring.unwrap();
        let frame = build_scene(&sim);

        let item = frame
            .items
            .iter()
            .find(|i| i.shading == Shading::Ring && i.origin().distance(saturn.position) < 0.5)
            .unwrap();
        let (scale, _, translation) = item.model.to_scale_rotation_translation();
        assert!((scale.x - saturn.spec.scale * ring.scale).abs() < 1e-4);
        let lift = ring.y_offset * saturn.spec.scale;
        assert!((translation.y - lift).abs() < 1e-5);
        assert_eq!(item.tint, Vec4::from_array(ring.color()));
    }

    #[test]
    fn test_manifest_is_unique_and_covers_scene() {
        let manifest = texture_manifest();
        let mut sorted = manifest.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), manifest.len());

        let sim = Simulation::new(SimSettings::default());
        for item in build_scene(&sim).items {
            assert!(manifest.contains(&item.texture), "{} missing", item.texture);
        }
    }

    #[test]
    fn test_unknown_texture_falls_back_to_white() {
        assert_eq!(fallback_color("nope.png"), [255; 4]);
        assert_ne!(fallback_color("earth.jpg"), [255; 4]);
    }
}
