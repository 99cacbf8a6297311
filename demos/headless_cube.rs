//! Renders a lit, spinning cube over the ground grid into the offscreen
//! target for a couple of seconds of simulated time.
//!
//! `RUST_LOG=debug cargo run --example headless_cube`

use tessera::config::{LightConfig, RenderSettings, SceneConfig};
use tessera::resources::primitives::{CubeOptions, GridOptions, create_cube};
use tessera::{AnimationEvent, Motion, Rgba, Scene, SceneEvent, WgpuContext};

const FRAME_MS: f32 = 1000.0 / 60.0;

fn main() -> tessera::Result<()> {
    env_logger::init();

    let settings = RenderSettings::default();
    let mut ctx = pollster::block_on(WgpuContext::new(&settings))?;

    let config = SceneConfig::new("demo", 8.0, 6.0, 20.0)
        .with_light(LightConfig {
            direction: [0.5, 3.0, 4.0],
            ..LightConfig::default()
        })
        .with_grid(GridOptions::default())
        .with_background([0.1, 0.1, 0.12, 1.0]);
    let mut scene = Scene::new(&config)?;
    scene.add_camera(tessera::Camera::perspective("eye", 45.0));

    let mut options = CubeOptions::default();
    options.face_colors.top = Some(Rgba::RED);
    let cube = scene.add_shape(create_cube(&options)?);

    scene.subscribe(|event| {
        if let SceneEvent::ShapeRemoved(key) = event {
            log::info!("shape {key:?} removed");
        }
    });

    let spin = Motion::new(cube)
        .begin()
        .spent(1000.0)
        .rotate_y(180.0)
        .then()
        .spent(1000.0)
        .move_to([0.0, 1.0, 0.0])
        .end();
    scene.animation_mut().add_motion(spin)?;

    let summary = pollster::block_on(scene.link(&mut ctx));
    for (key, log) in &summary.failed {
        log::error!("program `{key}` failed: {log}");
    }

    scene.animation_mut().play();
    let mut frames = 0;
    loop {
        let events = scene.update_animation(FRAME_MS);
        let stats = scene.render(&mut ctx)?;
        frames += 1;
        for event in &events {
            if let AnimationEvent::Fps(fps) = event {
                log::info!("{fps} fps, {} draws", stats.draw_calls);
            }
        }
        if events.contains(&AnimationEvent::Finish) {
            break;
        }
    }
    log::info!("rendered {frames} frames");

    scene.remove_shape(cube)?;
    scene.render(&mut ctx)?;
    scene.teardown(&mut ctx);
    Ok(())
}
