use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::config::RenderConfig;
use crate::display::Display;
use crate::error::RenderError;
use crate::input::InputState;
use crate::render::Renderer;
use crate::scene::{FrameGeometry, Scene};

/// Loads the scene, opens the window and runs frames until the user quits.
pub fn run(config: RenderConfig) -> Result<(), RenderError> {
    let mut scene = Scene::load(&config)?;
    let materials = scene.materials(config.pbr);
    let mut renderer = Renderer::from_config(&config);
    let mut display = Display::new(&config.title, config.width, config.height)?;
    info!(
        "Rendering {}x{} {}",
        config.width,
        config.height,
        if renderer.is_multithreaded() { "with the tiled worker pool" } else { "on one thread" }
    );

    let frame_target = Duration::from_secs_f32(config.frame_target_ms() / 1000.0);
    let mut input = InputState::new();
    let mut geometry = FrameGeometry::default();

    let mut previous_frame = Instant::now();
    let mut frame_counter_begin = Instant::now();
    let mut frame_counter: u32 = 0;
    loop {
        display.poll_events(&mut input);
        if input.quit {
            break;
        }

        // Frame pacing: wait out whatever is left of the frame budget.
        let elapsed = previous_frame.elapsed();
        if elapsed < frame_target {
            thread::sleep(frame_target - elapsed);
        }
        let frame_begin = Instant::now();
        let dt = frame_begin.duration_since(previous_frame).as_secs_f32();
        previous_frame = frame_begin;

        scene.update(&input, dt, &mut geometry);
        input.end_frame();
        let stats = renderer.render(&mut geometry, &materials)?;
        display.present(renderer.frame())?;

        let frame_time = frame_begin.elapsed();
        if frame_time > frame_target {
            warn!(
                "Frame took {:.2} ms, budget is {:.2} ms",
                frame_time.as_secs_f32() * 1000.0,
                config.frame_target_ms()
            );
        }
        debug!(
            "Frame: {:.2} ms, {} triangles, tiles per worker {:?}",
            frame_time.as_secs_f32() * 1000.0,
            stats.triangles,
            stats.tiles_per_worker
        );

        if config.print_fps {
            // Counting frames to print stats every second.
            frame_counter += 1;
            if frame_counter_begin.elapsed().as_secs_f32() > 1.0 {
                info!("FPS --- {}", frame_counter);
                frame_counter_begin = Instant::now();
                frame_counter = 0;
            }
        }
    }

    info!("Quit requested, shutting down");
    return Ok(());
}
