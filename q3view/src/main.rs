//! Headless Quake3 level viewer. Loads a BSP, places a fly camera and runs
//! the visibility and draw pipeline for a number of frames against a
//! counting backend, logging what each frame would have drawn.

mod backend;
mod camera;
mod cli;
mod config;
mod textures;

use std::error::Error;
use std::path::PathBuf;
use std::time::Instant;

use cli::*;
use glam::Vec3;
use level::{DEFAULT_TESS_LEVEL, FrameStats, Level, LoadOptions, load_level_with, render};
use log::{debug, info, warn};
use math::swizzle;
use mimalloc::MiMalloc;
use render_trait::Camera;
use simplelog::TermLogger;

use crate::backend::CountingBackend;
use crate::camera::FlyCamera;
use crate::config::UserConfig;
use crate::textures::DirResolver;

const BASE_DIR: &str = "q3view/";
/// Eye height above a spawn point origin
const VIEW_HEIGHT: f32 = 26.0;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> Result<(), Box<dyn Error>> {
    let mut options: CLIOptions = argh::from_env();

    let mut user_config = UserConfig::load()?;
    user_config.sync_cli(&mut options);

    TermLogger::init(
        options.verbose.unwrap_or(log::LevelFilter::Info),
        simplelog::ConfigBuilder::default()
            .set_time_level(log::LevelFilter::Trace)
            .build(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    if options.map.is_empty() {
        return Err("no map to load, pass one with --map".into());
    }
    user_config.write();

    let swizzle_axes = options.swizzle.unwrap_or(true);
    let mut level = load_level_with(&options.map, LoadOptions { swizzle_axes })?;
    level.set_tess_level(options.tess_level.unwrap_or(DEFAULT_TESS_LEVEL));

    let mut resolver = DirResolver::new(options.textures.clone().map(PathBuf::from));
    let misses = level.preload_textures(&mut resolver);
    if misses > 0 && options.textures.is_none() {
        warn!("No texture directory given, every surface uses the placeholder");
    }
    debug!("{} texture files found", resolver.resolved());

    let mut camera = spawn_camera(&level, &options, swizzle_axes);
    info!("Camera at {:?}", camera.position());

    let frames = options.frames.unwrap_or(1);
    let mut backend = CountingBackend::default();
    let mut totals = FrameStats::default();
    let start = Instant::now();
    for frame in 0..frames {
        let stats = render(&mut level, &camera, &mut backend);
        debug!("Frame {}: {}", frame, stats);
        totals += stats;
        camera.advance(options.speed);
        camera.turn(options.turn);
    }
    let elapsed = start.elapsed();

    report(&level, &backend, &totals, frames, elapsed.as_secs_f64());

    #[cfg(feature = "hprof")]
    coarse_prof::write(&mut std::io::stdout())?;
    Ok(())
}

/// Use the position from the command line, else the map's spawn point, else
/// the middle of the level. Positions given on the command line are in the
/// file's coordinates like the spawn point is.
fn spawn_camera(level: &Level, options: &CLIOptions, swizzled: bool) -> FlyCamera {
    let to_world = |v: Vec3| if swizzled { swizzle(v) } else { v };
    let fov = options.fov.unwrap_or(90.0);

    if let Some(Position(position)) = options.position {
        return FlyCamera::new(
            to_world(position),
            options.yaw.unwrap_or(0.0),
            options.pitch,
            fov,
            swizzled,
        );
    }

    if let Some((origin, angle)) = level.spawn_point() {
        info!("Using spawn point at {:?}", origin);
        return FlyCamera::new(
            to_world(origin + Vec3::Z * VIEW_HEIGHT),
            options.yaw.unwrap_or(angle),
            options.pitch,
            fov,
            swizzled,
        );
    }

    warn!("Map has no spawn point, starting in the middle");
    let centre = level.tree().node(level::ROOT).bounds.center();
    FlyCamera::new(
        centre,
        options.yaw.unwrap_or(0.0),
        options.pitch,
        fov,
        swizzled,
    )
}

fn report(
    level: &Level,
    backend: &CountingBackend,
    totals: &FrameStats,
    frames: u32,
    secs: f64,
) {
    let per_frame = |n: u32| n as f64 / frames.max(1) as f64;
    info!(
        "{} frames in {:.2}ms, {:.3}ms per frame",
        frames,
        secs * 1000.0,
        secs * 1000.0 / frames.max(1) as f64
    );
    info!(
        "Per frame: {:.1} faces, {:.1} polygons, {:.1} draws, {:.1} texture binds, {:.1} lightmap binds, {:.1} patches",
        per_frame(totals.visible_faces),
        per_frame(totals.polygons),
        per_frame(totals.draw_calls),
        per_frame(totals.texture_binds),
        per_frame(totals.lightmap_binds),
        per_frame(totals.patches),
    );
    info!(
        "PVS rebuilt {} times, {} patch faces cached",
        level.vis_state().recomputations(),
        level.patch_cache().len(),
    );
    info!(
        "Submitted {} triangles, {} vertices, {} indices, {} strips",
        backend.triangles, backend.vertices, backend.indices, backend.strips
    );
    if backend.bad_indices > 0 {
        warn!("{} out of range indices were submitted", backend.bad_indices);
    }
    if backend.redundant_binds > 0 {
        warn!("{} binds repeated the bound state", backend.redundant_binds);
    }
}
