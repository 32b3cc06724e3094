//! Quick scene validation utility
//!
//! Usage: `validate_scene <scene dir> [project dir]`. The project directory
//! defaults to the parent of the scene directory.

use engine::config::SceneLayout;
use engine::core::entity::{EntityKind, World};
use engine::io::{load_scene, OsFileSystem};
use std::{env, path::Path, process::ExitCode};

fn main() -> ExitCode {
    engine::init_logging();

    let args: Vec<String> = env::args().collect();
    let scene_path = if args.len() > 1 { &args[1] } else { "scene" };

    let scene_dir = Path::new(scene_path);
    let project_dir = match args.get(2) {
        Some(dir) => Path::new(dir),
        None => scene_dir.parent().unwrap_or(Path::new(".")),
    };
    println!("Validating scene: {}", scene_dir.display());

    let mut world = World::new();
    match load_scene(&mut world, &OsFileSystem, &SceneLayout::default(), project_dir, scene_dir) {
        Ok(report) => {
            println!("✓ Scene loaded");
            for kind in [
                EntityKind::Mesh,
                EntityKind::TransformNode,
                EntityKind::Light,
                EntityKind::ShadowGenerator,
                EntityKind::Camera,
            ] {
                println!("  {kind}: {}", report.count(kind));
            }
            println!("  Geometries: {}", world.assets().geometries().count());
            println!("  Materials: {}", world.assets().materials().count());

            for id in &report.unresolved_parents {
                println!("  ! {id} has an unknown parent and was loaded as a root");
            }
            if report.is_complete() {
                ExitCode::SUCCESS
            } else {
                for failure in &report.failures {
                    eprintln!("✗ {failure}");
                }
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            eprintln!("✗ Failed to load scene: {e}");
            ExitCode::FAILURE
        }
    }
}
