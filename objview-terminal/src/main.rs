/// objview - interactive OBJ viewer for the terminal
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use nalgebra::{Point3, Vector3};
use objview_core::{Mesh, Scene};
use objview_terminal::TerminalApp;

const NEAR_PLANE: f32 = 0.1;
const FAR_PLANE: f32 = 100.0;

/// View a Wavefront OBJ model as ASCII art, navigable with the keyboard
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// OBJ file to view; a built-in cube is shown when omitted
    model: Option<PathBuf>,

    /// Uniform scale applied to the model
    #[arg(long, default_value_t = 1.0)]
    scale: f32,

    /// Vertical field of view in degrees
    #[arg(long, default_value_t = 45.0)]
    fov: f32,

    /// Camera movement speed in world units per second
    #[arg(long, default_value_t = 5.0)]
    move_speed: f32,

    /// Camera rotation speed in degrees per second
    #[arg(long, default_value_t = 90.0)]
    rotate_speed: f32,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let (width, height) = crossterm::terminal::size()?;
    let mut scene = Scene::new(width as u32, height as u32);

    let aspect = scene.camera().aspect();
    scene
        .camera_mut()
        .set_projection(args.fov, aspect, NEAR_PLANE, FAR_PLANE);

    let scale = Vector3::repeat(args.scale);
    match &args.model {
        Some(path) => scene.add_object(path, Point3::origin(), scale)?,
        None => {
            tracing::info!("no model given, showing the built-in cube");
            scene.add_mesh(Mesh::cube(2.0), None, Point3::origin(), scale);
        }
    }

    let mut app = TerminalApp::new(scene)?;
    app.controls_mut().move_speed = args.move_speed;
    app.controls_mut().rotate_speed = args.rotate_speed;
    app.run()?;
    Ok(())
}
