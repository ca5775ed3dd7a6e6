/// Example: Parse an OBJ file and print mesh statistics
///
/// Usage: cargo run --example mesh_info -- path/to/model.obj

use std::env;
use std::process::ExitCode;

use objview_core::load_obj;

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let Some(path) = env::args().nth(1) else {
        eprintln!("Usage: mesh_info <obj-file>");
        return ExitCode::FAILURE;
    };

    let model = match load_obj(&path) {
        Ok(model) => model,
        Err(error) => {
            eprintln!("{error}");
            return ExitCode::FAILURE;
        }
    };

    let mesh = &model.mesh;
    let bounds = mesh.bounding_box();
    println!("{path}");
    println!("  vertices:  {}", mesh.vertices.len());
    println!("  indices:   {}", mesh.indices.len());
    println!("  triangles: {}", mesh.triangle_count());
    println!(
        "  bounds:    ({:.3}, {:.3}, {:.3}) .. ({:.3}, {:.3}, {:.3})",
        bounds.min.x, bounds.min.y, bounds.min.z, bounds.max.x, bounds.max.y, bounds.max.z
    );
    match model.texture {
        Some(texture) => println!("  texture:   {}x{}", texture.width(), texture.height()),
        None => println!("  texture:   none"),
    }
    ExitCode::SUCCESS
}
