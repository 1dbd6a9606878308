//! Command-line flattener: burns an exported annotation document into its
//! source image and writes the result as a PNG.
//!
//! ```text
//! polymark-render <annotations.json> <image> <output.png>
//! ```
//!
//! The document's recorded image dimensions must match the supplied image;
//! annotations are drawn from the document's pixel coordinates.

use std::env;
use std::fs;
use std::process::ExitCode;

use polymark::format::{raster, structured};

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let [_, annotations_path, image_path, output_path] = args.as_slice() else {
        eprintln!("Usage: polymark-render <annotations.json> <image> <output.png>");
        return ExitCode::FAILURE;
    };

    match run(annotations_path, image_path, output_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("Error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(annotations_path: &str, image_path: &str, output_path: &str) -> Result<(), String> {
    let json = fs::read_to_string(annotations_path)
        .map_err(|e| format!("Failed to read {annotations_path}: {e}"))?;
    let document = structured::from_json(&json)
        .map_err(|e| format!("Failed to parse {annotations_path}: {e}"))?;

    if let Some(metadata) = &document.metadata {
        if !structured::is_compatible_version(&metadata.version) {
            log::warn!(
                "⚠️ Document version {} may not match this renderer",
                metadata.version
            );
        }
    }

    let base = image::open(image_path).map_err(|e| format!("Failed to open {image_path}: {e}"))?;
    log::info!(
        "Rendering {} annotations onto {} ({}x{})",
        document.annotations.len(),
        image_path,
        base.width(),
        base.height()
    );

    let shapes = raster::shapes_from_document(&document);
    let png = raster::render_overlay_png(
        &base,
        (document.image_width, document.image_height),
        &shapes,
    )
    .map_err(|e| format!("Failed to render overlay: {e}"))?;

    fs::write(output_path, png).map_err(|e| format!("Failed to write {output_path}: {e}"))?;
    log::info!("✅ Wrote {output_path}");
    Ok(())
}
