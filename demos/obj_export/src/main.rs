// Copyright 2025 the Spintext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Export extruded text as a Wavefront OBJ file.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use spintext::{Font, Mesh, TextGeometry, TextOptions};

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let source = fs::read(&args.font)
        .with_context(|| format!("couldn't read font {}", args.font.display()))?;
    let font = Font::from_json(&source)
        .with_context(|| format!("couldn't load font {}", args.font.display()))?;

    let mut options = match &args.options {
        Some(path) => {
            let source = fs::read(path)
                .with_context(|| format!("couldn't read options {}", path.display()))?;
            serde_json::from_slice::<TextOptions>(&source)
                .with_context(|| format!("couldn't parse options {}", path.display()))?
        }
        None => TextOptions::default(),
    };
    options.font = Some(Arc::new(font));
    args.apply(&mut options);

    let mut mesh = TextGeometry::new(&args.text, &options)?;
    if args.center {
        mesh.center();
    }

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("couldn't create {}", path.display()))?;
            write_obj(&mesh, BufWriter::new(file))?;
            eprintln!(
                "Wrote {} triangles to {}",
                mesh.triangle_count(),
                path.display()
            );
        }
        None => write_obj(&mesh, BufWriter::new(io::stdout().lock()))?,
    }
    Ok(())
}

/// Write the mesh as a single OBJ object, with one `usemtl` block per draw group.
fn write_obj(mesh: &Mesh, mut out: impl Write) -> Result<()> {
    writeln!(out, "# spintext {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(out, "o text")?;
    for [x, y, z] in &mesh.positions {
        writeln!(out, "v {x} {y} {z}")?;
    }
    for [u, v] in &mesh.uvs {
        writeln!(out, "vt {u} {v}")?;
    }
    for [x, y, z] in &mesh.normals {
        writeln!(out, "vn {x} {y} {z}")?;
    }
    for group in &mesh.groups {
        let material = match group.material_index {
            0 => "cap",
            _ => "side",
        };
        writeln!(out, "usemtl {material}")?;
        for tri in mesh.indices[group.start..group.start + group.count].chunks_exact(3) {
            // OBJ indices start at 1.
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| i + 1);
            writeln!(out, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}")?;
        }
    }
    out.flush()?;
    Ok(())
}

#[derive(Parser, Debug)]
#[command(about, long_about = None, bin_name = "cargo run -p obj_export --")]
struct Args {
    /// Path to a typeface JSON font
    font: PathBuf,
    /// The text to extrude, line breaks start new lines
    text: String,
    /// Where to write the OBJ file. Defaults to stdout
    #[arg(long, short)]
    output: Option<PathBuf>,
    /// JSON file with text options, overridden by the flags below
    #[arg(long)]
    options: Option<PathBuf>,
    /// Size of the text, in output units per em
    #[arg(long, short)]
    size: Option<f64>,
    /// Extrusion depth
    #[arg(long, short)]
    depth: Option<f64>,
    #[arg(long)]
    /// Bevel the edges of the caps
    bevel: bool,
    #[arg(long)]
    bevel_thickness: Option<f64>,
    #[arg(long)]
    bevel_size: Option<f64>,
    #[arg(long)]
    bevel_offset: Option<f64>,
    #[arg(long)]
    bevel_segments: Option<usize>,
    /// Number of straight segments per curve
    #[arg(long)]
    curve_segments: Option<usize>,
    /// Move the centre of the mesh's bounding box to the origin
    #[arg(long)]
    center: bool,
}

impl Args {
    fn apply(&self, options: &mut TextOptions) {
        let extrude = &mut options.extrude;
        if let Some(size) = self.size {
            options.size = size;
        }
        if let Some(depth) = self.depth {
            options.depth = Some(depth);
        }
        extrude.bevel_enabled |= self.bevel;
        if let Some(thickness) = self.bevel_thickness {
            extrude.bevel_thickness = thickness;
        }
        if let Some(size) = self.bevel_size {
            extrude.bevel_size = size;
        }
        if let Some(offset) = self.bevel_offset {
            extrude.bevel_offset = offset;
        }
        if let Some(segments) = self.bevel_segments {
            extrude.bevel_segments = segments;
        }
        if let Some(segments) = self.curve_segments {
            extrude.curve_segments = segments;
        }
    }
}
