// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI tool: reconstruct building elements from a drawing exported as JSON
//!
//! Runs one command against an in-memory host seeded with default families
//! and prints the created elements together with the run report.
//!
//! Usage:
//!   cad2bim <drawing.json> [options]

use cad2bim_reconstruct::{
    run_command, Category, Command, Drawing, HostContext, LayerRoles, Level, RecordingHost,
    ReconstructionConfig, ScriptedPicks,
};
use serde_json::json;
use std::env;
use std::fs;
use std::process;
use tracing::{error, info, warn};

struct Options {
    drawing_path: String,
    config_path: Option<String>,
    command: Command,
    layers: Vec<String>,
    level_name: String,
    level_elevation: f64,
    output_path: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            env::var("RUST_LOG").unwrap_or_else(|_| "info,cad2bim_reconstruct=debug".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            print_usage();
            process::exit(2);
        }
    };

    if let Err(e) = run(&options) {
        error!(error = %e, "Reconstruction failed");
        process::exit(1);
    }
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut options = Options {
        drawing_path: args[1].clone(),
        config_path: None,
        command: Command::Auto,
        layers: Vec::new(),
        level_name: Level::default().name,
        level_elevation: 0.0,
        output_path: None,
    };

    let mut i = 2;
    while i < args.len() {
        let flag = args[i].as_str();
        let mut value = || {
            i += 1;
            args.get(i)
                .cloned()
                .ok_or_else(|| format!("missing value for {}", flag))
        };
        match flag {
            "--config" => options.config_path = Some(value()?),
            "--command" => options.command = value()?.parse()?,
            "--layer" => options.layers.push(value()?),
            "--level-name" => options.level_name = value()?,
            "--level-elevation" => {
                let raw = value()?;
                options.level_elevation = raw
                    .parse()
                    .map_err(|_| format!("invalid level elevation '{}'", raw))?;
            }
            "--output" => options.output_path = Some(value()?),
            other => return Err(format!("unknown option: {}", other)),
        }
        i += 1;
    }
    Ok(options)
}

/// Layers to pick when none were given: the first layer with the role each
/// pick of the command expects.
fn default_picks(command: Command, drawing: &Drawing) -> Vec<String> {
    let roles: &[Option<Category>] = match command {
        Command::Auto => &[None],
        Command::Walls => &[Some(Category::Wall)],
        Command::Windows => &[Some(Category::Window)],
        Command::Doors => &[Some(Category::Door), Some(Category::Wall)],
        Command::Columns => &[Some(Category::Column)],
        Command::Axes => &[Some(Category::Axis)],
    };
    let names = drawing.layer_names();
    roles
        .iter()
        .filter_map(|wanted| {
            names
                .iter()
                .find(|name| match (LayerRoles::resolve(name), wanted) {
                    (Some(role), Some(wanted)) => role == *wanted,
                    (Some(_), None) => true,
                    (None, _) => false,
                })
                .cloned()
        })
        .collect()
}

fn run(options: &Options) -> cad2bim_reconstruct::Result<()> {
    let config = match &options.config_path {
        Some(path) => ReconstructionConfig::from_json_file(path)?,
        None => ReconstructionConfig::default(),
    };
    let drawing = Drawing::from_json_file(&options.drawing_path)?;
    info!(
        drawing = %drawing.name,
        objects = drawing.objects.len(),
        command = %options.command,
        "Loaded drawing"
    );

    let layers = if options.layers.is_empty() {
        default_picks(options.command, &drawing)
    } else {
        options.layers.clone()
    };
    let mut picks = ScriptedPicks::new(drawing, layers);
    let mut host = RecordingHost::with_default_families(config.units_per_mm);
    let ctx = HostContext::new(Level {
        name: options.level_name.clone(),
        elevation: options.level_elevation,
    });

    let report = run_command(options.command, &mut picks, &mut host, &ctx, &config)?;
    if picks.remaining() > 0 {
        warn!(unused = picks.remaining(), "More layers given than the command picks");
    }

    let output = json!({
        "elements": host.elements(),
        "transactions": host.transactions(),
        "new_types": host.duplicated_types(),
        "report": report,
    });
    let text = serde_json::to_string_pretty(&output)?;
    match &options.output_path {
        Some(path) => {
            fs::write(path, text)?;
            info!(path = %path, "Wrote result");
        }
        None => println!("{}", text),
    }
    Ok(())
}

fn print_usage() {
    eprintln!("Usage: cad2bim <drawing.json> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --command <name>          auto, walls, windows, doors, columns or axes (default: auto)");
    eprintln!("  --layer <name>            Layer to pick; repeat for commands with two picks");
    eprintln!("  --config <file>           Reconstruction config as JSON (default: built-in)");
    eprintln!("  --level-name <name>       Level to place elements on (default: Level 1)");
    eprintln!("  --level-elevation <v>     Level elevation in native units (default: 0)");
    eprintln!("  --output <file>           Write the result here instead of stdout");
}
