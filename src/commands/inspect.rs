//! Inspect command implementation

use console::Style;
use serde_json::json;

use crate::cli::InspectArgs;
use crate::domain::Bundle;
use crate::error::Result;
use crate::hash;
use crate::storage::LoadOptions;

use super::Context;

pub fn run(ctx: &Context, args: InspectArgs) -> Result<()> {
    let bundle = ctx.storage.load(&args.path, &LoadOptions::default())?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&to_json(&bundle))?);
    } else {
        print_bundle(&bundle);
    }
    Ok(())
}

fn to_json(bundle: &Bundle) -> serde_json::Value {
    let package = &bundle.manifest.package;
    json!({
        "package": package.name,
        "version": package.version,
        "description": package.description,
        "digest": bundle.digest(),
        "size": bundle.content_size(),
        "dependencies": bundle.manifest.dependencies.iter().map(|d| d.specifier()).collect::<Vec<_>>(),
        "files": bundle.files.values().map(|f| json!({
            "path": f.path,
            "size": f.content.len(),
            "hash": hash::hash_bytes(&f.content),
        })).collect::<Vec<_>>(),
    })
}

fn print_bundle(bundle: &Bundle) {
    let bold = Style::new().bold();
    let dim = Style::new().dim();
    let package = &bundle.manifest.package;

    println!("{} {}", bold.apply_to(&package.name), package.version);
    if let Some(description) = &package.description {
        println!("  {description}");
    }
    println!("  {} {}", dim.apply_to("digest:"), bundle.digest());

    if !bundle.manifest.dependencies.is_empty() {
        println!();
        println!("{}", bold.apply_to("Dependencies:"));
        for dep in &bundle.manifest.dependencies {
            println!("  {} {}", dep.name, dim.apply_to(dep.specifier()));
        }
    }

    println!();
    println!(
        "{} ({}, {} B):",
        bold.apply_to("Files"),
        bundle.files.len(),
        bundle.content_size()
    );
    for file in bundle.files.values() {
        println!("  {} {}", file.path, dim.apply_to(format!("{} B", file.content.len())));
    }
}
