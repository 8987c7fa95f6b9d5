//! Build script for tunemap.
//!
//! Copies the configuration templates shipped with the crate into the user's
//! local data directory so that `tunemap` finds ready-to-edit examples where it
//! looks for its configuration:
//!
//! - Linux: `~/.local/share/tunemap/`
//! - macOS: `~/Library/Application Support/tunemap/`
//! - Windows: `%LOCALAPPDATA%/tunemap/`
//!
//! Missing templates only produce a cargo warning.

use std::{env, fs, path::PathBuf};

const TEMPLATES: [&str; 2] = [".env.example", "filters.example.json"];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    for template in TEMPLATES {
        println!("cargo:rerun-if-changed={}", template);
    }

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);

    let mut out_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    out_dir.push("tunemap");
    fs::create_dir_all(&out_dir)?;

    for template in TEMPLATES {
        let source = manifest_dir.join(template);
        if source.is_file() {
            let contents = fs::read_to_string(&source)?;
            fs::write(out_dir.join(template), contents)?;
        } else {
            println!("cargo:warning={} not found at {}", template, source.display());
        }
    }

    Ok(())
}
