//! Build script for spotiview.
//!
//! Copies `.env.example` into the local data directory, next to where the
//! binary looks for its `.env`.

use std::{env, fs, path::PathBuf};

/// Copies the configuration template to the data directory.
///
/// - Linux: `~/.local/share/spotiview/.env.example`
/// - macOS: `~/Library/Application Support/spotiview/.env.example`
/// - Windows: `%LOCALAPPDATA%/spotiview/.env.example`
///
/// A missing template only produces a cargo warning.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Re-run if the template changes
    println!("cargo:rerun-if-changed=.env.example");

    // Where to copy FROM (crate root)
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let env_example_path = manifest_dir.join(".env.example");

    let mut out_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    out_dir.push("spotiview");
    fs::create_dir_all(&out_dir)?;

    // Only copy if the source exists; otherwise warn instead of failing
    if env_example_path.is_file() {
        let contents = fs::read_to_string(&env_example_path)?;
        fs::write(out_dir.join(".env.example"), contents)?;
    } else {
        println!(
            "cargo:warning=.env.example not found at {}",
            env_example_path.display()
        );
    }

    Ok(())
}
