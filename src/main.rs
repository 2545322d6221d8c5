//! apigen: generate API reference pages from an introspected module
//! inventory.
//!
//! ```text
//! apigen -i inventory.json -c apigen.toml -o docs/api docs/*.md
//! dump-inventory | apigen -m mypkg=api -o docs
//! ```

use anyhow::{Context, Result};
use apigen::config::{Config, FileConfig, ModuleSpec, Overrides};
use apigen::inventory::Inventory;
use apigen::render;
use apigen::{AuthoredPage, OutputFile};
use clap::Parser;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(
    name = "apigen",
    about = "Generate API reference pages and group summaries from a module inventory"
)]
struct Cli {
    /// Authored pages with `@apigen-group` directives (glob patterns supported)
    pages: Vec<String>,

    /// Inventory JSON file. If omitted, reads from stdin.
    #[arg(short = 'i', long)]
    inventory: Option<PathBuf>,

    /// Output directory
    #[arg(short = 'o', long)]
    output: PathBuf,

    /// Configuration file (TOML)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Module to document, as name=dir. Can be specified multiple times.
    #[arg(short = 'm', long = "module")]
    modules: Vec<String>,

    /// Regex matching helper types of subscript methods
    #[arg(long)]
    subscript_pattern: Option<String>,

    /// Column limit for summary signatures
    #[arg(long)]
    column_limit: Option<usize>,

    /// Output format: markdown (default), html, json
    #[arg(short = 'f', long, default_value = "markdown")]
    format: String,

    /// Print the planned page paths instead of writing files
    #[arg(long)]
    list: bool,

    /// Verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(&cli)?;
    let inventory = load_inventory(cli.inventory.as_deref())?;
    let renderer = render::create_renderer(&cli.format)?;

    let mut authored = Vec::new();
    for path in expand_globs(&cli.pages)? {
        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .with_context(|| format!("not a file: {}", path.display()))?;
        authored.push(AuthoredPage { file_name, text });
    }

    let output = apigen::generate(&config, &inventory, &authored, renderer.as_ref())
        .map_err(|e| anyhow::anyhow!("{:?} error: {}", e.kind(), e))?;

    if cli.list {
        for page in &output.pages {
            println!("{}", page.path);
        }
        return Ok(());
    }

    write_output(&cli.output, &output.files)?;
    tracing::info!(files = output.files.len(), "done");
    Ok(())
}

/// Write every file into a staging directory inside `out`, then move them
/// into place. A failure before the moves leaves existing output untouched.
fn write_output(out: &Path, files: &[OutputFile]) -> Result<()> {
    fs::create_dir_all(out)
        .with_context(|| format!("failed to create output directory: {}", out.display()))?;
    let staging = tempfile::Builder::new()
        .prefix(".apigen-")
        .tempdir_in(out)
        .with_context(|| format!("failed to create staging directory in {}", out.display()))?;

    for file in files {
        let dest = out.join(&file.path);
        if dest.is_dir() {
            anyhow::bail!("output path is a directory: {}", dest.display());
        }
        let staged = staging.path().join(&file.path);
        if let Some(parent) = staged.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create staging directory: {}", parent.display()))?;
        }
        fs::write(&staged, &file.contents)
            .with_context(|| format!("failed to write {}", staged.display()))?;
    }

    for file in files {
        let dest = out.join(&file.path);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create output directory: {}", parent.display()))?;
        }
    }
    for file in files {
        let dest = out.join(&file.path);
        fs::rename(staging.path().join(&file.path), &dest)
            .with_context(|| format!("failed to write {}", dest.display()))?;
    }
    Ok(())
}

/// Log to stderr; `APIGEN_LOG` (or `RUST_LOG`) overrides the default level.
fn init_tracing(verbose: bool) {
    let default = if verbose { "apigen=debug" } else { "apigen=warn" };
    let filter = EnvFilter::try_from_env("APIGEN_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| default.into());
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let file = match cli.config {
        Some(ref path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            FileConfig::parse(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => FileConfig::default(),
    };
    let modules = cli
        .modules
        .iter()
        .map(|m| ModuleSpec::parse_mapping(m))
        .collect::<apigen::error::Result<Vec<_>>>()?;
    let config = Config::resolve(
        file,
        Overrides {
            modules,
            subscript_pattern: cli.subscript_pattern.clone(),
            column_limit: cli.column_limit,
        },
    )?;
    if config.modules.is_empty() {
        anyhow::bail!("no modules configured; pass -m name=dir or list [[modules]] in the config");
    }
    Ok(config)
}

fn load_inventory(path: Option<&Path>) -> Result<Inventory> {
    let text = match path {
        Some(p) => fs::read_to_string(p)
            .with_context(|| format!("failed to read inventory: {}", p.display()))?,
        None => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .context("failed to read stdin")?;
            input
        }
    };
    Inventory::from_json(&text).context("failed to parse inventory")
}

/// Expand glob patterns into a sorted, deduplicated list of files.
fn expand_globs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        if path.is_file() {
            files.push(path.to_path_buf());
            continue;
        }
        let matches: Vec<_> = glob::glob(pattern)
            .with_context(|| format!("invalid glob pattern: {}", pattern))?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file())
            .collect();
        if matches.is_empty() {
            tracing::warn!(pattern = %pattern, "no files matched");
        }
        files.extend(matches);
    }
    // Sort for deterministic output
    files.sort();
    files.dedup();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn globs_are_sorted_and_deduplicated() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.md"), "").unwrap();
        fs::write(dir.path().join("a.md"), "").unwrap();
        fs::write(dir.path().join("c.txt"), "").unwrap();
        let pattern = format!("{}/*.md", dir.path().display());
        let a = dir.path().join("a.md").display().to_string();
        let files = expand_globs(&[pattern, a]).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, ["a.md", "b.md"]);
    }

    fn file(path: &str, contents: &str) -> OutputFile {
        OutputFile {
            path: path.to_string(),
            contents: contents.to_string(),
        }
    }

    #[test]
    fn output_is_moved_into_place() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("site");
        write_output(&out, &[file("api/m.add.md", "add"), file("index.md", "index")]).unwrap();
        assert_eq!(fs::read_to_string(out.join("api/m.add.md")).unwrap(), "add");
        assert_eq!(fs::read_to_string(out.join("index.md")).unwrap(), "index");
        let entries: Vec<_> = fs::read_dir(&out)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert!(entries.iter().all(|n| !n.starts_with(".apigen-")), "{entries:?}");
    }

    #[test]
    fn blocked_destination_writes_nothing() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("api/m.sub.md")).unwrap();
        let err = write_output(
            dir.path(),
            &[file("api/m.add.md", "add"), file("api/m.sub.md", "sub"), file("index.md", "index")],
        )
        .unwrap_err();
        assert!(err.to_string().contains("output path is a directory"), "{err}");
        assert!(!dir.path().join("api/m.add.md").exists());
        assert!(!dir.path().join("index.md").exists());
        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(entries, ["api"]);
    }
}
