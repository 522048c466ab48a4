//! blockmap CLI: run a project's mappings over recorded blocks.
//!
//! Usage:
//! ```bash
//! blockmap map --manifest project.yaml block-2000000.json block-2000001.json
//! blockmap map --manifest project.yaml --json-logs --log-level debug blocks.json
//! blockmap map -m project.yaml --log blockmap-avalanche=trace blocks.json
//! blockmap info
//! ```

mod logging;

use std::env;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::{bail, Context};

use blockmap::{avalanche_pipeline, AvalancheBlockWrapper, InMemoryEntityStore, ProjectManifest};

use logging::{init_tracing, LogConfig};

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    match args[1].as_str() {
        "map" => {
            if let Err(e) = cmd_map(&args[2..]).await {
                eprintln!("error: {e:#}");
                process::exit(1);
            }
        }
        "info" => cmd_info(),
        "version" | "--version" | "-V" => {
            println!("blockmap {}", env!("CARGO_PKG_VERSION"));
        }
        "help" | "--help" | "-h" => print_usage(),
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    }
}

fn print_usage() {
    println!("blockmap {}", env!("CARGO_PKG_VERSION"));
    println!("Map raw chain blocks into persisted entities\n");
    println!("USAGE:");
    println!("    blockmap <COMMAND>\n");
    println!("COMMANDS:");
    println!("    map      Run a manifest's handlers over block JSON files");
    println!("             --manifest <file> [--log-level <level>] [--log <crate>=<level>]...");
    println!("             [--json-logs] <block.json>...");
    println!("    info     Show supported chain families and stores");
    println!("    version  Print version");
    println!("    help     Print this help");
}

fn cmd_info() {
    println!("blockmap v{}", env!("CARGO_PKG_VERSION"));
    println!("  Chain families: substrate (calls + events), avalanche (calls + events), algorand (raw records)");
    println!("  Mappings: avalanche handleBlock / handleCall / handleEvent");
    println!("  Entity stores: memory, SQLite (feature: sqlite)");
    println!("  Manifest formats: YAML, JSON");
}

// ─── map ─────────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct MapArgs {
    manifest: PathBuf,
    blocks: Vec<PathBuf>,
    log: LogConfig,
}

impl MapArgs {
    fn parse(args: &[String]) -> anyhow::Result<Self> {
        let mut manifest = None;
        let mut blocks = Vec::new();
        let mut log = LogConfig::default();

        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--manifest" | "-m" => {
                    manifest = Some(PathBuf::from(iter.next().context("--manifest needs a path")?));
                }
                "--log-level" => {
                    log.level = iter.next().context("--log-level needs a level")?.clone();
                }
                "--log" => {
                    log.add_target(iter.next().context("--log needs <crate>=<level>")?)?;
                }
                "--json-logs" => log.json = true,
                flag if flag.starts_with('-') => bail!("unknown flag '{flag}'"),
                path => blocks.push(PathBuf::from(path)),
            }
        }

        let manifest = manifest.context("missing --manifest <file>")?;
        if blocks.is_empty() {
            bail!("no block files given");
        }
        Ok(Self { manifest, blocks, log })
    }
}

/// Read block JSON files: each holds one block object or an array of blocks.
fn read_blocks(paths: &[PathBuf]) -> anyhow::Result<Vec<AvalancheBlockWrapper>> {
    let mut blocks = Vec::new();
    for path in paths {
        let src = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let value: serde_json::Value = serde_json::from_str(&src)
            .with_context(|| format!("parsing {}", path.display()))?;
        let raws = match value {
            serde_json::Value::Array(items) => items,
            single => vec![single],
        };
        for raw in raws {
            let block = AvalancheBlockWrapper::from_json(raw)
                .with_context(|| format!("wrapping block from {}", path.display()))?;
            blocks.push(block);
        }
    }
    Ok(blocks)
}

async fn cmd_map(args: &[String]) -> anyhow::Result<()> {
    let args = MapArgs::parse(args)?;
    init_tracing(&args.log);

    let manifest = ProjectManifest::load(&args.manifest)?;
    let store = Arc::new(InMemoryEntityStore::new());
    let mut pipeline = avalanche_pipeline(&manifest, store.clone())?;

    let blocks = read_blocks(&args.blocks)?;
    tracing::info!(project = %manifest.name, blocks = blocks.len(), "Mapping blocks");
    let reports = pipeline.run(blocks).await?;

    let output = serde_json::json!({
        "project": manifest.name,
        "reports": reports,
        "entities": store.snapshot(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_map_args() {
        let args = MapArgs::parse(&strings(&[
            "--manifest",
            "project.yaml",
            "a.json",
            "--json-logs",
            "--log-level",
            "debug",
            "b.json",
        ]))
        .unwrap();

        assert_eq!(args.manifest, PathBuf::from("project.yaml"));
        assert_eq!(args.blocks, vec![PathBuf::from("a.json"), PathBuf::from("b.json")]);
        assert!(args.log.json);
        assert_eq!(args.log.level, "debug");
    }

    #[test]
    fn parse_map_args_errors() {
        assert!(MapArgs::parse(&strings(&["a.json"])).is_err());
        assert!(MapArgs::parse(&strings(&["--manifest", "p.yaml"])).is_err());
        assert!(MapArgs::parse(&strings(&["--manifest"])).is_err());
        assert!(MapArgs::parse(&strings(&["--manifest", "p.yaml", "--verbose", "a.json"])).is_err());
        assert!(MapArgs::parse(&strings(&["-m", "p.yaml", "--log", "blockmap-core", "a.json"])).is_err());
        assert!(MapArgs::parse(&strings(&["-m", "p.yaml", "a.json", "--log"])).is_err());
    }

    #[test]
    fn parse_map_args_log_overrides() {
        let args = MapArgs::parse(&strings(&[
            "-m",
            "project.yaml",
            "--log",
            "blockmap-avalanche=trace",
            "--log-level",
            "warn",
            "--log",
            "blockmap-core=debug",
            "a.json",
        ]))
        .unwrap();

        assert_eq!(args.log.targets.len(), 2);
        assert_eq!(
            args.log.directives(),
            "warn,blockmap_avalanche=trace,blockmap_core=debug"
        );
    }
}
