use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use catalog_core::{
    audit_tree, seed_demo_data, AuditReport, CategoryHierarchy, EngineConfig, PartPlacement,
};
use catalog_server::{open_store, CatalogServer, ServerConfig};
use catalog_store::DocumentStore;
use catalog_types::{Category, Part, PartSearch};
use colored::Colorize;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Command::Serve(args) => cmd_serve(args),
        Command::Seed(args) => cmd_seed(args),
        Command::Check(args) => cmd_check(args, format),
        Command::Categories(args) => cmd_categories(args, format),
        Command::Parts(args) => cmd_parts(args, format),
    }
}

fn serve_config(args: &ServeArgs) -> anyhow::Result<ServerConfig> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(data) = &args.data {
        config.data_path = Some(data.clone());
    }
    if args.seed {
        config.seed_demo_data = true;
    }
    Ok(config)
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = serve_config(&args)?;
    let storage = match &config.data_path {
        Some(path) => path.display().to_string(),
        None => "memory".to_string(),
    };
    println!(
        "Catalog server on {} (store: {})",
        config.bind_addr.to_string().bold(),
        storage
    );
    let server = CatalogServer::new(config)?;
    let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;
    runtime.block_on(server.serve())?;
    Ok(())
}

fn open(path: &Path, must_exist: bool) -> anyhow::Result<Arc<dyn DocumentStore>> {
    if must_exist && !path.exists() {
        bail!("no catalog at {}", path.display());
    }
    let config = ServerConfig {
        data_path: Some(path.to_path_buf()),
        ..Default::default()
    };
    open_store(&config).with_context(|| format!("opening {}", path.display()))
}

/// Hierarchy engine configured from `--config`, defaults otherwise.
fn hierarchy(args: &DataArgs) -> anyhow::Result<CategoryHierarchy> {
    let engine = match &args.config {
        Some(path) => ServerConfig::load(path)?.engine,
        None => EngineConfig::default(),
    };
    Ok(CategoryHierarchy::new(engine))
}

fn cmd_seed(args: DataArgs) -> anyhow::Result<()> {
    let categories = hierarchy(&args)?;
    let store = open(&args.data, false)?;
    let inserted = seed_demo_data(store.as_ref(), &categories, &PartPlacement::new())?;
    if inserted {
        println!(
            "{} Demo data written to {}",
            "✓".green().bold(),
            args.data.display()
        );
    } else {
        println!("Demo data already present; nothing to do.");
    }
    Ok(())
}

fn cmd_check(args: DataArgs, format: OutputFormat) -> anyhow::Result<()> {
    let store = open(&args.data, true)?;
    let report = audit_tree(store.as_ref())?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_report(&report),
    }
    if !report.is_consistent() {
        bail!("{} violation(s) found", report.violations.len());
    }
    Ok(())
}

fn print_report(report: &AuditReport) {
    println!(
        "{} categories, {} parts",
        report.category_count.to_string().bold(),
        report.part_count.to_string().bold()
    );
    if report.is_consistent() {
        println!("{} No issues.", "✓".green().bold());
        return;
    }
    for violation in &report.violations {
        let line = serde_json::to_string(violation).unwrap_or_else(|_| format!("{violation:?}"));
        println!("  {} {}", "✗".red().bold(), line);
    }
}

fn cmd_categories(args: DataArgs, format: OutputFormat) -> anyhow::Result<()> {
    let engine = hierarchy(&args)?;
    let store = open(&args.data, true)?;
    let categories = engine.list(store.as_ref())?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&categories)?),
        OutputFormat::Text => {
            for line in render_tree(&categories) {
                println!("{line}");
            }
        }
    }
    Ok(())
}

/// Indented outline of the category forest. Categories whose parent is
/// missing are shown as roots, marked.
fn render_tree(categories: &[Category]) -> Vec<String> {
    let names: BTreeSet<&str> = categories.iter().map(|c| c.name.as_str()).collect();
    let mut children: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    let mut roots = Vec::new();
    for c in categories {
        if c.is_base() {
            roots.push((c.name.as_str(), false));
        } else if !names.contains(c.parent_name.as_str()) {
            roots.push((c.name.as_str(), true));
        } else {
            children
                .entry(c.parent_name.as_str())
                .or_default()
                .push(c.name.as_str());
        }
    }

    let mut lines = Vec::new();
    let mut seen = BTreeSet::new();
    for (root, orphan) in roots {
        let mut stack = vec![(root, 0usize)];
        while let Some((name, depth)) = stack.pop() {
            if !seen.insert(name) {
                continue;
            }
            let mut line = format!("{}{}", "  ".repeat(depth), name);
            if depth == 0 && orphan {
                line = format!("{line} {}", "(missing parent)".yellow());
            }
            lines.push(line);
            if let Some(kids) = children.get(name) {
                stack.extend(kids.iter().rev().map(|k| (*k, depth + 1)));
            }
        }
    }
    lines
}

fn cmd_parts(args: PartsArgs, format: OutputFormat) -> anyhow::Result<()> {
    let store = open(&args.data.data, true)?;
    let placement = PartPlacement::new();
    let parts = match &args.category {
        Some(category) => placement.search(store.as_ref(), &PartSearch::in_category(category.clone()))?,
        None => placement.list(store.as_ref())?,
    };
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&parts)?),
        OutputFormat::Text => {
            if parts.is_empty() {
                println!("No parts.");
            }
            for part in &parts {
                println!("{}", part_line(part));
            }
        }
    }
    Ok(())
}

fn part_line(part: &Part) -> String {
    let l = &part.location;
    format!(
        "{} {} [{}] x{} @ {:.2}  {}/{}/{}/{} ({},{})",
        part.serial_number.yellow().bold(),
        part.name,
        part.category.cyan(),
        part.quantity,
        part.price,
        l.room,
        l.bookcase,
        l.shelf,
        l.cuvette,
        l.column,
        l.row
    )
}
