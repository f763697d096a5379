use std::path::Path;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spring_layout::io::FormatRegistry;
use spring_layout::{GraphDocument, layout_document, select_backend};

mod cli;

use cli::{Cli, Commands, LayoutOptions};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn read_document(registry: &FormatRegistry, input: &Path) -> anyhow::Result<GraphDocument> {
    let document = registry
        .reader_for_path(input)?
        .read(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    info!(
        nodes = document.node_count(),
        edges = document.edge_count(),
        "loaded graph"
    );
    Ok(document)
}

fn layout(input: &Path, output: &Path, options: &LayoutOptions) -> anyhow::Result<()> {
    let config = options.to_config()?;
    let registry = FormatRegistry::with_defaults();
    let writer = registry.writer_for_path(output)?;

    let mut document = read_document(&registry, input)?;
    let layout = layout_document(&mut document, &config)
        .with_context(|| format!("layout of {} failed", input.display()))?;

    writer
        .write(&document, output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    info!(path = %output.display(), "layout saved");
    if let Some(bbox) = layout.bounding_box() {
        info!(min = ?bbox.min, max = ?bbox.max, "bounding box");
    }

    println!(
        "Laid out {} nodes in {} ({}, {} after {} iterations) -> {}",
        layout.len(),
        layout.dimensions,
        layout.backend,
        layout.outcome.state,
        layout.outcome.iterations,
        output.display()
    );
    Ok(())
}

fn stats(input: &Path, threshold: usize) -> anyhow::Result<()> {
    let registry = FormatRegistry::with_defaults();
    let document = read_document(&registry, input)?;
    let graph = document.to_graph()?;

    let isolated = graph.degrees().iter().filter(|&&d| d == 0).count();
    let self_loops = graph.edges().iter().filter(|e| e.is_self_loop()).count();

    println!("nodes: {}", graph.node_count());
    println!("edges: {}", graph.edge_count());
    println!("isolated nodes: {isolated}");
    println!("self-loops: {self_loops}");
    println!(
        "backend: {} (threshold {threshold})",
        select_backend(graph.node_count(), threshold)
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Layout {
            input,
            output,
            options,
        }) => {
            layout(&input, &output, &options)?;
        }
        Some(Commands::Stats { input, threshold }) => {
            stats(&input, threshold)?;
        }
        None => {
            // Default behavior: layout if input provided
            match (cli.input, cli.output) {
                (Some(input), Some(output)) => layout(&input, &output, &cli.options)?,
                (Some(_), None) => anyhow::bail!("--output is required with --input"),
                (None, _) => {
                    println!("spring-layout: no input specified. Use --help for usage.");
                }
            }
        }
    }

    Ok(())
}
