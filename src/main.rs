//! amr CLI: compose and search AMR graphs.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use miette::{IntoDiagnostic, Result};

use amr_algebra::AlgebraConfig;
use amr_algebra::graph::AmrGraph;
use amr_algebra::graph::topology;
use amr_algebra::join::{IdRange, JoinRequest};
use amr_algebra::matcher::PatternQuery;

#[derive(Parser)]
#[command(name = "amr", version, about = "Graph algebra and pattern matching over AMR graphs")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Append,
    Replace,
    Merge,
}

#[derive(Subcommand)]
enum Commands {
    /// Join a piece graph into a destination graph.
    Join {
        /// Destination graph (JSON).
        #[arg(long)]
        graph: PathBuf,

        /// Piece graph (JSON).
        #[arg(long)]
        piece: PathBuf,

        #[arg(long, value_enum, default_value = "append")]
        mode: Mode,

        /// Relation linking destination to piece (append).
        #[arg(long, default_value = ":arg1")]
        relation: String,

        /// Relation linking the piece back to the destination (append).
        #[arg(long)]
        return_relation: Option<String>,

        /// Destination range, `start` or `start,end`.
        #[arg(long)]
        range: Option<String>,

        /// Piece range, `start` or `start,end`.
        #[arg(long)]
        piece_range: Option<String>,

        /// Overrides the configured join entity.
        #[arg(long)]
        join_entity: Option<String>,

        /// Overrides the configured join relation.
        #[arg(long)]
        join_relation: Option<String>,
    },

    /// Rank the nodes of a graph against a pattern placeholder.
    Search {
        /// Target graph (JSON).
        #[arg(long)]
        graph: PathBuf,

        /// Pattern graph (JSON).
        #[arg(long)]
        pattern: PathBuf,

        /// Pattern node to match; defaults to the first placeholder-instance node.
        #[arg(long)]
        placeholder: Option<String>,

        /// Print ids without scores.
        #[arg(long)]
        ids_only: bool,
    },

    /// Print a graph as a triple list.
    Triples {
        #[arg(long)]
        graph: PathBuf,
    },

    /// Report root, size and acyclicity of a graph.
    Check {
        #[arg(long)]
        graph: PathBuf,
    },
}

fn read_graph(path: &Path) -> Result<AmrGraph> {
    let content = std::fs::read_to_string(path).into_diagnostic()?;
    Ok(AmrGraph::from_json(&content)?)
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
    Ok(())
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AlgebraConfig::load(path)?,
        None => AlgebraConfig::default(),
    };

    match cli.command {
        Commands::Join {
            graph,
            piece,
            mode,
            relation,
            return_relation,
            range,
            piece_range,
            join_entity,
            join_relation,
        } => {
            let destination = read_graph(&graph)?;
            let piece = read_graph(&piece)?;

            let mut request = config.configure(match mode {
                Mode::Append => JoinRequest::append(piece, relation),
                Mode::Replace => JoinRequest::replace(piece),
                Mode::Merge => JoinRequest::merge(piece),
            });
            if let Some(r) = return_relation {
                request = request.with_return_relation(r);
            }
            if let Some(r) = piece_range {
                request = request.with_piece_range(IdRange::parse(&r));
            }
            if let Some(e) = join_entity {
                request = request.with_join_entity(e);
            }
            if let Some(r) = join_relation {
                request = request.with_join_relation(r);
            }

            let engine = config.join_engine()?;
            let outcome = engine.join(&destination, &request, range.as_deref().map(IdRange::parse))?;
            tracing::info!(
                mode = request.mode.name(),
                nodes = outcome.graph.len(),
                renamed = outcome.id_map.len(),
                "join complete"
            );
            print_json(&outcome)?;
        }

        Commands::Search {
            graph,
            pattern,
            placeholder,
            ids_only,
        } => {
            let target = read_graph(&graph)?;
            let pattern = read_graph(&pattern)?;

            let mut query = PatternQuery::new(&pattern);
            if let Some(id) = placeholder {
                query = query.placeholder(id);
            }
            if ids_only {
                query = query.ids_only();
            }

            let ranking = config.pattern_matcher().run(&target, &query)?;
            print_json(&ranking)?;
        }

        Commands::Triples { graph } => {
            let graph = read_graph(&graph)?;
            print_json(&graph.to_triples())?;
        }

        Commands::Check { graph } => {
            let graph = read_graph(&graph)?;
            let report = topology::report(&graph);
            if !report.is_well_formed() {
                tracing::warn!(
                    roots = report.roots,
                    acyclic = report.acyclic,
                    unreachable = report.unreachable.len(),
                    "graph is not a single-rooted acyclic graph"
                );
            }
            print_json(&report)?;
        }
    }

    Ok(())
}
