use std::{path::PathBuf, time::Instant};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use process_state::{
    core::marking::format_marking, BpmnModel, Exportable, Importable, NGramIndex, PetriNet,
    ReachabilityGraph, ReachabilityGraphOptions,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Build the reachability graph and n-gram index of a process model and
/// estimate the states of ongoing traces
#[derive(Parser, Debug)]
#[command(name = "binary", version)]
struct Cli {
    /// JSON model file; `.tgf` and `.ngram.json` outputs are written next to it
    model_path: PathBuf,

    /// Kind of model stored in the file
    #[arg(value_enum)]
    kind: ModelKind,

    /// Maximal n-gram size of the index
    n: usize,

    /// Comma-separated activity sequences, e.g. `A,B,C`
    traces: Vec<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ModelKind {
    Bpmn,
    Petri,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    run(Cli::parse())
}

fn build_graph(cli: &Cli) -> anyhow::Result<ReachabilityGraph> {
    let options = ReachabilityGraphOptions::default();
    let path = cli.model_path.display();
    match cli.kind {
        ModelKind::Bpmn => {
            let model = BpmnModel::import_from_path(&cli.model_path)
                .with_context(|| format!("Failed to import BPMN model from {path}"))?;
            model
                .get_reachability_graph(&options)
                .context("Failed to build reachability graph of BPMN model")
        }
        ModelKind::Petri => {
            let mut net = PetriNet::import_from_path(&cli.model_path)
                .with_context(|| format!("Failed to import Petri net from {path}"))?;
            let repaired = net
                .repair_mixed_decision_points()
                .context("Failed to repair mixed decision points")?;
            if !repaired.is_empty() {
                info!(places = ?repaired, "Repaired mixed decision points");
            }
            net.get_reachability_graph(&options)
                .context("Failed to build reachability graph of Petri net")
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let now = Instant::now();
    let graph = build_graph(&cli)?;
    println!(
        "Built reachability graph with {} markings and {} edges in {:#?}",
        graph.markings.len(),
        graph.edges.len(),
        now.elapsed()
    );

    let now = Instant::now();
    let index = NGramIndex::new(&graph, cli.n).build();
    println!(
        "Built {}-gram index with {} n-grams in {:#?}",
        index.n_gram_size_limit,
        index.associations.len(),
        now.elapsed()
    );

    let graph_path = cli.model_path.with_extension("tgf");
    let index_path = cli.model_path.with_extension("ngram.json");
    graph
        .export_to_path(&graph_path)
        .with_context(|| format!("Failed to write {}", graph_path.display()))?;
    index
        .export_to_path(&index_path)
        .with_context(|| format!("Failed to write {}", index_path.display()))?;
    println!(
        "Wrote {} and {}",
        graph_path.display(),
        index_path.display()
    );

    for trace in &cli.traces {
        let activities: Vec<&str> = trace
            .split(',')
            .map(str::trim)
            .filter(|activity| !activity.is_empty())
            .collect();
        println!("Trace {trace}:");
        for prefix_len in 0..=activities.len() {
            let prefix = &activities[..prefix_len];
            let state = index
                .get_best_marking_state_for(prefix)
                .map_or_else(|| "unknown".to_string(), format_marking);
            println!("  [{}] -> {state}", prefix.join(", "));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::{error::ErrorKind, CommandFactory};

    use super::*;

    #[test]
    fn cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_positional_arguments() {
        let cli = Cli::try_parse_from(["binary", "model.json", "petri", "3", "A,B", "C"]).unwrap();
        assert_eq!(cli.model_path, PathBuf::from("model.json"));
        assert_eq!(cli.kind, ModelKind::Petri);
        assert_eq!(cli.n, 3);
        assert_eq!(cli.traces, vec!["A,B", "C"]);

        let cli = Cli::try_parse_from(["binary", "model.json", "bpmn", "1"]).unwrap();
        assert_eq!(cli.kind, ModelKind::Bpmn);
        assert!(cli.traces.is_empty());
    }

    #[test]
    fn rejects_invalid_arguments() {
        let err = Cli::try_parse_from(["binary", "model.json"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);

        let err = Cli::try_parse_from(["binary", "model.json", "dfg", "3"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);

        let err = Cli::try_parse_from(["binary", "model.json", "bpmn", "three"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn missing_model_file_is_reported_with_context() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::try_parse_from([
            "binary",
            dir.path().join("missing.json").to_str().unwrap(),
            "bpmn",
            "2",
        ])
        .unwrap();
        let err = run(cli).unwrap_err();
        assert!(err.to_string().starts_with("Failed to import BPMN model from"));
    }
}
