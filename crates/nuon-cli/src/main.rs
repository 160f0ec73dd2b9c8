use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use miette::{Context, IntoDiagnostic as _};

use nuon_ir::Model;
use nuon_utils::{LoggerConfig, RotateLogger};

/// nuon: ONNX model inspector
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Input ONNX model file
    input: PathBuf,

    /// Print nodes in topological order with inferred output shapes
    #[arg(long)]
    topo: bool,

    /// Print per-operator-type node counts
    #[arg(long)]
    stats: bool,

    /// Write rotating log files into this directory (defaults to stderr logging)
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) -> miette::Result<()> {
    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    if let Some(log_dir) = &cli.log_dir {
        let mut config = LoggerConfig::new("nuon", log_dir);
        config.level = level;
        RotateLogger::new(config)
            .and_then(RotateLogger::install)
            .into_diagnostic()
            .wrap_err("failed to set up file logging")?;
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(level)
            .try_init()
            .ok();
    }

    Ok(())
}

fn run() -> miette::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    // 1. Load the model and build the validated topology.
    let mut model = nuon_onnx::load_from_file(&cli.input)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to load {}", cli.input.display()))?;
    model
        .get_graph_mut()
        .construct_topology()
        .into_diagnostic()
        .wrap_err("graph validation failed")?;

    // 2. Header metadata.
    println!("model: {}", cli.input.display());
    println!("  ir version:       {}", model.get_ir_version());
    println!("  producer:         {} {}", model.get_producer_name(), model.get_producer_version());
    println!("  domain:           {}", model.get_domain());
    println!("  model version:    {}", model.get_model_version());
    for (domain, version) in model.get_domain_version() {
        let domain = if domain.is_empty() { "ai.onnx" } else { domain };
        println!("  opset:            {domain} v{version}");
    }

    let graph = model.get_graph();
    println!(
        "  graph:            {} node(s), {} input(s), {} output(s), {} overridable initializer(s)",
        graph.get_nodes().len(),
        graph.inputs().len(),
        graph.outputs().len(),
        graph.overridable_initializers().len()
    );

    // 3. Topological dump with inferred shapes.
    if cli.topo {
        println!("topological order:");
        for (i, node) in graph.topological_nodes().enumerate() {
            let shape = node
                .output_args()
                .first()
                .map(|&out| graph.arg(out).shape().to_string())
                .unwrap_or_else(|| "{}".to_string());
            println!("  {i:4} {:<20} {:<24} {shape}", node.op_type(), node.name());
        }
    }

    // 4. Per-op-type counts.
    if cli.stats {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for node in graph.get_nodes() {
            *counts.entry(node.op_type()).or_default() += 1;
        }
        let mut counts: Vec<_> = counts.into_iter().collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

        println!("node statistics:");
        for (op_type, count) in counts {
            println!("  {op_type:<20} {count}");
        }
    }

    write_outputs_summary(&model);

    Ok(())
}

fn write_outputs_summary(model: &Model) {
    let graph = model.get_graph();
    for &output in graph.outputs() {
        let arg = graph.arg(output);
        println!("output: {} {} {}", arg.name(), arg.data_type(), arg.shape());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults() {
        let cli = Cli::try_parse_from(["nuon", "model.onnx"]).unwrap();
        assert_eq!(cli.input, PathBuf::from("model.onnx"));
        assert!(!cli.topo);
        assert!(!cli.stats);
        assert!(cli.log_dir.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn cli_all_flags() {
        let cli = Cli::try_parse_from([
            "nuon",
            "resnet50.onnx",
            "--topo",
            "--stats",
            "--log-dir",
            "/tmp/logs",
            "--verbose",
        ])
        .unwrap();
        assert_eq!(cli.input, PathBuf::from("resnet50.onnx"));
        assert!(cli.topo);
        assert!(cli.stats);
        assert_eq!(cli.log_dir.unwrap(), PathBuf::from("/tmp/logs"));
        assert!(cli.verbose);
    }

    #[test]
    fn cli_requires_input() {
        assert!(Cli::try_parse_from(["nuon"]).is_err());
    }

    #[test]
    fn cli_short_verbose() {
        let cli = Cli::try_parse_from(["nuon", "m.onnx", "-v"]).unwrap();
        assert!(cli.verbose);
    }
}
