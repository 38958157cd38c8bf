//! Prints the declared inputs, outputs and (optionally) the node list of an ONNX model.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use plantrx_backend::inference::inspect_model;

#[derive(Parser, Debug)]
#[command(name = "inspect-model")]
#[command(about = "Dump the structure of an ONNX classifier artifact", long_about = None)]
struct Cli {
    /// Path to the .onnx file
    path: PathBuf,

    /// Also list every node in graph order
    #[arg(short, long)]
    nodes: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let summary = match inspect_model(&cli.path) {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("File error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("Model: {}", cli.path.display());
    println!("Inputs:");
    for input in &summary.inputs {
        println!("  {}", input);
    }
    println!("Outputs:");
    for output in &summary.outputs {
        println!("  {}", output);
    }

    if cli.nodes {
        println!("Nodes ({}):", summary.nodes.len());
        for node in &summary.nodes {
            println!("  #{} {} {}", node.id, node.name, node.op);
        }
    }

    ExitCode::SUCCESS
}
