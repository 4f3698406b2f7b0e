use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use serde::{Deserialize, Serialize};

use mir_cfg::mir::Procedure;
use mir_cfg::pipeline::{self, Options};

#[derive(Parser)]
#[command(name = "mir-cfg", about = "Rebuild procedures through their control-flow graph")]
struct Cli {
    /// Print the graph between stages
    #[arg(short, long)]
    verbose: bool,

    /// Go through SSA form and back
    #[arg(long)]
    ssa: bool,

    /// Write the result as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Write graphviz dumps of every stage to this file
    #[arg(long)]
    dot: Option<PathBuf>,

    /// Output file name, standard output by default
    #[arg(short)]
    output: Option<PathBuf>,

    /// JSON file with a procedure or a list of procedures
    input: PathBuf,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum Input {
    One(Procedure),
    Many(Vec<Procedure>),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_module("mir_cfg", level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .init();

    let text = fs::read_to_string(&cli.input)
        .with_context(|| format!("cannot read {}", cli.input.display()))?;
    let input: Input = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a valid procedure", cli.input.display()))?;

    let options = Options {
        verbose: cli.verbose,
        ssa: cli.ssa,
        dot: cli.dot.is_some(),
    };
    let mut graphs = Vec::new();
    let mut run = |p: Procedure| {
        let out = pipeline::run(p, &options);
        graphs.extend(out.graphs);
        out.procedure
    };
    let output = match input {
        Input::One(p) => Input::One(run(p)),
        Input::Many(ps) => Input::Many(ps.into_iter().map(&mut run).collect()),
    };

    let rendered = if cli.json {
        let mut s = serde_json::to_string_pretty(&output)?;
        s.push('\n');
        s
    } else {
        let procedures = match &output {
            Input::One(p) => std::slice::from_ref(p),
            Input::Many(ps) => ps.as_slice(),
        };
        procedures
            .iter()
            .map(|p| format!("{}\n", p))
            .collect::<Vec<_>>()
            .join("\n")
    };

    if let Some(path) = &cli.dot {
        fs::write(path, graphs.concat())
            .with_context(|| format!("cannot write {}", path.display()))?;
    }
    match &cli.output {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("cannot open {} for writing", path.display()))?,
        None => print!("{}", rendered),
    }
    Ok(())
}
