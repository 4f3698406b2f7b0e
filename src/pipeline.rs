//! The optimizer driver: build, tidy, optionally go through SSA form and back, linearize.

use crate::cfg::Cfg;
use crate::dot::DefUseAnnotations;
use crate::mir::Procedure;

#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Print the graph between stages.
    pub verbose: bool,
    /// Convert into SSA form and back before linearizing.
    pub ssa: bool,
    /// Collect a graphviz dump after every stage.
    pub dot: bool,
}

pub struct Output {
    pub procedure: Procedure,
    /// One graphviz document per stage, when requested.
    pub graphs: Vec<String>,
}

struct Stages<'a> {
    options: &'a Options,
    graphs: Vec<String>,
}

impl Stages<'_> {
    fn banner(&self, stage: &str) {
        if self.options.verbose {
            eprintln!("========== {} ===========", stage);
        }
    }

    fn done(&mut self, cfg: &mut Cfg, stage: &str) {
        if self.options.verbose {
            eprintln!("{}", cfg);
        }
        if self.options.dot {
            let mut out = Vec::new();
            let web = cfg.def_use().clone();
            let written = cfg.write_graphviz(&mut out, stage, &DefUseAnnotations { web: &web });
            match written {
                Ok(()) => self.graphs.push(String::from_utf8_lossy(&out).into_owned()),
                Err(e) => log::warn!("cannot dump {} of {}: {}", stage, cfg.name(), e),
            }
        }
    }
}

pub fn run(procedure: Procedure, options: &Options) -> Output {
    let mut stages = Stages {
        options,
        graphs: Vec::new(),
    };
    log::debug!("optimizing {}", procedure.name);

    stages.banner("BUILD CFG");
    let mut cfg = Cfg::new(procedure);
    stages.done(&mut cfg, "built");

    stages.banner("TIDY");
    cfg.tidy();
    stages.done(&mut cfg, "tidied");

    if options.ssa {
        stages.banner("CONVERT TO SSA");
        cfg.convert_to_ssa_form();
        stages.done(&mut cfg, "in SSA form");

        stages.banner("CONVERT OUT OF SSA");
        cfg.convert_out_of_ssa_form();
        stages.done(&mut cfg, "out of SSA form");
    }

    stages.banner("LINEARIZE");
    let statements = cfg.linearize();
    let procedure = Procedure {
        name: cfg.name().to_string(),
        statements,
    };
    if options.verbose {
        eprintln!("{}", procedure);
    }
    Output {
        procedure,
        graphs: stages.graphs,
    }
}
