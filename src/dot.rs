//! Graphviz export for debugging.
//!
//! A node shows up to four regions: head annotations, the block itself with its phi
//! nodes, block annotations and tail annotations. Passes supply the annotations through
//! [`BlockAnnotator`].

use std::io::{self, Write};

use crate::cfg::{BlockId, Cfg, Direction};
use crate::def_use::DefUseWeb;

/// Variable lists are wrapped once a line grows past this many characters.
const LINE_LENGTH: usize = 30;

/// A named list of variables, like `live_in = [a_1, b_2]`.
pub type Annotation = (String, Vec<String>);

pub trait BlockAnnotator {
    /// Extra graphviz attributes of the node, like `color=red`.
    fn attributes(&self, _cfg: &Cfg, _block: BlockId) -> Vec<(String, String)> {
        Vec::new()
    }

    fn head_annotations(&self, _cfg: &Cfg, _block: BlockId) -> Vec<Annotation> {
        Vec::new()
    }

    fn block_annotations(&self, _cfg: &Cfg, _block: BlockId) -> Vec<Annotation> {
        Vec::new()
    }

    fn tail_annotations(&self, _cfg: &Cfg, _block: BlockId) -> Vec<Annotation> {
        Vec::new()
    }
}

pub struct NoAnnotations;

impl BlockAnnotator for NoAnnotations {}

/// Shows the variables each block defines and uses.
pub struct DefUseAnnotations<'a> {
    pub web: &'a DefUseWeb,
}

impl BlockAnnotator for DefUseAnnotations<'_> {
    fn block_annotations(&self, _cfg: &Cfg, block: BlockId) -> Vec<Annotation> {
        vec![
            (
                "defs".to_string(),
                self.web.get_block_defs(block).map(str::to_string).collect(),
            ),
            (
                "uses".to_string(),
                self.web.get_block_uses(block).map(str::to_string).collect(),
            ),
        ]
    }
}

impl Cfg {
    pub fn write_graphviz<W: Write>(
        &self,
        out: &mut W,
        label: &str,
        annotator: &dyn BlockAnnotator,
    ) -> io::Result<()> {
        writeln!(out, "digraph G {{")?;
        writeln!(out, "graph [outputorder=edgesfirst];")?;
        writeln!(
            out,
            "graph [label=\"{}\"];",
            escape(&format!("{} - {}", self.name(), label))
        )?;
        for block in self.blocks() {
            let id = block.id();
            write!(out, "{}[", id.index())?;
            for (k, v) in annotator.attributes(self, id) {
                write!(out, "{}={},", k, v)?;
            }
            writeln!(out, "label=\"{}\"];", node_label(self, id, annotator))?;
        }
        for edge in self.edges() {
            write!(out, "{}->{}", edge.source().index(), edge.target().index())?;
            match edge.direction() {
                Direction::True => write!(out, " [label=T]")?,
                Direction::False => write!(out, " [label=F]")?,
                Direction::Unconditional => (),
            }
            writeln!(out, ";")?;
        }
        writeln!(out, "}}")
    }

    /// The graph in graphviz format, without annotations.
    pub fn to_graphviz(&self, label: &str) -> String {
        let mut out = Vec::new();
        match self.write_graphviz(&mut out, label, &NoAnnotations) {
            Ok(()) => String::from_utf8_lossy(&out).into_owned(),
            Err(e) => panic!("writing to memory failed: {}", e),
        }
    }
}

fn node_label(cfg: &Cfg, id: BlockId, annotator: &dyn BlockAnnotator) -> String {
    let head = annotation_region(&annotator.head_annotations(cfg, id));
    let block_props = annotation_region(&annotator.block_annotations(cfg, id));
    let tail = annotation_region(&annotator.tail_annotations(cfg, id));

    let block = cfg.block(id);
    let mut source = String::new();
    for phi in block.phis().iter() {
        source.push_str(&phi.to_string());
        source.push('\n');
    }
    source.push_str(&block.kind().to_string());

    let mut label = head.clone();
    if !head.is_empty() {
        // blank line before the source
        label.push_str("\\n");
    }
    label.push_str(&escape(&source));
    if !block_props.is_empty() || !tail.is_empty() {
        label.push_str("\\n\\n");
    }
    label.push_str(&block_props);
    label.push_str(&tail);
    label
}

/// `name = [a, b, ...]` for every non-empty annotation, one per line.
fn annotation_region(annotations: &[Annotation]) -> String {
    let mut region = String::new();
    for (name, vars) in annotations {
        if vars.is_empty() {
            continue;
        }
        let mut line = format!("{} = [", escape(name));
        let mut line_count = 1;
        for (i, var) in vars.iter().enumerate() {
            if i > 0 {
                line.push_str(", ");
                if line.len() > LINE_LENGTH * line_count {
                    line_count += 1;
                    line.push_str("\\n");
                }
            }
            line.push_str(&escape(var));
        }
        line.push_str("]\\n");
        region.push_str(&line);
    }
    region
}

fn escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            _ => result.push(c),
        }
    }
    result
}
