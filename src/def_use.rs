//! Definition and use sites of every variable.
//!
//! The web is rebuilt from scratch in a single pass over the blocks and thrown away
//! by the next structural edit; nothing maintains it incrementally.

use std::collections::{BTreeSet, HashMap};

use crate::cfg::{BlockId, BlockKind, Cfg};
use crate::mir::VariableName;

/// Where a variable is defined or used.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Site {
    Statement(BlockId),
    Branch(BlockId),
    /// The phi node for the given variable in a block.
    Phi(BlockId, VariableName),
}

#[derive(Debug, Clone, Default)]
pub struct DefUseWeb {
    defs: HashMap<VariableName, Vec<Site>>,
    uses: HashMap<VariableName, Vec<Site>>,
    block_defs: HashMap<BlockId, BTreeSet<String>>,
    block_uses: HashMap<BlockId, BTreeSet<String>>,
}

impl Site {
    pub fn block(&self) -> BlockId {
        match self {
            Site::Statement(b) | Site::Branch(b) | Site::Phi(b, _) => *b,
        }
    }
}

impl DefUseWeb {
    /// Works in and out of SSA form.
    pub fn build(cfg: &Cfg) -> Self {
        let mut web = Self::default();
        for block in cfg.blocks() {
            let id = block.id();
            for phi in block.phis().iter() {
                let site = Site::Phi(id, phi.lhs.clone());
                web.add_def(&phi.lhs, site.clone());
                for (_, arg) in phi.args() {
                    web.add_use(arg, site.clone());
                }
            }
            match block.kind() {
                BlockKind::Statement(s) => {
                    for v in s.defs() {
                        web.add_def(v, Site::Statement(id));
                    }
                    for v in s.uses() {
                        web.add_use(v, Site::Statement(id));
                    }
                }
                BlockKind::Branch(b) => web.add_use(&b.cond, Site::Branch(id)),
                BlockKind::Entry | BlockKind::Exit | BlockKind::Empty => (),
            }
        }
        log::trace!(
            "def-use web of {}: {} defined, {} used variables",
            cfg.name(),
            web.defs.len(),
            web.uses.len()
        );
        web
    }

    fn add_def(&mut self, var: &VariableName, site: Site) {
        self.block_defs
            .entry(site.block())
            .or_default()
            .insert(var.name.clone());
        self.defs.entry(var.clone()).or_default().push(site);
    }

    fn add_use(&mut self, var: &VariableName, site: Site) {
        self.block_uses
            .entry(site.block())
            .or_default()
            .insert(var.name.clone());
        self.uses.entry(var.clone()).or_default().push(site);
    }

    pub fn get_defs(&self, var: &VariableName) -> &[Site] {
        self.defs.get(var).map(Vec::as_slice).unwrap_or(&[])
    }

    /**
     * The single definition of an SSA variable.
     * `None` for a value live on entry, which has no definition.
     */
    pub fn get_def(&self, var: &VariableName) -> Option<&Site> {
        let defs = self.get_defs(var);
        assert!(
            defs.len() <= 1,
            "{} is defined {} times, the graph is not in SSA form",
            var,
            defs.len()
        );
        defs.first()
    }

    pub fn get_uses(&self, var: &VariableName) -> &[Site] {
        self.uses.get(var).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Base names of the variables a block defines, phi nodes included.
    pub fn get_block_defs(&self, block: BlockId) -> impl Iterator<Item = &str> + '_ {
        self.block_defs
            .get(&block)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    pub fn get_block_uses(&self, block: BlockId) -> impl Iterator<Item = &str> + '_ {
        self.block_uses
            .get(&block)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// Defined but never read.
    pub fn is_unused(&self, var: &VariableName) -> bool {
        self.get_uses(var).is_empty()
    }

    /// Every variable with at least one definition, in no particular order.
    pub fn defined_variables(&self) -> impl Iterator<Item = &VariableName> + '_ {
        self.defs.keys()
    }
}

impl Cfg {
    /// The def-use web, rebuilt if an edit invalidated it.
    pub fn def_use(&mut self) -> &DefUseWeb {
        if self.def_use.is_none() {
            let web = DefUseWeb::build(self);
            self.def_use = Some(web);
        }
        match &self.def_use {
            Some(web) => web,
            None => unreachable!(),
        }
    }
}
