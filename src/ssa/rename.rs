use std::collections::HashMap;

use replace_with::replace_with_or_abort;

use crate::cfg::{BlockId, Cfg};
use crate::mir::VariableName;
use crate::name_scope::NameScope;

/// Current versions of every variable along the path from Entry in the dominator tree.
struct VersionStacks {
    stacks: HashMap<String, Vec<u32>>,
}

enum Visit {
    Enter(BlockId),
    /// Pop what the block pushed.
    Leave(Vec<String>),
}

impl VersionStacks {
    fn new() -> Self {
        Self {
            stacks: HashMap::new(),
        }
    }

    /// The reaching version of a variable, 0 if nothing defines it on the way.
    fn current(&self, var: &str) -> VariableName {
        let version = self
            .stacks
            .get(var)
            .and_then(|s| s.last())
            .copied()
            .unwrap_or(0);
        VariableName::with_version(var, version)
    }

    fn define(&mut self, var: &str, scope: &mut NameScope, pushed: &mut Vec<String>) -> VariableName {
        let version = scope.alloc_version(var);
        self.stacks.entry(var.to_string()).or_default().push(version);
        pushed.push(var.to_string());
        VariableName::with_version(var, version)
    }

    fn pop(&mut self, var: &str) {
        if let Some(s) = self.stacks.get_mut(var) {
            s.pop();
        }
    }
}

impl Cfg {
    /**
     * Give every definition a fresh version and every use its reaching version,
     * walking the dominator tree from Entry. Phi arguments are filled in edge by edge
     * from the predecessor's point of view.
     */
    pub(super) fn rename_variables(&mut self) {
        let mut scope = std::mem::take(&mut self.scope);
        let mut versions = VersionStacks::new();
        let mut todo = vec![Visit::Enter(self.entry())];

        while let Some(visit) = todo.pop() {
            let b = match visit {
                Visit::Enter(b) => b,
                Visit::Leave(pushed) => {
                    for var in pushed {
                        versions.pop(&var);
                    }
                    continue;
                }
            };
            let pushed = self.rename_block(b, &mut versions, &mut scope);
            todo.push(Visit::Leave(pushed));
            for child in self.dominated_children(b).iter().rev() {
                todo.push(Visit::Enter(*child));
            }
        }
        self.scope = scope;
    }

    fn rename_block(
        &mut self,
        b: BlockId,
        versions: &mut VersionStacks,
        scope: &mut NameScope,
    ) -> Vec<String> {
        let mut pushed = Vec::new();
        let block = self.block_mut_raw(b);
        for phi in block.phis.iter_mut() {
            let name = phi.lhs.name.clone();
            phi.lhs = versions.define(&name, scope, &mut pushed);
        }
        if let Some(stmt) = block.statement_mut() {
            replace_with_or_abort(stmt, |s| s.remap_uses(&mut |v| versions.current(&v.name)));
            replace_with_or_abort(stmt, |s| {
                s.remap_defs(&mut |v| versions.define(&v.name, scope, &mut pushed))
            });
        }
        if let Some(branch) = block.branch_mut() {
            branch.cond = versions.current(&branch.cond.name);
        }

        for edge in self.successor_edges(b) {
            let target = self.edge(edge).target();
            for phi in self.block_mut_raw(target).phis.iter_mut() {
                phi.set_arg(edge, versions.current(&phi.lhs.name));
            }
        }
        log::trace!("renamed {}, {} new versions", b, pushed.len());
        pushed
    }
}
