use std::collections::BTreeMap;
use std::fmt::Formatter;

use crate::mir::VariableName;

use super::EdgeId;

/// `lhs = phi(args)`, one argument per incoming edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phi {
    pub lhs: VariableName,
    pub(crate) args: BTreeMap<EdgeId, VariableName>,
}

/// The phi nodes of one block, at most one per variable (keyed by base name).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhiNodes {
    phis: BTreeMap<String, Phi>,
}

impl Phi {
    pub fn new(lhs: VariableName) -> Self {
        Self {
            lhs,
            args: BTreeMap::new(),
        }
    }

    pub fn args(&self) -> impl Iterator<Item = (EdgeId, &VariableName)> + '_ {
        self.args.iter().map(|(e, v)| (*e, v))
    }

    pub fn arg(&self, edge: EdgeId) -> Option<&VariableName> {
        self.args.get(&edge)
    }

    pub fn arg_count(&self) -> usize {
        self.args.len()
    }

    pub(crate) fn set_arg(&mut self, edge: EdgeId, value: VariableName) {
        self.args.insert(edge, value);
    }

    pub(crate) fn remove_arg(&mut self, edge: EdgeId) -> Option<VariableName> {
        self.args.remove(&edge)
    }

    pub(crate) fn replace_edge(&mut self, old: EdgeId, new: EdgeId) {
        if let Some(v) = self.args.remove(&old) {
            self.args.insert(new, v);
        }
    }
}

impl PhiNodes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.phis.is_empty()
    }

    pub fn len(&self) -> usize {
        self.phis.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Phi> + '_ {
        self.phis.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Phi> + '_ {
        self.phis.values_mut()
    }

    /// The phi for a variable, whatever version its lhs carries.
    pub fn get(&self, var: &str) -> Option<&Phi> {
        self.phis.get(var)
    }

    pub(crate) fn get_mut(&mut self, var: &str) -> Option<&mut Phi> {
        self.phis.get_mut(var)
    }

    pub fn has_phi_function(&self, var: &VariableName) -> bool {
        self.phis.contains_key(&var.name)
    }

    /**
     * Add an argument-less phi for the base name of `var`.
     * Returns false if the block already has one.
     */
    pub(crate) fn add_phi_function(&mut self, var: &VariableName) -> bool {
        if self.has_phi_function(var) {
            return false;
        }
        self.phis
            .insert(var.name.clone(), Phi::new(VariableName::new(&var.name)));
        true
    }

    pub(crate) fn insert(&mut self, phi: Phi) {
        self.phis.insert(phi.lhs.name.clone(), phi);
    }

    pub(crate) fn replace_edge(&mut self, old: EdgeId, new: EdgeId) {
        for phi in self.phis.values_mut() {
            phi.replace_edge(old, new);
        }
    }

    pub(crate) fn remove_arg_for_edge(&mut self, edge: EdgeId) {
        for phi in self.phis.values_mut() {
            phi.remove_arg(edge);
        }
    }

    pub(crate) fn take(&mut self) -> PhiNodes {
        std::mem::take(self)
    }

    pub(crate) fn into_phis(self) -> impl Iterator<Item = Phi> {
        self.phis.into_values()
    }
}

impl std::fmt::Display for Phi {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{} = phi(", self.lhs)?;
        for (i, (edge, v)) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", edge, v)?;
        }
        f.write_str(")")
    }
}
