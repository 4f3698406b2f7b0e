use std::collections::HashMap;

use crate::mir::{LabelName, VariableName};

/// Base name of the temporaries introduced while sequentializing copies.
pub const TEMP_NAME: &str = "__tmp";

/**
 * Hands out fresh names: SSA versions per variable, temporaries and labels.
 * Version 0 is never allocated, it stands for the value on entry to the procedure.
 */
#[derive(Debug, Clone, Default)]
pub struct NameScope {
    last_version: HashMap<String, u32>,
    last_label: Option<u32>,
}

impl NameScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc_version(&mut self, var: &str) -> u32 {
        let v = self.last_version.entry(var.to_string()).or_insert(0);
        *v += 1;
        *v
    }

    pub fn alloc_temp(&mut self) -> VariableName {
        let version = self.alloc_version(TEMP_NAME);
        VariableName::with_version(TEMP_NAME, version)
    }

    /// `L0`, `L1`, ...
    pub fn alloc_label(&mut self) -> LabelName {
        let n = self.last_label.map_or(0, |n| n + 1);
        self.last_label = Some(n);
        LabelName(format!("L{}", n))
    }
}
