//! Control-flow graph and SSA machinery of an IR optimizer.
//!
//! A [`cfg::Cfg`] is built from a [`mir::Procedure`], edited by optimization passes,
//! taken into and out of SSA form and finally linearized back into statements.

pub mod cfg;
pub mod def_use;
pub mod dominance;
pub mod dot;
pub mod error;
mod graph;
mod linearize;
pub mod mir;
mod name_scope;
pub mod pipeline;
mod ssa;

#[cfg(test)]
mod test;
