mod def_use;
mod dominance;
mod util;
