//! CLI command handlers, one file per command.

mod check;
mod hash;
mod probe;
mod sync;

pub use check::run_check;
pub use hash::run_hash;
pub use probe::run_probe;
pub use sync::run_sync;
