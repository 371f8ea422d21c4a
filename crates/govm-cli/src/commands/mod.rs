//! Command implementations. Human-facing messages go to stderr; anything a
//! shell might capture or source goes to stdout.

mod env;
mod install;
mod known;
mod list;
mod resolve;

pub use env::run as env;
pub use install::run as install;
pub use known::run as known;
pub use list::run as list;
pub use resolve::run as resolve;
