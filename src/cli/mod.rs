mod generate;
mod similar;
mod stats;

pub use generate::*;
pub use similar::*;
pub use stats::*;

use crate::config::Opts;

pub trait SubCommandExtend {
    fn run(&self, opts: &Opts) -> anyhow::Result<()>;
}
