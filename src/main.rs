use clap::Parser;
use log::debug;
use reid_balance::cli::SubCommandExtend;
use reid_balance::config::{Opts, SubCommand};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    debug!("日志已启用");

    let opts = Opts::parse();
    let result = match &opts.subcmd {
        SubCommand::Generate(config) => config.run(&opts),
        SubCommand::Stats(config) => config.run(&opts),
        SubCommand::Similar(config) => config.run(&opts),
    };

    if let Err(e) = result {
        eprintln!("[ERR] {:#}", e);
        std::process::exit(1);
    }
}
