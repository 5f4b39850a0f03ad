use anyhow::Result;
use clap::Parser;

use crate::cli::SubCommandExtend;
use crate::config::{DatasetOptions, Opts, OutputFormat};
use crate::dataset::DatasetStats;

#[derive(Parser, Debug, Clone)]
pub struct StatsCommand {
    #[command(flatten)]
    pub dataset: DatasetOptions,
    /// 输出格式
    #[arg(long, value_name = "FORMAT", value_enum, default_value_t)]
    pub output_format: OutputFormat,
}

impl SubCommandExtend for StatsCommand {
    fn run(&self, _opts: &Opts) -> Result<()> {
        let dataset = self.dataset.load()?;
        let stats = dataset.stats()?;
        print_stats(&stats, self.output_format)
    }
}

fn print_stats(stats: &DatasetStats, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(stats)?)
        }
        OutputFormat::Table => {
            println!("identities\t{}", stats.identities);
            println!("images\t{}", stats.images);
            println!("similarity\t{:.4} / {:.4} / {:.4}", stats.similarity_min, stats.similarity_avg, stats.similarity_max);
            println!("separation\t{:.4} / {:.4} / {:.4}", stats.separation_min, stats.separation_avg, stats.separation_max);
            match stats.consistency_avg {
                Some(v) => println!("consistency\t{:.4}", v),
                None => println!("consistency\t-"),
            }
        }
    }
    Ok(())
}
