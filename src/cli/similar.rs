use anyhow::Result;
use clap::Parser;
use serde_json::json;

use crate::cli::SubCommandExtend;
use crate::config::{DatasetOptions, Opts, OutputFormat};

#[derive(Parser, Debug, Clone)]
pub struct SimilarCommand {
    #[command(flatten)]
    pub dataset: DatasetOptions,
    /// 身份编号
    #[arg(allow_hyphen_values = true)]
    pub identity: i64,
    /// 显示的结果数量
    #[arg(long, value_name = "COUNT", default_value_t = 10)]
    pub count: usize,
    /// 输出格式
    #[arg(long, value_name = "FORMAT", value_enum, default_value_t)]
    pub output_format: OutputFormat,
}

impl SubCommandExtend for SimilarCommand {
    fn run(&self, _opts: &Opts) -> Result<()> {
        let dataset = self.dataset.load()?;
        let separation = dataset.separation_avg_of(self.identity)?;

        let mut result = dataset
            .similarities(self.identity)?
            .into_iter()
            .filter(|(k, _)| *k != self.identity)
            .collect::<Vec<_>>();
        result.sort_unstable_by(|a, b| b.1.total_cmp(&a.1));
        result.truncate(self.count);

        match self.output_format {
            OutputFormat::Json => {
                let value = json!({
                    "identity": self.identity,
                    "separation": separation,
                    "similar": result,
                });
                println!("{}", serde_json::to_string_pretty(&value)?)
            }
            OutputFormat::Table => {
                println!("separation\t{:.4}", separation);
                for (k, v) in result {
                    println!("{:.4}\t{}", v, k);
                }
            }
        }
        Ok(())
    }
}
