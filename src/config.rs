use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::cli::*;
use crate::dataset::Dataset;
use crate::describe::HistogramDescriber;
use crate::error::Result;
use crate::utils::{DEFAULT_SUFFIX, suffix_regex};

#[derive(Parser, Debug, Clone)]
#[command(name = "reid-balance", version)]
pub struct Opts {
    #[command(subcommand)]
    pub subcmd: SubCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SubCommand {
    /// 为每个身份生成增强图片，直到达到目标数量
    Generate(GenerateCommand),
    /// 显示数据集统计信息
    Stats(StatsCommand),
    /// 显示某个身份与其他身份的相似度
    Similar(SimilarCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct DatasetOptions {
    /// 图片所在目录
    #[arg(short, long, value_name = "DIR")]
    pub input: PathBuf,
    /// 扫描的文件后缀名，多个后缀用逗号分隔
    #[arg(long, default_value = DEFAULT_SUFFIX)]
    pub suffix: String,
}

impl DatasetOptions {
    /// 扫描目录并计算描述符
    pub fn load(&self) -> Result<Dataset> {
        Dataset::load_with_suffix(&self.input, &HistogramDescriber, &suffix_regex(&self.suffix))
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    Json,
    #[default]
    Table,
}
