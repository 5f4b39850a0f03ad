use anyhow::Result;
use clap::{ArgGroup, Parser};
use indicatif::ProgressBar;
use log::info;

use crate::augment::{AugmentMode, ImageAugmenter};
use crate::cli::SubCommandExtend;
use crate::config::{DatasetOptions, Opts};
use crate::planner::GenerationPlanner;
use crate::utils::pb_style_speed;

#[derive(Parser, Debug, Clone)]
#[command(group(ArgGroup::new("augment").args(["augment_color", "augment_shape", "augment_all"])))]
pub struct GenerateCommand {
    #[command(flatten)]
    pub dataset: DatasetOptions,
    /// 最多生成的图片数量
    #[arg(short = 'n', long, value_name = "N", default_value_t = 100)]
    pub iterations: usize,
    /// 只做颜色和画质增强
    #[arg(short = 'c', long)]
    pub augment_color: bool,
    /// 只做几何形变增强
    #[arg(short = 's', long)]
    pub augment_shape: bool,
    /// 颜色和形变增强都使用（默认）
    #[arg(short = 'a', long)]
    pub augment_all: bool,
}

impl GenerateCommand {
    pub fn mode(&self) -> AugmentMode {
        if self.augment_color {
            AugmentMode::Color
        } else if self.augment_shape {
            AugmentMode::Shape
        } else {
            AugmentMode::All
        }
    }
}

impl SubCommandExtend for GenerateCommand {
    fn run(&self, _opts: &Opts) -> Result<()> {
        let mut dataset = self.dataset.load()?;
        let output = GenerationPlanner::prepare_output(&self.dataset.input)?;
        info!("输出目录: {}", output.display());

        let pb = ProgressBar::new(self.iterations as u64).with_style(pb_style_speed());
        let mut planner = GenerationPlanner::new(self.iterations, output).with_progress(pb.clone());
        let augmenter = ImageAugmenter::new(self.mode());

        let report = planner.run(&mut dataset, &augmenter, &mut rand::rng())?;
        pb.finish_with_message("图片生成完成");

        for (identity, created) in &report.per_identity {
            info!("身份 {}: 新增 {} 张，共 {} 张", identity, created, dataset.get(*identity)?.images_count());
        }
        info!("完成，共生成 {} 张图片", report.created);
        Ok(())
    }
}
