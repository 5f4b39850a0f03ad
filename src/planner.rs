use std::path::{Path, PathBuf};

use indicatif::ProgressBar;
use log::{debug, info};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;

use crate::augment::Augmenter;
use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::filename::ReidFileInfo;
use crate::record::ImageRecord;

/// 生成图片的输出子目录
pub const GENERATED_DIR: &str = "generated";

/// 生成过程的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlannerState {
    Init,
    Allocating,
    /// 正在为该身份生成图片
    Generating(i64),
    Done,
}

/// 一次生成的结果
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub target: usize,
    pub quota: usize,
    pub created: usize,
    /// 每个身份新增的图片数量，按处理顺序排列
    pub per_identity: Vec<(i64, usize)>,
    /// 是否因达到目标数量而提前结束
    pub reached_target: bool,
}

/// 按配额为每个身份生成增强图片，总数达到 `target` 时立即停止
pub struct GenerationPlanner {
    target: usize,
    output_dir: PathBuf,
    state: PlannerState,
    pb: ProgressBar,
}

impl GenerationPlanner {
    pub fn new(target: usize, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            target,
            output_dir: output_dir.into(),
            state: PlannerState::Init,
            pb: ProgressBar::hidden(),
        }
    }

    pub fn with_progress(mut self, pb: ProgressBar) -> Self {
        self.pb = pb;
        self
    }

    pub fn state(&self) -> PlannerState {
        self.state
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// 创建 `<input>/generated` 目录，已存在时直接返回
    pub fn prepare_output(input: &Path) -> Result<PathBuf> {
        let path = input.join(GENERATED_DIR);
        std::fs::create_dir_all(&path).map_err(|e| Error::io(&path, e))?;
        Ok(path)
    }

    /// 每个身份分配的生成数量：`max(1, round(target / identity_count))`
    ///
    /// 取整方式为四舍六入五成双。
    pub fn quota(identity_count: usize, target: usize) -> Result<usize> {
        if identity_count == 0 {
            return Err(Error::EmptyDataset);
        }
        let quota = (target as f64 / identity_count as f64).round_ties_even() as usize;
        Ok(quota.max(1))
    }

    /// 执行生成，新图片会追加到对应的身份中
    ///
    /// 增强失败时返回 [`Error::Augment`]，其中记录了失败前已生成的数量，失败的图片不计入。
    /// 相似度矩阵不会更新。
    pub fn run<A, R>(
        &mut self,
        dataset: &mut Dataset,
        augmenter: &A,
        rng: &mut R,
    ) -> Result<GenerationReport>
    where
        A: Augmenter + ?Sized,
        R: Rng + ?Sized,
    {
        self.state = PlannerState::Allocating;
        let quota = Self::quota(dataset.identities_count(), self.target)?;
        debug!("每个身份生成 {} 张图片", quota);

        let mut report = GenerationReport {
            target: self.target,
            quota,
            created: 0,
            per_identity: vec![],
            reached_target: false,
        };

        if self.target == 0 {
            self.finish(&mut report);
            return Ok(report);
        }

        for number in dataset.identity_ids() {
            self.state = PlannerState::Generating(number);
            let identity = dataset.get_mut(number)?;

            // 只从本轮开始前已有的图片中挑选
            let mut sources = identity
                .images()
                .iter()
                .map(|image| (image.path().to_path_buf(), image.camera()))
                .collect::<Vec<_>>();
            sources.shuffle(rng);
            sources.truncate(quota);

            let mut created = 0;
            for (origin, camera) in sources {
                // 每次追加后重新计算，保证同一身份的帧号不重复
                let frame = identity.last_frame() + 1;
                let name = ReidFileInfo::format(number, camera, frame, identity.kind())?;

                let path = augmenter
                    .augment(&origin, &self.output_dir, &name)
                    .map_err(|e| Error::Augment {
                        path: origin.clone(),
                        created: report.created,
                        source: Box::new(e),
                    })?;
                identity.add_image(ImageRecord::new(path, camera, frame))?;

                created += 1;
                report.created += 1;
                self.pb.inc(1);

                if report.created >= self.target {
                    report.per_identity.push((number, created));
                    self.finish(&mut report);
                    return Ok(report);
                }
            }
            report.per_identity.push((number, created));
        }

        self.finish(&mut report);
        Ok(report)
    }

    fn finish(&mut self, report: &mut GenerationReport) {
        report.reached_target = report.created >= self.target;
        self.state = PlannerState::Done;
        if report.reached_target {
            info!("已达到最大生成数量: {}", self.target);
        } else {
            info!("所有身份处理完成，共生成 {} 张图片", report.created);
        }
    }
}
