use std::collections::HashMap;
use std::path::{Path, PathBuf};

use indicatif::{ParallelProgressIterator, ProgressBar};
use log::{debug, info};
use rayon::prelude::*;
use regex::Regex;
use serde::Serialize;
use walkdir::WalkDir;

use crate::describe::Describer;
use crate::error::{Error, Result};
use crate::filename::ReidFileInfo;
use crate::identity::Identity;
use crate::matrix::SimilarityMatrix;
use crate::record::ImageRecord;
use crate::utils::{DEFAULT_SUFFIX, is_image_file, pb_style, suffix_regex};

/// 数据集整体统计
#[derive(Debug, Clone, Serialize)]
pub struct DatasetStats {
    pub identities: usize,
    pub images: usize,
    pub similarity_avg: f32,
    pub similarity_min: f32,
    pub similarity_max: f32,
    pub separation_avg: f32,
    pub separation_min: f32,
    pub separation_max: f32,
    /// 所有身份都没有特征时为空
    pub consistency_avg: Option<f32>,
}

/// 所有身份以及它们之间的相似度矩阵
///
/// 身份按扫描时首次出现的顺序排列，相似度矩阵的行列顺序与之一致。
/// 矩阵只在加载时计算一次，之后添加图片不会自动更新，需要时调用
/// [`Dataset::rebuild_similarity`]。
#[derive(Debug, Clone)]
pub struct Dataset {
    dirpath: PathBuf,
    identities: Vec<Identity>,
    similarity: SimilarityMatrix,
}

impl Dataset {
    /// 使用默认后缀扫描目录
    pub fn load<D: Describer + ?Sized>(dirpath: impl AsRef<Path>, describer: &D) -> Result<Self> {
        Self::load_with_suffix(dirpath, describer, &suffix_regex(DEFAULT_SUFFIX))
    }

    /// 扫描目录下的图片（不递归），按身份分组并计算相似度矩阵
    pub fn load_with_suffix<D: Describer + ?Sized>(
        dirpath: impl AsRef<Path>,
        describer: &D,
        re_suf: &Regex,
    ) -> Result<Self> {
        let dirpath = dirpath.as_ref();
        if !dirpath.is_dir() {
            return Err(Error::PathNotFound { path: dirpath.to_path_buf() });
        }

        info!("开始扫描目录: {}", dirpath.display());
        let mut entries = vec![];
        for entry in WalkDir::new(dirpath).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(dirpath).to_path_buf();
                Error::io(path, e.into())
            })?;
            let path = entry.path();
            if !entry.file_type().is_file() || !is_image_file(path, re_suf) {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            match ReidFileInfo::try_parse(&name) {
                Ok(info) => entries.push((path.to_path_buf(), info)),
                Err(e) => debug!("跳过: {}", e),
            }
        }
        info!("扫描完成，共 {} 张图片", entries.len());

        let pb = ProgressBar::new(entries.len() as u64).with_style(pb_style());
        pb.set_message("计算图片描述符");
        let descriptors = entries
            .par_iter()
            .progress_with(pb.clone())
            .map(|(path, _)| describer.describe_all(path))
            .collect::<Vec<_>>();
        pb.finish_and_clear();

        let mut identities: Vec<Identity> = vec![];
        let mut index: HashMap<i64, usize> = HashMap::new();
        for ((path, info), (visuals, features)) in entries.into_iter().zip(descriptors) {
            let record = ImageRecord::new(path, info.camera, info.frame)
                .with_visuals(visuals)
                .with_features(features);
            let i = *index.entry(info.identity).or_insert_with(|| {
                identities.push(Identity::new(info.identity, info.kind));
                identities.len() - 1
            });
            identities[i].add_image(record)?;
        }

        Self::from_identities(dirpath, identities)
    }

    /// 使用内存中的身份构建数据集，编号重复的身份会合并到先出现的那个
    ///
    /// 数据集中的每个身份至少有一张图片，没有图片的身份返回
    /// [`Error::InvalidInput`]。
    pub fn from_identities(dirpath: impl Into<PathBuf>, identities: Vec<Identity>) -> Result<Self> {
        let mut merged: Vec<Identity> = Vec::with_capacity(identities.len());
        for identity in identities {
            if identity.images_count() == 0 {
                return Err(Error::InvalidInput(format!("身份 {} 没有图片", identity.number())));
            }
            match merged.iter_mut().find(|i| i.number() == identity.number()) {
                Some(existing) => {
                    for image in identity.images() {
                        existing.add_image(image.clone())?;
                    }
                }
                None => merged.push(identity),
            }
        }

        let mut dataset =
            Self { dirpath: dirpath.into(), identities: merged, similarity: SimilarityMatrix::default() };
        dataset.rebuild_similarity();
        info!(
            "共 {} 个身份，{} 张图片",
            dataset.identities_count(),
            dataset.images_count()
        );
        Ok(dataset)
    }

    /// 根据当前的中心特征重新计算相似度矩阵
    pub fn rebuild_similarity(&mut self) {
        self.similarity = SimilarityMatrix::build(
            self.identities.iter().map(|i| (i.number(), i.centroid_features())),
        );
    }

    pub fn dirpath(&self) -> &Path {
        &self.dirpath
    }

    pub fn similarity(&self) -> &SimilarityMatrix {
        &self.similarity
    }

    pub fn identities_count(&self) -> usize {
        self.identities.len()
    }

    pub fn images_count(&self) -> usize {
        self.identities.iter().map(Identity::images_count).sum()
    }

    pub fn identity_ids(&self) -> Vec<i64> {
        self.identities.iter().map(Identity::number).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Identity> {
        self.identities.iter()
    }

    pub fn contains(&self, number: i64) -> bool {
        self.position(number).is_some()
    }

    pub fn get(&self, number: i64) -> Result<&Identity> {
        let index = self.position(number).ok_or(Error::NotFound { identity: number })?;
        Ok(&self.identities[index])
    }

    pub fn get_mut(&mut self, number: i64) -> Result<&mut Identity> {
        let index = self.position(number).ok_or(Error::NotFound { identity: number })?;
        Ok(&mut self.identities[index])
    }

    fn position(&self, number: i64) -> Option<usize> {
        self.identities.iter().position(|i| i.number() == number)
    }

    /// 删除身份，同时删除相似度矩阵中对应的行和列
    pub fn remove(&mut self, number: i64) -> Result<Identity> {
        let index = self.position(number).ok_or(Error::NotFound { identity: number })?;
        self.similarity.remove(number)?;
        let identity = self.identities.remove(index);
        debug_assert_eq!(self.similarity.keys(), &*self.identity_ids());
        Ok(identity)
    }

    /// 某个身份与所有身份的相似度，顺序与身份顺序一致
    pub fn similarities(&self, number: i64) -> Result<Vec<(i64, f32)>> {
        self.similarity.row(number)
    }

    /// 某个身份的平均区分度
    pub fn separation_avg_of(&self, number: i64) -> Result<f32> {
        let row = self.similarities(number)?;
        let mean = row.iter().map(|(_, s)| s).sum::<f32>() / row.len() as f32;
        Ok(1. - mean)
    }

    // NOTE: 以下统计包含对角线上的自身相似度
    pub fn similarity_avg(&self) -> Result<f32> {
        self.similarity.mean()
    }

    pub fn similarity_min(&self) -> Result<f32> {
        self.similarity.min()
    }

    pub fn similarity_max(&self) -> Result<f32> {
        self.similarity.max()
    }

    pub fn separation_avg(&self) -> Result<f32> {
        Ok(1. - self.similarity_avg()?)
    }

    pub fn separation_min(&self) -> Result<f32> {
        Ok(1. - self.similarity_max()?)
    }

    pub fn separation_max(&self) -> Result<f32> {
        Ok(1. - self.similarity_min()?)
    }

    /// 所有身份内部一致性的平均值，跳过没有特征的身份
    pub fn consistency_avg(&self) -> Result<f32> {
        let values = self.identities.iter().filter_map(Identity::consistency).collect::<Vec<_>>();
        if values.is_empty() {
            return Err(Error::EmptyDataset);
        }
        Ok(values.iter().sum::<f32>() / values.len() as f32)
    }

    pub fn stats(&self) -> Result<DatasetStats> {
        Ok(DatasetStats {
            identities: self.identities_count(),
            images: self.images_count(),
            similarity_avg: self.similarity_avg()?,
            similarity_min: self.similarity_min()?,
            similarity_max: self.similarity_max()?,
            separation_avg: self.separation_avg()?,
            separation_min: self.separation_min()?,
            separation_max: self.separation_max()?,
            consistency_avg: self.consistency_avg().ok(),
        })
    }
}
