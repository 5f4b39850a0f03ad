use std::cell::OnceCell;

use log::warn;

use crate::error::{Error, Result};
use crate::filename::DatasetKind;
use crate::matrix::cosine_similarity;
use crate::record::{ImageRecord, Visuals};

/// 缓存的聚合值，图片列表变化时整体清空
#[derive(Debug, Clone, Default)]
struct Aggregates {
    hue: OnceCell<Option<f32>>,
    brightness: OnceCell<Option<f32>>,
    saturation: OnceCell<Option<f32>>,
    hash: OnceCell<Option<f64>>,
    features: OnceCell<Option<Vec<f32>>>,
}

/// 同一身份的所有图片
#[derive(Debug, Clone)]
pub struct Identity {
    number: i64,
    images: Vec<ImageRecord>,
    kind: DatasetKind,
    cache: Aggregates,
}

impl Identity {
    pub fn new(number: i64, kind: DatasetKind) -> Self {
        Self { number, images: vec![], kind, cache: Aggregates::default() }
    }

    pub fn with_images(number: i64, kind: DatasetKind, images: Vec<ImageRecord>) -> Self {
        Self { number, images, kind, cache: Aggregates::default() }
    }

    pub fn number(&self) -> i64 {
        self.number
    }

    pub fn kind(&self) -> DatasetKind {
        self.kind
    }

    /// 按加入顺序排列的图片，不保证按帧号排序
    pub fn images(&self) -> &[ImageRecord] {
        &self.images
    }

    /// 第一张图片
    pub fn image(&self) -> Option<&ImageRecord> {
        self.images.first()
    }

    pub fn images_count(&self) -> usize {
        self.images.len()
    }

    /// 最大帧号，没有图片时为 0
    pub fn last_frame(&self) -> u32 {
        self.images.iter().map(ImageRecord::frame).max().unwrap_or(0)
    }

    /// 添加图片，并清空所有缓存的聚合值
    pub fn add_image(&mut self, image: impl Into<Option<ImageRecord>>) -> Result<()> {
        let image = image
            .into()
            .ok_or_else(|| Error::InvalidInput(format!("身份 {} 添加的图片为空", self.number)))?;
        self.images.push(image);
        self.cache = Aggregates::default();
        Ok(())
    }

    /// 平均色调
    pub fn hue(&self) -> Option<f32> {
        *self.cache.hue.get_or_init(|| self.visual_mean(|v| v.hue))
    }

    /// 平均亮度
    pub fn brightness(&self) -> Option<f32> {
        *self.cache.brightness.get_or_init(|| self.visual_mean(|v| v.brightness))
    }

    /// 平均饱和度
    pub fn saturation(&self) -> Option<f32> {
        *self.cache.saturation.get_or_init(|| self.visual_mean(|v| v.saturation))
    }

    /// 平均图片哈希
    ///
    /// 每张图片保存完整的 64 位哈希，只有平均值按 `f64` 计算。
    pub fn imhash(&self) -> Option<f64> {
        *self.cache.hash.get_or_init(|| {
            let hashes = self.images.iter().filter_map(ImageRecord::visuals).map(|v| v.hash as f64);
            let (sum, n) = hashes.fold((0., 0usize), |(sum, n), h| (sum + h, n + 1));
            (n > 0).then(|| sum / n as f64)
        })
    }

    /// 所有图片特征向量的逐元素中位数，没有任何特征时返回 `None`
    pub fn centroid_features(&self) -> Option<&[f32]> {
        self.cache.features.get_or_init(|| self.compute_centroid()).as_deref()
    }

    /// 身份内部一致性：每张图片特征与中心特征的平均余弦相似度
    pub fn consistency(&self) -> Option<f32> {
        let centroid = self.centroid_features()?;
        let scores = self
            .images
            .iter()
            .filter_map(ImageRecord::features)
            .filter_map(|f| cosine_similarity(f, centroid))
            .collect::<Vec<_>>();
        mean(&scores)
    }

    fn visual_mean(&self, f: impl Fn(&Visuals) -> f32) -> Option<f32> {
        // 缺失的描述不计入平均值
        let values = self.images.iter().filter_map(ImageRecord::visuals).map(f).collect::<Vec<_>>();
        mean(&values)
    }

    fn compute_centroid(&self) -> Option<Vec<f32>> {
        let mut features = self.images.iter().filter_map(ImageRecord::features);
        let first = features.next()?;
        let dim = first.len();

        let mut columns = vec![Vec::new(); dim];
        for vector in std::iter::once(first).chain(features) {
            if vector.len() != dim {
                warn!("身份 {} 的特征维度不一致: {} != {}", self.number, vector.len(), dim);
                continue;
            }
            for (column, &value) in columns.iter_mut().zip(vector) {
                column.push(value);
            }
        }

        Some(columns.iter_mut().map(|column| median(column)).collect())
    }
}

fn mean(values: &[f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f32>() / values.len() as f32)
}

/// 中位数，偶数个时取中间两个数的平均值
fn median(values: &mut [f32]) -> f32 {
    values.sort_unstable_by(f32::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 { (values[mid - 1] + values[mid]) / 2. } else { values[mid] }
}
