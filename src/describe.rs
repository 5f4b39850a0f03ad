use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};
use log::debug;

use crate::record::Visuals;

/// 图片描述符提取
///
/// 无法读取的图片返回 `None`，在统计时作为缺失数据处理。
pub trait Describer: Sync {
    /// 色调、亮度、饱和度和哈希
    fn describe(&self, path: &Path) -> Option<Visuals>;

    /// 固定长度的特征向量
    fn embed(&self, path: &Path) -> Option<Vec<f32>>;

    /// 一次取得两种描述符，默认分别调用
    fn describe_all(&self, path: &Path) -> (Option<Visuals>, Option<Vec<f32>>) {
        (self.describe(path), self.embed(path))
    }
}

const HUE_BINS: usize = 16;
const SATURATION_BINS: usize = 8;
const VALUE_BINS: usize = 8;

/// 基于 HSV 颜色直方图的描述符
#[derive(Debug, Clone, Copy, Default)]
pub struct HistogramDescriber;

impl HistogramDescriber {
    /// 特征向量长度
    pub const DIM: usize = HUE_BINS + SATURATION_BINS + VALUE_BINS;

    fn open(path: &Path) -> Option<DynamicImage> {
        match image::open(path) {
            Ok(img) => Some(img),
            Err(e) => {
                debug!("读取图片失败 {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn visuals_of(img: &DynamicImage) -> Visuals {
        let rgb = img.to_rgb8();
        let n = (rgb.width() * rgb.height()).max(1) as f32;
        let (mut h, mut s, mut v) = (0.0f32, 0.0f32, 0.0f32);
        for pixel in rgb.pixels() {
            let (ph, ps, pv) = rgb_to_hsv(pixel.0);
            h += ph;
            s += ps;
            v += pv;
        }
        Visuals { hue: h / n, brightness: v / n, saturation: s / n, hash: d_hash(img) }
    }

    pub fn histogram_of(img: &DynamicImage) -> Vec<f32> {
        let rgb: RgbImage = img.to_rgb8();
        let n = (rgb.width() * rgb.height()).max(1) as f32;
        let mut hist = vec![0.0f32; Self::DIM];
        for pixel in rgb.pixels() {
            let (h, s, v) = rgb_to_hsv(pixel.0);
            hist[bin(h, HUE_BINS)] += 1.;
            hist[HUE_BINS + bin(s, SATURATION_BINS)] += 1.;
            hist[HUE_BINS + SATURATION_BINS + bin(v, VALUE_BINS)] += 1.;
        }
        hist.iter_mut().for_each(|x| *x /= n);
        hist
    }
}

impl Describer for HistogramDescriber {
    fn describe(&self, path: &Path) -> Option<Visuals> {
        Self::open(path).map(|img| Self::visuals_of(&img))
    }

    fn embed(&self, path: &Path) -> Option<Vec<f32>> {
        Self::open(path).map(|img| Self::histogram_of(&img))
    }

    fn describe_all(&self, path: &Path) -> (Option<Visuals>, Option<Vec<f32>>) {
        match Self::open(path) {
            Some(img) => (Some(Self::visuals_of(&img)), Some(Self::histogram_of(&img))),
            None => (None, None),
        }
    }
}

fn bin(x: f32, bins: usize) -> usize {
    ((x * bins as f32) as usize).min(bins - 1)
}

/// RGB 转 HSV，三个分量均归一化到 [0, 1]
fn rgb_to_hsv([r, g, b]: [u8; 3]) -> (f32, f32, f32) {
    let (r, g, b) = (r as f32 / 255., g as f32 / 255., b as f32 / 255.);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let h = if delta == 0. {
        0.
    } else if max == r {
        ((g - b) / delta).rem_euclid(6.)
    } else if max == g {
        (b - r) / delta + 2.
    } else {
        (r - g) / delta + 4.
    };
    let s = if max == 0. { 0. } else { delta / max };

    (h / 6., s, max)
}

/// 64 位差异哈希
pub fn d_hash(img: &DynamicImage) -> u64 {
    let gray = img.resize_exact(9, 8, FilterType::Triangle).to_luma8();
    let data = gray.as_raw();
    debug_assert_eq!(data.len(), 72);

    let mut hash = 0u64;
    for chunk in data.chunks_exact(9) {
        for j in 0..8 {
            hash <<= 1;
            hash |= (chunk[j] < chunk[j + 1]) as u64;
        }
    }
    hash
}
