use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::geometric_transformations::{Interpolation, rotate_about_center};
use imageproc::noise::gaussian_noise;
use rand::Rng;

use crate::error::{Error, Result};

/// 图片增强
///
/// 读取 `source`，增强后写入 `output_dir/output_name`，返回写入的路径。
/// 结果允许是随机的。
pub trait Augmenter {
    fn augment(&self, source: &Path, output_dir: &Path, output_name: &str) -> Result<PathBuf>;
}

impl<F> Augmenter for F
where
    F: Fn(&Path, &Path, &str) -> Result<PathBuf>,
{
    fn augment(&self, source: &Path, output_dir: &Path, output_name: &str) -> Result<PathBuf> {
        self(source, output_dir, output_name)
    }
}

/// 增强类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AugmentMode {
    /// 仅颜色和画质
    Color,
    /// 仅几何形变
    Shape,
    /// 两者各以 50% 概率叠加
    #[default]
    All,
}

/// 基于 `image`/`imageproc` 的默认增强实现
#[derive(Debug, Clone)]
pub struct ImageAugmenter {
    pub mode: AugmentMode,
    /// 输出尺寸 (宽, 高)
    pub size: (u32, u32),
}

impl ImageAugmenter {
    pub fn new(mode: AugmentMode) -> Self {
        Self { mode, size: (320, 280) }
    }

    /// 对内存中的图片执行一次随机增强
    pub fn transform<R: Rng + ?Sized>(&self, image: DynamicImage, rng: &mut R) -> DynamicImage {
        let image = match self.mode {
            AugmentMode::Color => transform_color(image, rng),
            AugmentMode::Shape => transform_shape(image, rng),
            AugmentMode::All => {
                let image =
                    if rng.random_bool(0.5) { transform_color(image, rng) } else { image };
                if rng.random_bool(0.5) { transform_shape(image, rng) } else { image }
            }
        };
        image.resize_exact(self.size.0, self.size.1, FilterType::Triangle)
    }
}

impl Default for ImageAugmenter {
    fn default() -> Self {
        Self::new(AugmentMode::default())
    }
}

impl Augmenter for ImageAugmenter {
    fn augment(&self, source: &Path, output_dir: &Path, output_name: &str) -> Result<PathBuf> {
        let image = image::open(source).map_err(|e| Error::image(source, e))?;
        let output = self.transform(image, &mut rand::rng());

        let path = output_dir.join(output_name);
        // JPEG 不支持透明通道
        DynamicImage::ImageRgb8(output.to_rgb8())
            .save(&path)
            .map_err(|e| Error::image(&path, e))?;
        Ok(path)
    }
}

fn transform_color<R: Rng + ?Sized>(image: DynamicImage, rng: &mut R) -> DynamicImage {
    // 画质：从中选择一种
    let image = match rng.random_range(0..6) {
        0 => image.brighten(rng.random_range(-40..=40)),
        1 => image.adjust_contrast(rng.random_range(-30.0..30.0)),
        2 => {
            let scale = rng.random_range(0.4..0.6);
            let (w, h) = (image.width(), image.height());
            let small_w = ((w as f32 * scale) as u32).max(1);
            let small_h = ((h as f32 * scale) as u32).max(1);
            image
                .resize_exact(small_w, small_h, FilterType::Nearest)
                .resize_exact(w, h, FilterType::Triangle)
        }
        3 => {
            let stddev = rng.random_range(8.0..20.0);
            DynamicImage::ImageRgb8(gaussian_noise(&image.to_rgb8(), 0., stddev, rng.random()))
        }
        4 => image.blur(rng.random_range(0.5..1.5)),
        _ => image.huerotate(rng.random_range(-20..=20)),
    };

    // 天气：低概率加雾
    if rng.random_bool(0.1) {
        let alpha = rng.random_range(0.1..0.5);
        DynamicImage::ImageRgb8(fog(&image.to_rgb8(), alpha))
    } else {
        image
    }
}

fn transform_shape<R: Rng + ?Sized>(mut image: DynamicImage, rng: &mut R) -> DynamicImage {
    if rng.random_bool(0.3) {
        image = image.blur(rng.random_range(0.8..2.0));
    }

    if rng.random_bool(0.3) && image.width() > 200 && image.height() > 180 {
        let x = rng.random_range(0..=image.width() - 200);
        let y = rng.random_range(0..=image.height() - 180);
        image = image.crop_imm(x, y, 200, 180);
    }

    if rng.random_bool(0.7) {
        let theta = rng.random_range(-15.0f32..15.0).to_radians();
        let rgb = rotate_about_center(&image.to_rgb8(), theta, Interpolation::Bilinear, Rgb([0, 0, 0]));
        image = DynamicImage::ImageRgb8(rgb);
    }

    if rng.random_bool(0.2) {
        // 放大中心区域
        let (w, h) = (image.width(), image.height());
        let (cw, ch) = ((w * 9 / 10).max(1), (h * 9 / 10).max(1));
        image = image.crop_imm((w - cw) / 2, (h - ch) / 2, cw, ch);
    }

    image
}

fn fog(image: &RgbImage, alpha: f32) -> RgbImage {
    let mut output = image.clone();
    for pixel in output.pixels_mut() {
        for c in pixel.0.iter_mut() {
            *c = (*c as f32 * (1. - alpha) + 200. * alpha).round() as u8;
        }
    }
    output
}
