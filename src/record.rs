use std::path::{Path, PathBuf};

use serde::Serialize;

/// 图片的视觉描述
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Visuals {
    pub hue: f32,
    pub brightness: f32,
    pub saturation: f32,
    /// 64 位差异哈希
    pub hash: u64,
}

/// 单张图片及其元数据
///
/// 创建后不再修改，描述符需要在加入 [`Identity`](crate::Identity) 之前通过
/// `with_*` 方法附加。
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRecord {
    path: PathBuf,
    camera: u32,
    frame: u32,
    features: Option<Vec<f32>>,
    visuals: Option<Visuals>,
}

impl ImageRecord {
    pub fn new(path: impl Into<PathBuf>, camera: u32, frame: u32) -> Self {
        Self { path: path.into(), camera, frame, features: None, visuals: None }
    }

    pub fn with_features(mut self, features: Option<Vec<f32>>) -> Self {
        self.features = features;
        self
    }

    pub fn with_visuals(mut self, visuals: Option<Visuals>) -> Self {
        self.visuals = visuals;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn camera(&self) -> u32 {
        self.camera
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn features(&self) -> Option<&[f32]> {
        self.features.as_deref()
    }

    pub fn visuals(&self) -> Option<&Visuals> {
        self.visuals.as_ref()
    }

    /// 图片所在目录
    pub fn location(&self) -> Option<&Path> {
        self.path.parent()
    }

    /// 图片文件名
    pub fn name(&self) -> Option<String> {
        self.path.file_name().map(|s| s.to_string_lossy().into_owned())
    }
}
