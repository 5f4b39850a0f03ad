use std::path::PathBuf;

use thiserror::Error;

use crate::filename::DatasetKind;

/// 数据集相关操作的错误类型
#[derive(Error, Debug)]
pub enum Error {
    /// 输入目录不存在
    #[error("路径不存在: {}", path.display())]
    PathNotFound { path: PathBuf },

    /// 文件名无法识别
    #[error("无法识别的文件名: {name}")]
    UnrecognizedFilename { name: String },

    /// 缺少必要的输入
    #[error("无效的输入: {0}")]
    InvalidInput(String),

    /// 找不到指定的身份
    #[error("身份 {identity} 不存在")]
    NotFound { identity: i64 },

    /// 数据集为空，无法计算统计值
    #[error("数据集为空")]
    EmptyDataset,

    /// 该数据集格式不支持生成文件名
    #[error("不支持的数据集格式: {0}")]
    UnsupportedDataset(DatasetKind),

    #[error("读写文件失败: {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("图片编解码失败: {}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// 图片增强失败，该图片不会计入生成数量
    ///
    /// `created` 为失败前本轮已经追加到数据集中的图片数量。
    #[error("图片增强失败: {}（已生成 {created} 张）", path.display())]
    Augment {
        path: PathBuf,
        created: usize,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub fn image(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        Self::Image { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
