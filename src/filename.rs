use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// NOTE: 摄像头编号和帧号只匹配一位数字，保持与现有数据集一致
static AISP_REID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"ID([-\d]+)_CAM(\d)_FRAME(\d)").expect("failed to build regex"));

/// 文件名编码约定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    /// `ID{身份}_CAM{摄像头}_FRAME{帧}.jpeg`
    #[default]
    AispReid,
    /// 仅作为标记，尚不支持解析和生成
    Market1501,
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AispReid => f.write_str("aispreid"),
            Self::Market1501 => f.write_str("market1501"),
        }
    }
}

impl FromStr for DatasetKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "aispreid" => Ok(Self::AispReid),
            "market1501" => Ok(Self::Market1501),
            _ => Err(format!("未知的数据集格式: {}", s)),
        }
    }
}

/// 从 ReID 图片文件名中解析出的信息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReidFileInfo {
    pub identity: i64,
    pub camera: u32,
    pub frame: u32,
    pub kind: DatasetKind,
}

impl ReidFileInfo {
    /// 解析文件名，无法识别时返回 `None`
    pub fn parse(filename: &str) -> Option<Self> {
        let caps = AISP_REID_PATTERN.captures(filename)?;
        // `[-\d]+` 也会匹配 `1-2` 这类无效数字
        let identity = caps[1].parse().ok()?;
        let camera = caps[2].parse().ok()?;
        let frame = caps[3].parse().ok()?;
        Some(Self { identity, camera, frame, kind: DatasetKind::AispReid })
    }

    /// 与 [`ReidFileInfo::parse`] 相同，但无法识别时返回错误
    pub fn try_parse(filename: &str) -> Result<Self> {
        Self::parse(filename).ok_or_else(|| Error::UnrecognizedFilename { name: filename.to_owned() })
    }

    /// 根据数据集格式生成文件名
    pub fn format(identity: i64, camera: u32, frame: u32, kind: DatasetKind) -> Result<String> {
        match kind {
            DatasetKind::AispReid => Ok(format!("ID{identity}_CAM{camera}_FRAME{frame}.jpeg")),
            DatasetKind::Market1501 => Err(Error::UnsupportedDataset(kind)),
        }
    }

    pub fn to_filename(&self) -> Result<String> {
        Self::format(self.identity, self.camera, self.frame, self.kind)
    }
}
