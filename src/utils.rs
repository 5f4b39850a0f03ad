use std::path::Path;

use indicatif::ProgressStyle;
use regex::Regex;

/// 默认扫描的图片后缀
pub const DEFAULT_SUFFIX: &str = "jpg,jpeg,png,bmp,webp";

// 扫描时需要排除的文件
const EXCLUDES: &[&str] = &[".directory"];

pub fn pb_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}")
        .expect("failed to build progress style")
}

pub fn pb_style_speed() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {per_sec} {msg}")
        .expect("failed to build progress style")
}

/// 由逗号分隔的后缀列表构建不区分大小写的匹配正则
pub fn suffix_regex(suffix: &str) -> Regex {
    let re = format!("(?i)^({})$", suffix.replace(',', "|"));
    Regex::new(&re).expect("failed to build regex")
}

/// 判断是否为需要扫描的图片文件
pub fn is_image_file(path: &Path, re_suf: &Regex) -> bool {
    let Some(name) = path.file_name() else {
        return false;
    };
    if EXCLUDES.contains(&&*name.to_string_lossy()) {
        return false;
    }
    path.extension().is_some_and(|ext| re_suf.is_match(&ext.to_string_lossy()))
}
