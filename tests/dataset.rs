use std::fs;
use std::path::Path;

use reid_balance::describe::Describer;
use reid_balance::filename::ReidFileInfo;
use reid_balance::{Dataset, Error, Visuals};
use rstest::*;
use tempfile::TempDir;

/// 根据文件名生成描述符，不读取图片内容
struct NameDescriber;

impl Describer for NameDescriber {
    fn describe(&self, path: &Path) -> Option<Visuals> {
        let info = ReidFileInfo::parse(&path.file_name()?.to_string_lossy())?;
        Some(Visuals { hue: info.frame as f32 / 10., brightness: 0.5, saturation: 0.5, hash: 0 })
    }

    fn embed(&self, path: &Path) -> Option<Vec<f32>> {
        let info = ReidFileInfo::parse(&path.file_name()?.to_string_lossy())?;
        let angle = info.identity as f32;
        Some(vec![angle.cos(), angle.sin(), info.frame as f32 / 100.])
    }
}

/// 所有图片都无法读取
struct BrokenDescriber;

impl Describer for BrokenDescriber {
    fn describe(&self, _path: &Path) -> Option<Visuals> {
        None
    }

    fn embed(&self, _path: &Path) -> Option<Vec<f32>> {
        None
    }
}

fn touch(dir: &Path, names: &[&str]) {
    for name in names {
        fs::write(dir.join(name), b"fake").unwrap();
    }
}

#[fixture]
fn reid_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    touch(
        dir.path(),
        &[
            "ID2_CAM1_FRAME1.jpeg",
            "ID2_CAM2_FRAME2.jpeg",
            "ID10_CAM1_FRAME1.jpeg",
            "ID-7_CAM3_FRAME4.jpg",
            "ID2_CAM1_FRAME3.png",
            "ID10_CAM1_FRAME2.JPEG",
        ],
    );
    dir
}

#[rstest]
fn load_groups_by_identity(reid_dir: TempDir) {
    let dataset = Dataset::load(reid_dir.path(), &NameDescriber).unwrap();
    assert_eq!(dataset.identities_count(), 3);
    assert_eq!(dataset.images_count(), 6);
    // 按文件名顺序首次出现的顺序
    assert_eq!(dataset.identity_ids(), vec![-7, 10, 2]);
    assert_eq!(dataset.similarity().dim(), 3);
    assert_eq!(dataset.get(2).unwrap().last_frame(), 3);
}

#[rstest]
fn load_skips_unrecognized_and_non_images(reid_dir: TempDir) {
    touch(reid_dir.path(), &["notes.txt", "0001_c1s1_000151_01.jpg", ".directory", "ID5_CAM1_FRAME1.txt"]);
    let generated = reid_dir.path().join("generated");
    fs::create_dir(&generated).unwrap();
    touch(&generated, &["ID2_CAM1_FRAME9.jpeg"]);

    let dataset = Dataset::load(reid_dir.path(), &NameDescriber).unwrap();
    assert_eq!(dataset.identities_count(), 3);
    assert_eq!(dataset.images_count(), 6);
    assert!(!dataset.contains(5));
}

#[rstest]
fn load_missing_path() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing");
    let r = Dataset::load(&missing, &NameDescriber);
    assert!(matches!(r, Err(Error::PathNotFound { path }) if path == missing));
}

#[rstest]
fn load_empty_directory() {
    let dir = TempDir::new().unwrap();
    let dataset = Dataset::load(dir.path(), &NameDescriber).unwrap();
    assert_eq!(dataset.identities_count(), 0);
    assert_eq!(dataset.images_count(), 0);
    assert!(matches!(dataset.consistency_avg(), Err(Error::EmptyDataset)));
    assert!(matches!(dataset.similarity_avg(), Err(Error::EmptyDataset)));
}

#[rstest]
fn single_image_centroid_is_its_features() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), &["ID3_CAM1_FRAME5.jpeg"]);
    let dataset = Dataset::load(dir.path(), &NameDescriber).unwrap();
    let identity = dataset.get(3).unwrap();
    let expected = NameDescriber.embed(identity.images()[0].path()).unwrap();
    assert_eq!(identity.centroid_features(), Some(&*expected));
    assert_eq!(identity.hue(), Some(0.5));
}

#[rstest]
fn remove_keeps_surviving_pairs(reid_dir: TempDir) {
    let mut dataset = Dataset::load(reid_dir.path(), &NameDescriber).unwrap();
    let before = dataset.similarity().get(-7, 2).unwrap();

    dataset.remove(10).unwrap();

    assert_eq!(dataset.identities_count(), 2);
    assert_eq!(dataset.similarity().dim(), 2);
    assert_eq!(dataset.similarity().keys(), &*dataset.identity_ids());
    assert_eq!(dataset.similarity().get(-7, 2).unwrap(), before);
    assert_eq!(dataset.similarity().get(2, -7).unwrap(), before);
    assert!(matches!(dataset.similarities(10), Err(Error::NotFound { identity: 10 })));
}

#[rstest]
fn similarities_follow_identity_order(reid_dir: TempDir) {
    let dataset = Dataset::load(reid_dir.path(), &NameDescriber).unwrap();
    let row = dataset.similarities(10).unwrap();
    let keys = row.iter().map(|(k, _)| *k).collect::<Vec<_>>();
    assert_eq!(keys, dataset.identity_ids());
    assert_eq!(row[1], (10, 1.));
    let separation = dataset.separation_avg_of(10).unwrap();
    let mean = row.iter().map(|(_, s)| s).sum::<f32>() / 3.;
    assert!((separation - (1. - mean)).abs() < 1e-6);
}

#[rstest]
fn missing_descriptors_are_not_zero(reid_dir: TempDir) {
    let dataset = Dataset::load(reid_dir.path(), &BrokenDescriber).unwrap();
    assert_eq!(dataset.identities_count(), 3);
    assert!(dataset.get(2).unwrap().centroid_features().is_none());
    assert!(dataset.get(2).unwrap().hue().is_none());
    assert!(matches!(dataset.consistency_avg(), Err(Error::EmptyDataset)));
    // 只有对角线为 1
    assert_eq!(dataset.similarity_min().unwrap(), 0.);
    assert!((dataset.similarity_avg().unwrap() - 1. / 3.).abs() < 1e-6);
}
