use ndarray::prelude::*;

use crate::error::{Error, Result};

/// 余弦相似度，维度不一致或存在零向量时返回 `None`
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }
    let (mut dot, mut na, mut nb) = (0.0f32, 0.0f32, 0.0f32);
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    if na == 0. || nb == 0. {
        return None;
    }
    Some((dot / (na.sqrt() * nb.sqrt())).clamp(-1., 1.))
}

/// 身份之间的相似度矩阵
///
/// 矩阵与其行列对应的身份编号绑定在一起，第 `i` 行/列始终对应 `keys[i]`。
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    keys: Vec<i64>,
    data: Array2<f32>,
}

impl Default for SimilarityMatrix {
    fn default() -> Self {
        Self { keys: vec![], data: Array2::zeros((0, 0)) }
    }
}

impl SimilarityMatrix {
    /// 根据各身份的中心特征构建矩阵
    ///
    /// 对角线固定为 1.0；任意一方缺少特征的位置为 0.0。
    pub fn build<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (i64, Option<&'a [f32]>)>,
    {
        let (keys, features): (Vec<_>, Vec<_>) = entries.into_iter().unzip();
        let n = keys.len();
        let mut data = Array2::zeros((n, n));

        for i in 0..n {
            data[[i, i]] = 1.;
            for j in (i + 1)..n {
                let value = match (features[i], features[j]) {
                    (Some(a), Some(b)) => cosine_similarity(a, b).unwrap_or(0.),
                    _ => 0.,
                };
                data[[i, j]] = value;
                data[[j, i]] = value;
            }
        }

        Self { keys, data }
    }

    /// 矩阵的维度
    pub fn dim(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[i64] {
        &self.keys
    }

    pub fn as_array(&self) -> ArrayView2<'_, f32> {
        self.data.view()
    }

    fn index_of(&self, key: i64) -> Result<usize> {
        self.keys.iter().position(|&k| k == key).ok_or(Error::NotFound { identity: key })
    }

    /// 两个身份之间的相似度
    pub fn get(&self, a: i64, b: i64) -> Result<f32> {
        Ok(self.data[[self.index_of(a)?, self.index_of(b)?]])
    }

    /// 某个身份与所有身份（包括自身）的相似度，按矩阵顺序排列
    ///
    /// 矩阵为空时同样返回 [`Error::NotFound`]。
    pub fn row(&self, key: i64) -> Result<Vec<(i64, f32)>> {
        let index = self.index_of(key)?;
        Ok(self.keys.iter().copied().zip(self.data.row(index).iter().copied()).collect())
    }

    /// 同时删除对应的行和列
    pub fn remove(&mut self, key: i64) -> Result<()> {
        let index = self.index_of(key)?;
        let keep = (0..self.dim()).filter(|&i| i != index).collect::<Vec<_>>();
        self.data = self.data.select(Axis(0), &keep).select(Axis(1), &keep);
        self.keys.remove(index);
        Ok(())
    }

    pub fn mean(&self) -> Result<f32> {
        self.data.mean().ok_or(Error::EmptyDataset)
    }

    pub fn min(&self) -> Result<f32> {
        self.data.iter().copied().reduce(f32::min).ok_or(Error::EmptyDataset)
    }

    pub fn max(&self) -> Result<f32> {
        self.data.iter().copied().reduce(f32::max).ok_or(Error::EmptyDataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SimilarityMatrix {
        let a = [1.0f32, 0.0];
        let b = [0.0f32, 1.0];
        let c = [1.0f32, 1.0];
        SimilarityMatrix::build([(10, Some(&a[..])), (20, Some(&b[..])), (30, Some(&c[..]))])
    }

    #[test]
    fn cosine() {
        assert_eq!(cosine_similarity(&[1., 0.], &[2., 0.]), Some(1.));
        assert_eq!(cosine_similarity(&[1., 0.], &[0., 3.]), Some(0.));
        assert_eq!(cosine_similarity(&[1.], &[1., 2.]), None);
        assert_eq!(cosine_similarity(&[0., 0.], &[1., 2.]), None);
    }

    #[test]
    fn build_symmetric_with_unit_diagonal() {
        let m = sample();
        assert_eq!(m.dim(), 3);
        let arr = m.as_array();
        for i in 0..3 {
            assert_eq!(arr[[i, i]], 1.);
            for j in 0..3 {
                assert_eq!(arr[[i, j]], arr[[j, i]]);
            }
        }
        assert_eq!(m.get(10, 20).unwrap(), 0.);
        assert!((m.get(10, 30).unwrap() - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn missing_features_have_zero_similarity() {
        let a = [1.0f32, 2.0];
        let m = SimilarityMatrix::build([(1, Some(&a[..])), (2, None)]);
        assert_eq!(m.get(1, 2).unwrap(), 0.);
        assert_eq!(m.get(2, 2).unwrap(), 1.);
    }

    #[test]
    fn remove_keeps_remaining_pairs() {
        let mut m = sample();
        let before = m.get(10, 30).unwrap();
        m.remove(20).unwrap();
        assert_eq!(m.dim(), 2);
        assert_eq!(m.keys(), &[10, 30]);
        assert_eq!(m.as_array().shape(), &[2, 2]);
        assert_eq!(m.get(10, 30).unwrap(), before);
        assert!(matches!(m.get(20, 10), Err(Error::NotFound { identity: 20 })));
        assert!(matches!(m.remove(20), Err(Error::NotFound { .. })));
    }

    #[test]
    fn row_follows_key_order() {
        let m = sample();
        let row = m.row(20).unwrap();
        assert_eq!(row.iter().map(|(k, _)| *k).collect::<Vec<_>>(), vec![10, 20, 30]);
        assert_eq!(row[1].1, 1.);
    }

    #[test]
    fn empty_matrix_statistics() {
        let m = SimilarityMatrix::default();
        assert!(matches!(m.mean(), Err(Error::EmptyDataset)));
        assert!(matches!(m.min(), Err(Error::EmptyDataset)));
        assert!(matches!(m.max(), Err(Error::EmptyDataset)));
        assert!(matches!(m.row(1), Err(Error::NotFound { identity: 1 })));
    }

    #[test]
    fn statistics_include_diagonal() {
        let m = sample();
        assert_eq!(m.max().unwrap(), 1.);
        assert_eq!(m.min().unwrap(), 0.);
        // 3 个 1.0 对角线 + 4 个 0.7071 + 2 个 0
        let expected = (3. + 4. * std::f32::consts::FRAC_1_SQRT_2) / 9.;
        assert!((m.mean().unwrap() - expected).abs() < 1e-6);
    }
}
