//! 分割结果集合与只读访问器.

use std::collections::BTreeSet;

use ndarray::Array3;

use crate::mask::VoxelGate;
use crate::Idx3d;

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use ndarray::Axis;
        use rayon::iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator};
    }
}

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 全局结果集: 唯一体素索引的有序集合.
///
/// 内部按 (x, y, z) 字典序排列, 以支持确定性的去重.
/// 在一次分割运行内只增不减.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ResultSet {
    voxels: BTreeSet<Idx3d>,
}

impl ResultSet {
    /// 创建空集合.
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入体素索引. 若此前不存在则返回 `true`.
    #[inline]
    pub fn insert(&mut self, pos: Idx3d) -> bool {
        self.voxels.insert(pos)
    }

    /// 判断体素是否已在集合中.
    #[inline]
    pub fn contains(&self, pos: &Idx3d) -> bool {
        self.voxels.contains(pos)
    }

    /// 体素个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    /// 判断是否为空.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    /// 按 (x, y, z) 字典序迭代所有体素.
    pub fn iter(&self) -> impl Iterator<Item = Idx3d> + '_ {
        self.voxels.iter().copied()
    }
}

/// "尚未被分割过才放行" 的准入适配器.
///
/// 持有对全局结果集的引用, 恰好放行尚未被认领的体素.
#[derive(Debug, Clone, Copy)]
pub struct NotYetSegmented<'a> {
    claimed: &'a ResultSet,
}

impl<'a> NotYetSegmented<'a> {
    /// 以全局结果集为准绳创建适配器.
    pub fn new(claimed: &'a ResultSet) -> Self {
        Self { claimed }
    }
}

impl VoxelGate for NotYetSegmented<'_> {
    #[inline]
    fn admits(&self, pos: Idx3d) -> bool {
        !self.claimed.contains(&pos)
    }
}

/// 分割结果的只读访问器: 以二值标量场形式暴露累积的体素集合.
///
/// 成员判定为对数复杂度, 供下游 (表面提取, 可视化)
/// 以全体数据分辨率逐体素查询.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SegmentMask {
    voxels: BTreeSet<Idx3d>,
    extent: Idx3d,
}

impl SegmentMask {
    /// 由结果集与体数据范围构建访问器.
    pub fn new(set: ResultSet, extent: Idx3d) -> Self {
        Self {
            voxels: set.voxels,
            extent,
        }
    }

    /// mask 范围, 按 (x, y, z) 排列.
    #[inline]
    pub fn extent(&self) -> Idx3d {
        self.extent
    }

    /// 查询体素的二值标量值: 属于分割结果时为 1, 否则为 0.
    #[inline]
    pub fn value(&self, pos: Idx3d) -> u8 {
        self.voxels.contains(&pos) as u8
    }

    /// 成员个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    /// 判断是否为空.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    /// 按 (x, y, z) 字典序迭代所有成员.
    pub fn iter(&self) -> impl Iterator<Item = Idx3d> + '_ {
        self.voxels.iter().copied()
    }

    /// 根据体素分辨率 (单位: 毫米, 按 (x, y, z) 排列)
    /// 计算分割结果的实际体积, 以立方毫米为单位.
    #[inline]
    pub fn volume_mm3(&self, pix_dim: [f64; 3]) -> f64 {
        self.voxels.len() as f64 * pix_dim.iter().product::<f64>()
    }

    /// 物化为稠密二值标签体数据, 按 `[z, y, x]` 组织.
    pub fn to_label_volume(&self) -> Array3<u8> {
        let (w, h, d) = self.extent;
        let mut ans = Array3::zeros((d, h, w));
        for (x, y, z) in self.iter() {
            ans[[z, y, x]] = 1;
        }
        ans
    }
}

/// 并发操作部分
#[cfg(feature = "rayon")]
impl SegmentMask {
    /// 借助 `rayon`, 逐水平切片并行地物化稠密二值标签体数据,
    /// 按 `[z, y, x]` 组织.
    pub fn par_to_label_volume(&self) -> Array3<u8> {
        let (w, h, d) = self.extent;
        let mut ans = Array3::zeros((d, h, w));
        ans.axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(z, mut sli)| {
                for ((y, x), v) in sli.indexed_iter_mut() {
                    *v = self.value((x, y, z));
                }
            });
        ans
    }
}

#[cfg(test)]
mod tests {
    use super::{NotYetSegmented, ResultSet, SegmentMask};
    use crate::mask::VoxelGate;

    #[test]
    fn test_insert_deduplicates() {
        let mut set = ResultSet::new();
        assert!(set.insert((1, 2, 3)));
        assert!(!set.insert((1, 2, 3)));
        assert_eq!(set.len(), 1);
        assert!(set.contains(&(1, 2, 3)));
    }

    #[test]
    fn test_lexicographic_order() {
        let mut set = ResultSet::new();
        set.insert((1, 0, 0));
        set.insert((0, 2, 0));
        set.insert((0, 0, 3));
        set.insert((0, 2, 1));
        let collected: Vec<_> = set.iter().collect();
        // 先 x, 再 y, 后 z.
        assert_eq!(collected, [(0, 0, 3), (0, 2, 0), (0, 2, 1), (1, 0, 0)]);
    }

    #[test]
    fn test_gate_admits_unclaimed_only() {
        let mut set = ResultSet::new();
        set.insert((1, 1, 1));
        let gate = NotYetSegmented::new(&set);
        assert!(!gate.admits((1, 1, 1)));
        assert!(gate.admits((1, 1, 2)));
    }

    #[test]
    fn test_mask_value_and_volume() {
        let mut set = ResultSet::new();
        set.insert((0, 0, 0));
        set.insert((1, 0, 0));
        let mask = SegmentMask::new(set, (4, 4, 4));
        assert_eq!(mask.extent(), (4, 4, 4));
        assert_eq!(mask.value((0, 0, 0)), 1);
        assert_eq!(mask.value((2, 0, 0)), 0);
        assert_eq!(mask.len(), 2);
        assert!((mask.volume_mm3([0.5, 0.5, 1.0]) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_label_volume_materialization() {
        let mut set = ResultSet::new();
        set.insert((3, 1, 0));
        set.insert((0, 0, 1));
        let mask = SegmentMask::new(set, (4, 2, 2));
        let vol = mask.to_label_volume();
        assert_eq!(vol.shape(), [2, 2, 4]); // [z, y, x]
        assert_eq!(vol[[0, 1, 3]], 1);
        assert_eq!(vol[[1, 0, 0]], 1);
        assert_eq!(vol.iter().filter(|v| **v == 1).count(), 2);
    }

    #[cfg(feature = "rayon")]
    #[test]
    fn test_par_label_volume_matches_sequential() {
        let mut set = ResultSet::new();
        for i in 0..6 {
            set.insert((i % 4, (i * 7) % 5, (i * 3) % 3));
        }
        let mask = SegmentMask::new(set, (4, 5, 3));
        assert_eq!(mask.to_label_volume(), mask.par_to_label_volume());
    }
}
