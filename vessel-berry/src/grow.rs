//! 区域生长原语接口.
//!
//! 泛型二值区域生长算法本身不属于本 crate,
//! 这里只规定分割编排器配置并驱动它所需的接口.

use crate::mask::VolumeMask;
use crate::Idx3d;

/// 一次区域生长调用的结果: 若干连通区域, 每个区域为体素索引序列.
#[derive(Debug, Clone, Default)]
pub struct GrownRegions {
    regions: Vec<Vec<Idx3d>>,
}

impl GrownRegions {
    /// 由区域列表直接构建.
    pub fn new(regions: Vec<Vec<Idx3d>>) -> Self {
        Self { regions }
    }

    /// 所有连通区域.
    #[inline]
    pub fn regions(&self) -> &[Vec<Idx3d>] {
        &self.regions
    }

    /// 所有区域的体素总数.
    #[inline]
    pub fn voxel_count(&self) -> usize {
        self.regions.iter().map(Vec::len).sum()
    }

    /// 按区域顺序迭代所有体素.
    pub fn iter_voxels(&self) -> impl Iterator<Item = Idx3d> + '_ {
        self.regions.iter().flatten().copied()
    }
}

/// 区域生长原语.
///
/// 给定二值 mask 与种子点, 从种子出发 flood-fill 所有连通且被 mask
/// 接受的体素. 实现可以自行并行化, 这对调用方透明.
pub trait RegionGrowing {
    /// 设置邻域尺寸. `1` 代表 6-连通.
    fn set_neighbourhood_size(&mut self, size: usize);

    /// 在 `mask` 的整个范围上, 以 `seeds` 为种子运行区域生长.
    ///
    /// 实现必须忽略越界种子与被 mask 拒绝的种子;
    /// 返回的各区域之间不得出现重复体素.
    fn compute(&mut self, mask: &dyn VolumeMask, seeds: &[Idx3d]) -> GrownRegions;
}

#[cfg(test)]
mod tests {
    use super::GrownRegions;

    #[test]
    fn test_grown_regions_accessors() {
        let grown = GrownRegions::new(vec![vec![(0, 0, 0), (1, 0, 0)], vec![(5, 5, 5)]]);
        assert_eq!(grown.regions().len(), 2);
        assert_eq!(grown.voxel_count(), 3);
        assert_eq!(
            grown.iter_voxels().collect::<Vec<_>>(),
            [(0, 0, 0), (1, 0, 0), (5, 5, 5)],
        );
    }
}
