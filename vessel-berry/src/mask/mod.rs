//! 体数据上的二值 mask.

mod binary;
mod clipped;

pub use binary::HuvRangeMask;
pub use clipped::{ClippedMask, Corridor, VoxelGate};

use crate::Idx3d;

/// 体数据上的二值 mask 谓词.
///
/// 区域生长原语通过该接口访问 mask, 支持三维索引与行优先一维索引两种寻址.
pub trait VolumeMask {
    /// mask 的范围, 按 (x, y, z) 排列.
    fn extent(&self) -> Idx3d;

    /// 判断体素 `pos` 是否被接受.
    fn test(&self, pos: Idx3d) -> bool;

    /// 以行优先一维索引 (`index = z*(w*h) + y*w + x`) 判断体素是否被接受.
    #[inline]
    fn test_flat(&self, index: usize) -> bool {
        let (w, h, _) = self.extent();
        self.test((index % w, (index / w) % h, index / (w * h)))
    }
}
