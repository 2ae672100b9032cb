//! 按 HU 强度区间做阈值的二值 mask.

use super::VolumeMask;
use crate::{CtVolume, Idx3d};

/// 强度区间二值 mask: 体素 HU 值落在 `[min, max]` 闭区间内时被接受.
///
/// 该结构自构建起不再持有可变状态, `test` 是输入的纯函数.
#[derive(Debug, Clone, Copy)]
pub struct HuvRangeMask<'a> {
    min: f32,
    max: f32,
    volume: &'a CtVolume,
}

impl<'a> HuvRangeMask<'a> {
    /// 创建 mask. `min` 必须不大于 `max`, 否则程序 panic.
    pub fn new(min: f32, max: f32, volume: &'a CtVolume) -> Self {
        assert!(min <= max);
        Self { min, max, volume }
    }

    /// 区间下界.
    #[inline]
    pub fn min(&self) -> f32 {
        self.min
    }

    /// 区间上界.
    #[inline]
    pub fn max(&self) -> f32 {
        self.max
    }
}

impl VolumeMask for HuvRangeMask<'_> {
    #[inline]
    fn extent(&self) -> Idx3d {
        self.volume.shape()
    }

    /// 索引越界或 HU 值超出 \[-1024, 3071\] 值域时 panic.
    #[inline]
    fn test(&self, pos: Idx3d) -> bool {
        let val = self.volume.huv(pos);
        self.min <= val && val <= self.max
    }
}
