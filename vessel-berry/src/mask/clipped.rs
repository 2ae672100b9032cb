//! 沿折线走廊裁剪的二值 mask.

use ordered_float::NotNan;

use super::{HuvRangeMask, VolumeMask};
use crate::{CtVolume, Idx3d, Line, MmVec};

/// 一个 interval 的走廊: 有序的带半径线段集合.
///
/// 构建阶段只追加, interval 之间整体清空, mask 评估期间只读.
#[derive(Debug, Clone, Default)]
pub struct Corridor {
    lines: Vec<Line>,
}

impl Corridor {
    /// 创建空走廊.
    pub fn new() -> Self {
        Self {
            lines: Vec::with_capacity(8),
        }
    }

    /// 追加一条线段.
    #[inline]
    pub fn push(&mut self, line: Line) {
        self.lines.push(line);
    }

    /// 清空所有线段, 以便复用于下一个 interval.
    #[inline]
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// 线段条数.
    #[inline]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// 判断是否为空.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// 按追加顺序扫描, 返回距 `p` 最近的线段及其距离.
    ///
    /// 一旦扫描到某条线段到 `p` 的距离已小于 **该线段自身** 的半径,
    /// 扫描立即短路并将其作为结果返回. 因此返回值未必是几何意义上
    /// 全局最近的线段; 该语义是刻意保留的性能启发,
    /// 不影响 mask 最终的接受 / 拒绝判定.
    ///
    /// 走廊为空时返回 `None`.
    pub fn closest(&self, p: MmVec) -> Option<(&Line, f64)> {
        let mut best: Option<(&Line, NotNan<f64>)> = None;
        for line in self.lines.iter() {
            let dist = NotNan::new(line.distance_to(p)).unwrap();
            if dist.into_inner() < line.radius() {
                return Some((line, dist.into_inner()));
            }
            if best.as_ref().map_or(true, |(_, d)| dist < *d) {
                best = Some((line, dist));
            }
        }
        best.map(|(line, d)| (line, d.into_inner()))
    }
}

/// 体素准入能力接口.
///
/// 用于在区域生长前排除已被先前 interval / branch 认领的体素,
/// 防止重复处理.
pub trait VoxelGate {
    /// 体素 `pos` 是否允许参与本次区域生长?
    fn admits(&self, pos: Idx3d) -> bool;
}

/// 走廊裁剪 mask.
///
/// 体素被接受当且仅当:
///
/// 1. 准入接口 `gate` 放行;
/// 2. 体素的毫米位置到走廊最近线段的距离小于该线段半径;
/// 3. 体素 HU 值落在强度区间内.
///
/// 自构建起不再持有可变状态, `test` 是输入的纯函数.
pub struct ClippedMask<'a> {
    range: HuvRangeMask<'a>,
    corridor: &'a Corridor,
    gate: &'a dyn VoxelGate,
    volume: &'a CtVolume,
}

impl<'a> ClippedMask<'a> {
    /// 创建 mask. `min` 必须不大于 `max`, 否则程序 panic.
    pub fn new(
        min: f32,
        max: f32,
        corridor: &'a Corridor,
        gate: &'a dyn VoxelGate,
        volume: &'a CtVolume,
    ) -> Self {
        Self {
            range: HuvRangeMask::new(min, max, volume),
            corridor,
            gate,
            volume,
        }
    }
}

impl VolumeMask for ClippedMask<'_> {
    #[inline]
    fn extent(&self) -> Idx3d {
        self.volume.shape()
    }

    fn test(&self, pos: Idx3d) -> bool {
        if !self.gate.admits(pos) {
            return false;
        }
        let p = self.volume.voxel_to_mm(pos);
        match self.corridor.closest(p) {
            None => false,
            Some((line, dist)) => dist < line.radius() && self.range.test(pos),
        }
    }
}
