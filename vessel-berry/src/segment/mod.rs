//! 分支 interval 分割: 沿血管骨架驱动受限区域生长的编排器.

mod stats;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use itertools::Itertools;

use crate::consts::{self, huv};
use crate::graph::{NodeId, VesselGraph};
use crate::grow::RegionGrowing;
use crate::mask::{ClippedMask, Corridor};
use crate::result::{NotYetSegmented, ResultSet, SegmentMask};
use crate::{CtVolume, Line};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 分割参数. 两次运行之间可变, 单次 `compute()` 内不可变.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SegmentParams {
    /// 强度容差: 自适应阈值允许偏离均值的标准差倍数.
    pub tolerance: f64,

    /// 每个 interval 的节点数, 必须至少为 2.
    /// 相邻 interval 共享一个边界节点.
    pub nodes_per_interval: usize,

    /// 采样边半径的放大系数.
    pub radius_multiplier: f64,

    /// 是否对半径采样做 3 点不加权滑动平均.
    pub smoothed_radii: bool,
}

impl Default for SegmentParams {
    fn default() -> Self {
        Self {
            tolerance: consts::DEFAULT_TOLERANCE,
            nodes_per_interval: consts::DEFAULT_NODES_PER_INTERVAL,
            radius_multiplier: consts::DEFAULT_RADIUS_MULTIPLIER,
            smoothed_radii: true,
        }
    }
}

/// 一次分割运行的状态机.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RunState {
    /// 尚未运行.
    Idle,

    /// `compute()` 正在进行.
    Running,

    /// 正常完成, 结果 mask 已物化.
    Completed,

    /// 被协作式取消, 无结果.
    Canceled,
}

/// 进度回调接口. 由编排器同步调用, 返回值不被消费.
pub trait ProgressSink {
    /// 报告进度: 已完成 `current` / 总量 `total`.
    fn progress(&self, current: u32, total: u32);

    /// 一次运行结束 (完成或取消).
    fn finished(&self);
}

/// 丢弃一切进度信息的空实现.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentProgress;

impl ProgressSink for SilentProgress {
    fn progress(&self, _current: u32, _total: u32) {}

    fn finished(&self) {}
}

/// 协作式取消令牌. 可克隆后交由其它线程触发.
///
/// 取消是建议性的: 编排器只在 branch / interval 边界观察该标志,
/// 进行中的 interval 总是先运行完, 且不回滚部分结果.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// 创建未触发的令牌.
    pub fn new() -> Self {
        Self::default()
    }

    /// 请求取消.
    #[inline]
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// 是否已请求取消?
    #[inline]
    pub fn is_canceled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// 重置令牌, 以便复用于下一次运行.
    #[inline]
    pub fn reset(&self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// 对边半径做不加权滑动平均: 取 {前, 当前, 后} 中可用样本的均值.
#[inline]
fn smooth3(prev: Option<f64>, cur: f64, next: Option<f64>) -> f64 {
    let mut sum = cur;
    let mut n = 1.0;
    if let Some(p) = prev {
        sum += p;
        n += 1.0;
    }
    if let Some(nx) = next {
        sum += nx;
        n += 1.0;
    }
    sum / n
}

/// 分支 interval 分割编排器.
///
/// 将每条血管分支分解为重叠的节点 interval; 对每个 interval
/// 采样 HU 强度并计算自适应阈值, 由分支边与 (可选平滑的) 半径
/// 构建走廊 mask, 推导种子点, 调用区域生长原语,
/// 并把结果体素并入全局结果集 (跨 interval, 跨 branch 去重).
///
/// 体数据与骨架图是共享只读输入; 结果集, 走廊与进度计数
/// 在一次 `compute()` 期间由编排器独占.
pub struct VesselSegmenter<'a> {
    volume: &'a CtVolume,
    graph: &'a dyn VesselGraph,
    grower: &'a mut dyn RegionGrowing,
    progress: &'a dyn ProgressSink,
    params: SegmentParams,
    cancel: CancelToken,
    corridor: Corridor,
    result: ResultSet,
    state: RunState,
    mask: Option<SegmentMask>,
}

impl<'a> VesselSegmenter<'a> {
    /// 创建编排器.
    ///
    /// `params` 必须满足: `nodes_per_interval >= 2`, `tolerance >= 0`,
    /// `radius_multiplier > 0`. 否则程序 panic.
    pub fn new(
        volume: &'a CtVolume,
        graph: &'a dyn VesselGraph,
        grower: &'a mut dyn RegionGrowing,
        progress: &'a dyn ProgressSink,
        params: SegmentParams,
    ) -> Self {
        assert!(params.nodes_per_interval >= 2);
        assert!(params.tolerance >= 0.0);
        assert!(params.radius_multiplier > 0.0);

        Self {
            volume,
            graph,
            grower,
            progress,
            params,
            cancel: CancelToken::new(),
            corridor: Corridor::new(),
            result: ResultSet::new(),
            state: RunState::Idle,
            mask: None,
        }
    }

    /// 获取取消令牌的克隆, 可交由其它线程触发取消.
    #[inline]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// 当前运行状态.
    #[inline]
    pub fn state(&self) -> RunState {
        self.state
    }

    /// 结果 mask 是否已物化?
    #[inline]
    pub fn has_mask(&self) -> bool {
        self.mask.is_some()
    }

    /// 移交结果 mask 的所有权. 移交后编排器不再持有结果.
    #[inline]
    pub fn take_mask(&mut self) -> Option<SegmentMask> {
        self.mask.take()
    }

    /// 只读访问当前累积的结果集.
    ///
    /// 正常完成后集合已被整体移入结果 mask, 此处为空;
    /// 该访问器主要用于检视被取消 / 进行中的运行积累了哪些体素.
    #[inline]
    pub fn result(&self) -> &ResultSet {
        &self.result
    }

    /// 运行一次完整分割.
    ///
    /// 逐分支, 逐 interval 严格串行处理. 正常完成时返回 `true`
    /// 并物化结果 mask; 被取消时返回 `false`, 不产生结果.
    /// 重复调用会丢弃上一次的结果并重新开始.
    pub fn compute(&mut self) -> bool {
        self.state = RunState::Running;
        self.result = ResultSet::new();
        self.mask = None;

        let graph = self.graph;
        let branches = graph.branches();
        let total = (branches.len() * 100) as u32;
        self.progress.progress(0, total);

        for (bi, branch) in branches.iter().enumerate() {
            if !self.process_branch(bi, branch, total) {
                self.state = RunState::Canceled;
                self.progress.finished();
                return false;
            }
            self.progress.progress(((bi + 1) * 100) as u32, total);
        }

        self.mask = Some(SegmentMask::new(
            std::mem::take(&mut self.result),
            self.volume.shape(),
        ));
        self.state = RunState::Completed;
        self.progress.progress(0, 0);
        self.progress.finished();
        true
    }

    /// 处理一条分支: 将节点序列切分为重叠 interval 并逐个处理.
    ///
    /// 在每个 interval 边界观察取消标志;
    /// 返回 `false` 表示运行在此处被取消.
    fn process_branch(&mut self, branch_index: usize, nodes: &[NodeId], total: u32) -> bool {
        if nodes.len() < 2 {
            // 单节点分支没有边, 无事可做.
            return !self.cancel.is_canceled();
        }

        let step = self.params.nodes_per_interval - 1;
        let last = nodes.len() - 1;
        let interval_count = (last + step - 1) / step;
        let mut done = 0u32;

        // 跨 interval 边界的滑动半径记忆.
        let mut last_radius = None;

        let mut first = 0usize;
        while first < last {
            if self.cancel.is_canceled() {
                return false;
            }
            let interval_last = usize::min(first + step, last);
            self.process_interval(&nodes[first..=interval_last], &mut last_radius);

            done += 1;
            let within = done * 100 / interval_count as u32;
            self.progress
                .progress(branch_index as u32 * 100 + within, total);
            first = interval_last;
        }
        true
    }

    /// 处理单个 interval: 采样强度并计算自适应阈值, 构建走廊与种子,
    /// 运行受限区域生长并把结果并入全局结果集.
    fn process_interval(&mut self, nodes: &[NodeId], last_radius: &mut Option<f64>) {
        assert!(nodes.len() >= 2);

        let graph = self.graph;
        let volume = self.volume;

        // step 1: 在每个节点位置采样 HU 强度, 计算均值与
        //   下限为 0.5 的去偏样本标准差.
        let samples: Vec<f64> = nodes
            .iter()
            .map(|n| volume.huv_at_mm(graph.node_position(*n)))
            .collect();
        let mean = stats::mean(&samples);
        let sd = stats::floored_stddev(&samples, consts::STDDEV_FLOOR);

        // step 2: 自适应阈值下界; 上界固定为 HU 值域上界.
        let min_huv = (mean - self.params.tolerance * sd) as f32;

        // step 3: 由相邻节点对构建走廊线段与种子点.
        let raw_radii: Vec<f64> = nodes
            .iter()
            .copied()
            .tuple_windows()
            .map(|(a, b)| graph.edge_radius(a, b))
            .collect();

        let mut seeds = Vec::with_capacity(raw_radii.len());
        self.corridor.clear();
        for (i, (a, b)) in nodes.iter().copied().tuple_windows().enumerate() {
            let raw = raw_radii[i];
            let radius = if self.params.smoothed_radii {
                smooth3(*last_radius, raw, raw_radii.get(i + 1).copied())
            } else {
                raw
            };
            *last_radius = Some(raw);

            self.corridor.push(Line::between(
                graph.node_position(a),
                graph.node_position(b),
                radius * self.params.radius_multiplier,
            ));
            // 每条边的终点节点作为种子.
            if let Some(seed) = volume.mm_to_voxel(graph.node_position(b)) {
                seeds.push(seed);
            }
        }

        // step 4: 以 "尚未被认领" 为准入条件的走廊 mask 驱动区域生长.
        let grown = {
            let gate = NotYetSegmented::new(&self.result);
            let mask = ClippedMask::new(min_huv, huv::HUV_MAX, &self.corridor, &gate, volume);
            self.grower.set_neighbourhood_size(1);
            self.grower.compute(&mask, &seeds)
        };

        // step 5: 并入全局结果集. 准入接口已排除先前 interval
        //   认领过的体素, 因此同一次生长调用内出现重复即为一致性错误.
        for pos in grown.iter_voxels() {
            let fresh = self.result.insert(pos);
            assert!(fresh, "同一次区域生长调用产出了重复体素: {pos:?}");
        }
    }
}
