#![warn(missing_docs)] // <= 合适时移除它.

//! 核心库. 沿预提取的中轴骨架 (medial axis) 对 3D 血管 CT 扫描
//! (HU 值体数据) 做受限区域生长分割.
//!
//! 分割的硬核在于两部分的结合: (a) 一个几何裁剪 mask,
//! 将区域生长限制在骨架边序列周围的锥形圆柱走廊内; (b)
//! 沿骨架逐 interval 的自适应强度阈值, 由局部统计量驱动.
//! 体数据渲染, 文件加载与保存, 以及泛型区域生长算法本身均不属于本
//! crate; 后者以接口形式被驱动.
//!
//! # 注意
//!
//! 1. 骨架图 (分支, 节点位置, 边半径) 由外部骨架提取算法产生,
//!   本 crate 只读取.
//! 2. 在非期望情况下, 程序会直接 panic, 而不会导致内存错误.
//!   As what Rust promises.
//!
//! # 开发计划
//!
//! ### 走廊几何与带半径线段 ✅
//!
//! 点到线段的最小欧氏距离 (支持零长度退化线段),
//! 以及首条 "距离小于自身半径" 线段的短路扫描.
//!
//! 实现位于 `vessel-berry/src/geom.rs` 和 `vessel-berry/src/mask/clipped.rs`.
//!
//! ### 强度区间二值 mask ✅
//!
//! 实现位于 `vessel-berry/src/mask/binary.rs`.
//!
//! ### 分支 interval 分割编排器 ✅
//!
//! 分支分解为重叠 interval, 逐 interval 采样统计, 构建走廊,
//! 驱动区域生长并全局去重累积.
//!
//! 实现位于 `vessel-berry/src/segment`.
//!
//! ### 结果集与只读访问器 ✅
//!
//! 按 (x, y, z) 字典序的唯一体素集合, 以及对数复杂度的二值标量场查询.
//!
//! 实现位于 `vessel-berry/src/result.rs`.
//!
//! ### 协作式取消与进度回调 ✅
//!
//! 实现位于 `vessel-berry/src/segment/mod.rs`.

/// 三维体素索引, 按 (x, y, z) 排列. 同时也可一定程度上用作非负整数向量.
pub type Idx3d = (usize, usize, usize);

/// 毫米空间中的三维点 / 向量, 按 (x, y, z) 排列.
pub type MmVec = (f64, f64, f64);

pub mod consts;

mod volume;

pub use volume::CtVolume;

mod geom;

pub use geom::Line;

mod mask;

pub use mask::{ClippedMask, Corridor, HuvRangeMask, VolumeMask, VoxelGate};

mod graph;

pub use graph::{NodeId, SkeletonGraph, VesselGraph};

mod grow;

pub use grow::{GrownRegions, RegionGrowing};

mod result;

pub use result::{NotYetSegmented, ResultSet, SegmentMask};

pub mod segment;

pub use segment::{
    CancelToken, ProgressSink, RunState, SegmentParams, SilentProgress, VesselSegmenter,
};

pub mod prelude;
