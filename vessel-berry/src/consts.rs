//! 通用常量与默认参数.

/// CT HU 值域 (Hounsfield-unit 惯例).
pub mod huv {
    /// HU 值域下界.
    pub const HUV_MIN: f32 = -1024.0;

    /// HU 值域上界.
    pub const HUV_MAX: f32 = 3071.0;

    /// HU 值是否落在值域内?
    #[inline]
    pub fn in_domain(huv: f32) -> bool {
        (HUV_MIN..=HUV_MAX).contains(&huv)
    }
}

/// 默认强度容差: 自适应阈值允许偏离均值的标准差倍数.
pub const DEFAULT_TOLERANCE: f64 = 2.0;

/// 默认每 interval 节点数.
pub const DEFAULT_NODES_PER_INTERVAL: usize = 5;

/// 默认边半径放大系数.
pub const DEFAULT_RADIUS_MULTIPLIER: f64 = 1.0;

/// 样本标准差下限, 用于避免退化的零宽度阈值区间.
pub const STDDEV_FLOOR: f64 = 0.5;
