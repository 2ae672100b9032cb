//! 血管骨架图 (外部输入) 的数据模型.

use std::collections::HashMap;

use itertools::Itertools;

use crate::MmVec;

/// 骨架图节点编号.
pub type NodeId = usize;

/// 血管骨架图服务.
///
/// 分割器只读取该接口: 分支的有序节点序列, 节点的毫米位置,
/// 以及相邻节点对之间的边半径. 图本身由外部骨架提取算法产生.
pub trait VesselGraph {
    /// 所有分支, 每条分支为有序节点序列.
    fn branches(&self) -> &[Vec<NodeId>];

    /// 节点在体数据毫米空间中的位置.
    fn node_position(&self, node: NodeId) -> MmVec;

    /// 相邻节点 `a`, `b` 之间边的半径 (单位: 毫米, 恒为正).
    ///
    /// 查询与节点顺序无关. 不存在的边导致 panic.
    fn edge_radius(&self, a: NodeId, b: NodeId) -> f64;
}

/// [`VesselGraph`] 的直接容器实现, 由调用方逐分支填充.
#[derive(Debug, Clone, Default)]
pub struct SkeletonGraph {
    positions: Vec<MmVec>,
    branches: Vec<Vec<NodeId>>,
    radii: HashMap<(NodeId, NodeId), f64>,
}

impl SkeletonGraph {
    /// 创建空图.
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加节点并返回其编号. `position` 以毫米为单位.
    pub fn push_node(&mut self, position: MmVec) -> NodeId {
        self.positions.push(position);
        self.positions.len() - 1
    }

    /// 添加一条分支. `nodes` 为有序节点序列, `radii`
    /// 为相邻节点对之间的边半径.
    ///
    /// # 注意
    ///
    /// `nodes` 长度必须至少为 2, `radii` 长度必须比 `nodes` 少 1,
    /// 所有节点编号必须已存在, 所有半径必须为正, 否则程序 panic.
    pub fn push_branch(&mut self, nodes: Vec<NodeId>, radii: &[f64]) {
        assert!(nodes.len() >= 2);
        assert_eq!(radii.len() + 1, nodes.len());
        assert!(nodes.iter().all(|n| *n < self.positions.len()));
        assert!(radii.iter().all(|r| *r > 0.0));

        for ((a, b), r) in nodes.iter().copied().tuple_windows().zip(radii) {
            self.radii.insert(Self::key(a, b), *r);
        }
        self.branches.push(nodes);
    }

    /// 节点个数.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.positions.len()
    }

    /// 无序节点对规范化.
    #[inline]
    fn key(a: NodeId, b: NodeId) -> (NodeId, NodeId) {
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }
}

impl VesselGraph for SkeletonGraph {
    #[inline]
    fn branches(&self) -> &[Vec<NodeId>] {
        &self.branches
    }

    #[inline]
    fn node_position(&self, node: NodeId) -> MmVec {
        self.positions[node]
    }

    #[inline]
    fn edge_radius(&self, a: NodeId, b: NodeId) -> f64 {
        self.radii[&Self::key(a, b)]
    }
}
