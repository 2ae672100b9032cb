//! 毫米空间的基础几何运算.

use crate::MmVec;

/// `a + b`.
#[inline]
pub(crate) fn add((a, b, c): MmVec, (x, y, z): MmVec) -> MmVec {
    (a + x, b + y, c + z)
}

/// `a - b`.
#[inline]
pub(crate) fn sub((a, b, c): MmVec, (x, y, z): MmVec) -> MmVec {
    (a - x, b - y, c - z)
}

/// `k * a`.
#[inline]
pub(crate) fn scale((a, b, c): MmVec, k: f64) -> MmVec {
    (k * a, k * b, k * c)
}

/// 点积.
#[inline]
pub(crate) fn dot((a, b, c): MmVec, (x, y, z): MmVec) -> f64 {
    a * x + b * y + c * z
}

/// 模长平方.
#[inline]
pub(crate) fn norm_sq(v: MmVec) -> f64 {
    dot(v, v)
}

/// 模长.
#[inline]
pub(crate) fn norm(v: MmVec) -> f64 {
    norm_sq(v).sqrt()
}

/// 带半径的线段: 支撑点 `support`, 方向向量 `way` 与半径 `radius`.
///
/// 表示一段锥形圆柱走廊. 所有分量单位均为毫米.
#[derive(Debug, Clone, Copy)]
pub struct Line {
    support: MmVec,
    way: MmVec,
    radius: f64,
}

impl Line {
    /// 创建线段. `radius` 必须为正, 否则程序 panic.
    ///
    /// `way` 允许为零向量 (线段退化为点), 此时距离计算退化为到
    /// `support` 的距离.
    pub fn new(support: MmVec, way: MmVec, radius: f64) -> Self {
        assert!(radius > 0.0);
        Self {
            support,
            way,
            radius,
        }
    }

    /// 以两个端点创建线段.
    #[inline]
    pub fn between(from: MmVec, to: MmVec, radius: f64) -> Self {
        Self::new(from, sub(to, from), radius)
    }

    /// 支撑点.
    #[inline]
    pub fn support(&self) -> MmVec {
        self.support
    }

    /// 方向向量.
    #[inline]
    pub fn way(&self) -> MmVec {
        self.way
    }

    /// 线段半径.
    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// 计算点 `p` 到该 **线段** (而非无限直线) 的最小欧氏距离.
    ///
    /// 投影落在支撑点之前时取到支撑点的距离, 落在远端点之后时取到
    /// 远端点的距离. `way` 为零向量时退化为到支撑点的距离,
    /// 不会产生除零 / NaN.
    pub fn distance_to(&self, p: MmVec) -> f64 {
        let d = sub(self.support, p);
        let w = self.way;
        let ww = dot(w, w);
        if ww == 0.0 {
            // 退化线段: 直接取到支撑点的距离.
            return norm(d);
        }
        let t_vec = scale(w, dot(d, w) / ww);
        if dot(t_vec, w) > 0.0 {
            // 投影落在支撑点之前.
            norm(d)
        } else if norm_sq(t_vec) <= ww {
            // 投影落在线段内部.
            norm(sub(d, t_vec))
        } else {
            // 投影落在远端点之后.
            norm(add(d, w))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Line;

    fn float_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_segment_distance() {
        let line = Line::new((0.0, 0.0, 0.0), (10.0, 0.0, 0.0), 1.0);
        // 线段内部.
        assert!(float_eq(line.distance_to((5.0, 0.0, 0.0)), 0.0));
        // 投影落在支撑点之前.
        assert!(float_eq(line.distance_to((-1.0, 0.0, 0.0)), 1.0));
        // 投影落在远端点之后.
        assert!(float_eq(line.distance_to((15.0, 0.0, 0.0)), 5.0));
        // 垂直偏移.
        assert!(float_eq(line.distance_to((5.0, 0.0, 1.0)), 1.0));
        // 端点处.
        assert!(float_eq(line.distance_to((10.0, 3.0, 0.0)), 3.0));
    }

    #[test]
    fn test_degenerate_segment() {
        let line = Line::new((1.0, 2.0, 3.0), (0.0, 0.0, 0.0), 1.0);
        let d = line.distance_to((1.0, 2.0, 7.0));
        assert!(d.is_finite());
        assert!(float_eq(d, 4.0));
        assert!(float_eq(line.distance_to((1.0, 2.0, 3.0)), 0.0));
    }

    #[test]
    fn test_between() {
        let line = Line::between((1.0, 1.0, 1.0), (1.0, 4.0, 1.0), 2.0);
        assert_eq!(line.support(), (1.0, 1.0, 1.0));
        assert_eq!(line.way(), (0.0, 3.0, 0.0));
        assert!(float_eq(line.distance_to((1.0, 2.5, 1.0)), 0.0));
        assert!(float_eq(line.distance_to((2.0, 2.5, 1.0)), 1.0));
    }

    #[test]
    #[should_panic]
    fn test_non_positive_radius() {
        let _ = Line::new((0.0, 0.0, 0.0), (1.0, 0.0, 0.0), 0.0);
    }
}
