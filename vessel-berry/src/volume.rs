//! 3D CT 扫描体数据与坐标转换.

use std::ops::Index;

use ndarray::{Array3, ArrayView, Ix3};

use crate::consts::huv;
use crate::{Idx3d, MmVec};

/// 3D CT 扫描 (HU 值体数据), 附带体素分辨率信息.
///
/// 数据内部以 `[z, y, x]` 顺序存储, 对外均以 `(x, y, z)` 索引访问.
/// 在一次分割运行期间该结构是只读的.
#[derive(Debug, Clone)]
pub struct CtVolume {
    data: Array3<f32>,
    /// 以毫米为单位的体素分辨率, 按 (x, y, z) 排列.
    pix_dim: [f64; 3],
}

impl Index<Idx3d> for CtVolume {
    type Output = f32;

    #[inline]
    fn index(&self, (x, y, z): Idx3d) -> &Self::Output {
        &self.data[[z, y, x]]
    }
}

impl CtVolume {
    /// 从裸数据直接创建体数据.
    ///
    /// `data` 按 `[z, y, x]` 组织; `pix_dim_mm` 为三个方向的体素分辨率
    /// (单位: 毫米), 按 (x, y, z) 排列.
    ///
    /// # 注意
    ///
    /// 分辨率必须为正, 否则程序 panic. 所有 HU 值必须落在
    /// \[-1024, 3071\] 范围内, 否则后续访问时 panic.
    pub fn new(data: Array3<f32>, pix_dim_mm: [f64; 3]) -> Self {
        assert!(pix_dim_mm.iter().all(|d| *d > 0.0));
        debug_assert!(data.iter().copied().all(huv::in_domain));
        Self {
            data,
            pix_dim: pix_dim_mm,
        }
    }

    /// 获取数据形状, 按 (x, y, z) 排列.
    #[inline]
    pub fn shape(&self) -> Idx3d {
        let &[d, h, w] = self.data.shape() else {
            unreachable!()
        };
        (w, h, d)
    }

    /// 获取体素个数.
    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// 检查索引是否合法.
    #[inline]
    pub fn check(&self, (x0, y0, z0): &Idx3d) -> bool {
        let (x, y, z) = self.shape();
        *x0 < x && *y0 < y && *z0 < z
    }

    /// 读取体素的 HU 值.
    ///
    /// 索引越界或值落在 \[-1024, 3071\] 之外时 panic.
    #[inline]
    pub fn huv(&self, (x, y, z): Idx3d) -> f32 {
        let val = self.data[[z, y, x]];
        assert!(huv::in_domain(val));
        val
    }

    /// 将行优先一维索引 (`index = z*(w*h) + y*w + x`) 转换为三维索引.
    ///
    /// `index` 越界时 panic.
    #[inline]
    pub fn delinearize(&self, index: usize) -> Idx3d {
        assert!(index < self.size());
        let (w, h, _) = self.shape();
        (index % w, (index / w) % h, index / (w * h))
    }

    /// 获取体素分辨率, 按 (x, y, z) 排列, 单位为毫米.
    #[inline]
    pub fn pix_dim(&self) -> [f64; 3] {
        self.pix_dim
    }

    /// 获取体素的实际体积值, 以立方毫米为单位.
    #[inline]
    pub fn voxel_mm3(&self) -> f64 {
        self.pix_dim.iter().product()
    }

    /// 将体素索引转换为毫米空间坐标.
    #[inline]
    pub fn voxel_to_mm(&self, (x, y, z): Idx3d) -> MmVec {
        let [xm, ym, zm] = self.pix_dim;
        (x as f64 * xm, y as f64 * ym, z as f64 * zm)
    }

    /// 将毫米空间坐标四舍五入转换为体素索引.
    ///
    /// 坐标为负或越界时返回 `None`.
    pub fn mm_to_voxel(&self, (x, y, z): MmVec) -> Option<Idx3d> {
        let [xm, ym, zm] = self.pix_dim;
        let (vx, vy, vz) = ((x / xm).round(), (y / ym).round(), (z / zm).round());
        if vx < 0.0 || vy < 0.0 || vz < 0.0 {
            return None;
        }
        let pos = (vx as usize, vy as usize, vz as usize);
        self.check(&pos).then_some(pos)
    }

    /// 在毫米空间的连续位置对 HU 值做三线性插值采样.
    ///
    /// 位置超出体数据包围盒时 panic.
    pub fn huv_at_mm(&self, (x, y, z): MmVec) -> f64 {
        let [xm, ym, zm] = self.pix_dim;
        let (w, h, d) = self.shape();
        let (fx, fy, fz) = (x / xm, y / ym, z / zm);
        assert!(
            (0.0..=(w - 1) as f64).contains(&fx)
                && (0.0..=(h - 1) as f64).contains(&fy)
                && (0.0..=(d - 1) as f64).contains(&fz),
            "采样位置超出体数据范围"
        );

        let (x0, y0, z0) = (fx.floor() as usize, fy.floor() as usize, fz.floor() as usize);
        let (x1, y1, z1) = ((x0 + 1).min(w - 1), (y0 + 1).min(h - 1), (z0 + 1).min(d - 1));
        let (tx, ty, tz) = (fx - x0 as f64, fy - y0 as f64, fz - z0 as f64);

        let at = |xi: usize, yi: usize, zi: usize| self.data[[zi, yi, xi]] as f64;
        let lerp = |a: f64, b: f64, t: f64| a + (b - a) * t;

        let c00 = lerp(at(x0, y0, z0), at(x1, y0, z0), tx);
        let c10 = lerp(at(x0, y1, z0), at(x1, y1, z0), tx);
        let c01 = lerp(at(x0, y0, z1), at(x1, y0, z1), tx);
        let c11 = lerp(at(x0, y1, z1), at(x1, y1, z1), tx);
        lerp(lerp(c00, c10, ty), lerp(c01, c11, ty), tz)
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView<'_, f32, Ix3> {
        self.data.view()
    }
}

#[cfg(test)]
mod tests {
    use ndarray::Array3;

    use super::CtVolume;

    fn ramp_volume() -> CtVolume {
        // HU 值沿 x 方向线性增长: huv = 10 * x.
        let data = Array3::from_shape_fn((4, 4, 4), |(_, _, x)| 10.0 * x as f32);
        CtVolume::new(data, [1.0, 1.0, 1.0])
    }

    #[test]
    fn test_shape_and_check() {
        let data = Array3::zeros((2, 3, 4)); // [z, y, x]
        let vol = CtVolume::new(data, [1.0, 1.0, 1.0]);
        assert_eq!(vol.shape(), (4, 3, 2));
        assert_eq!(vol.size(), 24);
        assert!(vol.check(&(3, 2, 1)));
        assert!(!vol.check(&(4, 0, 0)));
        assert!(!vol.check(&(0, 3, 0)));
        assert!(!vol.check(&(0, 0, 2)));
    }

    #[test]
    fn test_delinearize_roundtrip() {
        let vol = CtVolume::new(Array3::zeros((3, 4, 5)), [1.0, 1.0, 1.0]);
        let (w, h, d) = vol.shape();
        for z in 0..d {
            for y in 0..h {
                for x in 0..w {
                    let flat = z * (w * h) + y * w + x;
                    assert_eq!(vol.delinearize(flat), (x, y, z));
                }
            }
        }
    }

    #[test]
    fn test_mm_conversion() {
        let vol = CtVolume::new(Array3::zeros((8, 8, 8)), [0.5, 1.0, 2.0]);
        assert_eq!(vol.voxel_to_mm((4, 2, 3)), (2.0, 2.0, 6.0));
        assert_eq!(vol.mm_to_voxel((2.0, 2.0, 6.0)), Some((4, 2, 3)));
        // 四舍五入.
        assert_eq!(vol.mm_to_voxel((2.2, 2.4, 6.9)), Some((4, 2, 3)));
        // 越界与负坐标.
        assert_eq!(vol.mm_to_voxel((4.0, 0.0, 0.0)), None);
        assert_eq!(vol.mm_to_voxel((-0.3, 0.0, 0.0)), None);
    }

    #[test]
    fn test_trilinear_sampling() {
        let vol = ramp_volume();
        // 格点处与体素值一致.
        assert_eq!(vol.huv_at_mm((2.0, 1.0, 1.0)), 20.0);
        // x 方向中点插值.
        assert!((vol.huv_at_mm((1.5, 2.0, 2.0)) - 15.0).abs() < 1e-9);
        // 非轴向中点.
        assert!((vol.huv_at_mm((0.5, 0.5, 0.5)) - 5.0).abs() < 1e-9);
    }

    #[test]
    #[should_panic]
    fn test_sampling_out_of_bounds() {
        let vol = ramp_volume();
        vol.huv_at_mm((3.5, 0.0, 0.0));
    }

    #[test]
    fn test_voxel_mm3() {
        let vol = CtVolume::new(Array3::zeros((2, 2, 2)), [0.5, 0.5, 2.0]);
        assert!((vol.voxel_mm3() - 0.5).abs() < 1e-12);
    }
}
