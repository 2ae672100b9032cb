//! interval 自适应统计量.

use num::Float;

/// 计算样本均值.
///
/// `samples` 必须非空, 否则程序 panic.
pub(crate) fn mean<T: Float>(samples: &[T]) -> T {
    assert!(!samples.is_empty());
    let sum = samples.iter().fold(T::zero(), |acc, s| acc + *s);
    sum / T::from(samples.len()).unwrap()
}

/// 计算样本标准差 (去偏公式, 平方偏差和除以 `n - 1`),
/// 并以 `floor` 为下限.
///
/// `samples` 长度必须至少为 2, 否则程序 panic.
pub(crate) fn floored_stddev<T: Float>(samples: &[T], floor: T) -> T {
    assert!(samples.len() >= 2);
    let m = mean(samples);
    let ssd = samples.iter().fold(T::zero(), |acc, s| {
        let d = *s - m;
        acc + d * d
    });
    let sd = (ssd / T::from(samples.len() - 1).unwrap()).sqrt();
    sd.max(floor)
}
