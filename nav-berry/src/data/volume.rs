//! 三维标签体.

use super::LabelSlice;
use crate::{Idx3d, NavError, NavResult};
use ndarray::{s, Array3, ArrayView3, Axis};

/// 拥有所有权的三维标签体 (例如分割网络输出的整段扫描).
///
/// 构造时保证三个维度都大于 0.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelVolume {
    data: Array3<u8>,
}

impl LabelVolume {
    /// 接管 `data`. 任一维度为 0 时返回 `InvalidArgument`.
    pub fn new(data: Array3<u8>) -> NavResult<Self> {
        if data.is_empty() {
            return Err(NavError::invalid(format!(
                "label volume must not be empty, got shape {:?}",
                data.shape()
            )));
        }
        Ok(Self { data })
    }

    /// 数据形状.
    #[inline]
    pub fn shape(&self) -> Idx3d {
        self.data.dim()
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView3<'_, u8> {
        self.data.view()
    }

    /// 直接获得底层数据.
    #[inline]
    pub fn into_raw(self) -> Array3<u8> {
        self.data
    }

    /// 沿 `axis` 轴的切片个数. `axis` 越界时 panic.
    #[inline]
    pub fn len_of(&self, axis: usize) -> usize {
        self.data.len_of(Axis(axis))
    }

    /// 获取沿 `axis` 轴的第 `index` 个二维切片.
    ///
    /// `axis >= 3` 或 `index` 越界时返回 `InvalidArgument`.
    pub fn slice_at(&self, axis: usize, index: usize) -> NavResult<LabelSlice<'_>> {
        if axis >= 3 {
            return Err(NavError::invalid(format!("axis {axis} out of range for a volume")));
        }
        let len = self.len_of(axis);
        if index >= len {
            return Err(NavError::invalid(format!(
                "slice {index} out of range, axis {axis} has {len} slices"
            )));
        }
        Ok(LabelSlice::new_unchecked(
            self.data.index_axis(Axis(axis), index),
        ))
    }

    /// 补零为立方体: 每个维度都补到最大维度.
    ///
    /// 两侧补零量不等时, 前侧取较小的一半 (`(max - n) / 2`).
    pub fn pad_to_cube(&self) -> LabelVolume {
        let (a, b, c) = self.shape();
        let m = a.max(b).max(c);
        let lead = |n: usize| (m - n) / 2;
        let (la, lb, lc) = (lead(a), lead(b), lead(c));

        let mut padded = Array3::<u8>::zeros((m, m, m));
        padded
            .slice_mut(s![la..la + a, lb..lb + b, lc..lc + c])
            .assign(&self.data);
        log::debug!("padded volume ({a}, {b}, {c}) to ({m}, {m}, {m})");
        LabelVolume { data: padded }
    }

    /// 从 `start` 开始, 以 `lap` 为步长向 0 递减挑选切片索引 (不含 0),
    /// 最多 `max` 个.
    ///
    /// `lap == 0` 时返回 `InvalidArgument`.
    pub fn strided_indices(start: usize, lap: usize, max: usize) -> NavResult<Vec<usize>> {
        if lap == 0 {
            return Err(NavError::invalid("lap must be at least 1"));
        }
        Ok((1..=start).rev().step_by(lap).take(max).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn test_pad_to_cube() {
        let mut raw = Array3::<u8>::zeros((2, 5, 3));
        raw[(1, 4, 2)] = 7;
        let v = LabelVolume::new(raw).unwrap().pad_to_cube();
        assert_eq!(v.shape(), (5, 5, 5));
        // 前侧补零: (5 - 2) / 2 = 1, 0, (5 - 3) / 2 = 1.
        assert_eq!(v.data()[(2, 4, 3)], 7);
        assert_eq!(v.data().iter().filter(|&&p| p != 0).count(), 1);
    }

    #[test]
    fn test_slice_at() {
        let mut raw = Array3::<u8>::zeros((2, 3, 4));
        raw[(1, 2, 3)] = 5;
        let v = LabelVolume::new(raw).unwrap();
        assert_eq!(v.slice_at(0, 1).unwrap()[(2, 3)], 5);
        assert_eq!(v.slice_at(1, 2).unwrap().shape(), (2, 4));
        assert_eq!(v.slice_at(2, 3).unwrap()[(1, 2)], 5);
        assert!(v.slice_at(3, 0).is_err());
        assert!(v.slice_at(0, 2).is_err());
    }

    #[test]
    fn test_empty_volume_rejected() {
        assert!(LabelVolume::new(Array3::zeros((0, 3, 3))).is_err());
    }

    #[test]
    fn test_strided_indices() {
        assert_eq!(LabelVolume::strided_indices(10, 3, 100).unwrap(), [10, 7, 4, 1]);
        assert_eq!(LabelVolume::strided_indices(10, 3, 2).unwrap(), [10, 7]);
        assert_eq!(LabelVolume::strided_indices(6, 3, 5).unwrap(), [6, 3]);
        assert!(LabelVolume::strided_indices(0, 1, 5).unwrap().is_empty());
        assert!(LabelVolume::strided_indices(5, 0, 5).is_err());
    }
}
