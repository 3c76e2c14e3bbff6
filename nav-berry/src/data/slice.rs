//! 二维标签切片.

use crate::consts::label::is_background;
use crate::{Idx2d, NavError, NavResult};
use ndarray::iter::Iter;
use ndarray::{Array2, ArrayView2, ArrayViewD, Ix2};
use std::ops::Index;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 不可变、借用的二维标签切片.
///
/// 每个像素是一个小的非负整数组织编码. 构造时保证切片非空 (高和宽都大于 0).
#[derive(Clone, Copy, Debug)]
pub struct LabelSlice<'a> {
    /// 底层数据的轻量级视图.
    data: ArrayView2<'a, u8>,
}

impl Index<Idx2d> for LabelSlice<'_> {
    type Output = u8;

    #[inline]
    fn index(&self, index: Idx2d) -> &Self::Output {
        &self.data[index]
    }
}

impl<'a> LabelSlice<'a> {
    /// 从二维视图构造切片. 如果高或宽为 0, 则返回 `InvalidArgument`.
    pub fn new(data: ArrayView2<'a, u8>) -> NavResult<Self> {
        let (h, w) = data.dim();
        if h == 0 || w == 0 {
            return Err(NavError::invalid(format!(
                "label slice must not be empty, got shape ({h}, {w})"
            )));
        }
        Ok(Self { data })
    }

    /// 内部构造, 调用方保证 `data` 非空.
    #[inline]
    pub(crate) fn new_unchecked(data: ArrayView2<'a, u8>) -> Self {
        debug_assert!(!data.is_empty());
        Self { data }
    }

    /// 获得 **底层** 数据的一份不可变 shallow copy.
    #[inline]
    pub fn array_view(&self) -> ArrayView2<'a, u8> {
        self.data
    }

    /// 获取可以迭代图像像素的迭代器.
    #[inline]
    pub fn iter(&self) -> Iter<'a, u8, Ix2> {
        self.data.into_iter()
    }

    /// 获取给定位置 (高, 宽) 的像素值. 越界时返回 `None`.
    #[inline]
    pub fn get(&self, pos: Idx2d) -> Option<&u8> {
        self.data.get(pos)
    }

    /// 图像的分辨率 (高, 宽).
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.data.dim()
    }

    /// 图像的像素个数.
    #[inline]
    pub fn size(&self) -> usize {
        let (h, w) = self.shape();
        h * w
    }

    /// 获得图像的高.
    #[inline]
    pub fn height(&self) -> usize {
        self.shape().0
    }

    /// 获得图像的宽.
    #[inline]
    pub fn width(&self) -> usize {
        self.shape().1
    }

    /// 判断一个索引是否合法 (未越界).
    #[inline]
    pub fn check(&self, (h, w): Idx2d) -> bool {
        let (h_len, w_len) = self.shape();
        h < h_len && w < w_len
    }

    /// 该图是否为全背景图?
    #[inline]
    pub fn is_background(&self) -> bool {
        self.iter().copied().all(is_background)
    }

    /// 统计图像中值为 `label` 的像素总个数.
    #[inline]
    pub fn count(&self, label: u8) -> usize {
        self.iter().filter(|&&p| p == label).count()
    }

    /// 图像中是否存在值为 `label` 的像素?
    #[inline]
    pub fn contains(&self, label: u8) -> bool {
        self.iter().any(|&p| p == label)
    }

    /// 以行优先规则, 获取所有值为 `label` 的像素索引.
    pub fn positions_of<B: FromIterator<Idx2d>>(&self, label: u8) -> B {
        self.indexed_iter()
            .filter_map(|(pos, &pix)| (pix == label).then_some(pos))
            .collect()
    }

    /// 以行优先规则, 获取能迭代图像所有 `(索引, 像素值)` 的迭代器.
    #[inline]
    pub fn indexed_iter(&self) -> impl Iterator<Item = (Idx2d, &u8)> {
        self.data.indexed_iter()
    }

    /// 克隆自己, 获得一个拥有所有权的切片对象.
    pub fn to_owned(&self) -> OwnedLabelSlice {
        OwnedLabelSlice {
            data: self.data.to_owned(),
        }
    }
}

/// 从任意维度的视图构造切片. 维度不是 2 或切片为空时返回 `InvalidArgument`.
impl<'a> TryFrom<ArrayViewD<'a, u8>> for LabelSlice<'a> {
    type Error = NavError;

    fn try_from(value: ArrayViewD<'a, u8>) -> Result<Self, Self::Error> {
        let ndim = value.ndim();
        let data = value.into_dimensionality::<Ix2>().map_err(|_| {
            NavError::invalid(format!("label slice must be 2-dimensional, got {ndim} axes"))
        })?;
        Self::new(data)
    }
}

/// 拥有所有权的二维标签切片.
///
/// `OwnedLabelSlice` 仅提供到 `LabelSlice` 的轻量转换和底层数据移动, 不提供任何其它方法.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawLabelSlice"))]
#[derive(Clone, Debug, PartialEq)]
pub struct OwnedLabelSlice {
    data: Array2<u8>,
}

/// 反序列化时先得到未校验的数组, 再走 `OwnedLabelSlice::new`.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawLabelSlice {
    data: Array2<u8>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawLabelSlice> for OwnedLabelSlice {
    type Error = NavError;

    fn try_from(v: RawLabelSlice) -> Result<Self, Self::Error> {
        Self::new(v.data)
    }
}

impl OwnedLabelSlice {
    /// 接管 `data`. 如果高或宽为 0, 则返回 `InvalidArgument`.
    pub fn new(data: Array2<u8>) -> NavResult<Self> {
        LabelSlice::new(data.view())?;
        Ok(Self { data })
    }

    /// 内部构造, 调用方保证 `data` 非空.
    #[inline]
    pub(crate) fn new_unchecked(data: Array2<u8>) -> Self {
        debug_assert!(!data.is_empty());
        Self { data }
    }

    /// 按行优先序列 `buf` 构造 `(h, w)` 切片. 长度不符时返回 `InvalidArgument`.
    pub fn from_row_major((h, w): Idx2d, buf: Vec<u8>) -> NavResult<Self> {
        let len = buf.len();
        let data = Array2::from_shape_vec((h, w), buf).map_err(|_| {
            NavError::invalid(format!("{len} pixels cannot form a ({h}, {w}) slice"))
        })?;
        Self::new(data)
    }

    /// 获得不可变切片引用.
    #[inline]
    pub fn as_immut(&self) -> LabelSlice<'_> {
        LabelSlice::new_unchecked(self.data.view())
    }

    /// 直接获得底层数据.
    #[inline]
    pub fn into_raw(self) -> Array2<u8> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array3};

    #[test]
    fn test_empty_slice_rejected() {
        let a = Array2::<u8>::zeros((0, 4));
        assert!(matches!(
            LabelSlice::new(a.view()),
            Err(NavError::InvalidArgument(_))
        ));
        assert!(OwnedLabelSlice::new(Array2::zeros((3, 0))).is_err());
    }

    #[test]
    fn test_non_2d_rejected() {
        let v = Array3::<u8>::zeros((2, 2, 2));
        let r = LabelSlice::try_from(v.view().into_dyn());
        assert!(matches!(r, Err(NavError::InvalidArgument(_))));

        let ok = Array2::<u8>::ones((2, 3));
        let s = LabelSlice::try_from(ok.view().into_dyn()).unwrap();
        assert_eq!(s.shape(), (2, 3));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_validates_shape() {
        let ok = OwnedLabelSlice::from_row_major((1, 2), vec![1, 0]).unwrap();
        let json = serde_json::to_string(&ok).unwrap();
        let back: OwnedLabelSlice = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ok);

        let empty = serde_json::to_string(&Array2::<u8>::zeros((0, 3))).unwrap();
        let r = serde_json::from_str::<OwnedLabelSlice>(&format!(r#"{{"data": {empty}}}"#));
        assert!(r.is_err());
    }

    #[test]
    fn test_row_major_length_mismatch() {
        assert!(OwnedLabelSlice::from_row_major((2, 2), vec![0; 5]).is_err());
        let s = OwnedLabelSlice::from_row_major((2, 2), vec![0, 1, 1, 0]).unwrap();
        assert_eq!(s.as_immut()[(1, 0)], 1);
    }

    #[test]
    fn test_basic_queries() {
        let a = array![[0u8, 1, 1], [2, 0, 1]];
        let s = LabelSlice::new(a.view()).unwrap();
        assert_eq!(s.size(), 6);
        assert_eq!(s.count(1), 3);
        assert!(s.contains(2));
        assert!(!s.contains(7));
        assert!(!s.is_background());
        assert!(s.check((1, 2)));
        assert!(!s.check((2, 0)));
        let p: Vec<_> = s.positions_of(1);
        assert_eq!(p, vec![(0, 1), (0, 2), (1, 2)]);
    }
}
