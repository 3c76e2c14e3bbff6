//! 合成腕部切面 (phantom).
//!
//! 所有结构都是 3x3 的方块, 相邻方块之间至少隔 2 个背景像素, 因此无论
//! 4-邻接, 8-邻接还是 `eps < 3` 的 DBSCAN, 每个方块都恰好是一个簇.
//!
//! 布局 (沿宽方向分为三条带):
//!
//! ```text
//! 未翻转:  骨 | 肌腱 | 尺动脉        翻转:  尺动脉 | 肌腱 | 骨
//! ```
//!
//! 同一条带内的方块沿高方向依次排列. 尺动脉 "错位" 时, 它被放到骨所在的带,
//! 排在所有骨之后.

use crate::consts::label;
use crate::OwnedLabelSlice;
use ndarray::{s, Array2};

/// 方块边长.
const BLOB: usize = 3;

/// 相邻方块左上角之间的距离.
const PITCH: usize = BLOB + 2;

/// 图像边缘留白.
const MARGIN: usize = 2;

/// 三条带的左边界 (宽方向).
const BANDS: [usize; 3] = [MARGIN, MARGIN + 7, MARGIN + 14];

/// 合成切面的构造器.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PlanePhantom {
    bones: usize,
    tendons: usize,
    ulnar: usize,
    flipped: bool,
    ulnar_misplaced: bool,
}

impl PlanePhantom {
    /// 标准切面: 7 块骨, 2 条肌腱, 1 条尺动脉, 位置正确.
    #[inline]
    pub const fn standard() -> Self {
        Self {
            bones: crate::consts::STANDARD_BONES,
            tendons: crate::consts::STANDARD_TENDONS,
            ulnar: crate::consts::STANDARD_ULNAR,
            flipped: false,
            ulnar_misplaced: false,
        }
    }

    /// 设置骨的个数.
    #[inline]
    pub const fn bones(mut self, n: usize) -> Self {
        self.bones = n;
        self
    }

    /// 设置肌腱的个数.
    #[inline]
    pub const fn tendons(mut self, n: usize) -> Self {
        self.tendons = n;
        self
    }

    /// 设置尺动脉的个数.
    #[inline]
    pub const fn ulnar(mut self, n: usize) -> Self {
        self.ulnar = n;
        self
    }

    /// 是否沿宽方向镜像 (骨在肌腱 "之上").
    #[inline]
    pub const fn flipped(mut self, yes: bool) -> Self {
        self.flipped = yes;
        self
    }

    /// 是否把尺动脉放到骨的一侧 (解剖学上错误的位置).
    #[inline]
    pub const fn ulnar_misplaced(mut self, yes: bool) -> Self {
        self.ulnar_misplaced = yes;
        self
    }

    /// 生成标签切片. 像素值取自 [`label`].
    pub fn render(&self) -> OwnedLabelSlice {
        let slots = (self.bones + self.ulnar).max(self.tendons).max(1);
        let height = 2 * MARGIN + PITCH * slots;
        let width = BANDS[2] + BLOB + MARGIN;
        let mut data = Array2::<u8>::zeros((height, width));

        let (bone_band, ulnar_band) = if self.flipped {
            (BANDS[2], BANDS[0])
        } else {
            (BANDS[0], BANDS[2])
        };
        let (ulnar_band, ulnar_first_slot) = if self.ulnar_misplaced {
            (bone_band, self.bones)
        } else {
            (ulnar_band, 0)
        };

        let mut put = |slot: usize, band: usize, code: u8| {
            let h = MARGIN + slot * PITCH;
            data.slice_mut(s![h..h + BLOB, band..band + BLOB]).fill(code);
        };
        (0..self.bones).for_each(|i| put(i, bone_band, label::BONES));
        (0..self.tendons).for_each(|i| put(i, BANDS[1], label::TENDONS));
        (0..self.ulnar).for_each(|i| put(ulnar_first_slot + i, ulnar_band, label::ULNAR));

        OwnedLabelSlice::new_unchecked(data)
    }
}

impl Default for PlanePhantom {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_counts() {
        let ph = PlanePhantom::standard().render();
        let s = ph.as_immut();
        assert_eq!(s.count(label::BONES), 7 * BLOB * BLOB);
        assert_eq!(s.count(label::TENDONS), 2 * BLOB * BLOB);
        assert_eq!(s.count(label::ULNAR), BLOB * BLOB);
    }

    #[test]
    fn test_empty_phantom_is_background() {
        let ph = PlanePhantom::standard().bones(0).tendons(0).ulnar(0).render();
        assert!(ph.as_immut().is_background());
    }

    #[test]
    fn test_flip_mirrors_width() {
        let a = PlanePhantom::standard().render().into_raw();
        let b = PlanePhantom::standard().flipped(true).render().into_raw();
        assert_eq!(a.slice(s![.., ..;-1]), b);
    }
}
