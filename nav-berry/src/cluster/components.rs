//! 连通域提取.

use crate::{Area2d, Areas2d, Idx2d, LabelSlice};
use ndarray::Array2;
use std::collections::VecDeque;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 像素邻接规则.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Connectivity {
    /// 4-邻接 (上下左右). 与常见连通域标记算法的默认结构元一致.
    #[default]
    Four,

    /// 8-邻接 (含对角).
    Eight,
}

impl Connectivity {
    /// 对 `pos` 的每个邻居调用 `f`. 不检查越界: 越过上/左边界的索引会回绕为
    /// `usize::MAX` 附近的值, 调用方应当用 `get` 过滤.
    #[inline]
    pub(crate) fn for_each_neighbour(self, pos: Idx2d, mut f: impl FnMut(Idx2d)) {
        match self {
            Self::Four => neighbour4(pos).into_iter().for_each(&mut f),
            Self::Eight => neighbour8(pos).into_iter().for_each(&mut f),
        }
    }
}

/// 获得 `(h, w)` 的 4-邻居索引. 不检查越界.
#[inline]
fn neighbour4((h, w): Idx2d) -> [Idx2d; 4] {
    [
        (h.wrapping_sub(1), w),
        (h.saturating_add(1), w),
        (h, w.wrapping_sub(1)),
        (h, w.saturating_add(1)),
    ]
}

/// 获得 `(h, w)` 的 8-邻居索引. 不检查越界.
#[inline]
fn neighbour8((h, w): Idx2d) -> [Idx2d; 8] {
    [
        (h.wrapping_sub(1), w.wrapping_sub(1)),
        (h.wrapping_sub(1), w),
        (h.wrapping_sub(1), w.saturating_add(1)),
        (h, w.wrapping_sub(1)),
        (h, w.saturating_add(1)),
        (h.saturating_add(1), w.wrapping_sub(1)),
        (h.saturating_add(1), w),
        (h.saturating_add(1), w.saturating_add(1)),
    ]
}

/// 连通域算法实现块.
impl<'a> LabelSlice<'a> {
    /// 按照 `conn` 规则获取所有像素值为 `code` 的区域. 两个像素 `p1` 和 `p2`
    /// 属于同一个区域, 当且仅当存在一条从 `p1` 到 `p2` 的 `conn`-相邻路径,
    /// 且路径上的所有像素 (包括 `p1` 和 `p2`) 的值都是 `code`.
    ///
    /// 区域按其第一个像素的行优先顺序排列; 区域内的像素按 BFS 顺序排列.
    pub fn areas_of(&self, code: u8, conn: Connectivity) -> Areas2d {
        let mut ans = Areas2d::new();
        let mut seen = Array2::from_elem(self.shape(), false);
        let mut bfs_q = VecDeque::with_capacity(16);

        for (pos, &pix) in self.indexed_iter() {
            if pix != code || seen[pos] {
                continue;
            }
            seen[pos] = true;
            bfs_q.push_back(pos);

            let mut this_area = Area2d::with_capacity(8);
            while let Some(cur) = bfs_q.pop_front() {
                this_area.push(cur);
                conn.for_each_neighbour(cur, |next| {
                    if self.get(next) == Some(&code) && !seen[next] {
                        seen[next] = true;
                        bfs_q.push_back(next);
                    }
                });
            }
            ans.push(this_area);
        }
        ans
    }
}
