//! 基于密度的聚类 (DBSCAN), 作用于某一像素值的全部像素坐标.
//!
//! 距离为欧氏距离, 邻域为闭球 `dist <= eps`, 点本身计入邻域.
//! 核心点: 邻域内点数 `>= min_samples`. 从核心点出发密度可达的点构成一个簇;
//! 不可达的点为噪声, 不出现在任何簇中.

use crate::{Areas2d, DbscanParams, Idx2d, LabelSlice};
use itertools::Itertools;
use ndarray::Array2;

/// 非点位置的占位索引.
const VOID: usize = usize::MAX;

/// DBSCAN 运行时数据.
struct DbscanImp<'p> {
    /// 参与聚类的像素, 行优先.
    points: &'p [Idx2d],

    /// 切片上每个位置对应的点下标, 或 `VOID`.
    index_of: Array2<usize>,

    /// 半径 `eps` 内的全部整数偏移 (含原点).
    offsets: Vec<(isize, isize)>,

    eps_sq: f64,
}

impl<'p> DbscanImp<'p> {
    fn new(points: &'p [Idx2d], shape: Idx2d, eps: f64) -> Self {
        let mut index_of = Array2::from_elem(shape, VOID);
        for (i, &p) in points.iter().enumerate() {
            index_of[p] = i;
        }

        // 偏移量不必超过切片本身的跨度.
        let (h, w) = shape;
        let r = (eps.floor() as usize).min(h.max(w)) as isize;
        let eps_sq = eps * eps;
        let offsets = (-r..=r)
            .cartesian_product(-r..=r)
            .filter(|&(dh, dw)| ((dh * dh + dw * dw) as f64) <= eps_sq)
            .collect();

        Self {
            points,
            index_of,
            offsets,
            eps_sq,
        }
    }

    /// 点 `i` 的 `eps`-邻域 (含自身) 中所有点的下标.
    fn region_query(&self, i: usize, buf: &mut Vec<usize>) {
        buf.clear();
        let (h, w) = self.points[i];
        if self.offsets.len() <= self.points.len() {
            for &(dh, dw) in self.offsets.iter() {
                let pos = (
                    (h as isize + dh) as usize,
                    (w as isize + dw) as usize,
                );
                if let Some(&j) = self.index_of.get(pos) {
                    if j != VOID {
                        buf.push(j);
                    }
                }
            }
        } else {
            // 点比偏移量还稀疏, 直接遍历所有点.
            buf.extend(self.points.iter().enumerate().filter_map(|(j, &(h2, w2))| {
                let dh = h.abs_diff(h2) as f64;
                let dw = w.abs_diff(w2) as f64;
                (dh * dh + dw * dw <= self.eps_sq).then_some(j)
            }));
        }
    }

    fn run(&self, min_samples: usize) -> Areas2d {
        let n = self.points.len();
        let mut buf = Vec::with_capacity(self.offsets.len().min(n));

        let is_core: Vec<bool> = (0..n)
            .map(|i| {
                self.region_query(i, &mut buf);
                buf.len() >= min_samples
            })
            .collect();

        let mut cluster_of: Vec<Option<usize>> = vec![None; n];
        let mut ans = Areas2d::new();
        let mut stack = Vec::with_capacity(16);

        for seed in 0..n {
            if !is_core[seed] || cluster_of[seed].is_some() {
                continue;
            }
            let id = ans.len();
            let mut members = vec![self.points[seed]];
            cluster_of[seed] = Some(id);
            stack.push(seed);

            while let Some(cur) = stack.pop() {
                // 只有核心点向外扩张, 边界点只被吸收.
                if !is_core[cur] {
                    continue;
                }
                self.region_query(cur, &mut buf);
                for &next in buf.iter() {
                    if cluster_of[next].is_none() {
                        cluster_of[next] = Some(id);
                        members.push(self.points[next]);
                        stack.push(next);
                    }
                }
            }
            ans.push(members);
        }

        let noise = cluster_of.iter().filter(|c| c.is_none()).count();
        if noise > 0 {
            log::debug!("DBSCAN: {noise} of {n} points marked as noise");
        }
        ans
    }
}

/// DBSCAN 实现块.
impl<'a> LabelSlice<'a> {
    /// 对所有像素值为 `code` 的像素运行 DBSCAN.
    ///
    /// 簇按照其第一个核心点的行优先顺序排列. 噪声点被丢弃.
    pub fn density_areas_of(&self, code: u8, params: DbscanParams) -> Areas2d {
        let points: Vec<Idx2d> = self.positions_of(code);
        if points.is_empty() {
            return Areas2d::new();
        }
        DbscanImp::new(&points, self.shape(), params.eps()).run(params.min_samples())
    }
}
