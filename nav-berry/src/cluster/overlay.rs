//! 聚类结果的标签图, 供外部可视化使用. 本 crate 自身不绘图.

use super::ClusterSet;
use crate::consts::CLUSTER_MAP_STEP;
use crate::{Idx2d, LabelSlice};
use ndarray::Array2;

impl ClusterSet {
    /// 生成 `shape` 大小的簇标签图. 背景为 0, 每种组织的第 `i` 个簇
    /// (从 0 起) 的像素值为 `(i + 1) * 10`. 不同组织的同序号簇同色.
    ///
    /// 超出 `shape` 的成员被忽略.
    pub fn cluster_map(&self, shape: Idx2d) -> Array2<u16> {
        let mut map = Array2::zeros(shape);
        self.paint(&mut map);
        map
    }

    /// 同 [`ClusterSet::cluster_map`], 但以切片原像素值为底图.
    pub fn overlay(&self, slice: &LabelSlice) -> Array2<u16> {
        let mut map = slice.array_view().mapv(u16::from);
        self.paint(&mut map);
        map
    }

    fn paint(&self, map: &mut Array2<u16>) {
        for (_, clusters) in self.iter() {
            for (i, cluster) in clusters.iter().enumerate() {
                let value = u16::try_from(i + 1)
                    .unwrap_or(u16::MAX)
                    .saturating_mul(CLUSTER_MAP_STEP);
                for &pos in cluster.members() {
                    if let Some(p) = map.get_mut(pos) {
                        *p = value;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::cluster::{extract, Cluster, ClusterSet};
    use crate::{LabelSlice, TissueSpec};
    use ndarray::array;

    #[test]
    fn test_cluster_map() {
        let a = array![[1u8, 0, 1], [0, 0, 0], [2, 2, 0]];
        let s = LabelSlice::new(a.view()).unwrap();
        let set = extract(&TissueSpec::wrist(), &s);

        let map = set.cluster_map(s.shape());
        assert_eq!(map, array![[10u16, 0, 20], [0, 0, 0], [10, 10, 0]]);

        let over = set.overlay(&s);
        assert_eq!(over[(1, 1)], 0);
        assert_eq!(over[(2, 1)], 10);
    }

    #[test]
    fn test_out_of_range_members_ignored() {
        let set: ClusterSet = [("bones".to_string(), vec![Cluster::new(vec![(0, 0), (9, 9)]).unwrap()])]
            .into_iter()
            .collect();
        let map = set.cluster_map((2, 2));
        assert_eq!(map[(0, 0)], 10);
        assert_eq!(map.iter().filter(|&&v| v != 0).count(), 1);
    }
}
