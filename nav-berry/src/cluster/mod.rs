//! 组织聚类.
//!
//! 对组织表中的每种组织, 先按像素值得到二值掩膜, 再将掩膜划分为若干簇
//! (连通域, 或基于密度的簇), 并计算每个簇的质心.
//!
//! 某种组织一个像素都没有时, 其簇列表为空, 同时记录一条 `warn` 日志; 这不是错误.
//! 每种组织独立处理, 互不影响.

mod components;
mod density;
mod overlay;

use crate::{DbscanParams, Idx2d, Idx2dF, LabelSlice, NavError, NavResult, TissueEntry, TissueSpec};

pub use components::Connectivity;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 同一组织的一组相连 (或密度相连) 像素, 及其质心.
///
/// 反序列化时只读取成员, 质心总是重新计算.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawCluster"))]
#[derive(Clone, Debug, PartialEq)]
pub struct Cluster {
    /// 成员像素, 行优先排列.
    members: Vec<Idx2d>,

    /// 成员坐标的算术平均 `(高, 宽)`.
    centroid: Idx2dF,
}

impl Cluster {
    /// 由成员像素构造簇. 成员会被排序去重; 成员为空时返回 `InvalidArgument`.
    pub fn new(mut members: Vec<Idx2d>) -> NavResult<Self> {
        if members.is_empty() {
            return Err(NavError::invalid("a cluster needs at least one pixel"));
        }
        members.sort_unstable();
        members.dedup();
        Ok(Self::from_sorted(members))
    }

    /// 内部构造, 调用方保证 `members` 非空, 已排序且无重复.
    fn from_sorted(members: Vec<Idx2d>) -> Self {
        debug_assert!(!members.is_empty());
        let n = members.len() as f64;
        let (sh, sw) = members
            .iter()
            .fold((0.0, 0.0), |(sh, sw), &(h, w)| (sh + h as f64, sw + w as f64));
        Self {
            centroid: (sh / n, sw / n),
            members,
        }
    }

    /// 成员像素 (行优先).
    #[inline]
    pub fn members(&self) -> &[Idx2d] {
        &self.members
    }

    /// 质心 `(高, 宽)`. 不一定是整数, 也不一定落在簇内, 但一定在成员的凸包内.
    #[inline]
    pub fn centroid(&self) -> Idx2dF {
        self.centroid
    }

    /// 成员个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// 总是 `false`: 簇至少包含一个像素.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// 组织名 -> 簇列表. 每次对一个切片聚类都新建一份, 构造后不可变.
///
/// 同一组织的簇之间的顺序没有空间意义, 调用方不应依赖它.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "RawClusterSet"))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClusterSet {
    tissues: Vec<(String, Vec<Cluster>)>,
}

impl FromIterator<(String, Vec<Cluster>)> for ClusterSet {
    /// 同名组织出现多次时, 后者覆盖前者.
    fn from_iter<I: IntoIterator<Item = (String, Vec<Cluster>)>>(it: I) -> Self {
        let mut tissues: Vec<(String, Vec<Cluster>)> = Vec::new();
        for (name, clusters) in it {
            match tissues.iter_mut().find(|(n, _)| *n == name) {
                Some((_, c)) => *c = clusters,
                None => tissues.push((name, clusters)),
            }
        }
        Self { tissues }
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "serde")] {
        #[derive(Deserialize)]
        struct RawCluster {
            members: Vec<Idx2d>,
        }

        impl TryFrom<RawCluster> for Cluster {
            type Error = NavError;

            fn try_from(v: RawCluster) -> Result<Self, Self::Error> {
                Self::new(v.members)
            }
        }

        #[derive(Deserialize)]
        struct RawClusterSet {
            tissues: Vec<(String, Vec<Cluster>)>,
        }

        /// 与 `collect` 相同, 同名组织以后者为准.
        impl From<RawClusterSet> for ClusterSet {
            fn from(v: RawClusterSet) -> Self {
                v.tissues.into_iter().collect()
            }
        }
    }
}

impl ClusterSet {
    /// 获取组织 `name` 的簇. 组织不存在时返回 `None`.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&[Cluster]> {
        self.tissues
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c.as_slice())
    }

    /// 同 [`ClusterSet::get`], 但组织不存在时返回 `MissingTissueKey`.
    #[inline]
    pub fn try_get(&self, name: &str) -> NavResult<&[Cluster]> {
        self.get(name)
            .ok_or_else(|| NavError::MissingTissueKey(name.to_string()))
    }

    /// 按组织表顺序迭代 `(组织名, 簇列表)`.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Cluster])> {
        self.tissues.iter().map(|(n, c)| (n.as_str(), c.as_slice()))
    }

    /// 簇列表为空的组织 (即切片中没有该组织的像素, 或全部是噪声).
    pub fn empty_tissues(&self) -> impl Iterator<Item = &str> {
        self.iter()
            .filter_map(|(n, c)| c.is_empty().then_some(n))
    }

    /// 组织个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.tissues.len()
    }

    /// 是否不含任何组织.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tissues.is_empty()
    }

    /// 所有簇的 `(组织名, 质心)`, 供外部渲染器标注质心.
    pub fn centroids(&self) -> impl Iterator<Item = (&str, Idx2dF)> {
        self.iter()
            .flat_map(|(n, c)| c.iter().map(move |cl| (n, cl.centroid())))
    }
}

/// 聚类方式.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ExtractMode {
    /// 连通域.
    Connected(Connectivity),

    /// DBSCAN. 组织表项自带的参数优先于这里给出的默认值.
    Density(DbscanParams),
}

impl Default for ExtractMode {
    fn default() -> Self {
        Self::Connected(Connectivity::Four)
    }
}

/// 以 4-邻接连通域为规则, 对组织表中的每种组织聚类.
#[inline]
pub fn extract(spec: &TissueSpec, slice: &LabelSlice) -> ClusterSet {
    extract_by(spec, slice, ExtractMode::default())
}

/// 以 `conn` 连通域为规则, 对组织表中的每种组织聚类.
#[inline]
pub fn extract_with(spec: &TissueSpec, slice: &LabelSlice, conn: Connectivity) -> ClusterSet {
    extract_by(spec, slice, ExtractMode::Connected(conn))
}

/// 以 DBSCAN 对组织表中的每种组织聚类. 表项中的 `density` 优先于 `default`.
#[inline]
pub fn extract_density(spec: &TissueSpec, slice: &LabelSlice, default: DbscanParams) -> ClusterSet {
    extract_by(spec, slice, ExtractMode::Density(default))
}

/// 以 `mode` 对组织表中的每种组织聚类.
pub fn extract_by(spec: &TissueSpec, slice: &LabelSlice, mode: ExtractMode) -> ClusterSet {
    let set: ClusterSet = spec
        .iter()
        .map(|(name, entry)| (name.to_string(), extract_one(slice, name, entry, mode)))
        .collect();
    log_summary(&set);
    set
}

/// 每个切片聚类完成后的汇总日志.
fn log_summary(set: &ClusterSet) {
    log::info!(
        "clustered {} tissues, {} of them empty",
        set.len(),
        set.empty_tissues().count()
    );
}

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::prelude::*;

        /// 同 [`extract_by`], 但各组织并行聚类. 结果与串行版本完全一致.
        pub fn par_extract(spec: &TissueSpec, slice: &LabelSlice, mode: ExtractMode) -> ClusterSet {
            let entries: Vec<(&str, &TissueEntry)> = spec.iter().collect();
            let tissues: Vec<(String, Vec<Cluster>)> = entries
                .into_par_iter()
                .map(|(name, entry)| (name.to_string(), extract_one(slice, name, entry, mode)))
                .collect();
            let set: ClusterSet = tissues.into_iter().collect();
            log_summary(&set);
            set
        }
    }
}

/// 以连通域规则聚类单一组织 (像素值为 `code`).
pub fn find_clusters(slice: &LabelSlice, code: u8, conn: Connectivity) -> Vec<Cluster> {
    into_clusters(slice.areas_of(code, conn))
}

/// 以 DBSCAN 聚类单一组织 (像素值为 `code`). 噪声点不出现在任何簇中.
pub fn find_density_clusters(slice: &LabelSlice, code: u8, params: DbscanParams) -> Vec<Cluster> {
    into_clusters(slice.density_areas_of(code, params))
}

fn into_clusters(areas: crate::Areas2d) -> Vec<Cluster> {
    areas
        .into_iter()
        .map(|mut area| {
            area.sort_unstable();
            Cluster::from_sorted(area)
        })
        .collect()
}

/// 聚类单一组织并记录诊断日志.
fn extract_one(slice: &LabelSlice, name: &str, entry: &TissueEntry, mode: ExtractMode) -> Vec<Cluster> {
    let code = entry.code;
    log::debug!("finding `{name}` clusters with value {code}");
    if !slice.contains(code) {
        log::warn!("no `{name}` pixels (value {code}) in slice, nothing to cluster");
        return vec![];
    }
    let clusters = match mode {
        ExtractMode::Connected(conn) => find_clusters(slice, code, conn),
        ExtractMode::Density(default) => {
            find_density_clusters(slice, code, entry.density.unwrap_or(default))
        }
    };
    log::debug!("found {} `{name}` clusters", clusters.len());
    clusters
}
