//! 组织表: 组织名 -> 标签像素值 (以及可选的密度聚类参数).

use crate::consts::{label, tissue};
use crate::{NavError, NavResult};
use once_cell::sync::Lazy;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// DBSCAN 参数.
///
/// 该对象是只读的. 若要修改参数, 你应该创建新的实例.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawDbscanParams"))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DbscanParams {
    eps: f64,
    min_samples: usize,
}

impl DbscanParams {
    /// 构建 DBSCAN 参数.
    ///
    /// `eps` 必须是有限正数, `min_samples` 至少为 1 (点本身计入邻域),
    /// 否则返回 `InvalidArgument`.
    pub fn new(eps: f64, min_samples: usize) -> NavResult<Self> {
        if !(eps.is_finite() && eps > 0.0) {
            return Err(NavError::invalid(format!(
                "eps must be a positive finite number, got {eps}"
            )));
        }
        if min_samples == 0 {
            return Err(NavError::invalid("min_samples must be at least 1"));
        }
        Ok(Self { eps, min_samples })
    }

    /// 邻域半径 (像素).
    #[inline]
    pub fn eps(&self) -> f64 {
        self.eps
    }

    /// 成为核心点所需的最少邻居个数 (包括自身).
    #[inline]
    pub fn min_samples(&self) -> usize {
        self.min_samples
    }
}

/// 反序列化时先得到未校验的参数, 再走 `DbscanParams::new`.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawDbscanParams {
    eps: f64,
    min_samples: usize,
}

#[cfg(feature = "serde")]
impl TryFrom<RawDbscanParams> for DbscanParams {
    type Error = NavError;

    fn try_from(v: RawDbscanParams) -> Result<Self, Self::Error> {
        Self::new(v.eps, v.min_samples)
    }
}

/// 组织表中的一项.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TissueEntry {
    /// 该组织在标签切片中的像素值.
    pub code: u8,

    /// 该组织专用的 DBSCAN 参数. 为 `None` 时使用调用方给出的默认值.
    #[cfg_attr(feature = "serde", serde(default))]
    pub density: Option<DbscanParams>,
}

/// 组织表. 保持插入顺序, 组织名唯一, 构造后不可变.
///
/// 背景像素值 [`label::BACKGROUND`] 不能分配给任何组织.
#[derive(Clone, Debug, PartialEq)]
pub struct TissueSpec {
    entries: Vec<(String, TissueEntry)>,
}

static WRIST: Lazy<TissueSpec> = Lazy::new(|| TissueSpec {
    entries: vec![
        (tissue::BONES.to_string(), TissueEntry { code: label::BONES, density: None }),
        (tissue::TENDONS.to_string(), TissueEntry { code: label::TENDONS, density: None }),
        (tissue::ULNAR.to_string(), TissueEntry { code: label::ULNAR, density: None }),
    ],
});

impl TissueSpec {
    /// 由 `(组织名, 像素值)` 构造组织表.
    ///
    /// 组织名重复时返回 `DuplicateTissue`, 像素值为背景时返回 `InvalidArgument`.
    pub fn new<S, I>(it: I) -> NavResult<Self>
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, u8)>,
    {
        it.into_iter()
            .try_fold(Self { entries: vec![] }, |spec, (name, code)| {
                spec.with(name, TissueEntry { code, density: None })
            })
    }

    /// 默认的腕部标签表: `bones = 1`, `tendons = 2`, `ulnar = 3`.
    #[inline]
    pub fn wrist() -> Self {
        WRIST.clone()
    }

    /// 返回追加了 `name` 的新表. 规则同 [`TissueSpec::new`].
    pub fn with(mut self, name: impl Into<String>, entry: TissueEntry) -> NavResult<Self> {
        let name = name.into();
        if label::is_background(entry.code) {
            return Err(NavError::invalid(format!(
                "tissue `{name}` uses the reserved background code {}",
                label::BACKGROUND
            )));
        }
        if self.get(&name).is_some() {
            return Err(NavError::DuplicateTissue(name));
        }
        self.entries.push((name, entry));
        Ok(self)
    }

    /// 返回将 `name` 的密度参数替换为 `params` 的新表.
    /// `name` 不存在时返回 `MissingTissueKey`.
    pub fn with_density(mut self, name: &str, params: DbscanParams) -> NavResult<Self> {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some((_, e)) => e.density = Some(params),
            None => return Err(NavError::MissingTissueKey(name.to_string())),
        }
        Ok(self)
    }

    /// 获取组织 `name` 的表项.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&TissueEntry> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, e)| e)
    }

    /// 获取组织 `name` 的像素值.
    #[inline]
    pub fn code(&self, name: &str) -> Option<u8> {
        self.get(name).map(|e| e.code)
    }

    /// 按插入顺序迭代 `(组织名, 表项)`.
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &TissueEntry)> {
        self.entries.iter().map(|(n, e)| (n.as_str(), e))
    }

    /// 组织个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否为空表.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "serde")] {
        use std::collections::BTreeMap;

        /// JSON 中的表项可以是单个像素值, 也可以是完整的 [`TissueEntry`].
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawEntry {
            Code(u8),
            Full(TissueEntry),
        }

        impl TissueSpec {
            /// 从 JSON 对象解析组织表, 例如
            /// `{"bones": 1, "tendons": {"code": 2, "density": {"eps": 1.5, "min_samples": 3}}}`.
            ///
            /// JSON 对象本身无序, 解析结果按组织名字典序排列.
            pub fn from_json_str(s: &str) -> NavResult<Self> {
                let raw: BTreeMap<String, RawEntry> = serde_json::from_str(s)?;
                raw.into_iter().try_fold(Self { entries: vec![] }, |spec, (name, e)| {
                    let entry = match e {
                        RawEntry::Code(code) => TissueEntry { code, density: None },
                        RawEntry::Full(entry) => entry,
                    };
                    spec.with(name, entry)
                })
            }
        }

        impl Serialize for TissueSpec {
            fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
                use serde::ser::SerializeMap;
                let mut map = s.serialize_map(Some(self.len()))?;
                for (name, entry) in self.iter() {
                    map.serialize_entry(name, entry)?;
                }
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dbscan_params_invalid_input() {
        assert!(DbscanParams::new(0.0, 3).is_err());
        assert!(DbscanParams::new(-1.0, 3).is_err());
        assert!(DbscanParams::new(f64::NAN, 3).is_err());
        assert!(DbscanParams::new(f64::INFINITY, 3).is_err());
        assert!(DbscanParams::new(1.5, 0).is_err());
        let p = DbscanParams::new(1.5, 1).unwrap();
        assert_eq!((p.eps(), p.min_samples()), (1.5, 1));
    }

    #[test]
    fn test_spec_rejects_background_and_duplicates() {
        assert!(matches!(
            TissueSpec::new([("bones", 0u8)]),
            Err(NavError::InvalidArgument(_))
        ));
        assert_eq!(
            TissueSpec::new([("bones", 1u8), ("bones", 2)]),
            Err(NavError::DuplicateTissue("bones".into()))
        );
    }

    #[test]
    fn test_spec_keeps_insertion_order() {
        let spec = TissueSpec::new([("ulnar", 3u8), ("bones", 1), ("tendons", 2)]).unwrap();
        let names: Vec<_> = spec.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["ulnar", "bones", "tendons"]);
        assert_eq!(spec.code("bones"), Some(1));
        assert_eq!(spec.code("nerve"), None);
    }

    #[test]
    fn test_with_density() {
        let p = DbscanParams::new(2.0, 4).unwrap();
        let spec = TissueSpec::wrist().with_density(tissue::TENDONS, p).unwrap();
        assert_eq!(spec.get(tissue::TENDONS).unwrap().density, Some(p));
        assert_eq!(spec.get(tissue::BONES).unwrap().density, None);
        assert!(TissueSpec::wrist().with_density("nerve", p).is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_from_json() {
        let spec = TissueSpec::from_json_str(
            r#"{"ulnar": 3, "bones": 1,
                "tendons": {"code": 2, "density": {"eps": 1.5, "min_samples": 3}}}"#,
        )
        .unwrap();
        assert_eq!(spec.len(), 3);
        assert_eq!(spec.code(tissue::ULNAR), Some(3));
        let d = spec.get(tissue::TENDONS).unwrap().density.unwrap();
        assert_eq!(d.min_samples(), 3);

        assert!(matches!(
            TissueSpec::from_json_str(r#"{"bones": 0}"#),
            Err(NavError::InvalidArgument(_))
        ));
        assert!(matches!(
            TissueSpec::from_json_str(r#"{"bones": {"code": 1, "density": {"eps": -1, "min_samples": 3}}}"#),
            Err(NavError::Json(_))
        ));
        assert!(matches!(TissueSpec::from_json_str("[1, 2]"), Err(NavError::Json(_))));
    }
}
