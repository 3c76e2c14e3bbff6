//! 标准切面质量评估.
//!
//! 给定一个切片的聚类结果, 计算它与腕部标准切面的差距 (损失, 越小越好).
//! 标准切面包含 7 块骨, 2 条肌腱和 1 条尺动脉, 且尺动脉位于肌腱远离骨的一侧.
//!
//! 损失由三部分组成:
//!
//! 1. 路标数量损失: 各组织簇数与期望个数之差的绝对值之和.
//! 2. 缺失路标损失: 无骨为 3, 有骨无肌腱为 2, 尺动脉不是恰好一个为 1, 否则为 0.
//! 3. 位置损失: 尺动脉在正确一侧为 0, 否则 (包括无法判断) 为 1.
//!
//! 总损失为 `overall * (count_weight * 数量 + missing_weight * 缺失 + 位置)`,
//! 默认权重为 `1/3 * (0.1 * 数量 + 1/3 * 缺失 + 位置)`.
//!
//! 注意: 数量损失没有上界, 因此总损失只对 "合理" 的输入大致落在 \[0, 1\] 内.

mod prior;

use crate::cluster::{Cluster, ClusterSet};
use crate::consts::tissue;
use crate::{Idx2dF, NavResult};

pub use prior::{PlaneAxis, StandardPlane};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 手臂方向: 骨的质心均值相对于肌腱质心均值的位置 (沿比较轴).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Orientation {
    /// 骨的坐标大于肌腱 (符号 -1).
    BonesOver,

    /// 骨的坐标不大于肌腱 (符号 +1).
    BonesUnder,
}

impl Orientation {
    /// 方向符号.
    #[inline]
    pub fn sign(&self) -> f64 {
        match self {
            Self::BonesOver => -1.0,
            Self::BonesUnder => 1.0,
        }
    }
}

/// 缺失路标的情况. 按检查顺序, 只记录最先发现的一种.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MissingLandmark {
    /// 路标齐全.
    None,

    /// 有骨有肌腱, 但尺动脉不是恰好一个.
    Ulnar,

    /// 有骨, 无肌腱.
    Tendons,

    /// 无骨. 此时方向和尺动脉位置都无法判断.
    Bones,
}

impl MissingLandmark {
    /// 缺失路标损失值.
    #[inline]
    pub fn loss(&self) -> u32 {
        match self {
            Self::None => 0,
            Self::Ulnar => 1,
            Self::Tendons => 2,
            Self::Bones => 3,
        }
    }
}

/// 一次评估的全部中间结果.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlaneLoss {
    /// 路标数量损失.
    pub landmark: usize,

    /// 缺失路标情况.
    pub missing: MissingLandmark,

    /// 位置损失, 0 或 1.
    pub location: u32,

    /// 手臂方向. 无骨或无肌腱时为 `None`.
    pub orientation: Option<Orientation>,

    /// 总损失.
    pub total: f64,
}

/// 标准切面评分器. 无内部状态, 可在多线程间共享.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlaneQualityScorer {
    prior: StandardPlane,
}

impl PlaneQualityScorer {
    /// 以 `prior` 为标准构造评分器.
    #[inline]
    pub fn new(prior: StandardPlane) -> Self {
        Self { prior }
    }

    /// 标准切面先验.
    #[inline]
    pub fn prior(&self) -> &StandardPlane {
        &self.prior
    }

    /// 计算总损失.
    ///
    /// `clusters` 缺少 `bones`, `tendons` 或 `ulnar` 时返回 `MissingTissueKey`.
    #[inline]
    pub fn score(&self, clusters: &ClusterSet) -> NavResult<f64> {
        Ok(self.evaluate(clusters)?.total)
    }

    /// 导航奖励, 即损失取负.
    #[inline]
    pub fn reward(&self, clusters: &ClusterSet) -> NavResult<f64> {
        Ok(-self.score(clusters)?)
    }

    /// 计算损失并返回全部中间结果.
    ///
    /// `clusters` 缺少 `bones`, `tendons` 或 `ulnar` 时返回 `MissingTissueKey`.
    pub fn evaluate(&self, clusters: &ClusterSet) -> NavResult<PlaneLoss> {
        let bones = clusters.try_get(tissue::BONES)?;
        let tendons = clusters.try_get(tissue::TENDONS)?;
        let ulnar = clusters.try_get(tissue::ULNAR)?;
        let p = &self.prior;

        let landmark = bones.len().abs_diff(p.bones)
            + tendons.len().abs_diff(p.tendons)
            + ulnar.len().abs_diff(p.ulnar);

        let mut missing = MissingLandmark::None;
        let mut location = 1;
        let mut orientation = None;

        match (bones.is_empty(), tendons.is_empty()) {
            (true, _) => {
                missing = MissingLandmark::Bones;
                log::debug!("no bones found");
            }
            (false, true) => {
                missing = MissingLandmark::Tendons;
                log::debug!("no tendons found");
            }
            (false, false) => {
                let bone_ref = p.axis.pick(mean_centroid(bones));
                let tendon_ref = p.axis.pick(mean_centroid(tendons));
                let o = if bone_ref > tendon_ref {
                    Orientation::BonesOver
                } else {
                    Orientation::BonesUnder
                };
                log::debug!("orientation: {o:?}");
                orientation = Some(o);

                if let [only] = ulnar {
                    let ulnar_ref = p.axis.pick(only.centroid());
                    if o.sign() * ulnar_ref > o.sign() * tendon_ref {
                        location = 0;
                    } else {
                        log::debug!("ulnar artery is on the bone side of the tendons");
                    }
                } else {
                    missing = MissingLandmark::Ulnar;
                    log::debug!("expected exactly one ulnar artery, found {}", ulnar.len());
                }
            }
        }

        let total = p.overall
            * (p.count_weight * landmark as f64
                + p.missing_weight * missing.loss() as f64
                + location as f64);

        log::info!(
            "plane loss {total:.4} (landmark {landmark}, missing {}, location {location})",
            missing.loss()
        );
        Ok(PlaneLoss {
            landmark,
            missing,
            location,
            orientation,
            total,
        })
    }
}

/// 一组簇质心的均值. `clusters` 非空.
fn mean_centroid(clusters: &[Cluster]) -> Idx2dF {
    debug_assert!(!clusters.is_empty());
    let n = clusters.len() as f64;
    let (sh, sw) = clusters.iter().fold((0.0, 0.0), |(sh, sw), c| {
        let (h, w) = c.centroid();
        (sh + h, sw + w)
    });
    (sh / n, sw / n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::extract;
    use crate::phantom::PlanePhantom;
    use crate::{NavError, TissueSpec};

    fn float_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn evaluate(ph: PlanePhantom) -> PlaneLoss {
        let slice = ph.render();
        let set = extract(&TissueSpec::wrist(), &slice.as_immut());
        PlaneQualityScorer::default().evaluate(&set).unwrap()
    }

    /// 单像素簇构成的聚类结果.
    fn set_of(bones: &[(usize, usize)], tendons: &[(usize, usize)], ulnar: &[(usize, usize)]) -> ClusterSet {
        let to = |v: &[(usize, usize)]| -> Vec<Cluster> {
            v.iter().map(|&p| Cluster::new(vec![p]).unwrap()).collect()
        };
        [
            (tissue::BONES.to_string(), to(bones)),
            (tissue::TENDONS.to_string(), to(tendons)),
            (tissue::ULNAR.to_string(), to(ulnar)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_standard_plane_is_zero() {
        for flipped in [false, true] {
            let l = evaluate(PlanePhantom::standard().flipped(flipped));
            assert_eq!(l.landmark, 0);
            assert_eq!(l.missing, MissingLandmark::None);
            assert_eq!(l.location, 0);
            assert!(float_eq(l.total, 0.0));
        }
        let l = evaluate(PlanePhantom::standard().flipped(true));
        assert_eq!(l.orientation, Some(Orientation::BonesOver));
    }

    #[test]
    fn test_no_bones() {
        let l = evaluate(PlanePhantom::standard().bones(0).tendons(0).ulnar(0));
        assert_eq!(l.landmark, 10);
        assert_eq!(l.missing, MissingLandmark::Bones);
        assert_eq!(l.location, 1);
        assert_eq!(l.orientation, None);
        assert!(float_eq(l.total, 1.0));
    }

    #[test]
    fn test_no_bones_skips_everything_else() {
        // 肌腱和尺动脉都在, 但没有骨.
        let l = evaluate(PlanePhantom::standard().bones(0));
        assert_eq!(l.landmark, 7);
        assert_eq!(l.missing, MissingLandmark::Bones);
        assert_eq!(l.location, 1);
        assert!(float_eq(l.total, (0.7 + 1.0 + 1.0) / 3.0));
    }

    #[test]
    fn test_no_tendons() {
        let l = evaluate(PlanePhantom::standard().tendons(0));
        assert_eq!(l.landmark, 2);
        assert_eq!(l.missing, MissingLandmark::Tendons);
        assert_eq!(l.location, 1);
        assert_eq!(l.orientation, None);
        assert!(float_eq(l.total, (0.2 + 2.0 / 3.0 + 1.0) / 3.0));
    }

    #[test]
    fn test_ulnar_not_unique() {
        for n in [0, 2] {
            let l = evaluate(PlanePhantom::standard().ulnar(n));
            assert_eq!(l.landmark, 1);
            assert_eq!(l.missing, MissingLandmark::Ulnar);
            assert_eq!(l.location, 1);
            assert!(l.orientation.is_some());
            assert!(float_eq(l.total, (0.1 + 1.0 / 3.0 + 1.0) / 3.0));
        }
    }

    #[test]
    fn test_misplaced_ulnar() {
        for flipped in [false, true] {
            let l = evaluate(
                PlanePhantom::standard()
                    .bones(5)
                    .flipped(flipped)
                    .ulnar_misplaced(true),
            );
            assert_eq!(l.landmark, 2);
            assert_eq!(l.missing, MissingLandmark::None);
            assert_eq!(l.location, 1);
            assert!(float_eq(l.total, 0.4));
        }
    }

    #[test]
    fn test_ulnar_level_with_tendons_is_wrong_side() {
        // 比较是严格的: 与肌腱同一坐标不算正确一侧.
        let set = set_of(&[(0, 1)], &[(0, 5)], &[(3, 5)]);
        let l = PlaneQualityScorer::default().evaluate(&set).unwrap();
        assert_eq!(l.orientation, Some(Orientation::BonesUnder));
        assert_eq!(l.location, 1);
    }

    #[test]
    fn test_bones_level_with_tendons_counts_as_under() {
        // 骨与肌腱同宽时按 "骨在下" (+1) 处理, 尺动脉须在肌腱的宽度更大一侧.
        let set = set_of(&[(0, 5)], &[(4, 5)], &[(2, 8)]);
        let l = PlaneQualityScorer::default().evaluate(&set).unwrap();
        assert_eq!(l.orientation, Some(Orientation::BonesUnder));
        assert_eq!(l.location, 0);

        let set = set_of(&[(0, 5)], &[(4, 5)], &[(2, 2)]);
        let l = PlaneQualityScorer::default().evaluate(&set).unwrap();
        assert_eq!(l.orientation, Some(Orientation::BonesUnder));
        assert_eq!(l.location, 1);
    }

    #[test]
    fn test_axis_choice() {
        // 沿宽比较: 骨 1 < 肌腱 5 < 尺动脉 9, 正确.
        // 沿高比较: 骨 8 > 肌腱 4, 方向翻转; 尺动脉 6 > 肌腱 4, 错误.
        let set = set_of(&[(8, 1)], &[(4, 5)], &[(6, 9)]);
        let by_width = PlaneQualityScorer::default().evaluate(&set).unwrap();
        assert_eq!(by_width.location, 0);

        let prior = StandardPlane::default().with_axis(PlaneAxis::Height);
        let by_height = PlaneQualityScorer::new(prior).evaluate(&set).unwrap();
        assert_eq!(by_height.orientation, Some(Orientation::BonesOver));
        assert_eq!(by_height.location, 1);
    }

    #[test]
    fn test_permutation_invariance() {
        let bones = [(0, 1), (3, 2), (6, 0), (9, 3)];
        let tendons = [(1, 6), (7, 8)];
        let ulnar = [(4, 12)];
        let a = set_of(&bones, &tendons, &ulnar);
        let mut rb = bones;
        rb.reverse();
        let mut rt = tendons;
        rt.reverse();
        let b = set_of(&rb, &rt, &ulnar);
        let s = PlaneQualityScorer::default();
        assert!(float_eq(s.score(&a).unwrap(), s.score(&b).unwrap()));
    }

    #[test]
    fn test_missing_key() {
        let set: ClusterSet = [(tissue::BONES.to_string(), Vec::<Cluster>::new())].into_iter().collect();
        assert_eq!(
            PlaneQualityScorer::default().score(&set),
            Err(NavError::MissingTissueKey(tissue::TENDONS.into()))
        );
    }

    #[test]
    fn test_reward_is_negated_loss() {
        let slice = PlanePhantom::standard().bones(5).render();
        let set = extract(&TissueSpec::wrist(), &slice.as_immut());
        let s = PlaneQualityScorer::default();
        assert!(float_eq(s.reward(&set).unwrap(), -s.score(&set).unwrap()));
        assert!(float_eq(s.score(&set).unwrap(), 0.2 / 3.0));
    }

    #[test]
    fn test_concurrent_scoring() {
        use rayon::prelude::*;

        let scorer = PlaneQualityScorer::default();
        let spec = TissueSpec::wrist();
        let cases: Vec<_> = (0..16)
            .map(|i| PlanePhantom::standard().bones(i % 8).flipped(i % 2 == 0).render())
            .collect();
        let serial: Vec<f64> = cases
            .iter()
            .map(|s| scorer.score(&extract(&spec, &s.as_immut())).unwrap())
            .collect();
        let parallel: Vec<f64> = cases
            .par_iter()
            .map(|s| scorer.score(&extract(&spec, &s.as_immut())).unwrap())
            .collect();
        assert_eq!(serial, parallel);
    }
}
