//! 标准切面先验: 期望的路标个数, 损失权重与比较轴.

use crate::consts::{STANDARD_BONES, STANDARD_TENDONS, STANDARD_ULNAR};
use crate::Idx2dF;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 判断方向与尺动脉位置时所比较的质心分量.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum PlaneAxis {
    /// 质心的第 0 个分量 (高).
    Height,

    /// 质心的第 1 个分量 (宽). 标签图以转置方式显示时, 它就是屏幕上的竖直方向.
    #[default]
    Width,
}

impl PlaneAxis {
    /// 取出 `pos` 在该轴上的分量.
    #[inline]
    pub fn pick(&self, (h, w): Idx2dF) -> f64 {
        match self {
            Self::Height => h,
            Self::Width => w,
        }
    }
}

/// 标准切面先验.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StandardPlane {
    /// 期望的骨簇个数.
    pub bones: usize,

    /// 期望的肌腱簇个数.
    pub tendons: usize,

    /// 期望的尺动脉簇个数.
    pub ulnar: usize,

    /// 路标数量损失的权重.
    pub count_weight: f64,

    /// 缺失路标损失的权重.
    pub missing_weight: f64,

    /// 总体缩放.
    pub overall: f64,

    /// 比较轴.
    pub axis: PlaneAxis,
}

impl StandardPlane {
    /// 返回比较轴为 `axis` 的新先验.
    #[inline]
    pub fn with_axis(mut self, axis: PlaneAxis) -> Self {
        self.axis = axis;
        self
    }
}

impl Default for StandardPlane {
    fn default() -> Self {
        Self {
            bones: STANDARD_BONES,
            tendons: STANDARD_TENDONS,
            ulnar: STANDARD_ULNAR,
            count_weight: 0.1,
            missing_weight: 1.0 / 3.0,
            overall: 1.0 / 3.0,
            axis: PlaneAxis::Width,
        }
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_falls_back_to_default() {
        let p: StandardPlane = serde_json::from_str(r#"{"bones": 6, "axis": "Height"}"#).unwrap();
        assert_eq!(p.bones, 6);
        assert_eq!(p.tendons, STANDARD_TENDONS);
        assert_eq!(p.axis, PlaneAxis::Height);
        assert_eq!(p.count_weight, 0.1);
    }
}
