#![warn(missing_docs)] // <= 合适时移除它.
// #![warn(clippy::missing_docs_in_private_items)]  // <= too strict.

//! 核心库. 提供超声腕部标签切片的组织聚类, 以及标准切面质量 (plane quality) 评估.
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 数据流
//!
//! 标签切片 (`LabelSlice`) + 组织表 (`TissueSpec`)
//! -> 聚类 (`cluster::extract*`) -> `ClusterSet`
//! -> 切面评分 (`score::PlaneQualityScorer`) -> 标量损失 (越小越好).
//!
//! 导航/强化学习中的奖励信号即为损失取负 (`PlaneQualityScorer::reward`).
//!
//! # 注意
//!
//! 1. 该 crate 不做任何图像/CSV I/O, 也不负责绘图. 它只暴露聚类成员和质心坐标,
//!   由外部渲染器自行消费.
//! 2. 所有计算都是纯函数, 不持有全局可变状态. 可以在多个线程中对不同切片并发调用.
//!
//! # 开发计划
//!
//! ### 4-邻域 / 8-邻域连通域聚类 ✅
//!
//! 实现位于 `nav-berry/src/cluster/components.rs`.
//!
//! ### 基于密度的聚类 (DBSCAN) ✅
//!
//! 每种组织可以单独指定 `eps` 和 `min_samples`.
//!
//! 实现位于 `nav-berry/src/cluster/density.rs`.
//!
//! ### 标准切面损失 ✅
//!
//! 路标数量损失, 缺失路标损失和尺动脉位置损失三部分. 方向 (骨在肌腱之上或之下)
//! 由骨与肌腱质心均值的相对位置自适应判断.
//!
//! 实现位于 `nav-berry/src/score`.
//!
//! ### 三维标签体 ✅
//!
//! 立方体补零, 沿任意轴取切片, 按步长挑选切片.
//!
//! 实现位于 `nav-berry/src/data/volume.rs`.
//!
//! ### 合成切面 (phantom) ✅
//!
//! 为测试和消融实验提供已知真值的腕部切面.
//!
//! 实现位于 `nav-berry/src/phantom.rs`.
//!
//! ### 小功能 ✅
//!
//! 1. 聚类结果的标签图 / 叠加图, 供外部可视化. ✅
//! 2. `rayon` 并行的多组织聚类. ✅
//! 3. JSON 组织表. ✅

/// 二维索引 `(高, 宽)`, 同时也可一定程度上用作非负整数向量.
pub type Idx2d = (usize, usize);

/// 三维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx3d = (usize, usize, usize);

/// 高精度二维坐标 `(高, 宽)`. 质心即以此表示.
pub type Idx2dF = (f64, f64);

type Area2d = Vec<Idx2d>;
type Areas2d = Vec<Area2d>;

/// 标签切片与标签体基础数据结构.
mod data;

pub use data::{DbscanParams, LabelSlice, LabelVolume, OwnedLabelSlice, TissueEntry, TissueSpec};

pub mod cluster;
pub mod consts;
mod error;
pub mod phantom;
pub mod prelude;
pub mod score;

pub use error::{NavError, NavResult};
