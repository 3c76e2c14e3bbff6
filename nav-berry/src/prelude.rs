//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx2d, Idx2dF, Idx3d};

pub use crate::{DbscanParams, LabelSlice, LabelVolume, OwnedLabelSlice, TissueEntry, TissueSpec};

pub use crate::cluster::{
    extract, extract_by, extract_density, extract_with, Cluster, ClusterSet, Connectivity,
    ExtractMode,
};

#[cfg(feature = "rayon")]
pub use crate::cluster::par_extract;

pub use crate::score::{MissingLandmark, Orientation, PlaneLoss, PlaneQualityScorer, StandardPlane};

pub use crate::consts::label::{BACKGROUND, BONES, TENDONS, ULNAR};

pub use crate::phantom::PlanePhantom;

pub use crate::{NavError, NavResult};
