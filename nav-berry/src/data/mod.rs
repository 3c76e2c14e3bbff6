//! 标签切片, 标签体与组织表.

mod slice;
mod tissue;
mod volume;

pub use slice::{LabelSlice, OwnedLabelSlice};
pub use tissue::{DbscanParams, TissueEntry, TissueSpec};
pub use volume::LabelVolume;
