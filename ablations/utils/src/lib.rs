//! 消融实验依赖的通用组件.

use nav_berry::DbscanParams;

pub mod loader;

const SEP: &str = "--------------------------------------------------------";

/// 简单分隔线.
#[inline]
pub fn sep_to<W: std::io::Write>(mut w: W) {
    writeln!(&mut w, "{SEP}").unwrap();
}

/// 获得可并行核心数.
pub fn cpus() -> usize {
    std::thread::available_parallelism().map_or_else(|_| num_cpus::get(), usize::from)
}

/// 适用于腕部超声标签的 DBSCAN 参数: 半径 1.5 (即 8-邻域), 核心点至少 3 个像素.
#[inline]
pub fn wrist_dbscan() -> DbscanParams {
    DbscanParams::new(1.5, 3).unwrap()
}
