//! 消融实验的数据加载器.
//!
//! 若设置了 `$PLANE8_VOLUME`, 则从该 `.npy` 文件读取三维标签体, 补为立方体后
//! 沿 `$PLANE8_AXIS` (默认 2) 每隔 `$PLANE8_LAP` (默认 10) 张取一张切片;
//! 否则使用一组覆盖各种情况的合成切面.

use nav_berry::phantom::PlanePhantom;
use nav_berry::{LabelVolume, NavResult, OwnedLabelSlice};
use ndarray::Array3;
use std::env;
use std::error::Error;
use std::path::{Path, PathBuf};

/// 默认切片轴.
const DEFAULT_AXIS: usize = 2;

/// 默认切片间隔.
const DEFAULT_LAP: usize = 10;

/// 从一个标签体中最多取出的切片数.
const MAX_SLICES: usize = 64;

/// 获取标签体路径. 若 `$PLANE8_VOLUME` 为空则返回 `None`.
pub fn volume_path_from_env() -> Option<PathBuf> {
    env::var_os("PLANE8_VOLUME").map(PathBuf::from)
}

/// 读取 `$name` 并解析为 `usize`, 缺失或无法解析时返回 `default`.
fn usize_from_env(name: &str, default: usize) -> usize {
    match env::var(name) {
        Ok(s) => s.trim().parse().unwrap_or_else(|_| {
            log::warn!("cannot parse ${name}={s:?}, using {default}");
            default
        }),
        Err(_) => default,
    }
}

/// 切片轴, 取自 `$PLANE8_AXIS`.
#[inline]
pub fn axis_from_env() -> usize {
    usize_from_env("PLANE8_AXIS", DEFAULT_AXIS)
}

/// 切片间隔, 取自 `$PLANE8_LAP`.
#[inline]
pub fn lap_from_env() -> usize {
    usize_from_env("PLANE8_LAP", DEFAULT_LAP)
}

/// 从 `.npy` 文件读取三维 `u8` 标签体.
pub fn load_volume<P: AsRef<Path>>(path: P) -> Result<LabelVolume, Box<dyn Error>> {
    let raw: Array3<u8> = ndarray_npy::read_npy(path)?;
    Ok(LabelVolume::new(raw)?)
}

/// 将 `volume` 补为立方体, 然后沿 `axis` 从末端开始每隔 `lap` 张取出一张切片.
pub fn strided_slices(
    volume: &LabelVolume,
    axis: usize,
    lap: usize,
) -> Result<Vec<OwnedLabelSlice>, Box<dyn Error>> {
    let cube = volume.pad_to_cube();
    let last = cube.len_of(axis).saturating_sub(1);
    let slices = LabelVolume::strided_indices(last, lap, MAX_SLICES)?
        .into_iter()
        .map(|i| cube.slice_at(axis, i).map(|s| s.to_owned()))
        .collect::<NavResult<Vec<_>>>()?;
    Ok(slices)
}

/// 一组合成切面: 骨 0..=8, 肌腱 0..=3, 尺动脉 0..=2, 以及方向和尺动脉位置的所有组合.
pub fn phantoms() -> Vec<OwnedLabelSlice> {
    let mut out = Vec::new();
    for bones in 0..=8 {
        for tendons in 0..=3 {
            for ulnar in 0..=2 {
                for (flipped, misplaced) in [(false, false), (false, true), (true, false), (true, true)] {
                    let ph = PlanePhantom::standard()
                        .bones(bones)
                        .tendons(tendons)
                        .ulnar(ulnar)
                        .flipped(flipped)
                        .ulnar_misplaced(misplaced);
                    out.push(ph.render());
                }
            }
        }
    }
    out
}

/// 按环境变量加载切片. 未设置 `$PLANE8_VOLUME` 时退回合成切面.
pub fn slices_from_env() -> Result<Vec<OwnedLabelSlice>, Box<dyn Error>> {
    match volume_path_from_env() {
        Some(p) => {
            let (axis, lap) = (axis_from_env(), lap_from_env());
            log::info!("loading {} (axis {axis}, lap {lap})", p.display());
            strided_slices(&load_volume(&p)?, axis, lap)
        }
        None => {
            log::info!("$PLANE8_VOLUME not set, using phantoms");
            Ok(phantoms())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phantom_count() {
        assert_eq!(phantoms().len(), 9 * 4 * 3 * 4);
    }

    #[test]
    fn test_strided_slices() {
        let v = LabelVolume::new(Array3::zeros((4, 21, 6))).unwrap();
        let s = strided_slices(&v, 2, 10).unwrap();
        // 补为 21^3, 从第 20 张开始: 20, 10.
        assert_eq!(s.len(), 2);
        assert!(s.iter().all(|x| x.as_immut().shape() == (21, 21)));
    }
}
