//! 通用常量.

/// 腕部标签图中的像素值.
pub mod label {
    /// 背景的像素值. 任何组织都不允许使用该值.
    pub const BACKGROUND: u8 = 0;

    /// 默认标签图中, 骨的像素值.
    pub const BONES: u8 = 1;

    /// 默认标签图中, 肌腱的像素值.
    pub const TENDONS: u8 = 2;

    /// 默认标签图中, 尺动脉的像素值.
    pub const ULNAR: u8 = 3;

    /// 像素是否是背景?
    #[inline]
    pub const fn is_background(p: u8) -> bool {
        matches!(p, BACKGROUND)
    }
}

/// 切面评分所用的组织名.
pub mod tissue {
    /// 骨.
    pub const BONES: &str = "bones";

    /// 肌腱.
    pub const TENDONS: &str = "tendons";

    /// 尺动脉.
    pub const ULNAR: &str = "ulnar";
}

/// 标准切面中应当出现的骨簇个数.
pub const STANDARD_BONES: usize = 7;

/// 标准切面中应当出现的肌腱簇个数.
pub const STANDARD_TENDONS: usize = 2;

/// 标准切面中应当出现的尺动脉簇个数.
pub const STANDARD_ULNAR: usize = 1;

/// 聚类结果标签图中, 第 `i` 个簇 (从 0 起) 的像素值为 `(i + 1) * CLUSTER_MAP_STEP`.
pub const CLUSTER_MAP_STEP: u16 = 10;
