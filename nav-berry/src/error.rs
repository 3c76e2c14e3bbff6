//! 运行时错误.

/// 聚类与评分的运行时错误.
///
/// 某种组织在切片中一个像素都没有 **不是** 错误: 这种情况下聚类结果为空列表.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavError {
    /// 参数不合法 (切片形状, `eps`, `min_samples`, 组织像素值等).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// 聚类结果中缺少评分所需的组织.
    #[error("cluster set has no tissue named `{0}`")]
    MissingTissueKey(String),

    /// 组织表中组织名重复.
    #[error("tissue `{0}` is declared more than once")]
    DuplicateTissue(String),

    /// 解析 JSON 组织表失败.
    #[cfg(feature = "serde")]
    #[error("malformed tissue table: {0}")]
    Json(String),
}

/// 聚类 / 评分运行时结果.
pub type NavResult<T> = Result<T, NavError>;

impl NavError {
    /// 便捷构造 [`NavError::InvalidArgument`].
    #[inline]
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

#[cfg(feature = "serde")]
impl From<serde_json::Error> for NavError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e.to_string())
    }
}
