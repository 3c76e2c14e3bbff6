//! 提取与评分的运行统计.

use std::time::{Duration, Instant};

/// 可累加的计时器.
///
/// 每次 `start` 与 `elapsed` 之间的时长都会累加进总时长.
#[derive(Clone, Debug)]
struct AccTimer {
    consumed: Duration,
    since: Instant,
}

impl AccTimer {
    /// 初始化计时器, 视为已经开始计时.
    #[inline]
    fn new() -> Self {
        Self {
            consumed: Duration::ZERO,
            since: Instant::now(),
        }
    }

    /// 开始 (或重新开始) 一轮计时.
    #[inline]
    fn start(&mut self) {
        self.since = Instant::now();
    }

    /// 结束本轮计时并累加, 返回本轮时长.
    ///
    /// 上一次调用必须是 `self.start()`.
    #[inline]
    fn elapsed(&mut self) -> Duration {
        let d = self.since.elapsed();
        self.consumed += d;
        d
    }

    /// 累计时长 (微秒).
    #[inline]
    fn total_us(&self) -> u64 {
        self.consumed.as_micros() as u64
    }
}

/// 一种提取方式在全部切片上的统计.
#[derive(Clone, Debug)]
pub struct Profile {
    /// 纯背景切片个数. 它们不参与提取.
    background: u64,

    /// 参与提取与评分的切片个数.
    scored: u64,

    /// 提取加评分的总时间.
    score_time: AccTimer,

    /// 整个任务的总时间.
    real_time: AccTimer,

    /// 最慢的一次提取加评分. 尚无记录时为 `None`.
    slowest: Option<Duration>,

    /// 全部簇的个数.
    clusters: u64,

    /// 损失之和.
    loss_sum: f64,

    /// 损失为 0 (标准切面) 的切片个数.
    standard: u64,
}

impl Profile {
    /// 初始化. 总计时从此刻开始.
    #[inline]
    pub fn new() -> Self {
        Self {
            background: 0,
            scored: 0,
            score_time: AccTimer::new(),
            real_time: AccTimer::new(),
            slowest: None,
            clusters: 0,
            loss_sum: 0.0,
            standard: 0,
        }
    }

    /// 记录一张纯背景切片.
    #[inline]
    pub fn count_background(&mut self) {
        self.background += 1;
    }

    /// 记录一张待评分切片, 并开始计时.
    #[inline]
    pub fn scored_start(&mut self) {
        self.scored += 1;
        self.score_time.start();
    }

    /// 结束一次评分计时.
    #[inline]
    pub fn scored_elapsed(&mut self) {
        let d = self.score_time.elapsed();
        self.slowest = Some(self.slowest.map_or(d, |s| s.max(d)));
    }

    /// 记录一次评分结果.
    #[inline]
    pub fn record(&mut self, clusters: usize, loss: f64) {
        self.clusters += clusters as u64;
        self.loss_sum += loss;
        if loss == 0.0 {
            self.standard += 1;
        }
    }

    /// 结束全部计时.
    #[inline]
    pub fn finish(mut self) -> Self {
        self.real_time.elapsed();
        self
    }

    #[inline]
    pub fn background(&self) -> u64 {
        self.background
    }

    #[inline]
    pub fn scored(&self) -> u64 {
        self.scored
    }

    #[inline]
    pub fn standard(&self) -> u64 {
        self.standard
    }

    /// 提取加评分的总时间 (微秒).
    #[inline]
    pub fn score_time_us(&self) -> u64 {
        self.score_time.total_us()
    }

    /// 任务总时间 (微秒).
    #[inline]
    pub fn real_time_us(&self) -> u64 {
        self.real_time.total_us()
    }

    /// 每张切片的平均耗时 (微秒). 没有评分切片时为 `None`.
    #[inline]
    pub fn avg_score_time_us(&self) -> Option<f64> {
        self.per_scored(self.score_time_us() as f64)
    }

    /// 每张切片的平均簇数.
    #[inline]
    pub fn avg_clusters(&self) -> Option<f64> {
        self.per_scored(self.clusters as f64)
    }

    /// 平均损失.
    #[inline]
    pub fn avg_loss(&self) -> Option<f64> {
        self.per_scored(self.loss_sum)
    }

    #[inline]
    pub fn slowest(&self) -> Option<Duration> {
        self.slowest
    }

    fn per_scored(&self, v: f64) -> Option<f64> {
        match self.scored {
            0 => None,
            n => Some(v / n as f64),
        }
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::new()
    }
}
