//! 实验结果.

use crate::algos::Profile;
use std::io::{self, Write};

/// 将 `p` 的结果写进 `w` 中.
fn describe_into<W: Write>(name: &str, p: &Profile, w: &mut W) -> io::Result<()> {
    const S4: &str = "    ";

    #[inline]
    fn f64_to_display(f: Option<f64>) -> String {
        match f {
            Some(f) => format!("{f:.6}"),
            None => "/".to_string(),
        }
    }

    writeln!(w, "Profile `{name}`:")?;
    writeln!(w, "{S4}Background slices: {}", p.background())?;
    writeln!(w, "{S4}Scored slices: {}", p.scored())?;
    writeln!(w, "{S4}Standard planes (zero loss): {}", p.standard())?;
    writeln!(w, "{S4}Average loss: {}", f64_to_display(p.avg_loss()))?;
    writeln!(w, "{S4}Average clusters: {} per slice", f64_to_display(p.avg_clusters()))?;
    writeln!(w, "{S4}Effective total time: {} us", p.score_time_us())?;
    writeln!(
        w,
        "{S4}Effective average time: {} us",
        f64_to_display(p.avg_score_time_us())
    )?;
    writeln!(w, "{S4}Total machine time: {} us", p.real_time_us())?;
    match p.slowest() {
        Some(d) => write!(w, "{S4}Slowest slice costs {} us", d.as_micros())?,
        None => write!(w, "{S4}Slowest slice costs / us")?,
    }
    Ok(())
}

/// 消融实验最终结果.
pub struct AblationResult {
    data: Vec<(&'static str, Profile)>,
}

impl AblationResult {
    pub fn from_iter<I: IntoIterator<Item = (&'static str, Profile)>>(it: I) -> Self {
        Self {
            data: it.into_iter().collect(),
        }
    }

    /// 打印运行结果.
    pub fn analyze(&self) {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        utils::sep_to(&mut out);
        for (key, profile) in self.data.iter() {
            describe_into(key, profile, &mut out).unwrap();
            writeln!(out).unwrap();
            utils::sep_to(&mut out);
        }
    }
}
