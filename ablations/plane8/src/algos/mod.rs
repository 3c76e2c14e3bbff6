mod profile;

use nav_berry::prelude::*;

pub use profile::Profile;

/// 用 `mode` 提取每张切片的簇并评分.
fn run_mode(name: &str, slices: &[OwnedLabelSlice], mode: ExtractMode) -> Profile {
    let spec = TissueSpec::wrist();
    let scorer = PlaneQualityScorer::default();
    let mut profile = Profile::new();

    println!("{name}: {} slices...", slices.len());
    for slice in slices {
        let slice = slice.as_immut();
        if slice.is_background() {
            profile.count_background();
            continue;
        }
        profile.scored_start();
        let set = extract_by(&spec, &slice, mode);
        let loss = scorer.score(&set).expect("wrist table covers every scored tissue");
        profile.scored_elapsed();

        let clusters = set.iter().map(|(_, c)| c.len()).sum();
        profile.record(clusters, loss);
    }
    profile.finish()
}

pub fn connected4(slices: &[OwnedLabelSlice]) -> Profile {
    run_mode("connected-4", slices, ExtractMode::Connected(Connectivity::Four))
}

pub fn connected8(slices: &[OwnedLabelSlice]) -> Profile {
    run_mode("connected-8", slices, ExtractMode::Connected(Connectivity::Eight))
}

pub fn density(slices: &[OwnedLabelSlice]) -> Profile {
    run_mode("dbscan", slices, ExtractMode::Density(utils::wrist_dbscan()))
}
