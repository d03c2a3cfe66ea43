use serde::Serialize;

use crate::diagnostics::DiagnosticSink;
use crate::domain::{SampleMetadata, TrackDescriptor};
use crate::sheet::SampleSheet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    pub matched: usize,
    pub unmatched: usize,
}

pub fn apply_sample_metadata(
    tracks: &mut [TrackDescriptor],
    sheet: &SampleSheet,
    sink: &dyn DiagnosticSink,
) -> MergeReport {
    let mut report = MergeReport::default();
    for track in tracks.iter_mut() {
        match sheet.get(&track.sample_id) {
            Some(metadata) => {
                apply_metadata(track, metadata);
                report.matched += 1;
            }
            None => {
                sink.warn(format!(
                    "No metadata found for sample ID: {} ({})",
                    track.sample_id, track.filename
                ));
                report.unmatched += 1;
            }
        }
    }
    report
}

/// The sheet always owns the labels; display attributes only fill gaps.
pub fn apply_metadata(track: &mut TrackDescriptor, metadata: &SampleMetadata) {
    track.short_label = metadata.short_label.clone();
    track.long_label = metadata.long_label.clone();

    fill_if_empty(&mut track.color, &metadata.color);
    fill_if_empty(&mut track.visibility, &metadata.visibility);
    // Descriptors start with a priority, so this rarely fires.
    fill_if_empty(&mut track.priority, &metadata.priority);

    for (key, value) in &metadata.additional_params {
        track.additional_params.insert(key.clone(), value.clone());
    }
}

fn fill_if_empty(slot: &mut String, value: &str) {
    if slot.is_empty() && !value.is_empty() {
        *slot = value.to_string();
    }
}

#[cfg(test)]
mod tests {
    use camino::Utf8Path;
    use serde_json::json;

    use super::*;
    use crate::diagnostics::MemorySink;
    use crate::domain::TrackKind;
    use crate::identity::IdentityRules;

    fn track(name: &str) -> TrackDescriptor {
        IdentityRules::default().describe(Utf8Path::new(name), TrackKind::Signal)
    }

    fn metadata() -> SampleMetadata {
        let mut meta = SampleMetadata::new("S1");
        meta.short_label = "Sample one".to_string();
        meta.long_label = "Sample one, wild type".to_string();
        meta.color = "255,0,0".to_string();
        meta.visibility = "dense".to_string();
        meta.priority = "7".to_string();
        meta.additional_params.insert("autoScale".to_string(), json!("off"));
        meta
    }

    #[test]
    fn labels_overwrite_and_attributes_fill() {
        let mut tracks = vec![track("S1_rep1.bw")];
        tracks[0].color = "1,2,3".to_string();
        tracks[0]
            .additional_params
            .insert("autoScale".to_string(), json!("on"));
        tracks[0]
            .additional_params
            .insert("maxHeightPixels".to_string(), json!("64:32:8"));

        let sheet: SampleSheet = [metadata()].into_iter().collect();
        let report = apply_sample_metadata(&mut tracks, &sheet, &MemorySink::new());

        assert_eq!(report, MergeReport { matched: 1, unmatched: 0 });
        let merged = &tracks[0];
        assert_eq!(merged.short_label, "Sample one");
        assert_eq!(merged.long_label, "Sample one, wild type");
        assert_eq!(merged.color, "1,2,3");
        assert_eq!(merged.visibility, "dense");
        assert_eq!(merged.priority, "1");
        assert_eq!(merged.additional_params["autoScale"], "off");
        assert_eq!(merged.additional_params["maxHeightPixels"], "64:32:8");
    }

    #[test]
    fn unmatched_sample_warns_and_keeps_defaults() {
        let mut tracks = vec![track("S2_rep1.bw")];
        let sheet: SampleSheet = [metadata()].into_iter().collect();
        let sink = MemorySink::new();

        let report = apply_sample_metadata(&mut tracks, &sheet, &sink);

        assert_eq!(report.unmatched, 1);
        assert_eq!(tracks[0].short_label, "S2_rep1");
        assert!(tracks[0].visibility.is_empty());
        assert_eq!(sink.warnings().len(), 1);
        assert!(sink.warnings()[0].contains("S2"));
    }

    #[test]
    fn empty_priority_is_filled() {
        let mut target = track("S1_rep1.bw");
        target.priority.clear();
        apply_metadata(&mut target, &metadata());
        assert_eq!(target.priority, "7");
    }
}
