use std::collections::HashSet;
use std::path::{Path, PathBuf};

use camino::Utf8PathBuf;
use serde::Serialize;

use crate::assemble::{
    AssembledHub, HubRenderer, assemble_annotation_hub, assemble_kind_hub, assemble_unified,
};
use crate::diagnostics::DiagnosticSink;
use crate::domain::{BrowserMode, Hub, HubLayout, TrackDescriptor, TrackKind};
use crate::error::HubError;
use crate::hierarchy::{group_by_annotation, of_kind};
use crate::identity::IdentityRules;
use crate::merge::{MergeReport, apply_sample_metadata};
use crate::resolve::resolve_patterns;
use crate::sheet::{SampleSheet, write_template};

#[derive(Debug, Clone)]
pub struct CreateRequest {
    pub signal_patterns: Vec<String>,
    pub annotation_patterns: Vec<String>,
    pub sample_sheet: Option<PathBuf>,
    pub sample_regex: Option<String>,
    pub annotation_regex: Option<String>,
    pub hub: Hub,
    pub layout: HubLayout,
    pub output_dir: Utf8PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateResult {
    pub output_dir: String,
    pub mode: BrowserMode,
    pub signal_tracks: usize,
    pub annotation_tracks: usize,
    pub samples: usize,
    pub merge: Option<MergeReport>,
    pub hubs: Vec<HubSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HubSummary {
    pub name: String,
    pub genome: String,
    pub tracks: usize,
    pub path: String,
    pub hub_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateResult {
    pub path: String,
}

#[derive(Clone)]
pub struct App<R: HubRenderer> {
    renderer: R,
}

impl<R: HubRenderer> App<R> {
    pub fn new(renderer: R) -> Self {
        Self { renderer }
    }

    /// Runs discovery, extraction, merge, grouping and projection to
    /// completion, then renders every assembled hub.
    pub fn create(
        &self,
        request: CreateRequest,
        sink: &dyn DiagnosticSink,
    ) -> Result<CreateResult, HubError> {
        if request.signal_patterns.is_empty() && request.annotation_patterns.is_empty() {
            return Err(HubError::NoInputs);
        }

        let rules = IdentityRules::new(
            request.sample_regex.as_deref(),
            request.annotation_regex.as_deref(),
        )?;
        let sheet = request
            .sample_sheet
            .as_deref()
            .map(|path| SampleSheet::load(path, sink))
            .transpose()?;

        let mut tracks = discover(&request, &rules, sink)?;
        let merge = sheet
            .as_ref()
            .map(|sheet| apply_sample_metadata(&mut tracks, sheet, sink));

        let hubs = assemble(&request.hub, request.layout, &tracks, sink);
        if hubs.is_empty() {
            sink.warn(format!(
                "No track files provided for hub {}",
                request.hub.name
            ));
        }

        let mut summaries = Vec::with_capacity(hubs.len());
        for hub in &hubs {
            let path = self.renderer.render(hub, &request.output_dir)?;
            sink.info(format!("Hub {} written to {path}", hub.name));
            let hub_url = hub.hub_txt_url();
            if let Some(url) = &hub_url {
                sink.info(format!("Hub URL: {url}"));
            }
            summaries.push(HubSummary {
                name: hub.name.clone(),
                genome: hub.genome.clone(),
                tracks: hub.track_count(),
                path: path.to_string(),
                hub_url,
            });
        }

        let samples = tracks
            .iter()
            .map(|track| track.sample_id.as_str())
            .collect::<HashSet<_>>()
            .len();

        Ok(CreateResult {
            output_dir: request.output_dir.to_string(),
            mode: request.hub.browser_mode,
            signal_tracks: of_kind(&tracks, TrackKind::Signal).len(),
            annotation_tracks: of_kind(&tracks, TrackKind::Annotation).len(),
            samples,
            merge,
            hubs: summaries,
        })
    }

    pub fn template(
        &self,
        path: &Path,
        sink: &dyn DiagnosticSink,
    ) -> Result<TemplateResult, HubError> {
        write_template(path)?;
        sink.info(format!(
            "Sample sheet template written to {}",
            path.display()
        ));
        Ok(TemplateResult {
            path: path.display().to_string(),
        })
    }
}

fn discover(
    request: &CreateRequest,
    rules: &IdentityRules,
    sink: &dyn DiagnosticSink,
) -> Result<Vec<TrackDescriptor>, HubError> {
    let mut tracks = Vec::new();
    for (kind, patterns) in [
        (TrackKind::Signal, &request.signal_patterns),
        (TrackKind::Annotation, &request.annotation_patterns),
    ] {
        for path in resolve_patterns(patterns, kind, sink)? {
            tracks.push(rules.describe(&path, kind));
        }
    }
    Ok(tracks)
}

fn assemble(
    hub: &Hub,
    layout: HubLayout,
    tracks: &[TrackDescriptor],
    sink: &dyn DiagnosticSink,
) -> Vec<AssembledHub> {
    if tracks.is_empty() {
        return Vec::new();
    }

    match layout {
        HubLayout::Unified => {
            let assembled = assemble_unified(hub, tracks, sink);
            sink.info(format!(
                "Unified hub {}: {} bigWig tracks, {} bigBed tracks",
                assembled.name,
                of_kind(tracks, TrackKind::Signal).len(),
                of_kind(tracks, TrackKind::Annotation).len()
            ));
            vec![assembled]
        }
        HubLayout::PerKind => {
            let mut hubs = Vec::new();
            let signal = of_kind(tracks, TrackKind::Signal);
            if !signal.is_empty() {
                hubs.push(assemble_kind_hub(hub, TrackKind::Signal, &signal, sink));
            }
            for group in group_by_annotation(tracks) {
                hubs.push(assemble_annotation_hub(hub, &group, sink));
            }
            hubs
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use camino::Utf8Path;

    use super::*;
    use crate::diagnostics::MemorySink;

    #[derive(Default)]
    struct RecordingRenderer {
        hubs: Mutex<Vec<AssembledHub>>,
    }

    impl HubRenderer for &RecordingRenderer {
        fn render(
            &self,
            hub: &AssembledHub,
            output_dir: &Utf8Path,
        ) -> Result<Utf8PathBuf, HubError> {
            self.hubs.lock().unwrap().push(hub.clone());
            Ok(output_dir.join(&hub.name))
        }
    }

    fn request(dir: &Path, layout: HubLayout) -> CreateRequest {
        CreateRequest {
            signal_patterns: vec![format!("{}/*.bw", dir.display())],
            annotation_patterns: vec![format!("{}/*.bb", dir.display())],
            sample_sheet: None,
            sample_regex: None,
            annotation_regex: None,
            hub: Hub::new("Ribo", "hg38", BrowserMode::Native),
            layout,
            output_dir: Utf8PathBuf::from("out"),
        }
    }

    fn seed(dir: &Path) {
        for name in ["S1_rep1.bw", "S2_rep1.bw", "S1_peaks.bb", "S2_genes.bb"] {
            std::fs::write(dir.join(name), b"").unwrap();
        }
    }

    #[test]
    fn per_kind_layout_renders_one_hub_per_annotation_type() {
        let temp = tempfile::tempdir().unwrap();
        seed(temp.path());
        let renderer = RecordingRenderer::default();
        let app = App::new(&renderer);

        let result = app
            .create(request(temp.path(), HubLayout::PerKind), &MemorySink::new())
            .unwrap();

        let names: Vec<String> = result.hubs.iter().map(|h| h.name.clone()).collect();
        assert_eq!(names, vec!["Ribo", "Ribo_peaks", "Ribo_genes"]);
        assert_eq!(result.hubs[0].tracks, 2);
        assert_eq!(renderer.hubs.lock().unwrap().len(), 3);
    }

    #[test]
    fn no_inputs_is_rejected() {
        let renderer = RecordingRenderer::default();
        let mut req = request(Path::new("."), HubLayout::Unified);
        req.signal_patterns.clear();
        req.annotation_patterns.clear();

        let err = App::new(&renderer)
            .create(req, &MemorySink::new())
            .unwrap_err();
        assert!(matches!(err, HubError::NoInputs));
    }

    #[test]
    fn empty_discovery_renders_nothing() {
        let temp = tempfile::tempdir().unwrap();
        let renderer = RecordingRenderer::default();
        let sink = MemorySink::new();

        let result = App::new(&renderer)
            .create(request(temp.path(), HubLayout::Unified), &sink)
            .unwrap();

        assert!(result.hubs.is_empty());
        assert_eq!(result.samples, 0);
        assert_eq!(sink.warnings().len(), 3);
    }
}
