use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

use crate::diagnostics::DiagnosticSink;
use crate::domain::{BrowserMode, Hub, TrackDescriptor, TrackKind};
use crate::error::HubError;
use crate::hierarchy::{CompositeGroup, GroupOrder, group_by_sample};
use crate::project::{TrackParams, project_track, translate_genome};

/// Structure handed to the external hub renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssembledHub {
    pub name: String,
    pub short_label: String,
    pub long_label: String,
    pub genome: String,
    pub email: String,
    pub url: Option<String>,
    pub description: Option<String>,
    pub mode: BrowserMode,
    pub entries: Vec<TrackDbEntry>,
}

impl AssembledHub {
    pub fn track_count(&self) -> usize {
        self.entries
            .iter()
            .map(|entry| match entry {
                TrackDbEntry::Composite(composite) => composite.tracks.len(),
                TrackDbEntry::Track(_) => 1,
            })
            .sum()
    }

    pub fn hub_txt_url(&self) -> Option<String> {
        self.url.as_deref().map(|base| hub_txt_url(base, &self.name))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "entry", rename_all = "lowercase")]
pub enum TrackDbEntry {
    Composite(CompositeTrack),
    Track(TrackParams),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositeTrack {
    pub name: String,
    pub tracktype: String,
    pub short_label: String,
    pub long_label: String,
    pub visibility: String,
    pub tracks: Vec<TrackParams>,
}

/// External collaborator that turns an assembled hub into files.
pub trait HubRenderer {
    fn render(&self, hub: &AssembledHub, output_dir: &Utf8Path) -> Result<Utf8PathBuf, HubError>;
}

pub fn hub_txt_url(base: &str, hub_name: &str) -> String {
    format!("{}/{hub_name}/hub.txt", base.trim_end_matches('/'))
}

/// One hub with every track; a pair of composites per sample in native mode.
pub fn assemble_unified(
    hub: &Hub,
    tracks: &[TrackDescriptor],
    sink: &dyn DiagnosticSink,
) -> AssembledHub {
    let mut assembled = empty_hub(
        hub,
        hub.name.clone(),
        hub.name.clone(),
        format!("{} Track Hub", hub.name),
        sink,
    );

    for group in group_by_sample(tracks, GroupOrder::Sorted) {
        for kind in [TrackKind::Signal, TrackKind::Annotation] {
            let members: Vec<&TrackDescriptor> = group
                .tracks
                .iter()
                .copied()
                .filter(|track| track.kind == kind)
                .collect();
            if members.is_empty() {
                continue;
            }
            let composite = CompositeSpec {
                name: format!("composite_{}_{}", group.key, kind.file_tag()),
                short_label: format!("{} ({})", group.key, kind.browser_type()),
                long_label: format!("{} tracks for {}", kind_title(kind), group.key),
                kind,
            };
            push_group(&mut assembled.entries, composite, &members, hub.browser_mode, sink);
        }
    }
    assembled
}

/// Hub for tracks of a single kind, one composite per sample.
pub fn assemble_kind_hub(
    hub: &Hub,
    kind: TrackKind,
    tracks: &[&TrackDescriptor],
    sink: &dyn DiagnosticSink,
) -> AssembledHub {
    let mut assembled = empty_hub(
        hub,
        hub.name.clone(),
        hub.name.clone(),
        format!("{} - {} Tracks", hub.name, kind.file_tag().to_uppercase()),
        sink,
    );
    let groups = group_by_sample(tracks.iter().copied(), GroupOrder::Encounter);
    push_sample_groups(&mut assembled.entries, &groups, kind, hub.browser_mode, sink, |key| {
        format!("Tracks for {key}")
    });
    assembled
}

/// Hub named `{hub}_{annotation_type}` holding one annotation group.
pub fn assemble_annotation_hub(
    hub: &Hub,
    annotation: &CompositeGroup<'_>,
    sink: &dyn DiagnosticSink,
) -> AssembledHub {
    let annotation_type = annotation.key.as_str();
    let mut assembled = empty_hub(
        hub,
        format!("{}_{annotation_type}", hub.name),
        annotation_type.to_string(),
        format!("{} - {annotation_type} Annotations", hub.name),
        sink,
    );
    let groups = group_by_sample(annotation.tracks.iter().copied(), GroupOrder::Encounter);
    push_sample_groups(
        &mut assembled.entries,
        &groups,
        TrackKind::Annotation,
        hub.browser_mode,
        sink,
        |key| format!("{annotation_type} annotations for {key}"),
    );
    assembled
}

struct CompositeSpec {
    name: String,
    short_label: String,
    long_label: String,
    kind: TrackKind,
}

fn empty_hub(
    hub: &Hub,
    name: String,
    short_label: String,
    long_label: String,
    sink: &dyn DiagnosticSink,
) -> AssembledHub {
    AssembledHub {
        name,
        short_label,
        long_label,
        genome: translate_genome(&hub.genome, hub.browser_mode, sink),
        email: hub.email.clone(),
        url: hub.url.clone(),
        description: hub.description.clone(),
        mode: hub.browser_mode,
        entries: Vec::new(),
    }
}

fn push_sample_groups<F>(
    entries: &mut Vec<TrackDbEntry>,
    groups: &[CompositeGroup<'_>],
    kind: TrackKind,
    mode: BrowserMode,
    sink: &dyn DiagnosticSink,
    long_label: F,
) where
    F: Fn(&str) -> String,
{
    for group in groups {
        let composite = CompositeSpec {
            name: format!("composite_{}", group.key),
            short_label: group.key.clone(),
            long_label: long_label(&group.key),
            kind,
        };
        push_group(entries, composite, &group.tracks, mode, sink);
    }
}

/// Native mode nests the tracks under a composite; cross-compatible mode lists
/// them flat.
fn push_group(
    entries: &mut Vec<TrackDbEntry>,
    composite: CompositeSpec,
    tracks: &[&TrackDescriptor],
    mode: BrowserMode,
    sink: &dyn DiagnosticSink,
) {
    match mode {
        BrowserMode::CrossCompatible => entries.extend(
            tracks
                .iter()
                .map(|track| TrackDbEntry::Track(project_track(track, mode, None, sink))),
        ),
        BrowserMode::Native => {
            let children = tracks
                .iter()
                .map(|track| project_track(track, mode, Some(&composite.name), sink))
                .collect();
            entries.push(TrackDbEntry::Composite(CompositeTrack {
                tracktype: composite.kind.browser_type().to_string(),
                visibility: composite.kind.default_visibility().to_string(),
                name: composite.name,
                short_label: composite.short_label,
                long_label: composite.long_label,
                tracks: children,
            }));
        }
    }
}

fn kind_title(kind: TrackKind) -> &'static str {
    match kind {
        TrackKind::Signal => "BigWig",
        TrackKind::Annotation => "BigBed",
    }
}
