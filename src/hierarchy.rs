use std::collections::HashMap;

use crate::domain::{DEFAULT_ANNOTATION_TYPE, TrackDescriptor, TrackKind};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GroupOrder {
    /// Keys appear in the order they were first seen.
    #[default]
    Encounter,
    /// Keys sorted lexicographically.
    Sorted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompositeGroup<'a> {
    pub key: String,
    pub tracks: Vec<&'a TrackDescriptor>,
}

pub fn group_by_sample<'a, I>(tracks: I, order: GroupOrder) -> Vec<CompositeGroup<'a>>
where
    I: IntoIterator<Item = &'a TrackDescriptor>,
{
    let mut groups = group_by(tracks, |track| track.sample_id.clone());
    if order == GroupOrder::Sorted {
        groups.sort_by(|a, b| a.key.cmp(&b.key));
    }
    groups
}

/// Groups annotation tracks by annotation type; signal tracks are ignored.
pub fn group_by_annotation<'a, I>(tracks: I) -> Vec<CompositeGroup<'a>>
where
    I: IntoIterator<Item = &'a TrackDescriptor>,
{
    let annotations = tracks
        .into_iter()
        .filter(|track| track.kind == TrackKind::Annotation);
    group_by(annotations, |track| {
        track
            .annotation_type
            .clone()
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_ANNOTATION_TYPE.to_string())
    })
}

pub fn flatten<'a>(groups: &[CompositeGroup<'a>]) -> Vec<&'a TrackDescriptor> {
    groups
        .iter()
        .flat_map(|group| group.tracks.iter().copied())
        .collect()
}

pub fn of_kind<'a>(tracks: &'a [TrackDescriptor], kind: TrackKind) -> Vec<&'a TrackDescriptor> {
    tracks.iter().filter(|track| track.kind == kind).collect()
}

fn group_by<'a, I, F>(tracks: I, key_of: F) -> Vec<CompositeGroup<'a>>
where
    I: IntoIterator<Item = &'a TrackDescriptor>,
    F: Fn(&TrackDescriptor) -> String,
{
    let mut groups: Vec<CompositeGroup<'a>> = Vec::new();
    let mut index = HashMap::<String, usize>::new();
    for track in tracks {
        let key = key_of(track);
        match index.get(&key) {
            Some(&slot) => groups[slot].tracks.push(track),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(CompositeGroup {
                    key,
                    tracks: vec![track],
                });
            }
        }
    }
    groups
}
