use camino::Utf8Path;
use regex::Regex;

use crate::domain::{
    DEFAULT_ANNOTATION_TYPE, DEFAULT_PRIORITY, ExtraParams, TrackDescriptor, TrackKind,
};
use crate::error::HubError;

pub const SAMPLE_GROUP: &str = "sample_id";
pub const ANNOTATION_GROUP: &str = "annotation_type";

/// Optional user patterns for pulling identities out of file names.
#[derive(Debug, Clone, Default)]
pub struct IdentityRules {
    sample: Option<Regex>,
    annotation: Option<Regex>,
}

impl IdentityRules {
    pub fn new(sample: Option<&str>, annotation: Option<&str>) -> Result<Self, HubError> {
        Ok(Self {
            sample: sample.map(|raw| compile(raw, SAMPLE_GROUP)).transpose()?,
            annotation: annotation
                .map(|raw| compile(raw, ANNOTATION_GROUP))
                .transpose()?,
        })
    }

    pub fn sample_id(&self, filename: &str) -> String {
        self.sample
            .as_ref()
            .and_then(|re| capture(re, filename, SAMPLE_GROUP))
            .unwrap_or_else(|| default_sample_id(filename))
    }

    pub fn annotation_type(&self, filename: &str) -> String {
        self.annotation
            .as_ref()
            .and_then(|re| capture(re, filename, ANNOTATION_GROUP))
            .unwrap_or_else(|| default_annotation_type(filename))
    }

    /// Builds the descriptor for one resolved file, with filename-derived
    /// labels and empty display attributes.
    pub fn describe(&self, path: &Utf8Path, kind: TrackKind) -> TrackDescriptor {
        let filename = path
            .file_name()
            .map(str::to_string)
            .unwrap_or_else(|| path.as_str().to_string());
        let basename = strip_extension(&filename).to_string();
        let sample_id = self.sample_id(&filename);
        let annotation_type = match kind {
            TrackKind::Signal => None,
            TrackKind::Annotation => Some(self.annotation_type(&filename)),
        };

        TrackDescriptor {
            file_path: path.to_path_buf(),
            kind,
            sample_id,
            annotation_type,
            short_label: basename.clone(),
            long_label: basename.clone(),
            color: String::new(),
            visibility: String::new(),
            priority: DEFAULT_PRIORITY.to_string(),
            additional_params: ExtraParams::new(),
            filename,
            basename,
        }
    }
}

fn compile(raw: &str, group: &str) -> Result<Regex, HubError> {
    Regex::new(raw).map_err(|err| HubError::InvalidRegex {
        group: group.to_string(),
        message: err.to_string(),
    })
}

fn capture(re: &Regex, filename: &str, group: &str) -> Option<String> {
    re.captures(filename)
        .and_then(|caps| caps.name(group))
        .map(|found| found.as_str())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Drops the last extension. Leading dots belong to the name, so `.bw` stays
/// `.bw`.
pub fn strip_extension(filename: &str) -> &str {
    let offset = filename.len() - filename.trim_start_matches('.').len();
    match filename[offset..].rfind('.') {
        Some(idx) => &filename[..offset + idx],
        None => filename,
    }
}

pub fn default_sample_id(filename: &str) -> String {
    let basename = strip_extension(filename);
    let first = basename
        .split('.')
        .next()
        .and_then(|token| token.split('_').next())
        .unwrap_or_default();
    [first, basename, filename]
        .into_iter()
        .find(|candidate| !candidate.is_empty())
        .unwrap_or(filename)
        .to_string()
}

pub fn default_annotation_type(filename: &str) -> String {
    let basename = strip_extension(filename);
    basename
        .split('_')
        .nth(1)
        .and_then(|token| token.split('.').next())
        .filter(|token| !token.is_empty())
        .unwrap_or(DEFAULT_ANNOTATION_TYPE)
        .to_string()
}
