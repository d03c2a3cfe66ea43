use std::fmt;

use camino::Utf8PathBuf;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type ExtraParams = Map<String, Value>;

pub const DEFAULT_PRIORITY: &str = "1";
pub const DEFAULT_ANNOTATION_TYPE: &str = "default";
pub const DEFAULT_HUB_EMAIL: &str = "noreply@example.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TrackKind {
    Signal,
    Annotation,
}

impl TrackKind {
    /// Lowercase tag used in track and composite names.
    pub fn file_tag(self) -> &'static str {
        match self {
            TrackKind::Signal => "bigwig",
            TrackKind::Annotation => "bigbed",
        }
    }

    pub fn browser_type(self) -> &'static str {
        match self {
            TrackKind::Signal => "bigWig",
            TrackKind::Annotation => "bigBed",
        }
    }

    pub fn default_color(self) -> &'static str {
        match self {
            TrackKind::Signal => "0,0,100",
            TrackKind::Annotation => "0,100,0",
        }
    }

    pub fn default_visibility(self) -> &'static str {
        match self {
            TrackKind::Signal => "full",
            TrackKind::Annotation => "pack",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum BrowserMode {
    /// UCSC conventions with nested composite tracks.
    #[default]
    Native,
    /// Flat track list plus Ensembl type/format fields and genome names.
    CrossCompatible,
}

impl fmt::Display for BrowserMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrowserMode::Native => write!(f, "native"),
            BrowserMode::CrossCompatible => write!(f, "cross-compatible"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum HubLayout {
    /// One hub holding every track, samples in sorted order.
    #[default]
    Unified,
    /// One signal hub plus one hub per annotation type.
    PerKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hub {
    pub name: String,
    pub genome: String,
    pub browser_mode: BrowserMode,
    pub email: String,
    pub url: Option<String>,
    pub description: Option<String>,
}

impl Hub {
    pub fn new(name: impl Into<String>, genome: impl Into<String>, mode: BrowserMode) -> Self {
        Self {
            name: name.into(),
            genome: genome.into(),
            browser_mode: mode,
            email: DEFAULT_HUB_EMAIL.to_string(),
            url: None,
            description: None,
        }
    }
}

/// One row of the sample sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleMetadata {
    pub sample_id: String,
    pub short_label: String,
    pub long_label: String,
    pub color: String,
    pub visibility: String,
    pub priority: String,
    pub additional_params: ExtraParams,
}

impl SampleMetadata {
    pub fn new(sample_id: impl Into<String>) -> Self {
        let sample_id = sample_id.into();
        Self {
            short_label: sample_id.clone(),
            long_label: sample_id.clone(),
            sample_id,
            color: String::new(),
            visibility: String::new(),
            priority: DEFAULT_PRIORITY.to_string(),
            additional_params: ExtraParams::new(),
        }
    }
}

/// A discovered track file plus the display attributes derived for it.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackDescriptor {
    pub file_path: Utf8PathBuf,
    pub kind: TrackKind,
    pub filename: String,
    pub basename: String,
    pub sample_id: String,
    pub annotation_type: Option<String>,
    pub short_label: String,
    pub long_label: String,
    pub color: String,
    pub visibility: String,
    pub priority: String,
    pub additional_params: ExtraParams,
}

impl TrackDescriptor {
    pub fn track_name(&self) -> String {
        format!("{}_{}", self.kind.file_tag(), self.basename)
    }
}
