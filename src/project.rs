use serde_json::Value;

use crate::diagnostics::DiagnosticSink;
use crate::domain::{BrowserMode, ExtraParams, TrackDescriptor, TrackKind};

pub type TrackParams = ExtraParams;

/// Assembly names rewritten for cross-compatible hubs. Not exhaustive.
pub const GENOME_ALIASES: &[(&str, &str)] = &[("hg38", "GRCh38"), ("hg19", "GRCh37")];

/// Parameters only the native browser understands.
pub fn native_only_params(kind: TrackKind) -> &'static [&'static str] {
    match kind {
        TrackKind::Signal => &["graphType", "viewLimits", "smoothingWindow"],
        TrackKind::Annotation => &["scoreFilter", "itemRgb", "spectrum"],
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalDefaults {
    pub auto_scale: Option<&'static str>,
    pub always_zero: Option<&'static str>,
}

/// Ensembl wants the file format spelled out on every track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompatFields {
    pub track_type: &'static str,
    pub format: &'static str,
}

/// Everything needed to describe one track, before flattening into a
/// parameter map. Layers apply in order: recognized fields and kind defaults,
/// then mode fields, then `extra`, which overrides all of them.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackSettings {
    pub name: String,
    pub source: String,
    pub tracktype: &'static str,
    pub short_label: String,
    pub long_label: String,
    pub visibility: String,
    pub color: String,
    pub priority: String,
    pub parent: Option<String>,
    pub signal: Option<SignalDefaults>,
    pub compat: Option<CompatFields>,
    pub extra: ExtraParams,
}

impl TrackSettings {
    pub fn from_descriptor(track: &TrackDescriptor, mode: BrowserMode) -> Self {
        let signal = match track.kind {
            TrackKind::Signal => Some(SignalDefaults {
                auto_scale: (!track.additional_params.contains_key("autoScale")).then_some("on"),
                always_zero: (!track.additional_params.contains_key("alwaysZero"))
                    .then_some("on"),
            }),
            TrackKind::Annotation => None,
        };
        let compat = match mode {
            BrowserMode::Native => None,
            BrowserMode::CrossCompatible => Some(CompatFields {
                track_type: track.kind.browser_type(),
                format: track.kind.browser_type(),
            }),
        };

        Self {
            name: track.track_name(),
            source: track.file_path.to_string(),
            tracktype: track.kind.browser_type(),
            short_label: track.short_label.clone(),
            long_label: track.long_label.clone(),
            visibility: or_default(&track.visibility, track.kind.default_visibility()),
            color: or_default(&track.color, track.kind.default_color()),
            priority: track.priority.clone(),
            parent: None,
            signal,
            compat,
            extra: track.additional_params.clone(),
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn into_params(self) -> TrackParams {
        let mut params = TrackParams::new();
        let mut put = |key: &str, value: String| {
            params.insert(key.to_string(), Value::String(value));
        };

        put("name", self.name);
        put("source", self.source);
        put("visibility", self.visibility);
        put("tracktype", self.tracktype.to_string());
        put("short_label", self.short_label);
        put("long_label", self.long_label);
        put("color", self.color);
        put("priority", self.priority);
        if let Some(parent) = self.parent {
            put("parent", parent);
        }
        if let Some(signal) = self.signal {
            if let Some(value) = signal.auto_scale {
                put("autoScale", value.to_string());
            }
            if let Some(value) = signal.always_zero {
                put("alwaysZero", value.to_string());
            }
        }
        if let Some(compat) = self.compat {
            put("type", compat.track_type.to_string());
            put("format", compat.format.to_string());
        }

        for (key, value) in self.extra {
            params.insert(key, value);
        }
        params
    }
}

fn or_default(value: &str, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

/// Final parameter map for one track in the requested browser convention.
pub fn project_track(
    track: &TrackDescriptor,
    mode: BrowserMode,
    parent: Option<&str>,
    sink: &dyn DiagnosticSink,
) -> TrackParams {
    if mode == BrowserMode::CrossCompatible {
        for key in native_only_params(track.kind) {
            if track.additional_params.contains_key(*key) {
                sink.warn(format!(
                    "Parameter {key} on {} is not supported by cross-compatible browsers",
                    track.filename
                ));
            }
        }
    }

    let settings = TrackSettings::from_descriptor(track, mode);
    match parent {
        Some(parent) => settings.with_parent(parent).into_params(),
        None => settings.into_params(),
    }
}

pub fn translate_genome(genome: &str, mode: BrowserMode, sink: &dyn DiagnosticSink) -> String {
    if mode == BrowserMode::Native {
        return genome.to_string();
    }
    for (from, to) in GENOME_ALIASES {
        if let Some(rest) = genome.strip_prefix(from) {
            let translated = format!("{to}{rest}");
            sink.info(format!(
                "Converting genome name from {genome} to {translated} for Ensembl compatibility"
            ));
            return translated;
        }
    }
    genome.to_string()
}
