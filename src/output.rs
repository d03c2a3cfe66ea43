use std::fs;
use std::io::{self, Write};

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

use crate::app::{CreateResult, TemplateResult};
use crate::assemble::{AssembledHub, HubRenderer};
use crate::error::HubError;

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Human,
    Json,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_create(result: &CreateResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_template(result: &TemplateResult) -> io::Result<()> {
        Self::print_json(result)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct HubDocument<'a> {
    generated_at: String,
    tool: String,
    hub: &'a AssembledHub,
}

/// Hands the assembled structure to downstream renderers as
/// `<output>/<hub>/hub.json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonHubWriter;

impl JsonHubWriter {
    pub fn document_path(output_dir: &Utf8Path, hub_name: &str) -> Utf8PathBuf {
        output_dir.join(hub_name).join("hub.json")
    }
}

impl HubRenderer for JsonHubWriter {
    fn render(&self, hub: &AssembledHub, output_dir: &Utf8Path) -> Result<Utf8PathBuf, HubError> {
        let path = Self::document_path(output_dir, &hub.name);
        let document = HubDocument {
            generated_at: chrono::Utc::now().to_rfc3339(),
            tool: format!("trackhub-gen/{}", env!("CARGO_PKG_VERSION")),
            hub,
        };
        let content =
            serde_json::to_vec_pretty(&document).map_err(|err| HubError::Render(err.to_string()))?;
        write_atomic(&path, &content)?;
        Ok(path)
    }
}

fn write_atomic(path: &Utf8Path, content: &[u8]) -> Result<(), HubError> {
    let parent = path
        .parent()
        .ok_or_else(|| HubError::Filesystem("invalid destination path".to_string()))?;
    fs::create_dir_all(parent.as_std_path())
        .map_err(|err| HubError::Filesystem(err.to_string()))?;
    let mut temp = tempfile::Builder::new()
        .prefix("trackhub-gen")
        .tempfile_in(parent.as_std_path())
        .map_err(|err| HubError::Filesystem(err.to_string()))?;
    temp.write_all(content)
        .map_err(|err| HubError::Filesystem(err.to_string()))?;
    temp.persist(path.as_std_path())
        .map_err(|err| HubError::Filesystem(err.to_string()))?;
    Ok(())
}
