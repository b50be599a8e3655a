use std::fmt;
use std::io::Write;

use blake3::Hash;

use crate::error::Result;
use crate::geometry::Measured;
use crate::layout::{LayoutResult, Row};

/// How an adapter should merge a result into what it already shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Discard everything and render the result from scratch.
    Full,
    /// Drop the previously-last row, then append the result's rows.
    ReplaceLast,
}

/// Presentation layer fed by layout passes.
pub trait RenderAdapter<T> {
    fn apply(&mut self, result: &LayoutResult<T>, mode: RenderMode) -> Result<()>;
}

/// Markup naming knobs.
#[derive(Debug, Clone)]
pub struct RendererSettings {
    pub container_class: String,
    pub row_class: String,
    pub item_class: String,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            container_class: "barrel-container".to_string(),
            row_class: "barrel-row".to_string(),
            item_class: "barrel-item".to_string(),
        }
    }
}

/// Presentation state derived from one laid out item.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedItem {
    pub label: String,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone)]
pub struct RenderedRow {
    pub items: Vec<RenderedItem>,
    pub height: f64,
    hash: Hash,
}

impl RenderedRow {
    fn from_row<T: Measured + fmt::Display>(row: &Row<T>) -> Self {
        let items: Vec<RenderedItem> = row
            .items
            .iter()
            .map(|item| RenderedItem {
                label: item.to_string(),
                width: item.width_at(row.height),
                height: row.height,
            })
            .collect();

        let mut hasher = blake3::Hasher::new();
        hasher.update(&row.height.to_le_bytes());
        for item in &items {
            hasher.update(item.label.as_bytes());
            hasher.update(&[0]);
            hasher.update(&item.width.to_le_bytes());
        }

        Self {
            items,
            height: row.height,
            hash: hasher.finalize(),
        }
    }
}

/// Adapter that owns its row container and renders it as list markup.
///
/// Rows are fingerprinted so callers can ask which ones actually changed since
/// the last flush; re-applying an identical row does not mark it dirty.
#[derive(Debug, Default)]
pub struct MarkupRenderer {
    settings: RendererSettings,
    mounted: bool,
    rows: Vec<RenderedRow>,
    flushed: Vec<Hash>,
}

impl MarkupRenderer {
    pub fn new(settings: RendererSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn with_default() -> Self {
        Self::new(RendererSettings::default())
    }

    pub fn settings_mut(&mut self) -> &mut RendererSettings {
        &mut self.settings
    }

    /// Whether the container has been created by a first pass.
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn rows(&self) -> &[RenderedRow] {
        &self.rows
    }

    /// Rows that are new or changed since the previous call, by row index.
    pub fn take_dirty(&mut self) -> Vec<(usize, RenderedRow)> {
        let dirty = self
            .rows
            .iter()
            .enumerate()
            .filter(|(idx, row)| self.flushed.get(*idx) != Some(&row.hash))
            .map(|(idx, row)| (idx, row.clone()))
            .collect();
        self.flushed = self.rows.iter().map(|row| row.hash).collect();
        dirty
    }

    pub fn has_dirty(&self) -> bool {
        self.rows.len() != self.flushed.len()
            || self
                .rows
                .iter()
                .zip(&self.flushed)
                .any(|(row, hash)| row.hash != *hash)
    }

    /// Write the whole container as markup.
    pub fn write_markup(&self, writer: &mut impl Write) -> Result<()> {
        writeln!(
            writer,
            "<ul class=\"{}\">",
            escape(&self.settings.container_class)
        )?;
        for row in &self.rows {
            writeln!(writer, "  <li class=\"{}\">", escape(&self.settings.row_class))?;
            for item in &row.items {
                writeln!(
                    writer,
                    "    <span class=\"{}\" style=\"display: inline-block; height: {}px\">{}</span>",
                    escape(&self.settings.item_class),
                    item.height,
                    escape(&item.label)
                )?;
            }
            writeln!(writer, "  </li>")?;
        }
        writeln!(writer, "</ul>")?;
        writer.flush()?;
        Ok(())
    }
}

impl<T: Measured + fmt::Display> RenderAdapter<T> for MarkupRenderer {
    fn apply(&mut self, result: &LayoutResult<T>, mode: RenderMode) -> Result<()> {
        match mode {
            RenderMode::Full => self.rows.clear(),
            RenderMode::ReplaceLast => {
                self.rows.pop();
            }
        }
        self.mounted = true;
        self.rows
            .extend(result.rows.iter().map(RenderedRow::from_row));
        Ok(())
    }
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
