//! Tools and their per-tool brush settings.

use crate::objects::{BrushKind, SerializableColor};
use serde::{Deserialize, Serialize};

/// The active tool. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ToolKind {
    #[default]
    Pencil,
    Highlighter,
    Eraser,
    Select,
}

impl ToolKind {
    /// The brush this tool draws with, if it draws at all.
    pub fn brush_kind(&self) -> Option<BrushKind> {
        match self {
            ToolKind::Pencil => Some(BrushKind::Pencil),
            ToolKind::Highlighter => Some(BrushKind::Highlighter),
            ToolKind::Eraser | ToolKind::Select => None,
        }
    }
}

/// Size and color for one drawing tool.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrushSettings {
    pub size: f64,
    pub color: SerializableColor,
}

/// Per-tool settings, kept independently so switching tools preserves each
/// tool's last configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSettings {
    pub pencil: BrushSettings,
    pub highlighter: BrushSettings,
    pub eraser_size: f64,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            pencil: BrushSettings {
                size: 2.5,
                color: SerializableColor::black(),
            },
            highlighter: BrushSettings {
                size: 7.0,
                color: SerializableColor::new(0xFA, 0xCC, 0x15, 255),
            },
            eraser_size: 12.0,
        }
    }
}

impl ToolSettings {
    /// Brush settings for a drawing tool. `None` for eraser and select.
    pub fn brush(&self, tool: ToolKind) -> Option<&BrushSettings> {
        match tool {
            ToolKind::Pencil => Some(&self.pencil),
            ToolKind::Highlighter => Some(&self.highlighter),
            ToolKind::Eraser | ToolKind::Select => None,
        }
    }

    pub fn brush_mut(&mut self, tool: ToolKind) -> Option<&mut BrushSettings> {
        match tool {
            ToolKind::Pencil => Some(&mut self.pencil),
            ToolKind::Highlighter => Some(&mut self.highlighter),
            ToolKind::Eraser | ToolKind::Select => None,
        }
    }

    /// Set the size for a tool. The eraser has a size but no color; select
    /// has neither and ignores this.
    pub fn set_size(&mut self, tool: ToolKind, size: f64) {
        match tool {
            ToolKind::Eraser => self.eraser_size = size,
            _ => {
                if let Some(brush) = self.brush_mut(tool) {
                    brush.size = size;
                }
            }
        }
    }

    /// Set the color for a drawing tool. Ignored for eraser and select.
    pub fn set_color(&mut self, tool: ToolKind, color: SerializableColor) {
        if let Some(brush) = self.brush_mut(tool) {
            brush.color = color;
        }
    }
}
