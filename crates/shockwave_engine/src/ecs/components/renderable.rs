//! Renderable component for entities that can be drawn

use serde::{Deserialize, Serialize};

use crate::ecs::Component;

/// Component for entities drawn by the render system
///
/// The render backend resolves `model_path` to whatever visual resource
/// it manages; this record only names the asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderableComponent {
    /// Asset path of the model to draw
    pub model_path: String,

    /// Optional material override path
    pub material_path: Option<String>,

    /// Whether this object is currently drawn
    pub visible: bool,
}

impl Component for RenderableComponent {
    fn type_name() -> &'static str {
        "Renderable"
    }
}

impl RenderableComponent {
    /// Create a renderable for `model_path` with its default material
    pub fn new(model_path: impl Into<String>) -> Self {
        Self {
            model_path: model_path.into(),
            material_path: None,
            visible: true,
        }
    }

    /// Create a renderable with a material override
    pub fn with_material(model_path: impl Into<String>, material_path: impl Into<String>) -> Self {
        Self {
            model_path: model_path.into(),
            material_path: Some(material_path.into()),
            visible: true,
        }
    }
}
