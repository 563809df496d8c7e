//! Scene and project context models.
//!
//! Scenes are owned by the upstream content pipeline; this core only reads
//! them. The project context carries the few project-level facts the
//! regeneration loop needs (budget scope, brand reference asset).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One timed segment of a generated video.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Scene {
    /// Unique scene identifier
    pub id: String,

    /// Zero-based position of the scene within the video
    pub index: u32,

    /// Scene type label from the content pipeline (e.g. "product", "lifestyle")
    pub scene_type: String,

    /// Scene duration in seconds
    pub duration_secs: f64,

    /// Voiceover narration for the scene, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narration: Option<String>,

    /// Natural-language prompt describing the intended visual
    pub visual_direction: String,

    /// Text overlays the composition step will place on this scene
    #[serde(default)]
    pub expected_overlays: Vec<String>,

    /// Expected shot framing (e.g. "close-up", "wide"), if specified
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_framing: Option<String>,

    /// URL of the currently rendered media for this scene, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
}

impl Scene {
    /// Create a new scene with the required fields.
    pub fn new(
        id: impl Into<String>,
        index: u32,
        scene_type: impl Into<String>,
        duration_secs: f64,
        visual_direction: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            index,
            scene_type: scene_type.into(),
            duration_secs,
            narration: None,
            visual_direction: visual_direction.into(),
            expected_overlays: Vec::new(),
            expected_framing: None,
            media_url: None,
        }
    }

    /// Set the narration text.
    pub fn with_narration(mut self, narration: impl Into<String>) -> Self {
        self.narration = Some(narration.into());
        self
    }

    /// Set the expected text overlays.
    pub fn with_overlays(mut self, overlays: Vec<String>) -> Self {
        self.expected_overlays = overlays;
        self
    }

    /// Set the expected shot framing.
    pub fn with_framing(mut self, framing: impl Into<String>) -> Self {
        self.expected_framing = Some(framing.into());
        self
    }

    /// Set the current media URL.
    pub fn with_media_url(mut self, url: impl Into<String>) -> Self {
        self.media_url = Some(url.into());
        self
    }
}

/// Project-level context for regeneration decisions.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProjectContext {
    /// Project identifier (budget and history scope)
    pub id: String,

    /// Brand name, used to reinforce on-brand prompts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_name: Option<String>,

    /// Brand reference image, if the asset library has one for this project
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_reference_url: Option<String>,
}

impl ProjectContext {
    /// Create a new project context.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            brand_name: None,
            brand_reference_url: None,
        }
    }

    /// Set the brand name.
    pub fn with_brand_name(mut self, name: impl Into<String>) -> Self {
        self.brand_name = Some(name.into());
        self
    }

    /// Set the brand reference image URL.
    pub fn with_reference_url(mut self, url: impl Into<String>) -> Self {
        self.brand_reference_url = Some(url.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_builders() {
        let scene = Scene::new("s1", 0, "product", 6.0, "a steaming cup of coffee")
            .with_narration("Start your morning right")
            .with_overlays(vec!["50% OFF".to_string()])
            .with_framing("close-up");

        assert_eq!(scene.id, "s1");
        assert_eq!(scene.expected_overlays.len(), 1);
        assert_eq!(scene.expected_framing.as_deref(), Some("close-up"));
        assert!(scene.media_url.is_none());
    }

    #[test]
    fn test_scene_deserializes_without_optional_fields() {
        let json = r#"{
            "id": "s2",
            "index": 1,
            "scene_type": "lifestyle",
            "duration_secs": 4.5,
            "visual_direction": "a runner at sunrise"
        }"#;
        let scene: Scene = serde_json::from_str(json).unwrap();
        assert!(scene.expected_overlays.is_empty());
        assert!(scene.narration.is_none());
    }
}
