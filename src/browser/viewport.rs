use serde::{Deserialize, Serialize};

/// A named screen-size preset, applied when a session opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportConfig {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

impl ViewportConfig {
    pub fn new(name: &str, width: u32, height: u32) -> Self {
        Self {
            name: name.to_string(),
            width,
            height,
        }
    }

    pub fn desktop() -> Self {
        Self::new("Desktop", 1280, 800)
    }

    pub fn mobile() -> Self {
        Self::new("Mobile", 375, 812)
    }

    /// Desktop then Mobile, the order navigation groups run in.
    pub fn presets() -> Vec<ViewportConfig> {
        vec![Self::desktop(), Self::mobile()]
    }
}
