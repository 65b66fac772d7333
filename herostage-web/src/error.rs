use thiserror::Error;

/// Why the hero asset could not be loaded. Every variant is recovered by
/// substituting the fallback cube.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("HTTP {status} while fetching {url}")]
    Status { url: String, status: u16 },

    #[error("Invalid glTF: {0}")]
    Parse(#[from] gltf::Error),

    #[error("Asset contains no scene")]
    EmptyScene,
}

#[derive(Error, Debug)]
pub enum StageError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Renderer error: {0}")]
    Render(String),

    #[error("Frame scheduling failed: {0}")]
    Scheduler(String),

    #[error("Page error: {0}")]
    Page(String),

    #[error("Model already loaded")]
    AlreadyLoaded,
}
