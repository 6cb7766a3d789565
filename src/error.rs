#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("Config directory not found")]
    NoConfigDir,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Metadata API error (status {status}): {message}")]
    Metadata { status: u16, message: String },

    #[error("Anime {0} not found")]
    NotFound(String),

    #[error("Failed to parse API response: {0}")]
    Parse(String),

    #[error("AnimeFLV request failed: {0}")]
    AnimeFlv(String),
}

pub type Result<T> = std::result::Result<T, Error>;
