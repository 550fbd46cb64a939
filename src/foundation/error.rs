pub type FolioResult<T> = Result<T, FolioError>;

#[derive(thiserror::Error, Debug)]
pub enum FolioError {
    /// The résumé (or another input file) could not be read.
    #[error("load error: {0}")]
    Load(String),

    /// The résumé was read but is not a valid document.
    #[error("parse error: {0}")]
    Parse(String),

    #[error("validation error: {0}")]
    Validation(String),

    /// The host document is missing a slot or cannot accept the rendered content.
    #[error("render error: {0}")]
    Render(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FolioError {
    pub fn load(msg: impl Into<String>) -> Self {
        Self::Load(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Load and parse failures are the only kind that switch the page to its fallback text.
    pub fn is_load_failure(&self) -> bool {
        matches!(self, Self::Load(_) | Self::Parse(_))
    }
}

impl From<serde_json::Error> for FolioError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
