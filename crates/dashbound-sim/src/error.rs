use dashbound_core::CoreError;

#[derive(Debug)]
pub enum SimError {
    Core(CoreError),
    Encode(String),
    Decode(String),
    Config(String),
}

impl std::fmt::Display for SimError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Core(e) => write!(f, "{e}"),
            Self::Encode(e) => write!(f, "snapshot encode error: {e}"),
            Self::Decode(e) => write!(f, "snapshot decode error: {e}"),
            Self::Config(e) => write!(f, "config error: {e}"),
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Core(e) => Some(e),
            Self::Encode(_) | Self::Decode(_) | Self::Config(_) => None,
        }
    }
}

impl From<CoreError> for SimError {
    fn from(e: CoreError) -> Self {
        Self::Core(e)
    }
}
