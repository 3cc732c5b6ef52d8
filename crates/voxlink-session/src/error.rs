/// Errors from an intent or speech collaborator.
///
/// These never reach the device: the session substitutes a fallback reply
/// or empty audio.
#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    /// The service could not be reached or refused the request.
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),

    /// The service answered with something unusable.
    #[error("invalid collaborator response: {0}")]
    InvalidResponse(String),

    #[error("collaborator I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("collaborator json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("audio file error: {0}")]
    Wav(#[from] hound::Error),
}

/// Errors that end a session. The server logs them and keeps accepting.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] voxlink_transport::TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] voxlink_frame::FrameError),

    /// JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading or writing an audio file failed.
    #[error("audio file error: {0}")]
    Wav(#[from] hound::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Server configuration is unusable.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, SessionError>;
