use image::ImageError;

/// Error type shared by the store, renderers, and the service facade.
///
/// Every variant maps to a distinct recoverable failure at the request
/// boundary; nothing here should ever abort the process.
#[derive(Debug)]
pub enum Error {
    /// Uploaded bytes could not be decoded as an image.
    InvalidImage(String),
    /// Unknown image id, or the entry has no grid where one is required.
    NotFound,
    /// Grid parameters missing, zero, or degenerate for the image size.
    InvalidGridParameters(String),
    /// Unrecognized operation type or disallowed rotation degree.
    InvalidOperation(String),
    /// PNG encoding failed while producing response bytes.
    Encode(ImageError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidImage(e) => write!(f, "invalid image: {}", e),
            Error::NotFound => write!(f, "not found"),
            Error::InvalidGridParameters(e) => write!(f, "invalid grid parameters: {}", e),
            Error::InvalidOperation(e) => write!(f, "invalid operation: {}", e),
            Error::Encode(e) => write!(f, "encode error: {}", e),
        }
    }
}

impl std::error::Error for Error {}

impl From<ImageError> for Error {
    fn from(e: ImageError) -> Self {
        Error::Encode(e)
    }
}
