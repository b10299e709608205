#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum Error {
    /// Got an invalid parameter value in a function
    InvalidParameter(String),
    /// The geometry of the input does not allow the tessellation to be
    /// constructed (coincident particles, particle outside of a non-periodic
    /// box, ...)
    Degenerate(String),
    /// Internal invariant violation, this is a bug in this crate
    Internal(String),
    /// Error used when a panic was caught
    Panic(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidParameter(e) => write!(f, "invalid parameter: {}", e),
            Error::Degenerate(e) => write!(f, "degenerate geometry: {}", e),
            Error::Internal(e) => write!(f, "internal error: {}", e),
            Error::Panic(e) => write!(f, "internal panic: {}", e),
        }
    }
}

impl std::error::Error for Error {}

// Box<dyn Any + Send + 'static> is the error type in std::panic::catch_unwind
impl From<Box<dyn std::any::Any + Send + 'static>> for Error {
    fn from(error: Box<dyn std::any::Any + Send + 'static>) -> Error {
        let message = if let Some(message) = error.downcast_ref::<String>() {
            message.clone()
        } else if let Some(message) = error.downcast_ref::<&str>() {
            (*message).to_owned()
        } else {
            "<panic message is not a string>".to_owned()
        };

        Error::Panic(message)
    }
}
