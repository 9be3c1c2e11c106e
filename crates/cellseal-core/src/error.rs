use thiserror::Error;

pub type CellsealResult<T> = Result<T, CellsealError>;

#[derive(Debug, Error)]
pub enum CellsealError {
    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CellsealError::Config("unknown auth_mode".into());
        assert_eq!(err.to_string(), "config error: unknown auth_mode");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: CellsealError = io_err.into();
        assert!(matches!(err, CellsealError::Io(_)));
    }
}
