//! Tests for error types.

#[cfg(test)]
mod tests {
    use super::super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("tick interval cannot be 0");
        assert_eq!(
            err.to_string(),
            "configuration error: tick interval cannot be 0"
        );
    }

    #[test]
    fn test_invalid_argument_display() {
        let err = Error::invalid_argument("unknown watch handle 7");
        assert_eq!(err.to_string(), "invalid argument: unknown watch handle 7");
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_watch_setup_display() {
        let err = Error::watch_setup("/tmp/missing", "directory does not exist");
        assert_eq!(
            err.to_string(),
            "failed to watch path '/tmp/missing': directory does not exist"
        );
        assert!(!err.is_invalid_argument());
    }

    #[test]
    fn test_sink_error_display() {
        let err = Error::sink("listener raised");
        assert_eq!(err.to_string(), "sink delivery failed: listener raised");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_serialization_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_ok() -> Result<u32> {
            Ok(1)
        }

        fn returns_err() -> Result<u32> {
            Err(Error::invalid_argument("empty path"))
        }

        assert!(returns_ok().is_ok());
        assert!(returns_err().is_err());
    }

    #[test]
    fn test_error_debug_format() {
        let err = Error::SinkDeliveryFailed("closed pipe".to_string());
        let debug_str = format!("{err:?}");
        assert!(debug_str.contains("SinkDeliveryFailed"));
        assert!(debug_str.contains("closed pipe"));
    }
}
