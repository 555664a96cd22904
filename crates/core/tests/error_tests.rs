// ═══════════════════════════════════════════════════════════════════
// Error Tests: CoreError variants, Display formatting, From impls
// ═══════════════════════════════════════════════════════════════════

use chart_insight_core::errors::CoreError;

// ── Display formatting ──────────────────────────────────────────────

mod display {
    use super::*;

    #[test]
    fn invalid_settings() {
        let err = CoreError::InvalidSettings("min > max".into());
        assert_eq!(err.to_string(), "Invalid settings: min > max");
    }

    #[test]
    fn serialization() {
        let err = CoreError::Serialization("key must be a string".into());
        assert_eq!(err.to_string(), "Serialization error: key must be a string");
    }

    #[test]
    fn deserialization() {
        let err = CoreError::Deserialization("unexpected EOF".into());
        assert_eq!(err.to_string(), "Deserialization error: unexpected EOF");
    }

    #[test]
    fn export() {
        let err = CoreError::Export {
            format: "csv".into(),
            message: "write failed".into(),
        };
        assert_eq!(err.to_string(), "Export failed (csv): write failed");
    }
}

// ── From impls ──────────────────────────────────────────────────────

mod conversions {
    use super::*;

    #[test]
    fn from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: CoreError = json_err.into();
        assert!(matches!(err, CoreError::Deserialization(_)));
    }

    #[test]
    fn from_utf8_error() {
        let utf8_err = String::from_utf8(vec![0xff, 0xfe]).unwrap_err();
        let err: CoreError = utf8_err.into();
        match err {
            CoreError::Export { format, .. } => assert_eq!(format, "csv"),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn question_mark_propagates() {
        fn parse(s: &str) -> Result<serde_json::Value, CoreError> {
            Ok(serde_json::from_str(s)?)
        }
        assert!(parse("[1]").is_ok());
        assert!(matches!(parse("nope"), Err(CoreError::Deserialization(_))));
    }
}

#[test]
fn implements_std_error() {
    fn assert_error<E: std::error::Error + Send + Sync + 'static>() {}
    assert_error::<CoreError>();
}
