use chart_insight_core::models::analytics::ChartSummary;
use chart_insight_core::models::answer::QuestionAnswer;
use chart_insight_core::models::chart::{
    CategoryAxis, ChartKind, ChartRecord, Series, RAW_RESPONSE_KEY,
};
use chart_insight_core::models::raw::RawResponse;
use chart_insight_core::models::settings::{ToleranceBand, ValidatorSettings};
use chart_insight_core::models::validation::{Severity, ValidationFinding, ValidationResult};
use serde_json::json;

// ═══════════════════════════════════════════════════════════════════
//  ChartKind
// ═══════════════════════════════════════════════════════════════════

mod chart_kind {
    use super::*;

    #[test]
    fn display_is_lowercase() {
        assert_eq!(ChartKind::Bar.to_string(), "bar");
        assert_eq!(ChartKind::Scatter.to_string(), "scatter");
        assert_eq!(ChartKind::Unknown.to_string(), "unknown");
    }

    #[test]
    fn parse_loose_is_case_insensitive() {
        assert_eq!(ChartKind::parse_loose("BAR"), Some(ChartKind::Bar));
        assert_eq!(ChartKind::parse_loose("Line"), Some(ChartKind::Line));
        assert_eq!(ChartKind::parse_loose("  pie "), Some(ChartKind::Pie));
    }

    #[test]
    fn parse_loose_strips_prompt_suffixes() {
        assert_eq!(ChartKind::parse_loose("bar_chart"), Some(ChartKind::Bar));
        assert_eq!(ChartKind::parse_loose("scatter_plot"), Some(ChartKind::Scatter));
        assert_eq!(ChartKind::parse_loose("Area Chart"), Some(ChartKind::Area));
        assert_eq!(ChartKind::parse_loose("combo-chart"), Some(ChartKind::Combo));
    }

    #[test]
    fn parse_loose_aliases() {
        assert_eq!(ChartKind::parse_loose("column"), Some(ChartKind::Bar));
        assert_eq!(ChartKind::parse_loose("doughnut"), Some(ChartKind::Pie));
        assert_eq!(ChartKind::parse_loose("mixed"), Some(ChartKind::Combo));
    }

    #[test]
    fn parse_loose_rejects_unknown_names() {
        assert_eq!(ChartKind::parse_loose("table"), None);
        assert_eq!(ChartKind::parse_loose("unknown"), None);
        assert_eq!(ChartKind::parse_loose(""), None);
    }

    #[test]
    fn display_roundtrips_through_parse_loose() {
        for kind in ChartKind::ALL {
            if kind == ChartKind::Unknown {
                continue;
            }
            assert_eq!(ChartKind::parse_loose(&kind.to_string()), Some(kind));
        }
    }

    #[test]
    fn requires_categories() {
        assert!(ChartKind::Bar.requires_categories());
        assert!(ChartKind::Line.requires_categories());
        assert!(ChartKind::Area.requires_categories());
        assert!(ChartKind::Combo.requires_categories());
        assert!(!ChartKind::Pie.requires_categories());
        assert!(!ChartKind::Scatter.requires_categories());
        assert!(!ChartKind::Unknown.requires_categories());
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ChartKind::Combo).unwrap(), "\"combo\"");
        let back: ChartKind = serde_json::from_str("\"area\"").unwrap();
        assert_eq!(back, ChartKind::Area);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Series & CategoryAxis
// ═══════════════════════════════════════════════════════════════════

mod series {
    use super::*;

    #[test]
    fn numeric_values_skip_missing() {
        let s = Series::new("s", vec![Some(1.0), None, Some(3.0)]);
        assert_eq!(s.numeric_values().collect::<Vec<_>>(), vec![1.0, 3.0]);
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn all_missing() {
        assert!(Series::new("s", vec![None, None]).is_all_missing());
        assert!(Series::new("s", vec![]).is_all_missing());
        assert!(!Series::from_numbers("s", &[0.0]).is_all_missing());
    }

    #[test]
    fn serializes_missing_as_null() {
        let s = Series::new("Revenue", vec![Some(100.0), None]);
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v, json!({"label": "Revenue", "values": [100.0, null]}));
    }

    #[test]
    fn category_axis_is_a_plain_array() {
        let axis = CategoryAxis::new(["Q1", "Q2"]);
        assert_eq!(serde_json::to_value(&axis).unwrap(), json!(["Q1", "Q2"]));
        assert_eq!(axis.get(1), Some("Q2"));
        assert_eq!(axis.get(2), None);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  ChartRecord
// ═══════════════════════════════════════════════════════════════════

mod chart_record {
    use super::*;

    #[test]
    fn empty_record() {
        let r = ChartRecord::empty(ChartKind::Line);
        assert_eq!(r.kind, ChartKind::Line);
        assert!(r.title.is_none());
        assert!(r.categories.is_none());
        assert!(r.series.is_empty());
        assert!(r.metadata.is_empty());
    }

    #[test]
    fn unparsed_keeps_raw_text() {
        let r = ChartRecord::unparsed("garbage");
        assert_eq!(r.kind, ChartKind::Unknown);
        assert_eq!(r.metadata_value(RAW_RESPONSE_KEY), Some("garbage"));
    }

    #[test]
    fn data_point_count_ignores_missing() {
        let mut r = ChartRecord::empty(ChartKind::Bar);
        r.series.push(Series::new("a", vec![Some(1.0), None]));
        r.series.push(Series::from_numbers("b", &[2.0, 3.0]));
        assert_eq!(r.data_point_count(), 3);
    }

    #[test]
    fn metadata_serializes_in_key_order() {
        let mut r = ChartRecord::empty(ChartKind::Pie);
        r.metadata.insert("zeta".into(), "1".into());
        r.metadata.insert("alpha".into(), "2".into());
        let json = serde_json::to_string(&r).unwrap();
        assert!(json.find("alpha").unwrap() < json.find("zeta").unwrap());
    }

    #[test]
    fn absent_title_and_categories_are_omitted() {
        let v = serde_json::to_value(ChartRecord::empty(ChartKind::Bar)).unwrap();
        assert!(v.get("title").is_none());
        assert!(v.get("categories").is_none());
        assert_eq!(v["kind"], "bar");
    }

    #[test]
    fn serde_roundtrip() {
        let mut r = ChartRecord::empty(ChartKind::Bar);
        r.title = Some("Sales".into());
        r.categories = Some(CategoryAxis::new(["a", "b"]));
        r.series.push(Series::new("s", vec![Some(1.5), None]));
        r.metadata.insert("unit".into(), "USD".into());

        let json = serde_json::to_string(&r).unwrap();
        let back: ChartRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(r, back);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  ValidationFinding / ValidationResult
// ═══════════════════════════════════════════════════════════════════

mod validation {
    use super::*;

    #[test]
    fn finding_display() {
        let f = ValidationFinding::error("series", "no data extracted");
        assert_eq!(f.to_string(), "[error] series: no data extracted");
        let w = ValidationFinding::warning("categories", "duplicate categories: a");
        assert_eq!(w.to_string(), "[warning] categories: duplicate categories: a");
    }

    #[test]
    fn is_valid_without_errors() {
        let r = ValidationResult::new(
            ChartRecord::empty(ChartKind::Pie),
            vec![ValidationFinding::warning("x", "y")],
        );
        assert!(r.is_valid);
        assert_eq!(r.warnings().count(), 1);
        assert_eq!(r.errors().count(), 0);
    }

    #[test]
    fn invalid_with_any_error() {
        let r = ValidationResult::new(
            ChartRecord::empty(ChartKind::Pie),
            vec![
                ValidationFinding::warning("x", "y"),
                ValidationFinding::error("a", "b"),
            ],
        );
        assert!(!r.is_valid);
    }

    #[test]
    fn severity_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Severity::Warning).unwrap(), "\"warning\"");
    }
}

// ═══════════════════════════════════════════════════════════════════
//  ValidatorSettings
// ═══════════════════════════════════════════════════════════════════

mod settings {
    use super::*;
    use chart_insight_core::errors::CoreError;

    #[test]
    fn defaults() {
        let s = ValidatorSettings::default();
        assert_eq!(s.pie_sum_tolerance, ToleranceBand::new(90.0, 110.0));
        assert_eq!(s.min_confidence, 0.7);
        assert!(s.unit_keys.contains(&"unit".to_string()));
        assert!(s.validate().is_ok());
    }

    #[test]
    fn band_is_inclusive() {
        let band = ToleranceBand::new(90.0, 110.0);
        assert!(band.contains(90.0));
        assert!(band.contains(110.0));
        assert!(!band.contains(110.01));
        assert!(!band.contains(89.99));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let s = ValidatorSettings::from_json(r#"{"min_confidence": 0.5}"#).unwrap();
        assert_eq!(s.min_confidence, 0.5);
        assert_eq!(s.pie_sum_tolerance, ToleranceBand::new(90.0, 110.0));
    }

    #[test]
    fn custom_tolerance_from_json() {
        let s = ValidatorSettings::from_json(r#"{"pie_sum_tolerance": {"min": 95, "max": 105}}"#)
            .unwrap();
        assert_eq!(s.pie_sum_tolerance, ToleranceBand::new(95.0, 105.0));
    }

    #[test]
    fn inverted_band_rejected() {
        let err = ValidatorSettings::default()
            .with_pie_tolerance(110.0, 90.0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidSettings(_)));
    }

    #[test]
    fn confidence_out_of_range_rejected() {
        let err = ValidatorSettings::from_json(r#"{"min_confidence": 1.5}"#).unwrap_err();
        assert!(matches!(err, CoreError::InvalidSettings(_)));
    }

    #[test]
    fn malformed_json_is_deserialization_error() {
        let err = ValidatorSettings::from_json("{not json").unwrap_err();
        assert!(matches!(err, CoreError::Deserialization(_)));
    }
}

// ═══════════════════════════════════════════════════════════════════
//  QuestionAnswer
// ═══════════════════════════════════════════════════════════════════

mod question_answer {
    use super::*;

    #[test]
    fn structured_answer() {
        let a = QuestionAnswer::from_value(json!({
            "answer": "Q4 is highest",
            "evidence": "Q4 bar reaches 120",
            "confidence": 0.9
        }));
        assert_eq!(a.answer, "Q4 is highest");
        assert_eq!(a.evidence.as_deref(), Some("Q4 bar reaches 120"));
        assert_eq!(a.confidence, Some(0.9));
    }

    #[test]
    fn prose_becomes_the_answer() {
        let a = QuestionAnswer::from_raw(&RawResponse::from("  The highest value is 42. "));
        assert_eq!(a.answer, "The highest value is 42.");
        assert!(a.evidence.is_none());
        assert!(a.confidence.is_none());
    }

    #[test]
    fn out_of_range_confidence_dropped() {
        let a = QuestionAnswer::from_value(json!({"answer": "x", "confidence": 95}));
        assert!(a.confidence.is_none());
    }

    #[test]
    fn fenced_answer() {
        let text = "```json\n{\"answer\": \"yes\", \"confidence\": \"0.8\"}\n```";
        let a = QuestionAnswer::from_raw(&RawResponse::from(text));
        assert_eq!(a.answer, "yes");
        assert_eq!(a.confidence, Some(0.8));
    }
}

// ═══════════════════════════════════════════════════════════════════
//  ChartSummary
// ═══════════════════════════════════════════════════════════════════

#[test]
fn chart_summary_serde_roundtrip() {
    let summary = ChartSummary {
        kind: ChartKind::Bar,
        title: None,
        series_count: 0,
        data_point_count: 0,
        highest: None,
        lowest: None,
        statistics: vec![],
    };
    let json = serde_json::to_string(&summary).unwrap();
    let back: ChartSummary = serde_json::from_str(&json).unwrap();
    assert_eq!(summary, back);
}
