// Column Classifier: parse a wide measure-column name into (crop, metric).
//
// Wide column names follow the convention `<CROP NAME> <METRIC> [unit]`,
// e.g. "RICE AREA (1000 ha)" or "PEARL MILLET PRODUCTION (1000 tons)".
// The metric vocabulary is closed: AREA, PRODUCTION, YIELD. Classification
// is total over that vocabulary — a name matching zero or multiple metric
// tokens is a contract violation, not a best-effort extraction.
use crate::error::ClassificationError;
use crate::types::{MeasureKey, Metric};

/// Classify one non-identity column name.
///
/// - The metric token must appear as a whitespace-delimited word, matched
///   case-sensitively.
/// - The crop name is every word before the metric token, preserved intact
///   (multi-word crops like "PEARL MILLET" stay one crop).
/// - Everything after the metric token (unit annotations such as
///   "(1000 ha)" or "(Kg per ha)") is discarded; units carry no identity.
pub fn classify(column_name: &str) -> Result<MeasureKey, ClassificationError> {
    let words: Vec<&str> = column_name.split_whitespace().collect();
    let mut matched: Vec<(usize, Metric)> = Vec::new();
    for (idx, word) in words.iter().enumerate() {
        if let Some(metric) = Metric::from_token(word) {
            matched.push((idx, metric));
        }
    }
    if matched.is_empty() {
        return Err(ClassificationError::NoMetricFound {
            column: column_name.to_string(),
        });
    }
    if matched.len() > 1 {
        return Err(ClassificationError::AmbiguousMetric {
            column: column_name.to_string(),
            matched: matched.into_iter().map(|(_, m)| m).collect(),
        });
    }
    let (idx, metric) = matched[0];
    Ok(MeasureKey {
        crop: words[..idx].join(" "),
        metric,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_single_word_crop() {
        let key = classify("RICE AREA (1000 ha)").unwrap();
        assert_eq!(key.crop, "RICE");
        assert_eq!(key.metric, Metric::Area);
    }

    #[test]
    fn preserves_multi_word_crop() {
        let key = classify("PEARL MILLET PRODUCTION (1000 tons)").unwrap();
        assert_eq!(key.crop, "PEARL MILLET");
        assert_eq!(key.metric, Metric::Production);
    }

    #[test]
    fn discards_unit_suffix_without_parens() {
        let key = classify("WHEAT YIELD (Kg per ha)").unwrap();
        assert_eq!(key.crop, "WHEAT");
        assert_eq!(key.metric, Metric::Yield);
    }

    #[test]
    fn identity_column_has_no_metric() {
        let err = classify("Dist Code").unwrap_err();
        assert_eq!(
            err,
            ClassificationError::NoMetricFound {
                column: "Dist Code".to_string()
            }
        );
    }

    #[test]
    fn metric_match_is_case_sensitive() {
        assert!(matches!(
            classify("Rice Area (1000 ha)"),
            Err(ClassificationError::NoMetricFound { .. })
        ));
    }

    #[test]
    fn two_metric_tokens_are_ambiguous() {
        let err = classify("RICE AREA YIELD (junk)").unwrap_err();
        match err {
            ClassificationError::AmbiguousMetric { matched, .. } => {
                assert_eq!(matched, vec![Metric::Area, Metric::Yield]);
            }
            other => panic!("expected AmbiguousMetric, got {other:?}"),
        }
    }

    #[test]
    fn repeated_metric_token_is_ambiguous() {
        assert!(matches!(
            classify("RICE AREA AREA"),
            Err(ClassificationError::AmbiguousMetric { .. })
        ));
    }
}
