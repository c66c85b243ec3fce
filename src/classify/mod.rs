//! Query classification.
//!
//! Turns raw query text into a [`SearchIntent`]. Rules are tried in order and the
//! first match wins:
//!
//! 1. only digits: a geoname id
//! 2. `CODE[|CODE...]:` or `CODE[|CODE...] ` followed by a coordinate: a feature list
//! 3. a coordinate pair in decimal, DMS or mixed notation
//! 4. anything else: free text

mod coordinate;
mod intent;

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

pub use coordinate::{parse_coordinate, Notation, ParsedCoordinate};
pub use intent::SearchIntent;

static GEONAME_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("geoname id regex should compile"));

static FEATURE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Z][A-Z0-9]*(?:\|[A-Z][A-Z0-9]*)*)(?::\s*|\s+)(.+)$")
        .expect("feature prefix regex should compile")
});

static FEATURE_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z][A-Z0-9]{1,9}$").expect("feature code regex should compile")
});

/// Classify raw query text. Never fails; unrecognized input becomes free text.
pub fn classify(input: &str) -> SearchIntent {
    let text = input.trim();

    let intent = classify_geoname_id(text)
        .or_else(|| classify_feature_list(text))
        .or_else(|| {
            parse_coordinate(text).map(|c| SearchIntent::Coordinate {
                latitude: c.latitude,
                longitude: c.longitude,
            })
        })
        .unwrap_or_else(|| SearchIntent::ListGeneral {
            query: text.to_string(),
        });

    debug!("Classified '{}' as {}", text, intent.name());
    intent
}

fn classify_geoname_id(text: &str) -> Option<SearchIntent> {
    if !GEONAME_ID.is_match(text) {
        return None;
    }
    // Ids beyond u64 fall through to the other rules.
    text.parse::<u64>()
        .ok()
        .map(|id| SearchIntent::GeonameId { id })
}

fn classify_feature_list(text: &str) -> Option<SearchIntent> {
    let caps = FEATURE_PREFIX.captures(text)?;
    let coordinate = parse_coordinate(&caps[2])?;

    let mut feature_classes: Vec<String> = Vec::new();
    let mut feature_codes: Vec<String> = Vec::new();

    for token in caps[1].split('|') {
        let bucket = if FEATURE_CODE.is_match(token) {
            &mut feature_codes
        } else {
            &mut feature_classes
        };
        if !bucket.iter().any(|existing| existing == token) {
            bucket.push(token.to_string());
        }
    }

    Some(SearchIntent::ListWithFeatures {
        latitude: coordinate.latitude,
        longitude: coordinate.longitude,
        feature_classes,
        feature_codes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_geoname_id() {
        assert_eq!(classify("197877"), SearchIntent::GeonameId { id: 197877 });
        assert_eq!(classify("  197877  "), SearchIntent::GeonameId { id: 197877 });
        assert_eq!(classify("\t2950159\n"), SearchIntent::GeonameId { id: 2950159 });
    }

    #[test]
    fn test_internal_whitespace_is_not_an_id() {
        assert_eq!(
            classify("123 456"),
            SearchIntent::Coordinate {
                latitude: 123.0,
                longitude: 456.0
            }
        );
    }

    #[test]
    fn test_oversized_id_is_free_text() {
        assert_eq!(
            classify("99999999999999999999999"),
            SearchIntent::ListGeneral {
                query: "99999999999999999999999".to_string()
            }
        );
    }

    #[test]
    fn test_decimal_coordinate() {
        assert_eq!(
            classify("51.05811,13.74133"),
            SearchIntent::Coordinate {
                latitude: 51.05811,
                longitude: 13.74133
            }
        );
    }

    #[test]
    fn test_dms_coordinate() {
        match classify("51°3′29.196″N,13°44′28.788″E") {
            SearchIntent::Coordinate {
                latitude,
                longitude,
            } => {
                assert_abs_diff_eq!(latitude, 51.05811, epsilon = 1e-5);
                assert_abs_diff_eq!(longitude, 13.74133, epsilon = 1e-5);
            }
            other => panic!("expected coordinate, got {:?}", other),
        }
    }

    #[test]
    fn test_feature_code_list() {
        match classify("AIRP 52°31′12.108″N,13°24′17.604″E") {
            SearchIntent::ListWithFeatures {
                latitude,
                longitude,
                feature_classes,
                feature_codes,
            } => {
                assert_eq!(feature_codes, vec!["AIRP".to_string()]);
                assert!(feature_classes.is_empty());
                assert_abs_diff_eq!(latitude, 52.52003, epsilon = 1e-5);
                assert_abs_diff_eq!(longitude, 13.40489, epsilon = 1e-5);
            }
            other => panic!("expected feature list, got {:?}", other),
        }
    }

    #[test]
    fn test_feature_classes_and_codes() {
        match classify("  P|AIRP|HTL|P: 52.52003, 13.40489 ") {
            SearchIntent::ListWithFeatures {
                feature_classes,
                feature_codes,
                latitude,
                ..
            } => {
                assert_eq!(feature_classes, vec!["P".to_string()]);
                assert_eq!(feature_codes, vec!["AIRP".to_string(), "HTL".to_string()]);
                assert_eq!(latitude, 52.52003);
            }
            other => panic!("expected feature list, got {:?}", other),
        }
    }

    #[test]
    fn test_prefix_without_coordinate_is_free_text() {
        assert_eq!(
            classify("AIRP Berlin"),
            SearchIntent::ListGeneral {
                query: "AIRP Berlin".to_string()
            }
        );
    }

    #[test]
    fn test_free_text() {
        assert_eq!(
            classify("Berlin Mitte"),
            SearchIntent::ListGeneral {
                query: "Berlin Mitte".to_string()
            }
        );
        assert_eq!(
            classify("   Dresden  "),
            SearchIntent::ListGeneral {
                query: "Dresden".to_string()
            }
        );
    }

    #[test]
    fn test_separator_equivalence() {
        let expected = classify("51.05811,13.74133");
        for text in [
            "51.05811|13.74133",
            "51.05811/13.74133",
            "51.05811 13.74133",
            "  51.05811 , 13.74133  ",
            "51.05811\t13.74133",
        ] {
            assert_eq!(classify(text), expected, "separator in {:?}", text);
        }

        let expected = classify("51°3′29.196″N,13°44′28.788″E");
        for separator in ["|", "/", " "] {
            let text = format!("51°3′29.196″N{}13°44′28.788″E", separator);
            assert_eq!(classify(&text), expected);
        }

        let expected = classify("AIRP 52.52003,13.40489");
        for separator in ["|", "/", " "] {
            let text = format!("AIRP 52.52003{}13.40489", separator);
            assert_eq!(classify(&text), expected);
        }
    }

    #[test]
    fn test_out_of_range_is_still_a_coordinate() {
        assert_eq!(
            classify("95.0, 200.0"),
            SearchIntent::Coordinate {
                latitude: 95.0,
                longitude: 200.0
            }
        );
    }
}
