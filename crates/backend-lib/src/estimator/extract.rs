//! Numeric extraction from free-text model responses

use regex::Regex;
use std::sync::OnceLock;

/// Extraction strategy: free text in, optional footprint value out.
///
/// The sampling loop treats extraction as pluggable so alternate response
/// formats can be supported without touching the loop itself.
pub type SampleExtractor = fn(&str) -> Option<f64>;

static KG_CO2E_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Extract the first decimal number followed by the unit text `kg CO2e`,
/// tolerating case and spacing variations ("12 kg CO2e", "8.5kg co2e").
///
/// Returns `None` when the text carries no such value; the caller decides
/// whether that drops a sample or fails an operation.
pub fn extract_kg_co2e(text: &str) -> Option<f64> {
    let pattern = KG_CO2E_PATTERN.get_or_init(|| {
        Regex::new(r"(?i)([0-9]+(?:\.[0-9]+)?)\s*kg\s*co2e").expect("valid footprint pattern")
    });

    pattern
        .captures(text)
        .and_then(|captures| captures.get(1))
        .and_then(|value| value.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_plain_integer() {
        assert_eq!(extract_kg_co2e("12 kg CO2e"), Some(12.0));
    }

    #[test]
    fn test_extracts_decimal_value() {
        assert_eq!(extract_kg_co2e("The estimate is 8.5 kg CO2e."), Some(8.5));
    }

    #[test]
    fn test_tolerates_case_and_spacing() {
        assert_eq!(extract_kg_co2e("42kg co2e"), Some(42.0));
        assert_eq!(extract_kg_co2e("42 KG CO2E"), Some(42.0));
        assert_eq!(extract_kg_co2e("42 kgCO2e"), Some(42.0));
    }

    #[test]
    fn test_first_match_wins() {
        assert_eq!(
            extract_kg_co2e("Between 10 kg CO2e and 20 kg CO2e"),
            Some(10.0)
        );
    }

    #[test]
    fn test_no_unit_yields_no_sample() {
        assert_eq!(extract_kg_co2e("I cannot estimate this."), None);
        assert_eq!(extract_kg_co2e("roughly 12 kilograms"), None);
        assert_eq!(extract_kg_co2e(""), None);
    }
}
