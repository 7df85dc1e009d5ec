//! Diagnosis string formatting.
//!
//! Maps a raw predicted class label to the human-readable diagnosis string
//! surfaced to clinicians. Binary tumor / no-tumor labels are special-cased;
//! any other label (a specific tumor type) is rendered in title case.

/// Labels that mean "tumor present", after normalization.
const TUMOR_LABELS: [&str; 2] = ["tumor", "positive"];

/// Labels that mean "no tumor", after normalization.
const NO_TUMOR_LABELS: [&str; 5] = ["no tumor", "no", "none", "notumor", "negative"];

/// Normalizes a label for matching and display: underscores and hyphens
/// become spaces, surrounding whitespace is trimmed.
pub(crate) fn normalize_label(label: &str) -> String {
    label.replace(['_', '-'], " ").trim().to_string()
}

/// Returns true for generic binary labels that carry no tumor-type
/// information.
pub(crate) fn is_generic_label(label: &str) -> bool {
    let normalized = normalize_label(label).to_lowercase();
    TUMOR_LABELS.contains(&normalized.as_str()) || NO_TUMOR_LABELS.contains(&normalized.as_str())
}

/// Renders a normalized label in title case ("glioma" -> "Glioma").
fn title_case(label: &str) -> String {
    label
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Formats a diagnosis string from a predicted label and the binary
/// decision.
///
/// Binary labels map to "Tumor Detected" / "No Tumor"; any other label is
/// returned in title case. When no label is available, the boolean decision
/// alone determines the string.
pub fn format_diagnosis(label: Option<&str>, has_tumor: bool) -> String {
    match label {
        Some(label) => {
            let normalized = normalize_label(label);
            let lowered = normalized.to_lowercase();
            if TUMOR_LABELS.contains(&lowered.as_str()) {
                "Tumor Detected".to_string()
            } else if NO_TUMOR_LABELS.contains(&lowered.as_str()) {
                "No Tumor".to_string()
            } else {
                title_case(&normalized)
            }
        }
        None => {
            if has_tumor {
                "Tumor Detected".to_string()
            } else {
                "No Tumor".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_labels_map_to_fixed_strings() {
        assert_eq!(format_diagnosis(Some("no_tumor"), false), "No Tumor");
        assert_eq!(format_diagnosis(Some("notumor"), false), "No Tumor");
        assert_eq!(format_diagnosis(Some("NEGATIVE"), false), "No Tumor");
        assert_eq!(format_diagnosis(Some("tumor"), true), "Tumor Detected");
        assert_eq!(format_diagnosis(Some("Positive"), true), "Tumor Detected");
    }

    #[test]
    fn test_specific_labels_render_in_title_case() {
        assert_eq!(format_diagnosis(Some("glioma"), true), "Glioma");
        assert_eq!(format_diagnosis(Some("pituitary_tumor"), true), "Pituitary Tumor");
        assert_eq!(format_diagnosis(Some("  meningioma "), true), "Meningioma");
    }

    #[test]
    fn test_missing_label_falls_back_to_flag() {
        assert_eq!(format_diagnosis(None, true), "Tumor Detected");
        assert_eq!(format_diagnosis(None, false), "No Tumor");
    }

    #[test]
    fn test_generic_label_detection() {
        assert!(is_generic_label("tumor"));
        assert!(is_generic_label("no_tumor"));
        assert!(is_generic_label("Positive"));
        assert!(is_generic_label("negative"));
        assert!(!is_generic_label("glioma"));
        assert!(!is_generic_label("pituitary"));
    }
}
