use crate::models::NutrientRecord;

/// Nutrient names the extractor recognizes in advisory text.
pub const NUTRIENT_VOCABULARY: [&str; 4] = ["Carbohydrates", "Fats", "Fibers", "Sugar"];

/// Scans advisory text line by line for known nutrient names.
///
/// A line mentioning a nutrient (case-insensitive) contributes the
/// concatenation of every digit on that line as the value. Lines with no
/// digits, or a digit run too long for a u32, are skipped, and a later
/// mention overwrites an earlier one. This is a best-effort heuristic over
/// unstructured model output, not a guaranteed parse.
pub fn extract_nutrients(text: &str) -> NutrientRecord {
    let mut record = NutrientRecord::new();

    for line in text.lines() {
        let lowered = line.to_lowercase();
        for nutrient in NUTRIENT_VOCABULARY {
            if !lowered.contains(&nutrient.to_lowercase()) {
                continue;
            }
            let digits: String = line.chars().filter(char::is_ascii_digit).collect();
            if let Ok(value) = digits.parse::<u32>() {
                record.insert(nutrient.to_string(), value);
            }
        }
    }

    record
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_values_per_line() {
        let text = "Carbohydrates: 45%\nFats: 20g\nFibers: none";
        let record = extract_nutrients(text);

        assert_eq!(record.get("Carbohydrates"), Some(&45));
        assert_eq!(record.get("Fats"), Some(&20));
        assert!(!record.contains_key("Fibers"));
    }

    #[test]
    fn test_no_keywords_yields_empty_record() {
        let record = extract_nutrients("The meal looks balanced overall.");
        assert!(record.is_empty());
    }

    #[test]
    fn test_later_line_overwrites_earlier() {
        let text = "Sugar: 10%\nRevised estimate for sugar: 15%";
        let record = extract_nutrients(text);

        assert_eq!(record.get("Sugar"), Some(&15));
    }

    #[test]
    fn test_all_digits_on_line_concatenate() {
        // "1. Carbohydrates - 30%" picks up the list index too
        let record = extract_nutrients("1. Carbohydrates - 30%");
        assert_eq!(record.get("Carbohydrates"), Some(&130));
    }

    #[test]
    fn test_case_insensitive_match() {
        let record = extract_nutrients("FATS around 25 percent");
        assert_eq!(record.get("Fats"), Some(&25));
    }

    #[test]
    fn test_oversized_digit_run_is_skipped() {
        let record = extract_nutrients("Sugar 99999999999999999999");
        assert!(record.is_empty());
    }
}
