//! Hindi legal term normalization.

/// Hindi legal terms and their English equivalents.
///
/// Multi-word terms are listed before their components would be, so longer
/// phrases are replaced first.
pub const HINDI_LEGAL_TERMS: &[(&str, &str)] = &[
    ("बौद्धिक संपदा", "Intellectual Property"),
    ("लागू कानून", "Governing Law"),
    ("अग्रीमेंट", "Agreement"),
    ("पार्टी", "Party"),
    ("तारीख", "Date"),
    ("भुगतान", "Payment"),
    ("अवधि", "Term"),
    ("समाप्ति", "Termination"),
    ("गोपनीयता", "Confidentiality"),
    ("दायित्व", "Liability"),
    ("क्षतिपूर्ति", "Indemnity"),
    ("मध्यस्थता", "Arbitration"),
];

/// Replaces known Hindi legal terms with their English equivalents.
///
/// Text without Hindi terms is returned unchanged.
pub fn normalize_hindi(text: &str) -> String {
    HINDI_LEGAL_TERMS
        .iter()
        .fold(text.to_string(), |normalized, (hindi, english)| {
            if normalized.contains(hindi) {
                normalized.replace(hindi, english)
            } else {
                normalized
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_terms() {
        assert_eq!(
            normalize_hindi("पार्टी A और पार्टी B के बीच अग्रीमेंट"),
            "Party A और Party B के बीच Agreement"
        );
        assert_eq!(
            normalize_hindi("क्षतिपूर्ति और बौद्धिक संपदा"),
            "Indemnity और Intellectual Property"
        );
    }

    #[test]
    fn english_text_is_untouched() {
        let text = "The Vendor shall indemnify the Client.";
        assert_eq!(normalize_hindi(text), text);
    }
}
