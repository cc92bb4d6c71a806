use axe_core::names::normalize_with;
use crate::config::SYNONYMS;

/// Normalize a user-entered patch name through the Axe-Fx II synonym
/// table.
pub fn normalize(raw: &str) -> String {
    normalize_with(raw, &SYNONYMS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SYNONYM_LIST;

    #[test]
    fn applies_legacy_synonyms() {
        assert_eq!(normalize("Axe Cab"), "cabinet 1");
        assert_eq!(normalize("Looper 1"), "delay 1");
        assert_eq!(normalize("Looper 2 (lead)"), "delay 2");
        // the looper block itself keeps its name
        assert_eq!(normalize("Looper"), "looper");
        assert_eq!(normalize("Loop Rec"), "looper record");
    }

    #[test]
    fn normalization_is_idempotent() {
        for (key, _) in SYNONYM_LIST.iter() {
            let once = normalize(key);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", key);
        }
    }
}
