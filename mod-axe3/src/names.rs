use axe_core::names::normalize_with;
use crate::config::SYNONYMS;

/// Normalize a user-entered patch name through the Axe-Fx III synonym
/// table.
pub fn normalize(raw: &str) -> String {
    normalize_with(raw, &SYNONYMS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SYNONYM_LIST;

    #[test]
    fn lowercases_and_trims() {
        assert_eq!(normalize("  Delay 1  "), "delay 1");
    }

    #[test]
    fn strips_device_prefix() {
        assert_eq!(normalize("Axe Amp 1"), "amp 1");
        assert_eq!(normalize("My Axe-FX Drive 2"), "drive 2");
        assert_eq!(normalize("AxeFX Chorus 1"), "chorus 1");
        assert_eq!(normalize("Axe Axe Amp 1"), "amp 1");
    }

    #[test]
    fn cuts_parenthetical_suffix() {
        assert_eq!(normalize("Delay 1 (dotted 8th)"), "delay 1");
        assert_eq!(normalize("Axe Drive 1 (solo)"), "drive 1");
    }

    #[test]
    fn applies_synonyms() {
        assert_eq!(normalize("Cab"), "cabinet 1");
        assert_eq!(normalize("Whammy 2"), "pitch 2");
        assert_eq!(normalize("Tap Tempo"), "taptempo");
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
