use std::collections::HashMap;

const PREFIX_MARKERS: [&str; 3] = ["axe ", "axefx ", "axe-fx "];

/// Normalize a user-entered patch name to the canonical form a device
/// registry is keyed by: lower-case and trim, strip a leading device-name
/// prefix up to the first marker, cut any trailing parenthetical, then
/// apply one exact synonym substitution from the device's table.
pub fn normalize_with(raw: &str, synonyms: &HashMap<&'static str, &'static str>) -> String {
    let mut name = raw.to_lowercase().trim().to_string();

    // "my axe-fx amp 1" -> "amp 1"; re-check after each strip so stacked
    // prefixes cannot survive a single pass
    loop {
        let Some(pos) = name.find("axe") else { break };
        let Some(marker) = PREFIX_MARKERS.iter()
            .find(|m| name[pos..].starts_with(*m)) else { break };
        name = name[pos + marker.len()..].trim_start().to_string();
    }

    if let Some(paren) = name.find('(') {
        name.truncate(paren);
    }
    let name = name.trim_end();

    match synonyms.get(name) {
        Some(canonical) => canonical.to_string(),
        None => name.to_string(),
    }
}
