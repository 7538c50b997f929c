// Shared prompt fragments and the template filler.
// Each service that calls the assistant defines its own prompts.rs alongside it.

/// Opening instruction for every prompt that expects a JSON object back.
pub const JSON_ONLY_INSTRUCTION: &str = "Retourne UNIQUEMENT un JSON valide, sans texte autour";

/// Substitutes `{key}` placeholders in a single pass.
///
/// Values are inserted verbatim and never re-scanned, so caller text that
/// happens to contain `{key}` is left alone. Braces that do not form a known
/// placeholder (e.g. the JSON example in a template) are copied as-is.
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let substituted = after.find('}').and_then(|close| {
            let key = &after[..close];
            values
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v, close))
        });
        match substituted {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
