//! `{{TOKEN}}` substitution for manifest templates.
//!
//! Deliberately minimal: flat name → value replacement, no escaping, no
//! recursion, no logic. Values are inserted verbatim, so callers must ensure
//! they are safe for the target document format (the manifest renderer does
//! not XML-escape).

use std::collections::HashMap;

/// Replace every `{{NAME}}` occurrence whose name is present in `variables`.
///
/// Unknown tokens are left in place verbatim. Replacement is a single
/// left-to-right pass: inserted values are never re-scanned, so a value that
/// happens to contain `{{...}}` survives untouched.
pub fn replace_template_variables(template: &str, variables: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let name = &after[..end];
                if let Some(value) = variables.get(name) {
                    out.push_str(value);
                    rest = &after[end + 2..];
                } else {
                    // Unknown token: emit the opening delimiter and keep
                    // scanning after it, so the token text passes through.
                    out.push_str("{{");
                    rest = after;
                }
            }
            None => {
                out.push_str("{{");
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn replaces_single_variable() {
        let result = replace_template_variables("Hello {{NAME}}!", &vars(&[("NAME", "World")]));
        assert_eq!(result, "Hello World!");
    }

    #[test]
    fn replaces_multiple_variables() {
        let result = replace_template_variables(
            "{{GREETING}} {{NAME}}!",
            &vars(&[("GREETING", "Hello"), ("NAME", "World")]),
        );
        assert_eq!(result, "Hello World!");
    }

    #[test]
    fn replaces_same_variable_at_every_occurrence() {
        let result =
            replace_template_variables("{{X}} + {{X}} = {{X}}{{X}}", &vars(&[("X", "1")]));
        assert_eq!(result, "1 + 1 = 11");
    }

    #[test]
    fn leaves_unknown_variables_unchanged() {
        let result =
            replace_template_variables("{{KNOWN}} {{UNKNOWN}}", &vars(&[("KNOWN", "value")]));
        assert_eq!(result, "value {{UNKNOWN}}");
    }

    #[test]
    fn empty_mapping_leaves_template_unchanged() {
        let result = replace_template_variables("{{VAR}}", &HashMap::new());
        assert_eq!(result, "{{VAR}}");
    }

    #[test]
    fn empty_template_produces_empty_output() {
        let result = replace_template_variables("", &vars(&[("VAR", "value")]));
        assert_eq!(result, "");
    }

    #[test]
    fn inserted_values_are_not_rescanned() {
        let result = replace_template_variables(
            "{{A}} {{B}}",
            &vars(&[("A", "{{B}}"), ("B", "two")]),
        );
        assert_eq!(result, "{{B}} two");
    }

    #[test]
    fn substitution_is_idempotent_for_unknown_tokens() {
        let mapping = vars(&[("KNOWN", "value")]);
        let once = replace_template_variables("{{KNOWN}} {{UNKNOWN}}", &mapping);
        let twice = replace_template_variables(&once, &mapping);
        assert_eq!(once, twice);
    }

    #[test]
    fn unterminated_delimiter_passes_through() {
        let result = replace_template_variables("open {{NAME", &vars(&[("NAME", "x")]));
        assert_eq!(result, "open {{NAME");
    }
}
