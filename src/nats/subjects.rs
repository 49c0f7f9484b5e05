/// Extract the thing name from a subject matching `pattern`, where the
/// single `*` token in the pattern marks the thing name.
pub fn thing_from_subject<'a>(subject: &'a str, pattern: &str) -> Option<&'a str> {
    let subject_tokens: Vec<&str> = subject.split('.').collect();
    let pattern_tokens: Vec<&str> = pattern.split('.').collect();

    if subject_tokens.len() != pattern_tokens.len() {
        return None;
    }

    let mut thing = None;
    for (token, expected) in subject_tokens.iter().zip(&pattern_tokens) {
        if *expected == "*" {
            if token.is_empty() {
                return None;
            }
            thing = Some(*token);
        } else if token != expected {
            return None;
        }
    }

    thing
}

/// Subject a device listens on for desired-state deltas.
pub fn delta_subject(template: &str, thing_name: &str) -> String {
    template.replace("{thing}", thing_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thing_from_subject() {
        let pattern = "home.*.shadow.update";
        assert_eq!(thing_from_subject("home.MiCasa.shadow.update", pattern), Some("MiCasa"));
        assert_eq!(thing_from_subject("home.MiCasa.shadow.delta", pattern), None);
        assert_eq!(thing_from_subject("home.shadow.update", pattern), None);
        assert_eq!(thing_from_subject("home..shadow.update", pattern), None);
    }

    #[test]
    fn test_pattern_without_wildcard() {
        assert_eq!(thing_from_subject("home.MiCasa", "home.MiCasa"), None);
    }

    #[test]
    fn test_delta_subject() {
        assert_eq!(
            delta_subject("home.{thing}.shadow.delta", "MiCasa"),
            "home.MiCasa.shadow.delta"
        );
    }
}
