//! Placeholder tag extraction from template bodies.

/// Extract the distinct `{{tag}}` placeholder names from a template body,
/// preserving first-seen order.
///
/// Tag names are case-sensitive and may contain anything except a literal
/// `}}`. An unterminated `{{` is ignored.
pub fn extract_tags(body: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    let mut rest = body;

    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            break;
        };

        let name = &after[..end];
        if !name.is_empty() && !tags.iter().any(|t| t == name) {
            tags.push(name.to_string());
        }

        rest = &after[end + 2..];
    }

    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body() {
        assert!(extract_tags("").is_empty());
    }

    #[test]
    fn test_no_tags() {
        assert!(extract_tags("plain text, no placeholders").is_empty());
    }

    #[test]
    fn test_first_seen_order() {
        let tags = extract_tags("Hello {{name}}, your code is {{code}}");
        assert_eq!(tags, vec!["name", "code"]);
    }

    #[test]
    fn test_duplicates_collected_once() {
        let tags = extract_tags("{{a}} {{b}} {{a}} {{b}} {{c}}");
        assert_eq!(tags, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_case_sensitive() {
        let tags = extract_tags("{{Name}} {{name}}");
        assert_eq!(tags, vec!["Name", "name"]);
    }

    #[test]
    fn test_unterminated_placeholder_ignored() {
        assert_eq!(extract_tags("{{open {{closed}}"), vec!["open {{closed"]);
        assert!(extract_tags("trailing {{tag").is_empty());
    }

    #[test]
    fn test_unusual_identifiers() {
        let tags = extract_tags("{{user name}} {{order.id}}");
        assert_eq!(tags, vec!["user name", "order.id"]);
    }
}
