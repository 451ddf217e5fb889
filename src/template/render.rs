//! Template rendering: metadata validation and placeholder substitution.

use serde_json::{Map, Value};

use crate::error::AppError;

/// A rendered subject/body pair ready to be persisted as a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub subject: String,
    pub body: String,
}

/// Render a template against caller-supplied metadata.
///
/// Every declared tag must be present as a metadata key; the first missing
/// tag fails validation. Extra metadata keys are ignored. With no declared
/// tags the template passes through untouched, without validation.
///
/// Substitution replaces only the first occurrence of each `{{key}}`
/// placeholder in the body; repeated placeholders keep later instances
/// verbatim. The subject is never substituted.
pub fn render(
    subject: &str,
    body: &str,
    declared_tags: &[String],
    metadata: &Value,
) -> Result<Rendered, AppError> {
    if declared_tags.is_empty() {
        return Ok(Rendered {
            subject: subject.to_string(),
            body: body.to_string(),
        });
    }

    let empty = Map::new();
    let values = metadata.as_object().unwrap_or(&empty);

    for tag in declared_tags {
        if !values.contains_key(tag) {
            return Err(AppError::Validation(format!(
                "\"{}\" is required in metadata object",
                tag
            )));
        }
    }

    let mut rendered = body.to_string();
    for (key, value) in values {
        let pattern = format!("{{{{{}}}}}", key);
        rendered = rendered.replacen(&pattern, &stringify(value), 1);
    }

    Ok(Rendered {
        subject: subject.to_string(),
        body: rendered,
    })
}

/// Stringify a metadata value for substitution. Strings are used verbatim,
/// null becomes empty, arrays and objects use their JSON representation.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tags(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_render_substitutes_all_tags() {
        let rendered = render(
            "Verification",
            "Hello {{name}}, your code is {{code}}",
            &tags(&["name", "code"]),
            &json!({"name": "Alex", "code": "123"}),
        )
        .unwrap();

        assert_eq!(rendered.body, "Hello Alex, your code is 123");
        assert_eq!(rendered.subject, "Verification");
    }

    #[test]
    fn test_missing_tag_names_the_key() {
        let err = render(
            "Verification",
            "Hello {{name}}, your code is {{code}}",
            &tags(&["name", "code"]),
            &json!({"name": "Alex"}),
        )
        .unwrap_err();

        match err {
            AppError::Validation(msg) => assert!(msg.contains("\"code\"")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_extra_metadata_keys_ignored() {
        let rendered = render(
            "s",
            "Hi {{name}}",
            &tags(&["name"]),
            &json!({"name": "Alex", "unused": true}),
        )
        .unwrap();

        assert_eq!(rendered.body, "Hi Alex");
    }

    #[test]
    fn test_no_declared_tags_skips_validation() {
        let rendered = render("s", "Hi {{name}}", &[], &json!({})).unwrap();
        assert_eq!(rendered.body, "Hi {{name}}");
    }

    #[test]
    fn test_repeated_placeholder_only_first_replaced() {
        let rendered = render(
            "s",
            "{{name}} and {{name}}",
            &tags(&["name"]),
            &json!({"name": "Alex"}),
        )
        .unwrap();

        assert_eq!(rendered.body, "Alex and {{name}}");
    }

    #[test]
    fn test_subject_is_not_substituted() {
        let rendered = render(
            "Hello {{name}}",
            "Body {{name}}",
            &tags(&["name"]),
            &json!({"name": "Alex"}),
        )
        .unwrap();

        assert_eq!(rendered.subject, "Hello {{name}}");
    }

    #[test]
    fn test_value_stringification() {
        let rendered = render(
            "s",
            "n={{n}} b={{b}} x={{x}} o={{o}}",
            &tags(&["n", "b", "x", "o"]),
            &json!({"n": 42, "b": true, "x": null, "o": {"k": 1}}),
        )
        .unwrap();

        assert_eq!(rendered.body, "n=42 b=true x= o={\"k\":1}");
    }

    #[test]
    fn test_non_object_metadata_fails_on_first_tag() {
        let err = render("s", "{{name}}", &tags(&["name"]), &json!("nope")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
