use std::collections::HashMap;

/// Placeholder values for one template rendering.
pub type RenderContext = HashMap<String, String>;

/// Substitutes `{{name}}` tokens from the context into the template.
///
/// Missing keys leave the token verbatim; present keys are substituted even
/// when the value is empty. Rendering never fails.
pub fn render(template: &str, context: &RenderContext) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];
        match after_open.find("}}") {
            Some(end) => {
                let name = &after_open[..end];
                match context.get(name) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push_str("{{");
                        out.push_str(name);
                        out.push_str("}}");
                    }
                }
                rest = &after_open[end + 2..];
            }
            None => {
                // Unterminated token: emit the remainder as-is.
                out.push_str(&rest[start..]);
                return out;
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(pairs: &[(&str, &str)]) -> RenderContext {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_missing_keys_stay_verbatim() {
        let rendered = render("{{a}} and {{b}}", &ctx(&[("a", "X")]));
        assert_eq!(rendered, "X and {{b}}");
    }

    #[test]
    fn test_empty_value_is_substituted() {
        let rendered = render("start{{a}}end", &ctx(&[("a", "")]));
        assert_eq!(rendered, "startend");
    }

    #[test]
    fn test_repeated_placeholders() {
        let rendered = render("{{x}} {{x}} {{y}}", &ctx(&[("x", "hi")]));
        assert_eq!(rendered, "hi hi {{y}}");
    }

    #[test]
    fn test_unterminated_token_left_alone() {
        let rendered = render("hello {{name", &ctx(&[("name", "world")]));
        assert_eq!(rendered, "hello {{name");
    }

    #[test]
    fn test_no_placeholders_is_identity() {
        let rendered = render("plain text", &RenderContext::new());
        assert_eq!(rendered, "plain text");
    }
}
