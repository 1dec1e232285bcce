use ammonia;

/// Clean model-generated text before it reaches the browser.
///
/// The quiz page renders question text, options and explanations as markup,
/// so anything the model emits goes through ammonia's whitelist: harmless
/// inline tags survive, `<script>`, `<iframe>` and event-handler attributes
/// are stripped.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input.trim()).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_script_and_handlers() {
        let dirty = r#"<b onclick="steal()">Bold</b><script>alert(1)</script> answer"#;
        assert_eq!(clean_html(dirty), "<b>Bold</b> answer");
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(clean_html("  What is a VPN?  "), "What is a VPN?");
    }
}
