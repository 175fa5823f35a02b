//! Extension shell checks: pages must load their scripts from files,
//! since extension pages refuse inline script blocks.

const POPUP_HTML: &str = include_str!("../popup.html");
const OPTIONS_HTML: &str = include_str!("../options.html");
const POPUP_INIT: &str = include_str!("../popup-init.js");
const OPTIONS_INIT: &str = include_str!("../options-init.js");

/// Every `<script ...>` opening tag must carry a `src` and an empty body
fn assert_no_inline_scripts(page: &str) {
    for (start, _) in page.match_indices("<script") {
        let rest = &page[start..];
        let tag_end = rest.find('>').expect("unterminated script tag");
        assert!(rest[..tag_end].contains("src="), "inline script in page");
        assert!(rest[tag_end + 1..].trim_start().starts_with("</script>"));
    }
}

#[test]
fn test_popup_loads_external_script() {
    assert_no_inline_scripts(POPUP_HTML);
    assert!(POPUP_HTML.contains(r#"src="popup-init.js""#));
    assert!(POPUP_INIT.contains("start_popup()"));
}

#[test]
fn test_options_loads_external_script() {
    assert_no_inline_scripts(OPTIONS_HTML);
    assert!(OPTIONS_HTML.contains(r#"src="options-init.js""#));
    assert!(OPTIONS_INIT.contains("start_options()"));
}
