//! Small JavaScript snippets evaluated inside the page.
//!
//! Selectors and text are embedded as JSON string literals so quoting in
//! attribute selectors never breaks the script.

fn lit(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

/// Element a scroll script acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Container {
    pub selector: &'static str,
    /// When set, the first match of `selector` that has such a descendant
    pub holding: Option<&'static str>,
}

impl Container {
    pub const fn new(selector: &'static str) -> Self {
        Self {
            selector,
            holding: None,
        }
    }

    pub const fn holding(selector: &'static str, child: &'static str) -> Self {
        Self {
            selector,
            holding: Some(child),
        }
    }
}

fn target(container: Option<Container>) -> String {
    let element = match container {
        Some(Container {
            selector,
            holding: None,
        }) => format!("document.querySelector({})", lit(selector)),
        Some(Container {
            selector,
            holding: Some(child),
        }) => format!(
            "[...document.querySelectorAll({})].find(el => el.querySelector({}))",
            lit(selector),
            lit(child)
        ),
        None => return "(document.scrollingElement || document.body)".to_string(),
    };
    format!("({} || document.scrollingElement || document.body)", element)
}

pub fn count(selector: &str) -> String {
    format!("document.querySelectorAll({}).length", lit(selector))
}

pub fn click_first(selector: &str) -> String {
    format!(
        r#"(() => {{
            const el = document.querySelector({});
            if (!el) return false;
            el.scrollIntoView({{block: "center"}});
            el.click();
            return true;
        }})()"#,
        lit(selector)
    )
}

/// Clicks the first visible element matching `selector` whose text contains `text`.
pub fn click_with_text(selector: &str, text: &str) -> String {
    format!(
        r#"(() => {{
            const wanted = {}.toLowerCase();
            for (const el of document.querySelectorAll({})) {{
                const label = (el.innerText || el.textContent || el.getAttribute("aria-label") || "").toLowerCase();
                if (!label.includes(wanted)) continue;
                if (el.offsetParent === null && el.getClientRects().length === 0) continue;
                el.click();
                return true;
            }}
            return false;
        }})()"#,
        lit(text),
        lit(selector)
    )
}

pub fn hover_nth(selector: &str, index: usize) -> String {
    format!(
        r#"(() => {{
            const el = document.querySelectorAll({})[{}];
            if (!el) return false;
            el.scrollIntoView({{block: "nearest"}});
            for (const type of ["mouseover", "mouseenter", "mousemove"]) {{
                el.dispatchEvent(new MouseEvent(type, {{bubbles: true}}));
            }}
            return true;
        }})()"#,
        lit(selector),
        index
    )
}

pub fn wheel(container: Option<Container>, delta: i64) -> String {
    format!(
        r#"(() => {{
            const el = {};
            el.dispatchEvent(new WheelEvent("wheel", {{deltaY: {delta}, bubbles: true}}));
            el.scrollBy(0, {delta});
            return el.scrollTop;
        }})()"#,
        target(container),
        delta = delta
    )
}

pub fn scroll_to_bottom(container: Option<Container>) -> String {
    format!(
        "(() => {{ const el = {}; el.scrollTop = el.scrollHeight; return el.scrollTop; }})()",
        target(container)
    )
}

pub fn scroll_by(container: Option<Container>, delta: i64) -> String {
    format!(
        "(() => {{ const el = {}; el.scrollBy(0, {}); return el.scrollTop; }})()",
        target(container),
        delta
    )
}

pub fn scroll_by_viewport(container: Option<Container>) -> String {
    format!(
        "(() => {{ const el = {}; el.scrollBy(0, window.innerHeight); return el.scrollTop; }})()",
        target(container)
    )
}

pub fn window_scroll_by(delta: i64) -> String {
    format!("window.scrollBy(0, {}); window.scrollY", delta)
}

pub const WINDOW_TO_BOTTOM: &str = "window.scrollTo(0, document.body.scrollHeight); window.scrollY";

pub const WINDOW_TO_TOP: &str = "window.scrollTo(0, 0); window.scrollY";

pub const READY_STATE: &str = "document.readyState";

/// Returns the index of the first selector that matches a visible element, or -1.
pub fn first_present(selectors: &[&str]) -> String {
    let list: Vec<String> = selectors.iter().map(|s| lit(s)).collect();
    format!(
        r#"(() => {{
            const list = [{}];
            for (let i = 0; i < list.length; i++) {{
                try {{
                    if (document.querySelector(list[i])) return i;
                }} catch (e) {{}}
            }}
            return -1;
        }})()"#,
        list.join(", ")
    )
}

/// Like [`first_present`], but the match must also contain an `inner` element.
pub fn first_containing(selectors: &[&str], inner: &str) -> String {
    let list: Vec<String> = selectors.iter().map(|s| lit(s)).collect();
    format!(
        r#"(() => {{
            const list = [{}];
            for (let i = 0; i < list.length; i++) {{
                try {{
                    for (const el of document.querySelectorAll(list[i])) {{
                        if (el.querySelector({})) return i;
                    }}
                }} catch (e) {{}}
            }}
            return -1;
        }})()"#,
        list.join(", "),
        lit(inner)
    )
}

/// Empties an input and gives it focus so typed keys land in it.
pub fn clear_and_focus(selector: &str) -> String {
    format!(
        r#"(() => {{
            const el = document.querySelector({});
            if (!el) return false;
            el.focus();
            el.value = "";
            el.dispatchEvent(new Event("input", {{bubbles: true}}));
            return true;
        }})()"#,
        lit(selector)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selectors_are_quoted() {
        let js = count(r#"a[href*="google.com/maps/place"]"#);
        assert_eq!(
            js,
            r#"document.querySelectorAll("a[href*=\"google.com/maps/place\"]").length"#
        );
    }

    #[test]
    fn test_container_fallback() {
        assert!(scroll_to_bottom(None).contains("document.scrollingElement"));
        assert!(scroll_to_bottom(Some(Container::new("div.feed"))).contains(r#"querySelector("div.feed")"#));
    }

    #[test]
    fn test_container_holding_child() {
        let js = scroll_by_viewport(Some(Container::holding("div.m6QErb", "div.jJc9Ad")));
        assert!(js.contains(
            r#"[...document.querySelectorAll("div.m6QErb")].find(el => el.querySelector("div.jJc9Ad"))"#
        ));
        assert!(!js.contains(r#"document.querySelector("div.m6QErb")"#));
    }

    #[test]
    fn test_first_present_lists_all() {
        let js = first_present(&["a", "b[role='tab']"]);
        assert!(js.contains(r#"["a", "b[role='tab']"]"#));
    }
}
