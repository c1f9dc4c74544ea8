//! Regex-based HTML helpers.
//!
//! Good enough for noise stripping, link scanning and meta extraction;
//! a full DOM parse is deliberately avoided.

use regex::Regex;

/// A scanned anchor: resolved-enough href plus its visible label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub href: String,
    pub text: String,
}

/// Strip script/style blocks and chrome sections (nav/header/footer) that
/// carry no analyzable copy.
pub fn strip_noise(html: &str) -> String {
    let mut text = html.to_string();

    for pattern in [
        r"(?is)<script[^>]*>.*?</script>",
        r"(?is)<style[^>]*>.*?</style>",
        r"(?is)<noscript[^>]*>.*?</noscript>",
        r"(?is)<nav[^>]*>.*?</nav>",
        r"(?is)<header[^>]*>.*?</header>",
        r"(?is)<footer[^>]*>.*?</footer>",
    ] {
        text = Regex::new(pattern).unwrap().replace_all(&text, " ").to_string();
    }

    text
}

/// Visible text of a page: noise stripped, tags removed, entities decoded,
/// whitespace collapsed, capped at `max_chars` on a char boundary.
pub fn visible_text(html: &str, max_chars: usize) -> String {
    let mut text = strip_noise(html);

    text = Regex::new(r"<[^>]+>")
        .unwrap()
        .replace_all(&text, " ")
        .to_string();

    text = html_escape::decode_html_entities(&text).to_string();

    text = Regex::new(r"\s+")
        .unwrap()
        .replace_all(&text, " ")
        .trim()
        .to_string();

    if text.chars().count() > max_chars {
        text = text.chars().take(max_chars).collect();
    }

    text
}

pub fn extract_title(html: &str) -> Option<String> {
    Regex::new(r"(?is)<title[^>]*>(.*?)</title>")
        .unwrap()
        .captures(html)
        .map(|c| clean_fragment(&c[1]))
        .filter(|t| !t.is_empty())
}

pub fn extract_meta_description(html: &str) -> Option<String> {
    extract_meta(html, "name", "description")
}

/// Content of a `<meta property="og:...">` tag.
pub fn extract_og(html: &str, property: &str) -> Option<String> {
    extract_meta(html, "property", &format!("og:{property}"))
}

fn extract_meta(html: &str, attr: &str, value: &str) -> Option<String> {
    let escaped = regex::escape(value);
    // Attribute order varies between sites; try both.
    let patterns = [
        format!(r#"(?is)<meta[^>]*{attr}\s*=\s*["']{escaped}["'][^>]*content\s*=\s*["']([^"']*)["']"#),
        format!(r#"(?is)<meta[^>]*content\s*=\s*["']([^"']*)["'][^>]*{attr}\s*=\s*["']{escaped}["']"#),
    ];
    for pattern in &patterns {
        if let Some(captures) = Regex::new(pattern).unwrap().captures(html) {
            let content = clean_fragment(&captures[1]);
            if !content.is_empty() {
                return Some(content);
            }
        }
    }
    None
}

/// All anchors with their hrefs and visible labels.
pub fn extract_anchors(html: &str) -> Vec<Anchor> {
    Regex::new(r#"(?is)<a[^>]*href\s*=\s*["']([^"'#][^"']*|#[^"']+)["'][^>]*>(.*?)</a>"#)
        .unwrap()
        .captures_iter(html)
        .map(|c| Anchor {
            href: c[1].trim().to_string(),
            text: clean_fragment(&c[2]),
        })
        .collect()
}

const SPA_SIGNATURES: &[&str] = &[
    "react",
    "vue",
    "angular",
    "next",
    "nuxt",
    "svelte",
    "__NEXT_DATA__",
    "ng-app",
    "data-reactroot",
];

/// Heuristic single-page-app detection: a near-empty rendered root plus a
/// framework script signature means the served HTML carries no real content.
pub fn is_single_page_app(html: &str) -> bool {
    let text = visible_text(html, 2_000);
    if text.chars().count() >= 200 {
        return false;
    }
    let lowered = html.to_lowercase();
    SPA_SIGNATURES.iter().any(|sig| lowered.contains(&sig.to_lowercase()))
}

/// Resolve a possibly relative href against the page it was found on.
pub fn resolve_href(base_url: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_string());
    }
    if href.starts_with("mailto:") || href.starts_with("tel:") || href.starts_with("javascript:") {
        return None;
    }

    let root = site_root(base_url)?;
    if let Some(rest) = href.strip_prefix("//") {
        let scheme = base_url.split("://").next().unwrap_or("https");
        return Some(format!("{scheme}://{rest}"));
    }
    if href.starts_with('/') {
        return Some(format!("{root}{href}"));
    }
    Some(format!("{}/{}", base_url.trim_end_matches('/'), href))
}

fn site_root(url: &str) -> Option<String> {
    let (scheme, rest) = url.split_once("://")?;
    let host = rest.split('/').next()?;
    Some(format!("{scheme}://{host}"))
}

fn clean_fragment(fragment: &str) -> String {
    let no_tags = Regex::new(r"<[^>]+>").unwrap().replace_all(fragment, " ");
    let decoded = html_escape::decode_html_entities(&no_tags).to_string();
    Regex::new(r"\s+")
        .unwrap()
        .replace_all(&decoded, " ")
        .trim()
        .to_string()
}
