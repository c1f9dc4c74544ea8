//! Social profile link extraction from page markup.

use regex::Regex;

use crate::html;
use crate::types::SocialLink;

/// Platform name plus the URL pattern whose first capture group is the
/// account handle. Page-style prefixes (`pages/`, `channel/`, …) are part
/// of the pattern, not the handle.
const PLATFORM_PATTERNS: &[(&str, &str)] = &[
    (
        "Facebook",
        r"(?i)//(?:www\.)?facebook\.com/(?:pages/)?([A-Za-z0-9_.\-]+)",
    ),
    (
        "Instagram",
        r"(?i)//(?:www\.)?instagram\.com/([A-Za-z0-9_.]+)",
    ),
    ("Twitter", r"(?i)//(?:www\.)?twitter\.com/([A-Za-z0-9_]+)"),
    ("X", r"(?i)//(?:www\.)?x\.com/([A-Za-z0-9_]+)"),
    (
        "LinkedIn",
        r"(?i)//(?:www\.)?linkedin\.com/(?:company|in|school)/([A-Za-z0-9_.\-%]+)",
    ),
    (
        "YouTube",
        r"(?i)//(?:www\.)?youtube\.com/(?:channel/|user/|c/|@)([A-Za-z0-9_.\-]+)",
    ),
    ("TikTok", r"(?i)//(?:www\.)?tiktok\.com/@([A-Za-z0-9_.]+)"),
    (
        "Pinterest",
        r"(?i)//(?:www\.)?pinterest\.(?:com|[a-z]{2})/([A-Za-z0-9_]+)",
    ),
    (
        "Snapchat",
        r"(?i)//(?:www\.)?snapchat\.com/add/([A-Za-z0-9_.\-]+)",
    ),
    (
        "Reddit",
        r"(?i)//(?:www\.)?reddit\.com/(?:r|user)/([A-Za-z0-9_\-]+)",
    ),
    ("Tumblr", r"(?i)//([A-Za-z0-9\-]+)\.tumblr\.com"),
    ("Threads", r"(?i)//(?:www\.)?threads\.net/@?([A-Za-z0-9_.]+)"),
    ("Vimeo", r"(?i)//(?:www\.)?vimeo\.com/([A-Za-z0-9_]+)"),
    ("GitHub", r"(?i)//(?:www\.)?github\.com/([A-Za-z0-9\-]+)"),
    ("Medium", r"(?i)//(?:www\.)?medium\.com/@?([A-Za-z0-9_.\-]+)"),
];

/// Share widgets and plugin paths that look like profile links but aren't.
const SKIP_HANDLES: &[&str] = &["sharer", "sharer.php", "share", "intent", "plugins", "hashtag"];

/// Scan anchors and `og:` meta tags for social profile links, one per
/// platform, first match wins.
pub fn extract_social_links(html_content: &str) -> Vec<SocialLink> {
    let mut candidates: Vec<String> = html::extract_anchors(html_content)
        .into_iter()
        .map(|a| a.href)
        .collect();

    for property in ["url", "see_also"] {
        if let Some(content) = html::extract_og(html_content, property) {
            candidates.push(content);
        }
    }

    let mut links: Vec<SocialLink> = Vec::new();

    for candidate in &candidates {
        for (platform, pattern) in PLATFORM_PATTERNS {
            if links.iter().any(|l| l.platform == *platform) {
                continue;
            }
            let Some(captures) = Regex::new(pattern).unwrap().captures(candidate) else {
                continue;
            };
            let handle = captures[1].to_string();
            if SKIP_HANDLES.contains(&handle.to_lowercase().as_str()) {
                continue;
            }
            links.push(SocialLink {
                platform: platform.to_string(),
                url: candidate.clone(),
                handle,
            });
        }
    }

    links
}
