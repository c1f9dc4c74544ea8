//! About/Team page discovery.
//!
//! Candidates come from navigation and footer links matched against the
//! shared multilingual keyword table, plus same-document anchor sections.
//! Single-page apps whose served HTML is an empty shell get no candidates;
//! the caller falls back to domain-name inference only.

use crate::html;
use crate::lang;

/// How many candidate pages founder extraction will visit.
const MAX_CANDIDATES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AboutKind {
    /// A separate page linked from the homepage.
    LinkedPage,
    /// A `#section` anchor within the homepage itself.
    AnchorSection,
}

#[derive(Debug, Clone)]
pub struct AboutCandidate {
    pub url: String,
    pub label: String,
    pub kind: AboutKind,
}

#[derive(Debug, Clone)]
pub struct AboutDiscovery {
    pub candidates: Vec<AboutCandidate>,
    /// The homepage is a JS shell; only domain/title inference is possible.
    pub spa_degraded: bool,
}

/// Path segments that mark an About page even when the link text is an
/// icon or image.
const ABOUT_PATH_HINTS: &[&str] = &[
    "about", "team", "om-os", "om_os", "ueber-uns", "uber-uns", "a-propos",
    "quienes-somos", "chi-siamo", "sobre-nos", "over-ons", "om-oss", "meista",
    "founders", "our-story", "story", "people", "who-we-are",
];

pub fn discover(base_url: &str, homepage_html: &str) -> AboutDiscovery {
    if html::is_single_page_app(homepage_html) {
        log::warn!("{base_url} looks like a client-rendered app; about-page discovery skipped");
        return AboutDiscovery {
            candidates: Vec::new(),
            spa_degraded: true,
        };
    }

    let mut candidates: Vec<AboutCandidate> = Vec::new();

    for anchor in html::extract_anchors(homepage_html) {
        if candidates.len() >= MAX_CANDIDATES {
            break;
        }

        let matches_label = lang::is_about_term(&anchor.text);
        let matches_path = path_hints_match(&anchor.href);
        if !matches_label && !matches_path {
            continue;
        }

        if let Some(section) = anchor.href.strip_prefix('#') {
            let url = format!("{}#{}", base_url.trim_end_matches('/'), section);
            push_unique(
                &mut candidates,
                AboutCandidate {
                    url,
                    label: anchor.text,
                    kind: AboutKind::AnchorSection,
                },
            );
            continue;
        }

        if let Some(url) = html::resolve_href(base_url, &anchor.href) {
            // external links (partners, press) are not our About page
            if crate::agents::host_of(&url) != crate::agents::host_of(base_url) {
                continue;
            }
            push_unique(
                &mut candidates,
                AboutCandidate {
                    url,
                    label: anchor.text,
                    kind: AboutKind::LinkedPage,
                },
            );
        }
    }

    AboutDiscovery {
        candidates,
        spa_degraded: false,
    }
}

fn path_hints_match(href: &str) -> bool {
    let lowered = href.to_lowercase();
    ABOUT_PATH_HINTS
        .iter()
        .any(|hint| lowered.contains(hint))
}

fn push_unique(candidates: &mut Vec<AboutCandidate>, candidate: AboutCandidate) {
    if !candidates.iter().any(|c| c.url == candidate.url) {
        candidates.push(candidate);
    }
}
