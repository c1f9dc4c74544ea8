pub mod about;
pub mod business_intel;
pub mod content;
pub mod design;
pub mod images;
pub mod prompts;
pub mod social_links;

pub use about::{AboutCandidate, AboutDiscovery, AboutKind};
pub use business_intel::BusinessIntelAgent;
pub use content::SocialContentAgent;
pub use design::DesignAgent;
pub use images::{AiImageRenderer, ImageAgent, ImageRenderer, LocalImageRenderer};
pub use prompts::PromptAgent;
pub use social_links::extract_social_links;

/// `https://www.foo.bar/x` → `foo-bar`, shared by every agent's artifact
/// naming.
pub fn sanitize_domain(url: &str) -> String {
    let domain = url
        .trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_start_matches("www.");
    let host = domain.split('/').next().unwrap_or(domain);
    host.replace('.', "-")
}

/// The bare host, `foo.bar`.
pub fn host_of(url: &str) -> String {
    let domain = url
        .trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_start_matches("www.");
    domain.split('/').next().unwrap_or(domain).to_string()
}

/// Artifact timestamp, YYYY-MM-DD.
pub fn today() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}
