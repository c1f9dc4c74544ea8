//! Collaborator seams the core consumes but does not own: page fetching,
//! screenshot capture, instruction templates, artifact persistence, and
//! the optional social post feed.

pub mod artifacts;
pub mod fetcher;
pub mod instructions;
pub mod screenshot;
pub mod social_feed;

pub use artifacts::{ArtifactStore, FsArtifactStore};
pub use fetcher::{HtmlFetcher, ReqwestHtmlFetcher};
pub use instructions::{FsInstructionStore, InstructionStore};
pub use screenshot::{DisabledScreenshot, ScreenshotApiClient, ScreenshotClient};
pub use social_feed::{NoSocialFeed, SocialFeed, SocialPost};
