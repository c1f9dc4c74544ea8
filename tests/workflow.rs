//! End-to-end workflow scenarios against scripted providers and
//! collaborators. No network, no real AI backends.

use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;

use brandloom::agents::{
    BusinessIntelAgent, DesignAgent, ImageAgent, ImageRenderer, LocalImageRenderer, PromptAgent,
    SocialContentAgent,
};
use brandloom::external::screenshot::ViewportSpec;
use brandloom::external::{
    ArtifactStore, FsArtifactStore, HtmlFetcher, InstructionStore, NoSocialFeed, ScreenshotClient,
};
use brandloom::providers::MockProvider;
use brandloom::types::{
    DesignTokenRecord, PhaseName, PhaseStatus, PromptRecord, WorkflowStatus,
};
use brandloom::{Error, Result, Workflow};

const HOMEPAGE: &str = r#"<html>
<head>
    <title>Example Co - Examples Done Right</title>
    <meta name="description" content="Example Co builds exemplary examples.">
</head>
<body>
    <h1>Examples Done Right</h1>
    <p>Example Co has been crafting exemplary examples for discerning teams
    since 2012, shipping careful work with precision and pride.</p>
    <a href="https://www.facebook.com/pages/ExampleCo">Facebook</a>
</body>
</html>"#;

const BUSINESS_JSON: &str = r#"{
    "company_overview": {
        "name": "Example Co",
        "description": "Examples as a service",
        "industry": "Software"
    },
    "services_products": {"primary_services": ["examples"]},
    "market_analysis": {"positioning": "Premium"}
}"#;

const DESIGN_JSON: &str = r##"{
    "color_kit": {
        "background": {"hex": "#FFFFFF", "where_seen": "page background"},
        "brand_primary": {"hex": "#1A73E8", "where_seen": "buttons and logo"},
        "text_primary": {"hex": "#202124", "where_seen": "headings"},
        "text_secondary": {"hex": "#5F6368", "where_seen": "body text"}
    },
    "typography_kit": {
        "classification": "sans-serif",
        "likely_families": [{"name": "Google Sans", "confidence": 0.8}]
    },
    "composition": {"alignment": "center"}
}"##;

const STRATEGY_JSON: &str = r#"{
    "brand_voice": {"tone": "confident"},
    "target_audience": {"primary": "engineering teams"},
    "content_strategy": {"themes": ["craft", "precision"]},
    "instagram_posts": [
        {"post_number": 1, "headline": "Examples Done Right", "subtext": "Crafted with care",
         "call_to_action": "Learn More", "content_type": "Educational", "target_emotion": "Trust"},
        {"post_number": 2, "headline": "Precision Matters", "subtext": "See the difference",
         "call_to_action": "Get Started", "content_type": "Brand Story", "target_emotion": "Inspiration"},
        {"post_number": 3, "headline": "Teams Love Us", "subtext": "Join thousands",
         "call_to_action": "Contact Us", "content_type": "Social Proof", "target_emotion": "Confidence"}
    ]
}"#;

struct PageFetcher;

#[async_trait]
impl HtmlFetcher for PageFetcher {
    async fn fetch(&self, _url: &str) -> Result<String> {
        Ok(HOMEPAGE.to_string())
    }
}

struct FixedScreenshot;

#[async_trait]
impl ScreenshotClient for FixedScreenshot {
    async fn capture(&self, _url: &str, _viewport: &ViewportSpec) -> Result<Vec<u8>> {
        let img = image::RgbaImage::from_pixel(8, 8, image::Rgba([255, 255, 255, 255]));
        let mut out = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
            .unwrap();
        Ok(out)
    }
}

struct Templates;

impl InstructionStore for Templates {
    fn load(&self, _agent_name: &str) -> Result<Option<String>> {
        Ok(Some("Return the analysis as a single JSON object.".to_string()))
    }
}

struct FailingRenderer;

#[async_trait]
impl ImageRenderer for FailingRenderer {
    async fn render(&self, _prompt: &PromptRecord, _design: &DesignTokenRecord) -> Result<Vec<u8>> {
        Err(Error::InvalidInput("render backend offline".to_string()))
    }
}

fn build_workflow(
    content_response: &str,
    renderer: Arc<dyn ImageRenderer>,
    artifacts: Arc<dyn ArtifactStore>,
) -> Workflow {
    let fetcher = Arc::new(PageFetcher);
    let templates = Arc::new(Templates);

    let business = BusinessIntelAgent::new(
        Arc::new(MockProvider::with_response(BUSINESS_JSON)),
        fetcher.clone(),
        templates.clone(),
    );
    let design = DesignAgent::new(
        Arc::new(MockProvider::with_response(DESIGN_JSON)),
        Arc::new(FixedScreenshot),
        fetcher.clone(),
        templates.clone(),
    );
    let content = SocialContentAgent::new(
        Arc::new(MockProvider::with_response(content_response)),
        templates.clone(),
        Arc::new(NoSocialFeed),
    );
    let images = ImageAgent::new(renderer, artifacts.clone());

    Workflow::new(business, design, content, PromptAgent::new(), images, artifacts)
}

#[tokio::test]
async fn test_end_to_end_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let artifacts: Arc<dyn ArtifactStore> = Arc::new(FsArtifactStore::new(dir.path()));
    let workflow = build_workflow(STRATEGY_JSON, Arc::new(LocalImageRenderer), artifacts);

    let result = workflow.run("https://example.com").await;

    assert_eq!(result.workflow_status, WorkflowStatus::Completed);
    assert!(result.failed_phases.is_empty());
    assert_eq!(
        result.phases.iter().map(|p| p.name).collect::<Vec<_>>(),
        PhaseName::ALL.to_vec()
    );

    let business = result.phase(PhaseName::BusinessIntelligence).unwrap();
    assert_eq!(
        business.data.pointer("/company_overview/name").unwrap(),
        "Example Co"
    );
    // the facebook pages-prefix is stripped from the handle
    assert_eq!(
        business.data.pointer("/social_media/0/handle").unwrap(),
        "ExampleCo"
    );

    let design = result.phase(PhaseName::DesignAnalysis).unwrap();
    assert_eq!(
        design.data.pointer("/color_kit/brand_primary/hex").unwrap(),
        "#1A73E8"
    );

    let content = result.phase(PhaseName::SocialContent).unwrap();
    assert_eq!(
        content.data.pointer("/instagram_posts").unwrap().as_array().unwrap().len(),
        3
    );

    let prompts: Vec<PromptRecord> = serde_json::from_value(
        result.phase(PhaseName::InstagramPrompts).unwrap().data.clone(),
    )
    .unwrap();
    assert_eq!(prompts.len(), 3);
    for prompt in &prompts {
        assert!(
            prompt.image_prompt.contains("#1A73E8"),
            "prompt must embed the extracted brand color"
        );
    }

    let manifest = result.phase(PhaseName::BrandImages).unwrap();
    let entries = manifest.data.pointer("/images").unwrap().as_array().unwrap();
    assert_eq!(entries.len(), 3);
    for (index, entry) in entries.iter().enumerate() {
        assert_eq!(entry["post_number"], (index + 1) as u64);
        assert_eq!(entry["status"], "success");
    }

    // rendered files exist on disk
    for n in 1..=3 {
        assert!(dir
            .path()
            .join(format!("images/example-com/example-com-post-{n}.png"))
            .exists());
    }
    // per-phase artifacts were persisted
    assert!(dir.path().join("companies").exists());
    assert!(dir.path().join("social-content").exists());
}

#[tokio::test]
async fn test_phase_five_failure_aggregates_with_errors() {
    let dir = tempfile::tempdir().unwrap();
    let artifacts: Arc<dyn ArtifactStore> = Arc::new(FsArtifactStore::new(dir.path()));
    let workflow = build_workflow(STRATEGY_JSON, Arc::new(FailingRenderer), artifacts);

    let result = workflow.run("https://example.com").await;

    assert_eq!(result.workflow_status, WorkflowStatus::CompletedWithErrors);
    assert_eq!(result.failed_phases, vec![PhaseName::BrandImages]);

    for phase in &result.phases[..4] {
        assert_eq!(phase.status, PhaseStatus::Completed, "{} should pass", phase.name);
    }
    let images = result.phase(PhaseName::BrandImages).unwrap();
    assert_eq!(images.status, PhaseStatus::Failed);
    assert!(images.error.as_deref().unwrap().contains("3 image generations failed"));
}

#[tokio::test]
async fn test_pre_phase_fault_is_terminal_failed() {
    let dir = tempfile::tempdir().unwrap();
    let artifacts: Arc<dyn ArtifactStore> = Arc::new(FsArtifactStore::new(dir.path()));
    let workflow = build_workflow(STRATEGY_JSON, Arc::new(LocalImageRenderer), artifacts);

    let result = workflow.run("not-a-url").await;

    assert_eq!(result.workflow_status, WorkflowStatus::Failed);
    assert!(result.phases.is_empty());
    assert!(result.error.is_some());
}

#[tokio::test]
async fn test_content_failure_cascades_but_never_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let artifacts: Arc<dyn ArtifactStore> = Arc::new(FsArtifactStore::new(dir.path()));
    // the strategist returns prose instead of JSON: phase 3 fails loudly
    let workflow = build_workflow(
        "Here are some thoughts about your brand...",
        Arc::new(LocalImageRenderer),
        artifacts,
    );

    let result = workflow.run("https://example.com").await;

    assert_eq!(result.workflow_status, WorkflowStatus::CompletedWithErrors);
    assert_eq!(
        result.failed_phases,
        vec![
            PhaseName::SocialContent,
            PhaseName::InstagramPrompts,
            PhaseName::BrandImages,
        ]
    );
    // the first two phases kept their data
    assert_eq!(
        result.phase(PhaseName::BusinessIntelligence).unwrap().status,
        PhaseStatus::Completed
    );
    assert_eq!(
        result.phase(PhaseName::DesignAnalysis).unwrap().status,
        PhaseStatus::Completed
    );
}

#[tokio::test]
async fn test_single_agent_runs_minimal_chain() {
    let dir = tempfile::tempdir().unwrap();
    let artifacts: Arc<dyn ArtifactStore> = Arc::new(FsArtifactStore::new(dir.path()));
    let workflow = build_workflow(STRATEGY_JSON, Arc::new(LocalImageRenderer), artifacts);

    let result = workflow
        .run_single_agent(PhaseName::SocialContent, "https://example.com")
        .await;

    assert_eq!(result.workflow_status, WorkflowStatus::Completed);
    assert_eq!(
        result.phases.iter().map(|p| p.name).collect::<Vec<_>>(),
        vec![
            PhaseName::BusinessIntelligence,
            PhaseName::DesignAnalysis,
            PhaseName::SocialContent,
        ]
    );

    let design_only = workflow
        .run_single_agent(PhaseName::DesignAnalysis, "https://example.com")
        .await;
    assert_eq!(design_only.phases.len(), 1);
    assert_eq!(design_only.phases[0].name, PhaseName::DesignAnalysis);
}

#[tokio::test]
async fn test_image_manifest_statuses_mix_on_partial_failure() {
    struct EveryOtherRenderer;

    #[async_trait]
    impl ImageRenderer for EveryOtherRenderer {
        async fn render(
            &self,
            prompt: &PromptRecord,
            _design: &DesignTokenRecord,
        ) -> Result<Vec<u8>> {
            if prompt.post_number % 2 == 0 {
                Err(Error::InvalidInput("scripted".to_string()))
            } else {
                Ok(vec![7u8; 32])
            }
        }
    }

    let dir = tempfile::tempdir().unwrap();
    let artifacts: Arc<dyn ArtifactStore> = Arc::new(FsArtifactStore::new(dir.path()));
    let workflow = build_workflow(STRATEGY_JSON, Arc::new(EveryOtherRenderer), artifacts);

    let result = workflow.run("https://example.com").await;

    // partial success still counts as a completed phase
    assert_eq!(result.workflow_status, WorkflowStatus::Completed);
    let manifest = result.phase(PhaseName::BrandImages).unwrap();
    let entries = manifest.data.pointer("/images").unwrap().as_array().unwrap();
    let statuses: Vec<&str> = entries
        .iter()
        .map(|e| e["status"].as_str().unwrap())
        .collect();
    assert_eq!(statuses, vec!["success", "failed", "success"]);
}
