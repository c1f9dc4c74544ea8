//! The five-phase brand workflow.
//!
//! Phases run strictly in sequence; each failure is caught at the phase
//! boundary and recorded, and later phases still run on default or partial
//! inputs. This best-effort continuation is deliberate: a failed design
//! pass should not cost the caller the whole content strategy.

use std::sync::Arc;

use serde_json::Value;

use crate::agents::{
    sanitize_domain, today, AiImageRenderer, BusinessIntelAgent, DesignAgent, ImageAgent,
    ImageRenderer, LocalImageRenderer, PromptAgent, SocialContentAgent,
};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::external::screenshot::DisabledScreenshot;
use crate::external::{
    ArtifactStore, FsArtifactStore, FsInstructionStore, NoSocialFeed, ReqwestHtmlFetcher,
    ScreenshotApiClient, ScreenshotClient,
};
use crate::providers::{AiCapability, AiProvider, ProviderFactory};
use crate::types::{
    BusinessIntelRecord, ContentStrategyRecord, DesignTokenRecord, PhaseName, PhaseResult,
    PhaseStatus, PromptRecord, WorkflowResult,
};

pub struct Workflow {
    business: BusinessIntelAgent,
    design: DesignAgent,
    content: SocialContentAgent,
    prompts: PromptAgent,
    images: ImageAgent,
    artifacts: Arc<dyn ArtifactStore>,
}

impl Workflow {
    pub fn new(
        business: BusinessIntelAgent,
        design: DesignAgent,
        content: SocialContentAgent,
        prompts: PromptAgent,
        images: ImageAgent,
        artifacts: Arc<dyn ArtifactStore>,
    ) -> Self {
        Self {
            business,
            design,
            content,
            prompts,
            images,
            artifacts,
        }
    }

    /// Wire up the default agents from environment configuration. Fails
    /// fast when a required provider cannot be constructed; the screenshot
    /// API and the image-generation backend degrade instead (defaults and
    /// local rendering respectively).
    pub fn from_env() -> Result<Self> {
        Self::from_config(Config::from_env(), FsArtifactStore::default())
    }

    pub fn from_config(config: Config, artifacts: FsArtifactStore) -> Result<Self> {
        let factory = ProviderFactory::new(config.clone());

        let web_provider: Arc<dyn AiProvider> =
            Arc::from(factory.resolve(AiCapability::WebAnalysis)?);
        let vision_provider: Arc<dyn AiProvider> =
            Arc::from(factory.resolve(AiCapability::ImageAnalysis)?);
        let strategy_provider: Arc<dyn AiProvider> =
            Arc::from(factory.resolve(AiCapability::ContentStrategy)?);

        let renderer: Arc<dyn ImageRenderer> = match factory.resolve(AiCapability::ImageGeneration)
        {
            Ok(provider) => Arc::new(AiImageRenderer::new(Arc::from(provider))),
            Err(err) => {
                log::warn!("image generation unavailable ({err}); rendering locally");
                Arc::new(LocalImageRenderer)
            }
        };

        let fetcher = Arc::new(ReqwestHtmlFetcher::new()?);
        let screenshot: Arc<dyn ScreenshotClient> = match ScreenshotApiClient::new(&config) {
            Ok(client) => Arc::new(client),
            Err(err) => {
                log::warn!("screenshot API not configured ({err}); design analysis degrades");
                Arc::new(DisabledScreenshot)
            }
        };
        let instructions = Arc::new(FsInstructionStore::default());
        let artifacts: Arc<dyn ArtifactStore> = Arc::new(artifacts);

        Ok(Self {
            business: BusinessIntelAgent::new(
                web_provider,
                fetcher.clone(),
                instructions.clone(),
            ),
            design: DesignAgent::new(
                vision_provider,
                screenshot,
                fetcher.clone(),
                instructions.clone(),
            ),
            content: SocialContentAgent::new(
                strategy_provider,
                instructions,
                Arc::new(NoSocialFeed),
            ),
            prompts: PromptAgent::new(),
            images: ImageAgent::new(renderer, artifacts.clone()),
            artifacts,
        })
    }

    /// Run the complete five-phase workflow.
    pub async fn run(&self, url: &str) -> WorkflowResult {
        self.run_phases(url, &PhaseName::ALL).await
    }

    /// Run only the minimal dependency chain for one phase.
    pub async fn run_single_agent(&self, target: PhaseName, url: &str) -> WorkflowResult {
        self.run_phases(url, dependency_chain(target)).await
    }

    async fn run_phases(&self, url: &str, phases: &[PhaseName]) -> WorkflowResult {
        let mut result = WorkflowResult::new(url);

        // faults before any phase starts are terminal, not a phase failure
        if let Err(err) = validate_url(url) {
            log::error!("workflow failed for {url}: {err}");
            result.fail(err.to_string());
            return result;
        }

        log::info!("starting brand workflow for {url} ({} phases)", phases.len());
        let domain = sanitize_domain(url);
        let date = today();

        let mut business: Option<BusinessIntelRecord> = None;
        let mut design: Option<DesignTokenRecord> = None;
        let mut strategy: Option<ContentStrategyRecord> = None;
        let mut prompt_records: Option<Vec<PromptRecord>> = None;

        for phase in phases {
            match phase {
                PhaseName::BusinessIntelligence => {
                    log::info!("phase 1: business intelligence analysis");
                    match self.business.analyze(url).await {
                        Ok(record) => {
                            let data = phase_data(&record);
                            self.save_phase(
                                &format!("companies/{domain}-business-intelligence-{date}.json"),
                                &data,
                            );
                            result.record(PhaseResult::completed(*phase, data));
                            business = Some(record);
                        }
                        Err(err) => self.record_failure(&mut result, *phase, err),
                    }
                }
                PhaseName::DesignAnalysis => {
                    log::info!("phase 2: design style analysis");
                    match self.design.analyze(url).await {
                        Ok(record) => {
                            let data = phase_data(&record);
                            self.save_phase(
                                &format!(
                                    "screenshots/analyses/{domain}-design-analysis-{date}.json"
                                ),
                                &data,
                            );
                            result.record(PhaseResult::completed(*phase, data));
                            design = Some(record);
                        }
                        Err(err) => self.record_failure(&mut result, *phase, err),
                    }
                }
                PhaseName::SocialContent => {
                    log::info!("phase 3: social media content creation");
                    let business_input = business
                        .clone()
                        .unwrap_or_else(|| default_business(url));
                    let design_input = design
                        .clone()
                        .unwrap_or_else(|| DesignTokenRecord::neutral_defaults(url));
                    match self
                        .content
                        .create_strategy(url, &business_input, &design_input)
                        .await
                    {
                        Ok(record) => {
                            let data = phase_data(&record);
                            self.save_phase(
                                &format!("social-content/{domain}-social-content-{date}.json"),
                                &data,
                            );
                            result.record(PhaseResult::completed(*phase, data));
                            strategy = Some(record);
                        }
                        Err(err) => self.record_failure(&mut result, *phase, err),
                    }
                }
                PhaseName::InstagramPrompts => {
                    log::info!("phase 4: image prompt generation");
                    let design_input = design
                        .clone()
                        .unwrap_or_else(|| DesignTokenRecord::neutral_defaults(url));
                    match &strategy {
                        Some(strategy) => {
                            match self.prompts.generate_prompts(url, strategy, &design_input) {
                                Ok(records) => {
                                    let data = phase_data(&records);
                                    self.save_phase(
                                        &format!(
                                            "instagram-prompts/{domain}-instagram-prompts-{date}.json"
                                        ),
                                        &data,
                                    );
                                    result.record(PhaseResult::completed(*phase, data));
                                    prompt_records = Some(records);
                                }
                                Err(err) => self.record_failure(&mut result, *phase, err),
                            }
                        }
                        None => self.record_failure(
                            &mut result,
                            *phase,
                            Error::InvalidInput(
                                "social content phase produced no strategy".to_string(),
                            ),
                        ),
                    }
                }
                PhaseName::BrandImages => {
                    log::info!("phase 5: brand image generation");
                    let design_input = design
                        .clone()
                        .unwrap_or_else(|| DesignTokenRecord::neutral_defaults(url));
                    match &prompt_records {
                        Some(records) => {
                            match self.images.render_images(url, records, &design_input).await {
                                // a batch where every render failed is a
                                // failed phase; partial success is not
                                Ok(manifest)
                                    if manifest.total_images > 0
                                        && manifest.successes() == 0 =>
                                {
                                    let error = format!(
                                        "all {} image generations failed",
                                        manifest.total_images
                                    );
                                    log::error!("phase {phase} failed: {error}");
                                    result.record(PhaseResult {
                                        name: *phase,
                                        status: PhaseStatus::Failed,
                                        data: phase_data(&manifest),
                                        error: Some(error),
                                    });
                                }
                                Ok(manifest) => {
                                    result.record(PhaseResult::completed(
                                        *phase,
                                        phase_data(&manifest),
                                    ));
                                }
                                Err(err) => self.record_failure(&mut result, *phase, err),
                            }
                        }
                        None => self.record_failure(
                            &mut result,
                            *phase,
                            Error::InvalidInput(
                                "prompt phase produced no prompts".to_string(),
                            ),
                        ),
                    }
                }
            }
        }

        result.finalize();
        match &result.failed_phases[..] {
            [] => log::info!("workflow completed for {url}"),
            failed => log::warn!("workflow completed with errors in {failed:?}"),
        }
        result
    }

    fn record_failure(&self, result: &mut WorkflowResult, phase: PhaseName, err: Error) {
        log::error!("phase {phase} failed: {err}");
        result.record(PhaseResult::failed(phase, err.to_string()));
    }

    fn save_phase(&self, logical_path: &str, data: &Value) {
        if let Err(err) = self.artifacts.save_json(data, logical_path) {
            log::warn!("could not persist {logical_path}: {err}");
        }
    }
}

/// The phases that must run, in order, for `target` to have its inputs.
pub fn dependency_chain(target: PhaseName) -> &'static [PhaseName] {
    match target {
        PhaseName::BusinessIntelligence => &[PhaseName::BusinessIntelligence],
        PhaseName::DesignAnalysis => &[PhaseName::DesignAnalysis],
        PhaseName::SocialContent => &[
            PhaseName::BusinessIntelligence,
            PhaseName::DesignAnalysis,
            PhaseName::SocialContent,
        ],
        PhaseName::InstagramPrompts => &[
            PhaseName::BusinessIntelligence,
            PhaseName::DesignAnalysis,
            PhaseName::SocialContent,
            PhaseName::InstagramPrompts,
        ],
        PhaseName::BrandImages => &PhaseName::ALL,
    }
}

/// CLI agent names → target phase.
pub fn phase_for_agent(name: &str) -> Option<PhaseName> {
    match name {
        "business" => Some(PhaseName::BusinessIntelligence),
        "screenshot" | "design" => Some(PhaseName::DesignAnalysis),
        "content" => Some(PhaseName::SocialContent),
        "prompts" => Some(PhaseName::InstagramPrompts),
        "images" => Some(PhaseName::BrandImages),
        _ => None,
    }
}

fn validate_url(url: &str) -> Result<()> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput("url must not be empty".to_string()));
    }
    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        return Err(Error::InvalidInput(format!(
            "url must start with http:// or https://: {trimmed}"
        )));
    }
    Ok(())
}

fn phase_data<T: serde::Serialize>(record: &T) -> Value {
    serde_json::to_value(record).unwrap_or(Value::Null)
}

fn default_business(url: &str) -> BusinessIntelRecord {
    let mut record = BusinessIntelRecord::default();
    record.url = url.to_string();
    record.company_overview.name = crate::agents::host_of(url);
    record
}
