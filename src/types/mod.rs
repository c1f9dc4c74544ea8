pub mod business;
pub mod content;
pub mod design;

pub use business::{BusinessIntelRecord, CompanyOverview, Founder, FounderSource, SocialLink};
pub use content::{
    ContentStrategyRecord, ImageEntry, ImageManifestRecord, ImageStatus, InstagramPost,
    PromptRecord, VisualSpec,
};
pub use design::{
    hex_to_rgb, is_hex_color, luminance, normalize_hex, ColorKit, ColorSwatch, Composition,
    DesignTokenRecord, FontFamily, TypographyKit,
};

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    InProgress,
    Completed,
    CompletedWithErrors,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    Completed,
    Failed,
}

/// The five workflow phases, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseName {
    BusinessIntelligence,
    DesignAnalysis,
    SocialContent,
    InstagramPrompts,
    BrandImages,
}

impl PhaseName {
    pub const ALL: [PhaseName; 5] = [
        PhaseName::BusinessIntelligence,
        PhaseName::DesignAnalysis,
        PhaseName::SocialContent,
        PhaseName::InstagramPrompts,
        PhaseName::BrandImages,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseName::BusinessIntelligence => "business_intelligence",
            PhaseName::DesignAnalysis => "design_analysis",
            PhaseName::SocialContent => "social_content",
            PhaseName::InstagramPrompts => "instagram_prompts",
            PhaseName::BrandImages => "brand_images",
        }
    }
}

impl std::fmt::Display for PhaseName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one phase: status plus the phase-specific payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseResult {
    pub name: PhaseName,
    pub status: PhaseStatus,
    pub data: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PhaseResult {
    pub fn completed(name: PhaseName, data: Value) -> Self {
        Self {
            name,
            status: PhaseStatus::Completed,
            data,
            error: None,
        }
    }

    pub fn failed(name: PhaseName, error: impl Into<String>) -> Self {
        Self {
            name,
            status: PhaseStatus::Failed,
            data: Value::Null,
            error: Some(error.into()),
        }
    }
}

/// Root aggregate for one workflow run. Phases are appended in execution
/// order and never re-run or removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowResult {
    pub url: String,
    pub workflow_status: WorkflowStatus,
    pub phases: Vec<PhaseResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_phases: Vec<PhaseName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WorkflowResult {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            workflow_status: WorkflowStatus::InProgress,
            phases: Vec::new(),
            failed_phases: Vec::new(),
            error: None,
        }
    }

    pub fn record(&mut self, result: PhaseResult) {
        self.phases.push(result);
    }

    pub fn phase(&self, name: PhaseName) -> Option<&PhaseResult> {
        self.phases.iter().find(|p| p.name == name)
    }

    /// Settle the terminal status from the recorded phases.
    pub fn finalize(&mut self) {
        self.failed_phases = self
            .phases
            .iter()
            .filter(|p| p.status == PhaseStatus::Failed)
            .map(|p| p.name)
            .collect();

        self.workflow_status = if self.failed_phases.is_empty() {
            WorkflowStatus::Completed
        } else {
            WorkflowStatus::CompletedWithErrors
        };
    }

    /// Abort with a fault that happened outside any phase handler.
    pub fn fail(&mut self, error: impl Into<String>) {
        self.workflow_status = WorkflowStatus::Failed;
        self.error = Some(error.into());
    }
}
