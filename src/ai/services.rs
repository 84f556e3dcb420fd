use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::vision::VisionClient;

const DAMAGE_PROMPT: &str = r#"Compare these two images of the same item. The first is the "before" image, the second is "after" use.

Analyze for any damage, wear, or changes. Respond in JSON format:
{
  "hasDamage": boolean,
  "damageDescription": "detailed description of any damage found",
  "severity": "minor" | "moderate" | "severe",
  "estimatedCost": estimated repair cost in USD
}"#;

const CONDITION_PROMPT: &str = r#"Analyze this item's condition based on the image. Consider wear, cleanliness, and overall state.

Respond in JSON format:
{
  "condition": "excellent" | "good" | "fair" | "poor",
  "description": "detailed condition assessment",
  "suggestedPrice": estimated market value in USD
}"#;

const DESCRIPTION_PROMPT: &str = r#"Generate a detailed, appealing description for this item that would be suitable for a shared ownership platform. Include:
- What the item is
- Key features and specifications
- Condition notes
- Ideal use cases

Keep it concise but informative (2-3 paragraphs)."#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Minor,
    Moderate,
    Severe,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageVerdict {
    pub has_damage: bool,
    pub damage_description: String,
    pub severity: Severity,
    pub estimated_cost: f64,
}

impl DamageVerdict {
    /// Conservative default used whenever the comparison cannot run.
    pub fn clean_default() -> Self {
        Self {
            has_damage: false,
            damage_description: "Unable to analyze damage".to_string(),
            severity: Severity::Minor,
            estimated_cost: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Excellent,
    Good,
    Fair,
    Poor,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionReport {
    pub condition: Condition,
    pub description: String,
    pub suggested_price: f64,
}

/// Compare a baseline image against an "after" image. Fail-open: any
/// collaborator or parse failure degrades to the no-damage default so a
/// flaky vision API cannot block a check-in.
pub async fn detect_damage(
    vision: &dyn VisionClient,
    before_url: &str,
    after_url: &str,
) -> DamageVerdict {
    match try_detect_damage(vision, before_url, after_url).await {
        Ok(verdict) => verdict,
        Err(e) => {
            warn!(error = %e, "damage detection failed, assuming no damage");
            DamageVerdict::clean_default()
        }
    }
}

async fn try_detect_damage(
    vision: &dyn VisionClient,
    before_url: &str,
    after_url: &str,
) -> anyhow::Result<DamageVerdict> {
    let urls = [before_url.to_string(), after_url.to_string()];
    let reply = vision.generate(DAMAGE_PROMPT, &urls).await?;
    let json = extract_json(&reply)
        .ok_or_else(|| anyhow::anyhow!("no JSON object in model reply"))?;
    serde_json::from_str(json).context("decode damage verdict")
}

pub async fn analyze_item_condition(
    vision: &dyn VisionClient,
    image_url: &str,
) -> anyhow::Result<ConditionReport> {
    let reply = vision
        .generate(CONDITION_PROMPT, &[image_url.to_string()])
        .await?;
    let json = extract_json(&reply)
        .ok_or_else(|| anyhow::anyhow!("no JSON object in model reply"))?;
    serde_json::from_str(json).context("decode condition report")
}

pub async fn generate_item_description(
    vision: &dyn VisionClient,
    image_url: &str,
) -> anyhow::Result<String> {
    vision
        .generate(DESCRIPTION_PROMPT, &[image_url.to_string()])
        .await
}

/// Models wrap their JSON in prose or markdown fences; take the outermost
/// object.
pub(crate) fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end >= start).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::async_trait;

    struct CannedVision(&'static str);
    #[async_trait]
    impl VisionClient for CannedVision {
        async fn generate(&self, _p: &str, _urls: &[String]) -> anyhow::Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct BrokenVision;
    #[async_trait]
    impl VisionClient for BrokenVision {
        async fn generate(&self, _p: &str, _urls: &[String]) -> anyhow::Result<String> {
            anyhow::bail!("upstream unavailable")
        }
    }

    #[test]
    fn extract_json_handles_fenced_replies() {
        let reply = "Here you go:\n```json\n{\"hasDamage\": true}\n```\nthanks";
        assert_eq!(extract_json(reply), Some("{\"hasDamage\": true}"));
        assert_eq!(extract_json("no json here"), None);
    }

    #[tokio::test]
    async fn detect_damage_parses_model_verdict() {
        let vision = CannedVision(
            r#"{"hasDamage":true,"damageDescription":"Cracked lens hood","severity":"moderate","estimatedCost":45}"#,
        );
        let verdict = detect_damage(&vision, "ipfs://before", "ipfs://after").await;
        assert!(verdict.has_damage);
        assert_eq!(verdict.severity, Severity::Moderate);
        assert_eq!(verdict.estimated_cost, 45.0);
    }

    #[tokio::test]
    async fn detect_damage_fails_open() {
        let verdict = detect_damage(&BrokenVision, "ipfs://before", "ipfs://after").await;
        assert!(!verdict.has_damage);
        assert_eq!(verdict.damage_description, "Unable to analyze damage");
        assert_eq!(verdict.severity, Severity::Minor);
    }

    #[tokio::test]
    async fn detect_damage_fails_open_on_garbage_reply() {
        let verdict = detect_damage(
            &CannedVision("I cannot tell from these photos."),
            "ipfs://before",
            "ipfs://after",
        )
        .await;
        assert!(!verdict.has_damage);
    }

    #[tokio::test]
    async fn condition_analysis_propagates_failures() {
        let err = analyze_item_condition(&BrokenVision, "ipfs://img")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("upstream unavailable"));
    }

    #[tokio::test]
    async fn condition_analysis_parses_report() {
        let vision = CannedVision(
            r#"{"condition":"good","description":"Light wear on the grip","suggestedPrice":320}"#,
        );
        let report = analyze_item_condition(&vision, "ipfs://img").await.unwrap();
        assert_eq!(report.condition, Condition::Good);
        assert_eq!(report.suggested_price, 320.0);
    }
}
