use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectDamageRequest {
    pub before_image_url: Option<String>,
    pub after_image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeImageRequest {
    pub image_url: Option<String>,
    pub action: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DescriptionResponse {
    pub description: String,
}
