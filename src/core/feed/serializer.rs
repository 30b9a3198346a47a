use super::types::NewsItem;

#[derive(Debug, thiserror::Error)]
pub enum EncodingError {
    #[error("failed to encode news items as json: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn items_to_json(items: &[NewsItem]) -> Result<String, EncodingError> {
    Ok(serde_json::to_string(items)?)
}
