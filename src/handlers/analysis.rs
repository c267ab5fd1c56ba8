use anyhow::Result;
use std::sync::Arc;

use crate::models::{Analysis, HistoryEntry, ImagePayload};
use crate::nutrition;
use crate::services::{AdvisoryService, HistoryStore};

pub struct AnalysisHandler {
    store: Arc<HistoryStore>,
    advisor: Arc<dyn AdvisoryService>,
}

impl AnalysisHandler {
    pub fn new(store: Arc<HistoryStore>, advisor: Arc<dyn AdvisoryService>) -> Self {
        Self { store, advisor }
    }

    /// Runs one analysis action: advisory call, history append, nutrient
    /// extraction.
    pub async fn analyze(&self, filename: &str, payload: ImagePayload) -> Result<Analysis> {
        log::info!(
            "🍽️ Analyzing upload '{}' ({} bytes)",
            filename,
            payload.data.len()
        );

        let advice = self.advisor.analyze_food_image(&payload).await?;

        // History is best effort: a failed append is logged and the
        // analysis still succeeds.
        if let Err(e) = self.store.append(filename, &advice).await {
            log::warn!("⚠️ Failed to record history for '{}': {}", filename, e);
        }

        let nutrients = nutrition::extract_nutrients(&advice);
        log::info!(
            "📊 Extracted {} nutrient value(s) for '{}'",
            nutrients.len(),
            filename
        );

        Ok(Analysis {
            filename: filename.to_string(),
            advice,
            nutrients,
        })
    }

    pub async fn recent_history(&self, limit: i64) -> Result<Vec<HistoryEntry>> {
        self.store.recent(limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CannedAdvisory(&'static str);

    #[async_trait::async_trait]
    impl AdvisoryService for CannedAdvisory {
        async fn analyze_food_image(&self, _payload: &ImagePayload) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct FailingAdvisory;

    #[async_trait::async_trait]
    impl AdvisoryService for FailingAdvisory {
        async fn analyze_food_image(&self, _payload: &ImagePayload) -> Result<String> {
            anyhow::bail!("quota exceeded")
        }
    }

    async fn test_handler(advisor: Arc<dyn AdvisoryService>) -> AnalysisHandler {
        let store = Arc::new(HistoryStore::new("sqlite::memory:").await.unwrap());
        AnalysisHandler::new(store, advisor)
    }

    #[tokio::test]
    async fn test_analyze_extracts_and_records() {
        let handler = test_handler(Arc::new(CannedAdvisory(
            "Grilled chicken with rice.\nCarbohydrates: 45%\nFats: 20%",
        )))
        .await;

        let payload = ImagePayload::new("image/jpeg", vec![0xff, 0xd8]);
        let analysis = handler.analyze("lunch.jpg", payload).await.unwrap();

        assert_eq!(analysis.filename, "lunch.jpg");
        assert_eq!(analysis.nutrients.get("Carbohydrates"), Some(&45));
        assert_eq!(analysis.nutrients.get("Fats"), Some(&20));

        let history = handler.recent_history(5).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].filename, "lunch.jpg");
        assert_eq!(history[0].response, analysis.advice);
    }

    #[tokio::test]
    async fn test_advisory_failure_leaves_no_history() {
        let handler = test_handler(Arc::new(FailingAdvisory)).await;

        let payload = ImagePayload::new("image/jpeg", vec![]);
        let result = handler.analyze("dinner.jpg", payload).await;

        assert!(result.is_err());
        assert!(handler.recent_history(5).await.unwrap().is_empty());
    }
}
