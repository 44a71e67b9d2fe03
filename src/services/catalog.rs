//! Dashboard operations over the list of RFC summaries.

use crate::error::AppError;
use crate::models::{RfcAggregate, RfcStats, RfcSummary};
use crate::services::settings::{EngineSettings, TitleSettings};
use crate::services::store::{delete_with_summary, RfcStore};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// All RFCs known to a store.
#[derive(Clone)]
pub struct RfcCatalog {
    store: Arc<dyn RfcStore>,
    titles: TitleSettings,
}

impl RfcCatalog {
    pub fn new(store: Arc<dyn RfcStore>, settings: &EngineSettings) -> Self {
        Self {
            store,
            titles: settings.titles,
        }
    }

    pub async fn list(&self) -> Result<Vec<RfcSummary>, AppError> {
        self.store.load_summaries().await
    }

    pub async fn get(&self, id: &str) -> Result<Option<RfcSummary>, AppError> {
        Ok(self.list().await?.into_iter().find(|s| s.id == id))
    }

    /// Register a new, empty draft.
    ///
    /// Only the summary is written; the aggregate is created when the RFC is
    /// first opened.
    pub async fn create(&self, title: &str) -> Result<RfcSummary, AppError> {
        self.titles.validate(title)?;

        let summary = RfcAggregate::new_draft(Uuid::new_v4().to_string(), title, Utc::now()).summary();
        let mut summaries = self.store.load_summaries().await?;
        summaries.push(summary.clone());
        self.store.save_summaries(&summaries).await?;

        log::info!("Created RFC {} ({})", summary.id, summary.title);
        Ok(summary)
    }

    /// Change the title in the summary and, if it was ever opened, the RFC itself.
    pub async fn rename(&self, id: &str, title: &str) -> Result<RfcSummary, AppError> {
        self.titles.validate(title)?;

        let now = Utc::now();
        let mut summaries = self.store.load_summaries().await?;
        let summary = summaries
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| AppError::not_found_with_id("RFC", id))?;
        summary.title = title.to_string();
        summary.updated_at = now;
        let renamed = summary.clone();

        if let Some(mut rfc) = self.store.load_aggregate(id).await? {
            rfc.title = title.to_string();
            rfc.updated_at = now;
            self.store.save_aggregate(&rfc).await?;
        }
        self.store.save_summaries(&summaries).await?;

        Ok(renamed)
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        if self.get(id).await?.is_none() {
            return Err(AppError::not_found_with_id("RFC", id));
        }

        delete_with_summary(self.store.as_ref(), id).await?;
        log::info!("Deleted RFC {}", id);
        Ok(())
    }

    pub async fn stats(&self) -> Result<RfcStats, AppError> {
        Ok(RfcStats::from_summaries(&self.list().await?))
    }
}

impl std::fmt::Debug for RfcCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RfcCatalog")
            .field("titles", &self.titles)
            .finish_non_exhaustive()
    }
}
