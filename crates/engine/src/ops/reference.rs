use chrono::Utc;

use crate::{Amount, DEFAULT_REFERENCE_VALUES, ReferenceValue, ResultEngine};

use super::Engine;

impl Engine {
    /// Upserts the built-in reference values by label. Safe to run on every
    /// start.
    pub async fn seed_reference_values(&self) -> ResultEngine<Vec<ReferenceValue>> {
        let now = Utc::now();
        let mut seeded = Vec::with_capacity(DEFAULT_REFERENCE_VALUES.len());
        for (label, default_value, description) in DEFAULT_REFERENCE_VALUES {
            let value = self
                .catalog
                .upsert_reference_value(
                    label,
                    Amount::from_major(default_value),
                    Some(description),
                    now,
                )
                .await?;
            seeded.push(value);
        }
        tracing::debug!(count = seeded.len(), "reference values seeded");
        Ok(seeded)
    }

    pub async fn reference_values(&self) -> ResultEngine<Vec<ReferenceValue>> {
        self.catalog.reference_values().await
    }
}
