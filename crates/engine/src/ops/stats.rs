use chrono::{DateTime, Utc};

use crate::{Amount, EngineError, ResultEngine};

use super::Engine;

/// Human value a user moved inside the current window, as sender or receiver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RollingTotal {
    pub user_id: String,
    pub human_value_total: Amount,
    pub since: DateTime<Utc>,
}

/// Activity between two users inside the current window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PairStats {
    pub user_a: String,
    pub user_b: String,
    pub transaction_count: u64,
    pub human_value_total: Amount,
    pub since: DateTime<Utc>,
}

fn required_user(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(format!("{label} is required")));
    }
    Ok(trimmed.to_string())
}

impl Engine {
    pub async fn user_human_value_total(&self, user_id: &str) -> ResultEngine<RollingTotal> {
        let user_id = required_user(user_id, "userId")?;
        let since = self.evaluator.window_start(Utc::now());
        let human_value_total = self.log.sum_human_value(&user_id, since).await?;
        Ok(RollingTotal {
            user_id,
            human_value_total,
            since,
        })
    }

    /// The pair is unordered; `(a, b)` and `(b, a)` report the same numbers.
    pub async fn pair_stats(&self, user_a: &str, user_b: &str) -> ResultEngine<PairStats> {
        let user_a = required_user(user_a, "userA")?;
        let user_b = required_user(user_b, "userB")?;
        let since = self.evaluator.window_start(Utc::now());

        let transaction_count = self.log.count_between_pair(&user_a, &user_b, since).await?;
        let human_value_total = self
            .log
            .sum_human_value_between_pair(&user_a, &user_b, since)
            .await?;

        Ok(PairStats {
            user_a,
            user_b,
            transaction_count,
            human_value_total,
            since,
        })
    }
}
