//! Structural validation of transaction drafts.

use crate::{Amount, Candidate, EngineError, ResultEngine, TransactionDraft, TransactionKind};

fn required(value: Option<String>, field: &str) -> ResultEngine<String> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(EngineError::Validation(format!("{field} is required"))),
    }
}

/// Checks required fields, amount signs and the per-type amount rules.
///
/// User ids are trimmed; the description is kept as submitted once it is
/// known to contain something other than whitespace.
pub fn validate(draft: TransactionDraft) -> ResultEngine<Candidate> {
    let from_user_id = required(draft.from_user_id, "fromUserId")?.trim().to_string();
    let to_user_id = required(draft.to_user_id, "toUserId")?.trim().to_string();
    let kind = draft.kind.ok_or_else(|| {
        EngineError::Validation(
            "type is required (PHYSICAL_SALE, BARTER, FAVOR_GIFT, LABOR_SERVICE or MIXED)"
                .to_string(),
        )
    })?;
    let description = required(draft.description, "description")?;

    if from_user_id == to_user_id {
        return Err(EngineError::Validation(
            "fromUserId and toUserId must differ".to_string(),
        ));
    }

    let monetary = draft.monetary_amount;
    let human = draft.human_value_amount;
    if monetary.is_negative() || human.is_negative() {
        return Err(EngineError::Validation(
            "amounts must not be negative".to_string(),
        ));
    }

    if monetary > Amount::MAX || human > Amount::MAX {
        return Err(EngineError::Validation(format!(
            "amounts must not exceed {}",
            Amount::MAX
        )));
    }

    match kind {
        TransactionKind::Mixed if monetary.is_zero() && human.is_zero() => {
            return Err(EngineError::Validation(
                "MIXED transactions need a monetary amount or a human value".to_string(),
            ));
        }
        k if k.requires_monetary() && !monetary.is_positive() => {
            return Err(EngineError::Validation(format!(
                "{} transactions need a monetary amount",
                k.as_str()
            )));
        }
        k if k.is_favor() && !human.is_positive() => {
            return Err(EngineError::Validation(format!(
                "{} transactions need a human value",
                k.as_str()
            )));
        }
        _ => {}
    }

    Ok(Candidate {
        from_user_id,
        to_user_id,
        kind,
        monetary_amount: monetary,
        human_value_amount: human,
        description,
    })
}
