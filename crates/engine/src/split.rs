//! Split computation.
//!
//! Pure functions that turn an expense amount plus per-member inputs into
//! the per-member shares that get persisted as split rows. Persistence is
//! the caller's job.

use std::collections::HashSet;

use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine, SplitType};

/// Basis points in 100% (percentages carry 2 decimal digits, so 1% = 100).
pub const PERCENT_SCALE: i64 = 10_000;

/// One member's split input, as supplied by the caller.
///
/// `amount` is required for EXACT splits, `percent_bp` for PERCENTAGE
/// splits; EQUAL splits ignore both.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SplitInput {
    pub member_id: Uuid,
    pub amount: Option<MoneyCents>,
    pub percent_bp: Option<i32>,
}

/// One member's computed share. Preserves input order, one entry per input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SplitShare {
    pub member_id: Uuid,
    pub amount: MoneyCents,
    pub percent_bp: Option<i32>,
}

/// Computes per-member shares for an expense.
///
/// Rules per split type:
/// - `EQUAL`: `amount / n` cents each; the `amount % n` leftover cents go
///   one extra cent to the earliest members in input order, so the shares
///   always sum to the total.
/// - `EXACT`: every member supplies an amount; the sum must equal the total
///   exactly or the call fails with [`EngineError::SplitMismatch`].
/// - `PERCENTAGE`: every member supplies basis points in `0..=10_000`; the
///   sum must be exactly 10_000 or the call fails with `SplitMismatch`.
///   Each share is `amount × bp / 10_000` rounded half-up to the cent.
///   Shares are deliberately not reconciled against the total, so their sum
///   can drift from it by single cents.
pub fn compute_splits(
    amount: MoneyCents,
    split_type: SplitType,
    inputs: &[SplitInput],
) -> ResultEngine<Vec<SplitShare>> {
    if !amount.is_positive() {
        return Err(EngineError::InvalidInput("amount must be > 0".to_string()));
    }
    if inputs.is_empty() {
        return Err(EngineError::InvalidInput(
            "split list must not be empty".to_string(),
        ));
    }

    let mut seen: HashSet<Uuid> = HashSet::with_capacity(inputs.len());
    for input in inputs {
        if !seen.insert(input.member_id) {
            return Err(EngineError::InvalidInput(
                "duplicate member in split list".to_string(),
            ));
        }
    }

    match split_type {
        SplitType::Equal => Ok(equal_shares(amount, inputs)),
        SplitType::Exact => exact_shares(amount, inputs),
        SplitType::Percentage => percentage_shares(amount, inputs),
    }
}

fn equal_shares(amount: MoneyCents, inputs: &[SplitInput]) -> Vec<SplitShare> {
    let n = inputs.len() as i64;
    let base = amount.cents() / n;
    let remainder = amount.cents() % n;

    inputs
        .iter()
        .enumerate()
        .map(|(index, input)| SplitShare {
            member_id: input.member_id,
            amount: MoneyCents::new(base + i64::from((index as i64) < remainder)),
            percent_bp: None,
        })
        .collect()
}

fn exact_shares(amount: MoneyCents, inputs: &[SplitInput]) -> ResultEngine<Vec<SplitShare>> {
    let mut shares = Vec::with_capacity(inputs.len());
    let mut total = MoneyCents::ZERO;

    for input in inputs {
        let share = input.amount.ok_or_else(|| {
            EngineError::InvalidInput("EXACT split requires an amount for every member".to_string())
        })?;
        if share.is_negative() {
            return Err(EngineError::InvalidInput(
                "split amount must not be negative".to_string(),
            ));
        }
        total = total.checked_add(share).ok_or_else(|| {
            EngineError::InvalidInput("split amounts overflow".to_string())
        })?;
        shares.push(SplitShare {
            member_id: input.member_id,
            amount: share,
            percent_bp: None,
        });
    }

    if total != amount {
        return Err(EngineError::SplitMismatch {
            expected: amount.cents(),
            actual: total.cents(),
        });
    }

    Ok(shares)
}

fn percentage_shares(amount: MoneyCents, inputs: &[SplitInput]) -> ResultEngine<Vec<SplitShare>> {
    let mut total_bp: i64 = 0;
    for input in inputs {
        let bp = input.percent_bp.ok_or_else(|| {
            EngineError::InvalidInput(
                "PERCENTAGE split requires a percentage for every member".to_string(),
            )
        })?;
        if !(0..=PERCENT_SCALE as i32).contains(&bp) {
            return Err(EngineError::InvalidInput(
                "percentage must be between 0 and 100".to_string(),
            ));
        }
        total_bp += i64::from(bp);
    }

    if total_bp != PERCENT_SCALE {
        return Err(EngineError::SplitMismatch {
            expected: PERCENT_SCALE,
            actual: total_bp,
        });
    }

    Ok(inputs
        .iter()
        .map(|input| {
            // Validated non-None above.
            let bp = i64::from(input.percent_bp.unwrap_or_default());
            SplitShare {
                member_id: input.member_id,
                amount: MoneyCents::new(
                    (amount.cents() * bp + PERCENT_SCALE / 2) / PERCENT_SCALE,
                ),
                percent_bp: input.percent_bp,
            }
        })
        .collect())
}
