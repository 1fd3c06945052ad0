//! Greedy debt netting.
//!
//! Reduces a map of per-member net balances into a short list of transfers
//! that settle every matched debt. The map is keyed by member id in a
//! `BTreeMap`, so iteration order (and therefore the pairing of debtors to
//! creditors) is ascending member id and fully deterministic.

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::MoneyCents;

/// A suggested payment closing part of the group's debt graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transfer {
    pub from: Uuid,
    pub to: Uuid,
    pub amount: MoneyCents,
}

/// Nets a balance map into pairwise transfers.
///
/// Members with negative balance (debtors) are walked in ascending-id order;
/// each one pays creditors (positive balance, same order) until their debt
/// is exhausted. This emits at most `debtors + creditors - 1` transfers —
/// a standard greedy heuristic, not a provably minimal matching.
///
/// If the map does not net to zero (possible with PERCENTAGE rounding
/// drift), the residual on one side simply stays unmatched: a transfer
/// never exceeds `min(debt, credit)`, so no money is invented.
pub fn simplify_debts(balances: &BTreeMap<Uuid, MoneyCents>) -> Vec<Transfer> {
    let debtors: Vec<(Uuid, i64)> = balances
        .iter()
        .filter(|(_, balance)| balance.is_negative())
        .map(|(id, balance)| (*id, -balance.cents()))
        .collect();
    let mut creditors: Vec<(Uuid, i64)> = balances
        .iter()
        .filter(|(_, balance)| balance.is_positive())
        .map(|(id, balance)| (*id, balance.cents()))
        .collect();

    let mut transfers = Vec::new();
    let mut next_creditor = 0;

    for (debtor, mut debt) in debtors {
        while debt > 0 && next_creditor < creditors.len() {
            let (creditor, credit) = &mut creditors[next_creditor];
            let transfer = debt.min(*credit);
            if transfer > 0 {
                transfers.push(Transfer {
                    from: debtor,
                    to: *creditor,
                    amount: MoneyCents::new(transfer),
                });
                debt -= transfer;
                *credit -= transfer;
            }
            if *credit == 0 {
                next_creditor += 1;
            }
        }
    }

    transfers
}
