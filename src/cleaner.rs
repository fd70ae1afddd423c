//! Removes transfers between the account holder's own accounts.

use crate::models::Transaction;

const TRANSFER_PREFIXES: &[&str] = &["Transfer to", "Transfer from"];

pub fn is_transfer(transaction: &Transaction) -> bool {
    transaction.transfer_account.is_some()
        || TRANSFER_PREFIXES
            .iter()
            .any(|prefix| transaction.merchant_name.starts_with(prefix))
}

/// Order-preserving filter dropping internal transfers.
pub fn clean(transactions: Vec<Transaction>) -> Vec<Transaction> {
    transactions.into_iter().filter(|t| !is_transfer(t)).collect()
}
