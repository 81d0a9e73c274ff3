use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::iter::Sum;

/// The number of distinct power-of-two denominations a `u64` amount can be broken into.
pub const MAX_DENOMINATIONS: usize = u64::BITS as usize;

/// A quantity of ecash, in the smallest unit the mint issues (satoshis).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount {
    sat: u64,
}

impl Amount {
    pub const ZERO: Amount = Amount { sat: 0 };

    pub fn from_sat(sat: u64) -> Self {
        Amount { sat }
    }

    pub fn to_sat(&self) -> u64 {
        self.sat
    }

    pub fn is_zero(&self) -> bool {
        self.sat == 0
    }

    /// Returns true if this amount is a valid denomination, i.e. a non-zero power of two.
    pub fn is_denomination(&self) -> bool {
        self.sat.is_power_of_two()
    }

    pub fn checked_add(&self, other: Amount) -> Option<Amount> {
        self.sat.checked_add(other.sat).map(Amount::from_sat)
    }

    pub fn checked_sub(&self, other: Amount) -> Option<Amount> {
        self.sat.checked_sub(other.sat).map(Amount::from_sat)
    }

    /// Adds up `amounts`, or returns `None` if the total does not fit in a `u64`.
    pub fn checked_sum<I: IntoIterator<Item = Amount>>(amounts: I) -> Option<Amount> {
        amounts.into_iter().try_fold(Amount::ZERO, |acc, a| acc.checked_add(a))
    }

    /// Decomposes the amount into its canonical denominations.
    ///
    /// The result has one entry per set bit of the binary representation, in ascending order. This is the unique
    /// shortest list of powers of two that sums to the amount. Zero yields an empty list.
    pub fn split(&self) -> Vec<Amount> {
        (0..MAX_DENOMINATIONS)
            .map(|bit| 1u64 << bit)
            .filter(|denomination| self.sat & denomination != 0)
            .map(Amount::from_sat)
            .collect()
    }
}

/// Computes the output denominations for a two-sided split of `total` where `send` is handed to a receiver.
///
/// Returns `(keep, send)` denominations, or `None` if `send` exceeds `total`.
pub fn split_for_send(total: Amount, send: Amount) -> Option<(Vec<Amount>, Vec<Amount>)> {
    let keep = total.checked_sub(send)?;
    Some((keep.split(), send.split()))
}

impl From<u64> for Amount {
    fn from(sat: u64) -> Self {
        Amount::from_sat(sat)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} sat", self.sat)
    }
}

/// Saturates at `u64::MAX`. Use [`Amount::checked_sum`] where the amounts come from outside the wallet.
impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        Amount::from_sat(iter.fold(0u64, |acc, a| acc.saturating_add(a.sat)))
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}
