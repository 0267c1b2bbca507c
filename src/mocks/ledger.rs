//! Mock fungible ledger for testing.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{MarketError, MarketResult};
use crate::traits::FungibleLedger;
use crate::types::{AccountId, Amount, CurrencyId};

/// Types of failures that can be simulated.
#[derive(Debug, Clone, Copy)]
pub enum MockLedgerFailure {
    /// Fail all operations.
    All,
    /// Fail only allowance-gated pulls.
    Pulls,
    /// Fail only pushes out of custody.
    Pushes,
}

#[derive(Debug)]
struct LedgerInner {
    balances: Mutex<HashMap<(AccountId, CurrencyId), Amount>>,
    /// Allowance granted per (owner, spender, currency).
    allowances: Mutex<HashMap<(AccountId, AccountId, CurrencyId), Amount>>,
    /// The market's custody account, debited by `push`.
    custody: AccountId,
    fail_mode: Mutex<Option<MockLedgerFailure>>,
}

/// In-memory fungible ledger. Clones share state, so a harness and the
/// market under test observe the same balances.
#[derive(Debug, Clone)]
pub struct MockLedger {
    inner: Arc<LedgerInner>,
}

impl MockLedger {
    pub fn new(custody: AccountId) -> Self {
        Self {
            inner: Arc::new(LedgerInner {
                balances: Mutex::new(HashMap::new()),
                allowances: Mutex::new(HashMap::new()),
                custody,
                fail_mode: Mutex::new(None),
            }),
        }
    }

    /// Credit an account out of thin air (test setup only).
    pub fn mint(&self, account: AccountId, currency: CurrencyId, amount: Amount) {
        *self
            .inner
            .balances
            .lock()
            .entry((account, currency))
            .or_insert(0) += amount;
    }

    /// Grant `spender` an allowance over the owner's funds.
    /// `Amount::MAX` behaves as unlimited.
    pub fn approve(
        &self,
        owner: AccountId,
        spender: AccountId,
        currency: CurrencyId,
        amount: Amount,
    ) {
        self.inner
            .allowances
            .lock()
            .insert((owner, spender, currency), amount);
    }

    /// Synchronous balance lookup for test assertions.
    pub fn balance(&self, account: AccountId, currency: CurrencyId) -> Amount {
        self.inner
            .balances
            .lock()
            .get(&(account, currency))
            .copied()
            .unwrap_or(0)
    }

    /// Total supply across all accounts in one currency, for
    /// conservation assertions.
    pub fn total_supply(&self, currency: CurrencyId) -> Amount {
        self.inner
            .balances
            .lock()
            .iter()
            .filter(|((_, c), _)| *c == currency)
            .map(|(_, amount)| amount)
            .sum()
    }

    /// Inject or clear a failure mode.
    pub fn set_fail_mode(&self, mode: Option<MockLedgerFailure>) {
        *self.inner.fail_mode.lock() = mode;
    }

    fn check_fail(&self, op_is_pull: bool) -> MarketResult<()> {
        match *self.inner.fail_mode.lock() {
            Some(MockLedgerFailure::All) => Err(MarketError::Other(anyhow::anyhow!(
                "simulated ledger failure"
            ))),
            Some(MockLedgerFailure::Pulls) if op_is_pull => Err(MarketError::Other(
                anyhow::anyhow!("simulated ledger pull failure"),
            )),
            Some(MockLedgerFailure::Pushes) if !op_is_pull => Err(MarketError::Other(
                anyhow::anyhow!("simulated ledger push failure"),
            )),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl FungibleLedger for MockLedger {
    async fn balance_of(
        &self,
        account: AccountId,
        currency: CurrencyId,
    ) -> MarketResult<Amount> {
        Ok(self.balance(account, currency))
    }

    async fn allowance_of(
        &self,
        owner: AccountId,
        spender: AccountId,
        currency: CurrencyId,
    ) -> MarketResult<Amount> {
        Ok(self
            .inner
            .allowances
            .lock()
            .get(&(owner, spender, currency))
            .copied()
            .unwrap_or(0))
    }

    async fn pull(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Amount,
        currency: CurrencyId,
    ) -> MarketResult<()> {
        self.check_fail(true)?;

        let mut allowances = self.inner.allowances.lock();
        let allowance = allowances.get(&(from, to, currency)).copied().unwrap_or(0);
        if allowance < amount {
            return Err(MarketError::NotApproved(format!(
                "allowance {allowance} below pull of {amount}"
            )));
        }

        let mut balances = self.inner.balances.lock();
        let from_balance = balances.get(&(from, currency)).copied().unwrap_or(0);
        if from_balance < amount {
            return Err(MarketError::InsufficientFunds(format!(
                "account {from} holds {from_balance}, needs {amount}"
            )));
        }

        if allowance != Amount::MAX {
            allowances.insert((from, to, currency), allowance - amount);
        }
        balances.insert((from, currency), from_balance - amount);
        *balances.entry((to, currency)).or_insert(0) += amount;
        Ok(())
    }

    async fn push(
        &self,
        to: AccountId,
        amount: Amount,
        currency: CurrencyId,
    ) -> MarketResult<()> {
        self.check_fail(false)?;

        let mut balances = self.inner.balances.lock();
        let custody = self.inner.custody;
        let custody_balance = balances.get(&(custody, currency)).copied().unwrap_or(0);
        if custody_balance < amount {
            return Err(MarketError::InsufficientFunds(format!(
                "custody holds {custody_balance}, needs {amount}"
            )));
        }
        balances.insert((custody, currency), custody_balance - amount);
        *balances.entry((to, currency)).or_insert(0) += amount;
        Ok(())
    }
}
