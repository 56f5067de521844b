//! Credit Ledger Use Cases
//!
//! Reads apply lazy expiry first, so an earn past its lifetime never shows
//! up as spendable even if no sweep has run.

use std::sync::Arc;

use chrono::Utc;

use crate::application::config::ExchangeConfig;
use crate::domain::entity::{BalanceSummary, CreditTransaction, ExpirySweep};
use crate::domain::repository::LedgerRepository;
use crate::domain::value_object::{Page, UserId};
use crate::error::ExchangeResult;

/// Per-user ledger views
pub struct CreditLedgerUseCase<R>
where
    R: LedgerRepository,
{
    repo: Arc<R>,
    config: Arc<ExchangeConfig>,
}

impl<R> CreditLedgerUseCase<R>
where
    R: LedgerRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<ExchangeConfig>) -> Self {
        Self { repo, config }
    }

    /// Balance with its earned/spent/expiring breakdown
    pub async fn balance(&self, user_id: &UserId) -> ExchangeResult<BalanceSummary> {
        let now = Utc::now();
        self.repo
            .open_account(user_id, &self.config.credits, now)
            .await?;

        self.repo
            .credit_summary(user_id, now, self.config.expiring_soon_until(now))
            .await
    }

    /// Earns that lapse within the configured window
    pub async fn expiring(&self, user_id: &UserId) -> ExchangeResult<Vec<CreditTransaction>> {
        let now = Utc::now();
        self.repo
            .open_account(user_id, &self.config.credits, now)
            .await?;

        self.repo
            .expiring_credits(user_id, now, self.config.expiring_soon_until(now))
            .await
    }

    /// Full ledger, newest first
    pub async fn history(
        &self,
        user_id: &UserId,
        page: &Page,
    ) -> ExchangeResult<(Vec<CreditTransaction>, i64)> {
        let now = Utc::now();
        self.repo
            .open_account(user_id, &self.config.credits, now)
            .await?;

        self.repo.credit_history(user_id, page).await
    }
}

/// Global expiry sweep (startup and `POST /api/credits/expire`)
pub struct ExpireCreditsUseCase<R>
where
    R: LedgerRepository,
{
    repo: Arc<R>,
}

impl<R> ExpireCreditsUseCase<R>
where
    R: LedgerRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self) -> ExchangeResult<ExpirySweep> {
        let sweep = self.repo.expire_all_credits(Utc::now()).await?;

        tracing::info!(
            transactions = sweep.transactions,
            users = sweep.users,
            "Expired credits"
        );

        Ok(sweep)
    }
}
