//! TreasuryReportHandler - query handler for the admin read model.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::domain::foundation::DomainError;
use crate::ports::{CategoryTotal, CollectionRate, LedgerTotals, TreasuryReader};

/// Query for the treasury report over a date range.
#[derive(Debug, Clone)]
pub struct TreasuryReportQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// Combined reporting view for the admin UI.
#[derive(Debug, Clone)]
pub struct TreasuryReport {
    pub collection: CollectionRate,
    pub totals: LedgerTotals,
    pub by_category: Vec<CategoryTotal>,
}

/// Handler producing the treasury report.
pub struct TreasuryReportHandler {
    reader: Arc<dyn TreasuryReader>,
}

impl TreasuryReportHandler {
    pub fn new(reader: Arc<dyn TreasuryReader>) -> Self {
        Self { reader }
    }

    pub async fn handle(&self, query: TreasuryReportQuery) -> Result<TreasuryReport, DomainError> {
        let collection = self.reader.collection_rate().await?;
        let totals = self.reader.ledger_totals(query.from, query.to).await?;
        let by_category = self
            .reader
            .ledger_totals_by_category(query.from, query.to)
            .await?;

        Ok(TreasuryReport {
            collection,
            totals,
            by_category,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Money;
    use async_trait::async_trait;

    struct MockTreasuryReader;

    #[async_trait]
    impl TreasuryReader for MockTreasuryReader {
        async fn collection_rate(&self) -> Result<CollectionRate, DomainError> {
            Ok(CollectionRate {
                eligible_members: 40,
                paying_members: 30,
            })
        }

        async fn ledger_totals(
            &self,
            _from: NaiveDate,
            _to: NaiveDate,
        ) -> Result<LedgerTotals, DomainError> {
            Ok(LedgerTotals {
                income: Money::from_cents(200_000),
                expense: Money::from_cents(50_000),
            })
        }

        async fn ledger_totals_by_category(
            &self,
            _from: NaiveDate,
            _to: NaiveDate,
        ) -> Result<Vec<CategoryTotal>, DomainError> {
            Ok(vec![CategoryTotal {
                category: "dues".to_string(),
                totals: LedgerTotals {
                    income: Money::from_cents(150_000),
                    expense: Money::ZERO,
                },
            }])
        }
    }

    #[tokio::test]
    async fn report_combines_collection_and_ledger_views() {
        let handler = TreasuryReportHandler::new(Arc::new(MockTreasuryReader));

        let report = handler
            .handle(TreasuryReportQuery {
                from: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                to: NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
            })
            .await
            .unwrap();

        assert_eq!(report.collection.pending_members(), 10);
        assert_eq!(report.totals.net(), Money::from_cents(150_000));
        assert_eq!(report.by_category.len(), 1);
    }
}
