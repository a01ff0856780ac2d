//! In-memory storage backed by `parking_lot` locks.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use capflow_core::types::{
    Cashflow, CashflowId, Investment, InvestmentId, Notification, NotificationId, UserId,
};

use crate::error::{StoreError, StoreResult};
use crate::filter::{CashflowFilter, InvestmentFilter, NotificationFilter};
use crate::traits::{CashflowStore, InvestmentStore, NotificationStore};

/// In-memory store implementing all three storage traits.
///
/// Listing returns records in a stable order (creation time, then due
/// date for cashflows), so callers never depend on hash-map iteration
/// order.
#[derive(Default)]
pub struct MemoryStore {
    investments: RwLock<HashMap<InvestmentId, Investment>>,
    cashflows: RwLock<HashMap<CashflowId, Cashflow>>,
    notifications: RwLock<HashMap<NotificationId, Notification>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl InvestmentStore for MemoryStore {
    fn create_investment(&self, mut investment: Investment) -> StoreResult<Investment> {
        investment.id = InvestmentId::fresh();
        self.investments
            .write()
            .insert(investment.id.clone(), investment.clone());
        log::debug!("created investment {}", investment.id);
        Ok(investment)
    }

    fn get_investment(&self, id: &InvestmentId) -> StoreResult<Option<Investment>> {
        Ok(self.investments.read().get(id).cloned())
    }

    fn put_investment(&self, investment: &Investment) -> StoreResult<()> {
        let mut map = self.investments.write();
        if !map.contains_key(&investment.id) {
            return Err(StoreError::not_found("investment", investment.id.as_str()));
        }
        map.insert(investment.id.clone(), investment.clone());
        Ok(())
    }

    fn delete_investment(&self, id: &InvestmentId) -> StoreResult<bool> {
        Ok(self.investments.write().remove(id).is_some())
    }

    fn list_investments(&self, filter: &InvestmentFilter) -> StoreResult<Vec<Investment>> {
        let mut items: Vec<Investment> = self
            .investments
            .read()
            .values()
            .filter(|inv| filter.matches(inv))
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.as_str().cmp(b.id.as_str()))
        });
        Ok(items)
    }
}

impl CashflowStore for MemoryStore {
    fn get_cashflow(&self, id: &CashflowId) -> StoreResult<Option<Cashflow>> {
        Ok(self.cashflows.read().get(id).cloned())
    }

    fn put_cashflow(&self, cashflow: &Cashflow) -> StoreResult<()> {
        let mut map = self.cashflows.write();
        if !map.contains_key(&cashflow.id) {
            return Err(StoreError::not_found("cashflow", cashflow.id.as_str()));
        }
        map.insert(cashflow.id.clone(), cashflow.clone());
        Ok(())
    }

    fn replace_for_investment(
        &self,
        investment_id: &InvestmentId,
        cashflows: Vec<Cashflow>,
    ) -> StoreResult<Vec<Cashflow>> {
        let mut map = self.cashflows.write();
        map.retain(|_, cf| &cf.investment_id != investment_id);

        let mut stored = Vec::with_capacity(cashflows.len());
        for mut cashflow in cashflows {
            cashflow.id = CashflowId::fresh();
            cashflow.investment_id = investment_id.clone();
            map.insert(cashflow.id.clone(), cashflow.clone());
            stored.push(cashflow);
        }
        log::debug!(
            "replaced cashflows of investment {investment_id} with {} records",
            stored.len()
        );
        Ok(stored)
    }

    fn delete_for_investment(&self, investment_id: &InvestmentId) -> StoreResult<u64> {
        let mut map = self.cashflows.write();
        let before = map.len();
        map.retain(|_, cf| &cf.investment_id != investment_id);
        Ok((before - map.len()) as u64)
    }

    fn list_cashflows(&self, filter: &CashflowFilter) -> StoreResult<Vec<Cashflow>> {
        let mut items: Vec<Cashflow> = self
            .cashflows
            .read()
            .values()
            .filter(|cf| filter.matches(cf))
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            a.effective_due_date()
                .cmp(&b.effective_due_date())
                .then_with(|| a.period_index.cmp(&b.period_index))
                .then_with(|| a.id.as_str().cmp(b.id.as_str()))
        });
        Ok(items)
    }
}

impl NotificationStore for MemoryStore {
    fn create_notifications(
        &self,
        notifications: Vec<Notification>,
    ) -> StoreResult<Vec<Notification>> {
        let mut map = self.notifications.write();
        let mut stored = Vec::with_capacity(notifications.len());
        for mut notification in notifications {
            notification.id = NotificationId::fresh();
            map.insert(notification.id.clone(), notification.clone());
            stored.push(notification);
        }
        Ok(stored)
    }

    fn get_notification(&self, id: &NotificationId) -> StoreResult<Option<Notification>> {
        Ok(self.notifications.read().get(id).cloned())
    }

    fn mark_read(&self, id: &NotificationId) -> StoreResult<()> {
        let mut map = self.notifications.write();
        match map.get_mut(id) {
            Some(notification) => {
                notification.read = true;
                Ok(())
            }
            None => Err(StoreError::not_found("notification", id.as_str())),
        }
    }

    fn delete_for_recipient(&self, recipient: &UserId) -> StoreResult<u64> {
        let mut map = self.notifications.write();
        let before = map.len();
        map.retain(|_, n| &n.recipient != recipient);
        Ok((before - map.len()) as u64)
    }

    fn purge_older_than(&self, cutoff: DateTime<Utc>) -> StoreResult<u64> {
        let mut map = self.notifications.write();
        let before = map.len();
        map.retain(|_, n| n.created_at >= cutoff);
        Ok((before - map.len()) as u64)
    }

    fn list_notifications(&self, filter: &NotificationFilter) -> StoreResult<Vec<Notification>> {
        let mut items: Vec<Notification> = self
            .notifications
            .read()
            .values()
            .filter(|n| filter.matches(n))
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.as_str().cmp(b.id.as_str()))
        });
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capflow_core::types::{
        CashflowStatus, CashflowType, CompanyId, Date, FinancingType, InvestmentStatus,
        MonthBucket, NotificationKind, NotificationPriority,
    };
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn draft(name: &str) -> Investment {
        Investment::new_draft(
            CompanyId::new("co-1"),
            name,
            "IT",
            dec!(5_000),
            FinancingType::SinglePayment,
            UserId::new("u-1"),
            Utc::now(),
        )
    }

    fn flow(due: &str) -> Cashflow {
        let due = Date::parse(due).unwrap();
        Cashflow {
            id: CashflowId::new(""),
            investment_id: InvestmentId::new(""),
            due_date: due,
            custom_due_date: None,
            amount: dec!(500),
            flow_type: CashflowType::Installment,
            period_index: None,
            period_count: None,
            bucket: MonthBucket::from(due),
            status: CashflowStatus::Planned,
            manager_confirmation: None,
            executive_confirmation: None,
            postponement: None,
            auto_confirmed: false,
        }
    }

    #[test]
    fn test_create_assigns_id() {
        let store = MemoryStore::new();
        let stored = store.create_investment(draft("Laptops")).unwrap();
        assert!(!stored.id.as_str().is_empty());
        assert_eq!(store.get_investment(&stored.id).unwrap(), Some(stored));
    }

    #[test]
    fn test_put_requires_existing_record() {
        let store = MemoryStore::new();
        let mut ghost = draft("Ghost");
        ghost.id = InvestmentId::new("missing");
        assert_eq!(
            store.put_investment(&ghost).unwrap_err(),
            StoreError::not_found("investment", "missing")
        );
    }

    #[test]
    fn test_list_filters_by_status() {
        let store = MemoryStore::new();
        let a = store.create_investment(draft("A")).unwrap();
        store.create_investment(draft("B")).unwrap();

        let mut submitted = a.clone();
        submitted.status = InvestmentStatus::Submitted;
        store.put_investment(&submitted).unwrap();

        let drafts = store
            .list_investments(&InvestmentFilter::by_status(InvestmentStatus::Draft))
            .unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].name, "B");
    }

    #[test]
    fn test_replace_for_investment_is_wholesale() {
        let store = MemoryStore::new();
        let inv = InvestmentId::new("inv-1");

        let first = store
            .replace_for_investment(&inv, vec![flow("2026-02-01"), flow("2026-03-01")])
            .unwrap();
        assert_eq!(first.len(), 2);

        let second = store
            .replace_for_investment(&inv, vec![flow("2026-04-01")])
            .unwrap();
        assert_eq!(second.len(), 1);

        let remaining = store
            .list_cashflows(&CashflowFilter::by_investment(inv))
            .unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].due_date, Date::parse("2026-04-01").unwrap());
        // Old ids are gone.
        assert_eq!(store.get_cashflow(&first[0].id).unwrap(), None);
    }

    #[test]
    fn test_cashflow_list_sorted_by_effective_due_date() {
        let store = MemoryStore::new();
        let inv = InvestmentId::new("inv-1");
        let stored = store
            .replace_for_investment(&inv, vec![flow("2026-03-01"), flow("2026-02-01")])
            .unwrap();

        let mut early = stored
            .iter()
            .find(|cf| cf.due_date == Date::parse("2026-03-01").unwrap())
            .unwrap()
            .clone();
        early.custom_due_date = Some(Date::parse("2026-01-15").unwrap());
        store.put_cashflow(&early).unwrap();

        let listed = store
            .list_cashflows(&CashflowFilter::by_investment(inv))
            .unwrap();
        assert_eq!(
            listed[0].effective_due_date(),
            Date::parse("2026-01-15").unwrap()
        );
    }

    #[test]
    fn test_notification_mark_read_and_purge() {
        let store = MemoryStore::new();
        let old = Utc.with_ymd_and_hms(2026, 1, 1, 8, 0, 0).unwrap();
        let recent = Utc.with_ymd_and_hms(2026, 6, 1, 8, 0, 0).unwrap();
        let stored = store
            .create_notifications(vec![
                Notification::new(
                    UserId::new("u-1"),
                    NotificationKind::PaymentDueSoon,
                    "t",
                    "b",
                    NotificationPriority::Normal,
                    None,
                    old,
                ),
                Notification::new(
                    UserId::new("u-1"),
                    NotificationKind::PaymentOverdue,
                    "t",
                    "b",
                    NotificationPriority::High,
                    None,
                    recent,
                ),
            ])
            .unwrap();

        store.mark_read(&stored[0].id).unwrap();
        let unread = store
            .list_notifications(&NotificationFilter::unread_for(UserId::new("u-1")))
            .unwrap();
        assert_eq!(unread.len(), 1);

        let purged = store
            .purge_older_than(Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap())
            .unwrap();
        assert_eq!(purged, 1);
        let all = store
            .list_notifications(&NotificationFilter::by_recipient(UserId::new("u-1")))
            .unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].kind, NotificationKind::PaymentOverdue);
    }
}
