//! Generation credits.
//!
//! A single in-memory ledger with a daily and a monthly allowance. Counters
//! roll over when the UTC date (daily) or UTC month (monthly) changes.
//!
//! A request takes a [`CreditReservation`] before calling a provider. The
//! credit is counted from that moment, so concurrent requests cannot overrun
//! the allowance. Dropping the reservation without [`CreditReservation::commit`]
//! hands the credit back.

use std::sync::Mutex;

use chrono::{Datelike, NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::config::CreditsConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreditError {
    #[error("Daily credit limit reached. Please upgrade your plan or wait until tomorrow.")]
    DailyLimit,
    #[error("Monthly credit limit reached. Please upgrade your plan.")]
    MonthlyLimit,
}

/// Snapshot of the ledger for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditBalance {
    pub daily: u32,
    pub monthly: u32,
    pub daily_limit: u32,
    pub monthly_limit: u32,
}

#[derive(Debug)]
struct Usage {
    day: NaiveDate,
    daily: u32,
    monthly: u32,
}

impl Usage {
    fn roll_to(&mut self, today: NaiveDate) {
        if (today.year(), today.month()) != (self.day.year(), self.day.month()) {
            debug!(%today, "credit month rolled over");
            self.monthly = 0;
            self.daily = 0;
        } else if today != self.day {
            debug!(%today, "credit day rolled over");
            self.daily = 0;
        }
        self.day = today;
    }
}

#[derive(Debug)]
pub struct CreditLedger {
    daily_limit: u32,
    monthly_limit: u32,
    usage: Mutex<Usage>,
}

impl CreditLedger {
    pub fn new(daily_limit: u32, monthly_limit: u32) -> Self {
        Self::starting_on(daily_limit, monthly_limit, today())
    }

    pub fn from_config(cfg: &CreditsConfig) -> Self {
        Self::new(cfg.daily_limit, cfg.monthly_limit)
    }

    fn starting_on(daily_limit: u32, monthly_limit: u32, day: NaiveDate) -> Self {
        Self {
            daily_limit,
            monthly_limit,
            usage: Mutex::new(Usage { day, daily: 0, monthly: 0 }),
        }
    }

    pub fn balance(&self) -> CreditBalance {
        self.balance_on(today())
    }

    /// Check and take one credit under a single lock.
    pub fn reserve(&self) -> Result<CreditReservation<'_>, CreditError> {
        self.reserve_on(1, today())
    }

    fn reserve_on(&self, credits: u32, day: NaiveDate) -> Result<CreditReservation<'_>, CreditError> {
        let mut usage = self.lock();
        usage.roll_to(day);
        if usage.daily.saturating_add(credits) > self.daily_limit {
            return Err(CreditError::DailyLimit);
        }
        if usage.monthly.saturating_add(credits) > self.monthly_limit {
            return Err(CreditError::MonthlyLimit);
        }
        usage.daily += credits;
        usage.monthly += credits;
        debug!(daily = usage.daily, monthly = usage.monthly, "credits reserved");
        Ok(CreditReservation { ledger: self, credits, day, committed: false })
    }

    /// Give back credits reserved on `day`. Counters that already rolled
    /// over past `day` are left alone.
    fn refund(&self, credits: u32, day: NaiveDate) {
        let mut usage = self.lock();
        if usage.day == day {
            usage.daily = usage.daily.saturating_sub(credits);
        }
        if (usage.day.year(), usage.day.month()) == (day.year(), day.month()) {
            usage.monthly = usage.monthly.saturating_sub(credits);
        }
        debug!(daily = usage.daily, monthly = usage.monthly, "credits refunded");
    }

    fn balance_on(&self, day: NaiveDate) -> CreditBalance {
        let mut usage = self.lock();
        usage.roll_to(day);
        CreditBalance {
            daily: usage.daily,
            monthly: usage.monthly,
            daily_limit: self.daily_limit,
            monthly_limit: self.monthly_limit,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Usage> {
        self.usage.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Credits held for one in-flight request.
#[derive(Debug)]
#[must_use = "dropping a reservation refunds it"]
pub struct CreditReservation<'a> {
    ledger: &'a CreditLedger,
    credits: u32,
    day: NaiveDate,
    committed: bool,
}

impl CreditReservation<'_> {
    /// Keep the credits. Call once the request succeeded.
    pub fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for CreditReservation<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.ledger.refund(self.credits, self.day);
        }
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn take(ledger: &CreditLedger, credits: u32, day: NaiveDate) {
        ledger.reserve_on(credits, day).unwrap().commit();
    }

    #[test]
    fn fresh_ledger_allows_generation() {
        let ledger = CreditLedger::new(10, 100);
        assert_eq!(ledger.balance().daily, 0);
        ledger.reserve().unwrap().commit();
        assert_eq!(ledger.balance().daily, 1);
    }

    #[test]
    fn daily_limit_blocks() {
        let day = date(2026, 3, 10);
        let ledger = CreditLedger::starting_on(2, 100, day);
        take(&ledger, 2, day);
        let err = ledger.reserve_on(1, day).unwrap_err();
        assert_eq!(err, CreditError::DailyLimit);
        assert!(err.to_string().starts_with("Daily credit limit reached."));
    }

    #[test]
    fn daily_counter_resets_next_day() {
        let day = date(2026, 3, 10);
        let ledger = CreditLedger::starting_on(1, 100, day);
        take(&ledger, 1, day);
        assert!(ledger.reserve_on(1, day).is_err());
        assert_eq!(ledger.balance_on(date(2026, 3, 11)).monthly, 1);
        assert!(ledger.reserve_on(1, date(2026, 3, 11)).is_ok());
    }

    #[test]
    fn monthly_limit_blocks_until_month_changes() {
        let ledger = CreditLedger::starting_on(10, 3, date(2026, 1, 30));
        take(&ledger, 2, date(2026, 1, 30));
        take(&ledger, 1, date(2026, 1, 31));
        assert_eq!(ledger.reserve_on(1, date(2026, 1, 31)).unwrap_err(), CreditError::MonthlyLimit);
        assert!(ledger.reserve_on(1, date(2026, 2, 1)).is_ok());
    }

    #[test]
    fn same_month_next_year_resets() {
        let ledger = CreditLedger::starting_on(10, 1, date(2025, 6, 1));
        take(&ledger, 1, date(2025, 6, 1));
        assert!(ledger.reserve_on(1, date(2026, 6, 1)).is_ok());
    }

    #[test]
    fn daily_checked_before_monthly() {
        let day = date(2026, 5, 5);
        let ledger = CreditLedger::starting_on(1, 1, day);
        take(&ledger, 1, day);
        assert_eq!(ledger.reserve_on(1, day).unwrap_err(), CreditError::DailyLimit);
    }

    #[test]
    fn second_reservation_is_refused_while_first_is_held() {
        let day = date(2026, 4, 2);
        let ledger = CreditLedger::starting_on(1, 100, day);
        let first = ledger.reserve_on(1, day).unwrap();
        assert_eq!(ledger.reserve_on(1, day).unwrap_err(), CreditError::DailyLimit);
        first.commit();
        assert_eq!(ledger.balance_on(day).daily, 1);
    }

    #[test]
    fn dropped_reservation_is_refunded() {
        let day = date(2026, 4, 2);
        let ledger = CreditLedger::starting_on(1, 100, day);
        drop(ledger.reserve_on(1, day).unwrap());
        assert_eq!(ledger.balance_on(day), CreditBalance { daily: 0, monthly: 0, daily_limit: 1, monthly_limit: 100 });
        assert!(ledger.reserve_on(1, day).is_ok());
    }

    #[test]
    fn refund_after_day_rollover_only_touches_monthly() {
        let ledger = CreditLedger::starting_on(5, 100, date(2026, 4, 2));
        let held = ledger.reserve_on(1, date(2026, 4, 2)).unwrap();
        ledger.reserve_on(1, date(2026, 4, 3)).unwrap().commit();
        drop(held);
        let balance = ledger.balance_on(date(2026, 4, 3));
        assert_eq!((balance.daily, balance.monthly), (1, 1));
    }

    #[test]
    fn concurrent_reservations_never_exceed_limit() {
        let ledger = std::sync::Arc::new(CreditLedger::new(3, 100));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ledger = ledger.clone();
                std::thread::spawn(move || match ledger.reserve() {
                    Ok(r) => {
                        r.commit();
                        true
                    }
                    Err(_) => false,
                })
            })
            .collect();
        let granted = handles.into_iter().map(|h| h.join().unwrap()).filter(|ok| *ok).count();
        assert_eq!(granted, 3);
        assert_eq!(ledger.balance().daily, 3);
    }
}
