//! Journal entries for ASC 842 lease accounting.
//!
//! Produces the initial-recognition entries at commencement and one entry per
//! amortization row. GL account identifiers come from a caller-supplied
//! [`AccountMapping`]; a role with no account mapped still produces its line,
//! left unposted (`account: None`), so GL wiring stays a caller concern.
//!
//! Every entry returned here balances to the cent. Lines with a zero amount
//! are dropped and lines with a negative amount move to the opposite side.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LeaseEngineError;
use crate::types::{round_money, Money};
use crate::LeaseEngineResult;

use super::amortization::AmortizationRow;
use super::payment_schedule::{PaymentScheduleEntry, PaymentType};
use super::present_value::calculate_lease_liability;
use super::terms::{LeaseClassification, LeaseTerms, Period};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// What a journal line represents, independent of the GL account it posts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountRole {
    RouAsset,
    LeaseLiability,
    LeaseExpense,
    InterestExpense,
    AmortizationExpense,
    CamOpexExpense,
    Asc842Adjustment,
    CashAp,
}

/// GL account identifiers per role. Any of them may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountMapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rou_asset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lease_liability: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lease_expense: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_expense: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amortization_expense: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cam_opex_expense: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asc842_adjustment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cash_ap: Option<String>,
}

impl AccountMapping {
    pub fn account_for(&self, role: AccountRole) -> Option<&str> {
        let account = match role {
            AccountRole::RouAsset => &self.rou_asset,
            AccountRole::LeaseLiability => &self.lease_liability,
            AccountRole::LeaseExpense => &self.lease_expense,
            AccountRole::InterestExpense => &self.interest_expense,
            AccountRole::AmortizationExpense => &self.amortization_expense,
            AccountRole::CamOpexExpense => &self.cam_opex_expense,
            AccountRole::Asc842Adjustment => &self.asc842_adjustment,
            AccountRole::CashAp => &self.cash_ap,
        };
        account.as_deref()
    }
}

/// One side of a journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLine {
    pub account_role: AccountRole,
    /// `None` when no GL account is mapped for the role
    pub account: Option<String>,
    pub amount: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub date: NaiveDate,
    pub description: String,
    pub debits: Vec<JournalLine>,
    pub credits: Vec<JournalLine>,
}

impl JournalEntry {
    pub fn total_debits(&self) -> Money {
        self.debits.iter().map(|l| l.amount).sum()
    }

    pub fn total_credits(&self) -> Money {
        self.credits.iter().map(|l| l.amount).sum()
    }

    pub fn is_balanced(&self) -> bool {
        self.total_debits() == self.total_credits()
    }

    /// Lines with no GL account assigned.
    pub fn unposted_lines(&self) -> impl Iterator<Item = &JournalLine> {
        self.debits
            .iter()
            .chain(self.credits.iter())
            .filter(|l| l.account.is_none())
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

struct EntryBuilder<'a> {
    mapping: &'a AccountMapping,
    entry: JournalEntry,
}

impl<'a> EntryBuilder<'a> {
    fn new(mapping: &'a AccountMapping, date: NaiveDate, description: String) -> Self {
        Self {
            mapping,
            entry: JournalEntry {
                date,
                description,
                debits: Vec::new(),
                credits: Vec::new(),
            },
        }
    }

    fn line(&self, role: AccountRole, amount: Money, memo: Option<&str>) -> JournalLine {
        JournalLine {
            account_role: role,
            account: self.mapping.account_for(role).map(str::to_string),
            amount,
            memo: memo.map(str::to_string),
        }
    }

    fn debit(mut self, role: AccountRole, amount: Money) -> Self {
        self.post(role, round_money(amount), None);
        self
    }

    fn credit(mut self, role: AccountRole, amount: Money) -> Self {
        self.post(role, -round_money(amount), None);
        self
    }

    fn debit_with_memo(mut self, role: AccountRole, amount: Money, memo: &str) -> Self {
        self.post(role, round_money(amount), Some(memo));
        self
    }

    /// Positive amounts are debits, negative amounts credits.
    fn post(&mut self, role: AccountRole, signed: Money, memo: Option<&str>) {
        if signed > Decimal::ZERO {
            let line = self.line(role, signed, memo);
            self.entry.debits.push(line);
        } else if signed < Decimal::ZERO {
            let line = self.line(role, -signed, memo);
            self.entry.credits.push(line);
        }
    }

    fn build(self) -> LeaseEngineResult<JournalEntry> {
        validate_journal_entry(&self.entry)?;
        Ok(self.entry)
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Check that debits equal credits to the cent.
pub fn validate_journal_entry(entry: &JournalEntry) -> LeaseEngineResult<()> {
    let debits = entry.total_debits();
    let credits = entry.total_credits();
    if debits != credits {
        return Err(LeaseEngineError::UnbalancedEntry {
            description: entry.description.clone(),
            debits,
            credits,
        });
    }
    Ok(())
}

/// Initial recognition entries, dated at commencement.
///
/// 1. Dr ROU Asset / Cr Lease Liability for the initial liability
/// 2. Dr ROU Asset / Cr Cash/AP for initial direct costs
/// 3. Dr ROU Asset / Cr ASC 842 Adjustment reclassifying prepaid rent
/// 4. Dr Cash/AP / Cr ROU Asset for lease incentives received
///
/// Entries with a zero amount are omitted. Empty when the liability cannot
/// be measured (missing discount rate or term).
pub fn generate_initial_journal_entries(
    terms: &LeaseTerms,
    mapping: &AccountMapping,
) -> LeaseEngineResult<Vec<JournalEntry>> {
    match calculate_lease_liability(terms) {
        Some(liability) => initial_entries_for_liability(terms, liability, mapping),
        None => Ok(Vec::new()),
    }
}

/// Initial recognition entries for an already-measured liability, e.g. one
/// measured against an escalated payment stream.
pub fn initial_entries_for_liability(
    terms: &LeaseTerms,
    liability: Money,
    mapping: &AccountMapping,
) -> LeaseEngineResult<Vec<JournalEntry>> {
    let date = terms.commencement_date;
    let mut entries = Vec::with_capacity(4);

    let recognition = [
        (
            liability,
            "Initial recognition of ROU asset and lease liability",
            AccountRole::LeaseLiability,
        ),
        (
            terms.initial_direct_costs,
            "Initial direct costs capitalized to ROU asset",
            AccountRole::CashAp,
        ),
        (
            terms.prepaid_rent,
            "Prepaid rent reclassified to ROU asset",
            AccountRole::Asc842Adjustment,
        ),
    ];
    for (amount, description, offset) in recognition {
        if amount.is_zero() {
            continue;
        }
        entries.push(
            EntryBuilder::new(mapping, date, description.to_string())
                .debit(AccountRole::RouAsset, amount)
                .credit(offset, amount)
                .build()?,
        );
    }

    if !terms.lease_incentives_received.is_zero() {
        entries.push(
            EntryBuilder::new(
                mapping,
                date,
                "Lease incentives received reduce ROU asset".to_string(),
            )
            .debit(AccountRole::CashAp, terms.lease_incentives_received)
            .credit(AccountRole::RouAsset, terms.lease_incentives_received)
            .build()?,
        );
    }

    Ok(entries)
}

/// Monthly entry for one amortization row.
///
/// Operating: Dr Lease Expense (straight-line), Dr Lease Liability (principal
/// reduction), Cr ROU Asset (amortization plug), Cr Cash/AP (payment).
///
/// Finance: Dr Interest Expense, Dr Amortization Expense, Dr Lease Liability
/// (principal reduction), Cr ROU Asset (amortization), Cr Cash/AP (payment).
pub fn generate_monthly_journal_entry(
    row: &AmortizationRow,
    classification: LeaseClassification,
    mapping: &AccountMapping,
) -> LeaseEngineResult<JournalEntry> {
    let period = Period::new(row.period_year, row.period_month)?;
    let date = period.first_day()?;

    let builder = match classification {
        LeaseClassification::Operating => EntryBuilder::new(
            mapping,
            date,
            format!("Operating lease cost - period {} ({period})", row.period),
        )
        .debit(AccountRole::LeaseExpense, row.total_expense)
        .debit(AccountRole::LeaseLiability, row.principal_reduction)
        .credit(AccountRole::RouAsset, row.amortization_expense)
        .credit(AccountRole::CashAp, row.lease_payment),
        LeaseClassification::Finance => EntryBuilder::new(
            mapping,
            date,
            format!("Finance lease cost - period {} ({period})", row.period),
        )
        .debit(AccountRole::InterestExpense, row.interest_expense)
        .debit(AccountRole::AmortizationExpense, row.amortization_expense)
        .debit(AccountRole::LeaseLiability, row.principal_reduction)
        .credit(AccountRole::RouAsset, row.amortization_expense)
        .credit(AccountRole::CashAp, row.lease_payment),
    };
    builder.build()
}

/// Monthly entries for a whole schedule, in period order.
pub fn generate_monthly_journal_entries(
    rows: &[AmortizationRow],
    classification: LeaseClassification,
    mapping: &AccountMapping,
) -> LeaseEngineResult<Vec<JournalEntry>> {
    rows.iter()
        .map(|row| generate_monthly_journal_entry(row, classification, mapping))
        .collect()
}

/// Entry for the non-lease components (CAM, property tax, insurance,
/// utilities, other) scheduled in one period: Dr CAM/OpEx Expense per
/// category, Cr Cash/AP. `None` when nothing non-lease is due that month.
pub fn generate_operating_cost_entry(
    period_year: i32,
    period_month: u32,
    entries: &[PaymentScheduleEntry],
    mapping: &AccountMapping,
) -> LeaseEngineResult<Option<JournalEntry>> {
    let period = Period::new(period_year, period_month)?;
    let costs: Vec<(PaymentType, Money)> = entries
        .iter()
        .filter(|e| e.period() == period && !e.payment_type.is_lease_component())
        .filter(|e| !e.scheduled_amount.is_zero())
        .map(|e| (e.payment_type, e.scheduled_amount))
        .collect();
    if costs.is_empty() {
        return Ok(None);
    }

    let total: Money = costs.iter().map(|(_, amount)| *amount).sum();
    let mut builder = EntryBuilder::new(
        mapping,
        period.first_day()?,
        format!("Lease operating costs ({period})"),
    );
    for (payment_type, amount) in costs {
        builder = builder.debit_with_memo(AccountRole::CamOpexExpense, amount, payment_type.label());
    }
    builder.credit(AccountRole::CashAp, total).build().map(Some)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lease_accounting::amortization::generate_asc842_schedule;
    use crate::lease_accounting::payment_schedule::generate_payment_schedule;
    use crate::lease_accounting::terms::PropertyTaxFrequency;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn office_lease() -> LeaseTerms {
        LeaseTerms {
            commencement_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            rent_commencement_date: None,
            expiration_date: NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
            lease_term_months: 36,
            base_rent_monthly: dec!(10000),
            cam_monthly: Decimal::ZERO,
            insurance_monthly: Decimal::ZERO,
            property_tax_annual: Decimal::ZERO,
            property_tax_frequency: PropertyTaxFrequency::Monthly,
            utilities_monthly: Decimal::ZERO,
            other_monthly_costs: Decimal::ZERO,
            rent_abatement_months: 0,
            rent_abatement_amount: Decimal::ZERO,
            discount_rate: dec!(0.06),
            initial_direct_costs: Decimal::ZERO,
            lease_incentives_received: Decimal::ZERO,
            prepaid_rent: Decimal::ZERO,
            classification: LeaseClassification::Operating,
        }
    }

    fn full_mapping() -> AccountMapping {
        AccountMapping {
            rou_asset: Some("1800".into()),
            lease_liability: Some("2600".into()),
            lease_expense: Some("6100".into()),
            interest_expense: Some("7100".into()),
            amortization_expense: Some("6150".into()),
            cam_opex_expense: Some("6120".into()),
            asc842_adjustment: Some("1850".into()),
            cash_ap: Some("2000".into()),
        }
    }

    fn sum_role(entries: &[JournalEntry], role: AccountRole) -> Money {
        entries
            .iter()
            .map(|e| {
                let dr: Money = e.debits.iter().filter(|l| l.account_role == role).map(|l| l.amount).sum();
                let cr: Money = e.credits.iter().filter(|l| l.account_role == role).map(|l| l.amount).sum();
                dr - cr
            })
            .sum()
    }

    #[test]
    fn test_initial_entry_simple_lease() {
        let entries = generate_initial_journal_entries(&office_lease(), &full_mapping()).unwrap();
        assert_eq!(entries.len(), 1);
        let e = &entries[0];
        assert_eq!(e.date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(
            e.debits,
            vec![JournalLine {
                account_role: AccountRole::RouAsset,
                account: Some("1800".into()),
                amount: dec!(328710.16),
                memo: None,
            }]
        );
        assert_eq!(e.credits[0].account_role, AccountRole::LeaseLiability);
        assert_eq!(e.credits[0].account.as_deref(), Some("2600"));
        assert!(e.is_balanced());
    }

    #[test]
    fn test_initial_entries_net_rou_to_initial_asset() {
        let mut terms = office_lease();
        terms.initial_direct_costs = dec!(4500);
        terms.prepaid_rent = dec!(10000);
        terms.lease_incentives_received = dec!(25000);
        let entries = generate_initial_journal_entries(&terms, &full_mapping()).unwrap();
        assert_eq!(entries.len(), 4);
        assert!(entries.iter().all(JournalEntry::is_balanced));
        assert_eq!(
            sum_role(&entries, AccountRole::RouAsset),
            dec!(328710.16) + dec!(4500) + dec!(10000) - dec!(25000)
        );
        assert_eq!(sum_role(&entries, AccountRole::CashAp), dec!(25000) - dec!(4500));
        assert_eq!(sum_role(&entries, AccountRole::Asc842Adjustment), dec!(-10000));
    }

    #[test]
    fn test_initial_entries_empty_without_rate() {
        let mut terms = office_lease();
        terms.discount_rate = Decimal::ZERO;
        assert!(generate_initial_journal_entries(&terms, &full_mapping())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_missing_mapping_leaves_lines_unposted() {
        let mapping = AccountMapping {
            rou_asset: Some("1800".into()),
            ..AccountMapping::default()
        };
        let entries = generate_initial_journal_entries(&office_lease(), &mapping).unwrap();
        let unposted: Vec<&JournalLine> = entries[0].unposted_lines().collect();
        assert_eq!(unposted.len(), 1);
        assert_eq!(unposted[0].account_role, AccountRole::LeaseLiability);
        assert!(entries[0].is_balanced());
    }

    #[test]
    fn test_operating_monthly_entries_balance() {
        let terms = office_lease();
        let schedule = generate_asc842_schedule(&terms, None).unwrap();
        let entries = generate_monthly_journal_entries(
            &schedule.schedule,
            LeaseClassification::Operating,
            &full_mapping(),
        )
        .unwrap();
        assert_eq!(entries.len(), 36);
        for entry in &entries {
            assert!(entry.is_balanced(), "unbalanced: {}", entry.description);
            let expense = entry
                .debits
                .iter()
                .find(|l| l.account_role == AccountRole::LeaseExpense)
                .unwrap();
            assert_eq!(expense.amount, dec!(10000));
        }
        // Over the term the ROU and liability are fully relieved
        assert_eq!(
            sum_role(&entries, AccountRole::RouAsset),
            -schedule.summary.initial_rou_asset
        );
        assert_eq!(
            sum_role(&entries, AccountRole::LeaseLiability),
            schedule.summary.initial_lease_liability
        );
    }

    #[test]
    fn test_finance_monthly_entry_lines() {
        let mut terms = office_lease();
        terms.classification = LeaseClassification::Finance;
        let schedule = generate_asc842_schedule(&terms, None).unwrap();
        let row = &schedule.schedule[0];
        let entry =
            generate_monthly_journal_entry(row, LeaseClassification::Finance, &full_mapping())
                .unwrap();
        let roles: Vec<AccountRole> = entry.debits.iter().map(|l| l.account_role).collect();
        assert_eq!(
            roles,
            vec![
                AccountRole::InterestExpense,
                AccountRole::AmortizationExpense,
                AccountRole::LeaseLiability,
            ]
        );
        assert_eq!(entry.debits[0].amount, row.interest_expense);
        assert_eq!(entry.debits[2].amount, row.principal_reduction);
        assert!(entry.is_balanced());
        assert_eq!(entry.date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[test]
    fn test_negative_principal_credits_liability() {
        let terms = office_lease();
        let mut stream = vec![Decimal::ZERO; 3];
        stream.extend(vec![dec!(10000); 33]);
        let schedule = generate_asc842_schedule(&terms, Some(&stream)).unwrap();
        let entry = generate_monthly_journal_entry(
            &schedule.schedule[0],
            LeaseClassification::Operating,
            &full_mapping(),
        )
        .unwrap();
        // No cash during free rent: liability accretes, no cash line
        assert!(entry.credits.iter().any(|l| l.account_role == AccountRole::LeaseLiability));
        assert!(!entry.credits.iter().any(|l| l.account_role == AccountRole::CashAp));
        assert!(entry.is_balanced());
    }

    #[test]
    fn test_invalid_row_period_is_an_error() {
        let schedule = generate_asc842_schedule(&office_lease(), None).unwrap();
        let mut row = schedule.schedule[0].clone();
        row.period_month = 13;
        assert!(matches!(
            generate_monthly_journal_entry(&row, LeaseClassification::Operating, &full_mapping()),
            Err(LeaseEngineError::DateError(_))
        ));
    }

    #[test]
    fn test_validate_rejects_unbalanced() {
        let entry = JournalEntry {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            description: "bad".into(),
            debits: vec![JournalLine {
                account_role: AccountRole::LeaseExpense,
                account: None,
                amount: dec!(100.00),
                memo: None,
            }],
            credits: vec![JournalLine {
                account_role: AccountRole::CashAp,
                account: None,
                amount: dec!(99.99),
                memo: None,
            }],
        };
        assert!(matches!(
            validate_journal_entry(&entry),
            Err(LeaseEngineError::UnbalancedEntry { .. })
        ));
    }

    #[test]
    fn test_operating_cost_entry() {
        let mut terms = office_lease();
        terms.cam_monthly = dec!(1200);
        terms.insurance_monthly = dec!(300);
        terms.property_tax_annual = dec!(6000);
        let schedule = generate_payment_schedule(&terms, &[]).unwrap();
        let entry = generate_operating_cost_entry(2024, 2, &schedule, &full_mapping())
            .unwrap()
            .unwrap();
        assert_eq!(entry.debits.len(), 3);
        assert_eq!(entry.debits[0].memo.as_deref(), Some("cam"));
        assert_eq!(entry.total_credits(), dec!(2000));
        assert!(entry.is_balanced());
    }

    #[test]
    fn test_operating_cost_entry_none_when_only_rent() {
        let schedule = generate_payment_schedule(&office_lease(), &[]).unwrap();
        assert!(generate_operating_cost_entry(2024, 2, &schedule, &full_mapping())
            .unwrap()
            .is_none());
    }
}
