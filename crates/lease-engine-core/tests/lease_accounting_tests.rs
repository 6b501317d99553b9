use chrono::NaiveDate;
use lease_engine_core::lease_accounting::{
    analyze_lease, base_rent_payment_stream, calculate_lease_liability, calculate_rou_asset,
    generate_asc842_schedule, generate_initial_journal_entries, generate_monthly_journal_entries,
    generate_operating_cost_entry, generate_payment_schedule, generate_payment_schedule_with,
    AccountMapping, EscalationFrequency, EscalationRecurrence, EscalationRule, EscalationType,
    LeaseAnalysisInput, LeaseClassification, LeaseTerms, PaymentType, PropertyTaxFrequency,
};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// 36-month office lease, 10,000/month at 6%, no incidentals.
fn office_lease() -> LeaseTerms {
    LeaseTerms {
        commencement_date: date(2024, 1, 1),
        rent_commencement_date: None,
        expiration_date: date(2026, 12, 31),
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

fn two_year_lease() -> LeaseTerms {
    LeaseTerms {
        expiration_date: date(2025, 12, 31),
        lease_term_months: 24,
        base_rent_monthly: dec!(1000),
        ..office_lease()
    }
}

fn annual_three_percent(effective: NaiveDate) -> EscalationRule {
    EscalationRule {
        escalation_type: EscalationType::FixedPercentage,
        effective_date: effective,
        percentage_increase: Some(dec!(0.03)),
        amount_increase: None,
        frequency: EscalationFrequency::Annual,
    }
}

fn loaded_mapping() -> AccountMapping {
    AccountMapping {
        rou_asset: Some("1610".into()),
        lease_liability: Some("2410".into()),
        lease_expense: Some("6100".into()),
        interest_expense: Some("7200".into()),
        amortization_expense: Some("6850".into()),
        cash_ap: Some("2000".into()),
        cam_opex_expense: Some("6150".into()),
        asc842_adjustment: Some("1990".into()),
    }
}

// ===========================================================================
// Concrete office lease
// ===========================================================================

#[test]
fn test_office_lease_liability_and_schedule() {
    let terms = office_lease();
    let liability = calculate_lease_liability(&terms).unwrap();
    // PV of 36 payments of 10,000 at 0.5% per month
    assert!(
        (liability - dec!(328671)).abs() < dec!(100),
        "Expected liability ~328,671, got {liability}"
    );
    assert_eq!(calculate_rou_asset(&terms), Some(liability));

    let schedule = generate_asc842_schedule(&terms, None).unwrap();
    assert_eq!(schedule.schedule.len(), 36);
    assert_eq!(schedule.summary.initial_lease_liability, liability);
    assert_eq!(
        schedule.summary.monthly_straight_line_expense,
        Some(dec!(10000))
    );
    assert_eq!(schedule.summary.total_lease_payments, dec!(360000));
}

#[test]
fn test_operating_expense_is_flat() {
    let schedule = generate_asc842_schedule(&office_lease(), None).unwrap();
    for row in &schedule.schedule {
        assert_eq!(row.total_expense, dec!(10000), "period {}", row.period);
    }
}

// ===========================================================================
// Roll-forward invariants
// ===========================================================================

#[test]
fn test_balance_and_termination_invariants() {
    let mut finance = office_lease();
    finance.classification = LeaseClassification::Finance;
    finance.initial_direct_costs = dec!(3333.33);
    finance.lease_incentives_received = dec!(1000);

    let mut operating = office_lease();
    operating.prepaid_rent = dec!(10000);
    operating.discount_rate = dec!(0.0725);

    for terms in [office_lease(), finance, operating] {
        let schedule = generate_asc842_schedule(&terms, None).unwrap();
        for row in &schedule.schedule {
            assert_eq!(
                row.lease_liability_beginning - row.principal_reduction,
                row.lease_liability_ending
            );
            assert_eq!(
                row.principal_reduction + row.interest_expense,
                row.lease_payment
            );
            assert_eq!(
                row.rou_asset_beginning - row.amortization_expense,
                row.rou_asset_ending
            );
        }
        let last = schedule.schedule.last().unwrap();
        assert_eq!(last.lease_liability_ending, Decimal::ZERO);
        assert_eq!(last.rou_asset_ending, Decimal::ZERO);
    }
}

#[test]
fn test_finance_expense_is_front_loaded() {
    let mut terms = office_lease();
    terms.classification = LeaseClassification::Finance;
    let schedule = generate_asc842_schedule(&terms, None).unwrap();
    let first = &schedule.schedule[0];
    let last = &schedule.schedule[35];
    assert!(first.total_expense > last.total_expense);
    assert_eq!(schedule.summary.monthly_straight_line_expense, None);
    assert_eq!(
        first.total_expense,
        first.interest_expense + first.amortization_expense
    );
}

#[test]
fn test_missing_rate_yields_no_schedule() {
    let mut terms = office_lease();
    terms.discount_rate = Decimal::ZERO;
    assert!(calculate_lease_liability(&terms).is_none());
    assert!(generate_asc842_schedule(&terms, None).is_none());
    assert!(generate_initial_journal_entries(&terms, &AccountMapping::default())
        .unwrap()
        .is_empty());
}

#[test]
fn test_very_long_term_liability_is_finite() {
    let terms = LeaseTerms {
        lease_term_months: 20000,
        ..office_lease()
    };
    let liability = calculate_lease_liability(&terms).unwrap();
    // approaches the perpetuity value 10,000 / 0.005
    assert_eq!(liability, dec!(2000000));
}

// ===========================================================================
// Payment schedule
// ===========================================================================

#[test]
fn test_escalation_at_month_13() {
    let terms = two_year_lease();
    let rules = vec![annual_three_percent(date(2025, 1, 1))];
    let entries = generate_payment_schedule(&terms, &rules).unwrap();
    let stream = base_rent_payment_stream(&entries, &terms);
    assert_eq!(stream.len(), 24);
    assert!(stream[..12].iter().all(|p| *p == dec!(1000)));
    assert!(stream[12..].iter().all(|p| *p == dec!(1030)));
}

#[test]
fn test_single_step_recurrence_ignores_frequency() {
    let terms = LeaseTerms {
        expiration_date: date(2026, 12, 31),
        lease_term_months: 36,
        ..two_year_lease()
    };
    let rules = vec![annual_three_percent(date(2025, 1, 1))];

    let repeating = generate_payment_schedule(&terms, &rules).unwrap();
    let single =
        generate_payment_schedule_with(&terms, &rules, EscalationRecurrence::SingleStep).unwrap();

    let repeating = base_rent_payment_stream(&repeating, &terms);
    let single = base_rent_payment_stream(&single, &terms);
    assert_eq!(repeating[35], dec!(1060.90));
    assert_eq!(single[35], dec!(1030));
}

#[test]
fn test_abatement_keeps_operating_costs() {
    let terms = LeaseTerms {
        base_rent_monthly: dec!(5000),
        cam_monthly: dec!(800),
        insurance_monthly: dec!(150),
        rent_abatement_months: 2,
        rent_abatement_amount: Decimal::ZERO,
        ..office_lease()
    };
    let entries = generate_payment_schedule(&terms, &[]).unwrap();

    let base_rent: Vec<_> = entries
        .iter()
        .filter(|e| e.payment_type == PaymentType::BaseRent)
        .collect();
    assert_eq!(base_rent[0].scheduled_amount, Decimal::ZERO);
    assert_eq!(base_rent[1].scheduled_amount, Decimal::ZERO);
    assert_eq!(base_rent[2].scheduled_amount, dec!(5000));

    for month in [1, 2] {
        let cam = entries
            .iter()
            .find(|e| e.period_month == month && e.payment_type == PaymentType::Cam)
            .unwrap();
        assert_eq!(cam.scheduled_amount, dec!(800));
        let insurance = entries
            .iter()
            .find(|e| e.period_month == month && e.payment_type == PaymentType::Insurance)
            .unwrap();
        assert_eq!(insurance.scheduled_amount, dec!(150));
    }
}

#[test]
fn test_payment_schedule_is_idempotent() {
    let terms = LeaseTerms {
        cam_monthly: dec!(1234.56),
        property_tax_annual: dec!(10000),
        ..office_lease()
    };
    let rules = vec![annual_three_percent(date(2025, 1, 1))];
    let a = serde_json::to_string(&generate_payment_schedule(&terms, &rules).unwrap()).unwrap();
    let b = serde_json::to_string(&generate_payment_schedule(&terms, &rules).unwrap()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_property_tax_year_sums_to_annual() {
    let terms = LeaseTerms {
        property_tax_annual: dec!(10000),
        ..office_lease()
    };
    let entries = generate_payment_schedule(&terms, &[]).unwrap();
    let first_year: Decimal = entries
        .iter()
        .filter(|e| e.period_year == 2024 && e.payment_type == PaymentType::PropertyTax)
        .map(|e| e.scheduled_amount)
        .sum();
    assert_eq!(first_year, dec!(10000));
}

// ===========================================================================
// Journal entries
// ===========================================================================

#[test]
fn test_every_journal_entry_balances() {
    let mut terms = office_lease();
    terms.initial_direct_costs = dec!(2500);
    terms.prepaid_rent = dec!(10000);
    terms.lease_incentives_received = dec!(15000);
    let mapping = loaded_mapping();

    for classification in [LeaseClassification::Operating, LeaseClassification::Finance] {
        terms.classification = classification;
        let initial = generate_initial_journal_entries(&terms, &mapping).unwrap();
        let schedule = generate_asc842_schedule(&terms, None).unwrap();
        let monthly =
            generate_monthly_journal_entries(&schedule.schedule, classification, &mapping)
                .unwrap();
        assert_eq!(monthly.len(), 36);
        for entry in initial.iter().chain(monthly.iter()) {
            assert_eq!(entry.total_debits(), entry.total_credits(), "{}", entry.description);
            assert!(entry.unposted_lines().next().is_none());
        }
    }
}

#[test]
fn test_initial_entry_recognizes_rou_and_liability() {
    let terms = office_lease();
    let liability = calculate_lease_liability(&terms).unwrap();
    let entries = generate_initial_journal_entries(&terms, &loaded_mapping()).unwrap();
    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry.date, date(2024, 1, 1));
    assert_eq!(entry.debits[0].account.as_deref(), Some("1610"));
    assert_eq!(entry.debits[0].amount, liability);
    assert_eq!(entry.credits[0].account.as_deref(), Some("2410"));
}

#[test]
fn test_operating_cost_entry_for_month() {
    let terms = LeaseTerms {
        cam_monthly: dec!(1500),
        utilities_monthly: dec!(300),
        ..office_lease()
    };
    let entries = generate_payment_schedule(&terms, &[]).unwrap();
    let entry = generate_operating_cost_entry(2024, 3, &entries, &loaded_mapping())
        .unwrap()
        .unwrap();
    assert_eq!(entry.total_debits(), dec!(1800));
    assert_eq!(entry.credits.len(), 1);
    assert_eq!(entry.credits[0].amount, dec!(1800));

    let empty = generate_operating_cost_entry(2030, 1, &entries, &loaded_mapping()).unwrap();
    assert!(empty.is_none());
}

// ===========================================================================
// End-to-end
// ===========================================================================

#[test]
fn test_analysis_from_json() {
    let json = r#"{
        "terms": {
            "commencement_date": "2024-01-01",
            "expiration_date": "2025-12-31",
            "lease_term_months": 24,
            "base_rent_monthly": "1000",
            "cam_monthly": "200",
            "discount_rate": "0.05",
            "classification": "finance"
        },
        "escalations": [
            {
                "type": "fixed_amount",
                "effective_date": "2025-01-01",
                "amount_increase": "50",
                "frequency": "annual"
            }
        ]
    }"#;
    let input: LeaseAnalysisInput = serde_json::from_str(json).unwrap();
    let output = analyze_lease(&input).unwrap();
    let analysis = output.result;

    assert_eq!(analysis.lease_payments[11], dec!(1000));
    assert_eq!(analysis.lease_payments[12], dec!(1050));
    let asc842 = analysis.asc842.unwrap();
    assert_eq!(asc842.summary.classification, LeaseClassification::Finance);
    assert_eq!(asc842.summary.total_lease_payments, dec!(24600));
    assert_eq!(analysis.monthly_journal_entries.len(), 24);
    assert!(analysis
        .monthly_journal_entries
        .iter()
        .all(|entry| entry.is_balanced()));
}
