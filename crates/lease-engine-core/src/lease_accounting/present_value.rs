//! Initial ASC 842 measurement: lease liability and right-of-use asset.
//!
//! Only base rent counts as a lease payment; CAM, tax, insurance and
//! utilities are non-lease components. Payments are treated as made at the
//! end of each month and discounted at `discount_rate / 12`.

use tracing::debug;

use crate::time_value::{monthly_discount_rate, pv_of_payment_stream};
use crate::types::{round_money, Money};

use super::terms::LeaseTerms;

/// Initial lease liability assuming a flat `base_rent_monthly` for every
/// month of the term. `None` when discount rate or term is missing.
pub fn calculate_lease_liability(terms: &LeaseTerms) -> Option<Money> {
    calculate_lease_liability_for_payments(terms, None)
}

/// Initial lease liability for an explicit base-rent stream (typically the
/// escalated stream from the payment schedule). Months beyond the supplied
/// stream fall back to `base_rent_monthly`.
pub fn calculate_lease_liability_for_payments(
    terms: &LeaseTerms,
    payments: Option<&[Money]>,
) -> Option<Money> {
    if !terms.has_asc842_inputs() {
        debug!(
            discount_rate = %terms.discount_rate,
            lease_term_months = terms.lease_term_months,
            "lease liability unavailable: discount rate and term must be positive"
        );
        return None;
    }
    let stream = lease_payment_stream(terms, payments);
    let rate = monthly_discount_rate(terms.discount_rate);
    Some(round_money(pv_of_payment_stream(&stream, rate)))
}

/// Initial ROU asset with a flat base-rent stream.
pub fn calculate_rou_asset(terms: &LeaseTerms) -> Option<Money> {
    calculate_lease_liability(terms).map(|liability| rou_asset_from_liability(terms, liability))
}

/// ROU = liability + initial direct costs + prepaid rent - incentives.
/// The same formula applies to operating and finance leases.
pub fn rou_asset_from_liability(terms: &LeaseTerms, liability: Money) -> Money {
    round_money(
        liability + terms.initial_direct_costs + terms.prepaid_rent
            - terms.lease_incentives_received,
    )
}

/// One payment per month of the lease term, rounded to cents.
pub(crate) fn lease_payment_stream(terms: &LeaseTerms, payments: Option<&[Money]>) -> Vec<Money> {
    let supplied = payments.unwrap_or(&[]);
    (0..terms.lease_term_months as usize)
        .map(|i| {
            round_money(
                supplied
                    .get(i)
                    .copied()
                    .unwrap_or(terms.base_rent_monthly),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lease_accounting::terms::{LeaseClassification, PropertyTaxFrequency};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn office_lease() -> LeaseTerms {
        LeaseTerms {
            commencement_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            rent_commencement_date: None,
            expiration_date: NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
            lease_term_months: 36,
            base_rent_monthly: dec!(10000),
            cam_monthly: dec!(1500),
            insurance_monthly: Decimal::ZERO,
            property_tax_annual: dec!(24000),
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

    #[test]
    fn test_liability_36_month_office_lease() {
        let liability = calculate_lease_liability(&office_lease()).unwrap();
        // PV of 36 x 10,000 at 0.5% per month, in arrears; CAM and tax excluded
        assert_eq!(liability, dec!(328710.16));
        assert!((liability - dec!(328671)).abs() < dec!(100));
    }

    #[test]
    fn test_rou_equals_liability_without_adjustments() {
        let terms = office_lease();
        assert_eq!(
            calculate_rou_asset(&terms),
            calculate_lease_liability(&terms)
        );
    }

    #[test]
    fn test_rou_adjustments() {
        let mut terms = office_lease();
        terms.initial_direct_costs = dec!(5000);
        terms.prepaid_rent = dec!(10000);
        terms.lease_incentives_received = dec!(20000);
        let liability = calculate_lease_liability(&terms).unwrap();
        let rou = calculate_rou_asset(&terms).unwrap();
        assert_eq!(rou, liability - dec!(5000));
    }

    #[test]
    fn test_rou_formula_is_classification_independent() {
        let mut terms = office_lease();
        terms.initial_direct_costs = dec!(2500);
        let operating = calculate_rou_asset(&terms);
        terms.classification = LeaseClassification::Finance;
        assert_eq!(calculate_rou_asset(&terms), operating);
    }

    #[test]
    fn test_missing_rate_or_term_yields_none() {
        let mut terms = office_lease();
        terms.discount_rate = Decimal::ZERO;
        assert_eq!(calculate_lease_liability(&terms), None);
        assert_eq!(calculate_rou_asset(&terms), None);

        let mut terms = office_lease();
        terms.discount_rate = dec!(-0.01);
        assert_eq!(calculate_lease_liability(&terms), None);

        let mut terms = office_lease();
        terms.lease_term_months = 0;
        assert_eq!(calculate_lease_liability(&terms), None);
    }

    #[test]
    fn test_supplied_stream_overrides_flat_rent() {
        let terms = office_lease();
        let mut stream = vec![dec!(10000); 12];
        stream.extend(vec![dec!(10300); 24]);
        let escalated = calculate_lease_liability_for_payments(&terms, Some(&stream)).unwrap();
        let flat = calculate_lease_liability(&terms).unwrap();
        assert!(escalated > flat);
    }

    #[test]
    fn test_short_stream_falls_back_to_base_rent() {
        let terms = office_lease();
        let short = vec![dec!(10000); 6];
        assert_eq!(
            calculate_lease_liability_for_payments(&terms, Some(&short)),
            calculate_lease_liability(&terms)
        );
    }
}
