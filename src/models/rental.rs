use chrono::{DateTime, Utc};
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use uuid::Uuid;

const DAY_MILLIS: i64 = 1000 * 60 * 60 * 24;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RentalStatus {
    Pending,
    Confirmed,
    Active,
    Completed,
    Cancelled,
}

impl RentalStatus {
    pub fn as_db(self) -> &'static str {
        match self {
            RentalStatus::Pending => "pending",
            RentalStatus::Confirmed => "confirmed",
            RentalStatus::Active => "active",
            RentalStatus::Completed => "completed",
            RentalStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RentalStatus::Completed | RentalStatus::Cancelled)
    }

    /// Targets reachable from this status via a manual owner/admin transition.
    /// Skipping states (e.g. pending straight to completed) is rejected;
    /// payment confirmation is the only other writer and moves
    /// pending to confirmed on its own.
    pub fn allowed_transitions(self) -> &'static [RentalStatus] {
        match self {
            RentalStatus::Pending => &[RentalStatus::Confirmed, RentalStatus::Cancelled],
            RentalStatus::Confirmed => &[RentalStatus::Active, RentalStatus::Cancelled],
            RentalStatus::Active => &[RentalStatus::Completed, RentalStatus::Cancelled],
            RentalStatus::Completed | RentalStatus::Cancelled => &[],
        }
    }

    pub fn can_transition_to(self, target: RentalStatus) -> bool {
        self.allowed_transitions().contains(&target)
    }
}

pub fn rental_status_from_db<T: AsRef<str>>(value: T) -> RentalStatus {
    match value.as_ref() {
        "pending" => RentalStatus::Pending,
        "confirmed" => RentalStatus::Confirmed,
        "active" => RentalStatus::Active,
        "completed" => RentalStatus::Completed,
        "cancelled" => RentalStatus::Cancelled,
        other => panic!("Unknown rental status: {}", other),
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
    Failed,
}

impl PaymentStatus {
    pub fn as_db(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
            PaymentStatus::Failed => "failed",
        }
    }
}

pub fn payment_status_from_db<T: AsRef<str>>(value: T) -> PaymentStatus {
    match value.as_ref() {
        "pending" => PaymentStatus::Pending,
        "paid" => PaymentStatus::Paid,
        "refunded" => PaymentStatus::Refunded,
        "failed" => PaymentStatus::Failed,
        other => panic!("Unknown payment status: {}", other),
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Stripe,
    Cod,
    Other,
}

impl PaymentMethod {
    pub fn as_db(self) -> &'static str {
        match self {
            PaymentMethod::Stripe => "stripe",
            PaymentMethod::Cod => "cod",
            PaymentMethod::Other => "other",
        }
    }
}

pub fn payment_method_from_db<T: AsRef<str>>(value: T) -> PaymentMethod {
    match value.as_ref() {
        "stripe" => PaymentMethod::Stripe,
        "cod" => PaymentMethod::Cod,
        "other" => PaymentMethod::Other,
        other => panic!("Unknown payment method: {}", other),
    }
}

/// Whole days between two instants, rounded up. A same-day or sub-day booking
/// is charged as one day.
pub fn duration_days(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let millis = (end - start).num_milliseconds().max(0);
    let days = (millis + DAY_MILLIS - 1) / DAY_MILLIS;
    days.max(1)
}

/// Total rental price: duration in whole days times the daily rate.
/// `None` when the product of the two overflows `i64`.
pub fn total_price(start: DateTime<Utc>, end: DateTime<Utc>, price_per_day: i64) -> Option<i64> {
    duration_days(start, end).checked_mul(price_per_day)
}

#[derive(Serialize, Debug, Clone)]
pub struct Rental {
    pub id: Uuid,
    pub renter_id: Uuid,
    pub product_id: Uuid,
    /// Owner of the product, denormalized at creation time.
    pub owner_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total_price: i64,
    pub status: RentalStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize, Debug, JsonSchema)]
pub struct RentalRequest {
    pub product_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

#[derive(Deserialize, Debug, JsonSchema)]
pub struct RentalStatusUpdateRequest {
    pub status: RentalStatus,
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct RentalResponse {
    pub id: Uuid,
    pub renter_id: Uuid,
    pub product_id: Uuid,
    pub owner_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub duration_days: i64,
    pub total_price: i64,
    pub status: RentalStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Rental> for RentalResponse {
    fn from(rental: &Rental) -> Self {
        Self {
            id: rental.id,
            renter_id: rental.renter_id,
            product_id: rental.product_id,
            owner_id: rental.owner_id,
            start_date: rental.start_date,
            end_date: rental.end_date,
            duration_days: duration_days(rental.start_date, rental.end_date),
            total_price: rental.total_price,
            status: rental.status,
            payment_status: rental.payment_status,
            payment_method: rental.payment_method,
            payment_id: rental.payment_id.clone(),
            created_at: rental.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn day(n: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(n * 24 * 3600, 0).unwrap()
    }

    #[test]
    fn three_exact_days_cost_three_daily_rates() {
        assert_eq!(duration_days(day(0), day(3)), 3);
        assert_eq!(total_price(day(0), day(3), 100), Some(300));
    }

    #[test]
    fn sub_day_booking_is_charged_one_day() {
        let start = day(0);
        let end = start + chrono::Duration::hours(5);
        assert_eq!(duration_days(start, end), 1);
        assert_eq!(total_price(start, end, 250), Some(250));
    }

    #[test]
    fn overflowing_total_price_is_rejected() {
        assert_eq!(total_price(day(0), day(3), i64::MAX), None);
        assert_eq!(total_price(day(0), day(2), i64::MAX / 2 + 1), None);
        assert_eq!(total_price(day(0), day(1), i64::MAX), Some(i64::MAX));
    }

    #[test]
    fn same_instant_booking_is_charged_one_day() {
        assert_eq!(duration_days(day(1), day(1)), 1);
    }

    #[test]
    fn partial_last_day_rounds_up() {
        let start = day(0);
        let end = day(2) + chrono::Duration::minutes(1);
        assert_eq!(duration_days(start, end), 3);
    }

    #[test]
    fn transition_table_matches_the_lifecycle() {
        use RentalStatus::*;
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Active));
        assert!(Confirmed.can_transition_to(Cancelled));
        assert!(Active.can_transition_to(Completed));
        assert!(Active.can_transition_to(Cancelled));

        // No skipping, no moving backwards, no leaving terminal states.
        assert!(!Pending.can_transition_to(Active));
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Confirmed.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(Active));
        assert!(!Cancelled.can_transition_to(Pending));
        assert!(!Cancelled.can_transition_to(Confirmed));
    }

    #[test]
    fn terminal_states_have_no_transitions() {
        assert!(RentalStatus::Completed.allowed_transitions().is_empty());
        assert!(RentalStatus::Cancelled.allowed_transitions().is_empty());
        assert!(RentalStatus::Completed.is_terminal());
        assert!(RentalStatus::Cancelled.is_terminal());
        assert!(!RentalStatus::Pending.is_terminal());
    }

    #[test]
    fn statuses_round_trip_through_db_text() {
        for status in [
            RentalStatus::Pending,
            RentalStatus::Confirmed,
            RentalStatus::Active,
            RentalStatus::Completed,
            RentalStatus::Cancelled,
        ] {
            assert_eq!(rental_status_from_db(status.as_db()), status);
        }
        for status in [PaymentStatus::Pending, PaymentStatus::Paid, PaymentStatus::Refunded, PaymentStatus::Failed] {
            assert_eq!(payment_status_from_db(status.as_db()), status);
        }
        for method in [PaymentMethod::Stripe, PaymentMethod::Cod, PaymentMethod::Other] {
            assert_eq!(payment_method_from_db(method.as_db()), method);
        }
    }

    proptest! {
        #[test]
        fn duration_is_the_ceiling_of_the_day_span(hours in 1i64..24 * 365, rate in 1i64..10_000) {
            let start = day(0);
            let end = start + chrono::Duration::hours(hours);
            let days = duration_days(start, end);

            // At least one day, and the tightest whole-day cover of the span.
            prop_assert!(days >= 1);
            prop_assert!(days * 24 >= hours);
            prop_assert!((days - 1) * 24 < hours);
            prop_assert_eq!(total_price(start, end, rate), Some(days * rate));
        }
    }
}
