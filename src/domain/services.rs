//! Pure domain services for the trip planner.
//!
//! Two families of functions live here: scheduling (ISO date parsing, the
//! calendar walk that relabels days when the start date or day count
//! changes) and pricing (room/meal subtotals, discount tiers, taxes and
//! fees, suggested budget plans). None of them hold state; the state engine
//! and the presentation layer call into them.

use chrono::{Datelike, Days, NaiveDate, SecondsFormat, Utc};

use super::models::{
    Day, Discounts, MealSelection, PricingSnapshot, RoomType, TaxBreakdown,
};

/// Current wall-clock time as an ISO-8601 UTC timestamp, e.g.
/// `2026-08-06T09:15:32.412Z`. Every `updatedAt` bump goes through here.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses a `YYYY-MM-DD` date string. Empty or unparseable input yields
/// `None` rather than an error; callers treat that as "no start date set".
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    if s.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

pub fn to_iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Short display label for a day column, e.g. `"Fri 6/7"` for 2024-06-07.
/// Month and day are unpadded.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use wanderplan::domain::day_label;
///
/// let date = NaiveDate::from_ymd_opt(2024, 6, 7).unwrap();
/// assert_eq!(day_label(date), "Fri 6/7");
/// ```
pub fn day_label(date: NaiveDate) -> String {
    format!("{} {}/{}", date.format("%a"), date.month(), date.day())
}

/// The date-recalculation pass. Walks consecutive calendar dates from the
/// start date, rewriting every day's title to `"Day N"` and its date label,
/// and returns the recomputed trip end date (start + dayCount - 1) as an
/// ISO string.
///
/// With no parseable start date, titles are still normalized to `"Day N"`,
/// existing date labels are left alone, and the returned end date is empty.
pub fn recalc_dates(start_date: &str, days: &mut [Day]) -> String {
    match parse_iso_date(start_date) {
        Some(start) => {
            for (idx, day) in days.iter_mut().enumerate() {
                let date = start
                    .checked_add_days(Days::new(idx as u64))
                    .unwrap_or(start);
                day.title = format!("Day {}", idx + 1);
                day.date = day_label(date);
            }
            let offset = days.len().saturating_sub(1) as u64;
            let end = start.checked_add_days(Days::new(offset)).unwrap_or(start);
            if days.is_empty() { String::new() } else { to_iso_date(end) }
        }
        None => {
            for (idx, day) in days.iter_mut().enumerate() {
                day.title = format!("Day {}", idx + 1);
            }
            String::new()
        }
    }
}

/// Tax and fee percentages applied to the discounted pre-tax subtotal.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxRules {
    pub city_tax_pct: f64,
    pub service_fee_pct: f64,
    pub resort_fee_per_night: i64,
}

impl Default for TaxRules {
    fn default() -> Self {
        Self {
            city_tax_pct: 0.05,
            service_fee_pct: 0.03,
            resort_fee_per_night: 0,
        }
    }
}

/// Per-person per-day meal prices in whole dollars.
#[derive(Debug, Clone, PartialEq)]
pub struct MealPrices {
    pub breakfast: i64,
    pub lunch: i64,
    pub dinner: i64,
}

impl Default for MealPrices {
    fn default() -> Self {
        Self {
            breakfast: 12,
            lunch: 18,
            dinner: 26,
        }
    }
}

/// Everything the pricing pipeline needs: who, how long, and what room and
/// meals. Nights are clamped to at least 1 and people to 1..=8 at the
/// subtotal step.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingContext {
    pub base_night_price: i64,
    pub nights: u32,
    pub people: u32,
    pub room_type: RoomType,
    pub meal_plan: MealSelection,
}

/// Pre-discount, pre-tax room and meal subtotals.
#[derive(Debug, Clone, PartialEq)]
pub struct Subtotals {
    pub room_total: i64,
    pub meals_total: i64,
    pub nights: u32,
    pub people: u32,
}

/// Nightly room price for the selected room type, rounded to whole dollars.
///
/// # Examples
///
/// ```
/// use wanderplan::domain::{room_price_per_night, RoomType};
///
/// assert_eq!(room_price_per_night(120, RoomType::Standard), 120);
/// assert_eq!(room_price_per_night(120, RoomType::Deluxe), 162);
/// assert_eq!(room_price_per_night(120, RoomType::Suite), 216);
/// ```
pub fn room_price_per_night(base_night_price: i64, room_type: RoomType) -> i64 {
    (base_night_price as f64 * room_type.multiplier()).round() as i64
}

/// Sum of the selected meals per person per day.
pub fn meals_per_person_per_day(meal_plan: MealSelection, prices: &MealPrices) -> i64 {
    let mut sum = 0;
    if meal_plan.breakfast {
        sum += prices.breakfast;
    }
    if meal_plan.lunch {
        sum += prices.lunch;
    }
    if meal_plan.dinner {
        sum += prices.dinner;
    }
    sum
}

pub fn compute_base_subtotals(ctx: &PricingContext, prices: &MealPrices) -> Subtotals {
    let nights = ctx.nights.max(1);
    let people = ctx.people.clamp(1, 8);
    let room_per_night = room_price_per_night(ctx.base_night_price, ctx.room_type);
    let meals_per_day = meals_per_person_per_day(ctx.meal_plan, prices);
    Subtotals {
        room_total: room_per_night * nights as i64,
        meals_total: meals_per_day * people as i64 * nights as i64,
        nights,
        people,
    }
}

/// Applies the discount tiers and returns the breakdown together with the
/// discounted subtotal (never negative).
///
/// Tiers: 5% off the room for 5-6 nights, 10% for 7+; groups of 4+ get
/// $10 per person per night off, capped at 20% of the meals subtotal; all
/// three meals selected takes 8% off the meals subtotal.
pub fn apply_discounts(subtotals: &Subtotals, meal_plan: MealSelection) -> (Discounts, i64) {
    let room_total = subtotals.room_total as f64;
    let meals_total = subtotals.meals_total as f64;

    let room_discount = if subtotals.nights >= 7 {
        room_total * 0.10
    } else if subtotals.nights >= 5 {
        room_total * 0.05
    } else {
        0.0
    };

    let group_discount = if subtotals.people >= 4 {
        let per_head = (subtotals.people * subtotals.nights * 10) as f64;
        per_head.min(meals_total * 0.20)
    } else {
        0.0
    };

    let meal_bundle_discount = if meal_plan.all_selected() {
        meals_total * 0.08
    } else {
        0.0
    };

    let total = (room_discount + group_discount + meal_bundle_discount).round() as i64;
    let discounted_subtotal =
        ((room_total + meals_total).round() as i64 - total).max(0);

    (
        Discounts {
            room_discount: room_discount.round() as i64,
            group_discount: group_discount.round() as i64,
            meal_bundle_discount: meal_bundle_discount.round() as i64,
            total,
        },
        discounted_subtotal,
    )
}

pub fn compute_taxes_and_fees(subtotal: i64, nights: u32, rules: &TaxRules) -> TaxBreakdown {
    let base = subtotal as f64;
    let city_tax = (base * rules.city_tax_pct).round() as i64;
    let service_fee = (base * rules.service_fee_pct).round() as i64;
    let resort_fee = rules.resort_fee_per_night * nights.max(1) as i64;
    TaxBreakdown {
        city_tax,
        service_fee,
        resort_fee,
        total_taxes_and_fees: city_tax + service_fee + resort_fee,
    }
}

/// Runs the whole pipeline (subtotals, discounts, taxes) with the default
/// prices and tax rules and returns the snapshot stored on the trip.
pub fn compute_totals(ctx: &PricingContext) -> PricingSnapshot {
    let prices = MealPrices::default();
    let rules = TaxRules::default();
    let subtotals = compute_base_subtotals(ctx, &prices);
    let (discounts, discounted_subtotal) = apply_discounts(&subtotals, ctx.meal_plan);
    let taxes = compute_taxes_and_fees(discounted_subtotal, subtotals.nights, &rules);
    let grand_total = discounted_subtotal + taxes.total_taxes_and_fees;
    PricingSnapshot {
        room_total: subtotals.room_total,
        meals_total: subtotals.meals_total,
        discounts,
        discounted_subtotal,
        taxes,
        grand_total,
    }
}

/// A precomputed room/meal combination shown on the budget screen.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestedPlan {
    pub id: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub room_type: RoomType,
    pub meal_plan: MealSelection,
    pub badges: Vec<&'static str>,
    pub totals: PricingSnapshot,
}

/// Builds the three suggested budget plans (Value, Balanced, Premium) with
/// full totals computed for each.
pub fn build_suggested_plans(base_night_price: i64, nights: u32, people: u32) -> Vec<SuggestedPlan> {
    let candidates = [
        (
            "value",
            "Value",
            "Standard room + breakfast only - smart essentials",
            RoomType::Standard,
            MealSelection { breakfast: true, lunch: false, dinner: false },
            vec!["Most affordable"],
        ),
        (
            "balanced",
            "Balanced",
            "Deluxe room + breakfast & dinner - comfort & convenience",
            RoomType::Deluxe,
            MealSelection { breakfast: true, lunch: false, dinner: true },
            vec!["Popular choice"],
        ),
        (
            "premium",
            "Premium",
            "Suite + all meals - everything covered",
            RoomType::Suite,
            MealSelection { breakfast: true, lunch: true, dinner: true },
            vec!["All-inclusive feel"],
        ),
    ];

    candidates
        .into_iter()
        .map(|(id, label, description, room_type, meal_plan, badges)| {
            let totals = compute_totals(&PricingContext {
                base_night_price,
                nights,
                people,
                room_type,
                meal_plan,
            });
            SuggestedPlan {
                id,
                label,
                description,
                room_type,
                meal_plan,
                badges,
                totals,
            }
        })
        .collect()
}

/// Simple USD formatting with thousands grouping, no i18n.
///
/// # Examples
///
/// ```
/// use wanderplan::domain::format_currency;
///
/// assert_eq!(format_currency(0), "$0");
/// assert_eq!(format_currency(1234), "$1,234");
/// assert_eq!(format_currency(1000000), "$1,000,000");
/// ```
pub fn format_currency(amount: i64) -> String {
    let negative = amount < 0;
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if negative {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}
