//! Progression laws shared by building costs, productions and storages.
//!
//! Every per-level value follows `floor(base * progress^(level - 1))`. Build
//! durations depend on the metal and crystal cost only, at 2500 units per
//! hour.

use chrono::{DateTime, TimeDelta, Utc};

use super::game::{BuildingActionCost, Catalogue, GameError};

/// Name of the resource contributing to build durations.
pub const METAL: &str = "metal";
/// Name of the second resource contributing to build durations.
pub const CRYSTAL: &str = "crystal";

/// Units of metal plus crystal that take one hour to build.
pub const BUILD_UNITS_PER_HOUR: i64 = 2500;

const NANOS_PER_HOUR: i64 = 3_600_000_000_000;
const NANOS_PER_BUILD_UNIT: i64 = NANOS_PER_HOUR / BUILD_UNITS_PER_HOUR;

fn value_at(base: i32, progress: f64, level: i32) -> i32 {
    let scaled = f64::from(base) * progress.powi(level.saturating_sub(1));
    // `as` saturates on overflow and maps NaN to zero.
    scaled.floor() as i32
}

/// Cost of reaching `level` for a cost row with the given base and factor.
///
/// # Examples
/// ```
/// use stellar_backend::domain::progression::cost_at;
///
/// assert_eq!(cost_at(60, 1.5, 1), 60);
/// assert_eq!(cost_at(60, 1.5, 3), 135);
/// ```
#[must_use]
pub fn cost_at(base_cost: i32, progress: f64, level: i32) -> i32 {
    value_at(base_cost, progress, level)
}

/// Hourly production granted by a building at `level`.
#[must_use]
pub fn production_at(base: i32, progress: f64, level: i32) -> i32 {
    value_at(base, progress, level)
}

/// Storage cap granted by a building at `level`.
#[must_use]
pub fn storage_at(base: i32, progress: f64, level: i32) -> i32 {
    value_at(base, progress, level)
}

/// Build duration for the metal and crystal amounts, rounded up to the next
/// nanosecond.
///
/// One unit takes exactly 1.44 s, so the law is evaluated in integers. Free
/// upgrades still take one nanosecond so an action always completes after
/// it was created.
#[must_use]
pub fn build_duration(metal: i32, crystal: i32) -> TimeDelta {
    let units = i64::from(metal.max(0)) + i64::from(crystal.max(0));
    let nanos = units.saturating_mul(NANOS_PER_BUILD_UNIT);
    TimeDelta::nanoseconds(nanos.max(1))
}

/// Time needed to complete an action with the given costs.
///
/// Metal and crystal are looked up by name in the catalogue; a costed resource
/// that is neither does not contribute.
///
/// # Errors
///
/// Returns [`GameError::NoSuchResource`] when the catalogue lacks metal or
/// crystal.
pub fn completion_time(
    catalogue: &Catalogue,
    costs: &[BuildingActionCost],
) -> Result<TimeDelta, GameError> {
    let metal = catalogue
        .resource_by_name(METAL)
        .ok_or_else(|| GameError::no_such_resource(METAL))?;
    let crystal = catalogue
        .resource_by_name(CRYSTAL)
        .ok_or_else(|| GameError::no_such_resource(CRYSTAL))?;

    let amount_of = |resource| {
        costs
            .iter()
            .filter(|cost| cost.resource == resource)
            .map(|cost| cost.amount)
            .sum::<i32>()
    };

    Ok(build_duration(amount_of(metal.id), amount_of(crystal.id)))
}

/// Fractional hours elapsed between two instants; negative when `to < from`.
#[must_use]
pub fn hours_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    let elapsed = to - from;
    match elapsed.num_nanoseconds() {
        Some(nanos) => nanos as f64 / NANOS_PER_HOUR as f64,
        None => elapsed.num_milliseconds() as f64 / 3_600_000.0,
    }
}

/// Advance a stockpile from `from` to `to` at `rate_per_hour`, capped by
/// `cap`.
///
/// Intervals that are empty or negative leave the stockpile untouched. A
/// stockpile already at or above its cap is never reduced; only its timestamp
/// moves.
///
/// # Examples
/// ```
/// use chrono::{TimeDelta, TimeZone, Utc};
/// use stellar_backend::domain::progression::integrate_stockpile;
///
/// let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
/// let t1 = t0 + TimeDelta::minutes(30);
/// assert_eq!(integrate_stockpile(60.0, 5.0, t0, t1, 1000.0), (62.5, t1));
/// assert_eq!(integrate_stockpile(60.0, 5.0, t0, t1, 62.0), (62.0, t1));
/// ```
#[must_use]
pub fn integrate_stockpile(
    amount: f64,
    rate_per_hour: f64,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    cap: f64,
) -> (f64, DateTime<Utc>) {
    if to <= from {
        return (amount, from);
    }
    if amount >= cap {
        return (amount, to);
    }

    let produced = amount + rate_per_hour * hours_between(from, to);
    (produced.clamp(0.0, cap), to)
}
