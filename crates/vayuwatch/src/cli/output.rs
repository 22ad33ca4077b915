//! Plain-text renderers for CLI output.
//!
//! Each function writes a human-readable view to any [`Write`]; the binary
//! passes stdout, tests pass a `Vec<u8>`.

use std::io::{self, Write};

use crate::aqi::{self, active_grap_stages, grap_stage, Category, GRAP_STAGES};
use crate::auth::{OtpGrant, User};
use crate::dataset::{AqiReading, City, SourceShare, State, TrendPoint, WardContext};
use crate::stats::{Alert, NationalStats};

const BAR_WIDTH: usize = 40;

/// Classification of a single AQI value.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn classification(out: &mut impl Write, value: f64) -> io::Result<()> {
    let category = aqi::classify(value);
    let advisory = category.advisory();
    let (low, high) = category.range();
    let range = match high {
        Some(high) => format!("{low}-{high}"),
        None => format!("{low}+"),
    };

    writeln!(out, "AQI {value}: {} ({})", category.label(), category.color())?;
    writeln!(out, "  Range:       {range}")?;
    writeln!(
        out,
        "  Gauge:       {:.0}%",
        aqi::gauge_fraction(value) * 100.0
    )?;
    writeln!(out, "  GRAP stage:  {}", grap_stage(category))?;
    writeln!(out)?;
    writeln!(out, "  General:     {}", advisory.general)?;
    writeln!(out, "  Sensitive:   {}", advisory.sensitive)?;
    writeln!(out, "  Outdoor:     {}", advisory.outdoor)?;
    Ok(())
}

/// National summary.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn national_stats(out: &mut impl Write, stats: &NationalStats<'_>) -> io::Result<()> {
    writeln!(out, "National air quality")?;
    writeln!(out, "====================")?;
    writeln!(
        out,
        "Average AQI:  {} ({})",
        stats.average_aqi,
        stats.category.label()
    )?;
    writeln!(out, "Cities:       {}", stats.total_cities)?;
    writeln!(out, "States:       {}", stats.total_states)?;
    writeln!(
        out,
        "Worst city:   {} ({})",
        stats.worst_city.name, stats.worst_city.aqi
    )?;
    writeln!(
        out,
        "Best city:    {} ({})",
        stats.best_city.name, stats.best_city.aqi
    )?;
    writeln!(out)?;
    for (category, count) in &stats.category_counts {
        writeln!(out, "  {:<13} {count}", category.label())?;
    }
    Ok(())
}

/// One line per city, ranked as given.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn city_table(out: &mut impl Write, cities: &[&City]) -> io::Result<()> {
    writeln!(
        out,
        "{:<18} {:<16} {:>5}  {:<13} {:>8}",
        "ID", "STATE", "AQI", "CATEGORY", "STATIONS"
    )?;
    for city in cities {
        writeln!(
            out,
            "{:<18} {:<16} {:>5}  {:<13} {:>8}",
            city.id,
            city.state,
            city.aqi,
            city.category().label(),
            city.station_count
        )?;
    }
    Ok(())
}

/// City detail with pollutants and wards.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn city(out: &mut impl Write, city: &City) -> io::Result<()> {
    let category = city.category();
    writeln!(out, "{}, {}", city.name, city.state)?;
    writeln!(out, "AQI {} ({})", city.aqi, category.label())?;
    writeln!(out, "Population:   {}", city.population)?;
    writeln!(out, "Stations:     {}", city.station_count)?;
    writeln!(out, "Updated:      {}", city.last_updated.to_rfc3339())?;
    writeln!(
        out,
        "Location:     {:.4}, {:.4}",
        city.coordinates.latitude, city.coordinates.longitude
    )?;
    writeln!(out)?;
    writeln!(out, "Pollutants")?;
    for (name, value) in city.pollutants.readings() {
        writeln!(out, "  {name:<6} {value:>8.1}")?;
    }
    writeln!(out)?;
    writeln!(out, "Health: {}", category.advisory().general)?;

    if !city.wards.is_empty() {
        writeln!(out)?;
        writeln!(out, "Wards")?;
        for ward in &city.wards {
            writeln!(
                out,
                "  {:<20} {:>5}  {:<13} {}",
                ward.id,
                ward.aqi,
                ward.category().label(),
                ward.dominant_source
            )?;
        }
    }
    Ok(())
}

/// State summary with its cities.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn state(out: &mut impl Write, state: &State) -> io::Result<()> {
    writeln!(out, "{} ({})", state.name, state.code)?;
    writeln!(out, "AQI {} ({})", state.aqi, state.category().label())?;
    writeln!(out, "Population:   {}", state.population)?;
    writeln!(out)?;
    let cities: Vec<&City> = state.cities.iter().collect();
    city_table(out, &cities)
}

/// Ward detail.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn ward(out: &mut impl Write, ctx: &WardContext<'_>) -> io::Result<()> {
    let ward = ctx.ward;
    writeln!(out, "{}, {}, {}", ward.name, ctx.city.name, ctx.state.name)?;
    writeln!(out, "AQI {} ({})", ward.aqi, ward.category().label())?;
    writeln!(out, "Population:   {}", ward.population)?;
    writeln!(out, "Area:         {} km²", ward.area)?;
    writeln!(out, "Main source:  {}", ward.dominant_source)?;
    writeln!(out)?;
    for (name, value) in ward.pollutants.readings() {
        writeln!(out, "  {name:<6} {value:>8.1}")?;
    }
    Ok(())
}

/// Alert list, most severe first.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn alerts(out: &mut impl Write, alerts: &[Alert]) -> io::Result<()> {
    if alerts.is_empty() {
        writeln!(out, "No active alerts.")?;
        return Ok(());
    }
    for alert in alerts {
        writeln!(out, "[{}] {}", alert.level, alert.title)?;
        writeln!(out, "    {}", alert.location)?;
        writeln!(out, "    {}", alert.description)?;
    }
    Ok(())
}

/// Trend points as a bar chart scaled to the top of the AQI scale.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn trend(out: &mut impl Write, points: &[TrendPoint]) -> io::Result<()> {
    for point in points {
        let bar = bar_len(point.aqi);
        let category = aqi::classify(f64::from(point.aqi));
        writeln!(
            out,
            "{:>5} {:>4} {:<width$} {}",
            point.label,
            point.aqi,
            "#".repeat(bar),
            category.label(),
            width = BAR_WIDTH
        )?;
    }
    Ok(())
}

/// GRAP stages. With a category, the stages in force are marked.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn grap(out: &mut impl Write, category: Option<Category>) -> io::Result<()> {
    let active: Vec<u8> = category
        .map(active_grap_stages)
        .unwrap_or_default()
        .iter()
        .map(|stage| stage.stage)
        .collect();

    for stage in &GRAP_STAGES {
        let marker = if active.contains(&stage.stage) { "*" } else { " " };
        writeln!(out, "{marker} Stage {}: {}", stage.stage, stage.trigger)?;
        for action in stage.actions {
            writeln!(out, "    - {action}")?;
        }
    }
    Ok(())
}

/// Source share table.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn sources(out: &mut impl Write, sources: &[SourceShare]) -> io::Result<()> {
    for source in sources {
        writeln!(out, "{:<24} {:>3}%", source.name, source.percentage)?;
    }
    Ok(())
}

/// The signed-in user, if any.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn user(out: &mut impl Write, user: Option<&User>) -> io::Result<()> {
    let Some(user) = user else {
        writeln!(out, "Not signed in.")?;
        return Ok(());
    };
    match &user.name {
        Some(name) => writeln!(out, "{name} ({})", user.phone)?,
        None => writeln!(out, "{}", user.phone)?,
    }
    writeln!(out, "  Id:       {}", user.id)?;
    writeln!(out, "  Since:    {}", user.created_at.to_rfc3339())?;
    Ok(())
}

/// An issued one-time code.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn otp_grant(out: &mut impl Write, phone: &str, grant: &OtpGrant) -> io::Result<()> {
    writeln!(out, "Code for {phone}: {}", grant.code)?;
    writeln!(out, "Valid until {}", grant.expires_at.to_rfc3339())?;
    Ok(())
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn bar_len(value: u32) -> usize {
    (aqi::gauge_fraction(f64::from(value)) * BAR_WIDTH as f64).round() as usize
}
