//! One-shot console rendering of the dashboard for a city.
//!
//! Usage: `console <city>` with a running server, e.g.
//! `WEATHERDECK_URL=http://localhost:3001 console London`

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use weatherdeck::chart::PanelState;
use weatherdeck::dashboard::{AirQualityView, Dashboard, HttpFeed, StateStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let city = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("usage: console <city>"))?;
    let base_url =
        std::env::var("WEATHERDECK_URL").unwrap_or_else(|_| "http://localhost:3001".to_string());
    let state_dir = std::env::var("WEATHERDECK_STATE_DIR")
        .unwrap_or_else(|_| ".weatherdeck".to_string());

    let feed = Arc::new(HttpFeed::new(base_url));
    let store = StateStore::open(&state_dir)?;
    let mut dashboard = Dashboard::new(feed, store).await?;

    dashboard.load_city(&city).await?;

    let unit = dashboard.settings().temperature_unit;
    let snapshot = dashboard
        .current()
        .ok_or_else(|| anyhow::anyhow!("no data loaded"))?;

    println!(
        "{}, {} - {} ({})",
        snapshot.place.city,
        snapshot.place.country,
        snapshot.condition.main,
        snapshot.condition.description
    );
    println!(
        "  {}  feels like {}",
        unit.format(snapshot.temperature),
        unit.format(snapshot.feels_like)
    );
    if let (Some(min), Some(max)) = (snapshot.temp_min, snapshot.temp_max) {
        println!("  low {}  high {}", unit.format(min), unit.format(max));
    }
    if let Some(humidity) = snapshot.humidity {
        println!("  humidity {humidity}%");
    }
    if let Some(pressure) = snapshot.pressure {
        println!("  pressure {pressure} hPa");
    }
    if let Some(kmh) = snapshot.wind.speed_kmh {
        let direction = snapshot.wind.cardinal.as_deref().unwrap_or("-");
        println!("  wind {kmh} km/h {direction}");
    }

    match dashboard.air_quality() {
        AirQualityView::Available(sample) => {
            println!("  air quality: {} (AQI {})", sample.status, sample.aqi_display);
        }
        AirQualityView::Unavailable => println!("  air quality: unavailable"),
        AirQualityView::Pending => {}
    }

    match dashboard.panel().state() {
        PanelState::Rendered(chart) => {
            println!();
            for day in &chart.days {
                let marker = if day.current { ">" } else { " " };
                println!(
                    "{marker} {:<9} {:>6} / {:<6} {}",
                    day.day,
                    unit.format(day.temp_min),
                    unit.format(day.temp_max),
                    day.weather.main
                );
            }
        }
        PanelState::Failed { message } => println!("  chart: {message}"),
        _ => {}
    }

    Ok(())
}
