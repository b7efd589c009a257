use chrono::{Duration as ChronoDuration, Utc};
use colored::*;
use gig_booking::config::Config;
use gig_booking::domain::models::booking::{BookingStatus, EventDetails};
use gig_booking::error::AppError;
use gig_booking::infra::factory::{bootstrap_state, connect_postgres, connect_sqlite, is_postgres_url};
use gig_booking::state::AppState;
use governor::{Quota, RateLimiter};
use hdrhistogram::Histogram;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use uuid::Uuid;

const STAGE_SECS: u64 = 10;

#[derive(Debug)]
enum Outcome {
    Completed,
    Conflict,
    Failed,
}

/// Drives full booking lifecycles in-process against the configured database.
/// Both parties final-confirm at the same instant, so every lifecycle
/// exercises the write-conflict retry path.
#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let fallback = format!("sqlite://bench_{}.db?mode=rwc", Uuid::new_v4());
    let config = match Config::from_env_or_database(&fallback) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", format!("❌ {}", e).red().bold());
            return;
        }
    };
    let _guard = gig_booking::init_logging(&config.log_dir);
    if config.database_url == fallback {
        println!("{}", format!("DATABASE_URL not set, using {}", fallback).yellow());
    }

    println!("{}", "🚀 Starting Booking Lifecycle Benchmark".bold().green());
    println!("Database: {}", config.database_url);

    let state = match bootstrap_state(&config).await {
        Ok(state) => Arc::new(state),
        Err(e) => {
            eprintln!("{}", format!("❌ Could not open database: {}", e).red().bold());
            return;
        }
    };

    println!("\n{}", "⚙️  Seeding benchmark artist...".yellow());
    let artist_id = format!("bench-artist-{}", Uuid::new_v4());
    if let Err(e) = seed_artist(&config, &artist_id, 7500).await {
        eprintln!("{}", format!("❌ Seeding failed: {}", e).red().bold());
        return;
    }
    println!("{}", "✅ Artist created.".green());

    println!("\n{}", "=".repeat(76));
    println!("{:<10} | {:<15} | {:<15} | {:<12} | {:<12}", "RPS", "Mean (ms)", "P99 (ms)", "Completed", "Conflicts");
    println!("{:-<10}-+-{:-<15}-+-{:-<15}-+-{:-<12}-+-{:-<12}", "", "", "", "", "");

    for rps in [10, 50, 200] {
        run_stage(state.clone(), &artist_id, rps).await;
    }
}

async fn seed_artist(config: &Config, artist_id: &str, min_price: i64) -> Result<(), AppError> {
    if is_postgres_url(&config.database_url) {
        let pool = connect_postgres(config).await?;
        sqlx::query("INSERT INTO artist_profiles (user_id, min_price) VALUES ($1, $2)")
            .bind(artist_id)
            .bind(min_price)
            .execute(&pool)
            .await?;
    } else {
        let pool = connect_sqlite(config).await?;
        sqlx::query("INSERT INTO artist_profiles (user_id, min_price) VALUES (?, ?)")
            .bind(artist_id)
            .bind(min_price)
            .execute(&pool)
            .await?;
    }
    Ok(())
}

fn bench_details() -> EventDetails {
    let date = (Utc::now() + ChronoDuration::days(30)).date_naive();
    EventDetails {
        event_type: "benchmark".to_string(),
        event_date: date,
        event_time: chrono::NaiveTime::from_hms_opt(20, 0, 0).unwrap_or_default(),
        duration_hours: 3,
        location: "Load Hall".to_string(),
        notes: None,
    }
}

async fn one_lifecycle(state: &AppState, artist_id: &str) -> Result<BookingStatus, AppError> {
    let listener_id = format!("bench-listener-{}", Uuid::new_v4());
    let lifecycle = &state.lifecycle;

    let booking = lifecycle.create(&listener_id, artist_id, bench_details()).await?;
    lifecycle.accept(&booking.id, artist_id).await?;
    lifecycle.pay(&booking.id, &listener_id).await?;
    let (a, l) = tokio::join!(
        lifecycle.final_confirm(&booking.id, artist_id),
        lifecycle.final_confirm(&booking.id, &listener_id),
    );
    a?;
    l?;

    let finished = lifecycle.get(&booking.id, &listener_id).await?;
    Ok(finished.status)
}

async fn run_stage(state: Arc<AppState>, artist_id: &str, rps: u32) {
    let Some(per_second) = NonZeroU32::new(rps) else { return };
    let limiter = Arc::new(RateLimiter::direct(Quota::per_second(per_second)));

    let (tx, mut rx) = mpsc::channel(50000);
    let start_time = Instant::now();
    let duration = Duration::from_secs(STAGE_SECS);

    while start_time.elapsed() <= duration {
        if limiter.check().is_ok() {
            let state = state.clone();
            let artist_id = artist_id.to_string();
            let tx = tx.clone();

            tokio::spawn(async move {
                let started = Instant::now();
                let outcome = match one_lifecycle(&state, &artist_id).await {
                    Ok(BookingStatus::Completed) => Outcome::Completed,
                    Err(e) if e.is_transient() => Outcome::Conflict,
                    _ => Outcome::Failed,
                };
                let _ = tx.send((started.elapsed(), outcome)).await;
            });
        } else {
            tokio::task::yield_now().await;
        }
    }

    drop(tx);

    let Ok(mut histogram) = Histogram::<u64>::new(3) else { return };
    let (mut completed, mut conflicts, mut total) = (0u64, 0u64, 0u64);

    while let Some((latency, outcome)) = rx.recv().await {
        total += 1;
        match outcome {
            Outcome::Completed => completed += 1,
            Outcome::Conflict => conflicts += 1,
            Outcome::Failed => {}
        }
        let _ = histogram.record(latency.as_micros() as u64);
    }

    let mean_ms = histogram.mean() / 1000.0;
    let p99_ms = histogram.value_at_quantile(0.99) as f64 / 1000.0;

    println!(
        "{:<10} | {:<15.2} | {:<15.2} | {:<12} | {:<12}",
        rps,
        mean_ms,
        p99_ms,
        format!("{}/{}", completed, total),
        conflicts
    );

    tokio::time::sleep(Duration::from_millis(500)).await;
}
