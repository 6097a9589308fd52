use super::database::*;
use super::device::*;
use super::error::{Error, Result};
use super::model::*;
use super::multidownload::*;
use super::progress::*;
use super::util::*;
use chrono::{Local, Utc};
use indicatif::ProgressBar;
use simple_error::SimpleResult;
use sqlx::pool::PoolConnection;
use sqlx::{Sqlite, SqliteConnection, SqlitePool};
use std::path::Path;

#[cfg(test)]
mod test_bundle_name;
#[cfg(test)]
mod test_run_download_job_failed;

pub const DOWNLOAD_EXPIRY_SECONDS: i64 = 3600;
const CURRENT_GAME_MAX_LENGTH: usize = 255;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M";

async fn acquire_connection(pool: &SqlitePool) -> SimpleResult<PoolConnection<Sqlite>> {
    let connection = try_with!(pool.acquire().await, "Failed to acquire a database connection");
    Ok(connection)
}

/// Persists progress on its own connection while the bundler holds another.
struct JobProgressSink {
    pool: SqlitePool,
    job_id: i64,
    last_progress: BundleProgress,
}

impl ProgressSink for JobProgressSink {
    async fn report(&mut self, progress: &BundleProgress) {
        self.last_progress = progress.clone();
        let current_game: String = progress
            .current_game
            .chars()
            .take(CURRENT_GAME_MAX_LENGTH)
            .collect();
        let result = match acquire_connection(&self.pool).await {
            Ok(mut connection) => {
                update_download_job_progress(
                    &mut connection,
                    self.job_id,
                    progress.games_processed as i64,
                    &current_game,
                    progress.bytes_written as i64,
                )
                .await
            }
            Err(error) => Err(error),
        };
        if let Err(error) = result {
            log::warn!(
                "Failed to save progress of download job {}: {}",
                self.job_id,
                error
            );
        }
    }
}

pub fn get_bundle_name(system_slug: &str, device_slug: Option<&str>, timestamp: &str) -> String {
    match device_slug {
        Some(device_slug) => format!("{}_{}_{}", system_slug, device_slug, timestamp),
        None => format!("{}_{}", system_slug, timestamp),
    }
}

pub async fn create_download_job(
    connection: &mut SqliteConnection,
    game_ids: &[i64],
    system_slug: &str,
    device_id: Option<i64>,
) -> Result<i64> {
    let game_ids = serde_json::to_string(game_ids)?;
    let job_id = create_download_job_record(
        connection,
        &game_ids,
        system_slug,
        device_id,
        Utc::now().timestamp(),
    )
    .await?;
    log::debug!("Created download job {}", job_id);
    Ok(job_id)
}

async fn bundle_download_job(
    connection: &mut SqliteConnection,
    pool: &SqlitePool,
    progress_bar: &ProgressBar,
    download_job: &DownloadJob,
) -> Result<()> {
    let game_ids: Vec<i64> = serde_json::from_str(&download_job.game_ids)?;
    let games = find_games_by_ids(connection, &game_ids).await?;
    update_download_job_start(connection, download_job.id, games.len() as i64).await?;

    let device = match download_job.device_id {
        Some(device_id) => find_device_by_id(connection, device_id).await?,
        None => None,
    };
    let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
    let bundle_name = get_bundle_name(
        &download_job.system_slug,
        device.as_ref().map(|device| device.slug.as_str()),
        &timestamp,
    );

    let mut progress_sink = JobProgressSink {
        pool: pool.clone(),
        job_id: download_job.id,
        last_progress: BundleProgress::default(),
    };
    let (zip_path, file_name) = create_multi_game_bundle(
        connection,
        progress_bar,
        &games,
        &bundle_name,
        &mut progress_sink,
        device.as_ref().map(|device| device as &dyn DeviceLayout),
    )
    .await?;

    let file_size = tokio::fs::metadata(&zip_path).await?.len() as i64;
    let progress = progress_sink.last_progress;
    let games_included = (progress.games_processed - progress.games_failed) as i64;
    let games_failed = games.len() as i64 - games_included;
    let now = Utc::now().timestamp();
    update_download_job_completed(
        connection,
        download_job.id,
        &zip_path.to_string_lossy(),
        &file_name,
        file_size,
        games_included,
        games_failed,
        now,
        now + DOWNLOAD_EXPIRY_SECONDS,
    )
    .await?;

    log::info!(
        "Download job {}: {} of {} games in \"{}\" ({} bytes)",
        download_job.id,
        games_included,
        games.len(),
        file_name,
        file_size
    );
    Ok(())
}

/// Builds the bundle of a download job and records the outcome on the job.
/// A completed job whose file is still around is returned as is.
pub async fn run_download_job(
    pool: &SqlitePool,
    progress_bar: &ProgressBar,
    job_id: i64,
) -> Result<DownloadJob> {
    let mut connection = acquire_connection(pool).await?;
    let download_job = find_download_job_by_id(&mut connection, job_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Download job with id {} not found", job_id)))?;

    if download_job.status() == Some(JobStatus::Completed)
        && Path::new(&download_job.file_path).is_file()
    {
        log::debug!("Download job {} is already completed", job_id);
        return Ok(download_job);
    }

    if let Err(error) = bundle_download_job(&mut connection, pool, progress_bar, &download_job).await
    {
        log::warn!("Download job {} failed: {}", job_id, error);
        let errors = serde_json::to_string(&[error.to_string()])?;
        update_download_job_failed(&mut connection, job_id, &errors, Utc::now().timestamp())
            .await?;
        return Err(error);
    }

    find_download_job_by_id(&mut connection, job_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Download job with id {} not found", job_id)))
}

/// Deletes expired bundles and their jobs, returns how many jobs went away.
pub async fn cleanup_expired_downloads(connection: &mut SqliteConnection) -> Result<usize> {
    let expired_jobs = find_expired_download_jobs(connection, Utc::now().timestamp()).await?;
    for download_job in &expired_jobs {
        let file_path = Path::new(&download_job.file_path);
        if !download_job.file_path.is_empty() && file_path.is_file() {
            if let Err(error) = remove_file(&file_path).await {
                log::warn!("{}", error);
            }
        }
        delete_download_job_by_id(connection, download_job.id).await?;
    }
    if !expired_jobs.is_empty() {
        log::info!("Cleaned up {} expired downloads", expired_jobs.len());
    }
    Ok(expired_jobs.len())
}
