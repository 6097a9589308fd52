use super::model::*;
use simple_error::SimpleResult;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteConnection, SqliteJournalMode, SqlitePool, SqlitePoolOptions,
    SqliteSynchronous,
};
use sqlx::Executor;
use std::collections::HashMap;
use std::str::FromStr;

static MIGRATOR: Migrator = sqlx::migrate!();

pub async fn establish_connection(url: &str) -> SimpleResult<SqlitePool> {
    let options = try_with!(
        SqliteConnectOptions::from_str(url),
        "Failed to parse database url {}",
        url
    )
    .create_if_missing(true)
    .foreign_keys(true)
    .journal_mode(SqliteJournalMode::Wal)
    .synchronous(SqliteSynchronous::Normal);

    let pool = try_with!(
        SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(5)
            .connect_with(options)
            .await,
        "Error connecting to {}",
        url
    );

    try_with!(
        MIGRATOR.run(&pool).await,
        "Failed to run database migrations"
    );

    Ok(pool)
}

pub async fn close_connection(pool: &SqlitePool) -> SimpleResult<()> {
    try_with!(
        pool.execute(
            "
            PRAGMA optimize;
            PRAGMA wal_checkpoint(truncate);
            ",
        )
        .await,
        "Failed to optimize the database"
    );
    pool.close().await;
    Ok(())
}

pub async fn create_system(
    connection: &mut SqliteConnection,
    name: &str,
    slug: &str,
) -> SimpleResult<i64> {
    let id = try_with!(
        sqlx::query(
            "
            INSERT INTO systems (name, slug)
            VALUES (?, ?)
            ",
        )
        .bind(name)
        .bind(slug)
        .execute(connection)
        .await,
        "Error while creating system {}",
        name
    )
    .last_insert_rowid();
    Ok(id)
}

pub async fn find_system_by_id(connection: &mut SqliteConnection, id: i64) -> SimpleResult<System> {
    let system = try_with!(
        sqlx::query_as::<_, System>(
            "
            SELECT *
            FROM systems
            WHERE id = ?
            ",
        )
        .bind(id)
        .fetch_one(connection)
        .await,
        "Error while finding system with id {}",
        id
    );
    Ok(system)
}

pub async fn create_game(
    connection: &mut SqliteConnection,
    name: &str,
    system_id: i64,
) -> SimpleResult<i64> {
    let id = try_with!(
        sqlx::query(
            "
            INSERT INTO games (name, system_id)
            VALUES (?, ?)
            ",
        )
        .bind(name)
        .bind(system_id)
        .execute(connection)
        .await,
        "Error while creating game {}",
        name
    )
    .last_insert_rowid();
    Ok(id)
}

pub async fn find_game_by_id(connection: &mut SqliteConnection, id: i64) -> SimpleResult<Game> {
    let game = try_with!(
        sqlx::query_as::<_, Game>(
            "
            SELECT *
            FROM games
            WHERE id = ?
            ",
        )
        .bind(id)
        .fetch_one(connection)
        .await,
        "Error while finding game with id {}",
        id
    );
    Ok(game)
}

pub async fn find_games_by_ids(
    connection: &mut SqliteConnection,
    ids: &[i64],
) -> SimpleResult<Vec<Game>> {
    let ids = try_with!(serde_json::to_string(ids), "Failed to serialize game ids");
    let games = try_with!(
        sqlx::query_as::<_, Game>(
            "
            SELECT *
            FROM games
            WHERE id IN (SELECT value FROM json_each(?))
            ORDER BY name, id
            ",
        )
        .bind(&ids)
        .fetch_all(connection)
        .await,
        "Error while finding games with ids {}",
        ids
    );
    Ok(games)
}

pub async fn find_games_by_system_slug_and_default(
    connection: &mut SqliteConnection,
    system_slug: Option<&str>,
    without_default_only: bool,
) -> SimpleResult<Vec<Game>> {
    let games = try_with!(
        sqlx::query_as::<_, Game>(
            "
            SELECT g.*
            FROM games AS g
            JOIN systems AS s ON g.system_id = s.id
            WHERE (?1 IS NULL OR s.slug = ?1)
            AND (?2 = 0 OR g.default_rom_set_id IS NULL)
            ORDER BY g.id
            ",
        )
        .bind(system_slug)
        .bind(without_default_only)
        .fetch_all(connection)
        .await,
        "Error while finding games"
    );
    Ok(games)
}

pub async fn update_game_default_rom_set(
    connection: &mut SqliteConnection,
    id: i64,
    default_rom_set_id: Option<i64>,
) -> SimpleResult<()> {
    try_with!(
        sqlx::query(
            "
            UPDATE games
            SET default_rom_set_id = ?
            WHERE id = ?
            ",
        )
        .bind(default_rom_set_id)
        .bind(id)
        .execute(connection)
        .await,
        "Error while updating game with id {}",
        id
    );
    Ok(())
}

pub async fn delete_game_by_id(connection: &mut SqliteConnection, id: i64) -> SimpleResult<()> {
    try_with!(
        sqlx::query(
            "
            DELETE FROM games
            WHERE id = ?
            ",
        )
        .bind(id)
        .execute(connection)
        .await,
        "Error while deleting game with id {}",
        id
    );
    Ok(())
}

pub async fn create_rom_set(
    connection: &mut SqliteConnection,
    game_id: i64,
    region: &str,
    revision: &str,
    source_path: &str,
) -> SimpleResult<i64> {
    let id = try_with!(
        sqlx::query(
            "
            INSERT INTO rom_sets (game_id, region, revision, source_path)
            VALUES (?, ?, ?, ?)
            ",
        )
        .bind(game_id)
        .bind(region)
        .bind(revision)
        .bind(source_path)
        .execute(connection)
        .await,
        "Error while creating rom set for game with id {}",
        game_id
    )
    .last_insert_rowid();
    Ok(id)
}

pub async fn find_rom_set_by_id(
    connection: &mut SqliteConnection,
    id: i64,
) -> SimpleResult<Option<RomSet>> {
    let rom_set = try_with!(
        sqlx::query_as::<_, RomSet>(
            "
            SELECT *
            FROM rom_sets
            WHERE id = ?
            ",
        )
        .bind(id)
        .fetch_optional(connection)
        .await,
        "Error while finding rom set with id {}",
        id
    );
    Ok(rom_set)
}

pub async fn find_rom_sets_by_game_id(
    connection: &mut SqliteConnection,
    game_id: i64,
) -> SimpleResult<Vec<RomSet>> {
    let rom_sets = try_with!(
        sqlx::query_as::<_, RomSet>(
            "
            SELECT *
            FROM rom_sets
            WHERE game_id = ?
            ORDER BY id
            ",
        )
        .bind(game_id)
        .fetch_all(connection)
        .await,
        "Error while finding rom sets for game with id {}",
        game_id
    );
    Ok(rom_sets)
}

pub async fn find_rom_set_by_game_id_and_region_and_revision(
    connection: &mut SqliteConnection,
    game_id: i64,
    region: &str,
    revision: &str,
) -> SimpleResult<Option<RomSet>> {
    let rom_set = try_with!(
        sqlx::query_as::<_, RomSet>(
            "
            SELECT *
            FROM rom_sets
            WHERE game_id = ?
            AND region = ?
            AND revision = ?
            ORDER BY id
            LIMIT 1
            ",
        )
        .bind(game_id)
        .bind(region)
        .bind(revision)
        .fetch_optional(connection)
        .await,
        "Error while finding rom set {} {} for game with id {}",
        region,
        revision,
        game_id
    );
    Ok(rom_set)
}

pub async fn find_rom_set_regions(connection: &mut SqliteConnection) -> SimpleResult<Vec<String>> {
    let regions = try_with!(
        sqlx::query_scalar::<_, String>(
            "
            SELECT region
            FROM rom_sets
            WHERE region != ''
            GROUP BY region
            ORDER BY MIN(id)
            ",
        )
        .fetch_all(connection)
        .await,
        "Error while finding rom set regions"
    );
    Ok(regions)
}

pub async fn update_rom_set_game_and_revision(
    connection: &mut SqliteConnection,
    id: i64,
    game_id: i64,
    revision: &str,
) -> SimpleResult<()> {
    try_with!(
        sqlx::query(
            "
            UPDATE rom_sets
            SET game_id = ?, revision = ?
            WHERE id = ?
            ",
        )
        .bind(game_id)
        .bind(revision)
        .bind(id)
        .execute(connection)
        .await,
        "Error while updating rom set with id {}",
        id
    );
    Ok(())
}

pub async fn delete_rom_set_by_id(connection: &mut SqliteConnection, id: i64) -> SimpleResult<()> {
    try_with!(
        sqlx::query(
            "
            DELETE FROM rom_sets
            WHERE id = ?
            ",
        )
        .bind(id)
        .execute(connection)
        .await,
        "Error while deleting rom set with id {}",
        id
    );
    Ok(())
}

pub async fn create_rom(
    connection: &mut SqliteConnection,
    rom_set_id: i64,
    rom_input: &RomInput<'_>,
) -> SimpleResult<i64> {
    let id = try_with!(
        sqlx::query(
            "
            INSERT INTO roms (rom_set_id, file_path, file_name, file_size, archive_path, path_in_archive, crc32, sha1, content_type, disc)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(rom_set_id)
        .bind(rom_input.file_path)
        .bind(rom_input.file_name)
        .bind(rom_input.file_size)
        .bind(rom_input.archive_path)
        .bind(rom_input.path_in_archive)
        .bind(rom_input.crc32)
        .bind(rom_input.sha1)
        .bind(rom_input.content_type)
        .bind(rom_input.disc)
        .execute(connection)
        .await,
        "Error while creating rom {}",
        rom_input.file_name
    )
    .last_insert_rowid();
    Ok(id)
}

pub async fn find_rom_by_id(connection: &mut SqliteConnection, id: i64) -> SimpleResult<Option<Rom>> {
    let rom = try_with!(
        sqlx::query_as::<_, Rom>(
            "
            SELECT *
            FROM roms
            WHERE id = ?
            ",
        )
        .bind(id)
        .fetch_optional(connection)
        .await,
        "Error while finding rom with id {}",
        id
    );
    Ok(rom)
}

pub async fn find_roms_by_rom_set_id(
    connection: &mut SqliteConnection,
    rom_set_id: i64,
) -> SimpleResult<Vec<Rom>> {
    let roms = try_with!(
        sqlx::query_as::<_, Rom>(
            "
            SELECT *
            FROM roms
            WHERE rom_set_id = ?
            ORDER BY disc, file_name, id
            ",
        )
        .bind(rom_set_id)
        .fetch_all(connection)
        .await,
        "Error while finding roms for rom set with id {}",
        rom_set_id
    );
    Ok(roms)
}

pub async fn find_roms_by_game_id(
    connection: &mut SqliteConnection,
    game_id: i64,
) -> SimpleResult<Vec<Rom>> {
    let roms = try_with!(
        sqlx::query_as::<_, Rom>(
            "
            SELECT r.*
            FROM roms AS r
            JOIN rom_sets AS rs ON r.rom_set_id = rs.id
            WHERE rs.game_id = ?
            ORDER BY r.disc, r.file_name, r.id
            ",
        )
        .bind(game_id)
        .fetch_all(connection)
        .await,
        "Error while finding roms for game with id {}",
        game_id
    );
    Ok(roms)
}

pub async fn count_roms_by_archive_path(
    connection: &mut SqliteConnection,
    archive_path: &str,
) -> SimpleResult<i64> {
    let count = try_with!(
        sqlx::query_scalar::<_, i64>(
            "
            SELECT COUNT(*)
            FROM roms
            WHERE archive_path = ?
            ",
        )
        .bind(archive_path)
        .fetch_one(connection)
        .await,
        "Error while counting roms in archive {}",
        archive_path
    );
    Ok(count)
}

/// Counts, system-wide, the rom rows referencing each archive used by a game.
pub async fn find_archive_rom_counts_by_game_id(
    connection: &mut SqliteConnection,
    game_id: i64,
) -> SimpleResult<HashMap<String, i64>> {
    let counts = try_with!(
        sqlx::query_as::<_, (String, i64)>(
            "
            SELECT archive_path, COUNT(*)
            FROM roms
            WHERE archive_path IN (
                SELECT r.archive_path
                FROM roms AS r
                JOIN rom_sets AS rs ON r.rom_set_id = rs.id
                WHERE rs.game_id = ?
                AND r.archive_path != ''
            )
            GROUP BY archive_path
            ",
        )
        .bind(game_id)
        .fetch_all(connection)
        .await,
        "Error while counting archived roms for game with id {}",
        game_id
    );
    Ok(counts.into_iter().collect())
}

pub async fn update_roms_rom_set_id(
    connection: &mut SqliteConnection,
    old_rom_set_id: i64,
    new_rom_set_id: i64,
) -> SimpleResult<u64> {
    let rows = try_with!(
        sqlx::query(
            "
            UPDATE roms
            SET rom_set_id = ?
            WHERE rom_set_id = ?
            ",
        )
        .bind(new_rom_set_id)
        .bind(old_rom_set_id)
        .execute(connection)
        .await,
        "Error while moving roms from rom set with id {}",
        old_rom_set_id
    )
    .rows_affected();
    Ok(rows)
}

pub async fn create_game_image(
    connection: &mut SqliteConnection,
    game_id: i64,
    file_path: &str,
    file_name: &str,
    image_type: &str,
) -> SimpleResult<i64> {
    let id = try_with!(
        sqlx::query(
            "
            INSERT INTO game_images (game_id, file_path, file_name, image_type)
            VALUES (?, ?, ?, ?)
            ",
        )
        .bind(game_id)
        .bind(file_path)
        .bind(file_name)
        .bind(image_type)
        .execute(connection)
        .await,
        "Error while creating image {}",
        file_path
    )
    .last_insert_rowid();
    Ok(id)
}

pub async fn find_game_images_by_game_id(
    connection: &mut SqliteConnection,
    game_id: i64,
) -> SimpleResult<Vec<GameImage>> {
    let images = try_with!(
        sqlx::query_as::<_, GameImage>(
            "
            SELECT *
            FROM game_images
            WHERE game_id = ?
            ORDER BY image_type, file_name
            ",
        )
        .bind(game_id)
        .fetch_all(connection)
        .await,
        "Error while finding images for game with id {}",
        game_id
    );
    Ok(images)
}

pub async fn update_game_image_game_id(
    connection: &mut SqliteConnection,
    id: i64,
    game_id: i64,
) -> SimpleResult<()> {
    try_with!(
        sqlx::query(
            "
            UPDATE game_images
            SET game_id = ?
            WHERE id = ?
            ",
        )
        .bind(game_id)
        .bind(id)
        .execute(connection)
        .await,
        "Error while updating image with id {}",
        id
    );
    Ok(())
}

pub async fn delete_game_image_by_id(connection: &mut SqliteConnection, id: i64) -> SimpleResult<()> {
    try_with!(
        sqlx::query(
            "
            DELETE FROM game_images
            WHERE id = ?
            ",
        )
        .bind(id)
        .execute(connection)
        .await,
        "Error while deleting image with id {}",
        id
    );
    Ok(())
}

pub async fn create_setting(
    connection: &mut SqliteConnection,
    key: &str,
    value: Option<&str>,
) -> SimpleResult<()> {
    try_with!(
        sqlx::query(
            "
            INSERT INTO settings (key, value)
            VALUES (?, ?)
            ",
        )
        .bind(key)
        .bind(value)
        .execute(connection)
        .await,
        "Error while creating setting {}",
        key
    );
    Ok(())
}

pub async fn update_setting(
    connection: &mut SqliteConnection,
    id: i64,
    value: Option<&str>,
) -> SimpleResult<()> {
    try_with!(
        sqlx::query(
            "
            UPDATE settings
            SET value = ?
            WHERE id = ?
            ",
        )
        .bind(value)
        .bind(id)
        .execute(connection)
        .await,
        "Error while updating setting with id {}",
        id
    );
    Ok(())
}

pub async fn find_settings(connection: &mut SqliteConnection) -> SimpleResult<Vec<Setting>> {
    let settings = try_with!(
        sqlx::query_as::<_, Setting>(
            "
            SELECT *
            FROM settings
            ORDER BY key
            ",
        )
        .fetch_all(connection)
        .await,
        "Error while finding settings"
    );
    Ok(settings)
}

pub async fn find_setting_by_key(
    connection: &mut SqliteConnection,
    key: &str,
) -> SimpleResult<Option<Setting>> {
    let setting = try_with!(
        sqlx::query_as::<_, Setting>(
            "
            SELECT *
            FROM settings
            WHERE key = ?
            ",
        )
        .bind(key)
        .fetch_optional(connection)
        .await,
        "Error while finding setting with key {}",
        key
    );
    Ok(setting)
}

/// Fields needed to insert a device row.
#[derive(Clone, Debug, Default)]
pub struct DeviceInput<'a> {
    pub name: &'a str,
    pub slug: &'a str,
    pub root_path: &'a str,
    pub system_paths: &'a str,
    pub include_images: bool,
    pub image_type: &'a str,
    pub image_path_template: &'a str,
    pub image_max_width: Option<i64>,
}

pub async fn create_device(
    connection: &mut SqliteConnection,
    device_input: &DeviceInput<'_>,
) -> SimpleResult<i64> {
    let id = try_with!(
        sqlx::query(
            "
            INSERT INTO devices (name, slug, root_path, system_paths, include_images, image_type, image_path_template, image_max_width)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(device_input.name)
        .bind(device_input.slug)
        .bind(device_input.root_path)
        .bind(device_input.system_paths)
        .bind(device_input.include_images)
        .bind(device_input.image_type)
        .bind(device_input.image_path_template)
        .bind(device_input.image_max_width)
        .execute(connection)
        .await,
        "Error while creating device {}",
        device_input.name
    )
    .last_insert_rowid();
    Ok(id)
}

pub async fn find_device_by_id(
    connection: &mut SqliteConnection,
    id: i64,
) -> SimpleResult<Option<Device>> {
    let device = try_with!(
        sqlx::query_as::<_, Device>(
            "
            SELECT *
            FROM devices
            WHERE id = ?
            ",
        )
        .bind(id)
        .fetch_optional(connection)
        .await,
        "Error while finding device with id {}",
        id
    );
    Ok(device)
}

pub async fn create_download_job_record(
    connection: &mut SqliteConnection,
    game_ids: &str,
    system_slug: &str,
    device_id: Option<i64>,
    created_at: i64,
) -> SimpleResult<i64> {
    let id = try_with!(
        sqlx::query(
            "
            INSERT INTO download_jobs (status, game_ids, system_slug, device_id, created_at)
            VALUES (?, ?, ?, ?, ?)
            ",
        )
        .bind(JobStatus::Pending.to_string())
        .bind(game_ids)
        .bind(system_slug)
        .bind(device_id)
        .bind(created_at)
        .execute(connection)
        .await,
        "Error while creating download job for {}",
        system_slug
    )
    .last_insert_rowid();
    Ok(id)
}

pub async fn find_download_job_by_id(
    connection: &mut SqliteConnection,
    id: i64,
) -> SimpleResult<Option<DownloadJob>> {
    let download_job = try_with!(
        sqlx::query_as::<_, DownloadJob>(
            "
            SELECT *
            FROM download_jobs
            WHERE id = ?
            ",
        )
        .bind(id)
        .fetch_optional(connection)
        .await,
        "Error while finding download job with id {}",
        id
    );
    Ok(download_job)
}

pub async fn update_download_job_start(
    connection: &mut SqliteConnection,
    id: i64,
    games_total: i64,
) -> SimpleResult<()> {
    try_with!(
        sqlx::query(
            "
            UPDATE download_jobs
            SET status = ?, games_total = ?, games_processed = 0, current_game = '', bytes_written = 0, errors = '[]'
            WHERE id = ?
            ",
        )
        .bind(JobStatus::Running.to_string())
        .bind(games_total)
        .bind(id)
        .execute(connection)
        .await,
        "Error while starting download job with id {}",
        id
    );
    Ok(())
}

pub async fn update_download_job_progress(
    connection: &mut SqliteConnection,
    id: i64,
    games_processed: i64,
    current_game: &str,
    bytes_written: i64,
) -> SimpleResult<()> {
    try_with!(
        sqlx::query(
            "
            UPDATE download_jobs
            SET games_processed = ?, current_game = ?, bytes_written = ?
            WHERE id = ?
            ",
        )
        .bind(games_processed)
        .bind(current_game)
        .bind(bytes_written)
        .bind(id)
        .execute(connection)
        .await,
        "Error while updating progress of download job with id {}",
        id
    );
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub async fn update_download_job_completed(
    connection: &mut SqliteConnection,
    id: i64,
    file_path: &str,
    file_name: &str,
    file_size: i64,
    games_included: i64,
    games_failed: i64,
    completed_at: i64,
    expires_at: i64,
) -> SimpleResult<()> {
    try_with!(
        sqlx::query(
            "
            UPDATE download_jobs
            SET status = ?, file_path = ?, file_name = ?, file_size = ?, games_included = ?, games_failed = ?, completed_at = ?, expires_at = ?
            WHERE id = ?
            ",
        )
        .bind(JobStatus::Completed.to_string())
        .bind(file_path)
        .bind(file_name)
        .bind(file_size)
        .bind(games_included)
        .bind(games_failed)
        .bind(completed_at)
        .bind(expires_at)
        .bind(id)
        .execute(connection)
        .await,
        "Error while completing download job with id {}",
        id
    );
    Ok(())
}

pub async fn update_download_job_failed(
    connection: &mut SqliteConnection,
    id: i64,
    errors: &str,
    completed_at: i64,
) -> SimpleResult<()> {
    try_with!(
        sqlx::query(
            "
            UPDATE download_jobs
            SET status = ?, errors = ?, completed_at = ?
            WHERE id = ?
            ",
        )
        .bind(JobStatus::Failed.to_string())
        .bind(errors)
        .bind(completed_at)
        .bind(id)
        .execute(connection)
        .await,
        "Error while failing download job with id {}",
        id
    );
    Ok(())
}

pub async fn find_expired_download_jobs(
    connection: &mut SqliteConnection,
    now: i64,
) -> SimpleResult<Vec<DownloadJob>> {
    let download_jobs = try_with!(
        sqlx::query_as::<_, DownloadJob>(
            "
            SELECT *
            FROM download_jobs
            WHERE expires_at < ?
            ORDER BY id
            ",
        )
        .bind(now)
        .fetch_all(connection)
        .await,
        "Error while finding expired download jobs"
    );
    Ok(download_jobs)
}

pub async fn delete_download_job_by_id(connection: &mut SqliteConnection, id: i64) -> SimpleResult<()> {
    try_with!(
        sqlx::query(
            "
            DELETE FROM download_jobs
            WHERE id = ?
            ",
        )
        .bind(id)
        .execute(connection)
        .await,
        "Error while deleting download job with id {}",
        id
    );
    Ok(())
}
