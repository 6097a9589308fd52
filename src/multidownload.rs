use super::config::*;
use super::cover::*;
use super::database::*;
use super::device::*;
use super::download::*;
use super::error::{Error, Result};
use super::model::*;
use super::progress::*;
use super::scoring::*;
use super::util::*;
use indicatif::ProgressBar;
use sqlx::SqliteConnection;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Seek, Write};
use std::path::PathBuf;
use zip::ZipWriter;

#[cfg(test)]
mod test_multi_game_bundle_errors;

pub const MISSING_GAMES_HEADER: &str = "The following games could not be included:";

struct ResolvedFile {
    name: String,
    source: File,
    size: u64,
    _rom_file: RomFile,
}

/// Resolves and opens every rom of a rom set, a single missing rom skips
/// the whole game.
async fn resolve_rom_set_files(
    connection: &mut SqliteConnection,
    progress_bar: &ProgressBar,
    rom_set: &RomSet,
) -> Result<Vec<ResolvedFile>> {
    let roms = find_roms_by_rom_set_id(connection, rom_set.id).await?;
    let mut resolved_files: Vec<ResolvedFile> = Vec::new();
    for rom in &roms {
        let rom_file = get_rom_file(connection, progress_bar, rom).await?;
        let (source, size) = open_rom_file(&rom_file)?;
        resolved_files.push(ResolvedFile {
            name: get_disc_filename(&rom_file.file_name, rom.disc),
            source,
            size,
            _rom_file: rom_file,
        });
    }
    Ok(resolved_files)
}

async fn add_game_image<W: Write + Seek>(
    connection: &mut SqliteConnection,
    zip_writer: &mut ZipWriter<W>,
    entry_names: &mut EntryNames,
    device: &dyn DeviceLayout,
    game: &Game,
    system_slug: &str,
    rom_file_name: &str,
) -> Result<bool> {
    let image_path = match device.get_image_path(system_slug, rom_file_name) {
        Some(image_path) => image_path,
        None => return Ok(false),
    };
    let image_data = match prepare_image_for_device(
        connection,
        game.id,
        device.image_type(),
        device.image_max_width(),
    )
    .await
    {
        Ok(Some(image_data)) => image_data,
        Ok(None) => return Ok(false),
        Err(error) => {
            log::warn!("Failed to prepare image for \"{}\": {}", game.name, error);
            return Ok(false);
        }
    };
    let image_name = entry_names.get_unique_name(&image_path);
    if let Err(error) = write_zip_bytes(zip_writer, &image_name, &image_data) {
        log::warn!("Failed to add image for \"{}\": {}", game.name, error);
        return Ok(false);
    }
    Ok(true)
}

/// Bundles the best rom set of every game into one temp zip, one folder per
/// game unless a device layout says otherwise. Progress is reported after
/// each game.
pub async fn create_multi_game_bundle<S: ProgressSink>(
    connection: &mut SqliteConnection,
    progress_bar: &ProgressBar,
    games: &[Game],
    bundle_name: &str,
    progress_sink: &mut S,
    device: Option<&dyn DeviceLayout>,
) -> Result<(PathBuf, String)> {
    if games.is_empty() {
        return Err(Error::NoGamesProvided);
    }

    let region_priorities = RegionPriorities::load(connection).await?;
    let mut systems: HashMap<i64, System> = HashMap::new();
    let mut games_with_roms: Vec<(&Game, RomSet)> = Vec::new();
    for game in games {
        if let Some(rom_set) = get_best_romset(connection, &region_priorities, game).await? {
            if !systems.contains_key(&game.system_id) {
                let system = find_system_by_id(connection, game.system_id).await?;
                systems.insert(game.system_id, system);
            }
            games_with_roms.push((game, rom_set));
        }
    }
    if games_with_roms.is_empty() {
        return Err(Error::NoAvailableRoms);
    }

    let tmp_directory = get_tmp_directory(connection).await?;
    create_directory(&tmp_directory).await?;
    let (zip_file, zip_path) = create_tmp_file(&tmp_directory, ".zip")?.into_parts();
    let mut zip_writer = ZipWriter::new(zip_file);

    let mut progress = BundleProgress {
        total_games: games_with_roms.len(),
        ..Default::default()
    };
    let mut entry_names = EntryNames::default();
    let mut errors: Vec<String> = Vec::new();
    let mut added_files = 0;

    progress_bar.set_style(get_count_progress_style());
    progress_bar.set_length(games_with_roms.len() as u64);
    progress_bar.set_position(0);

    for (game, rom_set) in &games_with_roms {
        progress.current_game = game.name.clone();
        progress_bar.set_message(game.name.clone());

        let system_slug = systems
            .get(&game.system_id)
            .map(|system| system.slug.as_str())
            .unwrap_or_default();
        let game_folder = sanitize_filename(&game.name);

        match resolve_rom_set_files(connection, progress_bar, rom_set).await {
            Ok(mut resolved_files) => {
                let mut game_files = 0;
                for resolved_file in resolved_files.iter_mut() {
                    let zip_name = match device {
                        Some(device) => {
                            device.get_rom_path(system_slug, &game_folder, &resolved_file.name)
                        }
                        None => format!("{}/{}", game_folder, resolved_file.name),
                    };
                    let zip_name = entry_names.get_unique_name(&zip_name);
                    log::debug!("Adding \"{}\"", zip_name);
                    match write_zip_entry(
                        &mut zip_writer,
                        &zip_name,
                        &mut resolved_file.source,
                        resolved_file.size,
                    ) {
                        Ok(bytes_written) => {
                            progress.bytes_written += bytes_written;
                            game_files += 1;
                        }
                        Err(error) => {
                            log::warn!("Skipping \"{}\": {}", zip_name, error);
                            errors.push(format!(
                                "{}: {}: {}",
                                game.name, resolved_file.name, error
                            ));
                        }
                    }
                }
                added_files += game_files;
                if game_files == 0 {
                    progress_bar.println(format!("Skipping \"{}\"", game.name));
                    progress.games_failed += 1;
                }
                if let (Some(device), Some(first_file), true) =
                    (device, resolved_files.first(), game_files > 0)
                {
                    if device.include_images()
                        && add_game_image(
                            connection,
                            &mut zip_writer,
                            &mut entry_names,
                            device,
                            game,
                            system_slug,
                            &first_file.name,
                        )
                        .await?
                    {
                        progress.images_added += 1;
                    }
                }
            }
            Err(error) => {
                log::warn!("Skipping \"{}\": {}", game.name, error);
                progress_bar.println(format!("Skipping \"{}\": {}", game.name, error));
                errors.push(format!("{}: {}", game.name, error));
                progress.games_failed += 1;
            }
        }

        progress.games_processed += 1;
        progress_bar.inc(1);
        progress_sink.report(&progress).await;
    }

    progress_bar.set_message("");
    progress_bar.finish_and_clear();

    if added_files == 0 {
        return Err(Error::AllGamesMissing(errors));
    }

    if !errors.is_empty() {
        write_missing_files(
            &mut zip_writer,
            &mut entry_names,
            MISSING_GAMES_HEADER,
            &errors,
        );
    }
    zip_writer.finish()?;

    let zip_path = zip_path.keep().map_err(|error| Error::Io(error.error))?;

    log::info!(
        "Bundled {} of {} games into {}",
        progress.games_processed - progress.games_failed,
        progress.total_games,
        zip_path.display()
    );

    Ok((zip_path, format!("{}.zip", bundle_name)))
}
