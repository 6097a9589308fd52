use super::archive::*;
use super::config::*;
use super::database::*;
use super::error::{Error, Result};
use super::model::*;
use super::util::*;
use indicatif::ProgressBar;
use sqlx::SqliteConnection;
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, Seek, Write};
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};


pub const MISSING_FILES_NAME: &str = "missing_files.txt";
pub const MISSING_FILES_HEADER: &str = "The following files could not be included:";
const ZIP64_THRESHOLD: u64 = u32::MAX as u64;

/// A rom resolved to a readable file. Extracted copies are deleted on drop.
#[derive(Debug)]
pub struct RomFile {
    pub path: PathBuf,
    pub file_name: String,
    tmp_path: Option<TempPath>,
}

impl RomFile {
    pub fn is_temporary(&self) -> bool {
        self.tmp_path.is_some()
    }
}

pub async fn is_single_rom_archive(connection: &mut SqliteConnection, rom: &Rom) -> Result<bool> {
    if !rom.is_archived() {
        return Ok(false);
    }
    Ok(count_roms_by_archive_path(connection, &rom.archive_path).await? == 1)
}

async fn get_loose_rom_file(connection: &mut SqliteConnection, rom: &Rom) -> Result<RomFile> {
    let path = to_absolute_path(connection, &rom.file_path).await?;
    if !path.is_file() {
        return Err(Error::NotFound(format!(
            "ROM file not found: {}",
            path.display()
        )));
    }
    Ok(RomFile {
        path,
        file_name: rom.file_name.clone(),
        tmp_path: None,
    })
}

/// Resolves a rom to a plain file, extracting archived roms to a temp file.
pub async fn get_rom_file(
    connection: &mut SqliteConnection,
    progress_bar: &ProgressBar,
    rom: &Rom,
) -> Result<RomFile> {
    if !rom.is_archived() {
        return get_loose_rom_file(connection, rom).await;
    }

    let archive_path = to_absolute_path(connection, &rom.archive_path).await?;
    let tmp_directory = get_tmp_directory(connection).await?;
    create_directory(&tmp_directory).await?;

    let suffix = match Path::new(&rom.path_in_archive).extension() {
        Some(extension) => format!(".{}", extension.to_string_lossy()),
        None => String::new(),
    };
    let tmp_path = create_tmp_file(&tmp_directory, &suffix)?.into_temp_path();

    extract_file_from_archive(progress_bar, &archive_path, &rom.path_in_archive, &tmp_path)
        .await?;

    Ok(RomFile {
        path: tmp_path.to_path_buf(),
        file_name: rom.member_name().to_string(),
        tmp_path: Some(tmp_path),
    })
}

/// Serves 1:1 archives as they are, extracts from shared archives.
pub async fn get_rom_file_as_stored(
    connection: &mut SqliteConnection,
    progress_bar: &ProgressBar,
    rom: &Rom,
) -> Result<RomFile> {
    if !rom.is_archived() {
        return get_loose_rom_file(connection, rom).await;
    }
    if is_single_rom_archive(connection, rom).await? {
        let archive_path = to_absolute_path(connection, &rom.archive_path).await?;
        if !archive_path.is_file() {
            return Err(Error::NotFound(format!(
                "Archive not found: {}",
                archive_path.display()
            )));
        }
        return Ok(RomFile {
            file_name: get_file_name(&archive_path),
            path: archive_path,
            tmp_path: None,
        });
    }
    get_rom_file(connection, progress_bar, rom).await
}

pub fn get_romset_bundle_filename(game: &Game) -> String {
    format!("{}.zip", game.name)
}

pub(crate) fn open_rom_file(rom_file: &RomFile) -> Result<(File, u64)> {
    let file = File::open(&rom_file.path).map_err(|error| match error.kind() {
        io::ErrorKind::NotFound => Error::NotFound(format!(
            "ROM file not found: {}",
            rom_file.path.display()
        )),
        _ => Error::Io(error),
    })?;
    let size = file.metadata()?.len();
    Ok((file, size))
}

pub(crate) fn get_zip_file_options(size: u64) -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(size >= ZIP64_THRESHOLD)
}

/// Entry names already handed out for one zip. Taken names get a ` (2)`,
/// ` (3)`... suffix before their extension.
#[derive(Debug, Default)]
pub struct EntryNames {
    names: HashSet<String>,
}

impl EntryNames {
    pub fn get_unique_name(&mut self, name: &str) -> String {
        let mut unique_name = name.to_string();
        let mut counter = 2;
        while !self.names.insert(unique_name.clone()) {
            unique_name = get_numbered_name(name, counter);
            counter += 1;
        }
        unique_name
    }
}

fn get_numbered_name(name: &str, counter: usize) -> String {
    let (directory, file_name) = match name.rsplit_once('/') {
        Some((directory, file_name)) => (Some(directory), file_name),
        None => (None, name),
    };
    let numbered_name = match file_name.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() => {
            format!("{} ({}).{}", stem, counter, extension)
        }
        _ => format!("{} ({})", file_name, counter),
    };
    match directory {
        Some(directory) => format!("{}/{}", directory, numbered_name),
        None => numbered_name,
    }
}

fn finish_zip_entry<W: Write + Seek, T>(
    zip_writer: &mut ZipWriter<W>,
    result: io::Result<T>,
) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(error) => {
            zip_writer.abort_file()?;
            Err(Error::Io(error))
        }
    }
}

/// Streams an already opened source into a new zip entry. A failed entry is
/// dropped from the archive and the error is returned for the caller to skip.
pub(crate) fn write_zip_entry<W: Write + Seek>(
    zip_writer: &mut ZipWriter<W>,
    name: &str,
    source: &mut File,
    size: u64,
) -> Result<u64> {
    zip_writer.start_file(name, get_zip_file_options(size))?;
    let result = io::copy(source, zip_writer);
    finish_zip_entry(zip_writer, result)
}

pub(crate) fn write_zip_bytes<W: Write + Seek>(
    zip_writer: &mut ZipWriter<W>,
    name: &str,
    data: &[u8],
) -> Result<()> {
    zip_writer.start_file(name, get_zip_file_options(data.len() as u64))?;
    let result = zip_writer.write_all(data);
    finish_zip_entry(zip_writer, result)
}

/// Appends the list of skipped entries, a failure here only loses the list.
pub(crate) fn write_missing_files<W: Write + Seek>(
    zip_writer: &mut ZipWriter<W>,
    entry_names: &mut EntryNames,
    header: &str,
    errors: &[String],
) {
    let content = format!("{}\n\n{}", header, errors.join("\n"));
    let name = entry_names.get_unique_name(MISSING_FILES_NAME);
    if let Err(error) = write_zip_bytes(zip_writer, &name, content.as_bytes()) {
        log::warn!("Failed to add \"{}\": {}", name, error);
    }
}

/// Bundles every rom of a rom set into a temp zip, returns its path and a
/// suggested download name. Missing roms are listed in `missing_files.txt`.
pub async fn create_romset_bundle(
    connection: &mut SqliteConnection,
    progress_bar: &ProgressBar,
    rom_set_id: i64,
) -> Result<(PathBuf, String)> {
    let rom_set = find_rom_set_by_id(connection, rom_set_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("ROMSet with id {} not found", rom_set_id)))?;
    let game = find_game_by_id(connection, rom_set.game_id).await?;
    let roms = find_roms_by_rom_set_id(connection, rom_set.id).await?;
    if roms.is_empty() {
        return Err(Error::EmptyRomSet(format!("{} ({})", game.name, rom_set.region)));
    }

    let tmp_directory = get_tmp_directory(connection).await?;
    create_directory(&tmp_directory).await?;
    let (zip_file, zip_path) = create_tmp_file(&tmp_directory, ".zip")?.into_parts();
    let mut zip_writer = ZipWriter::new(zip_file);

    progress_bar.println(format!("Bundling \"{}\"", game.name));

    let mut entry_names = EntryNames::default();
    let mut errors: Vec<String> = Vec::new();
    let mut added_files = 0;

    for rom in &roms {
        let resolved = match get_rom_file(connection, progress_bar, rom).await {
            Ok(rom_file) => open_rom_file(&rom_file).map(|opened| (rom_file, opened)),
            Err(error) => Err(error),
        };
        let written = match resolved {
            Ok((rom_file, (mut source, size))) => {
                let name =
                    entry_names.get_unique_name(&get_disc_filename(&rom_file.file_name, rom.disc));
                log::debug!("Adding \"{}\" as \"{}\"", rom_file.path.display(), name);
                write_zip_entry(&mut zip_writer, &name, &mut source, size)
            }
            Err(error) => Err(error),
        };
        match written {
            Ok(_) => added_files += 1,
            Err(error) => {
                log::warn!("Skipping \"{}\": {}", rom.file_name, error);
                progress_bar.println(format!("Skipping \"{}\": {}", rom.file_name, error));
                errors.push(format!("{}: {}", rom.file_name, error));
            }
        }
    }

    if added_files == 0 {
        return Err(Error::AllFilesMissing(errors));
    }

    if !errors.is_empty() {
        write_missing_files(&mut zip_writer, &mut entry_names, MISSING_FILES_HEADER, &errors);
    }
    zip_writer.finish()?;

    let zip_path = zip_path.keep().map_err(|error| Error::Io(error.error))?;

    Ok((zip_path, get_romset_bundle_filename(&game)))
}
