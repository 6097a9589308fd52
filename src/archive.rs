use super::error::{Error, Result};
use super::progress::*;
use super::util::*;
use indicatif::ProgressBar;
use std::ffi::OsStr;
use std::fs::File;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::process::Output;
use std::str::FromStr;
use std::time::Duration;
use strum::{Display, EnumString};
use tempfile::TempDir;
use tokio::process::Command;
use zip::ZipArchive;
use zip::result::ZipError;

#[cfg(test)]
mod test_list_sevenzip_failure;
#[cfg(test)]
mod test_list_zip;

pub const SEVENZIP_EXECUTABLES: &[&str] = &["7zz", "7z"];

#[derive(Clone, Copy, Debug, Display, EnumString, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum ArchiveType {
    #[strum(serialize = "7z")]
    Sevenzip,
    Zip,
}

impl ArchiveType {
    pub fn from_path<P: AsRef<Path>>(path: &P) -> Result<ArchiveType> {
        let extension = get_extension(path);
        ArchiveType::from_str(&extension)
            .map_err(|_| Error::UnsupportedArchive(format!(".{}", extension)))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub size: u64,
    pub crc: String,
}

pub fn is_archive_file<P: AsRef<Path>>(path: &P) -> bool {
    ArchiveType::from_path(path).is_ok()
}

/// Rejects member paths that would land outside of the extraction directory.
pub fn validate_member_path(member: &str) -> Result<()> {
    let escapes = Path::new(member).components().any(|component| {
        matches!(
            component,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if escapes || member.is_empty() {
        return Err(Error::ZipSlip(member.to_string()));
    }
    Ok(())
}

fn open_zip_archive(archive_path: &Path) -> Result<ZipArchive<File>> {
    let archive_file = File::open(archive_path).map_err(|error| match error.kind() {
        io::ErrorKind::NotFound => Error::NotFound(format!("Archive not found: {:?}", archive_path)),
        _ => Error::Io(error),
    })?;
    Ok(ZipArchive::new(archive_file)?)
}

pub async fn list_archive_contents<P: AsRef<Path>>(
    progress_bar: &ProgressBar,
    archive_path: &P,
) -> Result<Vec<ArchiveEntry>> {
    let archive_path = archive_path.as_ref();
    let archive_type = ArchiveType::from_path(&archive_path)?;
    if !archive_path.is_file() {
        return Err(Error::NotFound(format!(
            "Archive not found: {:?}",
            archive_path
        )));
    }

    match archive_type {
        ArchiveType::Zip => {
            let mut archive = open_zip_archive(archive_path)?;
            let mut entries: Vec<ArchiveEntry> = Vec::new();
            for i in 0..archive.len() {
                let file = archive.by_index(i)?;
                if file.is_dir() {
                    continue;
                }
                entries.push(ArchiveEntry {
                    name: file.name().to_string(),
                    size: file.size(),
                    crc: format!("{:08x}", file.crc32()),
                });
            }
            Ok(entries)
        }
        ArchiveType::Sevenzip => parse_sevenzip_archive(progress_bar, archive_path).await,
    }
}

async fn execute_sevenzip(args: &[&OsStr], current_dir: Option<&Path>) -> Result<Output> {
    let mut command = Command::new(get_executable_path(SEVENZIP_EXECUTABLES)?);
    command.args(args);
    if let Some(current_dir) = current_dir {
        command.current_dir(current_dir);
    }

    log::debug!("{:?}", command);

    let output = command.output().await?;
    if !output.status.success() {
        return Err(Error::Io(io::Error::other(
            String::from_utf8_lossy(&output.stderr).to_string(),
        )));
    }
    Ok(output)
}

/// Runs 7-Zip behind a spinner, the spinner is cleared whatever the outcome.
async fn run_sevenzip(
    progress_bar: &ProgressBar,
    message: &'static str,
    args: &[&OsStr],
    current_dir: Option<&Path>,
) -> Result<Output> {
    progress_bar.set_message(message);
    progress_bar.set_style(get_none_progress_style());
    progress_bar.enable_steady_tick(Duration::from_millis(100));

    let result = execute_sevenzip(args, current_dir).await;

    progress_bar.set_message("");
    progress_bar.disable_steady_tick();

    result
}

async fn parse_sevenzip_archive(
    progress_bar: &ProgressBar,
    archive_path: &Path,
) -> Result<Vec<ArchiveEntry>> {
    let output = run_sevenzip(
        progress_bar,
        "Parsing archive",
        &[OsStr::new("l"), OsStr::new("-slt"), OsStr::new("--"), archive_path.as_os_str()],
        None,
    )
    .await?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    // entries follow the dashed separator, one blank-line separated block each
    let entries = stdout
        .split_once("----------")
        .map(|(_, entries)| entries)
        .unwrap_or_default()
        .split("\n\n")
        .filter_map(|block| {
            let mut name: Option<String> = None;
            let mut size = 0;
            let mut crc = String::new();
            let mut folder = false;
            for line in block.lines() {
                if let Some((key, value)) = line.split_once(" = ") {
                    match key {
                        "Path" => name = Some(value.to_string()),
                        "Size" => size = value.parse().unwrap_or_default(),
                        "CRC" => crc = value.to_lowercase(),
                        "Folder" => folder = value == "+",
                        _ => {}
                    }
                }
            }
            match name {
                Some(name) if !folder => Some(ArchiveEntry { name, size, crc }),
                _ => None,
            }
        })
        .collect();

    Ok(entries)
}

pub async fn file_exists_in_archive<P: AsRef<Path>>(
    progress_bar: &ProgressBar,
    archive_path: &P,
    member: &str,
) -> bool {
    match list_archive_contents(progress_bar, archive_path).await {
        Ok(entries) => entries.iter().any(|entry| entry.name == member),
        Err(_) => false,
    }
}

/// Extracts a single archive member to `destination`, overwriting it.
pub async fn extract_file_from_archive<P: AsRef<Path>, Q: AsRef<Path>>(
    progress_bar: &ProgressBar,
    archive_path: &P,
    member: &str,
    destination: &Q,
) -> Result<()> {
    let archive_path = archive_path.as_ref();
    let destination = destination.as_ref();
    let archive_type = ArchiveType::from_path(&archive_path)?;
    if !archive_path.is_file() {
        return Err(Error::NotFound(format!(
            "Archive not found: {:?}",
            archive_path
        )));
    }
    validate_member_path(member)?;

    progress_bar.println(format!(
        "Extracting \"{}\" from \"{}\"",
        member,
        archive_path.display()
    ));

    match archive_type {
        ArchiveType::Zip => {
            let mut archive = open_zip_archive(archive_path)?;
            let mut file = archive.by_name(member).map_err(|error| match error {
                ZipError::FileNotFound => Error::NotFound(format!(
                    "File \"{}\" not found in archive {:?}",
                    member, archive_path
                )),
                error => Error::Zip(error),
            })?;
            let mut destination_file = create_file(&destination)?;
            io::copy(&mut file, &mut destination_file)?;
        }
        ArchiveType::Sevenzip => {
            extract_sevenzip_member(progress_bar, archive_path, member, destination).await?;
        }
    }

    Ok(())
}

async fn extract_sevenzip_member(
    progress_bar: &ProgressBar,
    archive_path: &Path,
    member: &str,
    destination: &Path,
) -> Result<()> {
    if !file_exists_in_archive(progress_bar, &archive_path, member).await {
        return Err(Error::NotFound(format!(
            "File \"{}\" not found in archive {:?}",
            member, archive_path
        )));
    }

    let tmp_directory = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => TempDir::new_in(parent)?,
        _ => TempDir::new()?,
    };

    run_sevenzip(
        progress_bar,
        "Extracting file",
        &[
            OsStr::new("x"),
            OsStr::new("-aoa"),
            OsStr::new("--"),
            archive_path.as_os_str(),
            OsStr::new(member),
        ],
        Some(tmp_directory.path()),
    )
    .await?;

    let extracted_path: PathBuf = tmp_directory.path().join(member);
    if !extracted_path.is_file() {
        return Err(Error::NotFound(format!(
            "File \"{}\" was not extracted from {:?}",
            member, archive_path
        )));
    }
    tokio::fs::copy(&extracted_path, destination).await?;

    Ok(())
}
