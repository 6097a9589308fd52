use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::path::Path;
use strum::{Display, EnumString};

pub const SWITCH_SLUG: &str = "switch";

#[derive(Clone, Copy, Debug, Display, EnumString, PartialEq, Eq, Hash)]
#[strum(serialize_all = "lowercase")]
pub enum ContentType {
    Base,
    Update,
    Dlc,
}

#[derive(Clone, Copy, Debug, Default, Display, EnumString, PartialEq, Eq)]
#[strum(serialize_all = "snake_case")]
pub enum ImageType {
    #[default]
    Cover,
    Screenshot,
    ScreenshotTitle,
    Mix,
    Wheel,
    WheelMini,
}

#[derive(Clone, Copy, Debug, Display, EnumString, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

#[derive(Clone, Debug, FromRow, PartialEq, Eq)]
pub struct System {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

impl System {
    pub fn is_switch(&self) -> bool {
        self.slug == SWITCH_SLUG
    }
}

#[derive(Clone, Debug, FromRow, PartialEq, Eq)]
pub struct Game {
    pub id: i64,
    pub name: String,
    pub system_id: i64,
    pub default_rom_set_id: Option<i64>,
}

#[derive(Clone, Debug, FromRow, PartialEq, Eq)]
pub struct RomSet {
    pub id: i64,
    pub game_id: i64,
    pub region: String,
    pub revision: String,
    pub source_path: String,
}

#[derive(Clone, Debug, FromRow, PartialEq, Eq)]
pub struct Rom {
    pub id: i64,
    pub rom_set_id: i64,
    pub file_path: String,
    pub file_name: String,
    pub file_size: i64,
    pub archive_path: String,
    pub path_in_archive: String,
    pub crc32: String,
    pub sha1: String,
    pub content_type: String,
    pub disc: Option<i64>,
}

impl Rom {
    pub fn is_archived(&self) -> bool {
        !self.archive_path.is_empty()
    }

    pub fn content_type(&self) -> Option<ContentType> {
        self.content_type.parse().ok()
    }

    /// Name of the member inside the archive, without its directories.
    pub fn member_name(&self) -> &str {
        Path::new(&self.path_in_archive)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&self.path_in_archive)
    }
}

/// Fields needed to insert a ROM row.
#[derive(Clone, Debug, Default)]
pub struct RomInput<'a> {
    pub file_path: &'a str,
    pub file_name: &'a str,
    pub file_size: i64,
    pub archive_path: &'a str,
    pub path_in_archive: &'a str,
    pub crc32: &'a str,
    pub sha1: &'a str,
    pub content_type: &'a str,
    pub disc: Option<i64>,
}

#[derive(Clone, Debug, FromRow, PartialEq, Eq)]
pub struct GameImage {
    pub id: i64,
    pub game_id: i64,
    pub file_path: String,
    pub file_name: String,
    pub image_type: String,
}

#[derive(Clone, Debug, FromRow)]
pub struct Setting {
    pub id: i64,
    pub key: String,
    pub value: Option<String>,
}

#[derive(Clone, Debug, FromRow)]
pub struct Device {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub root_path: String,
    pub system_paths: String,
    pub include_images: bool,
    pub image_type: String,
    pub image_path_template: String,
    pub image_max_width: Option<i64>,
}

/// Per-system folder configuration of a device, either a bare folder name or
/// a folder with the game folder flag.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum SystemPath {
    Folder(String),
    Config {
        folder: Option<String>,
        #[serde(default)]
        game_folders: bool,
    },
}

#[derive(Clone, Debug, FromRow)]
pub struct DownloadJob {
    pub id: i64,
    pub status: String,
    pub game_ids: String,
    pub system_slug: String,
    pub device_id: Option<i64>,
    pub games_processed: i64,
    pub games_total: i64,
    pub current_game: String,
    pub bytes_written: i64,
    pub file_path: String,
    pub file_name: String,
    pub file_size: i64,
    pub games_included: i64,
    pub games_failed: i64,
    pub errors: String,
    pub created_at: i64,
    pub completed_at: Option<i64>,
    pub expires_at: Option<i64>,
}

impl DownloadJob {
    pub fn status(&self) -> Option<JobStatus> {
        self.status.parse().ok()
    }
}
