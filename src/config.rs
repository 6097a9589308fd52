use super::database::*;
use serde::Serialize;
use serde::de::DeserializeOwned;
use simple_error::SimpleResult;
use sqlx::SqliteConnection;
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[cfg(test)]
mod test_library_root;

pub const LIBRARY_ROOT: &str = "LIBRARY_ROOT";
pub const LIBRARY_ROOT_ENV: &str = "ROM_LIBRARY_ROOT";
pub const REGION_PRIORITIES: &str = "region_priorities";
pub const TMP_DIRECTORY: &str = "TMP_DIRECTORY";

pub async fn get_string(connection: &mut SqliteConnection, key: &str) -> SimpleResult<Option<String>> {
    Ok(find_setting_by_key(connection, key)
        .await?
        .and_then(|setting| setting.value))
}

pub async fn set_string(connection: &mut SqliteConnection, key: &str, value: &str) -> SimpleResult<()> {
    match find_setting_by_key(connection, key).await? {
        Some(setting) => update_setting(connection, setting.id, Some(value)).await,
        None => create_setting(connection, key, Some(value)).await,
    }
}

pub async fn get_bool(connection: &mut SqliteConnection, key: &str) -> SimpleResult<bool> {
    match get_string(connection, key).await? {
        Some(value) => Ok(try_with!(
            bool::from_str(&value),
            "Failed to parse {} as a boolean",
            key
        )),
        None => Ok(false),
    }
}

pub async fn set_bool(connection: &mut SqliteConnection, key: &str, value: bool) -> SimpleResult<()> {
    set_string(connection, key, &value.to_string()).await
}

/// Reads a JSON setting, `None` when the key is unset or empty.
pub async fn get_json<T: DeserializeOwned>(
    connection: &mut SqliteConnection,
    key: &str,
) -> SimpleResult<Option<T>> {
    match get_string(connection, key).await? {
        Some(value) if !value.trim().is_empty() => Ok(Some(try_with!(
            serde_json::from_str(&value),
            "Failed to parse {} as JSON",
            key
        ))),
        _ => Ok(None),
    }
}

pub async fn set_json<T: Serialize>(
    connection: &mut SqliteConnection,
    key: &str,
    value: &T,
) -> SimpleResult<()> {
    let value = try_with!(serde_json::to_string(value), "Failed to serialize {}", key);
    set_string(connection, key, &value).await
}

pub async fn set_directory<P: AsRef<Path>>(
    connection: &mut SqliteConnection,
    key: &str,
    value: &P,
) -> SimpleResult<()> {
    let value = require_with!(
        value.as_ref().as_os_str().to_str(),
        "Failed to convert {:?} to a string",
        value.as_ref()
    );
    set_string(connection, key, value).await
}

pub async fn get_directory(connection: &mut SqliteConnection, key: &str) -> SimpleResult<Option<PathBuf>> {
    Ok(get_string(connection, key)
        .await?
        .filter(|value| !value.is_empty())
        .map(PathBuf::from))
}

pub async fn get_library_root(connection: &mut SqliteConnection) -> SimpleResult<Option<PathBuf>> {
    match get_directory(connection, LIBRARY_ROOT).await? {
        Some(library_root) => Ok(Some(library_root)),
        None => Ok(dotenvy::var(LIBRARY_ROOT_ENV)
            .ok()
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)),
    }
}

/// Anchors a stored relative path on the library root, absolute paths are kept.
pub async fn to_absolute_path(connection: &mut SqliteConnection, path: &str) -> SimpleResult<PathBuf> {
    let path = Path::new(path);
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    match get_library_root(connection).await? {
        Some(library_root) => Ok(library_root.join(path)),
        None => Ok(path.to_path_buf()),
    }
}

pub async fn get_tmp_directory(connection: &mut SqliteConnection) -> SimpleResult<PathBuf> {
    Ok(get_directory(connection, TMP_DIRECTORY)
        .await?
        .unwrap_or_else(env::temp_dir))
}
