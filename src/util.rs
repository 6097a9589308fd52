use simple_error::SimpleResult;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile};

#[cfg(test)]
mod test_disc_filename;

pub fn get_executable_path(executable_names: &[&str]) -> SimpleResult<PathBuf> {
    for executable_name in executable_names {
        if let Ok(path) = which::which(executable_name) {
            log::debug!("Found {} at {:?}", executable_name, path);
            return Ok(path);
        }
    }
    bail!("Failed to find any of {:?} in $PATH", executable_names)
}

pub fn create_file<P: AsRef<Path>>(path: &P) -> SimpleResult<fs::File> {
    let file = try_with!(
        fs::File::create(path.as_ref()),
        "Failed to create {:?}",
        path.as_ref()
    );
    Ok(file)
}

pub async fn remove_file<P: AsRef<Path>>(path: &P) -> SimpleResult<()> {
    try_with!(
        tokio::fs::remove_file(path.as_ref()).await,
        "Failed to delete {:?}",
        path.as_ref()
    );
    Ok(())
}

pub async fn create_directory<P: AsRef<Path>>(path: &P) -> SimpleResult<()> {
    if !path.as_ref().is_dir() {
        try_with!(
            tokio::fs::create_dir_all(path.as_ref()).await,
            "Failed to create {:?}",
            path.as_ref()
        );
    }
    Ok(())
}

pub fn create_tmp_file<P: AsRef<Path>>(directory: &P, suffix: &str) -> SimpleResult<NamedTempFile> {
    let tmp_file = try_with!(
        Builder::new()
            .prefix("romhoard_")
            .suffix(suffix)
            .tempfile_in(directory.as_ref()),
        "Failed to create temp file in {:?}",
        directory.as_ref()
    );
    Ok(tmp_file)
}

/// Makes a game name safe to use as a file or directory name.
pub fn sanitize_filename(name: &str) -> String {
    name.replace('/', "-")
        .replace('\\', "-")
        .replace(':', " -")
        .replace(['*', '?', '<', '>'], "")
        .replace('"', "'")
        .replace('|', "-")
        .trim_matches(|c| c == ' ' || c == '.')
        .to_string()
}

/// Inserts a disc suffix before the extension, or returns the name as is.
pub fn get_disc_filename(file_name: &str, disc: Option<i64>) -> String {
    match disc {
        Some(disc) => {
            let path = Path::new(file_name);
            let stem = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or(file_name);
            match path.extension().and_then(|extension| extension.to_str()) {
                Some(extension) => format!("{} (Disc {}).{}", stem, disc, extension),
                None => format!("{} (Disc {})", stem, disc),
            }
        }
        None => file_name.to_string(),
    }
}

pub fn get_file_name<P: AsRef<Path>>(path: &P) -> String {
    path.as_ref()
        .file_name()
        .map(|file_name| file_name.to_string_lossy().to_string())
        .unwrap_or_default()
}

pub fn get_extension<P: AsRef<Path>>(path: &P) -> String {
    path.as_ref()
        .extension()
        .map(|extension| extension.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}
