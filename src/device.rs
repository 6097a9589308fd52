use super::model::*;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

#[cfg(test)]
mod test_image_path;

/// Where a target device expects roms and images inside a bundle.
pub trait DeviceLayout {
    fn get_rom_path(&self, system_slug: &str, game_folder: &str, file_name: &str) -> String;
    fn get_image_path(&self, system_slug: &str, rom_file_name: &str) -> Option<String>;
    fn include_images(&self) -> bool;
    fn image_type(&self) -> ImageType;
    fn image_max_width(&self) -> Option<u32>;
}

impl Device {
    fn get_system_path(&self, system_slug: &str) -> Option<SystemPath> {
        match serde_json::from_str::<HashMap<String, SystemPath>>(&self.system_paths) {
            Ok(mut system_paths) => system_paths.remove(system_slug),
            Err(error) => {
                log::warn!("Invalid system paths for device \"{}\": {}", self.slug, error);
                None
            }
        }
    }

    /// Configured folder, defaults to the upper-cased system slug.
    pub fn get_system_folder(&self, system_slug: &str) -> String {
        match self.get_system_path(system_slug) {
            Some(SystemPath::Folder(folder)) => folder,
            Some(SystemPath::Config {
                folder: Some(folder),
                ..
            }) => folder,
            _ => system_slug.to_uppercase(),
        }
    }

    pub fn use_game_folders(&self, system_slug: &str) -> bool {
        matches!(
            self.get_system_path(system_slug),
            Some(SystemPath::Config {
                game_folders: true,
                ..
            })
        )
    }

    fn get_root_path(&self) -> &str {
        self.root_path.trim_matches('/')
    }
}

impl DeviceLayout for Device {
    fn get_rom_path(&self, system_slug: &str, game_folder: &str, file_name: &str) -> String {
        let system_folder = self.get_system_folder(system_slug);
        let mut parts: Vec<&str> = Vec::new();
        if !self.get_root_path().is_empty() {
            parts.push(self.get_root_path());
        }
        parts.push(&system_folder);
        if self.use_game_folders(system_slug) {
            parts.push(game_folder);
        }
        parts.push(file_name);
        parts.join("/")
    }

    fn get_image_path(&self, system_slug: &str, rom_file_name: &str) -> Option<String> {
        if !self.include_images || self.image_path_template.is_empty() {
            return None;
        }
        let romname = Path::new(rom_file_name)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(rom_file_name);
        Some(
            self.image_path_template
                .replace("{root_path}", self.get_root_path())
                .replace("{system}", &self.get_system_folder(system_slug))
                .replace("{romname_ext}", rom_file_name)
                .replace("{romname}", romname),
        )
    }

    fn include_images(&self) -> bool {
        self.include_images
    }

    fn image_type(&self) -> ImageType {
        ImageType::from_str(&self.image_type).unwrap_or_default()
    }

    fn image_max_width(&self) -> Option<u32> {
        self.image_max_width
            .and_then(|width| u32::try_from(width).ok())
            .filter(|width| *width > 0)
    }
}
