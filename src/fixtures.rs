use std::fs::File;
use std::io::Write;
use std::path::Path;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub fn write_zip<P: AsRef<Path>>(path: &P, members: &[(&str, &[u8])]) {
    let mut zip_writer = ZipWriter::new(File::create(path.as_ref()).unwrap());
    for (name, content) in members {
        zip_writer
            .start_file(*name, SimpleFileOptions::default())
            .unwrap();
        zip_writer.write_all(content).unwrap();
    }
    zip_writer.finish().unwrap();
}

pub fn write_file<P: AsRef<Path>>(path: &P, content: &[u8]) {
    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    File::create(path.as_ref())
        .unwrap()
        .write_all(content)
        .unwrap();
}

pub fn read_zip<P: AsRef<Path>>(path: &P) -> Vec<(String, Vec<u8>)> {
    let mut archive = zip::ZipArchive::new(File::open(path.as_ref()).unwrap()).unwrap();
    let mut members = Vec::new();
    for i in 0..archive.len() {
        let mut file = archive.by_index(i).unwrap();
        let mut content = Vec::new();
        std::io::Read::read_to_end(&mut file, &mut content).unwrap();
        members.push((file.name().to_string(), content));
    }
    members
}

pub fn system(slug: &str) -> crate::model::System {
    crate::model::System {
        id: 1,
        name: slug.to_uppercase(),
        slug: slug.to_string(),
    }
}

pub fn rom_set(id: i64, region: &str) -> crate::model::RomSet {
    crate::model::RomSet {
        id,
        game_id: 1,
        region: region.to_string(),
        revision: String::new(),
        source_path: String::new(),
    }
}

pub fn rom(rom_set_id: i64, file_name: &str, archive_path: &str, content_type: &str) -> crate::model::Rom {
    crate::model::Rom {
        id: 0,
        rom_set_id,
        file_path: file_name.to_string(),
        file_name: file_name.to_string(),
        file_size: 0,
        archive_path: archive_path.to_string(),
        path_in_archive: if archive_path.is_empty() {
            String::new()
        } else {
            file_name.to_string()
        },
        crc32: String::new(),
        sha1: String::new(),
        content_type: content_type.to_string(),
        disc: None,
    }
}
