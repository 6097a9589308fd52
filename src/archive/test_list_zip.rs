use super::*;
use crate::fixtures::*;
use tempfile::TempDir;

#[tokio::test]
async fn test() {
    // given
    let progress_bar = ProgressBar::hidden();
    let tmp_directory = TempDir::new().unwrap();
    let archive_path = tmp_directory.path().join("Game (USA).zip");
    write_zip(
        &archive_path,
        &[
            ("Game (USA).gba", b"rom data"),
            ("extras/readme.txt", b"hello"),
        ],
    );

    // when
    let entries = list_archive_contents(&progress_bar, &archive_path)
        .await
        .unwrap();

    // then
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, "Game (USA).gba");
    assert_eq!(entries[0].size, 8);
    assert_eq!(entries[0].crc.len(), 8);
    assert_eq!(entries[1].name, "extras/readme.txt");
    assert!(file_exists_in_archive(&progress_bar, &archive_path, "Game (USA).gba").await);
    assert!(!file_exists_in_archive(&progress_bar, &archive_path, "Other.gba").await);
    assert!(is_archive_file(&archive_path));
    assert!(is_archive_file(&"Game.7Z"));
    assert!(!is_archive_file(&"Game.gba"));
}
