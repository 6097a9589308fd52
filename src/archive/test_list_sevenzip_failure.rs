use super::*;
use crate::fixtures::*;
use tempfile::TempDir;

#[tokio::test]
async fn test() {
    // given
    let progress_bar = ProgressBar::hidden();
    let tmp_directory = TempDir::new().unwrap();
    let archive_path = tmp_directory.path().join("broken.7z");
    write_file(&archive_path, b"not an archive");

    // when
    let result = list_archive_contents(&progress_bar, &archive_path).await;

    // then
    assert!(result.is_err());
    assert_eq!(progress_bar.message(), "");
}
