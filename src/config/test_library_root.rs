use super::*;
use tempfile::{NamedTempFile, TempDir};

#[tokio::test]
async fn test() {
    // given
    let db_file = NamedTempFile::new().unwrap();
    let pool = establish_connection(db_file.path().to_str().unwrap())
        .await
        .unwrap();
    let mut connection = pool.acquire().await.unwrap();

    let library_root = TempDir::new().unwrap();
    set_directory(&mut connection, LIBRARY_ROOT, &library_root.path())
        .await
        .unwrap();

    // when
    let relative_path = to_absolute_path(&mut connection, "snes/Game (USA).sfc")
        .await
        .unwrap();
    let absolute_path = to_absolute_path(&mut connection, "/srv/roms/Game (USA).sfc")
        .await
        .unwrap();

    // then
    assert_eq!(
        get_library_root(&mut connection).await.unwrap(),
        Some(library_root.path().to_path_buf())
    );
    assert_eq!(
        relative_path,
        library_root.path().join("snes").join("Game (USA).sfc")
    );
    assert_eq!(absolute_path, PathBuf::from("/srv/roms/Game (USA).sfc"));
}
