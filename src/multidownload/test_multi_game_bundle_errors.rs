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
    let progress_bar = ProgressBar::hidden();

    let library_root = TempDir::new().unwrap();
    let tmp_directory = TempDir::new().unwrap();
    set_directory(&mut connection, LIBRARY_ROOT, &library_root.path())
        .await
        .unwrap();
    set_directory(&mut connection, TMP_DIRECTORY, &tmp_directory.path())
        .await
        .unwrap();

    let system_id = create_system(&mut connection, "Atari 2600", "atari2600")
        .await
        .unwrap();
    let empty_id = create_game(&mut connection, "Empty", system_id)
        .await
        .unwrap();
    create_rom_set(&mut connection, empty_id, "USA", "", "")
        .await
        .unwrap();
    let missing_id = create_game(&mut connection, "Missing", system_id)
        .await
        .unwrap();
    let rom_set_id = create_rom_set(&mut connection, missing_id, "USA", "", "")
        .await
        .unwrap();
    create_rom(
        &mut connection,
        rom_set_id,
        &RomInput {
            file_path: "atari2600/Missing.a26",
            file_name: "Missing.a26",
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let empty_games = find_games_by_ids(&mut connection, &[empty_id])
        .await
        .unwrap();
    let missing_games = find_games_by_ids(&mut connection, &[empty_id, missing_id])
        .await
        .unwrap();

    let mut reports = 0;
    let mut progress_sink = |_: &BundleProgress| reports += 1;

    // when
    let no_games = create_multi_game_bundle(
        &mut connection,
        &progress_bar,
        &[],
        "none",
        &mut progress_sink,
        None,
    )
    .await;
    let no_roms = create_multi_game_bundle(
        &mut connection,
        &progress_bar,
        &empty_games,
        "empty",
        &mut progress_sink,
        None,
    )
    .await;
    let all_missing = create_multi_game_bundle(
        &mut connection,
        &progress_bar,
        &missing_games,
        "missing",
        &mut progress_sink,
        None,
    )
    .await;

    // then
    assert!(matches!(no_games, Err(Error::NoGamesProvided)));
    assert!(matches!(no_roms, Err(Error::NoAvailableRoms)));
    match all_missing {
        Err(Error::AllGamesMissing(errors)) => {
            assert_eq!(errors.len(), 1);
            assert!(errors[0].starts_with("Missing: "));
        }
        _ => panic!("expected all games to be missing"),
    }
    assert_eq!(reports, 1);
    assert_eq!(std::fs::read_dir(tmp_directory.path()).unwrap().count(), 0);
}
