use super::*;
use tempfile::NamedTempFile;

#[tokio::test]
async fn test() {
    // given
    let db_file = NamedTempFile::new().unwrap();
    let pool = establish_connection(db_file.path().to_str().unwrap())
        .await
        .unwrap();
    let mut connection = pool.acquire().await.unwrap();

    let system_id = create_system(&mut connection, "Nintendo Switch", SWITCH_SLUG)
        .await
        .unwrap();
    let canonical_id = create_game(&mut connection, "Game", system_id)
        .await
        .unwrap();
    let duplicate_id = create_game(&mut connection, "Game Update", system_id)
        .await
        .unwrap();

    let base_id = create_rom_set(&mut connection, canonical_id, "USA", "", "")
        .await
        .unwrap();
    create_rom(
        &mut connection,
        base_id,
        &RomInput {
            file_path: "switch/Game.nsp",
            file_name: "Game.nsp",
            content_type: "base",
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let update_id = create_rom_set(&mut connection, duplicate_id, "USA", "", "")
        .await
        .unwrap();
    create_rom(
        &mut connection,
        update_id,
        &RomInput {
            file_path: "switch/Game [UPD].nsp",
            file_name: "Game [UPD].nsp",
            content_type: "update",
            ..Default::default()
        },
    )
    .await
    .unwrap();

    // when
    let summary = merge_games(
        &mut connection,
        &RegionPriorities::default(),
        canonical_id,
        duplicate_id,
    )
    .await
    .unwrap();

    // then
    assert_eq!(summary.rom_sets_moved, 1);
    assert_eq!(summary.roms_moved, 1);
    let update_rom_set = find_rom_set_by_id(&mut connection, update_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(update_rom_set.game_id, canonical_id);
    assert_eq!(update_rom_set.revision, "(update)");
    assert_eq!(
        find_roms_by_rom_set_id(&mut connection, base_id)
            .await
            .unwrap()
            .len(),
        1
    );
    let canonical = find_game_by_id(&mut connection, canonical_id)
        .await
        .unwrap();
    assert_eq!(canonical.default_rom_set_id, Some(base_id));
}
