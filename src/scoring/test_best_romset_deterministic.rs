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

    let system_id = create_system(&mut connection, "Game Boy Advance", "gba")
        .await
        .unwrap();
    let game_id = create_game(&mut connection, "Game", system_id)
        .await
        .unwrap();
    let mut rom_set_ids: Vec<i64> = Vec::new();
    for revision in ["", "Rev 1", "Rev 2"] {
        let rom_set_id = create_rom_set(&mut connection, game_id, "USA", revision, "")
            .await
            .unwrap();
        create_rom(
            &mut connection,
            rom_set_id,
            &RomInput {
                file_path: "gba/Game.gba",
                file_name: "Game.gba",
                ..Default::default()
            },
        )
        .await
        .unwrap();
        rom_set_ids.push(rom_set_id);
    }

    let game = find_game_by_id(&mut connection, game_id).await.unwrap();
    let region_priorities = RegionPriorities::default();

    // when
    let first = get_best_romset(&mut connection, &region_priorities, &game)
        .await
        .unwrap();
    let second = get_best_romset(&mut connection, &region_priorities, &game)
        .await
        .unwrap();

    // then
    assert_eq!(first, second);
    assert_eq!(first.unwrap().id, rom_set_ids[0]);
}
