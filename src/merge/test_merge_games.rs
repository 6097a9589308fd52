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

    let system_id = create_system(&mut connection, "Mega Drive", "megadrive")
        .await
        .unwrap();
    let canonical_id = create_game(&mut connection, "Sonic", system_id)
        .await
        .unwrap();
    let duplicate_id = create_game(&mut connection, "sonic", system_id)
        .await
        .unwrap();

    let canonical_usa_id = create_rom_set(&mut connection, canonical_id, "USA", "", "")
        .await
        .unwrap();
    create_rom(
        &mut connection,
        canonical_usa_id,
        &RomInput {
            file_path: "megadrive/Sonic (USA).md",
            file_name: "Sonic (USA).md",
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let duplicate_usa_id = create_rom_set(&mut connection, duplicate_id, "USA", "", "")
        .await
        .unwrap();
    create_rom(
        &mut connection,
        duplicate_usa_id,
        &RomInput {
            file_path: "megadrive/Sonic (USA) (Alt).md",
            file_name: "Sonic (USA) (Alt).md",
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let duplicate_europe_id = create_rom_set(&mut connection, duplicate_id, "Europe", "", "")
        .await
        .unwrap();
    create_rom(
        &mut connection,
        duplicate_europe_id,
        &RomInput {
            file_path: "megadrive/Sonic (Europe).md",
            file_name: "Sonic (Europe).md",
            ..Default::default()
        },
    )
    .await
    .unwrap();

    create_game_image(&mut connection, canonical_id, "images/Sonic.png", "Sonic.png", "cover")
        .await
        .unwrap();
    create_game_image(&mut connection, duplicate_id, "images/sonic.png", "sonic.png", "cover")
        .await
        .unwrap();
    create_game_image(
        &mut connection,
        duplicate_id,
        "images/sonic-screenshot.png",
        "sonic-screenshot.png",
        "screenshot",
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
    assert_eq!(
        summary,
        MergeSummary {
            rom_sets_moved: 1,
            roms_moved: 2,
            images_moved: 1,
            images_deleted: 1,
        }
    );

    let rom_sets = find_rom_sets_by_game_id(&mut connection, canonical_id)
        .await
        .unwrap();
    assert_eq!(
        rom_sets.iter().map(|rom_set| rom_set.id).collect::<Vec<i64>>(),
        vec![canonical_usa_id, duplicate_europe_id]
    );
    let roms = find_roms_by_rom_set_id(&mut connection, canonical_usa_id)
        .await
        .unwrap();
    assert_eq!(roms.len(), 2);
    assert!(
        find_rom_set_by_id(&mut connection, duplicate_usa_id)
            .await
            .unwrap()
            .is_none()
    );

    let images = find_game_images_by_game_id(&mut connection, canonical_id)
        .await
        .unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(images[0].file_name, "Sonic.png");
    assert_eq!(images[1].image_type, "screenshot");

    let games = find_games_by_ids(&mut connection, &[canonical_id, duplicate_id])
        .await
        .unwrap();
    assert_eq!(games.len(), 1);
    assert_eq!(games[0].default_rom_set_id, Some(canonical_usa_id));
}
