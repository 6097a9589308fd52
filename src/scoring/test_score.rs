use super::*;
use crate::fixtures::*;

#[test]
fn test() {
    // given
    let region_priorities = RegionPriorities::default();
    let snes = system("snes");
    let switch = system(SWITCH_SLUG);
    let archive_rom_counts: HashMap<String, i64> = HashMap::from([
        (String::from("solo.zip"), 1),
        (String::from("pack.zip"), 3),
    ]);

    let loose = vec![rom(1, "Game.sfc", "", "")];
    let solo = vec![rom(1, "Game.sfc", "solo.zip", "")];
    let packed = vec![rom(1, "Game.sfc", "pack.zip", "")];
    let mixed = vec![rom(1, "Game.sfc", "", ""), rom(1, "Game.msu", "solo.zip", "")];
    let update_only = vec![rom(1, "Game [UPD].nsp", "", "update")];
    let no_content_type = vec![rom(1, "Game.nsp", "", "")];

    // when
    let usa_loose = calculate_romset_score(
        &region_priorities,
        &snes,
        &rom_set(1, "USA"),
        &loose,
        &archive_rom_counts,
    );
    let europe_solo = calculate_romset_score(
        &region_priorities,
        &snes,
        &rom_set(2, "Europe"),
        &solo,
        &archive_rom_counts,
    );
    let japan_packed = calculate_romset_score(
        &region_priorities,
        &snes,
        &rom_set(3, "Japan"),
        &packed,
        &archive_rom_counts,
    );
    let brazil_empty = calculate_romset_score(
        &region_priorities,
        &snes,
        &rom_set(4, "Brazil"),
        &[],
        &archive_rom_counts,
    );

    // then
    assert_eq!(usa_loose, 1100);
    assert_eq!(europe_solo, 900);
    assert_eq!(japan_packed, 600);
    assert_eq!(brazil_empty, 200);

    assert!(is_standalone_archive(&loose, &archive_rom_counts));
    assert!(is_standalone_archive(&solo, &archive_rom_counts));
    assert!(!is_standalone_archive(&packed, &archive_rom_counts));
    assert!(!is_standalone_archive(&mixed, &archive_rom_counts));
    assert!(!is_standalone_archive(&[], &archive_rom_counts));

    assert_eq!(get_content_type_penalty(&switch, &update_only), NO_BASE_GAME_PENALTY);
    assert_eq!(get_content_type_penalty(&switch, &no_content_type), 0);
    assert_eq!(get_content_type_penalty(&snes, &update_only), 0);
}
