use super::*;
use crate::fixtures::*;

#[test]
fn test() {
    // given
    let base = vec![rom(1, "Game.nsp", "", "base")];
    let update = vec![rom(2, "Game [UPD].nsp", "", "update")];
    let dlc = vec![
        rom(3, "Game [DLC].nsp", "", "dlc"),
        rom(3, "Game [UPD].nsp", "", "update"),
    ];
    let complete = vec![
        rom(4, "Game.nsp", "", "base"),
        rom(4, "Game [UPD].nsp", "", "update"),
    ];
    let unknown = vec![rom(5, "Game.nsp", "", "")];

    // when
    let base_update = romsets_compatible_for_merge(&base, &update);
    let dlc_base = romsets_compatible_for_merge(&dlc, &base);
    let base_base = romsets_compatible_for_merge(&base, &base);
    let update_dlc = romsets_compatible_for_merge(&update, &dlc);
    let base_complete = romsets_compatible_for_merge(&base, &complete);
    let unknown_update = romsets_compatible_for_merge(&unknown, &update);

    // then
    assert!(!base_update);
    assert!(!dlc_base);
    assert!(base_base);
    assert!(update_dlc);
    assert!(base_complete);
    assert!(unknown_update);
    assert_eq!(get_content_type_revision(&dlc), "(dlc-update)");
    assert_eq!(get_content_type_revision(&unknown), "(merged)");
}
