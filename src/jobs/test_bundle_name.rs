use super::*;

#[test]
fn test() {
    // given
    let timestamp = "2026-03-14-09-26";

    // when
    let without_device = get_bundle_name("snes", None, timestamp);
    let with_device = get_bundle_name("snes", Some("miyoo-mini"), timestamp);

    // then
    assert_eq!(without_device, "snes_2026-03-14-09-26");
    assert_eq!(with_device, "snes_miyoo-mini_2026-03-14-09-26");
}
