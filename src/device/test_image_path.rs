use super::*;

fn device(include_images: bool, image_path_template: &str) -> Device {
    Device {
        id: 1,
        name: String::from("Handheld"),
        slug: String::from("handheld"),
        root_path: String::from("Roms/"),
        system_paths: String::from(r#"{"gba": {"folder": "GBA"}}"#),
        include_images,
        image_type: String::from("mix"),
        image_path_template: image_path_template.to_string(),
        image_max_width: Some(250),
    }
}

#[test]
fn test() {
    // given
    let disabled = device(false, "{root_path}/{system}/Imgs/{romname}.png");
    let no_template = device(true, "");
    let stem = device(true, "{root_path}/{system}/Imgs/{romname}.png");
    let with_extension = device(true, "{root_path}/{system}/.res/{romname_ext}.png");
    let outside_root = device(true, "MUOS/info/catalogue/{system}/box/{romname}.png");

    // when
    let stem_path = stem.get_image_path("gba", "Super Mario Advance 4 (USA).gba");

    // then
    assert_eq!(disabled.get_image_path("gba", "mario.gba"), None);
    assert_eq!(no_template.get_image_path("gba", "mario.gba"), None);
    assert_eq!(
        stem_path.as_deref(),
        Some("Roms/GBA/Imgs/Super Mario Advance 4 (USA).png")
    );
    assert_eq!(
        with_extension.get_image_path("gba", "mario.gba").as_deref(),
        Some("Roms/GBA/.res/mario.gba.png")
    );
    assert_eq!(
        outside_root.get_image_path("snes", "mario.sfc").as_deref(),
        Some("MUOS/info/catalogue/SNES/box/mario.png")
    );
    assert!(stem.include_images());
    assert_eq!(stem.image_type(), ImageType::Mix);
    assert_eq!(stem.image_max_width(), Some(250));
}
