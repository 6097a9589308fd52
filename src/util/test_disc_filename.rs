use super::*;

#[test]
fn test() {
    // given
    let file_name = "Final Fantasy VII (USA).bin";

    // when
    let first = get_disc_filename(file_name, Some(1));
    let none = get_disc_filename(file_name, None);
    let no_extension = get_disc_filename("Game", Some(2));

    // then
    assert_eq!(first, "Final Fantasy VII (USA) (Disc 1).bin");
    assert_eq!(none, file_name);
    assert_eq!(no_extension, "Game (Disc 2)");
}
