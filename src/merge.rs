use super::database::*;
use super::error::{Error, Result};
use super::model::*;
use super::scoring::*;
use itertools::Itertools;
use simple_error::SimpleResult;
use sqlx::{Connection, SqliteConnection};
use std::collections::{BTreeSet, HashSet};

#[cfg(test)]
mod test_merge_games;
#[cfg(test)]
mod test_merge_games_incompatible;
#[cfg(test)]
mod test_romsets_compatible;

const MERGED_LABEL: &str = "merged";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub rom_sets_moved: usize,
    pub roms_moved: usize,
    pub images_moved: usize,
    pub images_deleted: usize,
}

fn get_content_types(roms: &[Rom]) -> HashSet<ContentType> {
    roms.iter().filter_map(|rom| rom.content_type()).collect()
}

fn is_base_only(content_types: &HashSet<ContentType>) -> bool {
    content_types.contains(&ContentType::Base)
        && !content_types.contains(&ContentType::Update)
        && !content_types.contains(&ContentType::Dlc)
}

fn is_addon_only(content_types: &HashSet<ContentType>) -> bool {
    !content_types.contains(&ContentType::Base)
        && (content_types.contains(&ContentType::Update) || content_types.contains(&ContentType::Dlc))
}

/// Rom sets without content type information are always compatible.
pub fn romsets_compatible_for_merge(roms: &[Rom], other_roms: &[Rom]) -> bool {
    let content_types = get_content_types(roms);
    let other_content_types = get_content_types(other_roms);
    if content_types.is_empty() || other_content_types.is_empty() {
        return true;
    }
    !(is_base_only(&content_types) && is_addon_only(&other_content_types)
        || is_addon_only(&content_types) && is_base_only(&other_content_types))
}

/// Revision given to a rom set that cannot share its slot, e.g. `(dlc-update)`.
pub fn get_content_type_revision(roms: &[Rom]) -> String {
    let content_types: BTreeSet<&str> = roms
        .iter()
        .map(|rom| rom.content_type.as_str())
        .filter(|content_type| !content_type.is_empty())
        .collect();
    if content_types.is_empty() {
        format!("({})", MERGED_LABEL)
    } else {
        format!("({})", content_types.iter().join("-"))
    }
}

async fn move_rom_sets(
    connection: &mut SqliteConnection,
    canonical: &Game,
    duplicate: &Game,
    summary: &mut MergeSummary,
) -> SimpleResult<()> {
    for rom_set in find_rom_sets_by_game_id(connection, duplicate.id).await? {
        let roms = find_roms_by_rom_set_id(connection, rom_set.id).await?;
        let existing_rom_set = find_rom_set_by_game_id_and_region_and_revision(
            connection,
            canonical.id,
            &rom_set.region,
            &rom_set.revision,
        )
        .await?;

        match existing_rom_set {
            Some(existing_rom_set) => {
                let existing_roms = find_roms_by_rom_set_id(connection, existing_rom_set.id).await?;
                if romsets_compatible_for_merge(&existing_roms, &roms) {
                    let count =
                        update_roms_rom_set_id(connection, rom_set.id, existing_rom_set.id).await?;
                    delete_rom_set_by_id(connection, rom_set.id).await?;
                    summary.roms_moved += count as usize;
                    log::debug!(
                        "Moved {} roms into rom set \"{}\" \"{}\"",
                        count,
                        existing_rom_set.region,
                        existing_rom_set.revision
                    );
                } else {
                    let revision = get_content_type_revision(&roms);
                    update_rom_set_game_and_revision(connection, rom_set.id, canonical.id, &revision)
                        .await?;
                    summary.rom_sets_moved += 1;
                    summary.roms_moved += roms.len();
                    log::debug!(
                        "Moved rom set \"{}\" with revision \"{}\"",
                        rom_set.region,
                        revision
                    );
                }
            }
            None => {
                update_rom_set_game_and_revision(
                    connection,
                    rom_set.id,
                    canonical.id,
                    &rom_set.revision,
                )
                .await?;
                summary.rom_sets_moved += 1;
                summary.roms_moved += roms.len();
                log::debug!(
                    "Moved rom set \"{}\" \"{}\"",
                    rom_set.region,
                    rom_set.revision
                );
            }
        }
    }
    Ok(())
}

async fn move_game_images(
    connection: &mut SqliteConnection,
    canonical: &Game,
    duplicate: &Game,
    summary: &mut MergeSummary,
) -> SimpleResult<()> {
    let mut image_types: HashSet<String> = find_game_images_by_game_id(connection, canonical.id)
        .await?
        .into_iter()
        .map(|image| image.image_type)
        .collect();
    for image in find_game_images_by_game_id(connection, duplicate.id).await? {
        if image_types.contains(&image.image_type) {
            delete_game_image_by_id(connection, image.id).await?;
            summary.images_deleted += 1;
        } else {
            update_game_image_game_id(connection, image.id, canonical.id).await?;
            summary.images_moved += 1;
            image_types.insert(image.image_type);
        }
    }
    Ok(())
}

async fn merge_into(
    connection: &mut SqliteConnection,
    region_priorities: &RegionPriorities,
    canonical: &Game,
    duplicate: &Game,
) -> SimpleResult<MergeSummary> {
    let mut summary = MergeSummary::default();
    let mut transaction = try_with!(connection.begin().await, "Failed to start transaction");
    move_rom_sets(&mut transaction, canonical, duplicate, &mut summary).await?;
    move_game_images(&mut transaction, canonical, duplicate, &mut summary).await?;
    recalculate_default_romset(&mut transaction, region_priorities, canonical.id).await?;
    delete_game_by_id(&mut transaction, duplicate.id).await?;
    try_with!(transaction.commit().await, "Failed to commit transaction");
    Ok(summary)
}

/// Moves everything a duplicate game owns into the canonical game, then
/// deletes the duplicate. Nothing changes when any step fails.
pub async fn merge_games(
    connection: &mut SqliteConnection,
    region_priorities: &RegionPriorities,
    canonical_id: i64,
    duplicate_id: i64,
) -> Result<MergeSummary> {
    if canonical_id == duplicate_id {
        return Err(Error::InvalidMerge(String::from(
            "Cannot merge a game with itself",
        )));
    }
    let canonical = find_game_by_id(connection, canonical_id).await?;
    let duplicate = find_game_by_id(connection, duplicate_id).await?;
    if canonical.system_id != duplicate.system_id {
        return Err(Error::InvalidMerge(String::from(
            "Cannot merge games from different systems",
        )));
    }

    let summary = merge_into(connection, region_priorities, &canonical, &duplicate).await?;
    log::info!(
        "Merged \"{}\" into \"{}\": {} rom sets and {} roms moved, {} images moved, {} images deleted",
        duplicate.name,
        canonical.name,
        summary.rom_sets_moved,
        summary.roms_moved,
        summary.images_moved,
        summary.images_deleted
    );
    Ok(summary)
}
