use super::config::*;
use super::database::*;
use super::model::*;
use super::progress::*;
use indexmap::IndexMap;
use indicatif::ProgressBar;
use itertools::Itertools;
use serde::Deserialize;
use simple_error::SimpleResult;
use sqlx::{Connection, SqliteConnection};
use std::cmp::Reverse;
use std::collections::HashMap;

#[cfg(test)]
mod test_best_romset_deterministic;
#[cfg(test)]
mod test_score;

pub const DEFAULT_REGION_SCORE: i64 = 200;
pub const STANDALONE_BONUS: i64 = 100;
pub const NO_BASE_GAME_PENALTY: i64 = -10000;

lazy_static! {
    pub static ref DEFAULT_REGION_PRIORITIES: IndexMap<&'static str, i64> = IndexMap::from([
        ("USA", 1000),
        ("Europe", 800),
        ("Japan", 600),
        ("World", 400),
    ]);
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RegionPrioritiesSetting {
    Ordered(Vec<String>),
    Mapping(IndexMap<String, i64>),
}

/// Region name to priority table, custom entries merged over the defaults.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegionPriorities {
    priorities: IndexMap<String, i64>,
}

impl Default for RegionPriorities {
    fn default() -> Self {
        RegionPriorities {
            priorities: DEFAULT_REGION_PRIORITIES
                .iter()
                .map(|(region, priority)| (region.to_string(), *priority))
                .collect(),
        }
    }
}

impl RegionPriorities {
    pub fn with_overrides<I: IntoIterator<Item = (String, i64)>>(overrides: I) -> Self {
        let mut region_priorities = RegionPriorities::default();
        region_priorities.priorities.extend(overrides);
        region_priorities
    }

    /// Ordered region lists score 1000, 900, 800 and so on.
    pub fn with_ordered_regions(regions: &[String]) -> Self {
        RegionPriorities::with_overrides(
            regions
                .iter()
                .enumerate()
                .map(|(i, region)| (region.clone(), 1000 - (i as i64) * 100)),
        )
    }

    pub async fn load(connection: &mut SqliteConnection) -> SimpleResult<Self> {
        let setting: Option<RegionPrioritiesSetting> =
            get_json(connection, REGION_PRIORITIES).await?;
        Ok(match setting {
            Some(RegionPrioritiesSetting::Ordered(regions)) => {
                RegionPriorities::with_ordered_regions(&regions)
            }
            Some(RegionPrioritiesSetting::Mapping(priorities)) => {
                RegionPriorities::with_overrides(priorities)
            }
            None => RegionPriorities::default(),
        })
    }

    /// Highest priority among the comma separated regions.
    pub fn get_region_score(&self, region: &str) -> i64 {
        region
            .split(',')
            .map(|region| {
                self.priorities
                    .get(region.trim())
                    .copied()
                    .unwrap_or(DEFAULT_REGION_SCORE)
            })
            .max()
            .unwrap_or(DEFAULT_REGION_SCORE)
    }
}

/// A set is standalone when it is fully loose, or fully archived with every
/// archive holding only one rom row. Empty and mixed sets are not.
pub fn is_standalone_archive(roms: &[Rom], archive_rom_counts: &HashMap<String, i64>) -> bool {
    if roms.is_empty() {
        return false;
    }
    if roms.iter().all(|rom| !rom.is_archived()) {
        return true;
    }
    roms.iter().all(|rom| {
        rom.is_archived() && archive_rom_counts.get(&rom.archive_path).copied() == Some(1)
    })
}

pub fn get_content_type_penalty(system: &System, roms: &[Rom]) -> i64 {
    if !system.is_switch() {
        return 0;
    }
    let content_types: Vec<ContentType> = roms.iter().filter_map(Rom::content_type).collect();
    if content_types.is_empty() || content_types.contains(&ContentType::Base) {
        0
    } else {
        NO_BASE_GAME_PENALTY
    }
}

pub fn calculate_romset_score(
    region_priorities: &RegionPriorities,
    system: &System,
    rom_set: &RomSet,
    roms: &[Rom],
    archive_rom_counts: &HashMap<String, i64>,
) -> i64 {
    let mut score = region_priorities.get_region_score(&rom_set.region);
    if is_standalone_archive(roms, archive_rom_counts) {
        score += STANDALONE_BONUS;
    }
    score + get_content_type_penalty(system, roms)
}

/// Highest score wins, the oldest rom set breaks ties.
pub fn select_best_romset<'a>(
    region_priorities: &RegionPriorities,
    system: &System,
    candidates: &'a [(RomSet, Vec<Rom>)],
    archive_rom_counts: &HashMap<String, i64>,
) -> Option<&'a RomSet> {
    candidates
        .iter()
        .filter(|(_, roms)| !roms.is_empty())
        .max_by_key(|(rom_set, roms)| {
            (
                calculate_romset_score(region_priorities, system, rom_set, roms, archive_rom_counts),
                Reverse(rom_set.id),
            )
        })
        .map(|(rom_set, _)| rom_set)
}

async fn find_candidates(
    connection: &mut SqliteConnection,
    game: &Game,
) -> SimpleResult<(System, Vec<(RomSet, Vec<Rom>)>, HashMap<String, i64>)> {
    let system = find_system_by_id(connection, game.system_id).await?;
    let rom_sets = find_rom_sets_by_game_id(connection, game.id).await?;
    let mut roms_by_rom_set_id = find_roms_by_game_id(connection, game.id)
        .await?
        .into_iter()
        .into_group_map_by(|rom| rom.rom_set_id);
    let candidates = rom_sets
        .into_iter()
        .map(|rom_set| {
            let roms = roms_by_rom_set_id.remove(&rom_set.id).unwrap_or_default();
            (rom_set, roms)
        })
        .collect();
    let archive_rom_counts = find_archive_rom_counts_by_game_id(connection, game.id).await?;
    Ok((system, candidates, archive_rom_counts))
}

pub async fn get_best_romset(
    connection: &mut SqliteConnection,
    region_priorities: &RegionPriorities,
    game: &Game,
) -> SimpleResult<Option<RomSet>> {
    let (system, candidates, archive_rom_counts) = find_candidates(connection, game).await?;
    let best_romset =
        select_best_romset(region_priorities, &system, &candidates, &archive_rom_counts).cloned();
    log::debug!(
        "Best rom set for \"{}\": {:?}",
        game.name,
        best_romset.as_ref().map(|rom_set| rom_set.id)
    );
    Ok(best_romset)
}

/// Persists the best rom set as the game default, returns whether it changed.
pub async fn recalculate_default_romset(
    connection: &mut SqliteConnection,
    region_priorities: &RegionPriorities,
    game_id: i64,
) -> SimpleResult<bool> {
    let game = find_game_by_id(connection, game_id).await?;
    let best_romset_id = get_best_romset(connection, region_priorities, &game)
        .await?
        .map(|rom_set| rom_set.id);
    if best_romset_id == game.default_rom_set_id {
        return Ok(false);
    }
    update_game_default_rom_set(connection, game.id, best_romset_id).await?;
    Ok(true)
}

#[derive(Clone, Debug, Default)]
pub struct RecalculateOptions {
    pub system_slug: Option<String>,
    pub without_default_only: bool,
    pub dry_run: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecalculateSummary {
    pub total: usize,
    pub changed: usize,
}

pub async fn recalculate_default_romsets(
    connection: &mut SqliteConnection,
    progress_bar: &ProgressBar,
    region_priorities: &RegionPriorities,
    options: &RecalculateOptions,
) -> SimpleResult<RecalculateSummary> {
    let games = find_games_by_system_slug_and_default(
        connection,
        options.system_slug.as_deref(),
        options.without_default_only,
    )
    .await?;

    progress_bar.set_style(get_count_progress_style());
    progress_bar.set_length(games.len() as u64);
    progress_bar.set_position(0);
    progress_bar.set_message("Recalculating default rom sets");

    let mut summary = RecalculateSummary {
        total: games.len(),
        changed: 0,
    };

    for game in games {
        if options.dry_run {
            let best_romset = get_best_romset(connection, region_priorities, &game).await?;
            if best_romset.as_ref().map(|rom_set| rom_set.id) != game.default_rom_set_id {
                progress_bar.println(format!(
                    "Would change the default rom set of \"{}\"",
                    game.name
                ));
                summary.changed += 1;
            }
        } else if recalculate_default_romset(connection, region_priorities, game.id).await? {
            log::debug!("Changed the default rom set of \"{}\"", game.name);
            summary.changed += 1;
        }
        progress_bar.inc(1);
    }

    progress_bar.set_message("");
    progress_bar.finish_and_clear();

    log::info!(
        "Recalculated {} games, {} changed{}",
        summary.total,
        summary.changed,
        if options.dry_run { " (dry run)" } else { "" }
    );

    Ok(summary)
}

/// Default regions first, then every stored region in first-seen order.
pub async fn get_all_known_regions(connection: &mut SqliteConnection) -> SimpleResult<Vec<String>> {
    let mut regions: Vec<String> = DEFAULT_REGION_PRIORITIES
        .keys()
        .map(|region| region.to_string())
        .collect();
    for stored_region in find_rom_set_regions(connection).await? {
        for region in stored_region.split(',').map(str::trim) {
            if !region.is_empty() && !regions.iter().any(|known| known == region) {
                regions.push(region.to_string());
            }
        }
    }
    Ok(regions)
}

/// Deletes a rom set with its roms and refreshes the default of its game.
pub async fn delete_rom_set(
    connection: &mut SqliteConnection,
    region_priorities: &RegionPriorities,
    rom_set_id: i64,
) -> SimpleResult<bool> {
    let rom_set = require_with!(
        find_rom_set_by_id(connection, rom_set_id).await?,
        "Rom set with id {} not found",
        rom_set_id
    );
    let mut transaction = try_with!(connection.begin().await, "Failed to start transaction");
    delete_rom_set_by_id(&mut transaction, rom_set.id).await?;
    let changed =
        recalculate_default_romset(&mut transaction, region_priorities, rom_set.game_id).await?;
    try_with!(transaction.commit().await, "Failed to commit transaction");
    Ok(changed)
}
