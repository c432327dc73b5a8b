//! Single-slot save persistence
//!
//! The save is one flat JSON object under a fixed key. Anything that fails to
//! parse or validate is treated as "no save" so the title screen simply hides
//! Continue. Writes are fire-and-forget: failures are logged and dropped.

use crate::platform::storage::{KeyValueStore, StorageError};
use crate::sim::{GameState, SaveSnapshot};

/// Storage key of the save slot
pub const SAVE_KEY: &str = "islandCrisisGameState";

/// Read the save slot
pub fn load(store: &dyn KeyValueStore) -> Option<SaveSnapshot> {
    let json = store.get_item(SAVE_KEY)?;
    let snapshot: SaveSnapshot = match serde_json::from_str(&json) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            log::warn!("Ignoring malformed save: {}", e);
            return None;
        }
    };
    let valid = snapshot.validate();
    if valid.is_none() {
        log::warn!("Ignoring out-of-range save: {:?}", snapshot);
    }
    valid
}

pub fn has_save(store: &dyn KeyValueStore) -> bool {
    load(store).is_some()
}

/// Write a snapshot to the save slot
pub fn save(store: &mut dyn KeyValueStore, snapshot: &SaveSnapshot) -> Result<(), StorageError> {
    let json = serde_json::to_string(snapshot).map_err(|e| StorageError::Encode(e.to_string()))?;
    store.set_item(SAVE_KEY, &json)?;
    log::info!(
        "Game saved (level {}, {:.0}m)",
        snapshot.current_level,
        snapshot.current_distance
    );
    Ok(())
}

/// Capture and write the current run, logging any failure.
/// Skipped while the player is airborne; the previous save stays.
pub fn autosave(store: &mut dyn KeyValueStore, state: &GameState) {
    let Some(snapshot) = SaveSnapshot::settled(state) else {
        log::debug!("Save skipped, player airborne");
        return;
    };
    if let Err(e) = save(store, &snapshot) {
        log::warn!("Save failed: {}", e);
    }
}

pub fn clear(store: &mut dyn KeyValueStore) {
    store.remove_item(SAVE_KEY);
    log::info!("Saved game cleared");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{MAX_LIVES, PLAYER_START_X};
    use crate::platform::storage::MemoryStore;
    use crate::sim::progression;
    use crate::sim::Viewport;

    fn snapshot() -> SaveSnapshot {
        SaveSnapshot {
            current_level: 3,
            current_distance: 250.0,
            record_distance: 300.0,
            current_lives: 2,
            last_checkpoint_x: 512.0,
        }
    }

    #[test]
    fn test_empty_store_has_no_save() {
        let store = MemoryStore::default();
        assert!(load(&store).is_none());
        assert!(!has_save(&store));
    }

    #[test]
    fn test_save_load_round_trip() {
        let mut store = MemoryStore::default();
        save(&mut store, &snapshot()).unwrap();
        assert_eq!(load(&store), Some(snapshot()));

        let state = GameState::continue_from(5, Viewport::default(), &snapshot());
        assert_eq!(state.player.pos.x, 512.0);
    }

    #[test]
    fn test_reads_camel_case_blob() {
        let mut store = MemoryStore::default();
        store
            .set_item(
                SAVE_KEY,
                r#"{"currentLevel":2,"currentDistance":12.5,"recordDistance":40,"currentLives":1,"lastCheckpointX":725}"#,
            )
            .unwrap();
        let loaded = load(&store).unwrap();
        assert_eq!(loaded.current_level, 2);
        assert_eq!(loaded.record_distance, 40.0);
        assert_eq!(loaded.last_checkpoint_x, 725.0);
    }

    #[test]
    fn test_malformed_save_is_no_save() {
        let mut store = MemoryStore::default();
        store.set_item(SAVE_KEY, "{\"currentLevel\":").unwrap();
        assert!(load(&store).is_none());

        store.set_item(SAVE_KEY, r#"{"currentLevel":1}"#).unwrap();
        assert!(load(&store).is_none());
    }

    #[test]
    fn test_out_of_range_save_is_no_save() {
        let mut store = MemoryStore::default();
        let bad = SaveSnapshot {
            current_lives: MAX_LIVES + 2,
            ..snapshot()
        };
        save(&mut store, &bad).unwrap();
        assert!(!has_save(&store));
    }

    #[test]
    fn test_clear() {
        let mut store = MemoryStore::default();
        save(&mut store, &snapshot()).unwrap();
        clear(&mut store);
        assert!(!has_save(&store));
    }

    #[test]
    fn test_failed_write_is_reported() {
        let mut store = MemoryStore::read_only();
        assert!(save(&mut store, &snapshot()).is_err());
        // autosave swallows the error
        let mut state = GameState::new(1, Viewport::default());
        state.player.on_ground = true;
        autosave(&mut store, &state);
        assert!(!has_save(&store));
    }

    #[test]
    fn test_quitting_mid_death_keeps_the_penalty() {
        let mut store = MemoryStore::default();
        let mut state = GameState::new(1, Viewport::default());
        state.progression.current_level = 4;
        state.progression.current_lives = 1;
        let mut events = Vec::new();
        progression::begin_dying(&mut state, &mut events);

        autosave(&mut store, &state);
        let loaded = load(&store).unwrap();
        assert_eq!(loaded.current_lives, MAX_LIVES);
        assert_eq!(loaded.current_level, 3);

        let resumed = GameState::continue_from(2, Viewport::default(), &loaded);
        assert_eq!(resumed.progression.current_level, 3);
        assert_eq!(resumed.progression.current_lives, MAX_LIVES);
        assert_eq!(resumed.player.pos.x, PLAYER_START_X);
    }

    #[test]
    fn test_zero_lives_blob_is_no_save() {
        let mut store = MemoryStore::default();
        store
            .set_item(
                SAVE_KEY,
                r#"{"currentLevel":4,"currentDistance":0,"recordDistance":0,"currentLives":0,"lastCheckpointX":100}"#,
            )
            .unwrap();
        assert!(!has_save(&store));
    }

    #[test]
    fn test_airborne_autosave_keeps_previous_save() {
        let mut store = MemoryStore::default();
        save(&mut store, &snapshot()).unwrap();

        let mut state = GameState::new(1, Viewport::default());
        state.player.on_ground = false;
        state.player.pos.x = 820.0;
        autosave(&mut store, &state);
        assert_eq!(load(&store), Some(snapshot()));

        state.player.on_ground = true;
        autosave(&mut store, &state);
        assert_eq!(load(&store).unwrap().last_checkpoint_x, 820.0);
    }
}
