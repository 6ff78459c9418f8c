//! Per-world persistence of montage tests.
//!
//! Each world has one slot: the active test (at most one), a list of drafts,
//! and an archive of completed tests. Stores always read and write whole
//! records, so a failed operation never leaves a half-written test behind.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use montage_core::{MontageTest, TestId};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;

/// Identifier of the world (game, campaign) a montage belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorldId(pub String);

impl From<&str> for WorldId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for WorldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A resolved test moved out of the active slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivedTest {
    /// The final record.
    #[serde(flatten)]
    pub test: MontageTest,
    /// When it was archived.
    pub completed_at: DateTime<Utc>,
}

/// Everything stored for one world.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldSlot {
    /// The test in play, if any.
    #[serde(default)]
    pub active: Option<MontageTest>,
    /// Tests prepared for later.
    #[serde(default)]
    pub drafts: Vec<MontageTest>,
    /// Completed tests, oldest first.
    #[serde(default)]
    pub completed: Vec<ArchivedTest>,
}

/// Storage for montage tests, keyed by world.
pub trait MontageStore: Send + Sync {
    /// The active test.
    fn load(&self, world: &WorldId) -> EngineResult<Option<MontageTest>>;
    /// Replace the active test.
    fn save(&self, world: &WorldId, test: &MontageTest) -> EngineResult<()>;
    /// Empty the active slot.
    fn clear(&self, world: &WorldId) -> EngineResult<()>;
    /// All drafts.
    fn drafts(&self, world: &WorldId) -> EngineResult<Vec<MontageTest>>;
    /// A single draft.
    fn draft(&self, world: &WorldId, id: TestId) -> EngineResult<Option<MontageTest>> {
        Ok(self.drafts(world)?.into_iter().find(|d| d.id == id))
    }
    /// Add a draft.
    fn add_draft(&self, world: &WorldId, test: &MontageTest) -> EngineResult<()>;
    /// Replace a draft with the same ID. Returns false if there was none.
    fn update_draft(&self, world: &WorldId, test: &MontageTest) -> EngineResult<bool>;
    /// Delete a draft. Returns false if there was none.
    fn delete_draft(&self, world: &WorldId, id: TestId) -> EngineResult<bool>;
    /// Append a test to the archive.
    fn archive(&self, world: &WorldId, test: &MontageTest) -> EngineResult<()>;
    /// The archive, oldest first.
    fn completed(&self, world: &WorldId) -> EngineResult<Vec<ArchivedTest>>;
}

/// A backend that can read and write whole world slots.
///
/// Every [`SlotStore`] is a [`MontageStore`].
pub trait SlotStore: Send + Sync {
    /// Read a slot; a world with nothing stored yields an empty slot.
    fn read_slot(&self, world: &WorldId) -> EngineResult<WorldSlot>;
    /// Write a slot back.
    fn write_slot(&self, world: &WorldId, slot: &WorldSlot) -> EngineResult<()>;

    /// Read, change, and write a slot.
    fn update_slot<T>(
        &self,
        world: &WorldId,
        change: impl FnOnce(&mut WorldSlot) -> T,
    ) -> EngineResult<T> {
        let mut slot = self.read_slot(world)?;
        let out = change(&mut slot);
        self.write_slot(world, &slot)?;
        Ok(out)
    }
}

impl<S: SlotStore> MontageStore for S {
    fn load(&self, world: &WorldId) -> EngineResult<Option<MontageTest>> {
        Ok(self.read_slot(world)?.active)
    }

    fn save(&self, world: &WorldId, test: &MontageTest) -> EngineResult<()> {
        self.update_slot(world, |slot| slot.active = Some(test.clone()))
    }

    fn clear(&self, world: &WorldId) -> EngineResult<()> {
        self.update_slot(world, |slot| slot.active = None)
    }

    fn drafts(&self, world: &WorldId) -> EngineResult<Vec<MontageTest>> {
        Ok(self.read_slot(world)?.drafts)
    }

    fn add_draft(&self, world: &WorldId, test: &MontageTest) -> EngineResult<()> {
        self.update_slot(world, |slot| slot.drafts.push(test.clone()))
    }

    fn update_draft(&self, world: &WorldId, test: &MontageTest) -> EngineResult<bool> {
        self.update_slot(world, |slot| {
            match slot.drafts.iter_mut().find(|d| d.id == test.id) {
                Some(existing) => {
                    *existing = test.clone();
                    true
                }
                None => false,
            }
        })
    }

    fn delete_draft(&self, world: &WorldId, id: TestId) -> EngineResult<bool> {
        self.update_slot(world, |slot| {
            let before = slot.drafts.len();
            slot.drafts.retain(|d| d.id != id);
            slot.drafts.len() != before
        })
    }

    fn archive(&self, world: &WorldId, test: &MontageTest) -> EngineResult<()> {
        self.update_slot(world, |slot| {
            slot.completed.push(ArchivedTest {
                test: test.clone(),
                completed_at: Utc::now(),
            });
        })
    }

    fn completed(&self, world: &WorldId) -> EngineResult<Vec<ArchivedTest>> {
        Ok(self.read_slot(world)?.completed)
    }
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    worlds: Mutex<HashMap<WorldId, WorldSlot>>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotStore for MemoryStore {
    fn read_slot(&self, world: &WorldId) -> EngineResult<WorldSlot> {
        Ok(self.worlds.lock().get(world).cloned().unwrap_or_default())
    }

    fn write_slot(&self, world: &WorldId, slot: &WorldSlot) -> EngineResult<()> {
        self.worlds.lock().insert(world.clone(), slot.clone());
        Ok(())
    }

    fn update_slot<T>(
        &self,
        world: &WorldId,
        change: impl FnOnce(&mut WorldSlot) -> T,
    ) -> EngineResult<T> {
        let mut worlds = self.worlds.lock();
        Ok(change(worlds.entry(world.clone()).or_default()))
    }
}

/// One JSON file per world in a data directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// A store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The data directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The file holding a world's slot.
    ///
    /// ASCII letters, digits, and `-` are kept; every other byte is written
    /// as `_` plus two hex digits, so distinct worlds never share a file.
    pub fn path_for(&self, world: &WorldId) -> PathBuf {
        let mut stem = String::with_capacity(world.0.len());
        for byte in world.0.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'-' {
                stem.push(char::from(byte));
            } else {
                stem.push_str(&format!("_{byte:02x}"));
            }
        }
        self.dir.join(format!("{stem}.json"))
    }
}

impl SlotStore for JsonFileStore {
    fn read_slot(&self, world: &WorldId) -> EngineResult<WorldSlot> {
        let path = self.path_for(world);
        if !path.exists() {
            return Ok(WorldSlot::default());
        }
        let raw = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn write_slot(&self, world: &WorldId, slot: &WorldSlot) -> EngineResult<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(world);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(slot)?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}
