//! Named key sets and the capability that turns them into rated prompts.

use crate::assessment::Percent;
use crate::config::Config;
use crate::error::{TrainerError, TrainerResult};
use crate::key::{KeyDef, RatedKeyDef};
use crate::util::clamp_percent;
use include_dir::{include_dir, Dir};
use itertools::{iproduct, Itertools};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

static KEY_SET_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/key_sets");

/// Difficulty added when a prompt requires shift.
pub const SHIFT_PENALTY: Percent = 20.0;
/// Difficulty added when a prompt requires control.
pub const CONTROL_PENALTY: Percent = 30.0;
/// Difficulty added when a prompt requires alt.
pub const ALT_PENALTY: Percent = 25.0;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
pub enum KeySetName {
    #[default]
    #[serde(rename = "Home Keys")]
    #[strum(serialize = "Home Keys")]
    HomeKeys,
    #[serde(rename = "Top Row")]
    #[strum(serialize = "Top Row")]
    TopRow,
    #[serde(rename = "Bottom Row")]
    #[strum(serialize = "Bottom Row")]
    BottomRow,
    #[serde(rename = "Number Row")]
    #[strum(serialize = "Number Row")]
    NumberRow,
    #[serde(rename = "All Keys")]
    #[strum(serialize = "All Keys")]
    AllKeys,
}

impl KeySetName {
    pub fn all() -> Vec<KeySetName> {
        KeySetName::iter().collect()
    }

    /// Embedded definition file; `None` for sets composed from others.
    fn file_name(&self) -> Option<&'static str> {
        match self {
            KeySetName::HomeKeys => Some("home_keys.json"),
            KeySetName::TopRow => Some("top_row.json"),
            KeySetName::BottomRow => Some("bottom_row.json"),
            KeySetName::NumberRow => Some("number_row.json"),
            KeySetName::AllKeys => None,
        }
    }
}

/// An unmodified key with its base difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseKey {
    pub char: char,
    pub difficulty: Percent,
}

impl BaseKey {
    /// Rate `key` (a modified variant of this base key).
    pub fn rate(&self, key: KeyDef) -> RatedKeyDef {
        let mut difficulty = self.difficulty;
        if key.shift {
            difficulty += SHIFT_PENALTY;
        }
        if key.control {
            difficulty += CONTROL_PENALTY;
        }
        if key.alt {
            difficulty += ALT_PENALTY;
        }
        RatedKeyDef::new(key, clamp_percent(difficulty))
    }
}

#[derive(Deserialize)]
struct KeySetFile {
    name: String,
    keys: Vec<BaseKey>,
}

fn read_key_set_from_file(file_name: &str) -> TrainerResult<KeySetFile> {
    let file = KEY_SET_DIR
        .get_file(file_name)
        .ok_or_else(|| TrainerError::KeySet(format!("key set file not found: {file_name}")))?;

    let file_as_str = file
        .contents_utf8()
        .ok_or_else(|| TrainerError::KeySet(format!("key set file is not utf-8: {file_name}")))?;

    Ok(serde_json::from_str(file_as_str)?)
}

/// Base keys for every named key set.
#[derive(Debug, Clone, Default)]
pub struct KeySetCatalog {
    sets: HashMap<KeySetName, Vec<BaseKey>>,
}

impl KeySetCatalog {
    /// Load the key sets bundled with the crate.
    pub fn embedded() -> TrainerResult<Self> {
        let mut catalog = Self::default();
        for name in KeySetName::iter() {
            if let Some(file_name) = name.file_name() {
                let file = read_key_set_from_file(file_name)?;
                if file.name != name.to_string() {
                    return Err(TrainerError::KeySet(format!(
                        "{file_name} declares '{}', expected '{name}'",
                        file.name
                    )));
                }
                catalog.insert(name, file.keys);
            }
        }
        Ok(catalog)
    }

    pub fn insert(&mut self, name: KeySetName, keys: Vec<BaseKey>) {
        self.sets.insert(name, keys);
    }

    /// Base keys of `name`. `All Keys` is the union of the other sets unless
    /// defined explicitly.
    pub fn base_keys(&self, name: KeySetName) -> Vec<BaseKey> {
        if let Some(keys) = self.sets.get(&name) {
            return keys.clone();
        }
        match name {
            KeySetName::AllKeys => KeySetName::iter()
                .filter(|n| *n != KeySetName::AllKeys)
                .filter_map(|n| self.sets.get(&n))
                .flatten()
                .unique_by(|k| k.char)
                .copied()
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Every rated prompt `config` allows: each base key in every
    /// combination of the enabled modifiers, limited to the difficulty
    /// target. Falls back to the easiest keys when the target excludes all.
    pub fn enumerate(&self, config: &Config) -> Vec<RatedKeyDef> {
        let base = self.base_keys(config.key_set_name);
        let rated: Vec<RatedKeyDef> = iproduct!(
            base.iter(),
            modifier_options(config.shift_enabled),
            modifier_options(config.control_enabled),
            modifier_options(config.alt_enabled)
        )
        .map(|(b, shift, control, alt)| {
            b.rate(
                KeyDef::new(b.char)
                    .with_shift(shift)
                    .with_control(control)
                    .with_alt(alt),
            )
        })
        .collect();

        let within_target: Vec<RatedKeyDef> = rated
            .iter()
            .filter(|k| k.norm_difficulty <= config.difficulty_target)
            .copied()
            .collect();

        if within_target.is_empty() {
            rated
                .into_iter()
                .min_set_by(|a, b| a.norm_difficulty.total_cmp(&b.norm_difficulty))
        } else {
            within_target
        }
    }
}

fn modifier_options(enabled: bool) -> Vec<bool> {
    if enabled {
        vec![false, true]
    } else {
        vec![false]
    }
}

/// Supplies prompt content to a session.
pub trait KeySource {
    /// Every prompt currently available under `config`.
    fn enumerate_key_set(&self, config: &Config) -> Vec<RatedKeyDef>;

    /// Pick the next prompt from `available`; `None` when it is empty.
    fn next_key_prompt(&mut self, available: &[RatedKeyDef]) -> Option<RatedKeyDef>;
}

/// Draws prompts uniformly at random from the catalogue.
#[derive(Debug, Clone)]
pub struct RandomKeySource<R: Rng = StdRng> {
    catalog: KeySetCatalog,
    rng: R,
}

impl RandomKeySource<StdRng> {
    /// Embedded catalogue with an entropy-seeded generator.
    pub fn from_entropy() -> TrainerResult<Self> {
        Ok(Self::new(KeySetCatalog::embedded()?, StdRng::from_entropy()))
    }

    /// Embedded catalogue with a fixed seed, for reproducible drills.
    pub fn seeded(seed: u64) -> TrainerResult<Self> {
        Ok(Self::new(
            KeySetCatalog::embedded()?,
            StdRng::seed_from_u64(seed),
        ))
    }
}

impl<R: Rng> RandomKeySource<R> {
    pub fn new(catalog: KeySetCatalog, rng: R) -> Self {
        Self { catalog, rng }
    }

    pub fn catalog(&self) -> &KeySetCatalog {
        &self.catalog
    }
}

impl<R: Rng> KeySource for RandomKeySource<R> {
    fn enumerate_key_set(&self, config: &Config) -> Vec<RatedKeyDef> {
        self.catalog.enumerate(config)
    }

    fn next_key_prompt(&mut self, available: &[RatedKeyDef]) -> Option<RatedKeyDef> {
        available.choose(&mut self.rng).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn catalog() -> KeySetCatalog {
        KeySetCatalog::embedded().unwrap()
    }

    #[test]
    fn test_names_round_trip_through_strings() {
        for name in KeySetName::all() {
            assert_eq!(KeySetName::from_str(&name.to_string()).unwrap(), name);
        }
        assert_eq!(KeySetName::HomeKeys.to_string(), "Home Keys");
    }

    #[test]
    fn test_names_serialize_as_display_names() {
        let json = serde_json::to_string(&KeySetName::BottomRow).unwrap();
        assert_eq!(json, "\"Bottom Row\"");
    }

    #[test]
    fn test_embedded_sets_load() {
        let catalog = catalog();
        let home = catalog.base_keys(KeySetName::HomeKeys);
        assert_eq!(home.len(), 10);
        assert!(home.iter().any(|k| k.char == 'f' && k.difficulty == 0.0));
        for name in KeySetName::all() {
            assert!(!catalog.base_keys(name).is_empty(), "{name} is empty");
        }
    }

    #[test]
    fn test_all_keys_is_union() {
        let catalog = catalog();
        let all = catalog.base_keys(KeySetName::AllKeys);
        let parts: usize = [
            KeySetName::HomeKeys,
            KeySetName::TopRow,
            KeySetName::BottomRow,
            KeySetName::NumberRow,
        ]
        .iter()
        .map(|n| catalog.base_keys(*n).len())
        .sum();
        assert_eq!(all.len(), parts);
    }

    #[test]
    fn test_enumerate_without_modifiers() {
        let pool = catalog().enumerate(&Config::default());
        assert_eq!(pool.len(), 10);
        assert!(pool
            .iter()
            .all(|k| !k.key.shift && !k.key.control && !k.key.alt));
    }

    #[test]
    fn test_enumerate_with_shift_and_alt() {
        let config = Config {
            shift_enabled: true,
            alt_enabled: true,
            ..Config::default()
        };
        let pool = catalog().enumerate(&config);
        assert_eq!(pool.len(), 40);

        let shifted_f = pool
            .iter()
            .find(|k| k.key == KeyDef::new('f').with_shift(true))
            .unwrap();
        assert_eq!(shifted_f.norm_difficulty, SHIFT_PENALTY);

        let both_f = pool
            .iter()
            .find(|k| k.key == KeyDef::new('f').with_shift(true).with_alt(true))
            .unwrap();
        assert_eq!(both_f.norm_difficulty, SHIFT_PENALTY + ALT_PENALTY);
    }

    #[test]
    fn test_difficulty_clamped() {
        let base = BaseKey {
            char: '`',
            difficulty: 80.0,
        };
        let rated = base.rate(KeyDef::new('`').with_control(true).with_alt(true));
        assert_eq!(rated.norm_difficulty, 100.0);
    }

    #[test]
    fn test_difficulty_target_filters() {
        let config = Config {
            difficulty_target: 5.0,
            ..Config::default()
        };
        let pool = catalog().enumerate(&config);
        let chars: Vec<char> = pool.iter().map(|k| k.key.char).sorted().collect();
        assert_eq!(chars, vec!['d', 'f', 'j', 'k']);
    }

    #[test]
    fn test_difficulty_target_falls_back_to_easiest() {
        let config = Config {
            key_set_name: KeySetName::NumberRow,
            difficulty_target: 10.0,
            ..Config::default()
        };
        let pool = catalog().enumerate(&config);
        let chars: Vec<char> = pool.iter().map(|k| k.key.char).sorted().collect();
        assert_eq!(chars, vec!['4', '7']);
    }

    #[test]
    fn test_random_source_draws_from_pool() {
        let mut source = RandomKeySource::seeded(7).unwrap();
        let pool = source.enumerate_key_set(&Config::default());
        for _ in 0..50 {
            let prompt = source.next_key_prompt(&pool).unwrap();
            assert!(pool.contains(&prompt));
        }
    }

    #[test]
    fn test_random_source_empty_pool() {
        let mut source = RandomKeySource::seeded(7).unwrap();
        assert_eq!(source.next_key_prompt(&[]), None);
    }

    #[test]
    fn test_seeded_sources_agree() {
        let mut a = RandomKeySource::seeded(42).unwrap();
        let mut b = RandomKeySource::seeded(42).unwrap();
        let pool = a.enumerate_key_set(&Config::default());
        let from_a: Vec<_> = (0..10).filter_map(|_| a.next_key_prompt(&pool)).collect();
        let from_b: Vec<_> = (0..10).filter_map(|_| b.next_key_prompt(&pool)).collect();
        assert_eq!(from_a, from_b);
    }
}
