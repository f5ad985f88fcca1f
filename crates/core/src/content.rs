use crate::types::{BehaviorTag, RangedProfile, SkillKey, StatBlock, StatusKind};

pub mod keys {
    pub const ENEMY_BONE_RAT: &str = "enemy_bone_rat";
    pub const ENEMY_CINDER_BAT: &str = "enemy_cinder_bat";
    pub const ENEMY_HOLLOW_ARCHER: &str = "enemy_hollow_archer";
    pub const ENEMY_CRYPT_JACKAL: &str = "enemy_crypt_jackal";
    pub const ENEMY_VAULT_SPIDER: &str = "enemy_vault_spider";
    pub const ENEMY_RUST_SENTINEL: &str = "enemy_rust_sentinel";
    pub const ENEMY_GRAVE_WARLOCK: &str = "enemy_grave_warlock";
    pub const ENEMY_DUSK_STALKER: &str = "enemy_dusk_stalker";
    pub const ENEMY_CHAINED_BRUTE: &str = "enemy_chained_brute";
    pub const ENEMY_PALE_KNIGHT: &str = "enemy_pale_knight";

    pub const BOSS_TOMB_TYRANT: &str = "boss_tomb_tyrant";
    pub const BOSS_SHARD_MATRON: &str = "boss_shard_matron";
    pub const BOSS_ASHEN_COLOSSUS: &str = "boss_ashen_colossus";
    pub const BOSS_NETHER_SOVEREIGN: &str = "boss_nether_sovereign";
}

pub struct EnemyArchetype {
    pub key: &'static str,
    pub name: &'static str,
    /// Shallowest dungeon level this archetype spawns on.
    pub min_level: u32,
    pub base_hp: i32,
    pub base_mp: i32,
    pub stats: StatBlock,
    pub behavior: BehaviorTag,
    pub ranged: Option<RangedProfile>,
    pub base_exp: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkillKind {
    Physical,
    Magic,
}

/// Status an attack or skill tries to put on its target when it connects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusApplication {
    pub kind: StatusKind,
    pub turns: u32,
    pub magnitude: i32,
}

pub struct SkillSpec {
    pub key: SkillKey,
    pub name: &'static str,
    pub kind: SkillKind,
    /// Multiplier on the attacking stat. Unused when `range` is 0.
    pub coefficient: f32,
    pub mp_cost: i32,
    /// 0 targets the caster, 1 is melee reach, above 1 requires line of sight.
    pub range: u32,
    pub cooldown: u32,
    pub applies: Option<StatusApplication>,
}

#[derive(Debug)]
pub enum ContentError {
    NoEnemies,
    NoBosses,
    NoEntryLevelEnemies,
    DuplicateArchetypeKey(&'static str),
    InvalidArchetype(&'static str),
    DuplicateSkill(SkillKey),
    InvalidSkill(SkillKey),
}

pub struct ContentPack {
    pub enemies: Vec<EnemyArchetype>,
    pub bosses: Vec<EnemyArchetype>,
    pub skills: Vec<SkillSpec>,
}

impl ContentPack {
    pub fn build_default() -> Self {
        Self {
            enemies: vec![
                EnemyArchetype {
                    key: keys::ENEMY_BONE_RAT,
                    name: "Bone Rat",
                    min_level: 1,
                    base_hp: 8,
                    base_mp: 0,
                    stats: StatBlock {
                        attack: 3,
                        defense: 0,
                        magic_attack: 0,
                        magic_defense: 0,
                        crit_chance: 0.05,
                        evasion: 0.05,
                    },
                    behavior: BehaviorTag::Aggressive,
                    ranged: None,
                    base_exp: 4,
                },
                EnemyArchetype {
                    key: keys::ENEMY_CINDER_BAT,
                    name: "Cinder Bat",
                    min_level: 1,
                    base_hp: 6,
                    base_mp: 0,
                    stats: StatBlock {
                        attack: 4,
                        defense: 0,
                        magic_attack: 0,
                        magic_defense: 1,
                        crit_chance: 0.10,
                        evasion: 0.15,
                    },
                    behavior: BehaviorTag::Ambush,
                    ranged: None,
                    base_exp: 5,
                },
                EnemyArchetype {
                    key: keys::ENEMY_HOLLOW_ARCHER,
                    name: "Hollow Archer",
                    min_level: 1,
                    base_hp: 9,
                    base_mp: 0,
                    stats: StatBlock {
                        attack: 4,
                        defense: 1,
                        magic_attack: 0,
                        magic_defense: 0,
                        crit_chance: 0.10,
                        evasion: 0.05,
                    },
                    behavior: BehaviorTag::Cautious,
                    ranged: Some(RangedProfile { max_range: 6, prefers_melee: false }),
                    base_exp: 6,
                },
                EnemyArchetype {
                    key: keys::ENEMY_CRYPT_JACKAL,
                    name: "Crypt Jackal",
                    min_level: 2,
                    base_hp: 11,
                    base_mp: 0,
                    stats: StatBlock {
                        attack: 5,
                        defense: 1,
                        magic_attack: 0,
                        magic_defense: 0,
                        crit_chance: 0.10,
                        evasion: 0.10,
                    },
                    behavior: BehaviorTag::Pack,
                    ranged: None,
                    base_exp: 7,
                },
                EnemyArchetype {
                    key: keys::ENEMY_VAULT_SPIDER,
                    name: "Vault Spider",
                    min_level: 2,
                    base_hp: 10,
                    base_mp: 0,
                    stats: StatBlock {
                        attack: 6,
                        defense: 0,
                        magic_attack: 0,
                        magic_defense: 2,
                        crit_chance: 0.15,
                        evasion: 0.10,
                    },
                    behavior: BehaviorTag::Ambush,
                    ranged: None,
                    base_exp: 8,
                },
                EnemyArchetype {
                    key: keys::ENEMY_RUST_SENTINEL,
                    name: "Rust Sentinel",
                    min_level: 3,
                    base_hp: 22,
                    base_mp: 0,
                    stats: StatBlock {
                        attack: 5,
                        defense: 4,
                        magic_attack: 0,
                        magic_defense: 1,
                        crit_chance: 0.05,
                        evasion: 0.0,
                    },
                    behavior: BehaviorTag::Aggressive,
                    ranged: None,
                    base_exp: 10,
                },
                EnemyArchetype {
                    key: keys::ENEMY_GRAVE_WARLOCK,
                    name: "Grave Warlock",
                    min_level: 3,
                    base_hp: 13,
                    base_mp: 12,
                    stats: StatBlock {
                        attack: 4,
                        defense: 1,
                        magic_attack: 7,
                        magic_defense: 4,
                        crit_chance: 0.10,
                        evasion: 0.05,
                    },
                    behavior: BehaviorTag::Cautious,
                    ranged: Some(RangedProfile { max_range: 5, prefers_melee: false }),
                    base_exp: 12,
                },
                EnemyArchetype {
                    key: keys::ENEMY_DUSK_STALKER,
                    name: "Dusk Stalker",
                    min_level: 4,
                    base_hp: 16,
                    base_mp: 0,
                    stats: StatBlock {
                        attack: 7,
                        defense: 2,
                        magic_attack: 0,
                        magic_defense: 2,
                        crit_chance: 0.25,
                        evasion: 0.15,
                    },
                    behavior: BehaviorTag::Pack,
                    ranged: None,
                    base_exp: 14,
                },
                EnemyArchetype {
                    key: keys::ENEMY_CHAINED_BRUTE,
                    name: "Chained Brute",
                    min_level: 5,
                    base_hp: 28,
                    base_mp: 0,
                    stats: StatBlock {
                        attack: 9,
                        defense: 3,
                        magic_attack: 0,
                        magic_defense: 1,
                        crit_chance: 0.10,
                        evasion: 0.0,
                    },
                    behavior: BehaviorTag::Aggressive,
                    ranged: Some(RangedProfile { max_range: 4, prefers_melee: true }), // Hurls chains, then wades in.
                    base_exp: 18,
                },
                EnemyArchetype {
                    key: keys::ENEMY_PALE_KNIGHT,
                    name: "Pale Knight",
                    min_level: 6,
                    base_hp: 34,
                    base_mp: 0,
                    stats: StatBlock {
                        attack: 10,
                        defense: 6,
                        magic_attack: 0,
                        magic_defense: 4,
                        crit_chance: 0.15,
                        evasion: 0.05,
                    },
                    behavior: BehaviorTag::Aggressive,
                    ranged: None,
                    base_exp: 24,
                },
            ],
            bosses: vec![
                EnemyArchetype {
                    key: keys::BOSS_TOMB_TYRANT,
                    name: "Tomb Tyrant",
                    min_level: 1,
                    base_hp: 60,
                    base_mp: 0,
                    stats: StatBlock {
                        attack: 8,
                        defense: 2,
                        magic_attack: 0,
                        magic_defense: 2,
                        crit_chance: 0.10,
                        evasion: 0.0,
                    },
                    behavior: BehaviorTag::Boss,
                    ranged: None,
                    base_exp: 50,
                },
                EnemyArchetype {
                    key: keys::BOSS_SHARD_MATRON,
                    name: "Shard Matron",
                    min_level: 2,
                    base_hp: 75,
                    base_mp: 20,
                    stats: StatBlock {
                        attack: 9,
                        defense: 3,
                        magic_attack: 8,
                        magic_defense: 5,
                        crit_chance: 0.15,
                        evasion: 0.05,
                    },
                    behavior: BehaviorTag::Boss,
                    ranged: Some(RangedProfile { max_range: 5, prefers_melee: false }),
                    base_exp: 80,
                },
                EnemyArchetype {
                    key: keys::BOSS_ASHEN_COLOSSUS,
                    name: "Ashen Colossus",
                    min_level: 3,
                    base_hp: 110,
                    base_mp: 0,
                    stats: StatBlock {
                        attack: 12,
                        defense: 6,
                        magic_attack: 0,
                        magic_defense: 3,
                        crit_chance: 0.10,
                        evasion: 0.0,
                    },
                    behavior: BehaviorTag::Boss,
                    ranged: None,
                    base_exp: 120,
                },
                EnemyArchetype {
                    key: keys::BOSS_NETHER_SOVEREIGN,
                    name: "Nether Sovereign",
                    min_level: 4,
                    base_hp: 140,
                    base_mp: 30,
                    stats: StatBlock {
                        attack: 14,
                        defense: 5,
                        magic_attack: 12,
                        magic_defense: 8,
                        crit_chance: 0.20,
                        evasion: 0.10,
                    },
                    behavior: BehaviorTag::Boss,
                    ranged: Some(RangedProfile { max_range: 6, prefers_melee: true }),
                    base_exp: 200,
                },
            ],
            skills: vec![
                SkillSpec {
                    key: SkillKey::HeavyStrike,
                    name: "Heavy Strike",
                    kind: SkillKind::Physical,
                    coefficient: 1.6,
                    mp_cost: 4,
                    range: 1,
                    cooldown: 3,
                    applies: None,
                },
                SkillSpec {
                    key: SkillKey::PiercingBolt,
                    name: "Piercing Bolt",
                    kind: SkillKind::Physical,
                    coefficient: 1.2,
                    mp_cost: 5,
                    range: 5,
                    cooldown: 2,
                    applies: Some(StatusApplication {
                        kind: StatusKind::Bleed,
                        turns: 3,
                        magnitude: 2,
                    }),
                },
                SkillSpec {
                    key: SkillKey::StunningBlow,
                    name: "Stunning Blow",
                    kind: SkillKind::Physical,
                    coefficient: 1.0,
                    mp_cost: 6,
                    range: 1,
                    cooldown: 5,
                    applies: Some(StatusApplication {
                        kind: StatusKind::Stun,
                        turns: 1,
                        magnitude: 0,
                    }),
                },
                SkillSpec {
                    key: SkillKey::Hamstring,
                    name: "Hamstring",
                    kind: SkillKind::Physical,
                    coefficient: 0.8,
                    mp_cost: 4,
                    range: 1,
                    cooldown: 4,
                    applies: Some(StatusApplication {
                        kind: StatusKind::Slow,
                        turns: 4,
                        magnitude: 0,
                    }),
                },
                SkillSpec {
                    key: SkillKey::MarkPrey,
                    name: "Mark Prey",
                    kind: SkillKind::Magic,
                    coefficient: 0.5,
                    mp_cost: 5,
                    range: 6,
                    cooldown: 4,
                    applies: Some(StatusApplication {
                        kind: StatusKind::Mark,
                        turns: 5,
                        magnitude: 30, // Marked attackers lose 30% of outgoing damage.
                    }),
                },
                SkillSpec {
                    key: SkillKey::ShadowVeil,
                    name: "Shadow Veil",
                    kind: SkillKind::Magic,
                    coefficient: 0.0,
                    mp_cost: 8,
                    range: 0,
                    cooldown: 8,
                    applies: Some(StatusApplication {
                        kind: StatusKind::Veiled,
                        turns: 6,
                        magnitude: 0,
                    }),
                },
                SkillSpec {
                    key: SkillKey::ArcaneBurst,
                    name: "Arcane Burst",
                    kind: SkillKind::Magic,
                    coefficient: 1.8,
                    mp_cost: 10,
                    range: 4,
                    cooldown: 6,
                    applies: None,
                },
            ],
        }
    }

    /// Checks the pack before a run starts so bad data fails loudly instead of
    /// corrupting a simulation midway.
    pub fn validate(&self) -> Result<(), ContentError> {
        if self.enemies.is_empty() {
            return Err(ContentError::NoEnemies);
        }
        if self.bosses.is_empty() {
            return Err(ContentError::NoBosses);
        }
        // The shallowest level still needs a non-empty spawn pool.
        if !self.enemies.iter().any(|archetype| archetype.min_level == 1) {
            return Err(ContentError::NoEntryLevelEnemies);
        }
        for boss in &self.bosses {
            if boss.behavior != BehaviorTag::Boss {
                return Err(ContentError::InvalidArchetype(boss.key));
            }
        }
        let mut seen_keys = std::collections::BTreeSet::new();
        for archetype in self.enemies.iter().chain(self.bosses.iter()) {
            if !seen_keys.insert(archetype.key) {
                return Err(ContentError::DuplicateArchetypeKey(archetype.key));
            }
            let bad_stats = archetype.base_hp <= 0
                || archetype.base_mp < 0
                || archetype.min_level == 0
                || archetype.base_exp < 0
                || !(0.0..=1.0).contains(&archetype.stats.crit_chance)
                || !(0.0..=1.0).contains(&archetype.stats.evasion);
            if bad_stats {
                return Err(ContentError::InvalidArchetype(archetype.key));
            }
            if let Some(profile) = archetype.ranged {
                if profile.max_range < 2 {
                    return Err(ContentError::InvalidArchetype(archetype.key));
                }
            }
        }
        let mut seen_skills = std::collections::BTreeSet::new();
        for skill in &self.skills {
            if !seen_skills.insert(skill.key) {
                return Err(ContentError::DuplicateSkill(skill.key));
            }
            if skill.mp_cost < 0 {
                return Err(ContentError::InvalidSkill(skill.key));
            }
            // A self-targeted skill carries no damage roll, so it must apply
            // a status to do anything at all.
            let dead_skill = if skill.range == 0 {
                skill.applies.is_none()
            } else {
                skill.coefficient <= 0.0
            };
            if dead_skill {
                return Err(ContentError::InvalidSkill(skill.key));
            }
        }
        Ok(())
    }

    pub fn archetype(&self, key: &str) -> Option<&EnemyArchetype> {
        self.enemies.iter().chain(self.bosses.iter()).find(|archetype| archetype.key == key)
    }

    pub fn skill(&self, key: SkillKey) -> Option<&SkillSpec> {
        self.skills.iter().find(|skill| skill.key == key)
    }

    /// Boss roster is indexed by dungeon level, clamped to the deepest entry.
    pub fn boss_for_level(&self, dungeon_level: u32) -> &EnemyArchetype {
        let index = (dungeon_level.saturating_sub(1) as usize).min(self.bosses.len() - 1);
        &self.bosses[index]
    }
}

impl Default for ContentPack {
    fn default() -> Self {
        Self::build_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pack_passes_validation() {
        ContentPack::build_default().validate().expect("shipped content must be valid");
    }

    #[test]
    fn boss_roster_clamps_to_deepest_entry() {
        let pack = ContentPack::build_default();
        assert_eq!(pack.boss_for_level(1).key, keys::BOSS_TOMB_TYRANT);
        assert_eq!(pack.boss_for_level(4).key, keys::BOSS_NETHER_SOVEREIGN);
        assert_eq!(
            pack.boss_for_level(40).key,
            keys::BOSS_NETHER_SOVEREIGN,
            "levels past the roster reuse the final boss"
        );
    }

    #[test]
    fn a_roster_without_level_one_enemies_is_rejected() {
        let mut pack = ContentPack::build_default();
        for enemy in &mut pack.enemies {
            enemy.min_level = enemy.min_level.max(2);
        }
        assert!(matches!(pack.validate(), Err(ContentError::NoEntryLevelEnemies)));
    }

    #[test]
    fn a_boss_without_the_boss_tag_is_rejected() {
        let mut pack = ContentPack::build_default();
        pack.bosses[0].behavior = BehaviorTag::Aggressive;
        match pack.validate() {
            Err(ContentError::InvalidArchetype(key)) => assert_eq!(key, keys::BOSS_TOMB_TYRANT),
            other => panic!("expected invalid archetype error, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_archetype_keys_are_rejected() {
        let mut pack = ContentPack::build_default();
        let copy_key = pack.enemies[0].key;
        pack.bosses[0].key = copy_key;
        match pack.validate() {
            Err(ContentError::DuplicateArchetypeKey(key)) => assert_eq!(key, copy_key),
            other => panic!("expected duplicate key error, got {other:?}"),
        }
    }

    #[test]
    fn self_targeted_skill_without_a_status_is_rejected() {
        let mut pack = ContentPack::build_default();
        for skill in &mut pack.skills {
            if skill.range == 0 {
                skill.applies = None;
            }
        }
        assert!(matches!(pack.validate(), Err(ContentError::InvalidSkill(_))));
    }

    #[test]
    fn lookup_finds_enemies_and_bosses_alike() {
        let pack = ContentPack::build_default();
        assert!(pack.archetype(keys::ENEMY_BONE_RAT).is_some());
        assert!(pack.archetype(keys::BOSS_ASHEN_COLOSSUS).is_some());
        assert!(pack.archetype("enemy_unknown").is_none());
        assert!(pack.skill(SkillKey::ArcaneBurst).is_some());
    }
}
