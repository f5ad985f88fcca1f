//! Turn scheduling: player action, upkeep, enemy turns, death pruning.
//! This module exists to run one simulation tick in a fixed phase order.
//! It does not own decision policy or damage formulas.

use super::*;
use crate::content::ContentPack;
use crate::rng::RandomSource;
use crate::state::DungeonState;

/// Enemies beyond this Manhattan distance from the player sleep through
/// their turn untouched, statuses included.
const ACTIVATION_RADIUS: u32 = 10;
/// Bosses stir from farther away.
const BOSS_ACTIVATION_RADIUS: u32 = 16;

/// Runs one full simulation turn and reports everything that happened.
///
/// The phases always run in the same order: the player's action, player
/// upkeep, every awake enemy in stable id order, then pruning of the dead.
/// A rejected player action wastes the turn but never stops the rest of
/// the tick.
pub fn tick(
    state: &mut DungeonState,
    action: PlayerAction,
    content: &ContentPack,
    rng: &mut RandomSource,
) -> TickResult {
    state.turn += 1;
    let mut events = Vec::new();

    let rejection = apply_player_action(state, action, content, rng, &mut events);
    player_upkeep(state, &mut events);
    enemy_phase(state, rng, &mut events);
    let deaths = prune_dead(state);

    let outcome = if state.player().hp <= 0 {
        Some(RunOutcome::Defeat)
    } else if deaths.iter().any(|death| death.was_boss) {
        Some(RunOutcome::Victory)
    } else {
        None
    };

    TickResult { turn: state.turn, events, deaths, rejection, outcome }
}

fn apply_player_action(
    state: &mut DungeonState,
    action: PlayerAction,
    content: &ContentPack,
    rng: &mut RandomSource,
    events: &mut Vec<TickEvent>,
) -> Option<ActionRejection> {
    if state.player().has_status(StatusKind::Stun) {
        return Some(ActionRejection::PlayerStunned);
    }

    match action {
        PlayerAction::Wait => None,
        PlayerAction::Move(to) => {
            let from = state.player().pos;
            if from.chebyshev(to) != 1 {
                return Some(ActionRejection::NotAdjacent);
            }
            if state.map.tile_at(to) == (Tile::Door { open: false }) {
                state.map.open_door(to);
                events.push(TickEvent::DoorOpened { pos: to });
                return None;
            }
            if !state.map.is_walkable(to) {
                return Some(ActionRejection::BlockedTile);
            }
            if state.entity_at(to).is_some() {
                return Some(ActionRejection::TileOccupied);
            }
            state.entities[state.player_id].pos = to;
            events.push(TickEvent::PlayerMoved { from, to });
            None
        }
        PlayerAction::Attack { target } => {
            if state.player().pos.manhattan(target) != 1 {
                return Some(ActionRejection::NotAdjacent);
            }
            let Some(defender_id) = state.entity_at(target) else {
                return Some(ActionRejection::NoTarget);
            };
            let outcome = combat::resolve_melee(state.player(), &state.entities[defender_id], rng);
            if !outcome.evaded {
                state.entities[defender_id].apply_damage(outcome.damage);
            }
            events.push(TickEvent::PlayerStruck {
                target: defender_id,
                damage: outcome.damage,
                evaded: outcome.evaded,
                crit: outcome.crit,
            });
            None
        }
        PlayerAction::Skill { key, target } => {
            let Some(spec) = content.skill(key) else {
                return Some(ActionRejection::UnknownSkill);
            };
            if state.cooldowns.get(&key).copied().unwrap_or(0) > 0 {
                return Some(ActionRejection::SkillOnCooldown);
            }
            if state.player().mp < spec.mp_cost {
                return Some(ActionRejection::NotEnoughMana);
            }

            if spec.range == 0 {
                let player_id = state.player_id;
                let outcome = combat::resolve_skill(state.player(), state.player(), spec, rng);
                let applied = outcome.applies.map(|application| {
                    state.entities[player_id].add_status(StatusEffect {
                        kind: application.kind,
                        remaining_turns: application.turns,
                        magnitude: application.magnitude,
                    });
                    application.kind
                });
                state.entities[player_id].mp -= spec.mp_cost;
                state.cooldowns.insert(key, spec.cooldown);
                events.push(TickEvent::PlayerCast {
                    key,
                    target: player_id,
                    damage: 0,
                    evaded: false,
                    applied,
                });
                return None;
            }

            let player_pos = state.player().pos;
            let dist = player_pos.manhattan(target);
            if dist > spec.range {
                return Some(ActionRejection::TargetOutOfRange);
            }
            if dist > 1 && !visibility::has_line_of_sight(&state.map, player_pos, target) {
                return Some(ActionRejection::NoLineOfSight);
            }
            let Some(defender_id) = state.entity_at(target) else {
                return Some(ActionRejection::NoTarget);
            };

            let outcome =
                combat::resolve_skill(state.player(), &state.entities[defender_id], spec, rng);
            if !outcome.evaded {
                state.entities[defender_id].apply_damage(outcome.damage);
            }
            let applied = outcome.applies.map(|application| {
                state.entities[defender_id].add_status(StatusEffect {
                    kind: application.kind,
                    remaining_turns: application.turns,
                    magnitude: application.magnitude,
                });
                application.kind
            });
            state.entities[state.player_id].mp -= spec.mp_cost;
            state.cooldowns.insert(key, spec.cooldown);
            events.push(TickEvent::PlayerCast {
                key,
                target: defender_id,
                damage: outcome.damage,
                evaded: outcome.evaded,
                applied,
            });
            None
        }
    }
}

/// Cooldowns count down and the player's statuses tick, whether or not the
/// action phase did anything.
fn player_upkeep(state: &mut DungeonState, events: &mut Vec<TickEvent>) {
    for remaining in state.cooldowns.values_mut() {
        *remaining = remaining.saturating_sub(1);
    }
    state.cooldowns.retain(|_, remaining| *remaining > 0);

    let player_id = state.player_id;
    let (dot_damage, expired) = state.entities[player_id].tick_statuses(&[]);
    if dot_damage > 0 {
        events.push(TickEvent::StatusDamage { entity: player_id, damage: dot_damage });
    }
    for kind in expired {
        events.push(TickEvent::StatusExpired { entity: player_id, kind });
    }
}

fn enemy_phase(state: &mut DungeonState, rng: &mut RandomSource, events: &mut Vec<TickEvent>) {
    let enemy_ids: Vec<EntityId> =
        state.entities.keys().filter(|id| *id != state.player_id).collect();

    for id in enemy_ids {
        if state.player().hp <= 0 {
            return;
        }
        if state.entities[id].hp <= 0 {
            continue;
        }

        let dist = state.entities[id].pos.manhattan(state.player().pos);
        let radius = if state.entities[id].is_boss {
            BOSS_ACTIVATION_RADIUS
        } else {
            ACTIVATION_RADIUS
        };
        if dist > radius {
            continue;
        }

        let player_snapshot = state.player().clone();
        let bystanders = bystanders_of(state, id);
        let mut enemy = state.entities[id].clone();
        let action = ai::decide(&mut enemy, &player_snapshot, &bystanders, &state.map, rng);
        state.entities[id] = enemy;

        apply_enemy_action(state, id, action, rng, events);
    }
}

/// Everyone except the deciding enemy and the player, for flank checks and
/// collision avoidance.
fn bystanders_of(state: &DungeonState, current: EntityId) -> Vec<ai::NearbyEnemy> {
    state
        .entities
        .iter()
        .filter(|(id, entity)| *id != current && *id != state.player_id && entity.hp > 0)
        .map(|(_, entity)| ai::NearbyEnemy { pos: entity.pos, behavior: entity.behavior })
        .collect()
}

fn apply_enemy_action(
    state: &mut DungeonState,
    id: EntityId,
    action: Action,
    rng: &mut RandomSource,
    events: &mut Vec<TickEvent>,
) {
    match action {
        Action::Attack => {
            let outcome = combat::resolve_melee(&state.entities[id], state.player(), rng);
            if !outcome.evaded {
                state.entities[state.player_id].apply_damage(outcome.damage);
            }
            events.push(TickEvent::EnemyStruck {
                enemy: id,
                damage: outcome.damage,
                evaded: outcome.evaded,
                crit: outcome.crit,
            });
        }
        Action::RangedAttack => {
            let outcome = combat::resolve_ranged(&state.entities[id], state.player(), rng);
            if !outcome.evaded {
                state.entities[state.player_id].apply_damage(outcome.damage);
            }
            events.push(TickEvent::EnemyShot {
                enemy: id,
                damage: outcome.damage,
                evaded: outcome.evaded,
                crit: outcome.crit,
            });
        }
        Action::Move(to) => {
            let from = state.entities[id].pos;
            state.entities[id].pos = to;
            events.push(TickEvent::EnemyMoved { enemy: id, from, to });
        }
        Action::Stunned => {
            events.push(TickEvent::EnemyHeld { enemy: id, kind: StatusKind::Stun });
        }
        Action::Slowed => {
            events.push(TickEvent::EnemyHeld { enemy: id, kind: StatusKind::Slow });
        }
        Action::Wait | Action::Perish => {}
    }
}

/// Sweeps out everything at zero hp except the player and reports each body.
fn prune_dead(state: &mut DungeonState) -> Vec<DeathReport> {
    let dead_ids: Vec<EntityId> = state
        .entities
        .iter()
        .filter(|(id, entity)| *id != state.player_id && entity.hp <= 0)
        .map(|(id, _)| id)
        .collect();

    let mut deaths = Vec::new();
    for id in dead_ids {
        let entity = state.entities.remove(id).expect("dead entity was just enumerated");
        deaths.push(DeathReport {
            entity: id,
            archetype: entity.archetype,
            pos: entity.pos,
            exp_reward: entity.exp_reward,
            was_boss: entity.is_boss,
        });
    }
    deaths
}
