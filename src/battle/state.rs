use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the battle is acting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Side {
    Player,
    Opponent,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Player => Side::Opponent,
            Side::Opponent => Side::Player,
        }
    }
}

/// Sub-phase of a running battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BattlePhase {
    /// Waiting for the side in `turn` to pick a move
    SelectMove,
    /// A move is being resolved; no input is accepted
    Resolving,
    /// One side fainted or the player surrendered
    Ended,
}

/// How a battle finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BattleOutcome {
    Victory,
    Defeat,
    Surrender,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleEvent {
    OpponentAppeared {
        name: String,
    },
    MoveUsed {
        attacker: String,
        move_name: String,
    },
    DamageDealt {
        target: Side,
        amount: u32,
        remaining_hp: u32,
    },
    Fainted {
        name: String,
    },
    ExperienceGained {
        name: String,
        amount: u32,
    },
    LeveledUp {
        name: String,
        level: u8,
    },
    EvolutionReady {
        name: String,
        into: String,
    },
    Surrendered {
        name: String,
    },
    BattleEnded {
        outcome: BattleOutcome,
    },
}

impl BattleEvent {
    /// Formats the event into a log line. Returns None for silent events.
    pub fn format(&self) -> Option<String> {
        match self {
            BattleEvent::OpponentAppeared { name } => Some(format!("A wild {} appeared!", name)),
            BattleEvent::MoveUsed {
                attacker,
                move_name,
            } => Some(format!("{} used {}!", attacker, move_name)),
            BattleEvent::DamageDealt { amount, .. } => {
                Some(format!("It dealt {} damage!", amount))
            }
            BattleEvent::Fainted { name } => Some(format!("{} fainted!", name)),
            BattleEvent::ExperienceGained { name, amount } => {
                Some(format!("{} gained {} experience!", name, amount))
            }
            BattleEvent::LeveledUp { name, level } => {
                Some(format!("{} leveled up to level {}!", name, level))
            }
            BattleEvent::EvolutionReady { name, into } => {
                Some(format!("{} is ready to evolve into {}!", name, into))
            }
            BattleEvent::Surrendered { name } => Some(format!("{} retreated from battle.", name)),
            BattleEvent::BattleEnded { .. } => None,
        }
    }
}

/// Collects the events a single transition produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventBus {
    events: Vec<BattleEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Log lines for every non-silent event, in order.
    pub fn formatted(&self) -> Vec<String> {
        self.events.iter().filter_map(BattleEvent::format).collect()
    }
}

impl fmt::Display for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for event in &self.events {
            writeln!(f, "{:?}", event)?;
        }
        Ok(())
    }
}

enum RngSource {
    Scripted { outcomes: Vec<f64>, index: usize },
    Seeded(StdRng),
}

/// Source of every random decision the engine makes: damage variance, opponent
/// picks and opponent move choice. Tests script the exact outcomes.
pub struct TurnRng {
    source: RngSource,
}

impl TurnRng {
    /// Outcomes are consumed in order; each must lie in `[0, 1)`.
    pub fn new_for_test(outcomes: Vec<f64>) -> Self {
        Self {
            source: RngSource::Scripted { outcomes, index: 0 },
        }
    }

    pub fn new_random() -> Self {
        Self {
            source: RngSource::Seeded(StdRng::from_os_rng()),
        }
    }

    pub fn from_seed(seed: u64) -> Self {
        Self {
            source: RngSource::Seeded(StdRng::seed_from_u64(seed)),
        }
    }

    /// Next uniform value in `[0, 1)`.
    pub fn next_unit(&mut self, reason: &str) -> f64 {
        match &mut self.source {
            RngSource::Scripted { outcomes, index } => {
                if *index >= outcomes.len() {
                    panic!(
                        "TurnRng exhausted! Tried to get a value for: '{}'. Need more random values.",
                        reason
                    );
                }
                let outcome = outcomes[*index];

                #[cfg(test)]
                println!("[RNG] Consumed {} for: {}", outcome, reason);

                *index += 1;
                outcome
            }
            RngSource::Seeded(rng) => rng.random::<f64>(),
        }
    }

    /// Uniform index into a collection of `len` items. `len` must be non-zero.
    pub fn next_index(&mut self, len: usize, reason: &str) -> usize {
        let unit = self.next_unit(reason);
        ((unit * len as f64) as usize).min(len.saturating_sub(1))
    }
}

impl fmt::Debug for TurnRng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            RngSource::Scripted { outcomes, index } => f
                .debug_struct("TurnRng")
                .field("remaining", &outcomes.len().saturating_sub(*index))
                .finish(),
            RngSource::Seeded(_) => f.debug_struct("TurnRng").field("seeded", &true).finish(),
        }
    }
}

/// Persisted state of the battle in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleState {
    pub turn: Side,
    pub phase: BattlePhase,
    pub turn_number: u32,
    #[serde(default)]
    pub log: Vec<String>,
    #[serde(default)]
    pub outcome: Option<BattleOutcome>,
}

impl BattleState {
    /// The player always acts first.
    pub fn new() -> Self {
        Self {
            turn: Side::Player,
            phase: BattlePhase::SelectMove,
            turn_number: 1,
            log: Vec::new(),
            outcome: None,
        }
    }

    pub fn is_player_turn(&self) -> bool {
        self.turn == Side::Player && self.phase == BattlePhase::SelectMove
    }

    pub fn is_over(&self) -> bool {
        self.phase == BattlePhase::Ended
    }
}

impl Default for BattleState {
    fn default() -> Self {
        Self::new()
    }
}
