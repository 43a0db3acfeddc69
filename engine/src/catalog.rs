// ═══════════════════════════════════════════════════════════════════════
// Piece catalog — static per-type stats and rule descriptors
// All unit properties that never change during a game.
// ═══════════════════════════════════════════════════════════════════════

use crate::types::*;
use crate::types::AttackStyle::{Melee, Ranged};
use crate::types::Category::{Basic, Hero, Special, Structure};
use serde::{Deserialize, Serialize};

/// Capability flag-set. The move/attack algorithms read these instead of
/// branching on the unit's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Caps(u16);

impl Caps {
    pub const NONE: Caps = Caps(0);
    pub const CAN_MOVE_THROUGH_ALLIES: Caps = Caps(1 << 0);
    pub const REQUIRES_ALLY_IN_FRONT: Caps = Caps(1 << 1);
    pub const CANNOT_ATTACK_ADJACENT: Caps = Caps(1 << 2);
    pub const AREA_ATTACK: Caps = Caps(1 << 3);
    /// Three cells sideways, one cell up or down.
    pub const CRAB_MOVE: Caps = Caps(1 << 4);
    /// Attacks only the three cells of the row ahead.
    pub const FORWARD_ONLY_ATTACK: Caps = Caps(1 << 5);
    pub const IMMOBILE: Caps = Caps(1 << 6);
    pub const CAN_ATTACK_OVER_PIECES: Caps = Caps(1 << 7);
    /// One extra cell of range until the unit has moved once.
    pub const FIRST_MOVE_DOUBLE: Caps = Caps(1 << 8);
    /// Losing every one of these loses the game.
    pub const COMMAND_STRUCTURE: Caps = Caps(1 << 9);

    pub const fn union(self, other: Caps) -> Caps {
        Caps(self.0 | other.0)
    }

    pub const fn contains(self, other: Caps) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for Caps {
    type Output = Caps;
    fn bitor(self, rhs: Caps) -> Caps {
        self.union(rhs)
    }
}

/// Static description of a unit type (compile-time constant).
#[derive(Debug, Clone)]
pub struct UnitDef {
    pub kind: UnitKind,
    pub name: &'static str,
    pub category: Category,
    pub move_range: u8,
    pub move_dirs: &'static [Dir],
    pub attack_range: u8,
    pub min_attack_distance: u8,
    pub attack_dirs: &'static [Dir],
    pub attack_power: u32,
    pub max_health: u32,
    pub style: AttackStyle,
    pub caps: Caps,
}

impl UnitDef {
    pub fn has(&self, cap: Caps) -> bool {
        self.caps.contains(cap)
    }

    pub fn is_hero(&self) -> bool {
        self.category == Category::Hero
    }

    pub fn is_command_structure(&self) -> bool {
        self.has(Caps::COMMAND_STRUCTURE)
    }

    /// Closest distance this unit may strike at.
    pub fn effective_min_distance(&self) -> u8 {
        let floor = if self.has(Caps::CANNOT_ATTACK_ADJACENT) { 2 } else { 1 };
        self.min_attack_distance.max(floor)
    }
}

#[allow(clippy::too_many_arguments)]
const fn def(
    kind: UnitKind,
    name: &'static str,
    category: Category,
    (move_range, move_dirs): (u8, &'static [Dir]),
    (attack_range, min_attack_distance, attack_dirs): (u8, u8, &'static [Dir]),
    attack_power: u32,
    max_health: u32,
    style: AttackStyle,
    caps: Caps,
) -> UnitDef {
    UnitDef {
        kind,
        name,
        category,
        move_range,
        move_dirs,
        attack_range,
        min_attack_distance,
        attack_dirs,
        attack_power,
        max_health,
        style,
        caps,
    }
}

/// Indexed by `UnitKind as usize`.
pub static UNITS: [UnitDef; 14] = [
    def(UnitKind::Footman, "Footman", Basic,
        (1, ORTHOGONAL), (1, 1, ORTHOGONAL), 20, 60, Melee, Caps::NONE),
    def(UnitKind::RoyalGuard, "Royal Guard", Basic,
        (1, ORTHOGONAL), (1, 1, ORTHOGONAL), 25, 80, Melee, Caps::FIRST_MOVE_DOUBLE),
    def(UnitKind::Archer, "Archer", Basic,
        (1, ALL_DIRS), (3, 1, ALL_DIRS), 30, 40, Ranged,
        Caps::CANNOT_ATTACK_ADJACENT.union(Caps::CAN_ATTACK_OVER_PIECES)),
    def(UnitKind::Pikeman, "Pikeman", Basic,
        (1, ORTHOGONAL), (2, 2, ORTHOGONAL), 30, 60, Melee,
        Caps::REQUIRES_ALLY_IN_FRONT.union(Caps::CAN_ATTACK_OVER_PIECES)),
    def(UnitKind::Crab, "Crab", Special,
        (3, ORTHOGONAL), (1, 1, ORTHOGONAL), 20, 120, Melee, Caps::CRAB_MOVE),
    def(UnitKind::Samurai, "Samurai", Special,
        (2, ORTHOGONAL), (1, 1, NO_DIRS), 40, 70, Melee, Caps::FORWARD_ONLY_ATTACK),
    def(UnitKind::Cavalry, "Cavalry", Special,
        (3, ORTHOGONAL), (1, 1, ORTHOGONAL), 35, 80, Melee, Caps::CAN_MOVE_THROUGH_ALLIES),
    def(UnitKind::Mage, "Mage", Special,
        (1, ALL_DIRS), (2, 1, ORTHOGONAL), 30, 50, Ranged, Caps::AREA_ATTACK),
    def(UnitKind::Warlock, "Warlock", Special,
        (1, ALL_DIRS), (2, 1, ALL_DIRS), 15, 50, Ranged, Caps::NONE),
    def(UnitKind::Warlord, "Warlord", Hero,
        (2, ALL_DIRS), (1, 1, ALL_DIRS), 50, 150, Melee, Caps::NONE),
    def(UnitKind::Oracle, "Oracle", Hero,
        (1, ALL_DIRS), (3, 1, ORTHOGONAL), 25, 100, Ranged, Caps::CAN_ATTACK_OVER_PIECES),
    def(UnitKind::Castle, "Castle", Structure,
        (0, NO_DIRS), (0, 1, NO_DIRS), 0, 300, Melee,
        Caps::IMMOBILE.union(Caps::COMMAND_STRUCTURE)),
    def(UnitKind::Tower, "Tower", Structure,
        (0, NO_DIRS), (2, 1, ALL_DIRS), 20, 120, Ranged, Caps::IMMOBILE),
    def(UnitKind::Wall, "Wall", Structure,
        (0, NO_DIRS), (0, 1, NO_DIRS), 0, 100, Melee, Caps::IMMOBILE),
];

pub fn unit_def(kind: UnitKind) -> &'static UnitDef {
    &UNITS[kind as usize]
}

/// Kinds that only ever appear as skill-spawned derivatives.
pub fn is_derivative_kind(kind: UnitKind) -> bool {
    kind == UnitKind::Wall
}
