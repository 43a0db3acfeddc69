// ═══════════════════════════════════════════════════════════════════════
// Skill cards — static data
// Each card is a targeting archetype plus one effect variant; the skill
// resolver interprets effects through a handful of generic appliers.
// ═══════════════════════════════════════════════════════════════════════

use crate::types::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CardId {
    ShieldWall,
    Charge,
    Berserk,
    Iaido,
    GloryStrike,
    GuardianOath,
    DivineAegis,
    FlameArrows,
    ChainLightning,
    ThornArmor,
    FrostAura,
    ShadowCloak,
    StoneWall,
    Mend,
    Meteor,
    Dominate,
    Venom,
    Entangle,
    Disarm,
    WarDrums,
}

impl CardId {
    pub const ALL: [CardId; 20] = [
        CardId::ShieldWall,
        CardId::Charge,
        CardId::Berserk,
        CardId::Iaido,
        CardId::GloryStrike,
        CardId::GuardianOath,
        CardId::DivineAegis,
        CardId::FlameArrows,
        CardId::ChainLightning,
        CardId::ThornArmor,
        CardId::FrostAura,
        CardId::ShadowCloak,
        CardId::StoneWall,
        CardId::Mend,
        CardId::Meteor,
        CardId::Dominate,
        CardId::Venom,
        CardId::Entangle,
        CardId::Disarm,
        CardId::WarDrums,
    ];
}

/// Which cells a card may be played on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetRule {
    /// Resolves immediately on selection.
    NoTarget,
    /// Caster-owned occupant whose kind is in the card's required set.
    AllyOfRequiredType,
    AnyAlly,
    AnyEnemy,
    /// Empty cell in the caster's four home rows.
    EmptyHomeCell,
    /// Enemy basic unit within `radius` of a caster-owned required unit.
    EnemyBasicNearController { radius: u8 },
}

/// What a card does once its target is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    AttachBuff(BuffKind),
    AttachDebuff(DebuffKind),
    HealToFull,
    /// Places a derivative occupant that lasts the card's duration.
    SpawnDerivative(UnitKind),
    /// Immediate damage to enemies within `radius` of the target cell.
    AreaDamage { damage: u32, radius: u8 },
    /// Attaches the buff to every caster-owned non-structure unit.
    BuffAllAllies(BuffKind),
}

#[derive(Debug, Clone)]
pub struct CardDef {
    pub id: CardId,
    pub name: &'static str,
    pub cost: u8,
    pub target: TargetRule,
    /// Empty = usable by anyone.
    pub required: &'static [UnitKind],
    /// Turns the effect stays live; expiry = turn played + duration.
    pub duration: u32,
    pub effect: Effect,
}

const fn card(
    id: CardId,
    name: &'static str,
    cost: u8,
    target: TargetRule,
    required: &'static [UnitKind],
    duration: u32,
    effect: Effect,
) -> CardDef {
    CardDef { id, name, cost, target, required, duration, effect }
}

/// Indexed by `CardId as usize`.
pub static CARDS: [CardDef; 20] = [
    card(CardId::ShieldWall, "Shield Wall", 2, TargetRule::AnyAlly, &[], 2,
        Effect::AttachBuff(BuffKind::Shield)),
    card(CardId::Charge, "Charge", 2, TargetRule::AllyOfRequiredType, &[UnitKind::Cavalry], 1,
        Effect::AttachBuff(BuffKind::Charge { move_bonus: 1, attack_bonus: 10 })),
    card(CardId::Berserk, "Berserk", 1, TargetRule::AllyOfRequiredType,
        &[UnitKind::Warlord, UnitKind::Footman], 3,
        Effect::AttachBuff(BuffKind::Enrage { attack_bonus: 15, triggered: false })),
    card(CardId::Iaido, "Iaido", 2, TargetRule::AllyOfRequiredType, &[UnitKind::Samurai], 2,
        Effect::AttachBuff(BuffKind::DrawStance { attack_bonus: 20, lane: Lane::Center })),
    card(CardId::GloryStrike, "Glory Strike", 3, TargetRule::AllyOfRequiredType, &[UnitKind::Warlord], 2,
        Effect::AttachBuff(BuffKind::Glory { bonus: 30 })),
    card(CardId::GuardianOath, "Guardian Oath", 2, TargetRule::AllyOfRequiredType, &[UnitKind::RoyalGuard], 2,
        Effect::AttachBuff(BuffKind::Guardian { radius: 1 })),
    card(CardId::DivineAegis, "Divine Aegis", 4, TargetRule::AnyAlly, &[], 2,
        Effect::AttachBuff(BuffKind::DamageImmune)),
    card(CardId::FlameArrows, "Flame Arrows", 2, TargetRule::AllyOfRequiredType,
        &[UnitKind::Archer, UnitKind::Tower], 2,
        Effect::AttachBuff(BuffKind::Burning { damage: 10, duration: 3 })),
    card(CardId::ChainLightning, "Chain Lightning", 3, TargetRule::AllyOfRequiredType, &[UnitKind::Mage], 2,
        Effect::AttachBuff(BuffKind::Chain)),
    card(CardId::ThornArmor, "Thorn Armor", 2, TargetRule::AnyAlly, &[], 2,
        Effect::AttachBuff(BuffKind::Reflect { damage: 10 })),
    card(CardId::FrostAura, "Frost Aura", 2, TargetRule::AllyOfRequiredType, &[UnitKind::Crab], 3,
        Effect::AttachBuff(BuffKind::FrostAura { radius: 1 })),
    card(CardId::ShadowCloak, "Shadow Cloak", 2, TargetRule::AnyAlly, &[], 2,
        Effect::AttachBuff(BuffKind::Cloak)),
    card(CardId::StoneWall, "Stone Wall", 2, TargetRule::EmptyHomeCell, &[], 2,
        Effect::SpawnDerivative(UnitKind::Wall)),
    card(CardId::Mend, "Mend", 3, TargetRule::AnyAlly, &[], 0,
        Effect::HealToFull),
    card(CardId::Meteor, "Meteor", 4, TargetRule::AnyEnemy, &[], 0,
        Effect::AreaDamage { damage: 20, radius: 1 }),
    card(CardId::Dominate, "Dominate", 4, TargetRule::EnemyBasicNearController { radius: 2 },
        &[UnitKind::Warlock], 1,
        Effect::AttachDebuff(DebuffKind::Doom)),
    card(CardId::Venom, "Venom", 2, TargetRule::AnyEnemy, &[], 2,
        Effect::AttachDebuff(DebuffKind::Poison { damage: 30 })),
    card(CardId::Entangle, "Entangle", 1, TargetRule::AnyEnemy, &[], 2,
        Effect::AttachDebuff(DebuffKind::Rooted)),
    card(CardId::Disarm, "Disarm", 2, TargetRule::AnyEnemy, &[], 2,
        Effect::AttachDebuff(DebuffKind::Disarmed)),
    card(CardId::WarDrums, "War Drums", 3, TargetRule::NoTarget, &[], 1,
        Effect::BuffAllAllies(BuffKind::Charge { move_bonus: 1, attack_bonus: 5 })),
];

pub fn card_def(id: CardId) -> &'static CardDef {
    &CARDS[id as usize]
}

/// Standard 15-card deck (before shuffling).
pub fn standard_deck() -> Vec<CardId> {
    vec![
        CardId::ShieldWall,
        CardId::ShieldWall,
        CardId::Charge,
        CardId::Berserk,
        CardId::Iaido,
        CardId::GloryStrike,
        CardId::GuardianOath,
        CardId::FlameArrows,
        CardId::ChainLightning,
        CardId::ThornArmor,
        CardId::StoneWall,
        CardId::Mend,
        CardId::Venom,
        CardId::Entangle,
        CardId::Dominate,
    ]
}
