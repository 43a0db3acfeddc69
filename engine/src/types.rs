// ═══════════════════════════════════════════════════════════════════════
// Core types — board geometry, pieces, timed effects, game state
// ═══════════════════════════════════════════════════════════════════════

use crate::cards::CardId;
use crate::config::RulesConfig;
use serde::{Deserialize, Serialize};

/// Side length of the square board.
pub const BOARD_SIZE: u8 = 8;

/// Number of cells on the board.
pub const NUM_CELLS: usize = (BOARD_SIZE as usize) * (BOARD_SIZE as usize);

// ── Side ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    /// Starts at the bottom (rows 4–7) and advances toward row 0.
    A,
    /// Starts at the top (rows 0–3) and advances toward row 7.
    B,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::A, Side::B];

    pub fn opponent(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    /// Row delta of one step "forward" for this side.
    pub fn forward(self) -> i8 {
        match self {
            Side::A => -1,
            Side::B => 1,
        }
    }

    /// Whether `row` is one of this side's four home rows.
    pub fn is_home_row(self, row: u8) -> bool {
        match self {
            Side::A => (4..BOARD_SIZE).contains(&row),
            Side::B => row < 4,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Side::A => 0,
            Side::B => 1,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::A => write!(f, "A"),
            Side::B => write!(f, "B"),
        }
    }
}

// ── Coordinates & directions ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub row: u8,
    pub col: u8,
}

impl Coord {
    pub fn new(row: u8, col: u8) -> Self {
        debug_assert!(row < BOARD_SIZE && col < BOARD_SIZE, "coordinate ({row}, {col}) off the board");
        Coord { row, col }
    }

    /// Signed constructor used while walking rays. `None` once off the board.
    pub fn checked(row: i16, col: i16) -> Option<Self> {
        let size = i16::from(BOARD_SIZE);
        if (0..size).contains(&row) && (0..size).contains(&col) {
            Some(Coord { row: row as u8, col: col as u8 })
        } else {
            None
        }
    }

    pub fn is_on_board(self) -> bool {
        self.row < BOARD_SIZE && self.col < BOARD_SIZE
    }

    pub fn offset(self, dir: Dir, steps: u8) -> Option<Coord> {
        let steps = i16::from(steps);
        Coord::checked(
            i16::from(self.row) + i16::from(dir.dr) * steps,
            i16::from(self.col) + i16::from(dir.dc) * steps,
        )
    }

    pub fn chebyshev(self, other: Coord) -> u8 {
        self.row.abs_diff(other.row).max(self.col.abs_diff(other.col))
    }

    /// Row-major index into the board storage.
    pub fn index(self) -> usize {
        usize::from(self.row) * usize::from(BOARD_SIZE) + usize::from(self.col)
    }

    pub fn from_index(idx: usize) -> Self {
        let size = usize::from(BOARD_SIZE);
        Coord { row: (idx / size) as u8, col: (idx % size) as u8 }
    }

    /// Every cell, row-major.
    pub fn all() -> impl Iterator<Item = Coord> {
        (0..NUM_CELLS).map(Coord::from_index)
    }

    /// Unit step from `self` toward `other` along a straight or diagonal line.
    pub fn direction_to(self, other: Coord) -> Dir {
        Dir {
            dr: (i16::from(other.row) - i16::from(self.row)).signum() as i8,
            dc: (i16::from(other.col) - i16::from(self.col)).signum() as i8,
        }
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dir {
    pub dr: i8,
    pub dc: i8,
}

impl Dir {
    pub const UP: Dir = Dir { dr: -1, dc: 0 };
    pub const DOWN: Dir = Dir { dr: 1, dc: 0 };
    pub const LEFT: Dir = Dir { dr: 0, dc: -1 };
    pub const RIGHT: Dir = Dir { dr: 0, dc: 1 };
    pub const UP_LEFT: Dir = Dir { dr: -1, dc: -1 };
    pub const UP_RIGHT: Dir = Dir { dr: -1, dc: 1 };
    pub const DOWN_LEFT: Dir = Dir { dr: 1, dc: -1 };
    pub const DOWN_RIGHT: Dir = Dir { dr: 1, dc: 1 };

    /// The two directions perpendicular to this one.
    pub fn lateral(self) -> [Dir; 2] {
        [Dir { dr: self.dc, dc: -self.dr }, Dir { dr: -self.dc, dc: self.dr }]
    }
}

pub const ORTHOGONAL: &[Dir] = &[Dir::UP, Dir::DOWN, Dir::LEFT, Dir::RIGHT];
pub const DIAGONAL: &[Dir] = &[Dir::UP_LEFT, Dir::UP_RIGHT, Dir::DOWN_LEFT, Dir::DOWN_RIGHT];
pub const ALL_DIRS: &[Dir] = &[
    Dir::UP, Dir::DOWN, Dir::LEFT, Dir::RIGHT,
    Dir::UP_LEFT, Dir::UP_RIGHT, Dir::DOWN_LEFT, Dir::DOWN_RIGHT,
];
pub const NO_DIRS: &[Dir] = &[];

// ── Unit classification ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnitKind {
    Footman,
    RoyalGuard,
    Archer,
    Pikeman,
    Crab,
    Samurai,
    Cavalry,
    Mage,
    Warlock,
    Warlord,
    Oracle,
    Castle,
    Tower,
    Wall,
}

impl UnitKind {
    pub const ALL: [UnitKind; 14] = [
        UnitKind::Footman,
        UnitKind::RoyalGuard,
        UnitKind::Archer,
        UnitKind::Pikeman,
        UnitKind::Crab,
        UnitKind::Samurai,
        UnitKind::Cavalry,
        UnitKind::Mage,
        UnitKind::Warlock,
        UnitKind::Warlord,
        UnitKind::Oracle,
        UnitKind::Castle,
        UnitKind::Tower,
        UnitKind::Wall,
    ];
}

impl std::fmt::Display for UnitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", crate::catalog::unit_def(*self).name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Basic,
    Special,
    Hero,
    Structure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttackStyle {
    Melee,
    Ranged,
}

/// One of the three cells a forward-only attacker threatens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lane {
    Left,
    Center,
    Right,
}

impl Lane {
    pub const ALL: [Lane; 3] = [Lane::Left, Lane::Center, Lane::Right];

    /// Column delta of this lane on the board.
    pub fn dc(self) -> i8 {
        match self {
            Lane::Left => -1,
            Lane::Center => 0,
            Lane::Right => 1,
        }
    }
}

// ── Timed effects ──────────────────────────────────────────────────────

/// Beneficial status carried by a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuffKind {
    /// Extra movement and attack power; enables charging into enemies.
    Charge { move_bonus: u8, attack_bonus: u32 },
    /// Arms itself the first time the holder takes damage.
    Enrage { attack_bonus: u32, triggered: bool },
    /// One-shot stance: the strike is narrowed to one lane and hits harder.
    DrawStance { attack_bonus: u32, lane: Lane },
    /// One-shot: the next hit strips the target's buffs and deals `bonus` extra.
    Glory { bonus: u32 },
    /// Takes every hit aimed at an ally within `radius`.
    Guardian { radius: u8 },
    /// Blocks exactly one hit.
    Shield,
    DamageImmune,
    /// Hits leave a burning field of `damage` per tick on the target's cell.
    Burning { damage: u32, duration: u32 },
    /// Hits arc into the cells beside the target.
    Chain,
    /// Returns `damage` to whoever hits the holder.
    Reflect { damage: u32 },
    /// Slows enemies within `radius`, re-applied every turn.
    FrostAura { radius: u8 },
    /// Untargetable.
    Cloak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuffTag {
    Charge,
    Enrage,
    DrawStance,
    Glory,
    Guardian,
    Shield,
    DamageImmune,
    Burning,
    Chain,
    Reflect,
    FrostAura,
    Cloak,
}

impl BuffKind {
    pub fn tag(&self) -> BuffTag {
        match self {
            BuffKind::Charge { .. } => BuffTag::Charge,
            BuffKind::Enrage { .. } => BuffTag::Enrage,
            BuffKind::DrawStance { .. } => BuffTag::DrawStance,
            BuffKind::Glory { .. } => BuffTag::Glory,
            BuffKind::Guardian { .. } => BuffTag::Guardian,
            BuffKind::Shield => BuffTag::Shield,
            BuffKind::DamageImmune => BuffTag::DamageImmune,
            BuffKind::Burning { .. } => BuffTag::Burning,
            BuffKind::Chain => BuffTag::Chain,
            BuffKind::Reflect { .. } => BuffTag::Reflect,
            BuffKind::FrostAura { .. } => BuffTag::FrostAura,
            BuffKind::Cloak => BuffTag::Cloak,
        }
    }

    /// Attack power this buff adds to its holder's strikes right now.
    pub fn attack_bonus(&self) -> u32 {
        match *self {
            BuffKind::Charge { attack_bonus, .. } => attack_bonus,
            BuffKind::Enrage { attack_bonus, triggered: true } => attack_bonus,
            BuffKind::DrawStance { attack_bonus, .. } => attack_bonus,
            BuffKind::Glory { bonus } => bonus,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buff {
    pub kind: BuffKind,
    pub expiry_turn: u32,
}

impl Buff {
    pub fn is_live(&self, turn: u32) -> bool {
        turn < self.expiry_turn
    }
}

/// Harmful status carried by a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DebuffKind {
    Slow { penalty: u8 },
    Rooted,
    Disarmed,
    /// Deals `damage` once, when the debuff runs out.
    Poison { damage: u32 },
    /// Destroys the holder when the debuff runs out.
    Doom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DebuffTag {
    Slow,
    Rooted,
    Disarmed,
    Poison,
    Doom,
}

impl DebuffKind {
    pub fn tag(&self) -> DebuffTag {
        match self {
            DebuffKind::Slow { .. } => DebuffTag::Slow,
            DebuffKind::Rooted => DebuffTag::Rooted,
            DebuffKind::Disarmed => DebuffTag::Disarmed,
            DebuffKind::Poison { .. } => DebuffTag::Poison,
            DebuffKind::Doom => DebuffTag::Doom,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Debuff {
    pub kind: DebuffKind,
    pub expiry_turn: u32,
}

impl Debuff {
    pub fn is_live(&self, turn: u32) -> bool {
        turn < self.expiry_turn
    }
}

/// Burning field bound to a cell rather than to whoever stands on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellEffect {
    pub at: Coord,
    pub damage: u32,
    pub expiry_turn: u32,
    pub source: Side,
}

// ── Unit state ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateFlags {
    pub is_wall: bool,
    pub is_derivative: bool,
    pub cannot_move: bool,
    pub cannot_attack: bool,
    pub damage_immune: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitState {
    pub current_health: u32,
    pub max_health: u32,
    pub has_moved: bool,
    pub injured: bool,
    pub buffs: Vec<Buff>,
    pub debuffs: Vec<Debuff>,
    pub flags: StateFlags,
    /// Turn at which a derivative occupant leaves the board.
    pub derivative_expiry: Option<u32>,
}

impl UnitState {
    pub fn new(max_health: u32) -> Self {
        UnitState {
            current_health: max_health,
            max_health,
            has_moved: false,
            injured: false,
            buffs: Vec::new(),
            debuffs: Vec::new(),
            flags: StateFlags::default(),
            derivative_expiry: None,
        }
    }

    pub fn buff(&self, turn: u32, tag: BuffTag) -> Option<&Buff> {
        self.buffs.iter().find(|b| b.kind.tag() == tag && b.is_live(turn))
    }

    pub fn buff_mut(&mut self, turn: u32, tag: BuffTag) -> Option<&mut Buff> {
        self.buffs.iter_mut().find(|b| b.kind.tag() == tag && b.is_live(turn))
    }

    pub fn has_buff(&self, turn: u32, tag: BuffTag) -> bool {
        self.buff(turn, tag).is_some()
    }

    pub fn debuff(&self, turn: u32, tag: DebuffTag) -> Option<&Debuff> {
        self.debuffs.iter().find(|d| d.kind.tag() == tag && d.is_live(turn))
    }

    pub fn has_debuff(&self, turn: u32, tag: DebuffTag) -> bool {
        self.debuff(turn, tag).is_some()
    }

    /// Removes every buff carrying `tag`. Returns whether anything was removed.
    pub fn remove_buff(&mut self, tag: BuffTag) -> bool {
        let before = self.buffs.len();
        self.buffs.retain(|b| b.kind.tag() != tag);
        before != self.buffs.len()
    }

    /// Attaches `kind` unless a live instance of the same kind is present.
    /// Returns `false` for the no-op case.
    pub fn attach_buff(&mut self, turn: u32, kind: BuffKind, expiry_turn: u32) -> bool {
        if self.has_buff(turn, kind.tag()) {
            return false;
        }
        self.buffs.retain(|b| b.kind.tag() != kind.tag());
        self.buffs.push(Buff { kind, expiry_turn });
        true
    }

    /// Debuff counterpart of [`UnitState::attach_buff`].
    pub fn attach_debuff(&mut self, turn: u32, kind: DebuffKind, expiry_turn: u32) -> bool {
        if self.has_debuff(turn, kind.tag()) {
            return false;
        }
        self.debuffs.retain(|d| d.kind.tag() != kind.tag());
        self.debuffs.push(Debuff { kind, expiry_turn });
        true
    }

    /// Sum of the attack bonuses of every live buff.
    pub fn attack_bonus(&self, turn: u32) -> u32 {
        self.buffs.iter()
            .filter(|b| b.is_live(turn))
            .map(|b| b.kind.attack_bonus())
            .sum()
    }

    pub fn is_cloaked(&self, turn: u32) -> bool {
        self.has_buff(turn, BuffTag::Cloak)
    }

    /// Lowers health, saturating at zero. Returns the damage actually dealt.
    pub fn take_damage(&mut self, damage: u32) -> u32 {
        let dealt = damage.min(self.current_health);
        self.current_health -= dealt;
        if self.current_health < self.max_health {
            self.injured = true;
        }
        dealt
    }

    pub fn is_dead(&self) -> bool {
        self.current_health == 0
    }
}

// ── Pieces & board ─────────────────────────────────────────────────────

/// Occupant of a cell. The owner travels with the piece.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub id: u32,
    pub kind: UnitKind,
    pub owner: Side,
    pub state: UnitState,
}

impl Piece {
    pub fn def(&self) -> &'static crate::catalog::UnitDef {
        crate::catalog::unit_def(self.kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    cells: Vec<Option<Piece>>,
}

impl Default for Board {
    fn default() -> Self {
        Board::empty()
    }
}

impl Board {
    pub fn empty() -> Self {
        Board { cells: vec![None; NUM_CELLS] }
    }

    /// `None` for empty cells and for coordinates off the board.
    pub fn get(&self, at: Coord) -> Option<&Piece> {
        if !at.is_on_board() {
            return None;
        }
        self.cells.get(at.index()).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, at: Coord) -> Option<&mut Piece> {
        if !at.is_on_board() {
            return None;
        }
        self.cells.get_mut(at.index()).and_then(Option::as_mut)
    }

    pub fn is_empty(&self, at: Coord) -> bool {
        self.get(at).is_none()
    }

    pub fn owner(&self, at: Coord) -> Option<Side> {
        self.get(at).map(|p| p.owner)
    }

    /// Puts `piece` on an empty cell. Returns the piece back if the cell is taken.
    pub fn place(&mut self, at: Coord, piece: Piece) -> Result<(), Piece> {
        if !at.is_on_board() {
            return Err(piece);
        }
        match self.cells.get_mut(at.index()) {
            Some(slot @ None) => {
                *slot = Some(piece);
                Ok(())
            }
            _ => Err(piece),
        }
    }

    /// Clears a cell: occupant, owner and state leave together.
    pub fn take(&mut self, at: Coord) -> Option<Piece> {
        if !at.is_on_board() {
            return None;
        }
        self.cells.get_mut(at.index()).and_then(Option::take)
    }

    /// Moves the piece at `from` onto the empty cell `to`.
    pub fn relocate(&mut self, from: Coord, to: Coord) -> bool {
        if from == to || !self.is_empty(to) {
            return false;
        }
        match self.take(from) {
            Some(piece) => self.place(to, piece).is_ok(),
            None => false,
        }
    }

    /// Occupied cells, row-major.
    pub fn pieces(&self) -> impl Iterator<Item = (Coord, &Piece)> {
        self.cells.iter().enumerate()
            .filter_map(|(i, c)| c.as_ref().map(|p| (Coord::from_index(i), p)))
    }

    pub fn pieces_mut(&mut self) -> impl Iterator<Item = (Coord, &mut Piece)> {
        self.cells.iter_mut().enumerate()
            .filter_map(|(i, c)| c.as_mut().map(|p| (Coord::from_index(i), p)))
    }

    pub fn coords_of(&self, side: Side) -> Vec<Coord> {
        self.pieces().filter(|(_, p)| p.owner == side).map(|(c, _)| c).collect()
    }

    pub fn find_by_id(&self, id: u32) -> Option<Coord> {
        self.pieces().find(|(_, p)| p.id == id).map(|(c, _)| c)
    }
}

// ── Per-side state ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub side: Side,
    pub action_points: u8,
    pub hand: Vec<CardId>,
    /// Draw from front.
    pub deck: Vec<CardId>,
    pub discard: Vec<CardId>,
}

impl PlayerState {
    pub fn new(side: Side, deck: Vec<CardId>) -> Self {
        PlayerState {
            side,
            action_points: 0,
            hand: Vec::new(),
            deck,
            discard: Vec::new(),
        }
    }

    /// Draws up to `count` cards, never past `capacity`. Returns how many were drawn.
    pub fn draw(&mut self, count: usize, capacity: usize) -> usize {
        let room = capacity.saturating_sub(self.hand.len());
        let n = count.min(room).min(self.deck.len());
        self.hand.extend(self.deck.drain(..n));
        n
    }
}

// ── Victory ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WinReason {
    HeroDestroyed,
    CommandStructureDestroyed,
    /// Both sides lost in the same turn; the side that was acting loses.
    MutualDestruction,
}

impl std::fmt::Display for WinReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WinReason::HeroDestroyed => write!(f, "hero destroyed"),
            WinReason::CommandStructureDestroyed => write!(f, "command structure destroyed"),
            WinReason::MutualDestruction => write!(f, "mutual destruction"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Victory {
    pub winner: Side,
    pub reason: WinReason,
    pub turn: u32,
}

// ── Game State ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub config: RulesConfig,
    /// Completed side-turns + 1. Side A acts on odd turns.
    pub turn: u32,
    pub active: Side,
    pub board: Board,
    pub cell_effects: Vec<CellEffect>,
    /// Indexed by [`Side::index`].
    pub players: [PlayerState; 2],
    pub next_piece_id: u32,
    pub seed: u64,
    pub victory: Option<Victory>,
}

impl GameState {
    pub fn player(&self, side: Side) -> &PlayerState {
        &self.players[side.index()]
    }

    pub fn player_mut(&mut self, side: Side) -> &mut PlayerState {
        &mut self.players[side.index()]
    }

    pub fn piece(&self, at: Coord) -> Option<&Piece> {
        self.board.get(at)
    }

    pub fn is_over(&self) -> bool {
        self.victory.is_some()
    }

    /// Allocates a fresh piece and places it. Returns the piece back if the cell is taken.
    pub fn spawn(&mut self, at: Coord, kind: UnitKind, owner: Side) -> Result<u32, Piece> {
        let def = crate::catalog::unit_def(kind);
        let id = self.next_piece_id;
        let piece = Piece { id, kind, owner, state: UnitState::new(def.max_health) };
        self.board.place(at, piece)?;
        self.next_piece_id += 1;
        Ok(id)
    }

    /// Burning field on `at`, if one is live.
    pub fn cell_effect(&self, at: Coord) -> Option<&CellEffect> {
        self.cell_effects.iter().find(|e| e.at == at && self.turn < e.expiry_turn)
    }

    /// Places a burning field on `at`, replacing whatever burned there before.
    pub fn ignite(&mut self, effect: CellEffect) {
        self.cell_effects.retain(|e| e.at != effect.at);
        self.cell_effects.push(effect);
    }
}
