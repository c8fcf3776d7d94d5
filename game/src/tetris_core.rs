use std::ops::Add;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const BOARD_WIDTH: usize = 10;
pub const BOARD_HEIGHT: usize = 20;
pub const NEXT_QUEUE_LEN: usize = 5;
pub const MIN_START_LEVEL: u32 = 1;
pub const MAX_START_LEVEL: u32 = 10;

const LINES_PER_LEVEL: u32 = 10;
const SOFT_DROP_POINTS_PER_ROW: u32 = 1;
const HARD_DROP_POINTS_PER_ROW: u32 = 2;
const COMBO_POINTS: u32 = 50;
const T_SPIN_POINTS: u32 = 100;
const T_SPIN_SINGLE_POINTS: u32 = 400;
const T_SPIN_DOUBLE_POINTS: u32 = 700;
const BASE_GRAVITY_MS: f64 = 800.0;
const GRAVITY_DECAY: f64 = 0.9;
const MIN_GRAVITY_MS: f64 = 50.0;
const SPAWN_POS: Vec2i = Vec2i {
    x: 4,
    y: BOARD_HEIGHT as i32 - 1,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Piece {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl Piece {
    pub const ALL: [Piece; 7] = [
        Piece::I,
        Piece::O,
        Piece::T,
        Piece::S,
        Piece::Z,
        Piece::J,
        Piece::L,
    ];

    /// Board cell value written when this piece locks.
    pub const fn cell(self) -> u8 {
        match self {
            Piece::I => 1,
            Piece::O => 2,
            Piece::T => 3,
            Piece::S => 4,
            Piece::Z => 5,
            Piece::J => 6,
            Piece::L => 7,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Vec2i {
    pub x: i32,
    pub y: i32,
}

impl Vec2i {
    pub const ZERO: Vec2i = Vec2i { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Vec2i {
    type Output = Vec2i;

    fn add(self, rhs: Vec2i) -> Self::Output {
        Vec2i::new(self.x + rhs.x, self.y + rhs.y)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RotationDir {
    Cw,
    Ccw,
    Half,
}

impl RotationDir {
    fn apply(self, rotation: u8, states: u8) -> u8 {
        let states = states.max(1);
        match self {
            RotationDir::Cw => (rotation + 1) % states,
            RotationDir::Ccw => (rotation + states - 1) % states,
            RotationDir::Half => (rotation + 2) % states,
        }
    }
}

/// What happened when the active piece locked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockOutcome {
    pub lines: u32,
    pub t_spin: bool,
    pub back_to_back: bool,
    pub combo: u32,
    pub points: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GravityStep {
    Moved,
    Locked(LockOutcome),
    NoActivePiece,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TetrisCore {
    board: Vec<Vec<u8>>,
    current_piece: Option<Piece>,
    current_piece_pos: Vec2i,
    current_piece_rotation: u8,
    next_queue: Vec<Piece>,
    held_piece: Option<Piece>,
    can_hold: bool,
    piece_bag: Vec<Piece>,
    rng: Rng,
    start_level: u32,
    lines_cleared: u32,
    score: u32,
    combo: u32,
    back_to_back: bool,
    last_move_was_rotation: bool,
    last_lock: Option<LockOutcome>,
    game_over: bool,
}

impl TetrisCore {
    pub fn new(seed: u64) -> Self {
        Self {
            board: vec![vec![0; BOARD_WIDTH]; BOARD_HEIGHT],
            current_piece: None,
            current_piece_pos: SPAWN_POS,
            current_piece_rotation: 0,
            next_queue: Vec::with_capacity(NEXT_QUEUE_LEN),
            held_piece: None,
            can_hold: true,
            piece_bag: Vec::with_capacity(Piece::ALL.len()),
            rng: Rng::new(seed),
            start_level: MIN_START_LEVEL,
            lines_cleared: 0,
            score: 0,
            combo: 0,
            back_to_back: false,
            last_move_was_rotation: false,
            last_lock: None,
            game_over: false,
        }
    }

    pub fn set_start_level(&mut self, level: u32) {
        self.start_level = level.clamp(MIN_START_LEVEL, MAX_START_LEVEL);
    }

    /// Clears the board and scoring and spawns the first piece.
    ///
    /// The randomizer keeps running, so consecutive games see different sequences.
    pub fn initialize_game(&mut self) {
        self.board = vec![vec![0; BOARD_WIDTH]; BOARD_HEIGHT];
        self.current_piece = None;
        self.next_queue.clear();
        self.held_piece = None;
        self.can_hold = true;
        self.piece_bag.clear();
        self.lines_cleared = 0;
        self.score = 0;
        self.combo = 0;
        self.back_to_back = false;
        self.last_move_was_rotation = false;
        self.last_lock = None;
        self.game_over = false;
        self.spawn_new_piece();
    }

    pub fn board(&self) -> &[Vec<u8>] {
        &self.board
    }

    pub fn board_with_active_piece(&self) -> Vec<Vec<u8>> {
        let mut board = self.board.clone();
        if let Some(piece) = self.current_piece {
            for (x, y) in self.active_cells() {
                if x >= 0 && (x as usize) < BOARD_WIDTH && y >= 0 && (y as usize) < BOARD_HEIGHT {
                    board[y as usize][x as usize] = piece.cell();
                }
            }
        }
        board
    }

    pub fn current_piece(&self) -> Option<Piece> {
        self.current_piece
    }

    pub fn current_piece_pos(&self) -> Vec2i {
        self.current_piece_pos
    }

    pub fn current_piece_rotation(&self) -> u8 {
        self.current_piece_rotation
    }

    pub fn next_queue(&self) -> &[Piece] {
        &self.next_queue
    }

    pub fn held_piece(&self) -> Option<Piece> {
        self.held_piece
    }

    pub fn can_hold(&self) -> bool {
        self.can_hold
    }

    pub fn start_level(&self) -> u32 {
        self.start_level
    }

    pub fn level(&self) -> u32 {
        self.start_level + self.lines_cleared / LINES_PER_LEVEL
    }

    /// Time between gravity steps at the current level.
    pub fn gravity_interval(&self) -> Duration {
        gravity_interval_for_level(self.level())
    }

    pub fn lines_cleared(&self) -> u32 {
        self.lines_cleared
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn add_score(&mut self, bonus: u32) {
        self.score = self.score.saturating_add(bonus);
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn back_to_back(&self) -> bool {
        self.back_to_back
    }

    pub fn last_lock(&self) -> Option<LockOutcome> {
        self.last_lock
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Structural checks for a core that came from outside (e.g. a save file).
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.board.len() != BOARD_HEIGHT || self.board.iter().any(|row| row.len() != BOARD_WIDTH) {
            return Err("board has the wrong dimensions");
        }
        if self.board.iter().flatten().any(|&cell| cell > Piece::L.cell()) {
            return Err("board contains an unknown cell value");
        }
        if !(MIN_START_LEVEL..=MAX_START_LEVEL).contains(&self.start_level) {
            return Err("start level out of range");
        }
        if !self.game_over && self.next_queue.len() != NEXT_QUEUE_LEN {
            return Err("next queue has the wrong length");
        }
        if !self.game_over && self.current_piece.is_none() {
            return Err("no active piece in a running game");
        }
        if !self.game_over
            && !self.is_valid_position(self.current_piece_pos, self.current_piece_rotation)
        {
            return Err("active piece overlaps the board");
        }
        Ok(())
    }

    /// Board cells covered by the active piece (may include rows above the visible board).
    pub fn active_cells(&self) -> Vec<(i32, i32)> {
        match self.current_piece {
            Some(piece) => {
                occupied_cells(piece, self.current_piece_pos, self.current_piece_rotation)
            }
            None => Vec::new(),
        }
    }

    /// Where the current piece would land after a hard drop.
    pub fn ghost_piece_pos(&self) -> Option<Vec2i> {
        self.current_piece?;
        let rotation = self.current_piece_rotation;
        let mut pos = self.current_piece_pos;
        if !self.is_valid_position(pos, rotation) {
            return None;
        }
        while self.is_valid_position(pos + Vec2i::new(0, -1), rotation) {
            pos = pos + Vec2i::new(0, -1);
        }
        Some(pos)
    }

    pub fn ghost_cells(&self) -> Vec<(i32, i32)> {
        match (self.current_piece, self.ghost_piece_pos()) {
            (Some(piece), Some(pos)) => occupied_cells(piece, pos, self.current_piece_rotation),
            _ => Vec::new(),
        }
    }

    pub fn set_current_piece_for_test(&mut self, piece: Piece, pos: Vec2i, rotation: u8) {
        self.current_piece = Some(piece);
        self.current_piece_pos = pos;
        self.current_piece_rotation = rotation % piece_rotation_states(piece);
        self.last_move_was_rotation = false;
    }

    pub fn set_cell(&mut self, x: usize, y: usize, value: u8) {
        if y < BOARD_HEIGHT && x < BOARD_WIDTH {
            self.board[y][x] = value;
        }
    }

    /// Draws from a shuffled bag of all seven pieces, refilling when it runs dry.
    pub fn draw_piece(&mut self) -> Piece {
        if self.piece_bag.is_empty() {
            self.piece_bag.extend_from_slice(&Piece::ALL);
            for i in (1..self.piece_bag.len()).rev() {
                let j = self.rng.next_u32() as usize % (i + 1);
                self.piece_bag.swap(i, j);
            }
        }
        self.piece_bag.pop().unwrap_or(Piece::O)
    }

    fn fill_next_queue(&mut self) {
        while self.next_queue.len() < NEXT_QUEUE_LEN {
            let piece = self.draw_piece();
            self.next_queue.push(piece);
        }
    }

    pub fn spawn_new_piece(&mut self) -> bool {
        self.fill_next_queue();
        let piece = self.next_queue.remove(0);
        self.fill_next_queue();
        self.place_at_spawn(piece)
    }

    fn place_at_spawn(&mut self, piece: Piece) -> bool {
        self.current_piece = Some(piece);
        self.current_piece_pos = SPAWN_POS;
        self.current_piece_rotation = 0;
        self.last_move_was_rotation = false;

        if !self.is_valid_position(self.current_piece_pos, self.current_piece_rotation) {
            self.game_over = true;
            return false;
        }
        true
    }

    pub fn hold_piece(&mut self) -> bool {
        if self.game_over || !self.can_hold {
            return false;
        }
        let Some(current) = self.current_piece else {
            return false;
        };

        let swapped = self.held_piece.replace(current);
        let ok = match swapped {
            Some(held) => self.place_at_spawn(held),
            None => self.spawn_new_piece(),
        };
        self.can_hold = false;
        ok
    }

    pub fn is_valid_position(&self, pos: Vec2i, rotation: u8) -> bool {
        let Some(piece) = self.current_piece else {
            return false;
        };
        occupied_cells(piece, pos, rotation).into_iter().all(|(x, y)| {
            if x < 0 || x >= BOARD_WIDTH as i32 || y < 0 {
                return false;
            }
            // Rows above the visible board are open space.
            y >= BOARD_HEIGHT as i32 || self.board[y as usize][x as usize] == 0
        })
    }

    pub fn move_piece(&mut self, dir: Vec2i) -> bool {
        if self.game_over {
            return false;
        }
        let new_pos = self.current_piece_pos + dir;
        if self.is_valid_position(new_pos, self.current_piece_rotation) {
            self.current_piece_pos = new_pos;
            self.last_move_was_rotation = false;
            return true;
        }
        false
    }

    /// Player-driven one-row drop; scores a point per row.
    pub fn soft_drop(&mut self) -> bool {
        let moved = self.move_piece(Vec2i::new(0, -1));
        if moved {
            self.add_score(SOFT_DROP_POINTS_PER_ROW);
        }
        moved
    }

    /// One gravity step: fall a row, or lock if the piece is resting.
    pub fn gravity_step(&mut self) -> GravityStep {
        if self.game_over || self.current_piece.is_none() {
            return GravityStep::NoActivePiece;
        }
        let below = self.current_piece_pos + Vec2i::new(0, -1);
        if self.is_valid_position(below, self.current_piece_rotation) {
            self.current_piece_pos = below;
            return GravityStep::Moved;
        }
        GravityStep::Locked(self.lock_active_piece())
    }

    pub fn rotate_piece(&mut self, dir: RotationDir) -> bool {
        if self.game_over {
            return false;
        }
        let Some(piece) = self.current_piece else {
            return false;
        };
        let new_rotation = dir.apply(self.current_piece_rotation, piece_rotation_states(piece));
        for (dx, dy) in GENERIC_KICK_OFFSETS {
            let test_pos = self.current_piece_pos + Vec2i::new(dx, dy);
            if self.is_valid_position(test_pos, new_rotation) {
                self.current_piece_pos = test_pos;
                self.current_piece_rotation = new_rotation;
                self.last_move_was_rotation = true;
                return true;
            }
        }
        false
    }

    /// Drops the piece to the floor and locks it. Returns the number of rows dropped.
    pub fn hard_drop(&mut self) -> u32 {
        if self.game_over || self.current_piece.is_none() {
            return 0;
        }

        let mut distance = 0u32;
        while self.is_valid_position(
            self.current_piece_pos + Vec2i::new(0, -1),
            self.current_piece_rotation,
        ) {
            self.current_piece_pos = self.current_piece_pos + Vec2i::new(0, -1);
            distance += 1;
        }
        if distance > 0 {
            self.last_move_was_rotation = false;
        }

        self.add_score(distance.saturating_mul(HARD_DROP_POINTS_PER_ROW));
        self.lock_active_piece();
        distance
    }

    fn lock_active_piece(&mut self) -> LockOutcome {
        let Some(piece) = self.current_piece else {
            return LockOutcome::default();
        };
        let t_spin = piece == Piece::T && self.last_move_was_rotation && self.t_corners_filled() >= 3;

        let mut locked_out = false;
        for (x, y) in self.active_cells() {
            if y >= BOARD_HEIGHT as i32 {
                locked_out = true;
                continue;
            }
            if x >= 0 && y >= 0 && (x as usize) < BOARD_WIDTH {
                self.board[y as usize][x as usize] = piece.cell();
            }
        }
        self.current_piece = None;

        let lines = self.clear_full_rows();
        let outcome = self.score_lock(lines, t_spin);
        self.last_lock = Some(outcome);

        if locked_out {
            self.game_over = true;
        } else {
            self.can_hold = true;
            self.spawn_new_piece();
        }
        outcome
    }

    /// Awards are flat (not scaled by level). Back-to-back applies to the whole award,
    /// combo bonus included, and any lock without a clear breaks both chains.
    fn score_lock(&mut self, lines: u32, t_spin: bool) -> LockOutcome {
        let base = match (t_spin, lines) {
            (true, 1) => T_SPIN_SINGLE_POINTS,
            (true, 2) => T_SPIN_DOUBLE_POINTS,
            (true, _) => T_SPIN_POINTS,
            (false, n) => line_clear_points(n),
        };

        let mut points = base;
        let mut back_to_back = false;
        if lines > 0 {
            self.combo += 1;
            points = points.saturating_add(COMBO_POINTS * (self.combo - 1));

            let difficult = lines >= 4 || t_spin;
            if difficult && self.back_to_back {
                points = points.saturating_mul(3) / 2;
                back_to_back = true;
            }
            self.back_to_back = difficult;
            self.lines_cleared = self.lines_cleared.saturating_add(lines);
        } else {
            self.combo = 0;
            self.back_to_back = false;
        }

        self.add_score(points);
        LockOutcome {
            lines,
            t_spin,
            back_to_back,
            combo: self.combo,
            points,
        }
    }

    fn clear_full_rows(&mut self) -> u32 {
        let before = self.board.len();
        self.board.retain(|row| row.iter().any(|&cell| cell == 0));
        let cleared = before - self.board.len();
        self.board
            .extend(std::iter::repeat_with(|| vec![0; BOARD_WIDTH]).take(cleared));
        cleared as u32
    }

    /// Counts occupied (or out-of-bounds) diagonal neighbours of a T piece's centre.
    fn t_corners_filled(&self) -> usize {
        let center = self.current_piece_pos;
        [(-1, -1), (1, -1), (-1, 1), (1, 1)]
            .into_iter()
            .filter(|&(dx, dy)| {
                let x = center.x + dx;
                let y = center.y + dy;
                if x < 0 || x >= BOARD_WIDTH as i32 || y < 0 {
                    return true;
                }
                y < BOARD_HEIGHT as i32 && self.board[y as usize][x as usize] != 0
            })
            .count()
    }
}

pub fn gravity_interval_for_level(level: u32) -> Duration {
    let steps = level.max(1) - 1;
    let ms = (BASE_GRAVITY_MS * GRAVITY_DECAY.powi(steps as i32)).max(MIN_GRAVITY_MS);
    Duration::from_millis(ms.round() as u64)
}

fn line_clear_points(lines: u32) -> u32 {
    match lines {
        0 => 0,
        1 => 100,
        2 => 300,
        3 => 500,
        _ => 800,
    }
}

/// xorshift64* generator; deterministic per seed so saved games replay the same bag order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Rng {
    state: u64,
}

impl Rng {
    fn new(seed: u64) -> Self {
        let seed = if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed };
        Self { state: seed }
    }

    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        (x.wrapping_mul(0x2545_F491_4F6C_DD1D) >> 32) as u32
    }
}

const GENERIC_KICK_OFFSETS: [(i32, i32); 7] =
    [(0, 0), (-1, 0), (1, 0), (0, 1), (-2, 0), (2, 0), (0, 2)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PieceGrid {
    size: usize,
    cells: [u8; 16],
}

impl PieceGrid {
    pub(crate) fn size(&self) -> usize {
        self.size
    }

    pub(crate) fn cell(&self, x: usize, y: usize) -> u8 {
        debug_assert!(x < self.size && y < self.size);
        self.cells[y * self.size + x]
    }
}

/// Offset from a piece's anchor position to its grid origin.
const fn piece_board_offset(piece: Piece) -> i32 {
    match piece {
        Piece::O => 0,
        Piece::I | Piece::T | Piece::S | Piece::Z | Piece::J | Piece::L => 1,
    }
}

const fn piece_rotation_states(piece: Piece) -> u8 {
    match piece {
        Piece::O => 1,
        Piece::I | Piece::S | Piece::Z => 2,
        Piece::T | Piece::J | Piece::L => 4,
    }
}

pub(crate) fn piece_grid(piece: Piece, rotation: u8) -> PieceGrid {
    let mut grid = base_piece_grid(piece);
    for _ in 0..rotation % piece_rotation_states(piece) {
        grid = rotate_grid_90(&grid);
    }
    grid
}

/// Board coordinates covered by `piece` anchored at `pos` (grid rows grow downward).
fn occupied_cells(piece: Piece, pos: Vec2i, rotation: u8) -> Vec<(i32, i32)> {
    let grid = piece_grid(piece, rotation);
    let offset = piece_board_offset(piece);
    let mut cells = Vec::with_capacity(4);
    for gy in 0..grid.size() {
        for gx in 0..grid.size() {
            if grid.cell(gx, gy) == 1 {
                cells.push((pos.x + gx as i32 - offset, pos.y - gy as i32 + offset));
            }
        }
    }
    cells
}

fn rotate_grid_90(grid: &PieceGrid) -> PieceGrid {
    let size = grid.size;
    let mut rotated = PieceGrid {
        size,
        cells: [0u8; 16],
    };
    for y in 0..size {
        for x in 0..size {
            rotated.cells[x * size + (size - 1 - y)] = grid.cells[y * size + x];
        }
    }
    rotated
}

fn base_piece_grid(piece: Piece) -> PieceGrid {
    let (size, rows): (usize, &[u8]) = match piece {
        Piece::I => (4, &[0, 0, 0, 0, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0]),
        Piece::O => (2, &[1, 1, 1, 1]),
        Piece::T => (3, &[0, 1, 0, 1, 1, 1, 0, 0, 0]),
        Piece::S => (3, &[0, 1, 1, 1, 1, 0, 0, 0, 0]),
        Piece::Z => (3, &[1, 1, 0, 0, 1, 1, 0, 0, 0]),
        Piece::J => (3, &[1, 0, 0, 1, 1, 1, 0, 0, 0]),
        Piece::L => (3, &[0, 0, 1, 1, 1, 1, 0, 0, 0]),
    };
    let mut cells = [0u8; 16];
    cells[..rows.len()].copy_from_slice(rows);
    PieceGrid { size, cells }
}
