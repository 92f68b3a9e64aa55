//! Falling-block puzzle
//!
//! The board is `rows × cols` cells where `rows = floor(surface height /
//! cell size)`. Every placement goes through [`Board::collides`] before the
//! grid is touched, so cells outside the board are never written.

use glam::{IVec2, Vec2};
use rand::Rng;

use super::collision::Rect;
use super::input::{InputEvent, Key};
use super::{EndReason, SimContext, Simulation};
use crate::surface::{Surface, colors};
use crate::tuning::StackTuning;

/// The seven canonical pieces in their spawn orientation
const SHAPES: [&[&[u8]]; 7] = [
    &[&[1, 1, 1, 1]],
    &[&[1, 1], &[1, 1]],
    &[&[0, 1, 0], &[1, 1, 1]],
    &[&[1, 0, 0], &[1, 1, 1]],
    &[&[0, 0, 1], &[1, 1, 1]],
    &[&[1, 1, 0], &[0, 1, 1]],
    &[&[0, 1, 1], &[1, 1, 0]],
];

/// Rectangular boolean matrix, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    cells: Vec<Vec<bool>>,
}

impl Shape {
    /// Build from rows of 0/1; rows must share one width
    pub fn from_rows(rows: &[&[u8]]) -> Self {
        Self {
            cells: rows
                .iter()
                .map(|row| row.iter().map(|&c| c != 0).collect())
                .collect(),
        }
    }

    /// One of the seven canonical pieces
    pub fn canonical(index: usize) -> Self {
        Self::from_rows(SHAPES[index % SHAPES.len()])
    }

    pub fn height(&self) -> usize {
        self.cells.len()
    }

    pub fn width(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    /// Offsets (x = column, y = row) of every filled cell
    pub fn filled(&self) -> impl Iterator<Item = IVec2> + '_ {
        self.cells.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, filled)| **filled)
                .map(move |(x, _)| IVec2::new(x as i32, y as i32))
        })
    }

    /// 90° clockwise: transpose, then reverse each row
    pub fn rotated(&self) -> Self {
        let (h, w) = (self.height(), self.width());
        let cells = (0..w)
            .map(|x| (0..h).rev().map(|y| self.cells[y][x]).collect())
            .collect();
        Self { cells }
    }
}

/// The grid of settled cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: usize,
    cols: usize,
    /// `grid[row][col]`, row 0 at the top
    grid: Vec<Vec<bool>>,
}

impl Board {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            grid: vec![vec![false; cols]; rows],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Settled cell at (col, row); out-of-range reads as empty
    pub fn get(&self, col: i32, row: i32) -> bool {
        self.index(IVec2::new(col, row))
            .map(|(r, c)| self.grid[r][c])
            .unwrap_or(false)
    }

    /// Fill a single cell; rejected (returns false) when out of range
    pub fn set(&mut self, col: i32, row: i32) -> bool {
        match self.index(IVec2::new(col, row)) {
            Some((r, c)) => {
                self.grid[r][c] = true;
                true
            }
            None => false,
        }
    }

    pub fn row_is_full(&self, row: usize) -> bool {
        self.grid.get(row).is_some_and(|r| r.iter().all(|&c| c))
    }

    fn index(&self, cell: IVec2) -> Option<(usize, usize)> {
        let (col, row) = (usize::try_from(cell.x).ok()?, usize::try_from(cell.y).ok()?);
        (row < self.rows && col < self.cols).then_some((row, col))
    }

    /// True if any filled cell of `shape` at `offset` is off the board or on a settled cell
    pub fn collides(&self, shape: &Shape, offset: IVec2) -> bool {
        shape.filled().any(|cell| match self.index(offset + cell) {
            Some((r, c)) => self.grid[r][c],
            None => true,
        })
    }

    /// Write every filled cell of `shape` at `offset` into the grid
    pub fn merge(&mut self, shape: &Shape, offset: IVec2) {
        for cell in shape.filled() {
            let p = offset + cell;
            self.set(p.x, p.y);
        }
    }

    /// Remove full rows bottom-up, inserting empty rows at the top.
    /// Returns the number of rows cleared.
    pub fn sweep(&mut self) -> usize {
        let mut cleared = 0;
        let mut row = self.rows;
        while row > 0 {
            let y = row - 1;
            if self.row_is_full(y) {
                self.grid.remove(y);
                self.grid.insert(0, vec![false; self.cols]);
                cleared += 1;
                // Rows above shifted down into `y`; look at it again
            } else {
                row -= 1;
            }
        }
        cleared
    }
}

/// The piece currently falling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    pub shape: Shape,
    /// Grid offset of the shape's top-left cell (x = column, y = row)
    pub pos: IVec2,
}

#[derive(Debug, Clone)]
pub struct Stack {
    pub tuning: StackTuning,
    pub board: Board,
    pub piece: Option<Piece>,
    /// Seconds since the last forced descent
    pub drop_timer: f32,
}

impl Stack {
    pub fn new(tuning: StackTuning) -> Self {
        let board = Board::new(0, tuning.cols);
        Self {
            tuning,
            board,
            piece: None,
            drop_timer: 0.0,
        }
    }

    fn rows_for(&self, height: f32) -> usize {
        (height / self.tuning.cell_size).floor().max(0.0) as usize
    }

    /// Place `shape` centred on row 0; the run ends if it does not fit
    pub fn spawn_shape(&mut self, shape: Shape) -> Option<EndReason> {
        let x = (self.board.cols() as i32 - shape.width() as i32).div_euclid(2);
        let piece = Piece {
            shape,
            pos: IVec2::new(x, 0),
        };
        let blocked = self.board.collides(&piece.shape, piece.pos);
        self.piece = Some(piece);
        if blocked {
            log::debug!("Stack spawn blocked at column {}", x);
            return Some(EndReason::BoardFull);
        }
        None
    }

    fn spawn(&mut self, ctx: &mut SimContext<'_>) -> Option<EndReason> {
        let index = ctx.rng.random_range(0..SHAPES.len());
        self.spawn_shape(Shape::canonical(index))
    }

    /// Move the piece by `delta` if it fits there
    fn try_shift(&mut self, delta: IVec2) -> bool {
        let Some(piece) = self.piece.as_mut() else {
            return false;
        };
        let target = piece.pos + delta;
        if self.board.collides(&piece.shape, target) {
            return false;
        }
        piece.pos = target;
        true
    }

    /// Rotate in place; silently rejected when the rotated shape collides
    pub fn rotate(&mut self) -> bool {
        let Some(piece) = self.piece.as_mut() else {
            return false;
        };
        let rotated = piece.shape.rotated();
        if self.board.collides(&rotated, piece.pos) {
            return false;
        }
        piece.shape = rotated;
        true
    }

    /// Merge the piece, clear lines, bring in the next one
    fn lock(&mut self, ctx: &mut SimContext<'_>) -> Option<EndReason> {
        if let Some(piece) = self.piece.take() {
            self.board.merge(&piece.shape, piece.pos);
        }
        let cleared = self.board.sweep();
        if cleared > 0 {
            log::debug!("Stack cleared {} line(s)", cleared);
            *ctx.score += cleared as u64 * self.tuning.line_points;
        }
        self.spawn(ctx)
    }

    /// One-row descent, locking if blocked
    pub fn drop_one(&mut self, ctx: &mut SimContext<'_>) -> Option<EndReason> {
        self.drop_timer = 0.0;
        if self.try_shift(IVec2::Y) {
            return None;
        }
        self.lock(ctx)
    }

    /// Fall until blocked, then lock immediately
    pub fn hard_drop(&mut self, ctx: &mut SimContext<'_>) -> Option<EndReason> {
        while self.try_shift(IVec2::Y) {}
        self.drop_timer = 0.0;
        self.lock(ctx)
    }

    fn board_origin(&self, surface: &Surface) -> Vec2 {
        let board_w = self.board.cols() as f32 * self.tuning.cell_size;
        Vec2::new((surface.extent().x - board_w) / 2.0, 0.0)
    }

    fn cell_rect(&self, origin: Vec2, col: i32, row: i32) -> Rect {
        let size = self.tuning.cell_size;
        Rect::new(
            origin.x + col as f32 * size,
            origin.y + row as f32 * size,
            size - 1.0,
            size - 1.0,
        )
    }
}

impl Simulation for Stack {
    fn init(&mut self, ctx: &mut SimContext<'_>) -> Option<EndReason> {
        self.board = Board::new(self.rows_for(ctx.bounds.y), self.tuning.cols);
        self.piece = None;
        self.drop_timer = 0.0;
        self.spawn(ctx)
    }

    fn update(&mut self, dt: f32, ctx: &mut SimContext<'_>) -> Option<EndReason> {
        self.drop_timer += dt;
        if self.drop_timer > self.tuning.drop_interval {
            return self.drop_one(ctx);
        }
        None
    }

    fn draw(&self, surface: &mut Surface) {
        let origin = self.board_origin(surface);
        let size = self.tuning.cell_size;
        let board_w = self.board.cols() as f32 * size;
        let board_h = self.board.rows() as f32 * size;

        // Well walls
        surface.stroke_line(origin, origin + Vec2::new(0.0, board_h), 1.0, colors::GRID_LINE);
        surface.stroke_line(
            origin + Vec2::new(board_w, 0.0),
            origin + Vec2::new(board_w, board_h),
            1.0,
            colors::GRID_LINE,
        );

        for row in 0..self.board.rows() as i32 {
            for col in 0..self.board.cols() as i32 {
                if self.board.get(col, row) {
                    surface.fill_rect(self.cell_rect(origin, col, row), colors::SLATE);
                }
            }
        }

        if let Some(piece) = &self.piece {
            for cell in piece.shape.filled() {
                let p = piece.pos + cell;
                surface.fill_rect(self.cell_rect(origin, p.x, p.y), colors::OCHRE);
            }
        }
    }

    fn input(&mut self, event: &InputEvent, ctx: &mut SimContext<'_>) -> Option<EndReason> {
        let InputEvent::KeyDown(key) = event else {
            return None;
        };
        match key {
            Key::Left => {
                self.try_shift(IVec2::NEG_X);
            }
            Key::Right => {
                self.try_shift(IVec2::X);
            }
            Key::Up => {
                self.rotate();
            }
            Key::Down => return self.drop_one(ctx),
            Key::Space => return self.hard_drop(ctx),
            Key::Other => {}
        }
        None
    }

    /// A row-count change reallocates an empty board; the falling piece is
    /// kept if it still fits, otherwise it is re-spawned at the top
    fn on_resize(&mut self, ctx: &mut SimContext<'_>) -> Option<EndReason> {
        let rows = self.rows_for(ctx.bounds.y);
        if rows == self.board.rows() {
            return None;
        }
        log::debug!("Stack board resized to {} rows", rows);
        self.board = Board::new(rows, self.tuning.cols);
        match self.piece.take() {
            Some(piece) if !self.board.collides(&piece.shape, piece.pos) => {
                self.piece = Some(piece);
                None
            }
            Some(piece) => self.spawn_shape(piece.shape),
            None => self.spawn(ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn full_row(board: &mut Board, row: i32) {
        for col in 0..board.cols() as i32 {
            board.set(col, row);
        }
    }

    #[test]
    fn test_rotation_of_t_piece() {
        let t = Shape::canonical(2);
        let r = t.rotated();
        assert_eq!(r, Shape::from_rows(&[&[1, 0], &[1, 1], &[1, 0]]));
        // Four turns is the identity
        assert_eq!(r.rotated().rotated().rotated(), t);
    }

    #[test]
    fn test_rotation_of_i_piece_is_vertical() {
        let i = Shape::canonical(0);
        let r = i.rotated();
        assert_eq!((r.width(), r.height()), (1, 4));
    }

    #[test]
    fn test_collides_edges() {
        let board = Board::new(20, 10);
        let o = Shape::canonical(1);
        assert!(!board.collides(&o, IVec2::new(0, 0)));
        assert!(!board.collides(&o, IVec2::new(8, 18)));
        assert!(board.collides(&o, IVec2::new(-1, 0)));
        assert!(board.collides(&o, IVec2::new(9, 0)));
        assert!(board.collides(&o, IVec2::new(0, 19)));
        assert!(board.collides(&o, IVec2::new(0, -1)));
    }

    #[test]
    fn test_collides_ignores_empty_shape_cells() {
        let mut board = Board::new(20, 10);
        // S piece has an empty top-left cell
        let s = Shape::canonical(6);
        board.set(0, 0);
        assert!(!board.collides(&s, IVec2::new(0, 0)));
        board.set(1, 0);
        assert!(board.collides(&s, IVec2::new(0, 0)));
    }

    #[test]
    fn test_sweep_bottom_row() {
        let mut board = Board::new(4, 3);
        full_row(&mut board, 3);
        board.set(1, 2);
        board.set(0, 0);

        let (mut score, mut rng) = (0, Pcg32::seed_from_u64(1));
        let mut stack = Stack::new(StackTuning {
            cols: 3,
            ..Default::default()
        });
        stack.board = board;
        {
            let mut ctx = SimContext::new(Vec2::new(75.0, 100.0), &mut score, &mut rng);
            stack.lock(&mut ctx);
        }
        assert_eq!(score, 100);

        let mut expected = Board::new(4, 3);
        expected.set(0, 1);
        expected.set(1, 3);
        // Newly spawned piece is not merged, so compare the settled grid only
        assert_eq!(stack.board, expected);
    }

    #[test]
    fn test_sweep_rechecks_same_row() {
        let mut board = Board::new(5, 2);
        full_row(&mut board, 4);
        full_row(&mut board, 3);
        board.set(0, 2);
        assert_eq!(board.sweep(), 2);
        let mut expected = Board::new(5, 2);
        expected.set(0, 4);
        assert_eq!(board, expected);
    }

    #[test]
    fn test_sweep_non_adjacent_rows() {
        let mut board = Board::new(4, 2);
        full_row(&mut board, 3);
        board.set(1, 2);
        full_row(&mut board, 1);
        assert_eq!(board.sweep(), 2);
        assert!(board.get(1, 3));
        assert_eq!((0..4).filter(|&r| board.row_is_full(r)).count(), 0);
    }

    #[test]
    fn test_rotation_rejected_against_wall() {
        let mut stack = Stack::new(StackTuning::default());
        stack.board = Board::new(20, 10);
        // Vertical I flush against the right wall; horizontal needs 4 columns
        let vertical = Shape::canonical(0).rotated();
        stack.piece = Some(Piece {
            shape: vertical.clone(),
            pos: IVec2::new(9, 5),
        });
        assert!(!stack.rotate());
        assert_eq!(stack.piece.as_ref().unwrap().shape, vertical);
        assert_eq!(stack.piece.as_ref().unwrap().pos, IVec2::new(9, 5));
    }

    #[test]
    fn test_rotation_rejected_by_settled_cells() {
        let mut stack = Stack::new(StackTuning::default());
        stack.board = Board::new(20, 10);
        stack.board.set(3, 6);
        let shape = Shape::canonical(0);
        stack.piece = Some(Piece {
            shape: shape.clone(),
            pos: IVec2::new(3, 5),
        });
        assert!(!stack.rotate());
        assert_eq!(stack.piece.unwrap().shape, shape);
    }

    #[test]
    fn test_hard_drop_lands_on_floor_and_scores_line() {
        let mut stack = Stack::new(StackTuning {
            cols: 4,
            ..Default::default()
        });
        let (mut score, mut rng) = (0, Pcg32::seed_from_u64(9));
        {
            let mut ctx = SimContext::new(Vec2::new(100.0, 250.0), &mut score, &mut rng);
            stack.init(&mut ctx);
            assert_eq!(stack.board.rows(), 10);
            stack.piece = Some(Piece {
                shape: Shape::canonical(0),
                pos: IVec2::new(0, 0),
            });
            assert_eq!(stack.hard_drop(&mut ctx), None);
        }
        assert_eq!(score, 100);
        assert!((0..10).all(|r| !stack.board.row_is_full(r)));
        assert!(stack.piece.is_some());
    }

    #[test]
    fn test_gravity_drops_after_interval() {
        let mut stack = Stack::new(StackTuning::default());
        let (mut score, mut rng) = (0, Pcg32::seed_from_u64(2));
        let mut ctx = SimContext::new(Vec2::new(800.0, 500.0), &mut score, &mut rng);
        stack.init(&mut ctx);
        let start = stack.piece.as_ref().unwrap().pos;
        stack.update(0.5, &mut ctx);
        assert_eq!(stack.piece.as_ref().unwrap().pos, start);
        stack.update(0.6, &mut ctx);
        assert_eq!(stack.piece.as_ref().unwrap().pos, start + IVec2::Y);
        assert_eq!(stack.drop_timer, 0.0);
    }

    #[test]
    fn test_spawn_into_filled_board_ends_run() {
        let mut stack = Stack::new(StackTuning::default());
        stack.board = Board::new(20, 10);
        full_row(&mut stack.board, 0);
        stack.board.set(0, 1);
        assert_eq!(stack.spawn_shape(Shape::canonical(1)), Some(EndReason::BoardFull));
    }

    #[test]
    fn test_board_too_short_ends_on_init() {
        let mut stack = Stack::new(StackTuning::default());
        let (mut score, mut rng) = (0, Pcg32::seed_from_u64(2));
        let mut ctx = SimContext::new(Vec2::new(800.0, 10.0), &mut score, &mut rng);
        assert_eq!(stack.init(&mut ctx), Some(EndReason::BoardFull));
    }

    #[test]
    fn test_sideways_moves_validated() {
        let mut stack = Stack::new(StackTuning::default());
        let (mut score, mut rng) = (0, Pcg32::seed_from_u64(2));
        let mut ctx = SimContext::new(Vec2::new(800.0, 500.0), &mut score, &mut rng);
        stack.init(&mut ctx);
        for _ in 0..20 {
            stack.input(&InputEvent::KeyDown(Key::Left), &mut ctx);
        }
        assert_eq!(stack.piece.as_ref().unwrap().pos.x, 0);
        for _ in 0..20 {
            stack.input(&InputEvent::KeyDown(Key::Right), &mut ctx);
        }
        let piece = stack.piece.as_ref().unwrap();
        assert_eq!(piece.pos.x as usize + piece.shape.width(), 10);
    }

    #[test]
    fn test_resize_same_rows_is_noop() {
        let mut stack = Stack::new(StackTuning::default());
        let (mut score, mut rng) = (0, Pcg32::seed_from_u64(2));
        let mut ctx = SimContext::new(Vec2::new(800.0, 500.0), &mut score, &mut rng);
        stack.init(&mut ctx);
        stack.board.set(0, 19);
        ctx.bounds.y = 510.0;
        assert_eq!(stack.on_resize(&mut ctx), None);
        assert!(stack.board.get(0, 19));
    }

    #[test]
    fn test_resize_reallocates_and_keeps_piece_in_range() {
        let mut stack = Stack::new(StackTuning::default());
        let (mut score, mut rng) = (0, Pcg32::seed_from_u64(2));
        let mut ctx = SimContext::new(Vec2::new(800.0, 500.0), &mut score, &mut rng);
        stack.init(&mut ctx);
        stack.board.set(0, 19);
        stack.piece.as_mut().unwrap().pos.y = 17;

        ctx.bounds.y = 250.0;
        assert_eq!(stack.on_resize(&mut ctx), None);
        assert_eq!(stack.board.rows(), 10);
        assert!(!stack.board.get(0, 9));
        let piece = stack.piece.as_ref().unwrap();
        assert!(!stack.board.collides(&piece.shape, piece.pos));
    }

    fn arb_shape() -> impl Strategy<Value = Shape> {
        (1usize..=4, 1usize..=4).prop_flat_map(|(h, w)| {
            prop::collection::vec(prop::collection::vec(any::<bool>(), w), h)
                .prop_map(|cells| Shape { cells })
        })
    }

    proptest! {
        #[test]
        fn prop_collides_matches_cellwise_check(
            shape in arb_shape(),
            x in -5i32..15,
            y in -5i32..25,
            fill in prop::collection::vec(any::<bool>(), 200),
        ) {
            let mut board = Board::new(20, 10);
            for (i, filled) in fill.iter().enumerate() {
                if *filled && i % 3 == 0 {
                    board.set((i % 10) as i32, (i / 10) as i32);
                }
            }
            let offset = IVec2::new(x, y);
            let expected = shape.filled().any(|cell| {
                let p = offset + cell;
                p.x < 0 || p.x >= 10 || p.y < 0 || p.y >= 20 || board.get(p.x, p.y)
            });
            prop_assert_eq!(board.collides(&shape, offset), expected);
        }

        #[test]
        fn prop_merge_after_clear_placement_fills_exactly_shape(
            shape in arb_shape(),
            x in 0i32..7,
            y in 0i32..17,
        ) {
            let mut board = Board::new(20, 10);
            let offset = IVec2::new(x, y);
            prop_assume!(!board.collides(&shape, offset));
            board.merge(&shape, offset);
            let filled = (0..20).flat_map(|r| (0..10).map(move |c| (c, r)))
                .filter(|&(c, r)| board.get(c, r))
                .count();
            prop_assert_eq!(filled, shape.filled().count());
        }
    }
}
