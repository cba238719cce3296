use super::*;

#[test]
fn test_player_opponent() {
    assert_eq!(Player::Black.opponent(), Player::White);
    assert_eq!(Player::White.opponent(), Player::Black);
}

#[test]
fn test_player_codes_round_trip() {
    assert_eq!(u8::from(Player::Black), 1);
    assert_eq!(u8::from(Player::White), 2);
    assert_eq!(Player::try_from(2), Ok(Player::White));
    assert!(Player::try_from(0).is_err());
    assert!(Player::try_from(3).is_err());
}

#[test]
fn test_pos_conversion() {
    let pos = Pos::new(7, 7); // Center of 15x15
    assert_eq!(pos.to_index(15), 7 * 15 + 7);
    assert_eq!(Pos::from_index(112, 15), pos);
    assert_eq!(Pos::from_index(16, 15), Pos::new(1, 1));
}

#[test]
fn test_pos_offset_respects_edges() {
    let corner = Pos::new(0, 0);
    assert_eq!(corner.offset(1, 1, 2, 15), Some(Pos::new(2, 2)));
    assert_eq!(corner.offset(-1, 0, 1, 15), None);
    assert_eq!(Pos::new(14, 3).offset(1, 0, 1, 15), None);
}

#[test]
fn test_pos_raster_ordering() {
    let a = Pos::new(5, 0);
    let b = Pos::new(0, 1);
    let c = Pos::new(1, 1);
    assert!(a < b, "lower row comes first regardless of column");
    assert!(b < c);
}

#[test]
fn test_board_bounds() {
    let board = Board::new(15);
    assert_eq!(board.pos(0, 0), Some(Pos::new(0, 0)));
    assert_eq!(board.pos(14, 14), Some(Pos::new(14, 14)));
    assert_eq!(board.pos(-1, 0), None);
    assert_eq!(board.pos(0, 15), None);
    assert!(!board.contains(Pos::new(15, 0)));
}

#[test]
fn test_place_stone() {
    let mut board = Board::default();
    assert!(board.is_board_empty());

    board.place_stone(Pos::new(7, 8), Stone::White);
    assert_eq!(board.get(Pos::new(7, 8)), Stone::White);
    assert_eq!(board.get(Pos::new(8, 7)), Stone::Empty);
    assert_eq!(board.stone_count(), 1);
    assert!(board.stones(Player::White).get(Pos::new(7, 8).to_index(15)));
    assert!(!board.is_board_empty());
}

#[test]
fn test_empty_cells_raster_order() {
    let mut board = Board::new(5);
    board.place_stone(Pos::new(0, 0), Stone::Black);
    board.place_stone(Pos::new(2, 0), Stone::White);

    let first: Vec<Pos> = board.empty_cells().take(3).collect();
    assert_eq!(first, vec![Pos::new(1, 0), Pos::new(3, 0), Pos::new(4, 0)]);
    assert_eq!(board.empty_cells().count(), 23);
}

#[test]
fn test_rows_are_indexed_by_y_then_x() {
    let mut board = Board::new(5);
    board.place_stone(Pos::new(3, 1), Stone::Black);
    let rows = board.rows();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[1][3], 1);
    assert_eq!(rows[3][1], 0);
}

#[test]
fn test_full_board() {
    let mut board = Board::new(5);
    for idx in 0..25 {
        board.place_stone(Pos::from_index(idx, 5), Stone::Black);
    }
    assert!(board.is_full());
    assert_eq!(board.empty_cells().count(), 0);
}

#[test]
fn test_bitboard_iter_crosses_words() {
    let mut bits = Bitboard::new(225);
    for idx in [0, 63, 64, 200, 224] {
        bits.set(idx);
    }
    assert_eq!(bits.iter_ones().collect::<Vec<_>>(), vec![0, 63, 64, 200, 224]);
    assert_eq!(bits.count(), 5);
    bits.clear(64);
    assert!(!bits.get(64));
}
