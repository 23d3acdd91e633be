use ndarray::{Array4, ArrayViewMut3, Axis};
use shakmaty::{Chess, EnPassantMode, Position, Role, Setup, Square};

/// Number of input planes the policy network expects.
pub const BOARD_CHANNELS: usize = 18;

/// Encode a position into the `[1, 18, 8, 8]` input tensor.
///
/// The network always sees the position from White's side: when Black
/// is to move the board is mirrored first, and the move codec mirrors
/// moves the same way.
pub fn encode_position(position: &Chess) -> Array4<f32> {
    let mut setup = position.to_setup(EnPassantMode::Legal);
    if setup.turn.is_black() {
        setup.mirror();
    }

    let mut board_tensor = Array4::<f32>::zeros((1, BOARD_CHANNELS, 8, 8));
    board_to_tensor(&setup, board_tensor.index_axis_mut(Axis(0), 0));
    board_tensor
}

fn board_to_tensor(setup: &Setup, mut tensor: ArrayViewMut3<f32>) {
    // Channels 0..6 hold white pieces, 6..12 black pieces.
    for sq in Square::ALL {
        if let Some(piece) = setup.board.piece_at(sq) {
            let color_offset = if piece.color.is_white() { 0 } else { 6 };
            let role_offset = match piece.role {
                Role::Pawn => 0,
                Role::Knight => 1,
                Role::Bishop => 2,
                Role::Rook => 3,
                Role::Queen => 4,
                Role::King => 5,
            };
            tensor[[color_offset + role_offset, sq.rank() as usize, sq.file() as usize]] = 1.0;
        }
    }

    // Side to move.
    tensor
        .index_axis_mut(Axis(0), 12)
        .fill(setup.turn.is_white() as u8 as f32);

    // Castling rights, by original rook square: K, Q, k, q.
    let castling_rights = [
        setup.castling_rights.contains(Square::H1),
        setup.castling_rights.contains(Square::A1),
        setup.castling_rights.contains(Square::H8),
        setup.castling_rights.contains(Square::A8),
    ];
    for (i, &has_right) in castling_rights.iter().enumerate() {
        tensor
            .index_axis_mut(Axis(0), 13 + i)
            .fill(has_right as u8 as f32);
    }

    if let Some(ep_sq) = setup.ep_square {
        tensor[[17, ep_sq.rank() as usize, ep_sq.file() as usize]] = 1.0;
    }
}
