//! Maps chess moves to a flat index (0..4672) in the 8x8x73 policy
//! tensor used by AlphaZero-style networks.

use shakmaty::{CastlingMode, Chess, Move, Position, Role, uci::UciMove};

use crate::error::CodecError;

/// Size of the policy vector: 64 source squares times 73 move planes.
pub const POLICY_SIZE: usize = 64 * PLANES;

const PLANES: usize = 73;

/// Maps a legal move, in the context of its position, to an index in
/// the policy vector.
pub trait MoveCodec {
    fn encode(&self, mv: &Move, position: &Chess) -> Result<usize, CodecError>;
}

impl<C: MoveCodec + ?Sized> MoveCodec for &C {
    fn encode(&self, mv: &Move, position: &Chess) -> Result<usize, CodecError> {
        (**self).encode(mv, position)
    }
}

/// The AlphaZero move encoding, seen from the side to move.
///
/// Index = `source_square * 73 + plane`:
/// - planes 0..56: queen-like slides, `direction * 7 + (distance - 1)`
///   with directions N, NE, E, SE, S, SW, W, NW
/// - planes 56..64: knight jumps
/// - planes 64..73: underpromotions to knight, bishop or rook, each
///   straight, capturing left or capturing right
///
/// Queen promotions use the slide planes. When Black is to move, the
/// move is mirrored vertically first, matching the board encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlphaZeroCodec;

impl MoveCodec for AlphaZeroCodec {
    fn encode(&self, mv: &Move, position: &Chess) -> Result<usize, CodecError> {
        let uci = mv.to_uci(CastlingMode::Standard);
        let uci = if position.turn().is_black() {
            uci.to_mirrored()
        } else {
            uci
        };
        encode_uci(&uci)
    }
}

fn encode_uci(uci: &UciMove) -> Result<usize, CodecError> {
    let &UciMove::Normal {
        from,
        to,
        promotion,
    } = uci
    else {
        return Err(CodecError::NoFromSquare(uci.to_string()));
    };

    let src_file = from.file() as i32;
    let src_rank = from.rank() as i32;
    let dx = to.file() as i32 - src_file;
    let dy = to.rank() as i32 - src_rank;

    let plane = match promotion {
        Some(role @ (Role::Knight | Role::Bishop | Role::Rook)) => {
            let direction = match dx {
                0 => 0,
                -1 => 1,
                1 => 2,
                _ => return Err(CodecError::NoGeometry(uci.to_string())),
            };
            let piece = match role {
                Role::Knight => 0,
                Role::Bishop => 3,
                _ => 6,
            };
            64 + direction + piece
        }
        Some(Role::Pawn | Role::King) => return Err(CodecError::Promotion(uci.to_string())),
        Some(Role::Queen) | None => {
            if (dx * dy).abs() == 2 {
                56 + knight_plane(dx, dy)
            } else {
                slide_plane(dx, dy).ok_or_else(|| CodecError::NoGeometry(uci.to_string()))?
            }
        }
    };

    let source = (src_rank * 8 + src_file) as usize;
    Ok(source * PLANES + plane)
}

fn knight_plane(dx: i32, dy: i32) -> usize {
    match (dx, dy) {
        (1, 2) => 0,
        (2, 1) => 1,
        (2, -1) => 2,
        (1, -2) => 3,
        (-1, -2) => 4,
        (-2, -1) => 5,
        (-2, 1) => 6,
        _ => 7, // (-1, 2)
    }
}

fn slide_plane(dx: i32, dy: i32) -> Option<usize> {
    if dx == 0 && dy == 0 {
        return None;
    }
    if dx != 0 && dy != 0 && dx.abs() != dy.abs() {
        return None;
    }

    let direction = match (dx.signum(), dy.signum()) {
        (0, 1) => 0,
        (1, 1) => 1,
        (1, 0) => 2,
        (1, -1) => 3,
        (0, -1) => 4,
        (-1, -1) => 5,
        (-1, 0) => 6,
        _ => 7, // (-1, 1)
    };
    let distance = dx.abs().max(dy.abs()) as usize;

    Some(direction * 7 + distance - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::{Square, fen::Fen};

    fn position(fen: &str) -> Chess {
        fen.parse::<Fen>()
            .unwrap()
            .into_position(CastlingMode::Standard)
            .unwrap()
    }

    fn index_of(position: &Chess, uci: &str) -> Result<usize, CodecError> {
        let mv = uci.parse::<UciMove>().unwrap().to_move(position).unwrap();
        AlphaZeroCodec.encode(&mv, position)
    }

    #[test]
    fn queen_slides() {
        let pos = Chess::default();
        // e2 (12) -> e4: N, distance 2.
        assert_eq!(index_of(&pos, "e2e4"), Ok(12 * 73 + 1));
        // e2 -> e3: N, distance 1.
        assert_eq!(index_of(&pos, "e2e3"), Ok(12 * 73));
    }

    #[test]
    fn knight_jumps() {
        let pos = Chess::default();
        // g1 (6) -> f3: (-1, 2).
        assert_eq!(index_of(&pos, "g1f3"), Ok(6 * 73 + 56 + 7));
        // b1 (1) -> c3: (1, 2).
        assert_eq!(index_of(&pos, "b1c3"), Ok(73 + 56));
    }

    #[test]
    fn black_moves_are_mirrored() {
        let pos = position("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1");
        // e7e5 is seen as e2e4 from Black's side.
        assert_eq!(index_of(&pos, "e7e5"), Ok(12 * 73 + 1));
        assert_eq!(index_of(&pos, "g8f6"), Ok(6 * 73 + 56 + 7));
    }

    #[test]
    fn promotions() {
        let pos = position("1n5k/P7/8/8/8/8/8/K7 w - - 0 1");
        // a7 (48) -> a8 queen uses the slide plane.
        assert_eq!(index_of(&pos, "a7a8q"), Ok(48 * 73));
        assert_eq!(index_of(&pos, "a7a8r"), Ok(48 * 73 + 64 + 6));
        // Capture to the right, towards b8.
        assert_eq!(index_of(&pos, "a7b8n"), Ok(48 * 73 + 64 + 2));
        assert_eq!(index_of(&pos, "a7b8b"), Ok(48 * 73 + 64 + 2 + 3));
    }

    #[test]
    fn castling_is_a_king_slide() {
        let pos = position("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        // e1 (4) -> g1: E, distance 2.
        assert_eq!(index_of(&pos, "e1g1"), Ok(4 * 73 + 2 * 7 + 1));
        // e1 -> c1: W, distance 2.
        assert_eq!(index_of(&pos, "e1c1"), Ok(4 * 73 + 6 * 7 + 1));
    }

    #[test]
    fn rejects_moves_without_geometry() {
        assert!(matches!(
            encode_uci(&UciMove::Null),
            Err(CodecError::NoFromSquare(_))
        ));
        let odd = UciMove::Normal {
            from: Square::A1,
            to: Square::C4,
            promotion: None,
        };
        assert!(matches!(encode_uci(&odd), Err(CodecError::NoGeometry(_))));
        let king_promotion = UciMove::Normal {
            from: Square::A7,
            to: Square::A8,
            promotion: Some(Role::King),
        };
        assert!(matches!(
            encode_uci(&king_promotion),
            Err(CodecError::Promotion(_))
        ));
    }

    #[test]
    fn every_legal_move_fits_the_policy() {
        let fens = [
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R b KQkq - 0 1",
            "8/2P5/8/8/8/8/5p2/K6k w - - 0 1",
        ];
        for fen in fens {
            let pos = position(fen);
            let mut seen = std::collections::HashSet::new();
            for mv in pos.legal_moves() {
                let idx = AlphaZeroCodec.encode(&mv, &pos).unwrap();
                assert!(idx < POLICY_SIZE);
                assert!(seen.insert(idx), "duplicate index for {mv}");
            }
        }
    }
}
