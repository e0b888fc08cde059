//! Read-only board view model and a plain-text renderer.

use crate::games::chess::{Side, Square};
use crate::highlight::HighlightMap;
use derive_getters::Getters;
use shakmaty::{File, Rank};

/// Everything a board view needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Eq, Getters, derive_new::new)]
pub struct BoardSnapshot {
    /// Position to draw.
    fen: String,
    /// Per-square style overlay.
    highlights: HighlightMap,
    /// Side drawn at the bottom.
    orientation: Side,
}

/// Renders `snapshot` as a text board.
///
/// Uppercase letters are White pieces, `.` is an empty square. Highlighted
/// squares are bracketed: `[ ]` selected, `( )` move, `< >` capture.
pub fn render_board(snapshot: &BoardSnapshot) -> String {
    let placement = placement_grid(snapshot.fen());

    let (ranks, files): (Vec<u32>, Vec<u32>) = match snapshot.orientation() {
        Side::White => ((0..8).rev().collect(), (0..8).collect()),
        Side::Black => ((0..8).collect(), (0..8).rev().collect()),
    };

    let border = format!("  +{}+\n", "-".repeat(files.len() * 3));
    let mut out = border.clone();

    for &rank in &ranks {
        out.push(Rank::new(rank).char());
        out.push_str(" |");
        for &file in &files {
            let square = Square::from_coords(File::new(file), Rank::new(rank));
            let piece = placement[rank as usize][file as usize];
            let (open, close) = snapshot
                .highlights()
                .get(&square)
                .map(|tag| tag.brackets())
                .unwrap_or((' ', ' '));
            out.push(open);
            out.push(piece);
            out.push(close);
        }
        out.push_str("|\n");
    }

    out.push_str(&border);
    out.push_str("   ");
    for &file in &files {
        out.push(' ');
        out.push(File::new(file).char());
        out.push(' ');
    }
    out.push('\n');
    out
}

/// Piece letters indexed `[rank][file]`, rank 0 being rank 1.
fn placement_grid(fen: &str) -> [[char; 8]; 8] {
    let mut grid = [['.'; 8]; 8];
    let placement = fen.split_whitespace().next().unwrap_or_default();

    for (row, rank_text) in placement.split('/').take(8).enumerate() {
        let rank = 7 - row;
        let mut file = 0usize;
        for c in rank_text.chars() {
            if let Some(skip) = c.to_digit(10) {
                file += skip as usize;
            } else if file < 8 {
                grid[rank][file] = c;
                file += 1;
            }
        }
    }

    grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::StyleTag;

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn white_at_bottom_by_default() {
        let text = render_board(&BoardSnapshot::new(
            START.to_string(),
            HighlightMap::new(),
            Side::White,
        ));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "8 | r  n  b  q  k  b  n  r |");
        assert_eq!(lines[8], "1 | R  N  B  Q  K  B  N  R |");
        assert_eq!(lines[10], "    a  b  c  d  e  f  g  h ");
    }

    #[test]
    fn black_orientation_flips_board() {
        let text = render_board(&BoardSnapshot::new(
            START.to_string(),
            HighlightMap::new(),
            Side::Black,
        ));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "1 | R  N  B  K  Q  B  N  R |");
        assert_eq!(lines[10], "    h  g  f  e  d  c  b  a ");
    }

    #[test]
    fn highlights_are_bracketed() {
        let mut highlights = HighlightMap::new();
        highlights.insert(Square::E2, StyleTag::Selected);
        highlights.insert(Square::E4, StyleTag::Move);
        let text = render_board(&BoardSnapshot::new(START.to_string(), highlights, Side::White));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[5], "4 | .  .  .  . (.) .  .  . |");
        assert_eq!(lines[7], "2 | P  P  P  P [P] P  P  P |");
    }
}
