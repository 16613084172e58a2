use chess::{Board, Color, Piece, Square, ALL_SQUARES};
use std::str::FromStr;

use crate::models::board_render::{
    BoardRenderSpec, Highlight, HighlightRole, Palette, RenderedImage, Rgb, SVG_CONTENT_TYPE,
};
use crate::services::errors::board_renderer_errors::RenderError;

pub const SQUARE_SIZE: u32 = 45;
pub const BOARD_SIZE: u32 = SQUARE_SIZE * 8;

const ALERT: Rgb = Rgb::new(255, 0, 0);
const INK: Rgb = Rgb::new(0, 0, 0);

/// Draws a position as an SVG image, seen from white's side.
#[derive(Clone, Default)]
pub struct BoardRenderer;

impl BoardRenderer {
    pub fn new() -> Self {
        BoardRenderer
    }

    pub fn render(
        &self,
        spec: &BoardRenderSpec,
        palette: &Palette,
    ) -> Result<RenderedImage, RenderError> {
        let board = Board::from_str(&spec.fen)
            .map_err(|e| RenderError::InvalidPosition(format!("{}: {}", spec.fen, e)))?;

        let raw = self.draw(&board, &spec.highlights(), palette);
        let svg = finalize_svg(&raw)?;

        Ok(RenderedImage {
            content_type: SVG_CONTENT_TYPE,
            bytes: svg.into_bytes(),
        })
    }

    fn draw(&self, board: &Board, highlights: &[Highlight], palette: &Palette) -> String {
        let mut svg = String::new();
        svg.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        svg.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\">\n",
            BOARD_SIZE, BOARD_SIZE
        ));

        for square in ALL_SQUARES {
            let (x, y) = origin(square);
            let base = if is_dark(square) {
                palette.dark
            } else {
                palette.light
            };
            // Later highlights win, so check and capture paint over the move
            let fill = highlights
                .iter()
                .rev()
                .find(|highlight| highlight.square == square)
                .map_or(base, |highlight| match highlight.role {
                    HighlightRole::MoveOrigin | HighlightRole::MoveDestination => {
                        palette.highlight
                    }
                    HighlightRole::Check | HighlightRole::Capture => ALERT,
                });
            svg.push_str(&format!(
                "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\"/>\n",
                x,
                y,
                SQUARE_SIZE,
                SQUARE_SIZE,
                fill.to_hex()
            ));

            let label = if is_dark(square) {
                palette.light
            } else {
                palette.dark
            };
            if square.get_rank().to_index() == 0 {
                svg.push_str(&format!(
                    "<text x=\"{}\" y=\"{}\" font-size=\"10\" text-anchor=\"end\" fill=\"{}\">{}</text>\n",
                    x + SQUARE_SIZE - 3,
                    y + SQUARE_SIZE - 3,
                    label.to_hex(),
                    (b'a' + square.get_file().to_index() as u8) as char
                ));
            }
            if square.get_file().to_index() == 0 {
                svg.push_str(&format!(
                    "<text x=\"{}\" y=\"{}\" font-size=\"10\" fill=\"{}\">{}</text>\n",
                    x + 3,
                    y + 11,
                    label.to_hex(),
                    square.get_rank().to_index() + 1
                ));
            }
        }

        for square in ALL_SQUARES {
            let (Some(piece), Some(color)) = (board.piece_on(square), board.color_on(square)) else {
                continue;
            };
            let (x, y) = origin(square);
            svg.push_str(&format!(
                "<text x=\"{}\" y=\"{}\" font-size=\"36\" text-anchor=\"middle\" dominant-baseline=\"central\" style=\"fill:{}\">{}</text>\n",
                x + SQUARE_SIZE / 2,
                y + SQUARE_SIZE / 2,
                INK.to_hex(),
                glyph(piece, color)
            ));
        }

        svg.push_str("</svg>\n");
        svg
    }
}

fn origin(square: Square) -> (u32, u32) {
    let file = square.get_file().to_index() as u32;
    let rank = square.get_rank().to_index() as u32;
    (file * SQUARE_SIZE, (7 - rank) * SQUARE_SIZE)
}

/// a1 is a dark square.
fn is_dark(square: Square) -> bool {
    (square.get_file().to_index() + square.get_rank().to_index()) % 2 == 0
}

fn glyph(piece: Piece, color: Color) -> char {
    match (color, piece) {
        (Color::White, Piece::King) => '♔',
        (Color::White, Piece::Queen) => '♕',
        (Color::White, Piece::Rook) => '♖',
        (Color::White, Piece::Bishop) => '♗',
        (Color::White, Piece::Knight) => '♘',
        (Color::White, Piece::Pawn) => '♙',
        (Color::Black, Piece::King) => '♚',
        (Color::Black, Piece::Queen) => '♛',
        (Color::Black, Piece::Rook) => '♜',
        (Color::Black, Piece::Bishop) => '♝',
        (Color::Black, Piece::Knight) => '♞',
        (Color::Black, Piece::Pawn) => '♟',
    }
}

/// Post-processing for strict SVG consumers (mobile clients in particular):
/// adds a `viewBox` built from the first two numeric attributes of the `<svg>`
/// element, and rewrites colour tokens written as `:RRGGBB` to `:#RRGGBB`.
pub fn finalize_svg(raw: &str) -> Result<String, RenderError> {
    let start = raw
        .find("<svg")
        .ok_or_else(|| RenderError::MalformedSvg("no <svg> element".to_string()))?;
    let end = raw[start..]
        .find('>')
        .map(|offset| start + offset)
        .ok_or_else(|| RenderError::MalformedSvg("unterminated <svg> element".to_string()))?;

    let tag = &raw[start..end];
    let mut svg = String::with_capacity(raw.len() + 32);
    if tag.contains("viewBox=") {
        svg.push_str(raw);
    } else {
        let dimensions = numeric_attributes(tag);
        let [width, height] = dimensions.as_slice() else {
            return Err(RenderError::MalformedSvg(
                "<svg> element has no width and height".to_string(),
            ));
        };
        let insert_at = if tag.ends_with('/') { end - 1 } else { end };
        svg.push_str(&raw[..insert_at]);
        svg.push_str(&format!(" viewBox=\"0 0 {} {}\"", width, height));
        svg.push_str(&raw[insert_at..]);
    }

    Ok(fix_color_tokens(&svg))
}

/// Values of `name="digits"` attributes, in order, at most two.
fn numeric_attributes(tag: &str) -> Vec<&str> {
    let mut values = Vec::new();
    let mut rest = tag;
    while values.len() < 2 {
        let Some(eq) = rest.find("=\"") else {
            break;
        };
        let named = rest[..eq]
            .chars()
            .next_back()
            .map_or(false, |c| c.is_ascii_lowercase());
        let after = &rest[eq + 2..];
        let Some(close) = after.find('"') else {
            break;
        };
        let value = &after[..close];
        if named && !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
            values.push(value);
        }
        rest = &after[close + 1..];
    }
    values
}

fn fix_color_tokens(svg: &str) -> String {
    let bytes = svg.as_bytes();
    let mut fixed = String::with_capacity(svg.len());
    let mut copied = 0;
    for (index, _) in svg.match_indices(':') {
        let digits = &bytes[index + 1..];
        let is_color = digits.len() >= 6
            && digits[..6].iter().all(u8::is_ascii_hexdigit)
            && digits.get(6).map_or(true, |b| !b.is_ascii_alphanumeric());
        if is_color {
            fixed.push_str(&svg[copied..=index]);
            fixed.push('#');
            copied = index + 1;
        }
    }
    fixed.push_str(&svg[copied..]);
    fixed
}
