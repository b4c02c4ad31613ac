//! Advance widths of the standard Helvetica faces and greedy line wrapping.
//!
//! Widths are in thousandths of an em for the printable ASCII range
//! (0x20..=0x7E), taken from the Adobe core font metrics.

const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // p..~
];

const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 0..?
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // P.._
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // `..o
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // p..~
];

/// Width used for Latin-1 characters outside the table.
const FALLBACK_WIDTH: u16 = 556;

/// Metrics of one standard face at one size.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FontMetrics {
    widths: &'static [u16; 95],
    size: f32,
}

impl FontMetrics {
    pub(crate) fn helvetica(bold: bool, size: f32) -> Self {
        Self {
            widths: if bold { &HELVETICA_BOLD } else { &HELVETICA },
            size,
        }
    }

    /// Advance of one WinAnsi byte, in points.
    pub(crate) fn advance(&self, byte: u8) -> f32 {
        let units = match byte {
            0x20..=0x7E => self.widths[usize::from(byte - 0x20)],
            _ => FALLBACK_WIDTH,
        };
        f32::from(units) * self.size / 1000.0
    }

    /// Width of an encoded string, in points.
    pub(crate) fn width(&self, text: &[u8]) -> f32 {
        text.iter().map(|&b| self.advance(b)).sum()
    }

    /// Split encoded text into lines no wider than `max_width` points.
    ///
    /// Lines break at the last space that fits; a word longer than a whole
    /// line is broken between characters. The space at a break is dropped.
    pub(crate) fn wrap(&self, text: &[u8], max_width: f32) -> Vec<Vec<u8>> {
        let mut lines = Vec::new();
        let mut line: Vec<u8> = Vec::new();
        let mut width = 0.0;
        let mut last_space = None;

        for &byte in text {
            let advance = self.advance(byte);
            if width + advance > max_width && !line.is_empty() {
                if byte == b' ' {
                    lines.push(std::mem::take(&mut line));
                    width = 0.0;
                    last_space = None;
                    continue;
                }
                match last_space.take() {
                    Some(at) => {
                        let rest = line.split_off(at + 1);
                        line.pop();
                        lines.push(std::mem::replace(&mut line, rest));
                        width = self.width(&line);
                        if width + advance > max_width {
                            lines.push(std::mem::take(&mut line));
                            width = 0.0;
                        }
                    }
                    None => {
                        lines.push(std::mem::take(&mut line));
                        width = 0.0;
                    }
                }
            }
            if byte == b' ' {
                last_space = Some(line.len());
            }
            line.push(byte);
            width += advance;
        }

        if !line.is_empty() || lines.is_empty() {
            lines.push(line);
        }
        lines
    }
}
