//! Stitch program assembly: pure per-color command fragments composed
//! into one linear pattern.

use crate::color::Color;
use crate::error::StitchResult;
use crate::fill::FillSegment;
use crate::geometry::Point;
use crate::pattern::{Pattern, StitchCommand};

/// The stitch commands for every surviving region of one palette color.
///
/// Fragments are built independently (one worker per color) and carry
/// no thread bookkeeping; [`assemble`] owns the color changes, trims and
/// thread declarations.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorFragment {
    pub color: Color,
    pub commands: Vec<StitchCommand>,
}

impl ColorFragment {
    pub fn new(color: Color) -> ColorFragment {
        ColorFragment {
            color,
            commands: Vec::new(),
        }
    }

    /// Append a running-stitch outline: jump to the first point, stitch
    /// through the rest, then close back to the start.
    pub fn push_outline(&mut self, path: &[Point]) {
        let Some(&first) = path.first() else {
            return;
        };
        self.commands.push(StitchCommand::Move(first));
        for &point in &path[1..] {
            self.commands.push(StitchCommand::Stitch(point));
        }
        self.commands.push(StitchCommand::Stitch(first));
    }

    /// Append fill spans: each span is a jump to its start followed by
    /// one stitch to its end.
    pub fn push_fill(&mut self, segments: &[FillSegment]) {
        for segment in segments {
            self.commands.push(StitchCommand::Move(segment.start));
            self.commands.push(StitchCommand::Stitch(segment.end));
        }
    }

    /// True when no region of this color survived to produce stitches.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Compose per-color fragments, in palette order, into one pattern.
///
/// Every fragment gets its thread declared, one color change in front of
/// its commands and one trim behind them. A fragment whose regions were
/// all skipped still gets the color change and trim, so the machine's
/// thread index stays in step with the thread list. A single end marker
/// closes the program, which is validated before being returned.
pub fn assemble(fragments: Vec<ColorFragment>) -> StitchResult<Pattern> {
    let mut pattern = Pattern::new();
    for fragment in fragments {
        pattern.add_thread(fragment.color);
        pattern.color_change();
        pattern.extend(fragment.commands);
        pattern.trim();
    }
    pattern.end();
    pattern.validate()?;
    Ok(pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(x0: f32, x1: f32, y: f32) -> FillSegment {
        FillSegment {
            start: Point::new(x0, y),
            end: Point::new(x1, y),
        }
    }

    #[test]
    fn test_assemble_orders_commands_per_color() {
        let mut red = ColorFragment::new(Color::new(255, 0, 0));
        red.push_fill(&[span(0.0, 3.0, 0.0), span(0.0, 3.0, 1.0)]);
        let mut blue = ColorFragment::new(Color::new(0, 0, 255));
        blue.push_fill(&[span(1.0, 2.0, 0.0)]);

        let pattern = assemble(vec![red, blue]).expect("well-formed program");

        let commands = pattern.commands();
        assert_eq!(commands[0], StitchCommand::ColorChange);
        assert_eq!(commands[1], StitchCommand::Move(Point::new(0.0, 0.0)));
        assert_eq!(commands[2], StitchCommand::Stitch(Point::new(3.0, 0.0)));
        assert_eq!(commands[5], StitchCommand::Trim);
        assert_eq!(commands[6], StitchCommand::ColorChange);
        assert_eq!(commands[9], StitchCommand::Trim);
        assert_eq!(commands[10], StitchCommand::End);
        assert_eq!(commands.len(), 11);

        assert_eq!(pattern.threads().len(), 2);
        assert_eq!(pattern.threads()[0].color, Color::new(255, 0, 0));
        assert_eq!(pattern.threads()[1].color, Color::new(0, 0, 255));
    }

    #[test]
    fn test_empty_fragment_still_changes_and_trims() {
        let empty = ColorFragment::new(Color::WHITE);
        assert!(empty.is_empty());

        let pattern = assemble(vec![empty]).expect("well-formed program");
        assert_eq!(
            pattern.commands(),
            &[
                StitchCommand::ColorChange,
                StitchCommand::Trim,
                StitchCommand::End,
            ]
        );
        assert_eq!(pattern.threads().len(), 1);
    }

    #[test]
    fn test_outline_closes_back_to_start() {
        let mut fragment = ColorFragment::new(Color::BLACK);
        fragment.push_outline(&[
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
        ]);

        assert_eq!(
            fragment.commands,
            vec![
                StitchCommand::Move(Point::new(0.0, 0.0)),
                StitchCommand::Stitch(Point::new(10.0, 0.0)),
                StitchCommand::Stitch(Point::new(10.0, 10.0)),
                StitchCommand::Stitch(Point::new(0.0, 0.0)),
            ]
        );
    }

    #[test]
    fn test_repeated_color_reuses_thread() {
        let first = ColorFragment::new(Color::BLACK);
        let second = ColorFragment::new(Color::BLACK);

        let pattern = assemble(vec![first, second]).expect("well-formed program");
        assert_eq!(pattern.threads().len(), 1);
        // Two color changes still happen; the machine steps through them.
        let changes = pattern
            .commands()
            .iter()
            .filter(|c| matches!(c, StitchCommand::ColorChange))
            .count();
        assert_eq!(changes, 2);
    }

    #[test]
    fn test_assembled_pattern_upholds_invariant() {
        let mut fragment = ColorFragment::new(Color::BLACK);
        fragment.push_fill(&[span(0.0, 1.0, 0.0)]);
        let pattern = assemble(vec![fragment]).expect("well-formed program");
        assert!(pattern.validate().is_ok());
    }
}
