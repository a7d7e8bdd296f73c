//! The stitch program: a linear command sequence plus its thread list.

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{StitchError, StitchResult};
use crate::geometry::Point;

/// One machine instruction in a stitch program.
///
/// Only needle motions carry a target position; color changes, trims and
/// the end marker are positionless.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub enum StitchCommand {
    /// Reposition the needle without laying thread.
    Move(Point),
    /// Lay thread from the current position to the target.
    Stitch(Point),
    /// Switch to the next thread in the pattern's thread list.
    ColorChange,
    /// Cut the working thread.
    Trim,
    /// Terminate the program.
    End,
}

/// Pattern-local thread identifier, assigned in first-use order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThreadId(usize);

impl ThreadId {
    /// Position of the thread in the pattern's thread list.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A declared thread: one palette color and its pattern-local id.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub id: ThreadId,
    pub color: Color,
}

/// An append-only stitch program.
///
/// Commands are only ever pushed at the back; nothing reorders or
/// removes them, so an assembled pattern is a faithful transcript of
/// the assembly walk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    commands: Vec<StitchCommand>,
    threads: Vec<Thread>,
}

impl Pattern {
    pub fn new() -> Pattern {
        Pattern::default()
    }

    /// Declare a thread for `color`, reusing the existing declaration on
    /// an exact color match.
    pub fn add_thread(&mut self, color: Color) -> ThreadId {
        if let Some(thread) = self.threads.iter().find(|t| t.color == color) {
            return thread.id;
        }
        let id = ThreadId(self.threads.len());
        self.threads.push(Thread { id, color });
        id
    }

    /// Jump to an absolute position without laying thread.
    pub fn move_abs(&mut self, x: f32, y: f32) {
        self.commands.push(StitchCommand::Move(Point::new(x, y)));
    }

    /// Stitch to an absolute position.
    pub fn stitch_abs(&mut self, x: f32, y: f32) {
        self.commands.push(StitchCommand::Stitch(Point::new(x, y)));
    }

    pub fn color_change(&mut self) {
        self.commands.push(StitchCommand::ColorChange);
    }

    pub fn trim(&mut self) {
        self.commands.push(StitchCommand::Trim);
    }

    pub fn end(&mut self) {
        self.commands.push(StitchCommand::End);
    }

    /// Append a prebuilt command fragment.
    pub fn extend(&mut self, commands: impl IntoIterator<Item = StitchCommand>) {
        self.commands.extend(commands);
    }

    pub fn commands(&self) -> &[StitchCommand] {
        &self.commands
    }

    pub fn threads(&self) -> &[Thread] {
        &self.threads
    }

    /// Number of thread-laying commands in the program.
    pub fn stitch_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, StitchCommand::Stitch(_)))
            .count()
    }

    /// Check the stitch-program invariant: the first command is never a
    /// stitch, and every stitch is preceded by at least one color change
    /// and at least one needle move.
    pub fn validate(&self) -> StitchResult<()> {
        let mut seen_color_change = false;
        let mut seen_move = false;
        for (idx, command) in self.commands.iter().enumerate() {
            match command {
                StitchCommand::ColorChange => seen_color_change = true,
                StitchCommand::Move(_) => seen_move = true,
                StitchCommand::Stitch(_) => {
                    if idx == 0 {
                        return Err(StitchError::MalformedCommand(
                            "stitch as the first command".to_string(),
                        ));
                    }
                    if !seen_color_change {
                        return Err(StitchError::MalformedCommand(format!(
                            "stitch at index {idx} with no prior color change"
                        )));
                    }
                    if !seen_move {
                        return Err(StitchError::MalformedCommand(format!(
                            "stitch at index {idx} with no prior move"
                        )));
                    }
                }
                StitchCommand::Trim | StitchCommand::End => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_thread_reuses_exact_color() {
        let mut pattern = Pattern::new();
        let red = pattern.add_thread(Color::new(255, 0, 0));
        let blue = pattern.add_thread(Color::new(0, 0, 255));
        let red_again = pattern.add_thread(Color::new(255, 0, 0));

        assert_eq!(red, red_again);
        assert_ne!(red, blue);
        assert_eq!(pattern.threads().len(), 2);
        assert_eq!(pattern.threads()[0].color, Color::new(255, 0, 0));
        assert_eq!(red.index(), 0);
        assert_eq!(blue.index(), 1);
    }

    #[test]
    fn test_validate_accepts_well_formed_program() {
        let mut pattern = Pattern::new();
        pattern.add_thread(Color::BLACK);
        pattern.color_change();
        pattern.move_abs(0.0, 0.0);
        pattern.stitch_abs(3.0, 0.0);
        pattern.trim();
        pattern.end();

        assert!(pattern.validate().is_ok());
        assert_eq!(pattern.stitch_count(), 1);
    }

    #[test]
    fn test_validate_rejects_stitch_first() {
        let mut pattern = Pattern::new();
        pattern.stitch_abs(1.0, 1.0);
        assert!(matches!(
            pattern.validate(),
            Err(StitchError::MalformedCommand(_))
        ));
    }

    #[test]
    fn test_validate_rejects_stitch_without_color_change() {
        let mut pattern = Pattern::new();
        pattern.move_abs(0.0, 0.0);
        pattern.stitch_abs(1.0, 0.0);
        assert!(matches!(
            pattern.validate(),
            Err(StitchError::MalformedCommand(_))
        ));
    }

    #[test]
    fn test_validate_rejects_stitch_without_move() {
        let mut pattern = Pattern::new();
        pattern.color_change();
        pattern.stitch_abs(1.0, 0.0);
        assert!(matches!(
            pattern.validate(),
            Err(StitchError::MalformedCommand(_))
        ));
    }

    #[test]
    fn test_empty_program_is_valid() {
        assert!(Pattern::new().validate().is_ok());
    }
}
