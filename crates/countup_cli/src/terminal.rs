//! Terminal output and the real-time frame loop

use anyhow::Result;
use countup_core::{DisplayTarget, ManualFrameClock, TextBuffer};
use std::io::Write;
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

/// A block of labelled lines redrawn in place
#[derive(Default)]
pub struct TerminalDisplay {
    lines: Vec<(String, Rc<TextBuffer>)>,
    /// Text drawn on the previous frame, per line
    drawn: Option<Vec<String>>,
}

impl TerminalDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a line and return the buffer its counter renders into
    pub fn add_line(&mut self, label: &str, initial_text: &str) -> Rc<TextBuffer> {
        let buffer = Rc::new(TextBuffer::with_text(initial_text));
        self.lines.push((label.to_string(), buffer.clone()));
        buffer
    }

    /// Redraw every line if any text changed since the last draw
    ///
    /// Returns whether anything was written.
    pub fn draw(&mut self, out: &mut impl Write) -> std::io::Result<bool> {
        let current: Vec<String> = self.lines.iter().map(|(_, buffer)| buffer.text()).collect();
        if self.drawn.as_ref() == Some(&current) {
            return Ok(false);
        }

        let width = self
            .lines
            .iter()
            .map(|(label, _)| label.chars().count())
            .max()
            .unwrap_or(0);

        if self.drawn.is_some() && !self.lines.is_empty() {
            // Move back to the first line of the block
            write!(out, "\x1b[{}A", self.lines.len())?;
        }
        for ((label, _), text) in self.lines.iter().zip(&current) {
            if label.is_empty() {
                writeln!(out, "\x1b[2K{}", text)?;
            } else {
                writeln!(out, "\x1b[2K{:>width$}  {}", label, text, width = width)?;
            }
        }
        out.flush()?;

        self.drawn = Some(current);
        Ok(true)
    }
}

/// Drive `clock` in real time until it is idle
///
/// Each iteration ticks the clock with the milliseconds elapsed since the
/// loop began, then calls `on_frame` with that timestamp. `on_frame` returns
/// whether the host still has work even when no frame is pending (a paused
/// counter waiting to resume). Returns the number of frames delivered.
pub fn run_frame_loop<F>(clock: &ManualFrameClock, fps: u32, mut on_frame: F) -> Result<usize>
where
    F: FnMut(f64) -> Result<bool>,
{
    let frame_duration = Duration::from_micros(1_000_000 / u64::from(fps.max(1)));
    let origin = Instant::now();
    let mut frames = 0;

    loop {
        let start = Instant::now();
        let now_ms = origin.elapsed().as_secs_f64() * 1000.0;

        frames += clock.tick(now_ms).min(1);
        let busy = on_frame(now_ms)?;

        if !busy && !clock.has_pending() {
            break;
        }

        // Sleep for remaining frame time
        let elapsed = start.elapsed();
        if elapsed < frame_duration {
            thread::sleep(frame_duration - elapsed);
        }
    }

    tracing::debug!(
        "Frame loop finished after {} frames ({:.0}ms)",
        frames,
        origin.elapsed().as_secs_f64() * 1000.0
    );
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use countup_core::FrameClock;
    use std::cell::Cell;

    #[test]
    fn test_draw_writes_only_on_change() {
        let mut display = TerminalDisplay::new();
        let a = display.add_line("Users", "0");
        display.add_line("Stars", "0");

        let mut out = Vec::new();
        assert!(display.draw(&mut out).unwrap());
        let first = String::from_utf8(out.clone()).unwrap();
        assert!(first.contains("Users  0\n"));
        assert!(!first.contains("\x1b[2A"));

        assert!(!display.draw(&mut out).unwrap());

        a.set_text("1,000");
        out.clear();
        assert!(display.draw(&mut out).unwrap());
        let second = String::from_utf8(out).unwrap();
        assert!(second.starts_with("\x1b[2A"));
        assert!(second.contains("Users  1,000\n"));
    }

    #[test]
    fn test_frame_loop_runs_until_idle() {
        let clock = ManualFrameClock::new();
        let remaining = Rc::new(Cell::new(3));

        fn schedule(clock: &ManualFrameClock, remaining: Rc<Cell<u32>>) {
            clock.request_frame(Box::new(move |_| remaining.set(remaining.get() - 1)));
        }

        schedule(&clock, remaining.clone());
        let frames = run_frame_loop(&clock, 1000, |_| {
            if remaining.get() > 0 && !clock.has_pending() {
                schedule(&clock, remaining.clone());
            }
            Ok(false)
        })
        .unwrap();

        assert_eq!(frames, 3);
        assert_eq!(remaining.get(), 0);
    }

    #[test]
    fn test_frame_loop_stops_on_error() {
        let clock = ManualFrameClock::new();
        let result = run_frame_loop(&clock, 1000, |_| anyhow::bail!("display closed"));
        assert!(result.is_err());
    }
}
