// Copyright (c) 2026 rezky_nightky

use std::io::{stdout, Result, Stdout, Write};
use std::time::Duration;

use crossterm::{
    cursor, event,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal, ExecutableCommand, QueueableCommand,
};

use crate::cell::Cell;
use crate::frame::Frame;

/// Foreground, background and weight currently set on the terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Pen {
    fg: Option<Color>,
    bg: Option<Color>,
    bold: bool,
}

impl Pen {
    fn of(cell: &Cell) -> Self {
        Self {
            fg: cell.fg,
            bg: cell.bg,
            bold: cell.bold,
        }
    }
}

/// What is on screen right now, so unchanged cells are never re-sent.
struct Shown {
    width: u16,
    height: u16,
    cells: Vec<Option<Cell>>,
}

pub struct Terminal {
    stdout: Stdout,
    shown: Option<Shown>,
    run_buf: String,
    order: Vec<usize>,
}

fn leave(out: &mut Stdout) {
    let _ = out.execute(event::DisableFocusChange);
    let _ = out.execute(event::DisableMouseCapture);
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}

impl Terminal {
    pub fn new() -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init_res: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            out.execute(event::EnableMouseCapture)?;
            // not every terminal reports focus; losing it only costs the leave signal
            let _ = out.execute(event::EnableFocusChange);
            out.execute(SetAttribute(Attribute::Reset))?;
            out.execute(ResetColor)?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()?;
            Ok(())
        })();
        if let Err(e) = init_res {
            leave(&mut out);
            return Err(e);
        }
        Ok(Self {
            stdout: out,
            shown: None,
            run_buf: String::with_capacity(64),
            order: Vec::new(),
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

    /// Window size in pixels as the terminal reports it; `(0, 0)` when it
    /// does not.
    pub fn pixel_size(&self) -> (u16, u16) {
        terminal::window_size()
            .map(|w| (w.width, w.height))
            .unwrap_or((0, 0))
    }

    pub fn poll_event(timeout: Duration) -> Result<bool> {
        event::poll(timeout)
    }

    pub fn read_event() -> Result<event::Event> {
        event::read()
    }

    fn queue_pen(&mut self, pen: Pen, cur: &mut Option<Pen>) -> Result<()> {
        let prev = *cur;
        if prev.map(|p| p.fg) != Some(pen.fg) {
            self.stdout
                .queue(SetForegroundColor(pen.fg.unwrap_or(Color::Reset)))?;
        }
        if prev.map(|p| p.bg) != Some(pen.bg) {
            self.stdout
                .queue(SetBackgroundColor(pen.bg.unwrap_or(Color::Reset)))?;
        }
        if prev.map(|p| p.bold) != Some(pen.bold) {
            self.stdout.queue(SetAttribute(if pen.bold {
                Attribute::Bold
            } else {
                Attribute::NormalIntensity
            }))?;
        }
        *cur = Some(pen);
        Ok(())
    }

    /// Sends every changed cell of `frame`, batching horizontal runs that share
    /// a pen into a single print.
    pub fn draw(&mut self, frame: &mut Frame) -> Result<()> {
        let resized = self
            .shown
            .as_ref()
            .map_or(true, |s| s.width != frame.width || s.height != frame.height);
        if resized {
            self.stdout
                .queue(terminal::Clear(terminal::ClearType::All))?;
            self.shown = Some(Shown {
                width: frame.width,
                height: frame.height,
                cells: vec![None; frame.width as usize * frame.height as usize],
            });
        }

        let total = frame.width as usize * frame.height as usize;
        self.order.clear();
        if resized || frame.is_dirty_all() || frame.dirty_indices().len() >= total / 3 {
            self.order.extend(0..total);
        } else {
            self.order.extend_from_slice(frame.dirty_indices());
            self.order.sort_unstable();
            self.order.dedup();
        }

        let width = frame.width as usize;
        let mut pen: Option<Pen> = None;
        let mut cursor_at: Option<usize> = None;
        let mut i = 0usize;
        let order = std::mem::take(&mut self.order);

        while i < order.len() {
            let start = order[i];
            let cell = frame.cell_at_index(start);
            let Some(shown) = self.shown.as_mut() else {
                break;
            };
            if shown.cells[start] == Some(cell) {
                i += 1;
                continue;
            }
            shown.cells[start] = Some(cell);

            let run_pen = Pen::of(&cell);
            self.run_buf.clear();
            self.run_buf.push(cell.ch);
            let mut end = start;
            let mut j = i + 1;
            while j < order.len() {
                let next = order[j];
                if next != end + 1 || next % width == 0 {
                    break;
                }
                let c = frame.cell_at_index(next);
                if shown.cells[next] == Some(c) || Pen::of(&c) != run_pen {
                    break;
                }
                shown.cells[next] = Some(c);
                self.run_buf.push(c.ch);
                end = next;
                j += 1;
            }

            if cursor_at != Some(start) {
                self.stdout
                    .queue(cursor::MoveTo((start % width) as u16, (start / width) as u16))?;
            }
            self.queue_pen(run_pen, &mut pen)?;
            self.stdout.queue(Print(self.run_buf.as_str()))?;
            cursor_at = if (end + 1) % width == 0 {
                None
            } else {
                Some(end + 1)
            };
            i = j;
        }
        self.order = order;

        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(ResetColor)?;
        self.stdout.flush()?;
        frame.clear_dirty();
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        leave(&mut self.stdout);
    }
}

pub fn restore_terminal_best_effort() {
    leave(&mut stdout());
}
