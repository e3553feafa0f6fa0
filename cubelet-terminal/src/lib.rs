//! Terminal front end: ANSI rasterizer, frame loop and mouse picking
use anyhow::{bail, Context};
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use cubelet_core::{Axis, Frustum, Phase, Session, SessionConfig, Viewport};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod renderer;

pub use renderer::AsciiRenderer;

/// Terminal cells are roughly twice as tall as they are wide
const CELL_ASPECT: f64 = 2.0;

/// Camera turn per key press, degrees
const ORBIT_STEP: f64 = 5.0;

const USAGE: &str = "usage: cubelet-terminal [--scramble] [--frames <n>]";

/// Build a session configuration from command-line arguments
pub fn parse_args<I>(args: I) -> anyhow::Result<SessionConfig>
where
    I: IntoIterator<Item = String>,
{
    let mut config = SessionConfig::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--scramble" => config.autoplay = true,
            "--frames" => {
                let value = args.next().context("--frames needs a value")?;
                config.turn_frames = value
                    .parse()
                    .with_context(|| format!("invalid frame count {value:?}"))?;
            }
            other => bail!("unknown argument {other:?}\n{USAGE}"),
        }
    }
    Ok(config)
}

/// Shape the frustum to a terminal of `columns` x `rows` cells
pub fn fit_to_terminal(config: SessionConfig, columns: u16, rows: u16) -> SessionConfig {
    let aspect = f64::from(columns.max(1)) / (f64::from(rows.max(1)) * CELL_ASPECT);
    let frustum = Frustum {
        top: config.frustum.right / aspect,
        ..config.frustum
    };
    SessionConfig { frustum, ..config }
}

/// Main application struct for the terminal cube
pub struct TerminalApp {
    session: Session,
    renderer: AsciiRenderer,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(config: SessionConfig) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        let config = fit_to_terminal(config, width, height);
        let viewport = Viewport::new(f64::from(width), f64::from(height));

        Ok(Self {
            session: Session::new(config, viewport),
            renderer: AsciiRenderer::new(width as usize, height as usize),
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            cursor::Hide,
            EnableMouseCapture
        )?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(
            stdout(),
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show
        )?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            // Drain pending input
            while event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?);
            }

            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press,
                ..
            }) => self.handle_key(code),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(width, height) => {
                self.renderer.resize(width as usize, height as usize);
                self.session
                    .set_viewport(Viewport::new(f64::from(width), f64::from(height)));
                log::debug!("resized to {}x{}", width, height);
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.running = false;
            }
            KeyCode::Char('w') | KeyCode::Up => {
                self.session.orbit(-ORBIT_STEP, Axis::X);
            }
            KeyCode::Char('s') | KeyCode::Down => {
                self.session.orbit(ORBIT_STEP, Axis::X);
            }
            KeyCode::Char('a') | KeyCode::Left => {
                self.session.orbit(-ORBIT_STEP, Axis::Y);
            }
            KeyCode::Char('d') | KeyCode::Right => {
                self.session.orbit(ORBIT_STEP, Axis::Y);
            }
            KeyCode::Char(' ') => {
                let enabled = !self.session.autoplay();
                self.session.set_autoplay(enabled);
            }
            KeyCode::Char('r') => {
                if let Err(err) = self.session.reset() {
                    log::warn!("reset refused: {}", err);
                }
            }
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        // Pick through the centre of the cell
        let px = f64::from(mouse.column) + 0.5;
        let py = f64::from(mouse.row) + 0.5;
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.session.press(px, py),
            MouseEventKind::Up(MouseButton::Left) => {
                if let Err(err) = self.session.release(px, py) {
                    log::error!("pick failed: {}", err);
                }
            }
            _ => {}
        }
    }

    fn render(&mut self) -> io::Result<()> {
        self.renderer.clear();
        let phase = self.session.tick(&mut self.renderer);

        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;
        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(status_line(self.fps, phase, self.session.autoplay())),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

fn status_line(fps: f32, phase: Phase, autoplay: bool) -> String {
    let state = match phase {
        Phase::Idle => "idle".to_string(),
        Phase::Animating { mv, .. } => format!("turning {}", mv),
    };
    format!(
        "Cubelet | FPS: {:.1} | {} | autoplay {} | Drag=Turn WASD/Arrows=Orbit Space=Autoplay R=Reset Q=Quit",
        fps,
        state,
        if autoplay { "on" } else { "off" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubelet_core::Move;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args_defaults() {
        let config = parse_args(args(&[])).unwrap();
        assert_eq!(config, SessionConfig::default());
    }

    #[test]
    fn test_parse_args_flags() {
        let config = parse_args(args(&["--scramble", "--frames", "30"])).unwrap();
        assert!(config.autoplay);
        assert_eq!(config.turn_frames, 30);
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(parse_args(args(&["--frames"])).is_err());
        assert!(parse_args(args(&["--frames", "many"])).is_err());
        assert!(parse_args(args(&["--bogus"])).is_err());
    }

    #[test]
    fn test_fit_to_terminal() {
        // 80x30 cells is 80:60 in square units, the default 4:3 frustum
        let config = fit_to_terminal(SessionConfig::default(), 80, 30);
        assert!((config.frustum.top - 0.75).abs() < 1e-12);

        let wide = fit_to_terminal(SessionConfig::default(), 160, 30);
        assert!((wide.frustum.top - 0.375).abs() < 1e-12);
        assert_eq!(wide.frustum.near, 5.0);
    }

    #[test]
    fn test_status_line() {
        let line = status_line(29.5, Phase::Idle, false);
        assert!(line.contains("FPS: 29.5"));
        assert!(line.contains("idle"));

        let turning = Phase::Animating {
            mv: Move::new(Axis::X, 1, true),
            frames_left: 10,
        };
        assert!(status_line(30.0, turning, true).contains("turning X[+1] ccw"));
    }
}
