/// Terminal front end: input handling and the interactive render loop
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal,
};
use objview_core::{Camera, Scene};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod renderer;

pub use renderer::AsciiRenderer;

/// Key bindings and navigation speeds.
///
/// Distances and angles are scaled by the frame time, so holding a key
/// moves at `move_speed` world units (or `rotate_speed` degrees) per
/// second regardless of frame rate.
pub struct Controls {
    pub move_speed: f32,
    pub rotate_speed: f32,
}

impl Controls {
    pub fn new() -> Self {
        Self {
            move_speed: 5.0,
            rotate_speed: 90.0,
        }
    }

    /// Apply one frame's worth of drained key events. Terminal
    /// auto-repeat can queue the same key several times within a frame;
    /// repeats are collapsed so each held key advances by one step.
    pub fn apply_all(&self, codes: &[KeyCode], delta_time: f32, camera: &mut Camera) {
        let mut seen: Vec<KeyCode> = Vec::new();
        for &code in codes {
            if seen.contains(&code) {
                continue;
            }
            seen.push(code);
            self.apply(code, delta_time, camera);
        }
    }

    /// Apply one key press to the camera
    pub fn apply(&self, code: KeyCode, delta_time: f32, camera: &mut Camera) {
        let distance = self.move_speed * delta_time;
        let angle = self.rotate_speed * delta_time;
        match code {
            KeyCode::Char('w') => camera.move_forward(distance),
            KeyCode::Char('s') => camera.move_forward(-distance),
            KeyCode::Char('a') => camera.move_right(-distance),
            KeyCode::Char('d') => camera.move_right(distance),
            KeyCode::Char('e') => camera.move_up(distance),
            KeyCode::Char('q') => camera.move_up(-distance),
            KeyCode::Left | KeyCode::Char('j') => camera.rotate_yaw(-angle),
            KeyCode::Right | KeyCode::Char('l') => camera.rotate_yaw(angle),
            KeyCode::Up | KeyCode::Char('i') => camera.rotate_pitch(angle),
            KeyCode::Down | KeyCode::Char('k') => camera.rotate_pitch(-angle),
            _ => {}
        }
    }
}

impl Default for Controls {
    fn default() -> Self {
        Self::new()
    }
}

/// Main application struct for the interactive terminal viewer
pub struct TerminalApp {
    scene: Scene,
    controls: Controls,
    renderer: AsciiRenderer,
    running: bool,
    last_tick: Instant,
    fps_window: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(scene: Scene) -> io::Result<Self> {
        let (width, height) = terminal::size()?;

        Ok(Self {
            scene,
            controls: Controls::new(),
            renderer: AsciiRenderer::new(width as usize, height as usize),
            running: true,
            last_tick: Instant::now(),
            fps_window: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn controls_mut(&mut self) -> &mut Controls {
        &mut self.controls
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target
        self.last_tick = Instant::now();

        while self.running {
            let frame_start = Instant::now();
            let delta_time = (frame_start - self.last_tick).as_secs_f32();
            self.last_tick = frame_start;

            self.handle_input(delta_time)?;
            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.fps_window).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.fps_window).as_secs_f32();
                self.frame_count = 0;
                self.fps_window = now;
            }
        }

        Ok(())
    }

    fn handle_input(&mut self, delta_time: f32) -> io::Result<()> {
        // drain everything queued since the last frame
        let mut pressed: Vec<KeyCode> = Vec::new();
        while event::poll(Duration::from_millis(0))? {
            if let Event::Key(KeyEvent { code, .. }) = event::read()? {
                match code {
                    KeyCode::Esc => self.running = false,
                    code => pressed.push(code),
                }
            }
        }
        self.controls
            .apply_all(&pressed, delta_time, self.scene.camera_mut());
        Ok(())
    }

    fn render(&mut self) -> io::Result<()> {
        self.renderer.clear();
        self.renderer.render_scene(&self.scene);

        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;
        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "objview | FPS: {:.1} | WASD move  E/Q up/down  arrows or IJKL look  Esc quit",
                self.fps
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    #[test]
    fn test_move_scales_with_frame_time() {
        let mut camera = Camera::new(80, 24);
        let controls = Controls::new();
        let before = camera.position();
        controls.apply(KeyCode::Char('w'), 0.5, &mut camera);
        // forward is -z at the default orientation, half a second at 5 u/s
        let moved = camera.position() - before;
        assert!((moved - Vector3::new(0.0, 0.0, -2.5)).norm() < 1e-5);
    }

    #[test]
    fn test_strafe_direction() {
        let mut camera = Camera::new(80, 24);
        let controls = Controls::new();
        let before = camera.position();
        controls.apply(KeyCode::Char('d'), 0.2, &mut camera);
        let moved = camera.position() - before;
        assert!((moved - Vector3::new(1.0, 0.0, 0.0)).norm() < 1e-5);
    }

    #[test]
    fn test_rotation_scales_with_frame_time() {
        let mut camera = Camera::new(80, 24);
        let controls = Controls::new();
        controls.apply(KeyCode::Up, 0.5, &mut camera);
        // 45 degrees of pitch after half a second at 90 deg/s
        let forward = camera.target() - camera.position();
        let elevation = (forward.y / forward.norm()).asin().to_degrees();
        assert!((elevation - 45.0).abs() < 1e-3);
    }

    #[test]
    fn test_repeated_key_applies_once_per_frame() {
        let mut camera = Camera::new(80, 24);
        let controls = Controls::new();
        let before = camera.position();
        // auto-repeat queued 'w' three times alongside a single 'd'
        let keys = [
            KeyCode::Char('w'),
            KeyCode::Char('w'),
            KeyCode::Char('w'),
            KeyCode::Char('d'),
        ];
        controls.apply_all(&keys, 0.5, &mut camera);
        let moved = camera.position() - before;
        assert!((moved - Vector3::new(2.5, 0.0, -2.5)).norm() < 1e-5);
    }

    #[test]
    fn test_unbound_keys_do_nothing() {
        let mut camera = Camera::new(80, 24);
        let controls = Controls::new();
        let position = camera.position();
        let target = camera.target();
        controls.apply(KeyCode::Char('z'), 1.0, &mut camera);
        controls.apply(KeyCode::Tab, 1.0, &mut camera);
        assert_eq!(camera.position(), position);
        assert_eq!(camera.target(), target);
    }
}
