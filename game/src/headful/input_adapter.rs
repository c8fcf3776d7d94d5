use std::time::{Duration, Instant};

use engine::app::InputFrame;
use winit::event::VirtualKeyCode;

use crate::input::RawInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalDir {
    Left,
    Right,
}

impl HorizontalDir {
    fn from_key(key: VirtualKeyCode) -> Option<Self> {
        match key {
            VirtualKeyCode::Left => Some(HorizontalDir::Left),
            VirtualKeyCode::Right => Some(HorizontalDir::Right),
            _ => None,
        }
    }

    fn key(self) -> VirtualKeyCode {
        match self {
            HorizontalDir::Left => VirtualKeyCode::Left,
            HorizontalDir::Right => VirtualKeyCode::Right,
        }
    }
}

/// Timer-driven auto-repeat for held Left/Right, independent of OS key repeat.
#[derive(Debug, Default)]
pub struct HorizontalRepeat {
    left_down: bool,
    right_down: bool,
    active: Option<HorizontalDir>,
    next_repeat_at: Option<Instant>,
}

impl HorizontalRepeat {
    pub const REPEAT_DELAY: Duration = Duration::from_millis(170);
    pub const REPEAT_INTERVAL: Duration = Duration::from_millis(50);

    pub fn clear(&mut self) {
        self.left_down = false;
        self.right_down = false;
        self.active = None;
        self.next_repeat_at = None;
    }

    pub fn active(&self) -> Option<HorizontalDir> {
        self.active
    }

    pub fn on_press(&mut self, dir: HorizontalDir, now: Instant) -> bool {
        let was_down = match dir {
            HorizontalDir::Left => self.left_down,
            HorizontalDir::Right => self.right_down,
        };
        if was_down {
            return false;
        }

        match dir {
            HorizontalDir::Left => self.left_down = true,
            HorizontalDir::Right => self.right_down = true,
        }

        self.active = Some(dir);
        self.next_repeat_at = Some(now + Self::REPEAT_DELAY);
        true
    }

    pub fn on_release(&mut self, dir: HorizontalDir, now: Instant) {
        match dir {
            HorizontalDir::Left => self.left_down = false,
            HorizontalDir::Right => self.right_down = false,
        }

        if self.active != Some(dir) {
            return;
        }

        // Fall back to the other direction if it is still held.
        let new_active = match dir {
            HorizontalDir::Left if self.right_down => Some(HorizontalDir::Right),
            HorizontalDir::Right if self.left_down => Some(HorizontalDir::Left),
            _ => None,
        };

        self.active = new_active;
        self.next_repeat_at = new_active.map(|_| now + Self::REPEAT_DELAY);
    }

    pub fn next_repeat(&mut self, now: Instant) -> Option<HorizontalDir> {
        let dir = self.active?;
        let next_at = self.next_repeat_at?;
        if now < next_at {
            return None;
        }

        self.next_repeat_at = Some(now + Self::REPEAT_INTERVAL);
        Some(dir)
    }
}

/// Turns one frame of window input into raw inputs in arrival order.
///
/// With `repeat` set, held Left/Right also produce synthetic repeats.
pub fn collect_raw_inputs(
    frame: &InputFrame,
    repeat: Option<&mut HorizontalRepeat>,
    now: Instant,
) -> Vec<RawInput> {
    let mut out: Vec<RawInput> = frame.keys_pressed.iter().copied().map(RawInput::Key).collect();
    out.extend(frame.clicks.iter().map(|&(x, y)| RawInput::Click { x, y }));

    let Some(repeat) = repeat else {
        return out;
    };
    for dir in frame.keys_released.iter().copied().filter_map(HorizontalDir::from_key) {
        repeat.on_release(dir, now);
    }
    for dir in frame.keys_pressed.iter().copied().filter_map(HorizontalDir::from_key) {
        repeat.on_press(dir, now);
    }
    if let Some(dir) = repeat.next_repeat(now) {
        out.push(RawInput::Key(dir.key()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::event::ElementState;

    #[test]
    fn repeats_after_delay_then_at_interval() {
        let t0 = Instant::now();
        let mut repeat = HorizontalRepeat::default();
        assert!(repeat.on_press(HorizontalDir::Left, t0));
        assert!(!repeat.on_press(HorizontalDir::Left, t0));

        assert_eq!(repeat.next_repeat(t0 + Duration::from_millis(100)), None);
        let first = t0 + HorizontalRepeat::REPEAT_DELAY;
        assert_eq!(repeat.next_repeat(first), Some(HorizontalDir::Left));
        assert_eq!(repeat.next_repeat(first + Duration::from_millis(10)), None);
        assert_eq!(
            repeat.next_repeat(first + HorizontalRepeat::REPEAT_INTERVAL),
            Some(HorizontalDir::Left)
        );
    }

    #[test]
    fn releasing_active_direction_falls_back_to_other() {
        let t0 = Instant::now();
        let mut repeat = HorizontalRepeat::default();
        repeat.on_press(HorizontalDir::Left, t0);
        repeat.on_press(HorizontalDir::Right, t0);
        assert_eq!(repeat.active(), Some(HorizontalDir::Right));
        repeat.on_release(HorizontalDir::Right, t0);
        assert_eq!(repeat.active(), Some(HorizontalDir::Left));
        repeat.on_release(HorizontalDir::Left, t0);
        assert_eq!(repeat.active(), None);
    }

    #[test]
    fn collect_keeps_order_and_adds_clicks() {
        let mut frame = InputFrame::default();
        frame.on_key(VirtualKeyCode::Escape, ElementState::Pressed);
        frame.on_key(VirtualKeyCode::Down, ElementState::Pressed);
        frame.clicks.push((5, 6));

        let raw = collect_raw_inputs(&frame, None, Instant::now());
        assert_eq!(
            raw,
            vec![
                RawInput::Key(VirtualKeyCode::Escape),
                RawInput::Key(VirtualKeyCode::Down),
                RawInput::Click { x: 5, y: 6 },
            ]
        );
    }

    #[test]
    fn held_arrow_produces_synthetic_repeat() {
        let t0 = Instant::now();
        let mut repeat = HorizontalRepeat::default();
        let mut frame = InputFrame::default();
        frame.on_key(VirtualKeyCode::Right, ElementState::Pressed);
        let raw = collect_raw_inputs(&frame, Some(&mut repeat), t0);
        assert_eq!(raw, vec![RawInput::Key(VirtualKeyCode::Right)]);

        frame.end_frame();
        let later = t0 + HorizontalRepeat::REPEAT_DELAY;
        let raw = collect_raw_inputs(&frame, Some(&mut repeat), later);
        assert_eq!(raw, vec![RawInput::Key(VirtualKeyCode::Right)]);
    }
}
