//! Simulated touch hardware

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::info;
use std::collections::VecDeque;
use std::convert::TryFrom;

use hw_if::{
    eqpt::HardwareIo,
    touch::{TouchPattern, TouchPatternError},
};
use util::{
    script_interpreter::{PendingTouches, ScriptInterpreter},
    session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Touch hardware fed from a queue of raw gesture codes.
///
/// Each poll moves at most one queued code into the detector, mimicking a sensor which reports
/// one gesture at a time. Raw codes are only validated when decoded, so out of range codes can
/// be injected.
#[derive(Debug, Default)]
pub struct TouchQueue {
    queued: VecDeque<u8>,
    detected: Option<u8>,
    num_polls: u64,
}

/// Touch hardware driven by a timed touch script.
///
/// Touches are released at the session time given in the script.
#[derive(Debug)]
pub struct ScriptedTouchIo {
    interpreter: ScriptInterpreter,
    queue: TouchQueue,
    end_of_script: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TouchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw gesture code.
    pub fn push(&mut self, code: u8) {
        self.queued.push_back(code);
    }

    /// Queue several raw gesture codes in order.
    pub fn extend<I: IntoIterator<Item = u8>>(&mut self, codes: I) {
        self.queued.extend(codes);
    }

    /// Number of gestures not yet consumed, including a detected one.
    pub fn pending(&self) -> usize {
        self.queued.len() + self.detected.map_or(0, |_| 1)
    }

    pub fn num_polls(&self) -> u64 {
        self.num_polls
    }
}

impl HardwareIo for TouchQueue {
    fn poll_touch(&mut self) {
        self.num_polls += 1;

        if self.detected.is_none() {
            self.detected = self.queued.pop_front();
        }
    }

    fn touch_detected(&self) -> bool {
        self.detected.is_some()
    }

    fn decode_touch_pattern(&mut self, consume: bool) -> Result<TouchPattern, TouchPatternError> {
        let code = match consume {
            true => self.detected.take(),
            false => self.detected,
        };

        match code {
            Some(c) => TouchPattern::try_from(c),
            None => Err(TouchPatternError::InvalidFormat("no touch detected".into())),
        }
    }
}

impl ScriptedTouchIo {
    pub fn new(interpreter: ScriptInterpreter) -> Self {
        Self {
            interpreter,
            queue: TouchQueue::new(),
            end_of_script: false,
        }
    }

    /// True once every scripted touch has been released and consumed.
    pub fn end_of_script(&self) -> bool {
        self.end_of_script && self.queue.pending() == 0
    }

    /// Release the touches due at `current_time_s` and poll the detector.
    pub fn poll_touch_at(&mut self, current_time_s: f64) {
        match self.interpreter.get_pending_touches_at(current_time_s) {
            PendingTouches::None => (),
            PendingTouches::Some(touches) => {
                self.queue.extend(touches.iter().map(|t| t.code()));
            }
            PendingTouches::EndOfScript => {
                if !self.end_of_script {
                    info!("End of touch script reached");
                    self.end_of_script = true;
                }
            }
        }

        self.queue.poll_touch();
    }
}

impl HardwareIo for ScriptedTouchIo {
    fn poll_touch(&mut self) {
        self.poll_touch_at(session::get_elapsed_seconds());
    }

    fn touch_detected(&self) -> bool {
        self.queue.touch_detected()
    }

    fn decode_touch_pattern(&mut self, consume: bool) -> Result<TouchPattern, TouchPatternError> {
        self.queue.decode_touch_pattern(consume)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_queue_reports_one_gesture_at_a_time() {
        let mut q = TouchQueue::new();
        q.extend(vec![5, 4]);

        q.poll_touch();
        q.poll_touch();
        assert!(q.touch_detected());
        assert_eq!(q.decode_touch_pattern(false).map(|t| t.code()), Ok(5));
        assert_eq!(q.decode_touch_pattern(true).map(|t| t.code()), Ok(5));
        assert!(!q.touch_detected());

        q.poll_touch();
        assert_eq!(q.decode_touch_pattern(true).map(|t| t.code()), Ok(4));
        assert_eq!(q.pending(), 0);
    }

    #[test]
    fn test_queue_invalid_code() {
        let mut q = TouchQueue::new();
        q.push(9);
        q.poll_touch();

        assert_eq!(
            q.decode_touch_pattern(true),
            Err(TouchPatternError::OutOfRange(9))
        );
        assert!(!q.touch_detected());
    }

    #[test]
    fn test_scripted_touches_released_on_time() {
        let si = ScriptInterpreter::from_script("0.5: 5;\n1.0: 2;\n").unwrap();
        let mut io = ScriptedTouchIo::new(si);

        io.poll_touch_at(0.1);
        assert!(!io.touch_detected());

        io.poll_touch_at(0.6);
        assert_eq!(io.decode_touch_pattern(true).map(|t| t.code()), Ok(5));

        io.poll_touch_at(1.2);
        assert_eq!(io.decode_touch_pattern(true).map(|t| t.code()), Ok(2));
        assert!(!io.end_of_script());

        io.poll_touch_at(1.3);
        assert!(io.end_of_script());
    }
}
