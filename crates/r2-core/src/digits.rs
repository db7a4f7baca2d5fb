/// A fixed-capacity digit buffer for ANI/DNIS collection.
///
/// Mirrors the original `ftdm_r2_call_t` ANI/DNIS index fields: digits are
/// appended one at a time as the PE reports them, and the buffer refuses
/// to grow past its configured capacity.
#[derive(Debug, Clone, Default)]
pub struct DigitBuffer {
    digits: String,
    max_len: usize,
}

impl DigitBuffer {
    pub fn new(max_len: usize) -> Self {
        Self { digits: String::new(), max_len }
    }

    /// Appends one digit. Returns `false` if the buffer was already full
    /// and the digit was dropped.
    pub fn push(&mut self, digit: char) -> bool {
        if self.is_full() {
            return false;
        }
        self.digits.push(digit);
        true
    }

    /// True once the buffer holds `max_len` digits. The event translator
    /// checks this right after a successful `push` to decide whether to
    /// tell the PE to stop requesting more digits.
    pub fn is_full(&self) -> bool {
        self.digits.len() >= self.max_len
    }

    pub fn as_str(&self) -> &str {
        &self.digits
    }

    pub fn clear(&mut self) {
        self.digits.clear();
    }
}
