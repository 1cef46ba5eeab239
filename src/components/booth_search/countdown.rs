/// Optional auto-reset after a completed selection.
///
/// Armed the moment both slots resolve, re-armed by any newer resolution,
/// and fires once when it reaches zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Countdown {
	seed: u32,
	remaining: Option<u32>,
}

impl Countdown {
	pub fn new(seed: u32) -> Self {
		Self {
			seed,
			remaining: None,
		}
	}

	pub fn start(&mut self) {
		self.remaining = Some(self.seed);
	}

	pub fn cancel(&mut self) {
		self.remaining = None;
	}

	pub fn remaining(&self) -> Option<u32> {
		self.remaining
	}

	/// Advances one unit; true exactly when the countdown expires.
	pub fn tick(&mut self) -> bool {
		match self.remaining {
			Some(n) if n <= 1 => {
				self.remaining = None;
				true
			}
			Some(n) => {
				self.remaining = Some(n - 1);
				false
			}
			None => false,
		}
	}
}
