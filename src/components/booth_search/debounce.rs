/// Reports a search term only once typing has settled on it.
///
/// Every keystroke gets a ticket; when its timer fires the term is due only
/// if no later keystroke happened in the meantime.
#[derive(Clone, Debug, Default)]
pub struct SearchDebouncer {
	generation: u64,
	min_len: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ticket {
	generation: u64,
	term: String,
}

impl SearchDebouncer {
	pub fn new(min_len: usize) -> Self {
		Self {
			generation: 0,
			min_len,
		}
	}

	/// Records a keystroke. Returns a ticket to redeem after the delay, or
	/// `None` when the term is too short to be worth reporting.
	pub fn input(&mut self, term: &str) -> Option<Ticket> {
		self.generation += 1;
		(term.chars().count() >= self.min_len).then(|| Ticket {
			generation: self.generation,
			term: term.to_string(),
		})
	}

	pub fn settle(&self, ticket: Ticket) -> Option<String> {
		(ticket.generation == self.generation).then_some(ticket.term)
	}
}
