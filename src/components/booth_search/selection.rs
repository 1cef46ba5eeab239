//! Two-slot origin/destination selection.
//!
//! Each slot is empty, typing (a term with no resolved booth) or resolved.
//! `active` points at the slot that list clicks and typed terms apply to.
//! The resolved identifier of a booth is its canonical label.

use crate::components::floor_plan::Booth;

pub const ALL_CATEGORIES: &str = "all";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Slot {
	#[default]
	Origin,
	Destination,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SlotState {
	pub term: String,
	pub resolved: Option<String>,
}

impl SlotState {
	fn clear(&mut self) {
		self.term.clear();
		self.resolved = None;
	}
}

/// What a transition did to the resolved pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Change {
	/// A slot lost its resolution.
	pub unresolved: bool,
	/// A slot gained or switched its resolution.
	pub resolved: bool,
}

impl Change {
	pub fn any(&self) -> bool {
		self.unresolved || self.resolved
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectionState {
	pub active: Slot,
	pub origin: SlotState,
	pub destination: SlotState,
	pub category: String,
}

impl Default for SelectionState {
	fn default() -> Self {
		Self {
			active: Slot::Origin,
			origin: SlotState::default(),
			destination: SlotState::default(),
			category: ALL_CATEGORIES.into(),
		}
	}
}

impl SelectionState {
	/// Session start, optionally seeded from `?from=&to=`.
	pub fn seeded(from: Option<String>, to: Option<String>) -> Self {
		let mut state = Self::default();
		state.apply_resolved(from, to);
		state
	}

	pub fn slot(&self, slot: Slot) -> &SlotState {
		match slot {
			Slot::Origin => &self.origin,
			Slot::Destination => &self.destination,
		}
	}

	fn slot_mut(&mut self, slot: Slot) -> &mut SlotState {
		match slot {
			Slot::Origin => &mut self.origin,
			Slot::Destination => &mut self.destination,
		}
	}

	pub fn active_term(&self) -> &str {
		&self.slot(self.active).term
	}

	pub fn focus(&mut self, slot: Slot) {
		self.active = slot;
	}

	/// Typing never resolves; emptying the box drops the resolution.
	pub fn type_term(&mut self, slot: Slot, term: &str) -> Change {
		let state = self.slot_mut(slot);
		state.term = term.to_string();
		if term.is_empty() && state.resolved.take().is_some() {
			return Change {
				unresolved: true,
				resolved: false,
			};
		}
		Change::default()
	}

	/// A click in the result list resolves the active slot.
	pub fn select(&mut self, label: &str) -> Change {
		self.select_for(self.active, label)
	}

	pub fn select_for(&mut self, slot: Slot, label: &str) -> Change {
		let state = self.slot_mut(slot);
		state.term = label.to_string();
		if state.resolved.as_deref() == Some(label) {
			return Change::default();
		}
		state.resolved = Some(label.to_string());
		Change {
			unresolved: false,
			resolved: true,
		}
	}

	pub fn set_category(&mut self, category: &str) {
		self.category = category.to_string();
	}

	pub fn reset(&mut self) -> Change {
		let had = self.origin.resolved.is_some() || self.destination.resolved.is_some();
		self.origin.clear();
		self.destination.clear();
		self.active = Slot::Origin;
		Change {
			unresolved: had,
			resolved: false,
		}
	}

	/// Drops the destination resolution but keeps its term, so the user can re-pick.
	pub fn clear_destination_resolution(&mut self) -> Change {
		Change {
			unresolved: self.destination.resolved.take().is_some(),
			resolved: false,
		}
	}

	/// Mirrors an externally supplied pair (URL seed or history navigation).
	pub fn apply_resolved(&mut self, from: Option<String>, to: Option<String>) -> Change {
		let mut change = Change::default();
		for (slot, value) in [(Slot::Origin, from), (Slot::Destination, to)] {
			let state = self.slot_mut(slot);
			if state.resolved == value {
				continue;
			}
			match value {
				Some(label) => {
					state.term = label.clone();
					state.resolved = Some(label);
					change.resolved = true;
				}
				None => {
					state.clear();
					change.unresolved = true;
				}
			}
		}
		change
	}

	pub fn resolved_pair(&self) -> Option<(&str, &str)> {
		Some((
			self.origin.resolved.as_deref()?,
			self.destination.resolved.as_deref()?,
		))
	}

	pub fn is_selected(&self, label: &str) -> bool {
		self.slot(self.active).resolved.as_deref() == Some(label)
	}

	/// Booths matching shape, category and the active slot's term.
	pub fn candidates<'a>(&self, booths: &'a [Booth]) -> Vec<&'a Booth> {
		let term = self.active_term().to_lowercase();
		booths
			.iter()
			.filter(|b| b.shape_type.is_booth())
			.filter(|b| self.category == ALL_CATEGORIES || b.category == self.category)
			.filter(|b| {
				b.label.to_lowercase().contains(&term) || b.name.to_lowercase().contains(&term)
			})
			.collect()
	}
}

/// "all" followed by each distinct non-empty category, in first-seen order.
pub fn categories(booths: &[Booth]) -> Vec<String> {
	let mut out = vec![ALL_CATEGORIES.to_string()];
	for booth in booths {
		if !booth.category.is_empty() && !out.contains(&booth.category) {
			out.push(booth.category.clone());
		}
	}
	out
}
