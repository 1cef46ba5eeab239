//! Selection <-> address bar, and the overlay stack bound to the back gesture.

pub const FROM_PARAM: &str = "from";
pub const TO_PARAM: &str = "to";

/// The part of the selection that lives in the URL.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionQuery {
	pub from: Option<String>,
	pub to: Option<String>,
}

impl SelectionQuery {
	pub fn new(from: Option<&str>, to: Option<&str>) -> Self {
		Self {
			from: from.map(str::to_string),
			to: to.map(str::to_string),
		}
	}

	pub fn is_bare(&self) -> bool {
		self.from.is_none() && self.to.is_none()
	}

	/// Parses a search string with or without the leading `?`. Empty values count as absent.
	pub fn parse(search: &str) -> Self {
		let mut query = Self::default();
		for (key, value) in form_urlencoded::parse(search.trim_start_matches('?').as_bytes()) {
			let slot = match key.as_ref() {
				FROM_PARAM => &mut query.from,
				TO_PARAM => &mut query.to,
				_ => continue,
			};
			if slot.is_none() && !value.is_empty() {
				*slot = Some(value.into_owned());
			}
		}
		query
	}

	/// `?from=..&to=..` with absent fields omitted; empty for a bare selection.
	pub fn to_search(&self) -> String {
		let parts: Vec<String> = [(FROM_PARAM, &self.from), (TO_PARAM, &self.to)]
			.into_iter()
			.filter_map(|(k, v)| v.as_ref().map(|v| format!("{k}={}", encode_component(v))))
			.collect();
		if parts.is_empty() {
			String::new()
		} else {
			format!("?{}", parts.join("&"))
		}
	}
}

/// Percent-encodes everything outside the RFC 3986 unreserved set.
pub fn encode_component(value: &str) -> String {
	urlencoding::encode(value).into_owned()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteMode {
	Push,
	Replace,
}

/// A pending address-bar update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryWrite {
	pub search: String,
	pub mode: WriteMode,
}

/// Decides how a selection change reaches the address bar: the first
/// selection made from a bare URL gets its own entry, later edits replace it.
pub fn plan_write(current: &SelectionQuery, next: &SelectionQuery) -> Option<HistoryWrite> {
	if current == next {
		return None;
	}
	Some(HistoryWrite {
		search: next.to_search(),
		mode: if current.is_bare() {
			WriteMode::Push
		} else {
			WriteMode::Replace
		},
	})
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Overlay {
	ExpandedSearch,
}

/// What one back gesture should do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackAction {
	CollapseOverlay(Overlay),
	RestoreSelection(SelectionQuery),
}

/// Open overlays, innermost last. Each open overlay owns one history entry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OverlayStack {
	open: Vec<Overlay>,
}

impl OverlayStack {
	/// Returns true when the caller must push a history entry for it.
	pub fn push(&mut self, overlay: Overlay) -> bool {
		if self.open.last() == Some(&overlay) {
			return false;
		}
		self.open.push(overlay);
		true
	}

	pub fn pop(&mut self) -> Option<Overlay> {
		self.open.pop()
	}

	pub fn is_open(&self, overlay: Overlay) -> bool {
		self.open.contains(&overlay)
	}

	pub fn is_empty(&self) -> bool {
		self.open.is_empty()
	}

	/// A back/forward landed on `landed`. Collapsing an overlay wins over
	/// touching the selection; only one of the two happens.
	pub fn on_back(&mut self, landed: SelectionQuery) -> BackAction {
		match self.pop() {
			Some(overlay) => BackAction::CollapseOverlay(overlay),
			None => BackAction::RestoreSelection(landed),
		}
	}
}
