use std::future::Future;

use futures::future::{AbortHandle, AbortRegistration, Abortable, Aborted};
use log::debug;

use crate::error::MapError;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RouteKey {
	pub origin: String,
	pub destination: String,
}

impl RouteKey {
	pub fn new(origin: &str, destination: &str) -> Self {
		Self {
			origin: origin.to_string(),
			destination: destination.to_string(),
		}
	}

	pub fn cancelled(&self) -> MapError {
		MapError::QueryCancelled {
			origin: self.origin.clone(),
			destination: self.destination.clone(),
		}
	}
}

/// Identifies one issued request; completions carrying an old token are dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueryToken(u64);

/// Everything a driver needs to run one request.
#[derive(Debug)]
pub struct QueryTicket {
	pub key: RouteKey,
	pub token: QueryToken,
	pub registration: AbortRegistration,
}

#[derive(Debug)]
pub enum QueryCommand {
	/// The pair did not change.
	Unchanged,
	/// A slot is unresolved: clear the highlight now.
	Clear,
	/// Origin and destination are the same booth; no request is needed.
	Local(RouteKey),
	Issue(QueryTicket),
}

#[derive(Debug, PartialEq)]
pub enum QueryOutcome {
	Highlight(Vec<String>),
	/// The destination must be re-picked.
	Failed(MapError),
	/// Stale or cancelled; nothing user-visible happens.
	Ignored,
}

#[derive(Debug)]
struct InFlight {
	token: QueryToken,
	abort: AbortHandle,
}

/// Keeps at most one shortest-path request in flight.
#[derive(Debug, Default)]
pub struct PathQueryCoordinator {
	current: Option<RouteKey>,
	in_flight: Option<InFlight>,
	next_token: u64,
	aborted: u64,
}

impl PathQueryCoordinator {
	pub fn new() -> Self {
		Self::default()
	}

	/// Reacts to the resolved pair of the selection.
	pub fn update(&mut self, pair: Option<(&str, &str)>) -> QueryCommand {
		let Some((origin, destination)) = pair else {
			self.abort_in_flight();
			self.current = None;
			return QueryCommand::Clear;
		};
		let key = RouteKey::new(origin, destination);
		if self.current.as_ref() == Some(&key) {
			return QueryCommand::Unchanged;
		}
		self.abort_in_flight();
		self.current = Some(key.clone());
		if origin == destination {
			return QueryCommand::Local(key);
		}

		self.next_token += 1;
		let token = QueryToken(self.next_token);
		let (abort, registration) = AbortHandle::new_pair();
		self.in_flight = Some(InFlight { token, abort });
		debug!("path query {origin} -> {destination} issued");
		QueryCommand::Issue(QueryTicket {
			key,
			token,
			registration,
		})
	}

	pub fn complete(&mut self, token: QueryToken, result: Result<Vec<String>, MapError>) -> QueryOutcome {
		if self.in_flight.as_ref().map(|f| f.token) != Some(token) {
			return QueryOutcome::Ignored;
		}
		self.in_flight = None;
		match result {
			Ok(path) => QueryOutcome::Highlight(path),
			Err(e) if e.is_cancellation() => QueryOutcome::Ignored,
			Err(e) => {
				self.current = None;
				QueryOutcome::Failed(e)
			}
		}
	}

	pub fn in_flight(&self) -> Option<&RouteKey> {
		self.in_flight.as_ref().and(self.current.as_ref())
	}

	/// Requests aborted because a newer pair superseded them.
	pub fn aborted(&self) -> u64 {
		self.aborted
	}

	fn abort_in_flight(&mut self) {
		if let Some(stale) = self.in_flight.take() {
			stale.abort.abort();
			self.aborted += 1;
			if let Some(key) = &self.current {
				debug!("path query {} -> {} aborted", key.origin, key.destination);
			}
		}
	}
}

/// Runs `request` under the ticket's abort registration.
pub async fn drive<F>(ticket: QueryTicket, request: F) -> (QueryToken, Result<Vec<String>, MapError>)
where
	F: Future<Output = Result<Vec<String>, MapError>>,
{
	let QueryTicket {
		key,
		token,
		registration,
	} = ticket;
	let result = match Abortable::new(request, registration).await {
		Ok(result) => result,
		Err(Aborted) => Err(key.cancelled()),
	};
	(token, result)
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;
	use std::rc::Rc;

	use futures::channel::oneshot;
	use futures::executor::block_on;

	use super::*;

	/// Fake pathfinding service that counts answered and abandoned requests.
	#[derive(Default)]
	struct StubNetwork {
		answered: Rc<Cell<usize>>,
		abandoned: Rc<Cell<usize>>,
	}

	struct Pending {
		abandoned: Rc<Cell<usize>>,
		done: bool,
	}

	impl Drop for Pending {
		fn drop(&mut self) {
			if !self.done {
				self.abandoned.set(self.abandoned.get() + 1);
			}
		}
	}

	impl StubNetwork {
		fn request(&self, rx: oneshot::Receiver<Vec<String>>) -> impl Future<Output = Result<Vec<String>, MapError>> {
			let answered = self.answered.clone();
			let pending = Pending {
				abandoned: self.abandoned.clone(),
				done: false,
			};
			async move {
				let mut pending = pending;
				let path = rx.await.map_err(|_| MapError::QueryFailed {
					origin: "?".into(),
					destination: "?".into(),
					reason: "stub dropped".into(),
				})?;
				pending.done = true;
				answered.set(answered.get() + 1);
				Ok(path)
			}
		}
	}

	fn ticket(cmd: QueryCommand) -> QueryTicket {
		match cmd {
			QueryCommand::Issue(t) => t,
			other => panic!("expected a request, got {other:?}"),
		}
	}

	fn path(ids: &[&str]) -> Vec<String> {
		ids.iter().map(|s| s.to_string()).collect()
	}

	#[test]
	fn superseded_query_is_aborted_and_its_result_never_lands() {
		let net = StubNetwork::default();
		let mut coord = PathQueryCoordinator::new();

		let (_tx_xy, rx_xy) = oneshot::channel();
		let xy = ticket(coord.update(Some(("X", "Y"))));
		let xy_token = xy.token;
		let xy_fut = drive(xy, net.request(rx_xy));

		let (tx_xz, rx_xz) = oneshot::channel();
		let xz = ticket(coord.update(Some(("X", "Z"))));
		let xz_fut = drive(xz, net.request(rx_xz));
		assert_eq!(coord.aborted(), 1);
		assert_eq!(coord.in_flight(), Some(&RouteKey::new("X", "Z")));

		let (token, result) = block_on(xy_fut);
		assert_eq!(token, xy_token);
		assert!(result.as_ref().unwrap_err().is_cancellation());
		assert_eq!(coord.complete(token, result), QueryOutcome::Ignored);
		// A late success for the stale key is ignored as well.
		assert_eq!(coord.complete(xy_token, Ok(path(&["X", "Y"]))), QueryOutcome::Ignored);

		tx_xz.send(path(&["X", "Q", "Z"])).unwrap();
		let (token, result) = block_on(xz_fut);
		assert_eq!(
			coord.complete(token, result),
			QueryOutcome::Highlight(path(&["X", "Q", "Z"]))
		);
		assert_eq!((net.answered.get(), net.abandoned.get()), (1, 1));
		assert_eq!(coord.in_flight(), None);
	}

	#[test]
	fn same_pair_is_not_reissued() {
		let mut coord = PathQueryCoordinator::new();
		let t = ticket(coord.update(Some(("A", "B"))));
		assert!(matches!(coord.update(Some(("A", "B"))), QueryCommand::Unchanged));
		coord.complete(t.token, Ok(path(&["A", "B"])));
		assert!(matches!(coord.update(Some(("A", "B"))), QueryCommand::Unchanged));
		assert_eq!(coord.aborted(), 0);
	}

	#[test]
	fn unresolving_clears_and_aborts() {
		let mut coord = PathQueryCoordinator::new();
		let t = ticket(coord.update(Some(("A", "B"))));
		assert!(matches!(coord.update(None), QueryCommand::Clear));
		assert_eq!(coord.aborted(), 1);
		assert_eq!(coord.complete(t.token, Ok(path(&["A", "B"]))), QueryOutcome::Ignored);
		// Re-resolving the same pair issues a fresh request.
		assert!(matches!(coord.update(Some(("A", "B"))), QueryCommand::Issue(_)));
	}

	#[test]
	fn failure_surfaces_once_and_allows_retry() {
		let mut coord = PathQueryCoordinator::new();
		let t = ticket(coord.update(Some(("A", "B"))));
		let err = MapError::QueryFailed {
			origin: "A".into(),
			destination: "B".into(),
			reason: "502".into(),
		};
		assert_eq!(coord.complete(t.token, Err(err.clone())), QueryOutcome::Failed(err));
		assert!(matches!(coord.update(Some(("A", "B"))), QueryCommand::Issue(_)));
	}

	#[test]
	fn same_booth_is_resolved_locally() {
		let mut coord = PathQueryCoordinator::new();
		match coord.update(Some(("A", "A"))) {
			QueryCommand::Local(key) => assert_eq!(key, RouteKey::new("A", "A")),
			other => panic!("expected local route, got {other:?}"),
		}
		assert_eq!(coord.in_flight(), None);
	}
}
