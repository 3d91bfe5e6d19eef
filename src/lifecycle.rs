//! Ordering for one logical line of requests (suggestions for a facet, the
//! preview page, ...). Each request gets a ticket; a response is applied only
//! when its ticket is the newest one issued and has not been cancelled or
//! already settled. Older responses are dropped whenever they arrive.

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn sequence(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct RequestLine {
    issued: u64,
    closed_through: u64,
}

impl RequestLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a ticket, superseding every earlier one.
    pub fn issue(&mut self) -> Ticket {
        self.issued += 1;
        Ticket(self.issued)
    }

    /// Supersedes the outstanding ticket without issuing a new one.
    pub fn cancel(&mut self) {
        self.closed_through = self.issued;
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.issued && ticket.0 > self.closed_through
    }

    /// The ticket whose response is still awaited, if any.
    pub fn in_flight(&self) -> Option<Ticket> {
        (self.issued > self.closed_through).then_some(Ticket(self.issued))
    }

    /// Consumes a response. Returns `true` when it should be applied.
    pub fn settle(&mut self, ticket: Ticket) -> bool {
        if !self.is_current(ticket) {
            tracing::trace!(ticket = ticket.0, latest = self.issued, "stale response dropped");
            return false;
        }
        self.closed_through = ticket.0;
        true
    }
}
