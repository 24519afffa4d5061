// Navigation over the discovered proof list
//
// Loads are asynchronous, so navigation is split in two: `begin` picks the
// target and hands out a ticket, `commit` installs it once the proof has
// loaded. Every ticket carries an epoch and only the newest one may commit,
// which keeps a slow earlier load from overwriting a later one.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// A navigation in flight
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub index: usize,
    pub id: String,
    pub epoch: u64,
}

#[derive(Debug, Default)]
pub struct Navigator {
    proofs: Vec<String>,
    /// Index of the proof on screen
    current: usize,
    /// Index of the newest navigation target (== current when nothing is in flight)
    requested: usize,
    epoch: u64,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the proof list and return a ticket for its first proof
    pub fn reset(&mut self, proofs: Vec<String>) -> Option<Ticket> {
        self.proofs = proofs;
        self.current = 0;
        self.requested = 0;
        self.epoch += 1;
        self.ticket(0)
    }

    /// Start navigating one step in `direction`; `None` at either end of the list
    pub fn begin(&mut self, direction: Direction) -> Option<Ticket> {
        let target = match direction {
            Direction::Previous => self.requested.checked_sub(1)?,
            Direction::Next => self.requested + 1,
        };
        if target >= self.proofs.len() {
            return None;
        }

        self.requested = target;
        self.epoch += 1;
        self.ticket(target)
    }

    /// Whether `ticket` is still the newest navigation
    pub fn is_current(&self, ticket: &Ticket) -> bool {
        ticket.epoch == self.epoch
    }

    /// Install a loaded ticket; stale tickets are refused
    pub fn commit(&mut self, ticket: &Ticket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.current = ticket.index;
        self.requested = ticket.index;
        true
    }

    /// Give up on a failed ticket, leaving the position where it was
    pub fn abandon(&mut self, ticket: &Ticket) {
        if self.is_current(ticket) {
            self.requested = self.current;
        }
    }

    pub fn proofs(&self) -> &[String] {
        &self.proofs
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// `"<position> / <total>"`, 1-based; `"0 / 0"` for an empty list
    pub fn counter_label(&self) -> String {
        if self.proofs.is_empty() {
            "0 / 0".to_string()
        } else {
            format!("{} / {}", self.current + 1, self.proofs.len())
        }
    }

    pub fn prev_disabled(&self) -> bool {
        self.current == 0
    }

    pub fn next_disabled(&self) -> bool {
        self.current + 1 >= self.proofs.len()
    }

    fn ticket(&self, index: usize) -> Option<Ticket> {
        self.proofs.get(index).map(|id| Ticket {
            index,
            id: id.clone(),
            epoch: self.epoch,
        })
    }
}
