use thiserror::Error;

use crate::event::Event;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("no event at position {0}")]
    NoSuchEvent(usize),
    #[error("no deletion is awaiting confirmation")]
    NothingPending,
}

/// Progress of a single delete attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeleteState {
    #[default]
    Idle,
    Pending { index: usize },
}

/// The session table: events in insertion order plus the delete marker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    events: Vec<Event>,
    delete: DeleteState,
}

impl Board {
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            events,
            delete: DeleteState::Idle,
        }
    }

    pub fn seeded() -> Self {
        Self::new(Event::samples())
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn delete_state(&self) -> DeleteState {
        self.delete
    }

    pub fn append(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Marks `index` for deletion, replacing any earlier pending target.
    pub fn request_delete(&mut self, index: usize) -> Result<&Event, BoardError> {
        let event = self
            .events
            .get(index)
            .ok_or(BoardError::NoSuchEvent(index))?;
        self.delete = DeleteState::Pending { index };
        Ok(event)
    }

    pub fn pending(&self) -> Option<(usize, &Event)> {
        match self.delete {
            DeleteState::Pending { index } => self.events.get(index).map(|event| (index, event)),
            DeleteState::Idle => None,
        }
    }

    pub fn confirm_delete(&mut self) -> Result<Event, BoardError> {
        let DeleteState::Pending { index } = std::mem::take(&mut self.delete) else {
            return Err(BoardError::NothingPending);
        };

        if index >= self.events.len() {
            return Err(BoardError::NoSuchEvent(index));
        }

        Ok(self.events.remove(index))
    }

    pub fn cancel_delete(&mut self) {
        self.delete = DeleteState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};

    use super::*;

    fn test_sale() -> Event {
        Event::new(
            "Test Sale",
            NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            "Hall A",
        )
    }

    #[test]
    fn append_keeps_prior_rows() {
        let mut board = Board::seeded();
        let before = board.events().to_vec();

        board.append(test_sale());

        assert_eq!(board.len(), before.len() + 1);
        assert_eq!(&board.events()[..before.len()], before.as_slice());
        assert_eq!(board.events().last(), Some(&test_sale()));
    }

    #[test]
    fn duplicates_are_allowed() {
        let mut board = Board::new(Vec::new());
        board.append(test_sale());
        board.append(test_sale());
        assert_eq!(board.len(), 2);
    }

    #[test]
    fn confirm_removes_exactly_the_pending_row() {
        let mut board = Board::seeded();
        let mut expected = board.events().to_vec();
        expected.remove(2);

        let target = board.request_delete(2).unwrap().clone();
        assert_eq!(board.pending(), Some((2, &target)));

        let removed = board.confirm_delete().unwrap();
        assert_eq!(removed, target);
        assert_eq!(board.events(), expected.as_slice());
        assert_eq!(board.delete_state(), DeleteState::Idle);
    }

    #[test]
    fn cancel_leaves_table_untouched() {
        let mut board = Board::seeded();
        let before = board.clone();

        board.request_delete(0).unwrap();
        board.cancel_delete();

        assert_eq!(board, before);
    }

    #[test]
    fn newer_request_overwrites_pending_target() {
        let mut board = Board::seeded();
        board.request_delete(1).unwrap();
        board.request_delete(3).unwrap();

        assert_eq!(board.delete_state(), DeleteState::Pending { index: 3 });
        let removed = board.confirm_delete().unwrap();
        assert_eq!(removed, Event::samples()[3]);
    }

    #[test]
    fn out_of_range_request_is_rejected() {
        let mut board = Board::seeded();
        board.request_delete(1).unwrap();

        assert_eq!(board.request_delete(5).err(), Some(BoardError::NoSuchEvent(5)));
        assert_eq!(board.delete_state(), DeleteState::Pending { index: 1 });
    }

    #[test]
    fn confirm_without_request_fails() {
        let mut board = Board::seeded();
        assert_eq!(board.confirm_delete(), Err(BoardError::NothingPending));
        assert_eq!(board.len(), 5);
    }

    #[test]
    fn append_while_pending_keeps_target() {
        let mut board = Board::seeded();
        board.request_delete(1).unwrap();
        board.append(test_sale());

        assert_eq!(board.confirm_delete(), Ok(Event::samples()[1].clone()));
        assert_eq!(board.len(), 5);
        assert_eq!(board.events()[4], test_sale());
    }

    #[test]
    fn add_then_delete_restores_seed() {
        let mut board = Board::seeded();
        board.append(test_sale());
        assert_eq!(board.len(), 6);
        assert_eq!(
            board.events()[5].fields(),
            ["Test Sale", "2026/04/01", "09:00", "12:00", "Hall A"].map(String::from)
        );

        board.request_delete(5).unwrap();
        board.confirm_delete().unwrap();

        assert_eq!(board, Board::seeded());
    }
}
