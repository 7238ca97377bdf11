use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Event {
    PackOpened {
        set_name: String,
        pack_number: u32,
        picks_left: u32,
    },
    CardPicked {
        name: String,
        free: bool,
    },
    PickReturned {
        name: String,
    },
    SelectionCleared {
        count: usize,
    },
    AssociatedAdded {
        name: String,
    },
    SelectionsCommitted {
        main: usize,
        extra: usize,
    },
    DiscardStageStarted {
        deck_target: usize,
        side_target: usize,
    },
    DiscardAccepted {
        stage: u32,
        main: usize,
        extra: usize,
        side: usize,
    },
    DraftCompleted {
        main: usize,
        extra: usize,
        side: usize,
    },
}

#[derive(Debug, Default)]
pub struct EventBus {
    queue: Vec<Event>,
}

impl EventBus {
    pub fn push(&mut self, event: Event) {
        self.queue.push(event);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.queue.drain(..)
    }
}
