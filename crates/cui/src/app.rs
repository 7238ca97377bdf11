use crate::input::InputAction;
use anyhow::{Context, Result};
use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;
use tracing::info;
use ygodraft_api::{ApiConfig, YgoClient};
use ygodraft_core::{
    select_random_packs, AssocFinder, CardSet, DeckSection, DiscardError, DraftError, DraftRules,
    DraftSession, Event, EventBus, Progress, RngState,
};

const MAX_EVENT_LOG: usize = 200;
const DEFAULT_SEED: u64 = 0xD4AF7;

#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    pub seed: Option<u64>,
    pub cache_dir: Option<PathBuf>,
    pub rules: DraftRules,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    SetPick,
    Drafting,
    Discard,
    Complete,
}

pub struct App {
    client: YgoClient,
    rules: DraftRules,
    seed: u64,
    rng: RngState,
    finder: AssocFinder,
    save_dir: PathBuf,
    pub catalogue: Vec<CardSet>,
    pub set_cursor: usize,
    pub selection: Vec<CardSet>,
    pub session: Option<DraftSession>,
    events: EventBus,
    pub event_log: VecDeque<String>,
    pub status_line: String,
    pub screen: Screen,
    pub pack_cursor: usize,
    pub discard_focus: DeckSection,
    pub discard_cursor: usize,
    pub show_help: bool,
    pub should_quit: bool,
    pub fatal: Option<String>,
}

impl App {
    pub fn bootstrap(options: LaunchOptions, save_dir: PathBuf) -> Result<Self> {
        let mut api_config = ApiConfig::default();
        if let Some(dir) = options.cache_dir {
            api_config.cache_dir = dir;
        }
        let mut client = YgoClient::new(api_config).context("open response cache")?;
        let catalogue = client.card_sets().context("fetch card sets")?;
        info!(sets = catalogue.len(), "card set catalogue loaded");

        let seed = options.seed.unwrap_or(DEFAULT_SEED);
        Ok(Self {
            client,
            rules: options.rules,
            seed,
            rng: RngState::from_seed(seed),
            finder: AssocFinder::new(),
            save_dir,
            catalogue,
            set_cursor: 0,
            selection: Vec::new(),
            session: None,
            events: EventBus::default(),
            event_log: VecDeque::new(),
            status_line: "a adds a pack, r randomizes, s starts the draft".to_string(),
            screen: Screen::SetPick,
            pack_cursor: 0,
            discard_focus: DeckSection::Main,
            discard_cursor: 0,
            show_help: false,
            should_quit: false,
            fatal: None,
        })
    }

    pub fn rules(&self) -> &DraftRules {
        &self.rules
    }

    pub fn pack_total(&self) -> u32 {
        self.selection.iter().map(|set| set.pack_count).sum()
    }

    pub fn selected_count(&self, set_name: &str) -> u32 {
        self.selection
            .iter()
            .find(|set| set.name == set_name)
            .map(|set| set.pack_count)
            .unwrap_or(0)
    }

    pub fn dispatch(&mut self, action: InputAction) {
        match action {
            InputAction::None => {}
            InputAction::Quit => self.should_quit = true,
            InputAction::ToggleHelp => self.show_help = !self.show_help,
            other => match self.screen {
                Screen::SetPick => self.on_set_pick(other),
                Screen::Drafting => self.on_drafting(other),
                Screen::Discard => self.on_discard(other),
                Screen::Complete => self.on_complete(other),
            },
        }
        self.drain_events();
    }

    fn on_set_pick(&mut self, action: InputAction) {
        match action {
            InputAction::MoveUp => {
                self.set_cursor = self.set_cursor.saturating_sub(1);
            }
            InputAction::MoveDown => {
                if self.set_cursor + 1 < self.catalogue.len() {
                    self.set_cursor += 1;
                }
            }
            InputAction::Primary | InputAction::AddPack => self.add_pack(),
            InputAction::RemovePack => self.remove_pack(),
            InputAction::RandomFill => {
                self.selection =
                    select_random_packs(&self.catalogue, 5..=10, self.rules.pack_max, &mut self.rng);
                self.status_line = format!("randomized selection: {} packs", self.pack_total());
            }
            InputAction::StartDraft => self.start_draft(),
            _ => {}
        }
    }

    fn add_pack(&mut self) {
        let Some(set) = self.catalogue.get(self.set_cursor) else {
            return;
        };
        let name = set.name.clone();
        if let Some(chosen) = self.selection.iter_mut().find(|chosen| chosen.name == name) {
            chosen.pack_count += 1;
        } else {
            let mut chosen = set.clone();
            chosen.pack_count = 1;
            self.selection.push(chosen);
        }
        self.status_line = format!(
            "{}x {name}, total {}/{}",
            self.selected_count(&name),
            self.pack_total(),
            self.rules.pack_max
        );
    }

    fn remove_pack(&mut self) {
        let Some(set) = self.catalogue.get(self.set_cursor) else {
            return;
        };
        let name = set.name.clone();
        if let Some(position) = self.selection.iter().position(|chosen| chosen.name == name) {
            let chosen = &mut self.selection[position];
            chosen.pack_count -= 1;
            if chosen.pack_count == 0 {
                self.selection.remove(position);
            }
        }
        self.status_line = format!(
            "{}x {name}, total {}/{}",
            self.selected_count(&name),
            self.pack_total(),
            self.rules.pack_max
        );
    }

    fn start_draft(&mut self) {
        match DraftSession::new(
            "Drafted Deck",
            self.selection.clone(),
            self.rules.clone(),
            self.seed,
        ) {
            Ok(session) => {
                self.session = Some(session);
                self.screen = Screen::Drafting;
                self.status_line =
                    "space toggles a pick, n opens the next pack, x adds associated".to_string();
                self.advance();
            }
            Err(err) => self.status_line = err.to_string(),
        }
    }

    fn on_drafting(&mut self, action: InputAction) {
        match action {
            InputAction::MoveUp => {
                self.pack_cursor = self.pack_cursor.saturating_sub(1);
            }
            InputAction::MoveDown => {
                let len = self
                    .session
                    .as_ref()
                    .map(|session| session.pack().len())
                    .unwrap_or(0);
                if self.pack_cursor + 1 < len {
                    self.pack_cursor += 1;
                }
            }
            InputAction::Primary => self.toggle_pick(),
            InputAction::ClearSelection => {
                self.apply(|session, events| session.clear_selection(events));
            }
            InputAction::Advance => self.advance(),
            InputAction::AddAssociated => self.add_associated(),
            InputAction::Export => self.export(),
            _ => {}
        }
    }

    fn toggle_pick(&mut self) {
        let cursor = self.pack_cursor;
        let picked = self
            .session
            .as_ref()
            .map(|session| session.is_picked(cursor))
            .unwrap_or(false);
        if picked {
            self.apply(move |session, events| session.unpick(cursor, events));
        } else {
            self.apply(move |session, events| session.pick(cursor, events));
        }
    }

    fn add_associated(&mut self) {
        let card = self
            .session
            .as_ref()
            .and_then(|session| session.pack().get(self.pack_cursor))
            .cloned();
        let Some(card) = card else {
            return;
        };
        let suggestions = self.finder.suggestions(&card);
        if suggestions.is_empty() {
            self.status_line = format!("{} names no other cards", card.name);
            return;
        }
        let set = self
            .session
            .as_ref()
            .and_then(|session| session.active_set())
            .cloned();
        let mut names = suggestions.names.clone();
        if let Some(helper) = suggestions.fusion_helper {
            names.push(helper.to_string());
        }
        let mut added = 0;
        for name in names {
            let Some(found) = self.client.card_by_name(&name, set.as_ref()) else {
                continue;
            };
            let mut ok = false;
            if let Some(session) = self.session.as_mut() {
                ok = session.add_associated(found, &mut self.events).is_ok();
            }
            if ok {
                added += 1;
            }
        }
        self.status_line = format!("added {added} associated card(s) of {}", card.name);
    }

    fn on_discard(&mut self, action: InputAction) {
        match action {
            InputAction::NextFocus => {
                self.discard_focus = match self.discard_focus {
                    DeckSection::Main => DeckSection::Extra,
                    DeckSection::Extra => DeckSection::Side,
                    DeckSection::Side => DeckSection::Main,
                };
                self.discard_cursor = 0;
            }
            InputAction::MoveUp => {
                self.discard_cursor = self.discard_cursor.saturating_sub(1);
            }
            InputAction::MoveDown => {
                let len = self
                    .session
                    .as_ref()
                    .and_then(|session| session.discard_stage())
                    .map(|stage| stage.entries(self.discard_focus).len())
                    .unwrap_or(0);
                if self.discard_cursor + 1 < len {
                    self.discard_cursor += 1;
                }
            }
            InputAction::Primary => {
                let focus = self.discard_focus;
                let cursor = self.discard_cursor;
                let result = self
                    .session
                    .as_mut()
                    .and_then(|session| session.discard_stage_mut())
                    .map(|stage| stage.toggle_mark(focus, cursor));
                match result {
                    Some(Err(err)) => self.status_line = err.to_string(),
                    Some(Ok(_)) | None => {}
                }
            }
            InputAction::MoveCard => {
                let focus = self.discard_focus;
                let cursor = self.discard_cursor;
                let result = self
                    .session
                    .as_mut()
                    .and_then(|session| session.discard_stage_mut())
                    .map(|stage| stage.move_card(focus, cursor));
                match result {
                    Some(Err(err)) => self.status_line = err.to_string(),
                    Some(Ok(())) => {
                        let len = self
                            .session
                            .as_ref()
                            .and_then(|session| session.discard_stage())
                            .map(|stage| stage.entries(focus).len())
                            .unwrap_or(0);
                        if self.discard_cursor >= len && len > 0 {
                            self.discard_cursor = len - 1;
                        }
                    }
                    None => {}
                }
            }
            InputAction::Accept => self.accept_discard(),
            _ => {}
        }
    }

    fn accept_discard(&mut self) {
        let result = match self.session.as_mut() {
            Some(session) => session.accept_discard(&mut self.events),
            None => return,
        };
        match result {
            Ok(Progress::Complete) => {
                self.autosave();
                self.screen = Screen::Complete;
                self.status_line = "draft complete, e exports the deck".to_string();
            }
            Ok(_) => {
                self.autosave();
                self.screen = Screen::Drafting;
                self.pack_cursor = 0;
                self.advance();
            }
            Err(err) => self.status_line = friendly(err),
        }
    }

    fn on_complete(&mut self, action: InputAction) {
        if action == InputAction::Export {
            self.export();
        }
    }

    fn advance(&mut self) {
        loop {
            let progress = match self.session.as_mut() {
                Some(session) => session.advance(&mut self.events),
                None => return,
            };
            match progress {
                Ok(Progress::NeedSetCards { set_index }) => {
                    let set = match self.session.as_ref() {
                        Some(session) => session.sets()[set_index].clone(),
                        None => return,
                    };
                    match self.client.set_cards(&set) {
                        Ok(cards) => {
                            if let Some(session) = self.session.as_mut() {
                                if session.provide_set_cards(set_index, cards).is_err() {
                                    return;
                                }
                            }
                        }
                        Err(err) => {
                            // Set info is the draft's lifeline; treat failure
                            // as unrecoverable.
                            self.fatal = Some(format!("loading {} failed: {err}", set.name));
                            self.should_quit = true;
                            return;
                        }
                    }
                }
                Ok(Progress::PackOpened { .. }) => {
                    self.pack_cursor = 0;
                    return;
                }
                Ok(Progress::DiscardStage {
                    deck_target,
                    side_target,
                }) => {
                    self.screen = Screen::Discard;
                    self.discard_focus = DeckSection::Main;
                    self.discard_cursor = 0;
                    self.status_line = format!(
                        "trim to {deck_target} kept ({side_target} side): space marks, \
                         m moves, tab switches, enter accepts"
                    );
                    return;
                }
                Ok(Progress::DiscardResolved) | Ok(Progress::Complete) => return,
                Err(err) => {
                    self.status_line = friendly(err);
                    return;
                }
            }
        }
    }

    fn apply<F: FnOnce(&mut DraftSession, &mut EventBus) -> Result<(), DraftError>>(
        &mut self,
        operation: F,
    ) {
        let result = match self.session.as_mut() {
            Some(session) => operation(session, &mut self.events),
            None => return,
        };
        if let Err(err) = result {
            self.status_line = friendly(err);
        }
    }

    fn autosave(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let dir = self.save_dir.join("autosave");
        if fs::create_dir_all(&dir).is_err() {
            return;
        }
        let path = dir.join(format!(
            "autosave_stage_{}.ydk",
            session.discard_stages_done()
        ));
        if fs::write(&path, session.export_ydk()).is_ok() {
            info!(path = %path.display(), "autosaved deck");
        }
    }

    fn export(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        if fs::create_dir_all(&self.save_dir).is_err() {
            self.status_line = "could not create the save directory".to_string();
            return;
        }
        let path = self.save_dir.join("drafted_deck.ydk");
        match fs::write(&path, session.export_ydk()) {
            Ok(()) => self.status_line = format!("deck saved to {}", path.display()),
            Err(err) => self.status_line = format!("export failed: {err}"),
        }
    }

    fn drain_events(&mut self) {
        let lines: Vec<String> = self.events.drain().map(|event| describe(&event)).collect();
        for line in lines {
            if self.event_log.len() >= MAX_EVENT_LOG {
                self.event_log.pop_front();
            }
            self.event_log.push_back(line);
        }
    }
}

fn friendly(err: DraftError) -> String {
    match &err {
        DraftError::Discard(DiscardError::AdjustDeck { kept, target }) => {
            if kept > target {
                format!("deck: remove {} more card(s)", kept - target)
            } else {
                format!("deck: add {} more card(s)", target - kept)
            }
        }
        DraftError::Discard(DiscardError::AdjustSide { kept, target }) => {
            if kept > target {
                format!("side: remove {} more card(s)", kept - target)
            } else {
                format!("side: add {} more card(s)", target - kept)
            }
        }
        _ => err.to_string(),
    }
}

fn describe(event: &Event) -> String {
    match event {
        Event::PackOpened {
            set_name,
            pack_number,
            picks_left,
        } => format!("pack {pack_number} from {set_name} ({picks_left} picks)"),
        Event::CardPicked { name, free } => {
            if *free {
                format!("picked {name} (free)")
            } else {
                format!("picked {name}")
            }
        }
        Event::PickReturned { name } => format!("returned {name}"),
        Event::SelectionCleared { count } => format!("cleared {count} pick(s)"),
        Event::AssociatedAdded { name } => format!("added associated {name}"),
        Event::SelectionsCommitted { main, extra } => {
            format!("committed {main} main / {extra} extra")
        }
        Event::DiscardStageStarted {
            deck_target,
            side_target,
        } => format!("discard stage: deck {deck_target}, side {side_target}"),
        Event::DiscardAccepted {
            stage,
            main,
            extra,
            side,
        } => format!("stage {stage} done: {main}/{extra}/{side}"),
        Event::DraftCompleted { main, extra, side } => {
            format!("draft complete: {main}/{extra}/{side}")
        }
    }
}
