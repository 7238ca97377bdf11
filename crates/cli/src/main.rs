use anyhow::{Context, Result};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;
use ygodraft_api::{ApiConfig, YgoClient};
use ygodraft_core::{
    select_random_packs, type_breakdown, AssocFinder, CardSet, DeckSection, DraftError,
    DraftRules, DraftSession, Event, EventBus, Progress, RngState, SetClass, SetFilter, Stage,
};

const DEFAULT_SEED: u64 = 0xD4AF7;

#[derive(Debug, Clone, Default)]
struct CliOptions {
    seed: Option<u64>,
    cui: bool,
    cache_dir: Option<PathBuf>,
    rules: Option<PathBuf>,
    save_dir: Option<PathBuf>,
    help: bool,
}

fn parse_options(args: &[String]) -> CliOptions {
    let mut options = CliOptions::default();
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "--seed" => {
                if let Some(value) = args.get(idx + 1) {
                    options.seed = value.parse::<u64>().ok();
                    idx += 1;
                }
            }
            "--cui" => options.cui = true,
            "--cache-dir" => {
                if let Some(value) = args.get(idx + 1) {
                    options.cache_dir = Some(PathBuf::from(value));
                    idx += 1;
                }
            }
            "--rules" => {
                if let Some(value) = args.get(idx + 1) {
                    options.rules = Some(PathBuf::from(value));
                    idx += 1;
                }
            }
            "--save-dir" => {
                if let Some(value) = args.get(idx + 1) {
                    options.save_dir = Some(PathBuf::from(value));
                    idx += 1;
                }
            }
            "-h" | "--help" => options.help = true,
            other => {
                eprintln!("ignoring unknown argument {other}");
            }
        }
        idx += 1;
    }
    options
}

fn print_usage() {
    println!("ygodraft - draft a deck from randomized card packs");
    println!();
    println!("usage: ygodraft [--seed N] [--cui] [--cache-dir PATH]");
    println!("                [--rules PATH] [--save-dir PATH]");
    println!();
    println!("  --seed N        seed for the pack randomizer");
    println!("  --cui           launch the terminal UI instead of the REPL");
    println!("  --cache-dir     response/image cache root");
    println!("  --rules         JSON file overriding the draft rules");
    println!("  --save-dir      where exported decks land");
    println!("  RUST_LOG        log filter (default: info)");
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();
}

fn load_rules(path: &Path) -> Result<DraftRules> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let rules = serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(rules)
}

fn default_save_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "ygodraft")
        .map(|dirs| dirs.data_dir().join("decks"))
        .unwrap_or_else(|| PathBuf::from("decks"))
}

/// Deck names become file names; keep them boring.
fn sanitize_file_name(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "deck".to_string()
    } else {
        cleaned
    }
}

fn adjust_hint(kept: usize, target: usize) -> String {
    if kept > target {
        format!("remove {} more card(s)", kept - target)
    } else {
        format!("add {} more card(s)", target - kept)
    }
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = parse_options(&args);
    if options.help {
        print_usage();
        return Ok(());
    }
    init_logging();

    let rules = match options.rules.as_deref() {
        Some(path) => load_rules(path)?,
        None => DraftRules::default(),
    };

    if options.cui {
        return ygodraft_cui::run(ygodraft_cui::LaunchOptions {
            seed: options.seed,
            cache_dir: options.cache_dir,
            rules,
        });
    }

    let mut api_config = ApiConfig::default();
    if let Some(dir) = options.cache_dir.clone() {
        api_config.cache_dir = dir;
    }
    let mut client = YgoClient::new(api_config).context("open response cache")?;
    let catalogue = client.card_sets().context("fetch card sets")?;
    let archetypes = client.archetypes().context("fetch archetype list")?;
    info!(
        sets = catalogue.len(),
        archetypes = archetypes.len(),
        "card catalogue loaded"
    );

    let seed = options.seed.unwrap_or(DEFAULT_SEED);
    let mut repl = Repl {
        client,
        catalogue,
        archetypes,
        filter: SetFilter::default(),
        selection: Vec::new(),
        rules,
        seed,
        rng: RngState::from_seed(seed),
        save_dir: options.save_dir.unwrap_or_else(default_save_dir),
        finder: AssocFinder::new(),
        session: None,
        events: EventBus::default(),
    };
    repl.run()
}

struct Repl {
    client: YgoClient,
    catalogue: Vec<CardSet>,
    archetypes: Vec<String>,
    filter: SetFilter,
    selection: Vec<CardSet>,
    rules: DraftRules,
    seed: u64,
    rng: RngState,
    save_dir: PathBuf,
    finder: AssocFinder,
    session: Option<DraftSession>,
    events: EventBus,
}

impl Repl {
    fn run(&mut self) -> Result<()> {
        println!(
            "{} sets available. Type 'help' for commands.",
            self.catalogue.len()
        );
        let stdin = io::stdin();
        loop {
            print!("> ");
            io::stdout().flush()?;
            let mut line = String::new();
            if stdin.lock().read_line(&mut line)? == 0 {
                return Ok(());
            }
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.is_empty() {
                continue;
            }
            match self.dispatch(&tokens)? {
                LoopControl::Continue => {}
                LoopControl::Quit => return Ok(()),
            }
            self.drain_events();
        }
    }

    fn dispatch(&mut self, tokens: &[&str]) -> Result<LoopControl> {
        match tokens[0] {
            "quit" | "exit" | "q" => return Ok(LoopControl::Quit),
            "help" | "?" => self.help(),
            "sets" => self.list_sets(tokens.get(1).copied()),
            "filter" => self.filter_command(&tokens[1..]),
            "add" => self.add_selection(&tokens[1..]),
            "remove" => self.remove_selection(&tokens[1..]),
            "random" => self.randomize_selection(&tokens[1..]),
            "selected" => self.show_selection(),
            "start" => self.start_draft(&tokens[1..])?,
            "pack" => self.show_pack(),
            "pick" => self.pick(&tokens[1..]),
            "unpick" => self.unpick(&tokens[1..]),
            "clear" => self.clear_selection(),
            "assoc" => self.assoc(&tokens[1..]),
            "search" => self.search(&tokens[1..]),
            "art" => self.art(&tokens[1..]),
            "deck" => self.show_deck(),
            "status" => self.show_status(),
            "next" | "n" => self.advance()?,
            "review" => self.show_review(),
            "mark" => self.mark(&tokens[1..]),
            "move" => self.move_card(&tokens[1..]),
            "accept" => self.accept()?,
            "export" => self.export(tokens.get(1).copied())?,
            other => println!("unknown command '{other}', try 'help'"),
        }
        Ok(LoopControl::Continue)
    }

    fn help(&self) {
        println!("selection:  sets [text] | filter [min N | date Y-M-D | class a,b | reset]");
        println!("            add <set#> [packs] | remove <sel#> | random [total] | selected");
        println!("            start <deck name>");
        println!("drafting:   pack | pick <card#...> | unpick <card#> | clear");
        println!("            assoc <card#> [all | <n>] | search <archetype>");
        println!("            art <card#> | art set | deck | status | next");
        println!("discard:    review | mark <m|e|s> <card#> | move <m|s> <card#> | accept");
        println!("always:     export [dir] | help | quit");
    }

    fn visible(&self) -> Vec<usize> {
        self.catalogue
            .iter()
            .enumerate()
            .filter(|(_, set)| self.filter.matches(set))
            .map(|(index, _)| index)
            .collect()
    }

    fn list_sets(&self, needle: Option<&str>) {
        let needle = needle.map(str::to_lowercase);
        let mut shown = 0;
        for (position, index) in self.visible().iter().enumerate() {
            let set = &self.catalogue[*index];
            if let Some(needle) = &needle {
                if !set.name.to_lowercase().contains(needle) {
                    continue;
                }
            }
            println!(
                "{:>4}. {} [{}] {} cards, {}",
                position + 1,
                set.name,
                set.code,
                set.card_count,
                set.release_date
            );
            shown += 1;
        }
        if shown == 0 {
            println!("no sets match");
        }
    }

    fn filter_command(&mut self, args: &[&str]) {
        match args {
            [] => {
                println!(
                    "min cards {}, max date {}, {} classes",
                    self.filter.min_cards,
                    self.filter.max_date,
                    self.filter.classes.len()
                );
            }
            ["reset"] => {
                self.filter = SetFilter::default();
                println!("filter reset");
            }
            ["min", value] => match value.parse::<u32>() {
                Ok(min) => {
                    self.filter.min_cards = min;
                    println!("minimum cards set to {min}");
                }
                Err(_) => println!("not a number: {value}"),
            },
            ["date", value] => match chrono_date(value) {
                Some(date) => {
                    self.filter.max_date = date;
                    println!("maximum date set to {date}");
                }
                None => println!("expected YYYY-MM-DD, got {value}"),
            },
            ["class", names] => {
                let classes: Vec<SetClass> = SetClass::ALL
                    .iter()
                    .copied()
                    .filter(|class| {
                        names
                            .split(',')
                            .any(|name| class.label().replace(' ', "-") == name.to_lowercase())
                    })
                    .collect();
                if classes.is_empty() {
                    println!("no classes matched; labels use dashes, e.g. booster-pack");
                } else {
                    println!("{} classes selected", classes.len());
                    self.filter.classes = classes;
                }
            }
            _ => println!("usage: filter [min N | date Y-M-D | class a,b | reset]"),
        }
    }

    fn add_selection(&mut self, args: &[&str]) {
        let Some(position) = args.first().and_then(|token| parse_index(token)) else {
            println!("usage: add <set#> [packs]");
            return;
        };
        let count = args
            .get(1)
            .and_then(|token| token.parse::<u32>().ok())
            .unwrap_or(1);
        let visible = self.visible();
        let Some(index) = visible.get(position).copied() else {
            println!("no set at {}", position + 1);
            return;
        };
        let mut set = self.catalogue[index].clone();
        if self.selection.iter().any(|chosen| chosen.name == set.name) {
            println!("{} is already selected", set.name);
            return;
        }
        set.pack_count = count;
        println!("{}x {}", count, set.name);
        self.selection.push(set);
        self.print_pack_total();
    }

    fn remove_selection(&mut self, args: &[&str]) {
        let Some(position) = args.first().and_then(|token| parse_index(token)) else {
            println!("usage: remove <sel#>");
            return;
        };
        if position >= self.selection.len() {
            println!("no selection at {}", position + 1);
            return;
        }
        let removed = self.selection.remove(position);
        println!("removed {}", removed.name);
        self.print_pack_total();
    }

    fn randomize_selection(&mut self, args: &[&str]) {
        let total = args
            .first()
            .and_then(|token| token.parse::<u32>().ok())
            .unwrap_or(self.rules.pack_max);
        let pool: Vec<CardSet> = self
            .visible()
            .into_iter()
            .map(|index| self.catalogue[index].clone())
            .collect();
        if pool.is_empty() {
            println!("the filter leaves nothing to randomize from");
            return;
        }
        self.selection = select_random_packs(&pool, 5..=10, total, &mut self.rng);
        for set in &self.selection {
            println!("{}x {}", set.pack_count, set.name);
        }
        self.print_pack_total();
    }

    fn show_selection(&self) {
        for (position, set) in self.selection.iter().enumerate() {
            println!("{:>3}. {}x {}", position + 1, set.pack_count, set.name);
        }
        self.print_pack_total();
    }

    fn print_pack_total(&self) {
        let total: u32 = self.selection.iter().map(|set| set.pack_count).sum();
        println!("pack total: {total}/{}", self.rules.pack_max);
    }

    fn start_draft(&mut self, args: &[&str]) -> Result<()> {
        if self.session.is_some() {
            println!("a draft is already running");
            return Ok(());
        }
        let name = if args.is_empty() {
            "Deck".to_string()
        } else {
            args.join(" ")
        };
        match DraftSession::new(name, self.selection.clone(), self.rules.clone(), self.seed) {
            Ok(session) => {
                self.session = Some(session);
                println!("drafting started, 'next' opens the first pack");
                self.advance()?;
            }
            Err(err) => println!("cannot start: {err}"),
        }
        Ok(())
    }

    fn advance(&mut self) -> Result<()> {
        if self.session.is_none() {
            println!("no draft running");
            return Ok(());
        }
        loop {
            let progress = match self.session.as_mut() {
                Some(session) => session.advance(&mut self.events),
                None => return Ok(()),
            };
            match progress {
                Ok(Progress::NeedSetCards { set_index }) => {
                    let set = match self.session.as_ref() {
                        Some(session) => session.sets()[set_index].clone(),
                        None => return Ok(()),
                    };
                    info!(set = %set.name, "loading set data");
                    let cards = self
                        .client
                        .set_cards(&set)
                        .with_context(|| format!("fetch cards of {}", set.name))?;
                    if let Some(session) = self.session.as_mut() {
                        session
                            .provide_set_cards(set_index, cards)
                            .context("install set cards")?;
                    }
                }
                Ok(Progress::PackOpened { .. }) => {
                    self.show_pack();
                    return Ok(());
                }
                Ok(Progress::DiscardStage {
                    deck_target,
                    side_target,
                }) => {
                    println!(
                        "discard stage: trim the deck to {deck_target} kept cards \
                         with {side_target} in the side deck ('review' shows it)"
                    );
                    return Ok(());
                }
                Ok(Progress::DiscardResolved) | Ok(Progress::Complete) => return Ok(()),
                Err(err) => {
                    println!("{}", self.friendly(err));
                    return Ok(());
                }
            }
        }
    }

    fn friendly(&self, err: DraftError) -> String {
        match &err {
            DraftError::Discard(ygodraft_core::DiscardError::AdjustDeck { kept, target }) => {
                format!("deck: {}", adjust_hint(*kept, *target))
            }
            DraftError::Discard(ygodraft_core::DiscardError::AdjustSide { kept, target }) => {
                format!("side deck: {}", adjust_hint(*kept, *target))
            }
            _ => err.to_string(),
        }
    }

    fn show_pack(&self) {
        let Some(session) = self.session.as_ref() else {
            println!("no draft running");
            return;
        };
        let set_name = session
            .active_set()
            .map(|set| set.name.clone())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "pack {}/{} (next from {}), picks left: {}",
            session.total_packs(),
            session.rules().pack_max,
            set_name,
            session.picks_left()
        );
        for (index, card) in session.pack().iter().enumerate() {
            let mark = if session.is_picked(index) { "*" } else { " " };
            let copies = session.copies_of(&card.name);
            println!(
                "{mark}{:>3}. [{}] {} ({}){}",
                index + 1,
                card.rarity,
                card.name,
                card.card_type.name(),
                if copies >= session.rules().copy_limit {
                    " [capped]"
                } else {
                    ""
                }
            );
        }
    }

    fn with_session<F: FnOnce(&mut DraftSession, &mut EventBus) -> Result<(), DraftError>>(
        &mut self,
        apply: F,
    ) {
        match self.session.as_mut() {
            Some(session) => {
                if let Err(err) = apply(session, &mut self.events) {
                    let message = self.friendly(err);
                    println!("{message}");
                }
            }
            None => println!("no draft running"),
        }
    }

    fn pick(&mut self, args: &[&str]) {
        if args.is_empty() {
            println!("usage: pick <card#...>");
            return;
        }
        for token in args {
            match parse_index(token) {
                Some(index) => self.with_session(|session, events| session.pick(index, events)),
                None => println!("not a card number: {token}"),
            }
        }
    }

    fn unpick(&mut self, args: &[&str]) {
        match args.first().and_then(|token| parse_index(token)) {
            Some(index) => self.with_session(|session, events| session.unpick(index, events)),
            None => println!("usage: unpick <card#>"),
        }
    }

    fn clear_selection(&mut self) {
        self.with_session(|session, events| session.clear_selection(events));
    }

    fn assoc(&mut self, args: &[&str]) {
        let Some(index) = args.first().and_then(|token| parse_index(token)) else {
            println!("usage: assoc <card#> [all | <n>]");
            return;
        };
        let Some(session) = self.session.as_ref() else {
            println!("no draft running");
            return;
        };
        let Some(card) = session.pack().get(index).cloned() else {
            println!("no card at {}", index + 1);
            return;
        };
        let suggestions = self.finder.suggestions(&card);
        if suggestions.is_empty() {
            println!("{} names no other cards", card.name);
            return;
        }

        match args.get(1).copied() {
            None => {
                for (position, name) in suggestions.names.iter().enumerate() {
                    println!("{:>3}. {}", position + 1, name);
                }
                if let Some(helper) = suggestions.fusion_helper {
                    println!("  +. {helper} (fusion helper)");
                }
                println!("'assoc {} all' adds every name", index + 1);
            }
            Some("all") => {
                let mut names = suggestions.names.clone();
                if let Some(helper) = suggestions.fusion_helper {
                    names.push(helper.to_string());
                }
                for name in names {
                    self.add_associated_by_name(&name);
                }
            }
            Some(token) => match parse_index(token) {
                Some(position) if position < suggestions.names.len() => {
                    let name = suggestions.names[position].clone();
                    self.add_associated_by_name(&name);
                }
                _ => println!("no suggestion at {token}"),
            },
        }
    }

    fn add_associated_by_name(&mut self, name: &str) {
        let set = self
            .session
            .as_ref()
            .and_then(|session| session.active_set())
            .cloned();
        match self.client.card_by_name(name, set.as_ref()) {
            Some(card) => {
                self.with_session(move |session, events| session.add_associated(card, events));
            }
            None => println!("{name} is not in the card database, skipping"),
        }
    }

    fn search(&mut self, args: &[&str]) {
        if args.is_empty() {
            println!("usage: search <archetype>");
            return;
        }
        let needle = args.join(" ").to_lowercase();
        let Some(archetype) = self
            .archetypes
            .iter()
            .find(|name| name.to_lowercase() == needle)
            .cloned()
        else {
            let close: Vec<&String> = self
                .archetypes
                .iter()
                .filter(|name| name.to_lowercase().contains(&needle))
                .take(10)
                .collect();
            if close.is_empty() {
                println!("{needle} is not a known archetype");
            } else {
                println!("not an exact archetype; close matches:");
                for name in close {
                    println!("    {name}");
                }
            }
            return;
        };
        let cards = self.client.cards_by_subtype("archetype", &archetype);
        if cards.is_empty() {
            println!("no cards found for {archetype}");
            return;
        }
        println!("{} cards in {archetype}, first {}:", cards.len(), cards.len().min(20));
        for card in cards.iter().take(20) {
            println!("    {} ({})", card.name, card.card_type.name());
        }
    }

    fn art(&mut self, args: &[&str]) {
        if args.first().copied() == Some("set") {
            let set = self
                .session
                .as_ref()
                .and_then(|session| session.active_set())
                .cloned();
            match set {
                Some(set) => match self.client.set_art(&set.code) {
                    Some(path) => println!("{}", path.display()),
                    None => println!("no art available for {}", set.name),
                },
                None => println!("no active set"),
            }
            return;
        }
        let Some(index) = args.first().and_then(|token| parse_index(token)) else {
            println!("usage: art <card#> | art set");
            return;
        };
        let card = self
            .session
            .as_ref()
            .and_then(|session| session.pack().get(index))
            .cloned();
        match card {
            Some(card) => match self.client.card_art(card.id) {
                Some(path) => println!("{}", path.display()),
                None => println!("no art available for {}", card.name),
            },
            None => println!("no card at {}", index + 1),
        }
    }

    fn show_deck(&self) {
        let Some(session) = self.session.as_ref() else {
            println!("no draft running");
            return;
        };
        let deck = session.deck();
        for (label, cards) in [
            ("Main", &deck.main),
            ("Extra", &deck.extra),
            ("Side", &deck.side),
        ] {
            let breakdown = type_breakdown(cards);
            println!(
                "{label} deck: {} (monster {}, spell {}, trap {})",
                cards.len(),
                breakdown.monsters,
                breakdown.spells,
                breakdown.traps
            );
            for card in cards.iter() {
                println!("    {} [{}]", card.name, card.rarity);
            }
        }
        if !session.selections().is_empty() {
            println!("pending picks: {}", session.selections().len());
        }
    }

    fn show_status(&self) {
        let Some(session) = self.session.as_ref() else {
            println!("no draft running");
            return;
        };
        println!(
            "stage: {:?}, packs opened: {}/{}, picks left: {}, discard stages: {}/{}",
            session.stage(),
            session.total_packs(),
            session.rules().pack_max,
            session.picks_left(),
            session.discard_stages_done(),
            session.rules().discard_stages
        );
    }

    fn show_review(&self) {
        let Some(stage) = self
            .session
            .as_ref()
            .and_then(|session| session.discard_stage())
        else {
            println!("no discard stage open");
            return;
        };
        println!(
            "kept {}/{} (side {}/{})",
            stage.kept_total(),
            stage.deck_target,
            stage.kept(DeckSection::Side),
            stage.side_target
        );
        for section in [DeckSection::Main, DeckSection::Extra, DeckSection::Side] {
            println!("{}:", section.label());
            for (index, entry) in stage.entries(section).iter().enumerate() {
                let mark = if entry.marked { "x" } else { " " };
                println!("{mark}{:>3}. {}", index + 1, entry.card.name);
            }
        }
    }

    fn mark(&mut self, args: &[&str]) {
        let (Some(section), Some(index)) = (
            args.first().and_then(|token| parse_section(token)),
            args.get(1).and_then(|token| parse_index(token)),
        ) else {
            println!("usage: mark <m|e|s> <card#>");
            return;
        };
        match self
            .session
            .as_mut()
            .and_then(|session| session.discard_stage_mut())
        {
            Some(stage) => match stage.toggle_mark(section, index) {
                Ok(true) => println!("marked for discard"),
                Ok(false) => println!("kept"),
                Err(err) => println!("{err}"),
            },
            None => println!("no discard stage open"),
        }
    }

    fn move_card(&mut self, args: &[&str]) {
        let (Some(section), Some(index)) = (
            args.first().and_then(|token| parse_section(token)),
            args.get(1).and_then(|token| parse_index(token)),
        ) else {
            println!("usage: move <m|s> <card#>");
            return;
        };
        match self
            .session
            .as_mut()
            .and_then(|session| session.discard_stage_mut())
        {
            Some(stage) => match stage.move_card(section, index) {
                Ok(()) => println!("moved"),
                Err(err) => println!("{err}"),
            },
            None => println!("no discard stage open"),
        }
    }

    fn accept(&mut self) -> Result<()> {
        let progress = match self.session.as_mut() {
            Some(session) => session.accept_discard(&mut self.events),
            None => {
                println!("no draft running");
                return Ok(());
            }
        };
        match progress {
            Ok(Progress::Complete) => {
                self.autosave()?;
                println!("draft complete! 'export' writes the deck file");
            }
            Ok(_) => {
                self.autosave()?;
                println!("discard stage accepted, 'next' continues the draft");
            }
            Err(err) => {
                let message = self.friendly(err);
                println!("{message}");
            }
        }
        Ok(())
    }

    fn autosave(&mut self) -> Result<()> {
        let Some(session) = self.session.as_ref() else {
            return Ok(());
        };
        let stage = session.discard_stages_done();
        let name = sanitize_file_name(&session.deck().name);
        let dir = self.save_dir.join("autosave");
        fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
        let path = dir.join(format!("{name}_autosave_stage_{stage}.ydk"));
        fs::write(&path, session.export_ydk())
            .with_context(|| format!("write {}", path.display()))?;
        info!(path = %path.display(), "autosaved deck");
        Ok(())
    }

    fn export(&mut self, dir: Option<&str>) -> Result<()> {
        let Some(session) = self.session.as_ref() else {
            println!("no draft running");
            return Ok(());
        };
        if session.stage() != Stage::Complete {
            println!("note: the draft is not complete yet, exporting anyway");
        }
        let dir = dir
            .map(PathBuf::from)
            .unwrap_or_else(|| self.save_dir.clone());
        fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
        let path = dir.join(format!("{}.ydk", sanitize_file_name(&session.deck().name)));
        fs::write(&path, session.export_ydk())
            .with_context(|| format!("write {}", path.display()))?;
        println!("deck saved to {}", path.display());
        Ok(())
    }

    fn drain_events(&mut self) {
        for event in self.events.drain() {
            match event {
                Event::PackOpened {
                    set_name,
                    pack_number,
                    picks_left,
                } => println!("- pack {pack_number} from {set_name} ({picks_left} picks)"),
                Event::CardPicked { name, free } => {
                    if free {
                        println!("- picked {name} (extra deck, free)");
                    } else {
                        println!("- picked {name}");
                    }
                }
                Event::PickReturned { name } => println!("- returned {name}"),
                Event::SelectionCleared { count } => println!("- cleared {count} pick(s)"),
                Event::AssociatedAdded { name } => println!("- added associated {name}"),
                Event::SelectionsCommitted { main, extra } => {
                    println!("- committed {main} to main, {extra} to extra")
                }
                Event::DiscardStageStarted {
                    deck_target,
                    side_target,
                } => println!("- discard stage open (deck {deck_target}, side {side_target})"),
                Event::DiscardAccepted {
                    stage,
                    main,
                    extra,
                    side,
                } => println!("- stage {stage} done: main {main}, extra {extra}, side {side}"),
                Event::DraftCompleted { main, extra, side } => {
                    println!("- draft complete: main {main}, extra {extra}, side {side}")
                }
            }
        }
    }
}

enum LoopControl {
    Continue,
    Quit,
}

fn parse_index(token: &str) -> Option<usize> {
    token
        .parse::<usize>()
        .ok()
        .filter(|value| *value > 0)
        .map(|value| value - 1)
}

fn parse_section(token: &str) -> Option<DeckSection> {
    match token {
        "m" | "main" => Some(DeckSection::Main),
        "e" | "extra" => Some(DeckSection::Extra),
        "s" | "side" => Some(DeckSection::Side),
        _ => None,
    }
}

fn chrono_date(value: &str) -> Option<chrono::NaiveDate> {
    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_are_one_based() {
        assert_eq!(parse_index("1"), Some(0));
        assert_eq!(parse_index("12"), Some(11));
        assert_eq!(parse_index("0"), None);
        assert_eq!(parse_index("x"), None);
    }

    #[test]
    fn sections_parse_short_and_long() {
        assert_eq!(parse_section("m"), Some(DeckSection::Main));
        assert_eq!(parse_section("extra"), Some(DeckSection::Extra));
        assert_eq!(parse_section("s"), Some(DeckSection::Side));
        assert_eq!(parse_section("x"), None);
    }

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(sanitize_file_name("My Deck!"), "my_deck_");
        assert_eq!(sanitize_file_name("  plain-name "), "plain-name");
        assert_eq!(sanitize_file_name(""), "deck");
    }

    #[test]
    fn adjust_hints_point_both_ways() {
        assert_eq!(adjust_hint(14, 12), "remove 2 more card(s)");
        assert_eq!(adjust_hint(10, 12), "add 2 more card(s)");
    }

    #[test]
    fn options_parse_flags_and_values() {
        let args: Vec<String> = ["--seed", "42", "--cui", "--cache-dir", "/tmp/x"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let options = parse_options(&args);
        assert_eq!(options.seed, Some(42));
        assert!(options.cui);
        assert_eq!(options.cache_dir, Some(PathBuf::from("/tmp/x")));
        assert!(!options.help);
    }
}
