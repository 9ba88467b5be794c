//! Line-oriented front end.
//!
//! One command per line on stdin:
//! - Game commands such as `go north`, `attack` or `equip 2`
//! - Lines starting with `#` are session commands (save, load, status, quit)
//!
//! Narrative is printed as-is. Machine-readable lines carry a bracketed
//! prefix such as `[STATUS]`, `[CHOICES]` or `[ERROR]`.

use eldoria_core::{
    Arrival, CombatAction, CombatPhase, CombatReport, Direction, Game, GameConfig, GameError,
    ItemId, PendingChoice, Response, SaveSlot, SubAction,
};
use std::io::{self, BufRead, Write};

/// A parsed game command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Go(Direction),
    Look,
    Talk(Option<String>),
    Search,
    Inventory,
    Equip(usize),
    Unequip(usize),
    Use(usize),
    Drop(usize),
    Attack,
    Defend,
    Magic,
    Item,
    Cast(usize),
    Drink(usize),
    Cancel,
    Flee,
}

/// Parse a game command. Item, spell and potion numbers are 1-based.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let mut parts = line.split_whitespace();
    let verb = parts.next().unwrap_or_default().to_lowercase();
    let rest: Vec<&str> = parts.collect();

    let number = |what: &str| -> Result<usize, String> {
        rest.first()
            .and_then(|n| n.parse::<usize>().ok())
            .filter(|n| *n > 0)
            .ok_or_else(|| format!("Usage: {verb} <{what} number>"))
    };

    let command = match verb.as_str() {
        "go" | "move" => {
            let dir = rest.first().ok_or("Usage: go <north|south|east|west>")?;
            Command::Go(dir.parse().map_err(|e: GameError| e.to_string())?)
        }
        "n" | "north" | "s" | "south" | "e" | "east" | "w" | "west" => {
            Command::Go(verb.parse().map_err(|e: GameError| e.to_string())?)
        }
        "look" | "l" => Command::Look,
        "talk" => Command::Talk((!rest.is_empty()).then(|| rest.join(" "))),
        "search" => Command::Search,
        "inventory" | "inv" | "i" => Command::Inventory,
        "equip" => Command::Equip(number("item")?),
        "unequip" => Command::Unequip(number("item")?),
        "use" => Command::Use(number("item")?),
        "drop" => Command::Drop(number("item")?),
        "attack" | "a" => Command::Attack,
        "defend" | "d" => Command::Defend,
        "magic" => Command::Magic,
        "item" => Command::Item,
        "cast" => Command::Cast(number("spell")?),
        "drink" => Command::Drink(number("potion")?),
        "cancel" => Command::Cancel,
        "flee" | "run" => Command::Flee,
        _ => return Err(format!("Unknown command '{verb}'. Type #help for help.")),
    };
    Ok(command)
}

/// Run the game until the player quits, stdin closes or the hero dies.
pub async fn run_headless(config: GameConfig, load: bool) -> Result<(), GameError> {
    let (mut game, arrival) = open_game(&config, load).await?;

    println!("=== Eldoria ===");
    print_help();
    println!();
    print_arrival(&arrival);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("Error reading input: {e}");
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix('#') {
            let parts: Vec<&str> = command.split_whitespace().collect();
            match parts.first().copied() {
                Some("quit") | Some("exit") => {
                    println!("Goodbye!");
                    break;
                }
                Some("save") => match game.save_to_slot().await {
                    Ok(_) => println!("[SAVED] Game saved to {}", config.save_path.display()),
                    Err(e) => {
                        tracing::warn!(error = %e, "save failed");
                        println!("[ERROR] Save failed: {e}");
                    }
                },
                Some("load") => match Game::load_from_slot(config.clone()).await {
                    Ok((loaded, arrival)) => {
                        game = loaded;
                        println!("[LOADED] Game loaded from {}", config.save_path.display());
                        print_arrival(&arrival);
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "load failed");
                        println!("[ERROR] Load failed: {e}");
                    }
                },
                Some("status") => print_status(&game),
                Some("help") => print_help(),
                _ => println!("[ERROR] Unknown command. Type #help for help."),
            }
            stdout.flush().ok();
            continue;
        }

        match parse_command(line) {
            Ok(command) => {
                if let Err(e) = execute(&mut game, command) {
                    println!("[ERROR] {e}");
                }
            }
            Err(message) => println!("[ERROR] {message}"),
        }
        stdout.flush().ok();

        if game.is_over() {
            println!("[GAME OVER]");
            break;
        }
    }

    Ok(())
}

/// Load the saved game when asked to, falling back to a New Game when the
/// slot is missing or unreadable.
async fn open_game(config: &GameConfig, load: bool) -> Result<(Game, Arrival), GameError> {
    if load {
        let slot = SaveSlot::new(&config.save_path);
        if !slot.exists().await {
            tracing::warn!(path = %slot.path().display(), "no save file to load");
            println!("[ERROR] No save file found. Starting a new game.");
        } else {
            match Game::load_from_slot(config.clone()).await {
                Ok(loaded) => return Ok(loaded),
                Err(e) => {
                    tracing::warn!(error = %e, "could not load save file");
                    println!("[ERROR] Load failed: {e}. Starting a new game.");
                }
            }
        }
    }
    Game::new_game(config.clone())
}

fn execute(game: &mut Game, command: Command) -> Result<(), GameError> {
    match command {
        Command::Go(direction) => print_arrival(&game.move_player(direction)?),
        Command::Look => {
            let view = game.describe_location()?;
            println!("--- {} ---", view.name);
            println!("{}", view.description);
            let exits: Vec<String> = view
                .exits
                .iter()
                .map(|(dir, _)| dir.to_string())
                .collect();
            println!("[EXITS] {}", exits.join(", "));
            if let Some(npc) = view.npc {
                println!("[NPC] {npc}");
            }
            if view.has_secret {
                println!("[HINT] Something may be hidden here.");
            }
        }
        Command::Talk(name) => {
            let name = match name {
                Some(name) => name,
                None => game
                    .describe_location()?
                    .npc
                    .ok_or_else(|| GameError::NpcNotHere("anyone".to_string()))?,
            };
            let conversation = game.talk_to_npc(&name)?;
            print_lines(&conversation.log);
        }
        Command::Search => {
            let outcome = game.search_area()?;
            print_lines(&outcome.log);
            println!("[STATUS] {}", outcome.stats);
        }
        Command::Inventory => {
            println!("[INVENTORY]");
            for (i, entry) in game.open_inventory().iter().enumerate() {
                println!("  {}) {} - {}", i + 1, entry.label(), entry.item.description);
            }
        }
        Command::Equip(n) => with_item(game, n, Game::equip_item)?,
        Command::Unequip(n) => with_item(game, n, Game::unequip_item)?,
        Command::Use(n) => with_item(game, n, Game::use_item)?,
        Command::Drop(n) => with_item(game, n, Game::drop_item)?,
        Command::Attack => print_report(&game.perform_combat_action(CombatAction::Attack, None)?),
        Command::Defend => print_report(&game.perform_combat_action(CombatAction::Defend, None)?),
        Command::Magic => print_report(&game.perform_combat_action(CombatAction::Magic, None)?),
        Command::Item => print_report(&game.perform_combat_action(CombatAction::UseItem, None)?),
        Command::Cast(n) => {
            let choice = SubAction::CastSpell(n - 1);
            let report = if pending(game) == Some(PendingChoice::Spell) {
                game.resolve_subaction(choice)?
            } else {
                game.perform_combat_action(CombatAction::Magic, Some(choice))?
            };
            print_report(&report);
        }
        Command::Drink(n) => {
            let Some(id) = game.player().potions().nth(n - 1).map(|item| item.id) else {
                println!("[ERROR] You have no potion #{n}.");
                return Ok(());
            };
            let choice = SubAction::UsePotion(id);
            let report = if pending(game) == Some(PendingChoice::Potion) {
                game.resolve_subaction(choice)?
            } else {
                game.perform_combat_action(CombatAction::UseItem, Some(choice))?
            };
            print_report(&report);
        }
        Command::Cancel => print_report(&game.cancel_subaction()?),
        Command::Flee => print_report(&game.perform_combat_action(CombatAction::Flee, None)?),
    }
    Ok(())
}

/// Apply an inventory action to the item listed at position `n`.
fn with_item(
    game: &mut Game,
    n: usize,
    action: fn(&mut Game, ItemId) -> Result<Response, GameError>,
) -> Result<(), GameError> {
    let Some(id) = game.player().inventory.get(n - 1).map(|item| item.id) else {
        println!("[ERROR] You have no item #{n}.");
        return Ok(());
    };
    print_response(&action(game, id)?);
    Ok(())
}

fn pending(game: &Game) -> Option<PendingChoice> {
    match game.encounter()?.phase() {
        CombatPhase::AwaitingSubaction(choice) => Some(choice),
        _ => None,
    }
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

fn print_arrival(arrival: &Arrival) {
    print_lines(&arrival.log);
    if arrival.encounter.is_some() {
        println!("[COMBAT] attack | defend | magic | item | flee");
    }
    println!("[STATUS] {}", arrival.stats);
}

fn print_response(response: &Response) {
    print_lines(&response.log);
    println!("[STATUS] {}", response.stats);
}

fn print_report(report: &CombatReport) {
    print_lines(&report.log);
    if !report.options.is_empty() {
        let choices: Vec<String> = report
            .options
            .iter()
            .enumerate()
            .map(|(i, option)| format!("{}) {}", i + 1, option.label))
            .collect();
        println!("[CHOICES] {}", choices.join("  "));
    }
    match &report.arrival {
        Some(arrival) => print_arrival(arrival),
        None => println!("[STATUS] {}", report.stats),
    }
}

fn print_status(game: &Game) {
    let player = game.player();
    println!("[STATUS]");
    println!("  Character: {} (level {})", player.name(), player.level);
    println!("  Location: {}", player.location);
    println!("  {}", game.stats());
    println!("  Attack: {} | Defense: {}", player.entity.attack, player.entity.defense);
    println!("  In Combat: {}", game.in_combat());
    if let Some(encounter) = game.encounter() {
        let enemy = &encounter.enemy.entity;
        println!("  Enemy: {} ({}/{} HP)", enemy.name, enemy.hp, enemy.max_hp);
    }
    for quest in player.quests.values() {
        let state = if quest.completed { "done" } else { "active" };
        println!("  Quest: {} [{state}]", quest.name);
    }
}

fn print_help() {
    println!("[HELP]");
    println!("  go <dir> | look | talk [npc] | search | inventory");
    println!("  equip <n> | unequip <n> | use <n> | drop <n>");
    println!("  attack | defend | magic | item | cast <n> | drink <n> | cancel | flee");
    println!("  #save | #load | #status | #help | #quit");
}
