mod cli;

use anyhow::{Context, Result};
use carvault::{CompareToggle, MarketDelta, Session, SessionPage, dollars};
use clap::Parser;
use cli::Cli;
use listing_index::{Listing, Persona, SortMode, Tag};
use std::io::Write;
use std::str::FromStr;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut session = Session::load(&cli.data)?;
    if let Err(err) = session.restore_prefs_from(&cli.prefs) {
        eprintln!("Starting fresh (no usable prefs: {err:#})");
    }

    let summary = session.apply();
    println!(
        "{} listings loaded, {} matched. Type a search, /help for commands, /bye to quit.",
        summary.total, summary.matched
    );
    print_page(&mut session);

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    loop {
        print!("> ");
        stdout.flush().context("stdout is closed")?;
        let mut line = String::new();
        if stdin.read_line(&mut line).context("stdin is closed")? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "/bye" {
            break;
        }

        match run_command(&mut session, line) {
            Ok(true) => print_page(&mut session),
            Ok(false) => {}
            Err(err) => eprintln!("{err:#}"),
        }
    }

    session
        .save_prefs_to(&cli.prefs)
        .context("Failed to save prefs")?;
    Ok(())
}

/// Runs one REPL line; returns whether a fresh page should be printed.
fn run_command(session: &mut Session, line: &str) -> Result<bool> {
    let Some(command) = line.strip_prefix('/') else {
        // Free text is a search.
        session.filter.query = line.to_string();
        report_apply(session);
        return Ok(true);
    };

    let (name, arg) = match command.split_once(' ') {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    match name {
        "help" => {
            println!(
                "commands: /next /persona <p> /sort <mode> /make <m> /model <m> /year <y>\n\
                 /price <min-max> /body <b> /tag <all|great|electric|hybrid> /clear\n\
                 /fav [id] /cmp [id] /brief <id> /bye; any other text is a search"
            );
            Ok(false)
        }
        "next" => Ok(true),
        "persona" => {
            session.set_persona(Persona::from_str(arg)?);
            report_apply(session);
            Ok(true)
        }
        "sort" => {
            session.filter.sort = SortMode::from_str(arg)?;
            report_apply(session);
            Ok(true)
        }
        "make" => {
            session.filter.make = non_empty(arg);
            session.filter.model = None;
            if let Some(make) = &session.filter.make {
                let models = session.models_for(make);
                if !models.is_empty() {
                    println!("models: {}", models.join(", "));
                }
            }
            report_apply(session);
            Ok(true)
        }
        "model" => {
            session.filter.model = non_empty(arg);
            report_apply(session);
            Ok(true)
        }
        "year" => {
            session.filter.year = if arg.is_empty() {
                None
            } else {
                Some(arg.parse().context("year must be an integer")?)
            };
            report_apply(session);
            Ok(true)
        }
        "price" => {
            session.filter.price_bucket = non_empty(arg);
            report_apply(session);
            Ok(true)
        }
        "body" => {
            session.filter.body = non_empty(arg);
            report_apply(session);
            Ok(true)
        }
        "tag" => {
            session.filter.tag = match arg {
                "" | "all" => Tag::All,
                "great" => Tag::GreatDeal,
                "electric" => Tag::Electric,
                "hybrid" => Tag::Hybrid,
                other => anyhow::bail!("unknown tag: {other:?}"),
            };
            report_apply(session);
            Ok(true)
        }
        "clear" => {
            session.clear_filters();
            report_apply(session);
            Ok(true)
        }
        "fav" => {
            if arg.is_empty() {
                print_rows(&session.saved_view(), "No saved cars yet.");
            } else if session.toggle_favorite(arg) {
                println!("Saved {arg}.");
            } else {
                println!("Removed {arg} from saved.");
            }
            Ok(false)
        }
        "cmp" => {
            if arg.is_empty() {
                print_rows(&session.compare_view(), "No cars in the compare tray.");
            } else {
                match session.toggle_compare(arg) {
                    CompareToggle::Added => println!("Comparing {arg}."),
                    CompareToggle::Removed => println!("Removed {arg} from compare."),
                    CompareToggle::Full => println!("Compare tray is full (3 cars)."),
                }
            }
            Ok(false)
        }
        "brief" => {
            print_brief(session, arg);
            Ok(false)
        }
        other => anyhow::bail!("unknown command: /{other}"),
    }
}

fn report_apply(session: &mut Session) {
    let summary = session.apply();
    println!("{} of {} listings match.", summary.matched, summary.total);
}

fn print_page(session: &mut Session) {
    let matched = session.matched();
    let start = session.shown();
    let page = match session.next_page() {
        SessionPage::Page(page) => page,
        SessionPage::Busy => return,
        SessionPage::Exhausted => {
            println!("No more results.");
            return;
        }
    };

    for (offset, entry) in page.iter().enumerate() {
        let listing = entry.listing;
        let match_note = entry
            .persona_score
            .map(|score| format!(" match {score}"))
            .unwrap_or_default();
        println!(
            "[{}] {} {} • {} • {}k mi • value {}{match_note}  (id {})",
            start + offset,
            listing.title(),
            listing.trim,
            dollars(listing.price),
            (listing.mileage / 1000.0).round(),
            entry.value_score,
            listing.id,
        );
    }
    let shown = start + page.len();
    drop(page);
    println!("Showing {shown} of {matched}.");
    session.page_done();
}

fn non_empty(arg: &str) -> Option<String> {
    if arg.is_empty() {
        None
    } else {
        Some(arg.to_string())
    }
}

fn print_rows(rows: &[&Listing], empty_note: &str) {
    if rows.is_empty() {
        println!("{empty_note}");
        return;
    }
    for listing in rows {
        println!(
            "- {} • {} • {}k mi  (id {})",
            listing.title(),
            dollars(listing.price),
            (listing.mileage / 1000.0).round(),
            listing.id,
        );
    }
}

fn print_brief(session: &Session, id: &str) {
    let Some(brief) = session.brief(id) else {
        println!("No listing with id {id:?}.");
        return;
    };

    println!("{} - {}", brief.title, brief.deal_rating_label);
    let match_note = brief
        .persona_score
        .map(|score| format!(", match {score}"))
        .unwrap_or_default();
    println!("value {}{match_note}, confidence {:?}", brief.value_score, brief.confidence);
    let monthly = brief
        .monthly_payment
        .map(|payment| format!(" • {}/mo", dollars(payment)))
        .unwrap_or_default();
    println!("{} down{monthly}", dollars(brief.down_payment));
    match brief.market_delta {
        MarketDelta::Below(amount) => println!("{} below market", dollars(amount)),
        MarketDelta::Above(amount) => println!("{} above market", dollars(amount)),
        MarketDelta::Unavailable => println!("Market delta unavailable"),
    }
    if !brief.pros.is_empty() {
        println!("Pros: {}", brief.pros.join(" • "));
    }
    if !brief.cons.is_empty() {
        println!("Cons: {}", brief.cons.join(" • "));
    }
    for flag in &brief.flags {
        println!("! {flag}");
    }
}
