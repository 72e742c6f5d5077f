//! Interactive terminal session built on dialoguer prompts.

use colored::Colorize;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use tracing::info;

use crate::provider::ProviderError;
use crate::session::{Session, SessionError};
use crate::util::preview;

/// Characters of extracted text shown before the menu
const DISPLAY_PREVIEW_CHARS: usize = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Summarize,
    ChoosePrompt,
    EditPrompt,
    Email,
    NewUrl,
    Quit,
}

/// Run the interactive loop until the user quits
pub async fn run(mut session: Session) -> anyhow::Result<()> {
    let theme = ColorfulTheme::default();

    println!("{}", "🧠 Webpage Summarizer using LLMs".bold());
    println!(
        "{}\n",
        format!(
            "Provider: {} ({})",
            session.summarizer().model(),
            session.summarizer().kind()
        )
        .dimmed()
    );

    loop {
        let url: String = Input::with_theme(&theme)
            .with_prompt("Enter a webpage URL to summarize")
            .allow_empty(true)
            .interact_text()?;
        let url = url.trim();

        if url.is_empty() {
            println!(
                "{}",
                "Please enter a valid webpage URL to summarize.".yellow()
            );
            info!("no URL provided for summarization");
            continue;
        }

        println!("{}", "Fetching and parsing the page...".dimmed());
        match session.load_url(url).await {
            Ok(page) => {
                println!("\n{}", "Raw extracted content".bold().underline());
                println!("{}\n", preview(&page.text, DISPLAY_PREVIEW_CHARS));
            }
            Err(e) => {
                println!("{}\n", e.to_string().red());
                continue;
            }
        }

        if !page_menu(&mut session, &theme).await? {
            break;
        }
    }

    Ok(())
}

/// Menu for the current page. Returns `false` when the user wants to quit.
async fn page_menu(session: &mut Session, theme: &ColorfulTheme) -> anyhow::Result<bool> {
    loop {
        let actions = available_actions(session);
        let labels: Vec<String> = actions.iter().map(|a| action_label(session, *a)).collect();

        let choice = Select::with_theme(theme)
            .with_prompt("What next?")
            .items(&labels[..])
            .default(0)
            .interact()?;

        match actions[choice] {
            Action::Summarize => {
                println!("{}", "Generating summary...".dimmed());
                match session.summarize().await {
                    Ok(summary) => {
                        println!("\n{}", "Summary".bold().underline());
                        println!("{}\n", summary.text);
                    }
                    Err(e) => render_error(&e),
                }
            }
            Action::ChoosePrompt => choose_prompt(session, theme)?,
            Action::EditPrompt => {
                let current = match session.current_prompt() {
                    Ok(text) => text,
                    Err(e) => {
                        println!("{}", e.to_string().red());
                        continue;
                    }
                };
                let edited = edit::edit(&current)?;
                if edited.trim().is_empty() {
                    println!("{}", "Empty prompt ignored.".yellow());
                } else {
                    session.override_prompt(edited);
                    println!("{}", "Prompt updated for this session.".green());
                }
            }
            Action::Email => email_summary(session, theme).await?,
            Action::NewUrl => return Ok(true),
            Action::Quit => return Ok(false),
        }
    }
}

fn available_actions(session: &Session) -> Vec<Action> {
    let mut actions = vec![Action::Summarize];
    if session.prompts().names().len() > 1 {
        actions.push(Action::ChoosePrompt);
    }
    actions.push(Action::EditPrompt);
    if session.summary().is_some() && session.can_email() {
        actions.push(Action::Email);
    }
    actions.push(Action::NewUrl);
    actions.push(Action::Quit);
    actions
}

fn action_label(session: &Session, action: Action) -> String {
    match action {
        Action::Summarize => session.summarizer().label(),
        Action::ChoosePrompt => format!(
            "Choose prompt (current: {})",
            session.prompt_name().unwrap_or("default")
        ),
        Action::EditPrompt => "Edit prompt".to_string(),
        Action::Email => "Send summary by email".to_string(),
        Action::NewUrl => "Enter another URL".to_string(),
        Action::Quit => "Quit".to_string(),
    }
}

fn choose_prompt(session: &mut Session, theme: &ColorfulTheme) -> anyhow::Result<()> {
    let names: Vec<String> = session
        .prompts()
        .names()
        .into_iter()
        .map(str::to_string)
        .collect();
    let current = names
        .iter()
        .position(|n| Some(n.as_str()) == session.prompt_name())
        .unwrap_or(0);

    let choice = Select::with_theme(theme)
        .with_prompt("Prompt")
        .items(&names[..])
        .default(current)
        .interact()?;

    if let Err(e) = session.select_prompt(&names[choice]) {
        println!("{}", e.to_string().red());
    }
    Ok(())
}

async fn email_summary(session: &Session, theme: &ColorfulTheme) -> anyhow::Result<()> {
    let recipient: String = Input::with_theme(theme)
        .with_prompt("Recipient email")
        .interact_text()?;

    if !Confirm::with_theme(theme)
        .with_prompt(format!("Send the summary to {}?", recipient.trim()))
        .default(true)
        .interact()?
    {
        return Ok(());
    }

    match session.email(&recipient).await {
        Ok(()) => println!("{}", "Email sent.".green()),
        Err(e) => println!("{}", format!("Could not send email: {e}").red()),
    }
    Ok(())
}

fn render_error(error: &SessionError) {
    match error {
        SessionError::Provider(e @ ProviderError::RateLimited) => {
            println!("\n{}", "🚧 Oops!".yellow().bold());
            println!("{}", e.to_string().yellow());
            println!("{}\n", "Even AI needs a nap sometimes... 💤".dimmed());
        }
        other => println!("{}\n", other.to_string().red()),
    }
}
