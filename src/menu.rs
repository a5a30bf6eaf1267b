//! Interactive Shell
//!
//! Two loops: an anonymous menu (create account, log in, exit) and a
//! per-session menu listing only the operations the session's role may
//! run. Recoverable operation errors print and return to the menu;
//! backend and terminal faults propagate out.

use tracing::warn;

use crate::backend::Backend;
use crate::error::Result;
use crate::ops::{OpContext, OpOutcome, Operation};
use crate::prompt::Prompt;
use crate::session::{self, CreateAccountOutcome, LoginOutcome, Session};

/// Read a numeric menu choice, re-prompting on unparsable input.
fn read_choice(prompt: &mut dyn Prompt) -> Result<u32> {
    loop {
        let raw = prompt.line("choice")?;
        match raw.trim().parse() {
            Ok(choice) => return Ok(choice),
            Err(_) => println!("Please enter a number."),
        }
    }
}

fn create_account(backend: &dyn Backend, prompt: &mut dyn Prompt) -> Result<()> {
    let name = prompt.line("name")?;
    let password = prompt.line("password")?;
    let latitude = prompt.line("latitude (0 to 100)")?;
    let longitude = prompt.line("longitude (0 to 100)")?;

    match session::create_account(backend, &name, &password, &latitude, &longitude)? {
        CreateAccountOutcome::Created => println!("Account created. You can now log in."),
        CreateAccountOutcome::UsernameTaken => println!("That name is already taken."),
        CreateAccountOutcome::InvalidInput(message) => println!("{message}"),
    }
    Ok(())
}

fn login(backend: &dyn Backend, prompt: &mut dyn Prompt) -> Result<Option<Session>> {
    let name = prompt.line("name")?;
    let password = prompt.line("password")?;

    match session::login(backend, &name, &password)? {
        LoginOutcome::LoggedIn(session) => Ok(Some(session)),
        LoginOutcome::InvalidUsername => {
            println!("No account with that name.");
            Ok(None)
        }
        LoginOutcome::WrongPassword => {
            println!("Incorrect password.");
            Ok(None)
        }
    }
}

/// One logged-in session; returns when the user logs out or deletes
/// their account.
fn session_loop(
    backend: &dyn Backend,
    prompt: &mut dyn Prompt,
    session: &Session,
) -> Result<()> {
    loop {
        println!("\nWelcome, {} ({})", session.username, session.role);
        for op in Operation::ALL {
            if op.gate().admits(session.role) {
                println!("{}. {}", op.code(), op.label());
            }
        }
        println!("0. Log Out");

        let choice = read_choice(prompt)?;
        if choice == 0 {
            return Ok(());
        }

        let op = match Operation::from_code(choice) {
            Some(op) if op.gate().admits(session.role) => op,
            _ => {
                println!("Unrecognized option.");
                continue;
            }
        };

        let mut ctx = OpContext { backend, session, prompt: &mut *prompt };
        match op.run(&mut ctx) {
            Ok(OpOutcome::Table(view)) => print!("{}", view.render()),
            Ok(OpOutcome::Message(message)) => println!("{message}"),
            Ok(OpOutcome::AccountDeleted) => {
                println!("Account deleted.");
                return Ok(());
            }
            Err(e) if e.is_recoverable() => {
                warn!(code = e.error_code(), "operation failed");
                println!("{}", e.message());
            }
            Err(e) => return Err(e),
        }
    }
}

/// Run the shell until the operator exits.
pub fn run(backend: &dyn Backend, prompt: &mut dyn Prompt) -> Result<()> {
    println!("Welcome to the marketplace.");
    loop {
        println!("\n1. Create account");
        println!("2. Log in");
        println!("9. Exit");

        match read_choice(prompt)? {
            1 => create_account(backend, prompt)?,
            2 => {
                if let Some(session) = login(backend, prompt)? {
                    session_loop(backend, prompt, &session)?;
                }
            }
            9 => return Ok(()),
            _ => println!("Unrecognized option."),
        }
    }
}
