use std::io;
use std::io::Write;

use rpassword::read_password;

pub fn input(prompt: &str) -> io::Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?; // show the prompt before blocking on stdin

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

pub fn input_password(prompt: &str) -> io::Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;
    Ok(read_password()?.trim().to_string())
}

/// Asks a yes/no question, defaulting to no.
pub fn confirm(prompt: &str) -> io::Result<bool> {
    let answer = input(&format!("{} [y/N] ", prompt))?;
    Ok(matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
}
