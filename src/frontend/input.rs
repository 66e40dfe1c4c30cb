//! Keyboard mapping, kept free of any browser types so it can be tested natively.

/// Everything the player can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Service one wheel (the click).
    Service,
    /// Buy the next level of the upgrade at this catalog index.
    Buy(usize),
    /// Save now.
    Save,
}

/// Map a pressed character to a command.
pub fn command_for_key(c: char) -> Option<Command> {
    match c {
        'c' | 'C' | ' ' => Some(Command::Service),
        's' | 'S' => Some(Command::Save),
        '1'..='9' => {
            let idx = c.to_digit(10)? as usize - 1;
            Some(Command::Buy(idx))
        }
        _ => None,
    }
}
