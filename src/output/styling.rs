use std::fmt::Display;

use console::{style, StyledObject};

/// Tool name in the banner.
pub fn brand(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).magenta().bold()
}

/// Secondary information: versions, labels, hints.
pub fn muted(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).dim()
}

/// Section titles on stderr.
pub fn heading(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright().underlined()
}

/// File system locations.
pub fn location(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).cyan()
}

pub fn pending(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright().yellow()
}

pub fn success(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright().green()
}

pub fn failure(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright().red()
}
