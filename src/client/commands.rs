//! The local stdin command grammar: exactly four commands, matched exactly
//! rather than by prefix, so `close connection foo` is rejected instead of
//! silently matching `close connection`.

use std::fmt;

use crate::protocol::EquipmentId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ListEquipment,
    RequestInformation(EquipmentId),
    CloseConnection,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCommand(pub String);

impl fmt::Display for UnknownCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized command: '{}'", self.0)
    }
}

impl std::error::Error for UnknownCommand {}

const REQUEST_INFO_PREFIX: &str = "request information from ";

impl Command {
    pub fn parse(line: &str) -> Result<Self, UnknownCommand> {
        let line = line.trim();
        match line {
            "list equipment" => Ok(Command::ListEquipment),
            "close connection" => Ok(Command::CloseConnection),
            "quit" => Ok(Command::Quit),
            _ => {
                if let Some(arg) = line.strip_prefix(REQUEST_INFO_PREFIX) {
                    EquipmentId::parse(arg)
                        .map(Command::RequestInformation)
                        .map_err(|_| UnknownCommand(line.to_string()))
                } else {
                    Err(UnknownCommand(line.to_string()))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_exact_commands() {
        assert_eq!(Command::parse("list equipment").unwrap(), Command::ListEquipment);
        assert_eq!(Command::parse("close connection").unwrap(), Command::CloseConnection);
        assert_eq!(Command::parse("quit").unwrap(), Command::Quit);
    }

    #[test]
    fn parses_request_information_with_id() {
        assert_eq!(
            Command::parse("request information from 02").unwrap(),
            Command::RequestInformation(EquipmentId::new(2).unwrap())
        );
    }

    #[test]
    fn rejects_prefix_matches_that_are_not_exact() {
        assert!(Command::parse("close connection now").is_err());
        assert!(Command::parse("quitter").is_err());
        assert!(Command::parse("list equipment please").is_err());
    }

    #[test]
    fn rejects_malformed_request_information_argument() {
        assert!(Command::parse("request information from 1").is_err());
        assert!(Command::parse("request information from abc").is_err());
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(Command::parse("  quit  ").unwrap(), Command::Quit);
    }
}
