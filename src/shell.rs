//! Line-oriented command shell over an [`Inventory`].

use std::{
    fmt,
    io::{self, BufRead, Write},
    path::PathBuf,
    str::FromStr,
};

use colored::Colorize;
use thiserror::Error;
use tracing::debug_span;

use crate::{book::CatalogEntry, inventory::Inventory, persistence};

/// Usage of every command, printed by `help`
const HELP: &str = "\
Commands:
  add <title> <author> <isbn> <year> <copies>
  checkout <isbn>
  return <isbn>
  findByTitleAndAuthor <title> <author>
  list <isbn>
  save <path>
  load <path>
  help
  exit";

/// A parsed shell command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Catalogue copies of a book
    Add {
        /// Title of the book
        title: String,
        /// Author of the book
        author: String,
        /// Catalog key
        isbn: String,
        /// Year of publication
        publication_year: i32,
        /// Copies to add
        copies: i64,
    },
    /// Check out one copy
    Checkout {
        /// Catalog key
        isbn: String,
    },
    /// Return one copy
    Return {
        /// Catalog key
        isbn: String,
    },
    /// Look up a title by title and author
    FindByTitleAndAuthor {
        /// Title to match
        title: String,
        /// Author to match
        author: String,
    },
    /// Report total and available copies
    List {
        /// Catalog key
        isbn: String,
    },
    /// Save the catalog
    Save {
        /// Destination file
        path: PathBuf,
    },
    /// Replace the catalog with a file's contents
    Load {
        /// Source file
        path: PathBuf,
    },
    /// Print the command list
    Help,
    /// Leave the shell
    Exit,
}

/// Reasons a command line could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Wrong number of arguments
    #[error("Invalid input. Please use the format: {0}")]
    Usage(&'static str),
    /// A numeric argument did not parse
    #[error("Invalid {field}: {value:?} is not a whole number")]
    Number {
        /// Argument name
        field: &'static str,
        /// Text that was given
        value: String,
    },
    /// The first word is not a command
    #[error("Unknown command {0:?}. Type help for a list of commands.")]
    Unknown(String),
}

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&name, args)) = words.split_first() else {
            return Err(ParseError::Usage("<command> [arguments...]"));
        };
        match (name, args) {
            ("add", &[title, author, isbn, year, copies]) => Ok(Self::Add {
                title: title.to_string(),
                author: author.to_string(),
                isbn: isbn.to_string(),
                publication_year: parse_number("year", year)?,
                copies: parse_number("copies", copies)?,
            }),
            ("add", _) => Err(ParseError::Usage("add <title> <author> <isbn> <year> <copies>")),
            ("checkout", &[isbn]) => Ok(Self::Checkout { isbn: isbn.to_string() }),
            ("checkout", _) => Err(ParseError::Usage("checkout <isbn>")),
            ("return", &[isbn]) => Ok(Self::Return { isbn: isbn.to_string() }),
            ("return", _) => Err(ParseError::Usage("return <isbn>")),
            ("findByTitleAndAuthor", [title, author @ ..]) if !author.is_empty() => {
                Ok(Self::FindByTitleAndAuthor { title: (*title).to_string(), author: author.join(" ") })
            }
            ("findByTitleAndAuthor", _) => {
                Err(ParseError::Usage("findByTitleAndAuthor <title> <author>"))
            }
            ("list", &[isbn]) => Ok(Self::List { isbn: isbn.to_string() }),
            ("list", _) => Err(ParseError::Usage("list <isbn>")),
            ("save", &[path]) => Ok(Self::Save { path: PathBuf::from(path) }),
            ("save", _) => Err(ParseError::Usage("save <path>")),
            ("load", &[path]) => Ok(Self::Load { path: PathBuf::from(path) }),
            ("load", _) => Err(ParseError::Usage("load <path>")),
            ("help", _) => Ok(Self::Help),
            ("exit", _) => Ok(Self::Exit),
            (other, _) => Err(ParseError::Unknown(other.to_string())),
        }
    }
}

/// Parse a whole-number argument
fn parse_number<T: FromStr>(field: &'static str, value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::Number { field, value: value.to_string() })
}

impl Command {
    /// The command word
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Checkout { .. } => "checkout",
            Self::Return { .. } => "return",
            Self::FindByTitleAndAuthor { .. } => "findByTitleAndAuthor",
            Self::List { .. } => "list",
            Self::Save { .. } => "save",
            Self::Load { .. } => "load",
            Self::Help => "help",
            Self::Exit => "exit",
        }
    }
}

/// Whether the shell keeps reading after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next line
    Continue,
    /// Stop the loop
    Exit,
}

/// Interactive shell owning the inventory for the life of the process
pub struct Shell {
    /// The catalog being served
    inventory: Inventory,
    /// Text printed before each command
    prompt: String,
    /// Whether errors are highlighted
    color: bool,
}

impl fmt::Debug for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shell")
            .field("inventory", &self.inventory)
            .field("prompt", &self.prompt)
            .field("color", &self.color)
            .finish()
    }
}

impl Shell {
    /// Create a shell serving `inventory`
    #[must_use]
    pub fn new(inventory: Inventory, prompt: impl Into<String>) -> Self {
        Self { inventory, prompt: prompt.into(), color: false }
    }

    /// Highlight errors with color
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// The inventory being served
    #[must_use]
    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Mutable access to the inventory being served
    pub fn inventory_mut(&mut self) -> &mut Inventory {
        &mut self.inventory
    }

    /// Hand the inventory back
    #[must_use]
    pub fn into_inventory(self) -> Inventory {
        self.inventory
    }

    /// Read commands from `input` until `exit` or end of input
    ///
    /// # Errors
    ///
    /// Returns any error raised while reading `input` or writing `output`.
    /// Command failures are printed, not returned.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        let mut lines = input.lines();
        loop {
            write!(output, "{}", self.prompt)?;
            output.flush()?;
            let Some(line) = lines.next().transpose()? else {
                writeln!(output)?;
                return Ok(());
            };
            if line.trim().is_empty() {
                continue;
            }
            let flow = match line.parse::<Command>() {
                Ok(command) => self.execute(command, &mut output)?,
                Err(error) => {
                    self.print_error(&mut output, &error)?;
                    Flow::Continue
                }
            };
            if flow == Flow::Exit {
                return Ok(());
            }
        }
    }

    /// Run one command, printing its result to `output`
    ///
    /// # Errors
    ///
    /// Returns any error raised while writing to `output`.
    pub fn execute<W: Write>(&mut self, command: Command, output: &mut W) -> io::Result<Flow> {
        let _span = debug_span!("command", name = command.name()).entered();
        match command {
            Command::Add { title, author, isbn, publication_year, copies } => {
                match self.inventory.add(&title, &author, &isbn, publication_year, copies) {
                    Ok(counts) => writeln!(
                        output,
                        "Added {copies} copies of {title} (ISBN {isbn}). Total copies now {}.",
                        counts.total()
                    )?,
                    Err(error) => self.print_error(output, &error)?,
                }
            }
            Command::Checkout { isbn } => match self.inventory.checkout(&isbn) {
                Ok(_) => writeln!(output, "Book with ISBN {isbn} checked out successfully.")?,
                Err(error) => self.print_error(output, &error)?,
            },
            Command::Return { isbn } => match self.inventory.return_copy(&isbn) {
                Ok(_) => writeln!(output, "Book with ISBN {isbn} has been returned successfully.")?,
                Err(error) => self.print_error(output, &error)?,
            },
            Command::FindByTitleAndAuthor { title, author } => {
                match self.inventory.find_by_title_and_author(&title, &author) {
                    Ok(entry) => write_entry(output, entry)?,
                    Err(error) => self.print_error(output, &error)?,
                }
            }
            Command::List { isbn } => match self.inventory.list(&isbn) {
                Ok(counts) => {
                    writeln!(output, "Total copies: {}", counts.total())?;
                    writeln!(output, "Available copies: {}", counts.available())?;
                    writeln!(output, "{}.", counts.get_description())?;
                }
                Err(error) => self.print_error(output, &error)?,
            },
            Command::Save { path } => match persistence::save_to_file(&self.inventory, &path) {
                Ok(written) => {
                    writeln!(output, "Library saved successfully to {} ({written} books).", path.display())?;
                }
                Err(error) => self.print_error(output, &error)?,
            },
            Command::Load { path } => {
                match persistence::load_from_file(&mut self.inventory, &path) {
                    Ok(report) => {
                        writeln!(output, "Loaded {} books from {}.", report.loaded, path.display())?;
                        for rejected in &report.rejected {
                            self.print_error(output, rejected)?;
                        }
                    }
                    Err(error) => self.print_error(output, &error)?,
                }
            }
            Command::Help => writeln!(output, "{HELP}")?,
            Command::Exit => return Ok(Flow::Exit),
        }
        Ok(Flow::Continue)
    }

    /// Print an error line
    fn print_error<W: Write>(&self, output: &mut W, error: &dyn fmt::Display) -> io::Result<()> {
        let label = if self.color { "Error:".red().bold().to_string() } else { "Error:".to_string() };
        writeln!(output, "{label} {error}")
    }
}

/// Print the details of a found title
fn write_entry<W: Write>(output: &mut W, entry: CatalogEntry<'_>) -> io::Result<()> {
    writeln!(output, "Book has been found:")?;
    writeln!(output, "{}", entry.book)?;
    writeln!(output, "Number of Copies in Library: {}", entry.total_copies())?;
    writeln!(output, "Number of Copies Available: {}", entry.available_copies())
}

#[cfg(test)]
mod tests;
