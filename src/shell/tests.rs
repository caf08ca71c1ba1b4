use std::path::PathBuf;

use crate::{
    inventory::Inventory,
    shell::{Command, Flow, ParseError, Shell},
};

/// Helper to run a script through a fresh shell and capture what it prints
fn run_script(script: &str) -> (Shell, String) {
    let mut shell = Shell::new(Inventory::with_current_year(2025), "> ");
    let mut output = Vec::new();
    assert!(shell.run(script.as_bytes(), &mut output).is_ok());
    (shell, String::from_utf8_lossy(&output).into_owned())
}

#[test]
fn test_parse_add() {
    let command = "add Star_Trek Gene_Roddenberry ISBN-1234 1965 10".parse::<Command>();
    assert_eq!(
        command,
        Ok(Command::Add {
            title: "Star_Trek".to_string(),
            author: "Gene_Roddenberry".to_string(),
            isbn: "ISBN-1234".to_string(),
            publication_year: 1965,
            copies: 10,
        })
    );
}

#[test]
fn test_parse_errors() {
    assert!(matches!("add Dune".parse::<Command>(), Err(ParseError::Usage(_))));
    assert_eq!(
        "add Dune Herbert ISBN-1 nineteen 3".parse::<Command>(),
        Err(ParseError::Number { field: "year", value: "nineteen".to_string() })
    );
    assert!(matches!("checkout".parse::<Command>(), Err(ParseError::Usage(_))));
    assert!(matches!("checkout a b".parse::<Command>(), Err(ParseError::Usage(_))));
    assert!(matches!("findByTitleAndAuthor Dune".parse::<Command>(), Err(ParseError::Usage(_))));
    assert_eq!("borrow x".parse::<Command>(), Err(ParseError::Unknown("borrow".to_string())));
}

#[test]
fn test_parse_find_joins_author_words() {
    assert_eq!(
        "findByTitleAndAuthor Dune Frank  Herbert".parse::<Command>(),
        Ok(Command::FindByTitleAndAuthor {
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
        })
    );
}

#[test]
fn test_parse_paths_and_simple_commands() {
    assert_eq!(
        "save out/catalog.txt".parse::<Command>(),
        Ok(Command::Save { path: PathBuf::from("out/catalog.txt") })
    );
    assert_eq!("load c.json".parse::<Command>(), Ok(Command::Load { path: PathBuf::from("c.json") }));
    assert_eq!("exit".parse::<Command>(), Ok(Command::Exit));
    assert_eq!("help".parse::<Command>(), Ok(Command::Help));
}

#[test]
fn test_session() {
    let (shell, output) = run_script(
        "add Dune Herbert ISBN-001 1965 2\n\
         checkout ISBN-001\n\
         list ISBN-001\n\
         return ISBN-001\n\
         return ISBN-001\n\
         findByTitleAndAuthor dune herbert\n\
         exit\n\
         checkout ISBN-001\n",
    );
    assert!(output.contains("Added 2 copies of Dune (ISBN ISBN-001). Total copies now 2."));
    assert!(output.contains("Book with ISBN ISBN-001 checked out successfully."));
    assert!(output.contains("Total copies: 2\nAvailable copies: 1\n"));
    assert!(output.contains("Book with ISBN ISBN-001 has been returned successfully."));
    assert!(output.contains("Error: no checked-out copies of the book with ISBN ISBN-001 to return"));
    assert!(output.contains("Number of Copies in Library: 2\nNumber of Copies Available: 2\n"));
    // Nothing after `exit` runs.
    assert_eq!(shell.inventory().list("ISBN-001").map(|c| c.available()), Ok(2));
}

#[test]
fn test_errors_do_not_stop_the_shell() {
    let (shell, output) = run_script(
        "frobnicate\n\
         checkout ISBN-999\n\
         add Dune Herbert ISBN-001 1965 0\n\
         add Dune Herbert ISBN-001 1965 1\n",
    );
    assert!(output.contains("Error: Unknown command \"frobnicate\""));
    assert!(output.contains("Error: book not found"));
    assert!(output.contains("Error: invalid copies"));
    assert_eq!(shell.inventory().len(), 1);
}

#[test]
fn test_end_of_input_ends_the_loop() {
    let (_, output) = run_script("help\n");
    assert!(output.starts_with("> Commands:"));
    assert!(output.ends_with("> \n"));
}

#[test]
fn test_execute_exit() {
    let mut shell = Shell::new(Inventory::with_current_year(2025), "> ");
    let mut output = Vec::new();
    assert_eq!(shell.execute(Command::Exit, &mut output).ok(), Some(Flow::Exit));
    assert!(output.is_empty());
}

#[test]
fn test_load_missing_file_keeps_catalog() {
    let (shell, output) = run_script(
        "add Dune Herbert ISBN-001 1965 1\n\
         load /nonexistent/dir/catalog.txt\n",
    );
    assert!(output.contains("Error: i/o error on /nonexistent/dir/catalog.txt"));
    assert_eq!(shell.inventory().len(), 1);
}
