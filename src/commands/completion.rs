/// Shell completion: full scripts via `clap_complete`, and the hidden
/// `complete` helper that lists candidates for a command path.
use std::io::Write;

use clap::CommandFactory;
use clap_complete::{Shell, generate};

use crate::cli::Cli;
use crate::cli::registry;
use crate::errors::RackError;

/// Run `rack completion <shell>`.
///
/// # Errors
///
/// Returns `RackError::Io` if the script cannot be written.
pub fn script(shell: Shell, out: &mut dyn Write) -> Result<(), RackError> {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "rack", out);
    out.flush()?;
    Ok(())
}

/// Run `rack complete <path...>`.
///
/// # Errors
///
/// Returns `RackError::Io` if the candidates cannot be written.
pub fn candidates(path: &[String], out: &mut dyn Write) -> Result<(), RackError> {
    let path: Vec<&str> = path.iter().map(String::as_str).collect();
    for candidate in registry::complete(&path) {
        writeln!(out, "{candidate}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::testing::{FakeCloud, run};

    #[test]
    fn test_complete_leaf_flags() {
        let cloud = FakeCloud::default();
        let (result, stdout) = run(&cloud, &["complete", "files", "container", "delete"]);
        result.unwrap();
        assert_eq!(stdout, "--name\n--purge\n");
        assert_eq!(cloud.state().connects, 0);
    }

    #[test]
    fn test_complete_group() {
        let (result, stdout) = run(&FakeCloud::default(), &["complete", "servers"]);
        result.unwrap();
        assert_eq!(stdout, "list\nget\n");
    }

    #[test]
    fn test_bash_script() {
        let (result, stdout) = run(&FakeCloud::default(), &["completion", "bash"]);
        result.unwrap();
        assert!(stdout.contains("rack"));
        assert!(stdout.contains("set-metadata"));
    }
}
