//! PowerShell quoting.
//!
//! Every shell command string built by the workspace goes through this module.
//! Callers hand over structured argument lists; untrusted text is never
//! interpolated into a command string any other way.

/// PowerShell single-quote quoting.
///
/// PowerShell treats the typographic single quotes as quote characters too,
/// so they are doubled along with the ASCII one.
pub fn powershell(arg: &str) -> String {
    let mut out = String::with_capacity(arg.len() + 2);
    out.push('\'');
    for c in arg.chars() {
        if matches!(c, '\'' | '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}') {
            out.push(c);
        }
        out.push(c);
    }
    out.push('\'');
    out
}

/// Quote every element of `argv` and join them into one command.
///
/// The call operator is prepended, since a quoted string in command position
/// is otherwise evaluated as an expression.
pub fn command_line<S: AsRef<str>>(argv: &[S]) -> String {
    let quoted = argv
        .iter()
        .map(|a| powershell(a.as_ref()))
        .collect::<Vec<_>>()
        .join(" ");
    format!("& {quoted}")
}

/// Build `Get-Content <file> | <consumer...>`.
///
/// The file content is streamed unchanged, as UTF-8, into the consumer's stdin.
pub fn pipe_file_into<S: AsRef<str>>(file: &str, consumer: &[S]) -> String {
    format!(
        "$OutputEncoding = [System.Text.UTF8Encoding]::new($false); \
         Get-Content -Raw -Encoding UTF8 -LiteralPath {} | {}",
        powershell(file),
        command_line(consumer)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_powershell_doubles_quotes() {
        assert_eq!(powershell("plain"), "'plain'");
        assert_eq!(powershell("it's"), "'it''s'");
        assert_eq!(powershell("a\u{2019}b"), "'a\u{2019}\u{2019}b'");
        assert_eq!(powershell("$env:PATH; calc"), "'$env:PATH; calc'");
    }

    #[test]
    fn test_command_line() {
        let argv = ["wsl", "-e", "/home/u/.local/bin/fabric", "-sp", "x'y"];
        assert_eq!(
            command_line(&argv),
            "& 'wsl' '-e' '/home/u/.local/bin/fabric' '-sp' 'x''y'"
        );
    }

    #[test]
    fn test_pipe_file_into() {
        let cmd = pipe_file_into(r"C:\Temp\a.txt", &["wsl", "-e", "fabric"]);
        assert!(cmd.contains(r"-LiteralPath 'C:\Temp\a.txt' | & 'wsl' '-e' 'fabric'"));
        assert!(cmd.starts_with("$OutputEncoding"));
    }
}
