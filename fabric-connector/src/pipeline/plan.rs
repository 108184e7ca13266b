//! Invocation plans.
//!
//! A plan is built fresh for every tool call by an
//! [`InvocationStrategy`](super::strategy::InvocationStrategy) and consumed by
//! a [`Launcher`](super::launcher::Launcher). Plans are never stored.

/// Flag that carries text inline on the fabric command line.
///
/// Always emitted as one `--text=<value>` argument so text starting with `-`
/// is never parsed as another flag.
pub const TEXT_FLAG: &str = "--text";

/// How a tool is reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Run `argv[0]` with the remaining arguments.
    Direct { argv: Vec<String> },
    /// Run `argv` through a compatibility-layer launcher such as `wsl -e`.
    Wrapped { wrapper: Vec<String>, argv: Vec<String> },
    /// Write `input` to a staging file and hand it to `argv` as stdin.
    StagedStdin { argv: Vec<String>, input: String },
    /// Write `input` to a staging file and run
    /// `shell <Get-Content staging file | consumer...>` under PowerShell.
    ShellPiped {
        shell: Vec<String>,
        consumer: Vec<String>,
        input: String,
    },
}

/// A resolved, platform-specific description of one tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationPlan {
    /// Tool name used in logs and errors.
    pub tool: String,
    pub invocation: Invocation,
}

impl InvocationPlan {
    pub fn direct(tool: impl Into<String>, argv: Vec<String>) -> Self {
        Self {
            tool: tool.into(),
            invocation: Invocation::Direct { argv },
        }
    }

    pub fn wrapped(tool: impl Into<String>, wrapper: Vec<String>, argv: Vec<String>) -> Self {
        Self {
            tool: tool.into(),
            invocation: Invocation::Wrapped { wrapper, argv },
        }
    }

    pub fn staged_stdin(tool: impl Into<String>, argv: Vec<String>, input: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            invocation: Invocation::StagedStdin {
                argv,
                input: input.into(),
            },
        }
    }

    pub fn shell_piped(
        tool: impl Into<String>,
        shell: Vec<String>,
        consumer: Vec<String>,
        input: impl Into<String>,
    ) -> Self {
        Self {
            tool: tool.into(),
            invocation: Invocation::ShellPiped {
                shell,
                consumer,
                input: input.into(),
            },
        }
    }

    /// Whether this plan needs a staging file.
    pub fn needs_staging(&self) -> bool {
        matches!(
            self.invocation,
            Invocation::StagedStdin { .. } | Invocation::ShellPiped { .. }
        )
    }

    /// The text this plan feeds to the tool, staged or inline.
    pub fn text_payload(&self) -> Option<&str> {
        match &self.invocation {
            Invocation::StagedStdin { input, .. } | Invocation::ShellPiped { input, .. } => {
                Some(input)
            }
            Invocation::Direct { argv } | Invocation::Wrapped { argv, .. } => argv
                .iter()
                .find_map(|a| a.strip_prefix(TEXT_FLAG)?.strip_prefix('=')),
        }
    }

    /// Tool arguments without any wrapper or shell.
    pub fn tool_argv(&self) -> &[String] {
        match &self.invocation {
            Invocation::Direct { argv }
            | Invocation::Wrapped { argv, .. }
            | Invocation::StagedStdin { argv, .. } => argv,
            Invocation::ShellPiped { consumer, .. } => consumer,
        }
    }
}
