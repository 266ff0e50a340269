//! The portfolio shell: a read-eval-print loop over a static directory
//! tree, with a closed command set, tab completion, and a linear command
//! history separate from the displayed transcript.
//!
//! Invariant: `cwd` is always a key of `DIRECTORY_TREE`. All commands
//! append exactly one `(prompt line, output)` pair to the transcript
//! except `clear`, which replaces it with the welcome entry.

use std::sync::mpsc;

use crate::fingerprint;
use crate::viewport::SectionId;

pub const ROOT_DIR: &str = "home";

pub const WELCOME: &str = "Welcome to the portfolio shell. Type \"help\" for available commands.\n\
Try \"cd about\" or \"cd projects\" to navigate sections.";

const FINGERPRINT_PLACEHOLDER: &str = "Collecting environment snapshot...";

/// Directory name -> children, declaration order preserved. A child that
/// is itself a key of this table is a directory; everything else is a file.
const DIRECTORY_TREE: &[(&str, &[&str])] = &[
    ("home", &["about", "projects", "contact", "cv.pdf"]),
    ("about", &["skills", "experience.txt", "bio.txt"]),
    ("projects", &["project1.md", "project2.md", "project3.md"]),
    ("skills", &["frontend.txt", "backend.txt", "tools.txt"]),
    ("contact", &["info.txt"]),
];

/// Fixed parent table; not a general tree walk.
const PARENT_DIRS: &[(&str, &str)] = &[
    ("about", "home"),
    ("projects", "home"),
    ("contact", "home"),
    ("skills", "about"),
    ("home", "home"),
];

struct CommandSpec {
    name: &'static str,
    description: &'static str,
    usage: &'static str,
}

const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "help",
        description: "Display available commands",
        usage: "help [command]",
    },
    CommandSpec {
        name: "game",
        description: "Launch the jump game",
        usage: "game",
    },
    CommandSpec {
        name: "cat",
        description: "Display file contents",
        usage: "cat <filename>",
    },
    CommandSpec {
        name: "about",
        description: "Learn about what this host can read from your environment",
        usage: "about [-me|--help]",
    },
    CommandSpec {
        name: "ls",
        description: "List directory contents",
        usage: "ls [directory]",
    },
    CommandSpec {
        name: "cd",
        description: "Change the current directory",
        usage: "cd <directory>",
    },
    CommandSpec {
        name: "clear",
        description: "Clear the terminal screen",
        usage: "clear",
    },
];

fn tree_children(dir: &str) -> Option<&'static [&'static str]> {
    DIRECTORY_TREE
        .iter()
        .find_map(|(name, children)| (*name == dir).then_some(*children))
}

fn is_directory(name: &str) -> bool {
    tree_children(name).is_some()
}

fn parent_of(dir: &str) -> Option<&'static str> {
    PARENT_DIRS
        .iter()
        .find_map(|(child, parent)| (*child == dir).then_some(*parent))
}

fn directory_names() -> Vec<&'static str> {
    DIRECTORY_TREE.iter().map(|(name, _)| *name).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellEntry {
    pub input: String,
    pub output: String,
}

/// Cross-component effects a command can request from the host app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellEffect {
    None,
    LaunchGame,
    ScrollTo(SectionId),
}

enum Outcome {
    Text(String),
    Clear,
    ChangeDir {
        dir: &'static str,
        text: String,
        scroll: Option<SectionId>,
    },
    LaunchGame(String),
    Fingerprint,
}

pub struct Shell {
    pub cwd: &'static str,
    pub entries: Vec<ShellEntry>,
    pub input: String,
    command_history: Vec<String>,
    history_cursor: Option<usize>,
    pending: Vec<(usize, mpsc::Receiver<String>)>,
}

impl Shell {
    pub fn new() -> Self {
        Self {
            cwd: ROOT_DIR,
            entries: vec![ShellEntry {
                input: String::new(),
                output: WELCOME.to_owned(),
            }],
            input: String::new(),
            command_history: Vec::new(),
            history_cursor: None,
            pending: Vec::new(),
        }
    }

    pub fn type_char(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    /// Submit the current input line. Blank input is dropped silently.
    pub fn submit(&mut self) -> ShellEffect {
        let line = std::mem::take(&mut self.input);
        if line.trim().is_empty() {
            return ShellEffect::None;
        }
        self.command_history.push(line.clone());
        self.history_cursor = None;
        self.run_line(&line)
    }

    pub fn run_line(&mut self, line: &str) -> ShellEffect {
        let prompt = format!("{}$ {}", self.cwd, line);
        let mut parts = line.trim().split_whitespace();
        let command = parts.next().unwrap_or("").to_lowercase();
        let args: Vec<&str> = parts.collect();

        match self.execute(&command, &args) {
            Outcome::Text(output) => {
                self.entries.push(ShellEntry { input: prompt, output });
                ShellEffect::None
            }
            Outcome::Clear => {
                self.clear_transcript();
                ShellEffect::None
            }
            Outcome::ChangeDir { dir, text, scroll } => {
                self.cwd = dir;
                self.entries.push(ShellEntry { input: prompt, output: text });
                scroll.map_or(ShellEffect::None, ShellEffect::ScrollTo)
            }
            Outcome::LaunchGame(output) => {
                self.entries.push(ShellEntry { input: prompt, output });
                ShellEffect::LaunchGame
            }
            Outcome::Fingerprint => {
                self.entries.push(ShellEntry {
                    input: prompt,
                    output: FINGERPRINT_PLACEHOLDER.to_owned(),
                });
                let index = self.entries.len() - 1;
                self.pending.push((index, fingerprint::spawn_report()));
                ShellEffect::None
            }
        }
    }

    fn clear_transcript(&mut self) {
        self.entries = vec![ShellEntry {
            input: String::new(),
            output: WELCOME.to_owned(),
        }];
        // Transcript indices are invalid now; orphan any in-flight reports.
        self.pending.clear();
    }

    /// Fill in any fingerprint reports that resolved since the last frame.
    /// Reports land on the entry that requested them, so rapid re-invocation
    /// can resolve out of order without clobbering another entry.
    pub fn poll_pending(&mut self) {
        let entries = &mut self.entries;
        self.pending.retain(|(index, receiver)| match receiver.try_recv() {
            Ok(report) => {
                if let Some(entry) = entries.get_mut(*index) {
                    entry.output = report;
                }
                false
            }
            Err(mpsc::TryRecvError::Empty) => true,
            Err(mpsc::TryRecvError::Disconnected) => {
                if let Some(entry) = entries.get_mut(*index) {
                    entry.output = "Failed to collect snapshot.".to_owned();
                }
                false
            }
        });
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Tab completion for `cd`/`cat`/`ls` with at most one argument:
    /// matches among the current directory's children. A unique match
    /// fills the input; several print a listing; none is a no-op.
    pub fn complete(&mut self) {
        let line = self.input.clone();
        let mut parts = line.trim().split_whitespace();
        let Some(command) = parts.next() else {
            return;
        };
        let partial = parts.next().unwrap_or("");
        if parts.next().is_some() {
            return;
        }
        if !matches!(command, "cd" | "cat" | "ls") {
            return;
        }

        let Some(children) = tree_children(self.cwd) else {
            return;
        };
        let matches: Vec<&str> = children
            .iter()
            .copied()
            .filter(|child| child.starts_with(partial))
            .collect();
        match matches.len() {
            0 => {}
            1 => self.input = format!("{} {}", command, matches[0]),
            _ => self.entries.push(ShellEntry {
                input: format!("{}$ {}", self.cwd, line),
                output: matches.join("  "),
            }),
        }
    }

    /// Arrow-up: walk back through the command history, clamped at the
    /// oldest entry.
    pub fn history_prev(&mut self) {
        if self.command_history.is_empty() {
            return;
        }
        let next = match self.history_cursor {
            None => self.command_history.len() - 1,
            Some(index) => index.saturating_sub(1),
        };
        self.history_cursor = Some(next);
        self.input = self.command_history[next].clone();
    }

    /// Arrow-down: walk forward; past the newest entry the input clears.
    pub fn history_next(&mut self) {
        let Some(index) = self.history_cursor else {
            return;
        };
        let next = index + 1;
        if next >= self.command_history.len() {
            self.history_cursor = None;
            self.input.clear();
        } else {
            self.history_cursor = Some(next);
            self.input = self.command_history[next].clone();
        }
    }

    /// Keep the prompt's directory in step with the scrolled-to section.
    pub fn follow_scroll(&mut self, scroll_y: f32, active: SectionId) {
        if scroll_y < 4.0 {
            self.cwd = ROOT_DIR;
            return;
        }
        if let Some(dir) = directory_names()
            .into_iter()
            .find(|name| *name == active.as_str())
        {
            self.cwd = dir;
        }
    }

    fn execute(&mut self, command: &str, args: &[&str]) -> Outcome {
        match command {
            "help" => Outcome::Text(help_output(args)),
            "game" => Outcome::LaunchGame("Launching game...".to_owned()),
            "cat" => Outcome::Text(cat_output(args)),
            "about" => {
                if args.contains(&"--help") {
                    Outcome::Text(ABOUT_HELP.to_owned())
                } else if args.contains(&"-me") {
                    Outcome::Fingerprint
                } else {
                    Outcome::Text("What I know about you (collected in real time):".to_owned())
                }
            }
            "ls" => Outcome::Text(ls_output(args, self.cwd)),
            "cd" => self.cd_outcome(args),
            "clear" => Outcome::Clear,
            other => Outcome::Text(format!(
                "Command not found: {other}. Type 'help' for available commands."
            )),
        }
    }

    fn cd_outcome(&mut self, args: &[&str]) -> Outcome {
        if args.contains(&"--help") {
            return Outcome::Text(format!(
                "cd: Change the current directory\nUsage: cd <directory>\n\n\
                 Options:\n  --help    Display this help message\n\n\
                 Examples:\n  cd projects     Change to projects directory\n  \
                 cd about        Change to about directory\n  \
                 cd home         Change to home directory\n\n\
                 Available directories: {}",
                directory_names().join(", ")
            ));
        }
        let Some(target) = args.first() else {
            return Outcome::Text(
                "cd: missing directory argument. Type \"cd --help\" for usage.".to_owned(),
            );
        };

        if *target == ".." {
            return match parent_of(self.cwd) {
                Some(parent) if parent != self.cwd => Outcome::ChangeDir {
                    dir: parent,
                    text: format!("Changed directory to {parent}"),
                    scroll: None,
                },
                _ => Outcome::Text("cd: already at root directory".to_owned()),
            };
        }

        match DIRECTORY_TREE
            .iter()
            .find(|(name, _)| name == target)
            .map(|(name, _)| *name)
        {
            Some(dir) => Outcome::ChangeDir {
                dir,
                text: format!("Changed directory to {dir}"),
                scroll: SectionId::from_keyword(dir),
            },
            None => Outcome::Text(format!("cd: {target}: No such directory")),
        }
    }
}

impl Default for Shell {
    fn default() -> Self {
        Self::new()
    }
}

fn help_output(args: &[&str]) -> String {
    if let Some(name) = args.first() {
        return match COMMANDS.iter().find(|c| c.name == *name) {
            Some(spec) => format!("{}: {}\nUsage: {}", spec.name, spec.description, spec.usage),
            None => format!("Command '{name}' not found. Type 'help' for available commands."),
        };
    }
    "Available commands:\n\
  ls [--help]      - List directory contents\n\
  cd [--help]      - Change directory\n\
  cat [--help]     - Display file contents\n\
  about [--help]   - Learn about environment data collection\n\
  game             - Launch jump game\n\
  help [command]   - Show help for commands\n\
  clear            - Clear terminal screen\n\n\
Type 'command --help' for more information about a specific command."
        .to_owned()
}

fn ls_output(args: &[&str], cwd: &str) -> String {
    if args.contains(&"--help") {
        return "ls: List directory contents\nUsage: ls [directory]\n\n\
                Options:\n  --help    Display this help message\n\n\
                Examples:\n  ls              List current directory\n  \
                ls projects     List contents of projects directory"
            .to_owned();
    }

    let dir = args.first().copied().unwrap_or(cwd);
    let Some(children) = tree_children(dir) else {
        return format!("ls: cannot access '{dir}': No such directory");
    };

    let (directories, files): (Vec<&str>, Vec<&str>) = children
        .iter()
        .copied()
        .partition(|child| is_directory(child));

    let mut output = String::new();
    if !directories.is_empty() {
        output.push_str(&directories.join("  "));
    }
    if !files.is_empty() {
        if !directories.is_empty() {
            output.push('\n');
        }
        output.push_str(&files.join("  "));
    }
    if output.is_empty() {
        output.push_str("Empty directory");
    }
    output
}

fn cat_output(args: &[&str]) -> String {
    if args.contains(&"--help") {
        return "cat: Display file contents\n\nUsage: cat <filename>\n\n\
                Options:\n  --help    Display this help message\n\n\
                Examples:\n  cat info.txt     Show contact information"
            .to_owned();
    }
    let Some(filename) = args.first() else {
        return "cat: missing file argument. Type \"cat --help\" for usage.".to_owned();
    };
    match CANNED_FILES
        .iter()
        .find_map(|(name, body)| (name == filename).then_some(*body))
    {
        Some(body) => body.to_owned(),
        None => format!("cat: {filename}: No such file or directory"),
    }
}

const ABOUT_HELP: &str = "about: Display information about environment data collection\n\n\
Usage: about [option]\n\n\
Options:\n  -me       Show what this host can read from your environment\n  \
--help    Display this help message\n\n\
This command shows how much a program can learn about the machine it runs\n\
on without asking. Use 'about -me' to see your own snapshot.";

const CANNED_FILES: &[(&str, &str)] = &[
    (
        "cv.pdf",
        "cv.pdf is a binary. Plain-text highlights:\n\n\
         AVERY QUINN, systems & interface engineer\n\
         Renderers, terminals, tooling. Nine years shipping software\n\
         that draws things and the pipelines that feed it.\n\n\
         `cat experience.txt` for the full history.",
    ),
    (
        "info.txt",
        "CONTACT INFORMATION\n\n\
         Location: Porto, Portugal (UTC+0/+1)\n\
         Email:    avery@averyquinn.dev\n\
         Code:     github.com/averyquinn\n\n\
         Open to collaborations, contract work, or just conversation.",
    ),
    (
        "experience.txt",
        "Senior Engineer | Halftone Systems | Remote | 2021 - present\n\
         - Own the frame pipeline of a character-cell compositor\n\
         - Cut p95 frame time 6x by moving sampling to integer math\n\
         - Mentor two engineers; run the rendering reading group\n\n\
         Engineer | Ledgerline | Porto | 2018 - 2021\n\
         - Built the reconciliation CLI used by every support rotation\n\
         - Led the migration from cron scripts to a typed job runner\n\n\
         Junior Engineer | Studio Marguerite | Lisbon | 2016 - 2018\n\
         - Shipped interactive installations on embedded Linux",
    ),
    (
        "bio.txt",
        "Grew up on flight simulators and fell for the machinery behind\n\
         them. These days the simulator is a terminal emulator.",
    ),
    (
        "project1.md",
        "# backdrop\n\nA character-cell video compositor: samples any frame\n\
         source onto a glyph grid with scroll-driven zoom and pointer\n\
         parallax. You are looking at it.",
    ),
    (
        "project2.md",
        "# crater\n\nA one-button side-scroller with soft difficulty\n\
         checkpoints: dying restarts you at the level you lost, not at\n\
         the beginning. Type `game` to play it.",
    ),
    (
        "project3.md",
        "# fieldnote\n\nA plain-text lab notebook with a tiny query\n\
         language. Notes are files; queries are pipelines; nothing is a\n\
         database.",
    ),
    (
        "frontend.txt",
        "interfaces: terminal UIs, canvas renderers, the occasional web\n\
         page when someone insists",
    ),
    (
        "backend.txt",
        "services: Rust, a long history of Python, queues and caches\n\
         sized with arithmetic instead of vibes",
    ),
    (
        "tools.txt",
        "daily drivers: neovim, tmux, perf, a paper notebook",
    ),
];
